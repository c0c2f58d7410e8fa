// ─────────────────────────────────────────────────────────────────────
// SCPN PIC Deposition — Guard-Region Policy
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Guard-cell checks run before any write.

use crate::accumulate::ScatterBody;
use pic_types::config::ShapeOrder;
use pic_types::constants::SPACEDIM;
use pic_types::error::{DepositResult, DepositionError};
use pic_types::geometry::Geometry;
use pic_types::index::IntVect;
use rayon::prelude::*;

/// Guard cells a shape of `order` needs beyond the tile on each active axis.
pub fn shape_extent(order: ShapeOrder, geometry: Geometry) -> IntVect {
    let reach = (order.order() / 2 + 1) as i64;
    geometry.mask([reach; SPACEDIM])
}

/// Requested deposition guards must fit in the allocated ones.
pub fn check_guard_allocation(requested: IntVect, allocated: IntVect) -> DepositResult<()> {
    for axis in 0..SPACEDIM {
        if requested[axis] < 0 {
            return Err(DepositionError::ConfigError(format!(
                "deposition guard[{axis}] must be >= 0, got {}",
                requested[axis]
            )));
        }
        if requested[axis] > allocated[axis] {
            return Err(DepositionError::GuardExceedsAllocation {
                axis,
                requested: requested[axis],
                allocated: allocated[axis],
            });
        }
    }
    Ok(())
}

/// The shape must fit in the guard width the strategy may write to.
pub fn check_available(available: IntVect, extent: IntVect) -> DepositResult<()> {
    for axis in 0..SPACEDIM {
        if extent[axis] > available[axis] {
            return Err(DepositionError::InsufficientGuard {
                axis,
                required: extent[axis],
                available: available[axis],
            });
        }
    }
    Ok(())
}

/// Parallel footprint pre-pass. Fails with the number of particles whose
/// stencil leaves the writable box and the index of the first one.
pub fn check_footprints<B: ScatterBody>(body: &B, np: usize) -> DepositResult<()> {
    let (count, first) = (0..np)
        .into_par_iter()
        .map(|ip| if body.fits(ip) { (0, usize::MAX) } else { (1, ip) })
        .reduce(|| (0, usize::MAX), |a, b| (a.0 + b.0, a.1.min(b.1)));
    if count > 0 {
        log::warn!("{count} of {np} particles outside the deposition box, first at {first}");
        return Err(DepositionError::ParticlesOutOfRange { count, first });
    }
    Ok(())
}
