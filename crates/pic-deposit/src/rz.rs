// ─────────────────────────────────────────────────────────────────────
// SCPN PIC Deposition — Axisymmetric Volume Scaling
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Converts an r-z deposit from per-unit-(r·z) to per-unit-volume.
//!
//! The kernels divide by `dr·dz`. The remaining annulus factor `2π|r|` is
//! applied here once every patch has deposited. A node on the axis has
//! volume `π(dr/2)²·dz`, so its factor is `π·dr/4`.

use crate::field::MeshField;
use num_complex::Complex64;
use pic_math::modes::mode_components;
use pic_types::error::{DepositResult, DepositionError};
use pic_types::geometry::{Geometry, PatchGeometry};
use pic_types::index::IntVect;
use std::f64::consts::PI;

/// Radii closer to the axis than this fraction of `dr` count as on-axis.
const AXIS_TOLERANCE: f64 = 1e-9;

/// Divides every radial sample of `field` by its annulus factor. `patch`
/// supplies the radial origin and cell size of the field's level.
pub fn apply_inverse_volume_scaling(field: &mut MeshField, patch: &PatchGeometry) -> DepositResult<()> {
    if field.geometry() != Geometry::Cylindrical || patch.geometry != Geometry::Cylindrical {
        return Err(DepositionError::ConfigError(format!(
            "inverse volume scaling needs cylindrical geometry, got field {:?} and patch {:?}",
            field.geometry(),
            patch.geometry
        )));
    }
    let dr = patch.cell_size[0];
    let r0 = patch.origin()[0];
    let shift = field.centering().axis(0).offset();
    log::debug!("r-z inverse volume scaling over {:?}", field.fab_box());
    field.scale_with(|iv| {
        let r = r0 + (iv[0] as f64 + shift) * dr;
        if r.abs() < AXIS_TOLERANCE * dr {
            4.0 / (PI * dr)
        } else {
            1.0 / (2.0 * PI * r.abs())
        }
    });
    Ok(())
}

/// Complex amplitude of azimuthal mode `m` at `iv`. Mode 0 is real.
pub fn mode_value(field: &MeshField, m: usize, iv: IntVect) -> Option<Complex64> {
    if m == 0 {
        return field.get(0, iv).map(|re| Complex64::new(re, 0.0));
    }
    let (re, im) = mode_components(m);
    Some(Complex64::new(field.get(re, iv)?, field.get(im, iv)?))
}
