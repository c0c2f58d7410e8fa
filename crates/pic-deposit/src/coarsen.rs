// ─────────────────────────────────────────────────────────────────────
// SCPN PIC Deposition — Level Coarsening
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Deposition of fine-level particles onto the next coarser level.

use pic_types::constants::SPACEDIM;
use pic_types::error::{DepositResult, DepositionError};
use pic_types::geometry::{Geometry, PatchGeometry};
use pic_types::index::IntVect;
use std::array;

/// Resolved source/target level pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelTarget {
    pub level: usize,
    pub depos_level: usize,
    pub ratio: IntVect,
}

impl LevelTarget {
    pub fn is_coarsening(&self) -> bool {
        self.depos_level != self.level
    }

    /// Patch geometry at the deposition level.
    pub fn deposition_patch(&self, patch: &PatchGeometry) -> PatchGeometry {
        if self.is_coarsening() {
            patch.coarsened(self.ratio)
        } else {
            *patch
        }
    }
}

/// Validates the target level and refinement ratio for particles living
/// on `level`.
pub fn resolve_target(
    geometry: Geometry,
    level: usize,
    depos_level: Option<usize>,
    ratio: Option<IntVect>,
) -> DepositResult<LevelTarget> {
    let depos_level = depos_level.unwrap_or(level);
    if depos_level != level && level.checked_sub(1) != Some(depos_level) {
        return Err(DepositionError::LevelMismatch {
            level,
            depos_level,
            message: "deposition level must equal the particle level or the one below it"
                .to_string(),
        });
    }
    if depos_level != level && ratio.is_none() {
        return Err(DepositionError::LevelMismatch {
            level,
            depos_level,
            message: "a refinement ratio is required".to_string(),
        });
    }
    let ratio = ratio.unwrap_or([1; SPACEDIM]);
    if let Some(axis) = (0..SPACEDIM).find(|&axis| ratio[axis] < 1) {
        return Err(DepositionError::ConfigError(format!(
            "refinement ratio[{axis}] must be >= 1, got {}",
            ratio[axis]
        )));
    }
    let ratio = array::from_fn(|axis| if geometry.is_active(axis) { ratio[axis] } else { 1 });
    Ok(LevelTarget {
        level,
        depos_level,
        ratio,
    })
}
