// ─────────────────────────────────────────────────────────────────────
// SCPN PIC Deposition — Geometry
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::constants::SPACEDIM;
use crate::error::{DepositResult, DepositionError};
use crate::index::{Centering, IndexBox, IndexType, IntVect};
use serde::{Deserialize, Serialize};
use std::array;

/// Simulation dimensionality and coordinate system.
///
/// * `OneD`: z only.
/// * `Cartesian2D`: x-z slab.
/// * `Cylindrical`: r-z mesh (r on axis 0) with azimuthal Fourier modes.
/// * `ThreeD`: x-y-z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Geometry {
    OneD,
    #[serde(rename = "cartesian-2d")]
    Cartesian2D,
    Cylindrical,
    ThreeD,
}

impl Geometry {
    pub fn active_axes(self) -> [bool; SPACEDIM] {
        match self {
            Geometry::OneD => [false, false, true],
            Geometry::Cartesian2D | Geometry::Cylindrical => [true, false, true],
            Geometry::ThreeD => [true, true, true],
        }
    }

    pub fn is_active(self, axis: usize) -> bool {
        self.active_axes()[axis]
    }

    pub fn is_cylindrical(self) -> bool {
        matches!(self, Geometry::Cylindrical)
    }

    /// Components of a scalar field: mode 0 plus a (real, imaginary) pair
    /// for every higher azimuthal mode in cylindrical geometry.
    pub fn num_components(self, n_rz_azimuthal_modes: usize) -> usize {
        if self.is_cylindrical() {
            (2 * n_rz_azimuthal_modes).saturating_sub(1).max(1)
        } else {
            1
        }
    }

    /// Zeroes the entries of `iv` that belong to inactive axes.
    pub fn mask(self, iv: IntVect) -> IntVect {
        let active = self.active_axes();
        array::from_fn(|axis| if active[axis] { iv[axis] } else { 0 })
    }

    /// Forces inactive axes to cell centering so that they hold one point.
    pub fn normalize_centering(self, centering: Centering) -> Centering {
        let active = self.active_axes();
        Centering(array::from_fn(|axis| {
            if active[axis] {
                centering.axis(axis)
            } else {
                IndexType::Cell
            }
        }))
    }

    /// Product of the cell sizes over the active axes.
    pub fn cell_volume(self, cell_size: [f64; SPACEDIM]) -> f64 {
        let active = self.active_axes();
        (0..SPACEDIM)
            .filter(|&axis| active[axis])
            .map(|axis| cell_size[axis])
            .product()
    }
}

/// Geometry of one particle tile at its refinement level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatchGeometry {
    pub geometry: Geometry,
    pub level: usize,
    /// Cell-centred valid region of the tile.
    pub tile_box: IndexBox,
    pub cell_size: [f64; SPACEDIM],
    /// Physical position of the lower corner of `tile_box`.
    pub lower_corner: [f64; SPACEDIM],
}

impl PatchGeometry {
    pub fn new(
        geometry: Geometry,
        level: usize,
        tile_box: IndexBox,
        cell_size: [f64; SPACEDIM],
        lower_corner: [f64; SPACEDIM],
    ) -> DepositResult<Self> {
        let active = geometry.active_axes();
        for axis in 0..SPACEDIM {
            if !active[axis] {
                continue;
            }
            if !cell_size[axis].is_finite() || cell_size[axis] <= 0.0 {
                return Err(DepositionError::PhysicsViolation(format!(
                    "cell_size[{axis}] must be finite and > 0, got {}",
                    cell_size[axis]
                )));
            }
            if !lower_corner[axis].is_finite() {
                return Err(DepositionError::PhysicsViolation(format!(
                    "lower_corner[{axis}] must be finite"
                )));
            }
        }
        let cells = tile_box.convert(Centering::CELL);
        if cells.is_empty() {
            return Err(DepositionError::ConfigError(
                "Patch tile box must contain at least one cell".to_string(),
            ));
        }
        let lo = geometry.mask(cells.lo);
        let hi = geometry.mask(cells.hi);
        Ok(Self {
            geometry,
            level,
            tile_box: IndexBox::cells(lo, hi),
            cell_size: array::from_fn(|axis| if active[axis] { cell_size[axis] } else { 1.0 }),
            lower_corner: array::from_fn(|axis| if active[axis] { lower_corner[axis] } else { 0.0 }),
        })
    }

    /// Physical position of index 0 on every axis. Shared by all levels,
    /// so it survives coarsening unchanged.
    pub fn origin(&self) -> [f64; SPACEDIM] {
        array::from_fn(|axis| {
            self.lower_corner[axis] - self.tile_box.lo[axis] as f64 * self.cell_size[axis]
        })
    }

    /// Physical position of the lower corner of index `lo`.
    pub fn corner_of(&self, lo: IntVect) -> [f64; SPACEDIM] {
        let origin = self.origin();
        array::from_fn(|axis| origin[axis] + lo[axis] as f64 * self.cell_size[axis])
    }

    pub fn inv_cell_size(&self) -> [f64; SPACEDIM] {
        array::from_fn(|axis| 1.0 / self.cell_size[axis])
    }

    pub fn cell_volume(&self) -> f64 {
        self.geometry.cell_volume(self.cell_size)
    }

    /// The same patch seen from the next coarser level.
    pub fn coarsened(&self, ratio: IntVect) -> Self {
        let ratio = array::from_fn(|axis| {
            if self.geometry.is_active(axis) {
                ratio[axis].max(1)
            } else {
                1
            }
        });
        let tile_box = self.tile_box.coarsen(ratio);
        let cell_size: [f64; SPACEDIM] =
            array::from_fn(|axis| self.cell_size[axis] * ratio[axis] as f64);
        let origin = self.origin();
        Self {
            geometry: self.geometry,
            level: self.level.saturating_sub(1),
            tile_box,
            cell_size,
            lower_corner: array::from_fn(|axis| {
                origin[axis] + tile_box.lo[axis] as f64 * cell_size[axis]
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_num_components() {
        assert_eq!(Geometry::ThreeD.num_components(0), 1);
        assert_eq!(Geometry::Cylindrical.num_components(1), 1);
        assert_eq!(Geometry::Cylindrical.num_components(3), 5);
    }

    #[test]
    fn test_patch_masks_inactive_axes() {
        let patch = PatchGeometry::new(
            Geometry::OneD,
            0,
            IndexBox::cells([4, 4, 8], [9, 9, 15]),
            [0.0, 0.0, 0.5],
            [1.0, 1.0, 4.0],
        )
        .expect("valid 1D patch");
        assert_eq!(patch.tile_box.lo, [0, 0, 8]);
        assert_eq!(patch.tile_box.hi, [0, 0, 15]);
        assert!((patch.cell_volume() - 0.5).abs() < 1e-15);
        assert!((patch.origin()[2] - 0.0).abs() < 1e-15);
    }

    #[test]
    fn test_patch_rejects_non_positive_cell_size() {
        let err = PatchGeometry::new(
            Geometry::Cartesian2D,
            0,
            IndexBox::cells([0, 0, 0], [3, 0, 3]),
            [0.1, 1.0, -0.1],
            [0.0; 3],
        )
        .expect_err("negative dz must fail");
        match err {
            DepositionError::PhysicsViolation(msg) => assert!(msg.contains("cell_size[2]")),
            other => panic!("Unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_coarsened_patch_keeps_origin() {
        let patch = PatchGeometry::new(
            Geometry::Cartesian2D,
            1,
            IndexBox::cells([6, 0, 10], [13, 0, 17]),
            [0.25, 1.0, 0.5],
            [1.5, 0.0, 5.0],
        )
        .expect("valid patch");
        let coarse = patch.coarsened([2, 7, 2]);
        assert_eq!(coarse.level, 0);
        assert_eq!(coarse.tile_box.lo, [3, 0, 5]);
        assert_eq!(coarse.tile_box.hi, [6, 0, 8]);
        assert!((coarse.cell_size[0] - 0.5).abs() < 1e-15);
        assert!((coarse.cell_size[1] - 1.0).abs() < 1e-15);
        assert!((coarse.cell_size[2] - 1.0).abs() < 1e-15);
        for axis in [0, 2] {
            assert!((coarse.origin()[axis] - patch.origin()[axis]).abs() < 1e-12);
        }
    }
}
