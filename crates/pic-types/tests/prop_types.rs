// ─────────────────────────────────────────────────────────────────────
// SCPN PIC Deposition — Property-Based Tests (proptest) for pic-types
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for pic-types using proptest.
//!
//! Covers: IndexBox convert/coarsen invariants, patch coarsening geometry.

use pic_types::geometry::{Geometry, PatchGeometry};
use pic_types::index::{Centering, IndexBox};
use proptest::prelude::*;

// ── IndexBox Invariants ──────────────────────────────────────────────

proptest! {
    /// Converting a cell box to nodes and back is lossless.
    #[test]
    fn convert_roundtrip(
        lo in prop::array::uniform3(-20i64..20),
        ext in prop::array::uniform3(0i64..16),
    ) {
        let hi = [lo[0] + ext[0], lo[1] + ext[1], lo[2] + ext[2]];
        let cells = IndexBox::cells(lo, hi);
        let nodes = cells.convert(Centering::NODAL);
        prop_assert_eq!(nodes.num_points(), (0..3).map(|a| (ext[a] + 2) as usize).product::<usize>());
        prop_assert_eq!(nodes.convert(Centering::CELL), cells);
    }

    /// Every fine cell maps into the coarsened box.
    #[test]
    fn coarsen_covers_fine_cells(
        lo in prop::array::uniform3(-20i64..20),
        ext in prop::array::uniform3(0i64..12),
        ratio in prop::array::uniform3(1i64..5),
    ) {
        let hi = [lo[0] + ext[0], lo[1] + ext[1], lo[2] + ext[2]];
        let fine = IndexBox::cells(lo, hi);
        let coarse = fine.coarsen(ratio);
        for iv in fine.iter() {
            let civ = [
                iv[0].div_euclid(ratio[0]),
                iv[1].div_euclid(ratio[1]),
                iv[2].div_euclid(ratio[2]),
            ];
            prop_assert!(coarse.contains(civ), "fine {:?} -> coarse {:?} outside {:?}", iv, civ, coarse);
        }
    }

    /// Growing then intersecting with the original returns the original box.
    #[test]
    fn grow_then_intersect_is_identity(
        lo in prop::array::uniform3(-10i64..10),
        ext in prop::array::uniform3(0i64..8),
        ng in prop::array::uniform3(0i64..4),
    ) {
        let hi = [lo[0] + ext[0], lo[1] + ext[1], lo[2] + ext[2]];
        let bx = IndexBox::cells(lo, hi);
        let grown = bx.grow(ng);
        prop_assert!(grown.contains_box(&bx));
        prop_assert_eq!(grown.intersect(&bx), Some(bx));
    }
}

// ── Patch Coarsening ─────────────────────────────────────────────────

proptest! {
    /// The physical lower corner of the coarse tile never lies above the
    /// fine tile's corner, and both share the index origin.
    #[test]
    fn coarsened_patch_contains_fine_patch(
        lo_x in -16i64..16,
        lo_z in -16i64..16,
        nx in 1i64..12,
        nz in 1i64..12,
        r in 1i64..5,
        dx in 0.01f64..2.0,
    ) {
        let patch = PatchGeometry::new(
            Geometry::Cartesian2D,
            2,
            IndexBox::cells([lo_x, 0, lo_z], [lo_x + nx - 1, 0, lo_z + nz - 1]),
            [dx, 1.0, dx],
            [lo_x as f64 * dx, 0.0, lo_z as f64 * dx],
        ).unwrap();
        let coarse = patch.coarsened([r, 1, r]);
        prop_assert_eq!(coarse.level, 1);
        for axis in [0usize, 2] {
            prop_assert!(coarse.lower_corner[axis] <= patch.lower_corner[axis] + 1e-9);
            prop_assert!((coarse.origin()[axis] - patch.origin()[axis]).abs() < 1e-9);
        }
    }
}
