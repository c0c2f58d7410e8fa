// ─────────────────────────────────────────────────────────────────────
// SCPN PIC Deposition — Index Space
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Integer index boxes with per-axis staggering.
//!
//! Axis 0 is x (or r in cylindrical geometry), axis 1 is y, axis 2 is z.
//! Linear storage order is x fastest, z slowest.

use crate::constants::SPACEDIM;
use serde::{Deserialize, Serialize};
use std::array;

pub type IntVect = [i64; SPACEDIM];

/// Per-axis location of field samples relative to the cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndexType {
    Node,
    Cell,
}

impl IndexType {
    pub fn is_node(self) -> bool {
        matches!(self, IndexType::Node)
    }

    /// Shift subtracted from a nodal fractional index to address samples
    /// of this type (cell centres sit half a cell above the nodes).
    pub fn offset(self) -> f64 {
        match self {
            IndexType::Node => 0.0,
            IndexType::Cell => 0.5,
        }
    }
}

/// Staggering of a field component, one `IndexType` per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Centering(pub [IndexType; SPACEDIM]);

impl Centering {
    pub const NODAL: Centering = Centering([IndexType::Node; SPACEDIM]);
    pub const CELL: Centering = Centering([IndexType::Cell; SPACEDIM]);

    /// Yee staggering of current component `component`: cell-centred along
    /// the component axis, nodal along the others.
    pub fn yee_current(component: usize) -> Self {
        Centering(array::from_fn(|axis| {
            if axis == component {
                IndexType::Cell
            } else {
                IndexType::Node
            }
        }))
    }

    pub fn axis(&self, axis: usize) -> IndexType {
        self.0[axis]
    }
}

/// Inclusive box `lo..=hi` in the index space of `centering`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexBox {
    pub lo: IntVect,
    pub hi: IntVect,
    pub centering: Centering,
}

impl IndexBox {
    pub fn new(lo: IntVect, hi: IntVect, centering: Centering) -> Self {
        Self { lo, hi, centering }
    }

    /// Cell-centred box spanning cells `lo..=hi`.
    pub fn cells(lo: IntVect, hi: IntVect) -> Self {
        Self::new(lo, hi, Centering::CELL)
    }

    pub fn is_empty(&self) -> bool {
        (0..SPACEDIM).any(|axis| self.hi[axis] < self.lo[axis])
    }

    /// Number of points along each axis.
    pub fn size(&self) -> [usize; SPACEDIM] {
        array::from_fn(|axis| (self.hi[axis] - self.lo[axis] + 1).max(0) as usize)
    }

    pub fn num_points(&self) -> usize {
        self.size().iter().product()
    }

    pub fn contains(&self, iv: IntVect) -> bool {
        (0..SPACEDIM).all(|axis| iv[axis] >= self.lo[axis] && iv[axis] <= self.hi[axis])
    }

    pub fn contains_box(&self, other: &IndexBox) -> bool {
        other.is_empty() || (self.contains(other.lo) && self.contains(other.hi))
    }

    /// Grows the box by `ng` points on both sides of every axis.
    pub fn grow(&self, ng: IntVect) -> Self {
        Self {
            lo: array::from_fn(|axis| self.lo[axis] - ng[axis]),
            hi: array::from_fn(|axis| self.hi[axis] + ng[axis]),
            centering: self.centering,
        }
    }

    /// Re-expresses the box in another staggering. The box keeps covering
    /// the same cells: `N` cells become `N + 1` nodes on a nodal axis.
    pub fn convert(&self, centering: Centering) -> Self {
        let hi = array::from_fn(|axis| {
            match (self.centering.axis(axis), centering.axis(axis)) {
                (IndexType::Cell, IndexType::Node) => self.hi[axis] + 1,
                (IndexType::Node, IndexType::Cell) => self.hi[axis] - 1,
                _ => self.hi[axis],
            }
        });
        Self {
            lo: self.lo,
            hi,
            centering,
        }
    }

    /// Coarsens by `ratio` per axis, rounding towards negative infinity so
    /// the coarse box covers every fine cell.
    pub fn coarsen(&self, ratio: IntVect) -> Self {
        let cells = self.convert(Centering::CELL);
        let coarse = Self {
            lo: array::from_fn(|axis| cells.lo[axis].div_euclid(ratio[axis].max(1))),
            hi: array::from_fn(|axis| cells.hi[axis].div_euclid(ratio[axis].max(1))),
            centering: Centering::CELL,
        };
        coarse.convert(self.centering)
    }

    /// Overlap of two boxes of the same staggering.
    pub fn intersect(&self, other: &IndexBox) -> Option<IndexBox> {
        if self.centering != other.centering {
            return None;
        }
        let out = Self {
            lo: array::from_fn(|axis| self.lo[axis].max(other.lo[axis])),
            hi: array::from_fn(|axis| self.hi[axis].min(other.hi[axis])),
            centering: self.centering,
        };
        if out.is_empty() {
            None
        } else {
            Some(out)
        }
    }

    /// Linear offset of `iv` inside the box (x fastest). The caller must
    /// ensure `self.contains(iv)`.
    pub fn linear_index(&self, iv: IntVect) -> usize {
        let size = self.size();
        let i = (iv[0] - self.lo[0]) as usize;
        let j = (iv[1] - self.lo[1]) as usize;
        let k = (iv[2] - self.lo[2]) as usize;
        i + size[0] * (j + size[1] * k)
    }

    /// Iterates over all points, x fastest.
    pub fn iter(&self) -> impl Iterator<Item = IntVect> {
        let lo = self.lo;
        let hi = self.hi;
        (lo[2]..=hi[2]).flat_map(move |k| {
            (lo[1]..=hi[1]).flat_map(move |j| (lo[0]..=hi[0]).map(move |i| [i, j, k]))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_cell_to_node_adds_one_point() {
        let cells = IndexBox::cells([0, 0, 0], [3, 0, 7]);
        let nodes = cells.convert(Centering::NODAL);
        assert_eq!(nodes.size(), [5, 2, 9]);
        assert_eq!(nodes.convert(Centering::CELL), cells);
    }

    #[test]
    fn test_yee_current_staggering() {
        let jx = Centering::yee_current(0);
        assert_eq!(jx.axis(0), IndexType::Cell);
        assert_eq!(jx.axis(1), IndexType::Node);
        assert_eq!(jx.axis(2), IndexType::Node);
    }

    #[test]
    fn test_coarsen_rounds_towards_negative_infinity() {
        let fine = IndexBox::cells([-3, 0, 4], [5, 0, 9]);
        let coarse = fine.coarsen([2, 1, 2]);
        assert_eq!(coarse.lo, [-2, 0, 2]);
        assert_eq!(coarse.hi, [2, 0, 4]);
    }

    #[test]
    fn test_coarsen_nodal_box_covers_fine_nodes() {
        let fine = IndexBox::cells([0, 0, 0], [7, 0, 7]).convert(Centering::NODAL);
        let coarse = fine.coarsen([2, 1, 2]);
        assert_eq!(coarse.lo, [0, 0, 0]);
        assert_eq!(coarse.hi, [4, 1, 4]);
    }

    #[test]
    fn test_intersect_and_contains() {
        let a = IndexBox::cells([0, 0, 0], [9, 0, 9]);
        let b = IndexBox::cells([5, 0, -2], [12, 0, 3]);
        let c = a.intersect(&b).expect("boxes overlap");
        assert_eq!(c.lo, [5, 0, 0]);
        assert_eq!(c.hi, [9, 0, 3]);
        assert!(a.contains_box(&c));
        assert!(b.contains_box(&c));
        let far = IndexBox::cells([20, 0, 20], [21, 0, 21]);
        assert!(a.intersect(&far).is_none());
    }

    #[test]
    fn test_linear_index_matches_iteration_order() {
        let bx = IndexBox::cells([-1, 2, 3], [2, 3, 5]);
        for (n, iv) in bx.iter().enumerate() {
            assert_eq!(bx.linear_index(iv), n);
        }
        assert_eq!(bx.iter().count(), bx.num_points());
    }

    #[test]
    fn test_empty_box() {
        let bx = IndexBox::cells([0, 0, 0], [-1, 0, 0]);
        assert!(bx.is_empty());
        assert_eq!(bx.num_points(), 0);
    }
}
