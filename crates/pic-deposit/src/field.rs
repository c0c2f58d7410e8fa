// ─────────────────────────────────────────────────────────────────────
// SCPN PIC Deposition — Shared Mesh Field
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Destination field shared by every patch task.
//!
//! A `MeshField` covers its valid box grown by the allocated guard. Values
//! are stored as atomic `f64` so that concurrent tasks can write through a
//! shared reference; there are exactly two ways to do so:
//!
//! * [`MeshField::lock_add`] merges a private `LocalBuffer` while holding
//!   the region locks of the touched z-planes.
//! * [`MeshField::scatter_view`] hands out an [`AtomicScatter`] whose only
//!   operation is an atomic add.

use crate::accumulate::{Accumulator, LocalBuffer};
use ndarray::Array4;
use parking_lot::{Mutex, MutexGuard};
use pic_types::error::{DepositResult, DepositionError};
use pic_types::geometry::Geometry;
use pic_types::index::{Centering, IndexBox, IntVect};
use std::sync::atomic::{AtomicU64, Ordering};

/// `f64` with an atomic add built from a compare-exchange loop.
#[repr(transparent)]
#[derive(Debug, Default)]
pub(crate) struct AtomicF64(AtomicU64);

impl AtomicF64 {
    pub(crate) fn new(value: f64) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }

    #[inline]
    pub(crate) fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    pub(crate) fn store(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn fetch_add(&self, value: f64) -> f64 {
        let mut current = self.0.load(Ordering::Relaxed);
        loop {
            let next = (f64::from_bits(current) + value).to_bits();
            match self
                .0
                .compare_exchange_weak(current, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(previous) => return f64::from_bits(previous),
                Err(actual) => current = actual,
            }
        }
    }

    fn get_mut(&mut self) -> f64 {
        f64::from_bits(*self.0.get_mut())
    }

    fn set_mut(&mut self, value: f64) {
        *self.0.get_mut() = value.to_bits();
    }
}

/// Multi-component mesh quantity (charge density, one current component).
#[derive(Debug)]
pub struct MeshField {
    geometry: Geometry,
    valid_box: IndexBox,
    fab_box: IndexBox,
    guard: IntVect,
    ncomp: usize,
    data: Vec<AtomicF64>,
    plane_locks: Vec<Mutex<()>>,
}

impl MeshField {
    /// Zero-initialised field over `valid_cells` (a cell box) converted to
    /// `centering` and grown by `guard`.
    pub fn new(
        geometry: Geometry,
        valid_cells: IndexBox,
        centering: Centering,
        guard: IntVect,
        ncomp: usize,
    ) -> DepositResult<Self> {
        if ncomp == 0 {
            return Err(DepositionError::ConfigError(
                "MeshField needs at least one component".to_string(),
            ));
        }
        if let Some(axis) = (0..3).find(|&axis| guard[axis] < 0) {
            return Err(DepositionError::ConfigError(format!(
                "guard[{axis}] must be >= 0, got {}",
                guard[axis]
            )));
        }
        let cells = valid_cells.convert(Centering::CELL);
        if cells.is_empty() {
            return Err(DepositionError::ConfigError(
                "MeshField valid box must contain at least one cell".to_string(),
            ));
        }
        let centering = geometry.normalize_centering(centering);
        let cells = IndexBox::cells(geometry.mask(cells.lo), geometry.mask(cells.hi));
        let valid_box = cells.convert(centering);
        let guard = geometry.mask(guard);
        let fab_box = valid_box.grow(guard);

        let len = fab_box.num_points() * ncomp;
        let planes = fab_box.size()[2];
        Ok(Self {
            geometry,
            valid_box,
            fab_box,
            guard,
            ncomp,
            data: (0..len).map(|_| AtomicF64::new(0.0)).collect(),
            plane_locks: (0..planes).map(|_| Mutex::new(())).collect(),
        })
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn centering(&self) -> Centering {
        self.valid_box.centering
    }

    pub fn valid_box(&self) -> IndexBox {
        self.valid_box
    }

    /// Valid box grown by the allocated guard.
    pub fn fab_box(&self) -> IndexBox {
        self.fab_box
    }

    pub fn guard(&self) -> IntVect {
        self.guard
    }

    pub fn ncomp(&self) -> usize {
        self.ncomp
    }

    #[inline]
    fn offset(&self, comp: usize, iv: IntVect) -> usize {
        comp * self.fab_box.num_points() + self.fab_box.linear_index(iv)
    }

    pub fn get(&self, comp: usize, iv: IntVect) -> Option<f64> {
        if comp >= self.ncomp || !self.fab_box.contains(iv) {
            return None;
        }
        Some(self.data[self.offset(comp, iv)].load())
    }

    pub fn set(&mut self, comp: usize, iv: IntVect, value: f64) -> DepositResult<()> {
        if comp >= self.ncomp || !self.fab_box.contains(iv) {
            return Err(DepositionError::ConfigError(format!(
                "index {iv:?} component {comp} outside field box {:?}",
                self.fab_box
            )));
        }
        let offset = self.offset(comp, iv);
        self.data[offset].set_mut(value);
        Ok(())
    }

    pub fn fill(&mut self, value: f64) {
        for v in &mut self.data {
            v.set_mut(value);
        }
    }

    /// Multiplies every component at each point by `factor(iv)`.
    pub fn scale_with<F>(&mut self, factor: F)
    where
        F: Fn(IntVect) -> f64,
    {
        let bx = self.fab_box;
        let npts = bx.num_points();
        for (n, iv) in bx.iter().enumerate() {
            let f = factor(iv);
            for comp in 0..self.ncomp {
                let slot = &mut self.data[comp * npts + n];
                let v = slot.get_mut();
                slot.set_mut(v * f);
            }
        }
    }

    /// Snapshot as `[[comp, iz, iy, ix]]` over the fab box.
    pub fn to_array(&self) -> Array4<f64> {
        let [nx, ny, nz] = self.fab_box.size();
        let npts = self.fab_box.num_points();
        Array4::from_shape_fn((self.ncomp, nz, ny, nx), |(c, k, j, i)| {
            self.data[c * npts + i + nx * (j + ny * k)].load()
        })
    }

    /// Sum of component `comp` over the whole fab box, guards included.
    pub fn total(&self, comp: usize) -> f64 {
        if comp >= self.ncomp {
            return 0.0;
        }
        let npts = self.fab_box.num_points();
        self.data[comp * npts..(comp + 1) * npts]
            .iter()
            .map(AtomicF64::load)
            .sum()
    }

    /// Sum of component `comp` over the valid box only.
    pub fn valid_total(&self, comp: usize) -> f64 {
        if comp >= self.ncomp {
            return 0.0;
        }
        self.valid_box
            .iter()
            .map(|iv| self.data[self.offset(comp, iv)].load())
            .sum()
    }

    /// Adds `src` into components `dst_comp..dst_comp + src.ncomp()` over
    /// the overlap of the two boxes. Returns the merged region, `None` when
    /// the boxes do not overlap.
    pub fn lock_add(&self, src: &LocalBuffer, dst_comp: usize) -> DepositResult<Option<IndexBox>> {
        if src.bx().centering != self.centering() {
            return Err(DepositionError::ConfigError(format!(
                "buffer centering {:?} does not match field centering {:?}",
                src.bx().centering,
                self.centering()
            )));
        }
        if dst_comp + src.ncomp() > self.ncomp {
            return Err(DepositionError::ConfigError(format!(
                "components {dst_comp}..{} exceed field component count {}",
                dst_comp + src.ncomp(),
                self.ncomp
            )));
        }
        let Some(region) = src.bx().intersect(&self.fab_box) else {
            return Ok(None);
        };

        let k0 = (region.lo[2] - self.fab_box.lo[2]) as usize;
        let k1 = (region.hi[2] - self.fab_box.lo[2]) as usize;
        // Ascending plane order keeps concurrent merges deadlock free.
        let _held: Vec<MutexGuard<'_, ()>> =
            self.plane_locks[k0..=k1].iter().map(|m| m.lock()).collect();
        log::trace!(
            "merging {} points x {} components into {:?}",
            region.num_points(),
            src.ncomp(),
            region
        );

        for comp in 0..src.ncomp() {
            for iv in region.iter() {
                let v = src.get(comp, iv);
                if v != 0.0 {
                    let slot = &self.data[self.offset(dst_comp + comp, iv)];
                    slot.store(slot.load() + v);
                }
            }
        }
        Ok(Some(region))
    }

    /// Atomic view of components `comp_start..comp_start + ncomp`.
    pub fn scatter_view(&self, comp_start: usize, ncomp: usize) -> DepositResult<AtomicScatter<'_>> {
        if comp_start + ncomp > self.ncomp {
            return Err(DepositionError::ConfigError(format!(
                "components {comp_start}..{} exceed field component count {}",
                comp_start + ncomp,
                self.ncomp
            )));
        }
        Ok(AtomicScatter {
            field: self,
            comp_start,
            ncomp,
        })
    }
}

/// Direct-scatter handle onto a component range of a `MeshField`.
#[derive(Debug, Clone, Copy)]
pub struct AtomicScatter<'a> {
    field: &'a MeshField,
    comp_start: usize,
    ncomp: usize,
}

impl AtomicScatter<'_> {
    pub fn ncomp(&self) -> usize {
        self.ncomp
    }
}

impl Accumulator for AtomicScatter<'_> {
    #[inline]
    fn add(&mut self, comp: usize, iv: IntVect, value: f64) {
        debug_assert!(comp < self.ncomp);
        debug_assert!(self.field.fab_box.contains(iv));
        let offset = self.field.offset(self.comp_start + comp, iv);
        self.field.data[offset].fetch_add(value);
    }
}
