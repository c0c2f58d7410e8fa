// ─────────────────────────────────────────────────────────────────────
// SCPN PIC Deposition — Particle Tiles
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Read-only view of the macroparticles of one tile.
//!
//! The particle container owns storage; deposition only needs positions,
//! momenta and the tile's refinement level. `ParticleBatch` is a plain
//! structure-of-arrays implementation.

use pic_types::constants::SPACEDIM;
use pic_types::error::{DepositResult, DepositionError};

/// Particles of one tile at one refinement level.
pub trait ParticleTile: Sync {
    fn level(&self) -> usize;

    fn num_particles(&self) -> usize;

    /// Cartesian position `[x, y, z]` (m). Lower-dimensional geometries
    /// ignore the inactive components.
    fn position(&self, index: usize) -> [f64; SPACEDIM];

    /// Momentum per unit mass `γv` (m/s).
    fn momentum(&self, index: usize) -> [f64; SPACEDIM];
}

/// Position lookup shifted by a start offset, used for partial-batch
/// deposition.
#[derive(Debug)]
pub struct PositionAccessor<'a, P: ?Sized> {
    tile: &'a P,
    offset: usize,
}

impl<P: ?Sized> Clone for PositionAccessor<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: ?Sized> Copy for PositionAccessor<'_, P> {}

impl<'a, P: ParticleTile + ?Sized> PositionAccessor<'a, P> {
    pub fn new(tile: &'a P, offset: usize) -> Self {
        Self { tile, offset }
    }

    #[inline(always)]
    pub fn position(&self, index: usize) -> [f64; SPACEDIM] {
        self.tile.position(self.offset + index)
    }

    #[inline(always)]
    pub fn momentum(&self, index: usize) -> [f64; SPACEDIM] {
        self.tile.momentum(self.offset + index)
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// Per-particle charge carried into the deposit: `weight × charge ×
/// ionization level` (the level is 1 for non-ionizable species).
#[derive(Debug, Clone, Copy)]
pub struct ChargeSource<'a> {
    pub weights: &'a [f64],
    pub charge: f64,
    pub ion_levels: Option<&'a [i32]>,
}

impl<'a> ChargeSource<'a> {
    pub fn new(weights: &'a [f64], charge: f64) -> Self {
        Self {
            weights,
            charge,
            ion_levels: None,
        }
    }

    pub fn with_ionization(mut self, ion_levels: &'a [i32]) -> Self {
        self.ion_levels = Some(ion_levels);
        self
    }

    pub(crate) fn validate(&self, end: usize) -> DepositResult<()> {
        if !self.charge.is_finite() {
            return Err(DepositionError::PhysicsViolation(
                "species charge must be finite".to_string(),
            ));
        }
        if self.weights.len() < end {
            return Err(DepositionError::PhysicsViolation(format!(
                "weight array holds {} entries, deposition range needs {end}",
                self.weights.len()
            )));
        }
        if let Some(levels) = self.ion_levels {
            if levels.len() < end {
                return Err(DepositionError::PhysicsViolation(format!(
                    "ionization level array holds {} entries, deposition range needs {end}",
                    levels.len()
                )));
            }
        }
        Ok(())
    }

    /// Charge of particle `index` before the inverse cell volume.
    #[inline(always)]
    pub fn particle_charge(&self, index: usize) -> f64 {
        let q = self.charge * self.weights[index];
        match self.ion_levels {
            Some(levels) => q * levels[index] as f64,
            None => q,
        }
    }

    /// Total charge of the particles in `start..end`.
    pub fn total_charge(&self, start: usize, end: usize) -> f64 {
        (start..end).map(|ip| self.particle_charge(ip)).sum()
    }
}

/// Structure-of-arrays particle storage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleBatch {
    pub level: usize,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub ux: Vec<f64>,
    pub uy: Vec<f64>,
    pub uz: Vec<f64>,
}

impl ParticleBatch {
    pub fn new(level: usize) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }

    pub fn with_capacity(level: usize, capacity: usize) -> Self {
        Self {
            level,
            x: Vec::with_capacity(capacity),
            y: Vec::with_capacity(capacity),
            z: Vec::with_capacity(capacity),
            ux: Vec::with_capacity(capacity),
            uy: Vec::with_capacity(capacity),
            uz: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, position: [f64; SPACEDIM], momentum: [f64; SPACEDIM]) {
        self.x.push(position[0]);
        self.y.push(position[1]);
        self.z.push(position[2]);
        self.ux.push(momentum[0]);
        self.uy.push(momentum[1]);
        self.uz.push(momentum[2]);
    }

    /// Batch of particles at rest.
    pub fn from_positions(level: usize, positions: &[[f64; SPACEDIM]]) -> Self {
        let mut batch = Self::with_capacity(level, positions.len());
        for &p in positions {
            batch.push(p, [0.0; SPACEDIM]);
        }
        batch
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Copy of the particles at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> Self {
        let mut out = Self::with_capacity(self.level, indices.len());
        for &i in indices {
            out.push(self.position(i), self.momentum(i));
        }
        out
    }
}

impl ParticleTile for ParticleBatch {
    fn level(&self) -> usize {
        self.level
    }

    fn num_particles(&self) -> usize {
        self.len()
    }

    #[inline(always)]
    fn position(&self, index: usize) -> [f64; SPACEDIM] {
        [self.x[index], self.y[index], self.z[index]]
    }

    #[inline(always)]
    fn momentum(&self, index: usize) -> [f64; SPACEDIM] {
        [self.ux[index], self.uy[index], self.uz[index]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessor_applies_offset() {
        let batch = ParticleBatch::from_positions(0, &[[0.0, 0.0, 1.0], [0.0, 0.0, 2.0], [0.0, 0.0, 3.0]]);
        let acc = PositionAccessor::new(&batch, 1);
        assert_eq!(acc.position(0)[2], 2.0);
        assert_eq!(acc.position(1)[2], 3.0);
    }

    #[test]
    fn test_particle_charge_uses_ionization_level() {
        let weights = [2.0, 3.0];
        let levels = [1, 3];
        let source = ChargeSource::new(&weights, 0.5).with_ionization(&levels);
        assert!((source.particle_charge(0) - 1.0).abs() < 1e-15);
        assert!((source.particle_charge(1) - 4.5).abs() < 1e-15);
        assert!((source.total_charge(0, 2) - 5.5).abs() < 1e-15);
    }

    #[test]
    fn test_source_rejects_short_arrays() {
        let weights = [1.0];
        let levels: [i32; 0] = [];
        let err = ChargeSource::new(&weights, 1.0)
            .validate(2)
            .expect_err("short weight array must fail");
        match err {
            DepositionError::PhysicsViolation(msg) => assert!(msg.contains("weight")),
            other => panic!("Unexpected error: {other:?}"),
        }
        let err = ChargeSource::new(&weights, 1.0)
            .with_ionization(&levels)
            .validate(1)
            .expect_err("short ionization array must fail");
        match err {
            DepositionError::PhysicsViolation(msg) => assert!(msg.contains("ionization")),
            other => panic!("Unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_source_rejects_non_finite_charge() {
        let weights = [1.0];
        assert!(ChargeSource::new(&weights, f64::NAN).validate(1).is_err());
    }

    #[test]
    fn test_select_reorders() {
        let batch = ParticleBatch::from_positions(2, &[[1.0, 0.0, 0.0], [2.0, 0.0, 0.0]]);
        let swapped = batch.select(&[1, 0]);
        assert_eq!(swapped.level, 2);
        assert_eq!(swapped.x, vec![2.0, 1.0]);
    }
}
