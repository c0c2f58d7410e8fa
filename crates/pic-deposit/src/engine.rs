// ─────────────────────────────────────────────────────────────────────
// SCPN PIC Deposition — Deposition Engine
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Engine state and the validation shared by charge and current deposition.
//!
//! Every check runs before the first write, in this order: geometry
//! agreement, guard allocation, particle range, per-particle arrays,
//! level and ratio, component range, empty batch, guard availability.
//! The footprint pre-pass follows once the kernel is built.

use crate::accumulate::ScatterTarget;
use crate::coarsen::{resolve_target, LevelTarget};
use crate::field::MeshField;
use crate::guard::{check_available, check_guard_allocation, shape_extent};
use crate::kernel::{KernelGeometry, TargetFrame};
use crate::particles::{ChargeSource, ParticleTile};
use pic_types::config::{AccumulationStrategy, DepositionConfig, ShapeOrder};
use pic_types::error::{DepositResult, DepositionError};
use pic_types::geometry::{Geometry, PatchGeometry};
use pic_types::index::IntVect;

/// Per-call parameters. Every field has a neutral default.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DepositOptions {
    /// Deposition guards; falls back to the configured guards, then to the
    /// field's allocated guard.
    pub guard_override: Option<IntVect>,
    /// Target level, the particle level or the one below it.
    pub depos_level: Option<usize>,
    /// Refinement ratio between the two levels when they differ.
    pub ref_ratio: Option<IntVect>,
    pub offset: usize,
    /// Particles to deposit; the rest of the tile after `offset` if unset.
    pub count: Option<usize>,
    /// Component slot. The first component written is
    /// `component_offset * component_count`.
    pub component_offset: usize,
    pub component_count: Option<usize>,
    /// Current deposition only: positions are advanced by
    /// `relative_time * v` before depositing.
    pub relative_time: f64,
}

impl DepositOptions {
    pub fn with_guards(mut self, guards: IntVect) -> Self {
        self.guard_override = Some(guards);
        self
    }

    pub fn onto_level(mut self, depos_level: usize, ref_ratio: IntVect) -> Self {
        self.depos_level = Some(depos_level);
        self.ref_ratio = Some(ref_ratio);
        self
    }

    pub fn with_range(mut self, offset: usize, count: usize) -> Self {
        self.offset = offset;
        self.count = Some(count);
        self
    }

    pub fn with_component_slot(mut self, slot: usize) -> Self {
        self.component_offset = slot;
        self
    }

    pub fn with_component_count(mut self, count: usize) -> Self {
        self.component_count = Some(count);
        self
    }

    pub fn with_relative_time(mut self, relative_time: f64) -> Self {
        self.relative_time = relative_time;
        self
    }
}

/// Deposition engine bound to one validated configuration. The
/// accumulation strategy is fixed for the engine's lifetime.
#[derive(Debug, Clone)]
pub struct DepositionEngine {
    config: DepositionConfig,
}

/// Validated deposition call, ready for kernel construction.
#[derive(Debug, Clone)]
pub(crate) struct Prepared {
    pub target: LevelTarget,
    pub geom: KernelGeometry,
    pub frames: Vec<TargetFrame>,
    pub start: usize,
    pub count: usize,
    pub comp_start: usize,
    pub ncomp: usize,
}

impl Prepared {
    pub fn scatter_targets<'a>(&self, fields: &[&'a MeshField]) -> Vec<ScatterTarget<'a>> {
        fields
            .iter()
            .zip(&self.frames)
            .map(|(&field, frame)| ScatterTarget {
                field,
                deposit_box: frame.bx,
                comp_start: self.comp_start,
                ncomp: self.ncomp,
            })
            .collect()
    }
}

impl DepositionEngine {
    pub fn new(config: DepositionConfig) -> DepositResult<Self> {
        config.validate()?;
        log::debug!(
            "deposition engine: {:?}, order {}, {:?}, {} azimuthal modes",
            config.geometry,
            config.shape_order.order(),
            config.strategy,
            config.n_rz_azimuthal_modes
        );
        Ok(Self { config })
    }

    pub fn config(&self) -> &DepositionConfig {
        &self.config
    }

    pub fn geometry(&self) -> Geometry {
        self.config.geometry
    }

    pub fn shape_order(&self) -> ShapeOrder {
        self.config.shape_order
    }

    pub fn strategy(&self) -> AccumulationStrategy {
        self.config.strategy
    }

    /// Runs every pre-write check. `Ok(None)` means there is nothing to
    /// deposit.
    pub(crate) fn prepare<P: ParticleTile + ?Sized>(
        &self,
        kind: &str,
        tile: &P,
        patch: &PatchGeometry,
        source: &ChargeSource<'_>,
        fields: &[&MeshField],
        options: &DepositOptions,
    ) -> DepositResult<Option<Prepared>> {
        let geometry = self.config.geometry;
        if patch.geometry != geometry {
            return Err(DepositionError::ConfigError(format!(
                "patch geometry {:?} does not match engine geometry {geometry:?}",
                patch.geometry
            )));
        }
        if let Some(field) = fields.iter().find(|f| f.geometry() != geometry) {
            return Err(DepositionError::ConfigError(format!(
                "field geometry {:?} does not match engine geometry {geometry:?}",
                field.geometry()
            )));
        }
        if tile.level() != patch.level {
            return Err(DepositionError::ConfigError(format!(
                "tile level {} does not match patch level {}",
                tile.level(),
                patch.level
            )));
        }

        let requested = options.guard_override.or(self.config.deposition_guards);
        let guards = fields
            .iter()
            .map(|field| {
                let ng = requested.map_or(field.guard(), |g| geometry.mask(g));
                check_guard_allocation(ng, field.guard())?;
                Ok(ng)
            })
            .collect::<DepositResult<Vec<IntVect>>>()?;

        let np = tile.num_particles();
        let start = options.offset;
        let count = options.count.unwrap_or(np.saturating_sub(start));
        let end = start
            .checked_add(count)
            .filter(|&end| end <= np)
            .ok_or(DepositionError::ParticleRange {
                offset: start,
                count,
                available: np,
            })?;
        source.validate(end)?;
        if let Some(bad) = source.weights[start..end].iter().position(|w| !w.is_finite()) {
            return Err(DepositionError::PhysicsViolation(format!(
                "particle {} has a non-finite weight",
                start + bad
            )));
        }

        let target = resolve_target(geometry, tile.level(), options.depos_level, options.ref_ratio)?;

        let required = self.config.num_components();
        let slot = options.component_count.unwrap_or(required);
        if slot < required {
            return Err(DepositionError::ConfigError(format!(
                "component slot of {slot} cannot hold the {required} components of {geometry:?}"
            )));
        }
        let comp_start = options.component_offset * slot;
        if let Some(field) = fields.iter().find(|f| comp_start + required > f.ncomp()) {
            return Err(DepositionError::ConfigError(format!(
                "components {comp_start}..{} exceed field component count {}",
                comp_start + required,
                field.ncomp()
            )));
        }

        if count == 0 {
            log::debug!("{kind} deposition: empty batch on level {}", tile.level());
            return Ok(None);
        }

        let strategy = self.config.strategy;
        let extent = shape_extent(self.config.shape_order, geometry);
        for (field, ng) in fields.iter().zip(&guards) {
            let available = match strategy {
                AccumulationStrategy::BufferedMerge => *ng,
                AccumulationStrategy::DirectScatter => field.guard(),
            };
            check_available(available, extent)?;
        }

        let depos_patch = target.deposition_patch(patch);
        let frames = fields
            .iter()
            .zip(&guards)
            .map(|(field, ng)| {
                let bx = match strategy {
                    AccumulationStrategy::BufferedMerge => {
                        depos_patch.tile_box.convert(field.centering()).grow(*ng)
                    }
                    AccumulationStrategy::DirectScatter => field.fab_box(),
                };
                if !field.fab_box().contains_box(&bx) {
                    return Err(DepositionError::ConfigError(format!(
                        "deposition box {bx:?} lies outside the field box {:?}",
                        field.fab_box()
                    )));
                }
                Ok(TargetFrame::new(bx, &depos_patch))
            })
            .collect::<DepositResult<Vec<TargetFrame>>>()?;

        log::debug!(
            "{kind} deposition: {count} particles from level {} onto level {}, order {}, {strategy:?}",
            target.level,
            target.depos_level,
            self.config.shape_order.order()
        );
        Ok(Some(Prepared {
            target,
            geom: KernelGeometry::new(&depos_patch, self.config.n_rz_azimuthal_modes),
            frames,
            start,
            count,
            comp_start,
            ncomp: required,
        }))
    }
}
