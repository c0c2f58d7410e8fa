// ─────────────────────────────────────────────────────────────────────
// SCPN PIC Deposition — Current Deposition
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Direct current density deposition entry points.

use crate::accumulate::{scatter, ScratchSpace};
use crate::engine::{DepositOptions, DepositionEngine, Prepared};
use crate::field::MeshField;
use crate::guard::check_footprints;
use crate::kernel::{with_shape, CurrentKernel, TargetFrame};
use crate::particles::{ChargeSource, ParticleTile, PositionAccessor};
use pic_math::shape::ShapeFunction;
use pic_types::config::{AccumulationStrategy, ShapeOrder};
use pic_types::constants::SPACEDIM;
use pic_types::error::{DepositResult, DepositionError};
use pic_types::geometry::PatchGeometry;
use rayon::prelude::*;
use std::array;

/// One patch of a multi-patch current deposition.
pub struct CurrentJob<'a, P: ?Sized> {
    pub tile: &'a P,
    pub patch: PatchGeometry,
    pub source: ChargeSource<'a>,
    pub options: DepositOptions,
}

impl<P: ?Sized> Clone for CurrentJob<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: ?Sized> Copy for CurrentJob<'_, P> {}

/// Fully validated current deposition into `[jx, jy, jz]` (or
/// `[jr, jθ, jz]` in r-z).
pub struct CurrentPlan<'a, P: ?Sized> {
    strategy: AccumulationStrategy,
    order: ShapeOrder,
    particles: PositionAccessor<'a, P>,
    source: ChargeSource<'a>,
    j: [&'a MeshField; SPACEDIM],
    relative_time: f64,
    prepared: Prepared,
}

impl<'a, P: ParticleTile + ?Sized> CurrentPlan<'a, P> {
    fn kernel<S: ShapeFunction>(&self) -> CurrentKernel<'a, S, P> {
        let frames: [TargetFrame; SPACEDIM] = array::from_fn(|c| self.prepared.frames[c]);
        CurrentKernel::new(
            self.particles,
            self.source,
            self.prepared.geom,
            frames,
            self.relative_time,
        )
    }

    pub fn num_particles(&self) -> usize {
        self.prepared.count
    }

    fn check_footprints(&self) -> DepositResult<()> {
        let np = self.prepared.count;
        with_shape!(self.order, S => check_footprints(&self.kernel::<S>(), np))
    }

    pub fn execute(&self, scratch: &mut ScratchSpace) -> DepositResult<()> {
        let np = self.prepared.count;
        let targets = self.prepared.scatter_targets(&self.j);
        with_shape!(self.order, S => scatter(self.strategy, &self.kernel::<S>(), np, &targets, scratch))
    }
}

impl DepositionEngine {
    pub fn plan_current<'a, P: ParticleTile + ?Sized>(
        &self,
        tile: &'a P,
        patch: &PatchGeometry,
        source: ChargeSource<'a>,
        j: [&'a MeshField; SPACEDIM],
        options: &DepositOptions,
    ) -> DepositResult<Option<CurrentPlan<'a, P>>> {
        if !options.relative_time.is_finite() {
            return Err(DepositionError::PhysicsViolation(format!(
                "relative_time must be finite, got {}",
                options.relative_time
            )));
        }
        let Some(prepared) = self.prepare("current", tile, patch, &source, &j, options)? else {
            return Ok(None);
        };
        let plan = CurrentPlan {
            strategy: self.strategy(),
            order: self.shape_order(),
            particles: PositionAccessor::new(tile, prepared.start),
            source,
            j,
            relative_time: options.relative_time,
            prepared,
        };
        plan.check_footprints()?;
        Ok(Some(plan))
    }

    /// Deposits the current density of `tile` into the three component
    /// fields `j`.
    pub fn deposit_current<P: ParticleTile + ?Sized>(
        &self,
        tile: &P,
        patch: &PatchGeometry,
        source: ChargeSource<'_>,
        j: [&MeshField; SPACEDIM],
        scratch: &mut ScratchSpace,
        options: &DepositOptions,
    ) -> DepositResult<()> {
        match self.plan_current(tile, patch, source, j, options)? {
            Some(plan) => plan.execute(scratch),
            None => Ok(()),
        }
    }

    pub fn deposit_current_patches<P: ParticleTile + ?Sized>(
        &self,
        jobs: &[CurrentJob<'_, P>],
        j: [&MeshField; SPACEDIM],
    ) -> DepositResult<()> {
        let plans = jobs
            .par_iter()
            .map(|job| self.plan_current(job.tile, &job.patch, job.source, j, &job.options))
            .collect::<DepositResult<Vec<_>>>()?;
        plans
            .par_iter()
            .flatten()
            .try_for_each_init(ScratchSpace::new, |scratch, plan| plan.execute(scratch))
    }
}
