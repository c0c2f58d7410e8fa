// ─────────────────────────────────────────────────────────────────────
// SCPN PIC Deposition — Charge Deposition
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Charge density deposition entry points.

use crate::accumulate::{scatter, ScratchSpace};
use crate::coarsen::LevelTarget;
use crate::engine::{DepositOptions, DepositionEngine, Prepared};
use crate::field::MeshField;
use crate::guard::check_footprints;
use crate::kernel::{with_shape, ChargeKernel};
use crate::particles::{ChargeSource, ParticleTile, PositionAccessor};
use pic_math::shape::ShapeFunction;
use pic_types::config::{AccumulationStrategy, ShapeOrder};
use pic_types::error::DepositResult;
use pic_types::geometry::PatchGeometry;
use rayon::prelude::*;

/// One patch of a multi-patch charge deposition.
pub struct ChargeJob<'a, P: ?Sized> {
    pub tile: &'a P,
    pub patch: PatchGeometry,
    pub source: ChargeSource<'a>,
    pub options: DepositOptions,
}

impl<P: ?Sized> Clone for ChargeJob<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: ?Sized> Copy for ChargeJob<'_, P> {}

/// Fully validated charge deposition, footprints included.
pub struct ChargePlan<'a, P: ?Sized> {
    strategy: AccumulationStrategy,
    order: ShapeOrder,
    particles: PositionAccessor<'a, P>,
    source: ChargeSource<'a>,
    rho: &'a MeshField,
    prepared: Prepared,
}

impl<'a, P: ParticleTile + ?Sized> ChargePlan<'a, P> {
    fn kernel<S: ShapeFunction>(&self) -> ChargeKernel<'a, S, P> {
        ChargeKernel::new(
            self.particles,
            self.source,
            self.prepared.geom,
            self.prepared.frames[0],
        )
    }

    pub fn num_particles(&self) -> usize {
        self.prepared.count
    }

    pub fn levels(&self) -> LevelTarget {
        self.prepared.target
    }

    fn check_footprints(&self) -> DepositResult<()> {
        let np = self.prepared.count;
        with_shape!(self.order, S => check_footprints(&self.kernel::<S>(), np))
    }

    /// Scatters the planned particles into `rho`.
    pub fn execute(&self, scratch: &mut ScratchSpace) -> DepositResult<()> {
        let np = self.prepared.count;
        let targets = self.prepared.scatter_targets(&[self.rho]);
        with_shape!(self.order, S => scatter(self.strategy, &self.kernel::<S>(), np, &targets, scratch))
    }
}

impl DepositionEngine {
    /// Validates a charge deposition without writing. `Ok(None)` for an
    /// empty batch.
    pub fn plan_charge<'a, P: ParticleTile + ?Sized>(
        &self,
        tile: &'a P,
        patch: &PatchGeometry,
        source: ChargeSource<'a>,
        rho: &'a MeshField,
        options: &DepositOptions,
    ) -> DepositResult<Option<ChargePlan<'a, P>>> {
        let Some(prepared) = self.prepare("charge", tile, patch, &source, &[rho], options)? else {
            return Ok(None);
        };
        let plan = ChargePlan {
            strategy: self.strategy(),
            order: self.shape_order(),
            particles: PositionAccessor::new(tile, prepared.start),
            source,
            rho,
            prepared,
        };
        plan.check_footprints()?;
        Ok(Some(plan))
    }

    /// Deposits the charge density of `tile` into `rho`.
    pub fn deposit_charge<P: ParticleTile + ?Sized>(
        &self,
        tile: &P,
        patch: &PatchGeometry,
        source: ChargeSource<'_>,
        rho: &MeshField,
        scratch: &mut ScratchSpace,
        options: &DepositOptions,
    ) -> DepositResult<()> {
        match self.plan_charge(tile, patch, source, rho, options)? {
            Some(plan) => plan.execute(scratch),
            None => Ok(()),
        }
    }

    /// Deposits many patches into one shared field, one rayon task per
    /// patch. Every patch is validated before the first one writes.
    pub fn deposit_charge_patches<P: ParticleTile + ?Sized>(
        &self,
        jobs: &[ChargeJob<'_, P>],
        rho: &MeshField,
    ) -> DepositResult<()> {
        let plans = jobs
            .par_iter()
            .map(|job| self.plan_charge(job.tile, &job.patch, job.source, rho, &job.options))
            .collect::<DepositResult<Vec<_>>>()?;
        log::debug!(
            "charge deposition: {} of {} patches non-empty",
            plans.iter().flatten().count(),
            jobs.len()
        );
        plans
            .par_iter()
            .flatten()
            .try_for_each_init(ScratchSpace::new, |scratch, plan| plan.execute(scratch))
    }
}
