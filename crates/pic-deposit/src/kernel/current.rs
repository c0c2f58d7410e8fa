// ─────────────────────────────────────────────────────────────────────
// SCPN PIC Deposition — Current Kernel
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use super::{scatter_cartesian, scatter_rz, KernelGeometry, TargetFrame};
use crate::accumulate::{Accumulator, ScatterBody};
use crate::particles::{ChargeSource, ParticleTile, PositionAccessor};
use pic_math::modes::AzimuthalPhase;
use pic_math::shape::ShapeFunction;
use pic_types::constants::{INV_C2, SPACEDIM};
use std::marker::PhantomData;

/// Direct current deposition `J_c += q·w·ion·v_c / V` into three
/// component fields, each with its own staggering. In r-z the components
/// are (r, θ, z).
pub struct CurrentKernel<'a, S, P: ?Sized> {
    particles: PositionAccessor<'a, P>,
    source: ChargeSource<'a>,
    geom: KernelGeometry,
    frames: [TargetFrame; SPACEDIM],
    relative_time: f64,
    _shape: PhantomData<S>,
}

impl<'a, S: ShapeFunction, P: ParticleTile + ?Sized> CurrentKernel<'a, S, P> {
    pub fn new(
        particles: PositionAccessor<'a, P>,
        source: ChargeSource<'a>,
        geom: KernelGeometry,
        frames: [TargetFrame; SPACEDIM],
        relative_time: f64,
    ) -> Self {
        Self {
            particles,
            source,
            geom,
            frames,
            relative_time,
            _shape: PhantomData,
        }
    }

    /// Deposition position and velocity of particle `ip`.
    #[inline(always)]
    fn kinematics(&self, ip: usize) -> ([f64; SPACEDIM], [f64; SPACEDIM]) {
        let p = self.particles.position(ip);
        let u = self.particles.momentum(ip);
        let gaminv = 1.0 / (1.0 + (u[0] * u[0] + u[1] * u[1] + u[2] * u[2]) * INV_C2).sqrt();
        let v = [u[0] * gaminv, u[1] * gaminv, u[2] * gaminv];
        let dt = self.relative_time;
        ([p[0] + dt * v[0], p[1] + dt * v[1], p[2] + dt * v[2]], v)
    }
}

impl<S: ShapeFunction, P: ParticleTile + ?Sized> ScatterBody for CurrentKernel<'_, S, P> {
    #[inline]
    fn run<A: Accumulator>(&self, ip: usize, targets: &mut [A]) {
        let (p, v) = self.kinematics(ip);
        let wq = self.source.particle_charge(self.particles.offset() + ip) * self.geom.invvol;
        let coords = self.geom.mesh_coordinates(p);
        if self.geom.geometry.is_cylindrical() {
            let phase = AzimuthalPhase::from_cartesian(p[0], p[1]);
            let (c, s) = phase.cos_sin();
            let vr = c * v[0] + s * v[1];
            let vt = -s * v[0] + c * v[1];
            for ((acc, frame), vc) in targets.iter_mut().zip(&self.frames).zip([vr, vt, v[2]]) {
                scatter_rz::<S, A>(acc, frame, &self.geom, coords, phase, wq * vc);
            }
        } else {
            for ((acc, frame), vc) in targets.iter_mut().zip(&self.frames).zip(v) {
                scatter_cartesian::<S, A>(acc, frame, &self.geom, 0, coords, wq * vc);
            }
        }
    }

    fn fits(&self, ip: usize) -> bool {
        let (p, _) = self.kinematics(ip);
        let coords = self.geom.mesh_coordinates(p);
        self.frames
            .iter()
            .all(|frame| frame.fits(&self.geom, S::ORDER, coords))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accumulate::LocalBuffer;
    use crate::particles::ParticleBatch;
    use pic_math::shape::Linear;
    use pic_types::constants::SPEED_OF_LIGHT;
    use pic_types::geometry::{Geometry, PatchGeometry};
    use pic_types::index::{Centering, IndexBox};
    use std::array;

    fn setup(geometry: Geometry) -> (PatchGeometry, [IndexBox; 3]) {
        let patch = PatchGeometry::new(
            geometry,
            0,
            IndexBox::cells([0, 0, 0], [7, 7, 7]),
            [1.0, 1.0, 1.0],
            [0.0, 0.0, 0.0],
        )
        .expect("valid patch");
        let boxes = array::from_fn(|c| {
            patch
                .tile_box
                .convert(geometry.normalize_centering(Centering::yee_current(c)))
                .grow(geometry.mask([1, 1, 1]))
        });
        (patch, boxes)
    }

    fn deposit(
        geometry: Geometry,
        n_modes: usize,
        batch: &ParticleBatch,
        relative_time: f64,
    ) -> Vec<LocalBuffer> {
        let (patch, boxes) = setup(geometry);
        let weights = vec![1.0; batch.len()];
        let kernel: CurrentKernel<'_, Linear, ParticleBatch> = CurrentKernel::new(
            PositionAccessor::new(batch, 0),
            ChargeSource::new(&weights, 1.0),
            KernelGeometry::new(&patch, n_modes),
            array::from_fn(|c| TargetFrame::new(boxes[c], &patch)),
            relative_time,
        );
        let mut bufs: Vec<LocalBuffer> = boxes
            .iter()
            .map(|bx| {
                let mut b = LocalBuffer::default();
                b.resize_zeroed(*bx, geometry.num_components(n_modes));
                b
            })
            .collect();
        for ip in 0..batch.len() {
            assert!(kernel.fits(ip));
            kernel.run(ip, &mut bufs[..]);
        }
        bufs
    }

    #[test]
    fn test_current_totals_equal_charge_times_velocity() {
        let mut batch = ParticleBatch::new(0);
        let u = [0.1 * SPEED_OF_LIGHT, -0.2 * SPEED_OF_LIGHT, 0.3 * SPEED_OF_LIGHT];
        batch.push([3.2, 4.1, 2.7], u);
        let bufs = deposit(Geometry::ThreeD, 0, &batch, 0.0);
        let gaminv = 1.0 / (1.0f64 + 0.01 + 0.04 + 0.09).sqrt();
        for c in 0..3 {
            let expect = u[c] * gaminv;
            assert!(
                (bufs[c].sum() - expect).abs() < 1e-12 * SPEED_OF_LIGHT,
                "component {c}: {} vs {expect}",
                bufs[c].sum()
            );
        }
    }

    #[test]
    fn test_yee_staggering_shifts_jx() {
        let mut batch = ParticleBatch::new(0);
        batch.push([3.0, 0.0, 2.0], [1.0, 0.0, 0.0]);
        let bufs = deposit(Geometry::Cartesian2D, 0, &batch, 0.0);
        // jx is cell-centred in x: x = 3.0 sits between cells 2 and 3.
        assert!((bufs[0].get(0, [2, 0, 2]) - 0.5 * bufs[0].sum()).abs() < 1e-12);
        assert!((bufs[0].get(0, [3, 0, 2]) - 0.5 * bufs[0].sum()).abs() < 1e-12);
        assert_eq!(bufs[1].sum(), 0.0);
        assert_eq!(bufs[2].sum(), 0.0);
    }

    #[test]
    fn test_relative_time_moves_deposit() {
        let mut batch = ParticleBatch::new(0);
        batch.push([0.0, 0.0, 4.0], [0.0, 0.0, 1.0]);
        let at_rest = deposit(Geometry::OneD, 0, &batch, 0.0);
        let shifted = deposit(Geometry::OneD, 0, &batch, 1.0);
        // jz is cell-centred along z in 1D: z = 4.0 splits cells 3 and 4,
        // z = 5.0 (after one second at 1 m/s) splits cells 4 and 5.
        assert!(at_rest[2].get(0, [0, 0, 3]) > 0.0);
        assert_eq!(shifted[2].get(0, [0, 0, 3]), 0.0);
        assert!(shifted[2].get(0, [0, 0, 5]) > 0.0);
    }

    #[test]
    fn test_rz_projects_velocity_onto_r_theta() {
        let mut batch = ParticleBatch::new(0);
        // Particle on the y axis moving along +x: radial velocity 0,
        // azimuthal velocity -vx.
        batch.push([0.0, 3.0, 2.0], [1.0, 0.0, 0.0]);
        let bufs = deposit(Geometry::Cylindrical, 1, &batch, 0.0);
        assert!(bufs[0].sum().abs() < 1e-12);
        assert!((bufs[1].sum() + 1.0).abs() < 1e-9);
        assert_eq!(bufs[2].sum(), 0.0);
    }
}
