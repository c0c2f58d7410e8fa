// ─────────────────────────────────────────────────────────────────────
// SCPN PIC Deposition — Charge Kernel
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
use std::marker::PhantomData;

/// Charge density kernel: `ρ += q·w·ion / V` spread with shape `S`.
pub struct ChargeKernel<'a, S, P: ?Sized> {
    particles: PositionAccessor<'a, P>,
    source: ChargeSource<'a>,
    geom: KernelGeometry,
    frame: TargetFrame,
    _shape: PhantomData<S>,
}

impl<'a, S: ShapeFunction, P: ParticleTile + ?Sized> ChargeKernel<'a, S, P> {
    /// `source` is indexed by absolute particle index, `particles` carries
    /// the start offset.
    pub fn new(
        particles: PositionAccessor<'a, P>,
        source: ChargeSource<'a>,
        geom: KernelGeometry,
        frame: TargetFrame,
    ) -> Self {
        Self {
            particles,
            source,
            geom,
            frame,
            _shape: PhantomData,
        }
    }
}

impl<S: ShapeFunction, P: ParticleTile + ?Sized> ScatterBody for ChargeKernel<'_, S, P> {
    #[inline]
    fn run<A: Accumulator>(&self, ip: usize, targets: &mut [A]) {
        let Some(acc) = targets.first_mut() else {
            return;
        };
        let p = self.particles.position(ip);
        let wq = self.source.particle_charge(self.particles.offset() + ip) * self.geom.invvol;
        let coords = self.geom.mesh_coordinates(p);
        if self.geom.geometry.is_cylindrical() {
            let phase = AzimuthalPhase::from_cartesian(p[0], p[1]);
            scatter_rz::<S, A>(acc, &self.frame, &self.geom, coords, phase, wq);
        } else {
            scatter_cartesian::<S, A>(acc, &self.frame, &self.geom, 0, coords, wq);
        }
    }

    fn fits(&self, ip: usize) -> bool {
        let coords = self.geom.mesh_coordinates(self.particles.position(ip));
        self.frame.fits(&self.geom, S::ORDER, coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accumulate::LocalBuffer;
    use crate::particles::ParticleBatch;
    use pic_math::shape::{Cubic, Linear};
    use pic_types::geometry::{Geometry, PatchGeometry};
    use pic_types::index::{Centering, IndexBox};

    fn patch(geometry: Geometry) -> PatchGeometry {
        PatchGeometry::new(
            geometry,
            0,
            IndexBox::cells([0, 0, 0], [7, 7, 7]),
            [1.0, 1.0, 1.0],
            [0.0, 0.0, 0.0],
        )
        .expect("valid patch")
    }

    fn run_one<S: ShapeFunction>(geometry: Geometry, n_modes: usize, p: [f64; 3]) -> LocalBuffer {
        let patch = patch(geometry);
        let bx = patch
            .tile_box
            .convert(geometry.normalize_centering(Centering::NODAL))
            .grow(geometry.mask([2, 2, 2]));
        let batch = ParticleBatch::from_positions(0, &[p]);
        let weights = [1.0];
        let kernel: ChargeKernel<'_, S, ParticleBatch> = ChargeKernel::new(
            PositionAccessor::new(&batch, 0),
            ChargeSource::new(&weights, 1.0),
            KernelGeometry::new(&patch, n_modes),
            TargetFrame::new(bx, &patch),
        );
        assert!(kernel.fits(0));
        let mut bufs = vec![LocalBuffer::default()];
        bufs[0].resize_zeroed(bx, geometry.num_components(n_modes));
        kernel.run(0, &mut bufs[..]);
        bufs.remove(0)
    }

    #[test]
    fn test_3d_linear_cell_centre() {
        let buf = run_one::<Linear>(Geometry::ThreeD, 0, [2.5, 3.5, 4.5]);
        assert!((buf.get(0, [2, 3, 4]) - 0.125).abs() < 1e-15);
        assert!((buf.get(0, [3, 4, 5]) - 0.125).abs() < 1e-15);
        assert!((buf.sum() - 1.0).abs() < 1e-14);
    }

    #[test]
    fn test_2d_cubic_conserves_charge() {
        let buf = run_one::<Cubic>(Geometry::Cartesian2D, 0, [3.3, 100.0, 2.7]);
        assert!((buf.sum() - 1.0).abs() < 1e-14);
        let (mx, mz) = buf.bx().iter().fold((0.0, 0.0), |(mx, mz), iv| {
            let v = buf.get(0, iv);
            (mx + v * iv[0] as f64, mz + v * iv[2] as f64)
        });
        assert!((mx - 3.3).abs() < 1e-12, "x moment {mx}");
        assert!((mz - 2.7).abs() < 1e-12, "z moment {mz}");
    }

    #[test]
    fn test_rz_modes_carry_phase() {
        // θ = π/2: mode 1 is purely imaginary, mode 2 purely real and negative.
        let buf = run_one::<Linear>(Geometry::Cylindrical, 3, [0.0, 2.0, 3.0]);
        let iv = [2, 0, 3];
        let m0 = buf.get(0, iv);
        assert!((m0 - 1.0).abs() < 1e-14);
        assert!(buf.get(1, iv).abs() < 1e-14);
        assert!((buf.get(2, iv) - m0).abs() < 1e-14);
        assert!((buf.get(3, iv) + m0).abs() < 1e-14);
        assert!(buf.get(4, iv).abs() < 1e-14);
    }

    #[test]
    fn test_ionization_scales_charge() {
        let patch = patch(Geometry::OneD);
        let bx = patch
            .tile_box
            .convert(Geometry::OneD.normalize_centering(Centering::NODAL))
            .grow([0, 0, 1]);
        let batch = ParticleBatch::from_positions(0, &[[0.0, 0.0, 1.0], [0.0, 0.0, 2.0]]);
        let weights = [1.0, 1.0];
        let levels = [2, 3];
        let kernel: ChargeKernel<'_, Linear, ParticleBatch> = ChargeKernel::new(
            PositionAccessor::new(&batch, 1),
            ChargeSource::new(&weights, 0.5).with_ionization(&levels),
            KernelGeometry::new(&patch, 0),
            TargetFrame::new(bx, &patch),
        );
        let mut bufs = vec![LocalBuffer::default()];
        bufs[0].resize_zeroed(bx, 1);
        kernel.run(0, &mut bufs[..]);
        assert!((bufs[0].get(0, [0, 0, 2]) - 1.5).abs() < 1e-15);
    }
}
