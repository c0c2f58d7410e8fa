// ─────────────────────────────────────────────────────────────────────
// SCPN PIC Deposition — Deposition Kernels
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Order-specialised charge and current deposition kernels.
//!
//! Each kernel is generic over `S: ShapeFunction`, so the stencil loops
//! run over fixed-size weight arrays. `with_shape!` maps a runtime
//! `ShapeOrder` onto one of the four instantiations.

pub mod charge;
pub mod current;

pub use charge::ChargeKernel;
pub use current::CurrentKernel;

use crate::accumulate::Accumulator;
use pic_math::modes::{mode_components, AzimuthalPhase};
use pic_math::shape::{fractional_index, stencil_start, ShapeFunction};
use pic_types::config::ShapeOrder;
use pic_types::constants::SPACEDIM;
use pic_types::geometry::{Geometry, PatchGeometry};
use pic_types::index::{IndexBox, IntVect};

/// Binds the shape type matching a runtime order to `$S` and evaluates
/// `$body` with it.
macro_rules! with_shape {
    ($order:expr, $S:ident => $body:expr) => {
        match $order {
            pic_types::config::ShapeOrder::Linear => {
                type $S = pic_math::shape::Linear;
                $body
            }
            pic_types::config::ShapeOrder::Quadratic => {
                type $S = pic_math::shape::Quadratic;
                $body
            }
            pic_types::config::ShapeOrder::Cubic => {
                type $S = pic_math::shape::Cubic;
                $body
            }
            pic_types::config::ShapeOrder::Quartic => {
                type $S = pic_math::shape::Quartic;
                $body
            }
        }
    };
}
pub(crate) use with_shape;

/// Geometry shared by all targets of one deposition call.
#[derive(Debug, Clone, Copy)]
pub struct KernelGeometry {
    pub geometry: Geometry,
    pub inv_dx: [f64; SPACEDIM],
    pub invvol: f64,
    pub n_modes: usize,
}

impl KernelGeometry {
    pub fn new(patch: &PatchGeometry, n_modes: usize) -> Self {
        Self {
            geometry: patch.geometry,
            inv_dx: patch.inv_cell_size(),
            invvol: 1.0 / patch.cell_volume(),
            n_modes,
        }
    }

    /// Coordinates along the mesh axes. In r-z the radius replaces x.
    #[inline(always)]
    pub fn mesh_coordinates(&self, p: [f64; SPACEDIM]) -> [f64; SPACEDIM] {
        match self.geometry {
            Geometry::Cylindrical => [p[0].hypot(p[1]), 0.0, p[2]],
            _ => p,
        }
    }
}

/// Writable box of one destination and the physical corner of its `lo`.
#[derive(Debug, Clone, Copy)]
pub struct TargetFrame {
    pub bx: IndexBox,
    pub xyzmin: [f64; SPACEDIM],
}

impl TargetFrame {
    pub fn new(bx: IndexBox, patch: &PatchGeometry) -> Self {
        Self {
            bx,
            xyzmin: patch.corner_of(bx.lo),
        }
    }

    #[inline(always)]
    fn fractional(&self, geom: &KernelGeometry, axis: usize, coord: f64) -> f64 {
        fractional_index(
            coord,
            self.xyzmin[axis],
            geom.inv_dx[axis],
            self.bx.centering.axis(axis),
        )
    }

    #[inline(always)]
    fn axis_shape<S: ShapeFunction>(
        &self,
        geom: &KernelGeometry,
        axis: usize,
        coord: f64,
    ) -> (i64, S::Weights) {
        let (start, w) = S::compute(self.fractional(geom, axis, coord));
        (self.bx.lo[axis] + start, w)
    }

    /// True when the stencil of a particle at mesh coordinates `coords`
    /// stays inside `bx` on every active axis.
    pub fn fits(&self, geom: &KernelGeometry, order: ShapeOrder, coords: [f64; SPACEDIM]) -> bool {
        (0..SPACEDIM)
            .filter(|&axis| geom.geometry.is_active(axis))
            .all(|axis| {
                let x = self.fractional(geom, axis, coords[axis]);
                // Outside this span no stencil fits; rejecting in f64 keeps the
                // integer arithmetic below in range.
                let span = (self.bx.hi[axis] - self.bx.lo[axis]) as f64;
                if !(x >= -1.0 && x <= span + 1.0) {
                    return false;
                }
                let start = stencil_start(order, x);
                start >= 0 && self.bx.lo[axis] + start + order.order() as i64 <= self.bx.hi[axis]
            })
    }
}

/// Scatters `value` into component `comp` with the stencil of `S`.
/// Cartesian geometries only; r-z goes through `scatter_rz`.
#[inline(always)]
pub(crate) fn scatter_cartesian<S: ShapeFunction, A: Accumulator>(
    acc: &mut A,
    frame: &TargetFrame,
    geom: &KernelGeometry,
    comp: usize,
    coords: [f64; SPACEDIM],
    value: f64,
) {
    match geom.geometry {
        Geometry::OneD => scatter_1d::<S, A>(acc, frame, geom, comp, coords, value),
        Geometry::Cartesian2D | Geometry::Cylindrical => {
            scatter_2d::<S, A>(acc, frame, geom, comp, coords, value)
        }
        Geometry::ThreeD => scatter_3d::<S, A>(acc, frame, geom, comp, coords, value),
    }
}

#[inline(always)]
fn scatter_1d<S: ShapeFunction, A: Accumulator>(
    acc: &mut A,
    frame: &TargetFrame,
    geom: &KernelGeometry,
    comp: usize,
    coords: [f64; SPACEDIM],
    value: f64,
) {
    let (k0, sz) = frame.axis_shape::<S>(geom, 2, coords[2]);
    for (dk, &wz) in sz.as_ref().iter().enumerate() {
        acc.add(comp, [0, 0, k0 + dk as i64], wz * value);
    }
}

#[inline(always)]
fn scatter_2d<S: ShapeFunction, A: Accumulator>(
    acc: &mut A,
    frame: &TargetFrame,
    geom: &KernelGeometry,
    comp: usize,
    coords: [f64; SPACEDIM],
    value: f64,
) {
    let (i0, sx) = frame.axis_shape::<S>(geom, 0, coords[0]);
    let (k0, sz) = frame.axis_shape::<S>(geom, 2, coords[2]);
    for (dk, &wz) in sz.as_ref().iter().enumerate() {
        let wzv = wz * value;
        for (di, &wx) in sx.as_ref().iter().enumerate() {
            acc.add(comp, [i0 + di as i64, 0, k0 + dk as i64], wx * wzv);
        }
    }
}

#[inline(always)]
fn scatter_3d<S: ShapeFunction, A: Accumulator>(
    acc: &mut A,
    frame: &TargetFrame,
    geom: &KernelGeometry,
    comp: usize,
    coords: [f64; SPACEDIM],
    value: f64,
) {
    let (i0, sx) = frame.axis_shape::<S>(geom, 0, coords[0]);
    let (j0, sy) = frame.axis_shape::<S>(geom, 1, coords[1]);
    let (k0, sz) = frame.axis_shape::<S>(geom, 2, coords[2]);
    for (dk, &wz) in sz.as_ref().iter().enumerate() {
        for (dj, &wy) in sy.as_ref().iter().enumerate() {
            let wyz = wy * wz * value;
            for (di, &wx) in sx.as_ref().iter().enumerate() {
                acc.add(comp, [i0 + di as i64, j0 + dj as i64, k0 + dk as i64], wx * wyz);
            }
        }
    }
}

/// r-z scatter of a scalar contribution into mode 0 and the real and
/// imaginary components of modes `1..n_modes`.
#[inline(always)]
pub(crate) fn scatter_rz<S: ShapeFunction, A: Accumulator>(
    acc: &mut A,
    frame: &TargetFrame,
    geom: &KernelGeometry,
    coords: [f64; SPACEDIM],
    phase: AzimuthalPhase,
    value: f64,
) {
    let (i0, sr) = frame.axis_shape::<S>(geom, 0, coords[0]);
    let (k0, sz) = frame.axis_shape::<S>(geom, 2, coords[2]);
    for (dk, &wz) in sz.as_ref().iter().enumerate() {
        let wzv = wz * value;
        for (di, &wr) in sr.as_ref().iter().enumerate() {
            let iv: IntVect = [i0 + di as i64, 0, k0 + dk as i64];
            let v = wr * wzv;
            acc.add(0, iv, v);
            for (m, z) in (1..geom.n_modes).zip(phase) {
                let (re, im) = mode_components(m);
                acc.add(re, iv, v * z.re);
                acc.add(im, iv, v * z.im);
            }
        }
    }
}
