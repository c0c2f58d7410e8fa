// ─────────────────────────────────────────────────────────────────────
// SCPN PIC Deposition — Shape Functions
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! B-spline particle shape factors of order 1 to 4.
//!
//! `x` is the particle position expressed as a fractional index of the
//! target samples (already shifted by 0.5 for cell-centred axes). Each
//! shape returns the index of the first stencil point together with the
//! `order + 1` weights, which are non-negative and sum to one.

use pic_types::config::ShapeOrder;
use pic_types::index::IndexType;

/// Compile-time particle shape. One zero-sized implementor per order keeps
/// the stencil width fixed inside the deposition loops.
pub trait ShapeFunction: Copy + Send + Sync + 'static {
    const ORDER: ShapeOrder;
    type Weights: Copy + AsRef<[f64]>;

    fn compute(x: f64) -> (i64, Self::Weights);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Linear;

#[derive(Debug, Clone, Copy, Default)]
pub struct Quadratic;

#[derive(Debug, Clone, Copy, Default)]
pub struct Cubic;

#[derive(Debug, Clone, Copy, Default)]
pub struct Quartic;

impl ShapeFunction for Linear {
    const ORDER: ShapeOrder = ShapeOrder::Linear;
    type Weights = [f64; 2];

    #[inline(always)]
    fn compute(x: f64) -> (i64, [f64; 2]) {
        let i = x.floor();
        let xint = x - i;
        (i as i64, [1.0 - xint, xint])
    }
}

impl ShapeFunction for Quadratic {
    const ORDER: ShapeOrder = ShapeOrder::Quadratic;
    type Weights = [f64; 3];

    #[inline(always)]
    fn compute(x: f64) -> (i64, [f64; 3]) {
        let i = x.round();
        let xint = x - i;
        (
            i as i64 - 1,
            [
                0.5 * (0.5 - xint) * (0.5 - xint),
                0.75 - xint * xint,
                0.5 * (0.5 + xint) * (0.5 + xint),
            ],
        )
    }
}

impl ShapeFunction for Cubic {
    const ORDER: ShapeOrder = ShapeOrder::Cubic;
    type Weights = [f64; 4];

    #[inline(always)]
    fn compute(x: f64) -> (i64, [f64; 4]) {
        let i = x.floor();
        let xint = x - i;
        let oxint = 1.0 - xint;
        let xint2 = xint * xint;
        let oxint2 = oxint * oxint;
        (
            i as i64 - 1,
            [
                (1.0 / 6.0) * oxint2 * oxint,
                2.0 / 3.0 - xint2 + 0.5 * xint2 * xint,
                2.0 / 3.0 - oxint2 + 0.5 * oxint2 * oxint,
                (1.0 / 6.0) * xint2 * xint,
            ],
        )
    }
}

impl ShapeFunction for Quartic {
    const ORDER: ShapeOrder = ShapeOrder::Quartic;
    type Weights = [f64; 5];

    #[inline(always)]
    fn compute(x: f64) -> (i64, [f64; 5]) {
        let i = x.round();
        let xint = x - i;
        let xint2 = xint * xint;
        let xint3 = xint2 * xint;
        let xint4 = xint2 * xint2;
        let lo = 0.5 - xint;
        let hi = 0.5 + xint;
        (
            i as i64 - 2,
            [
                (1.0 / 24.0) * lo * lo * lo * lo,
                19.0 / 96.0 - 11.0 / 24.0 * xint + 0.25 * xint2 + xint3 / 6.0 - xint4 / 6.0,
                115.0 / 192.0 - 5.0 / 8.0 * xint2 + 0.25 * xint4,
                19.0 / 96.0 + 11.0 / 24.0 * xint + 0.25 * xint2 - xint3 / 6.0 - xint4 / 6.0,
                (1.0 / 24.0) * hi * hi * hi * hi,
            ],
        )
    }
}

/// Fractional index of `position` relative to `lower` (the physical corner
/// of index 0 of the target box) for samples of type `index_type`.
#[inline(always)]
pub fn fractional_index(position: f64, lower: f64, inv_dx: f64, index_type: IndexType) -> f64 {
    (position - lower) * inv_dx - index_type.offset()
}

/// First stencil index for `order` at fractional index `x`, without
/// evaluating the weights. Agrees with `ShapeFunction::compute` for finite
/// `x` in range; saturates at the `i64` limits otherwise.
pub fn stencil_start(order: ShapeOrder, x: f64) -> i64 {
    match order {
        ShapeOrder::Linear => x.floor() as i64,
        ShapeOrder::Quadratic => (x.round() as i64).saturating_sub(1),
        ShapeOrder::Cubic => (x.floor() as i64).saturating_sub(1),
        ShapeOrder::Quartic => (x.round() as i64).saturating_sub(2),
    }
}

/// Runtime-dispatched shape evaluation for diagnostics and tests. The
/// deposition kernels use the `ShapeFunction` implementors directly.
pub fn shape_weights(order: ShapeOrder, x: f64) -> (i64, Vec<f64>) {
    match order {
        ShapeOrder::Linear => {
            let (i, w) = Linear::compute(x);
            (i, w.to_vec())
        }
        ShapeOrder::Quadratic => {
            let (i, w) = Quadratic::compute(x);
            (i, w.to_vec())
        }
        ShapeOrder::Cubic => {
            let (i, w) = Cubic::compute(x);
            (i, w.to_vec())
        }
        ShapeOrder::Quartic => {
            let (i, w) = Quartic::compute(x);
            (i, w.to_vec())
        }
    }
}
