// ─────────────────────────────────────────────────────────────────────
// SCPN PIC Deposition — Azimuthal Modes
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Azimuthal Fourier phases for r-z deposition.
//!
//! Component layout of a scalar field with `n` modes: component 0 holds
//! mode 0, components `2m - 1` and `2m` hold the real and imaginary part
//! of mode `m` for `m = 1..n`.

use num_complex::Complex64;

const MIN_RADIUS: f64 = 1e-300;

/// Iterator over `e^{i m θ}` for `m = 1, 2, ...`.
#[derive(Debug, Clone, Copy)]
pub struct AzimuthalPhase {
    base: Complex64,
    current: Complex64,
}

impl AzimuthalPhase {
    /// Phase of the point `(x, y)`. On the axis θ is taken as 0.
    pub fn from_cartesian(x: f64, y: f64) -> Self {
        let r = x.hypot(y);
        let base = if r > MIN_RADIUS {
            Complex64::new(x / r, y / r)
        } else {
            Complex64::new(1.0, 0.0)
        };
        Self {
            base,
            current: Complex64::new(1.0, 0.0),
        }
    }

    pub fn from_angle(theta: f64) -> Self {
        Self {
            base: Complex64::new(theta.cos(), theta.sin()),
            current: Complex64::new(1.0, 0.0),
        }
    }

    /// `(cos θ, sin θ)`.
    pub fn cos_sin(&self) -> (f64, f64) {
        (self.base.re, self.base.im)
    }
}

impl Iterator for AzimuthalPhase {
    type Item = Complex64;

    fn next(&mut self) -> Option<Complex64> {
        self.current *= self.base;
        Some(self.current)
    }
}

/// Components holding the real and imaginary parts of mode `m >= 1`.
pub fn mode_components(m: usize) -> (usize, usize) {
    (2 * m - 1, 2 * m)
}
