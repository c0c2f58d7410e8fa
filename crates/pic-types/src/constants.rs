// ─────────────────────────────────────────────────────────────────────
// SCPN PIC Deposition — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
/// Speed of light in vacuum (m/s)
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// 1 / c^2 (s^2/m^2), used for the Lorentz factor from momentum γv.
pub const INV_C2: f64 = 1.0 / (SPEED_OF_LIGHT * SPEED_OF_LIGHT);

/// Elementary charge (C)
pub const Q_ELECTRON: f64 = 1.602176634e-19;

/// Number of spatial axes carried by every index vector.
/// Inactive axes of lower-dimensional geometries hold a single point.
pub const SPACEDIM: usize = 3;

/// Highest supported particle shape order.
pub const MAX_SHAPE_ORDER: usize = 4;
