//! Numerical primitives for SCPN PIC deposition.

pub mod modes;
pub mod shape;
