//! Particle-to-mesh charge and current deposition.
//!
//! `DepositionEngine` validates a deposition call, picks the kernel
//! specialised for the configured shape order and scatters through the
//! configured accumulation strategy into a shared `MeshField`.

pub mod accumulate;
pub mod charge;
pub mod coarsen;
pub mod current;
pub mod engine;
pub mod field;
pub mod guard;
pub mod kernel;
pub mod particles;
pub mod rz;

pub use accumulate::ScratchSpace;
pub use charge::{ChargeJob, ChargePlan};
pub use current::{CurrentJob, CurrentPlan};
pub use engine::{DepositOptions, DepositionEngine};
pub use field::MeshField;
pub use particles::{ChargeSource, ParticleBatch, ParticleTile};
