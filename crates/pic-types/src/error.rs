use thiserror::Error;

#[derive(Error, Debug)]
pub enum DepositionError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(
        "Deposition guards larger than allocated on axis {axis}: requested {requested}, allocated {allocated}"
    )]
    GuardExceedsAllocation {
        axis: usize,
        requested: i64,
        allocated: i64,
    },

    #[error(
        "Particle shape does not fit within guard cells on axis {axis}: required {required}, available {available}"
    )]
    InsufficientGuard {
        axis: usize,
        required: i64,
        available: i64,
    },

    #[error("Cannot deposit level {level} particles onto level {depos_level}: {message}")]
    LevelMismatch {
        level: usize,
        depos_level: usize,
        message: String,
    },

    #[error("Particle range out of bounds: offset={offset} + count={count} exceeds {available} particles")]
    ParticleRange {
        offset: usize,
        count: usize,
        available: usize,
    },

    #[error("{count} particles have shape footprints outside the deposition box (first at index {first})")]
    ParticlesOutOfRange { count: usize, first: usize },

    #[error("Physics constraint violated: {0}")]
    PhysicsViolation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type DepositResult<T> = Result<T, DepositionError>;
