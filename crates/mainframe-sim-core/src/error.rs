//! Error taxonomy for the simulation core.
//!
//! The core has almost no recoverable surface: configuration problems are
//! rejected before the driver starts, and everything else is an invariant
//! violation that stops the simulation.

use thiserror::Error;

/// Rejected simulation configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("LPAR list is empty")]
    EmptyLparList,

    #[error("invalid LPAR identifier {0:?}: must be a non-empty token without whitespace")]
    InvalidLpar(String),

    #[error("LPAR {0:?} is listed more than once")]
    DuplicateLpar(String),

    #[error("invalid sysplex identifier {0:?}: must be a non-empty token without whitespace")]
    InvalidSysplex(String),

    #[error("tick interval must be a positive, representable number of seconds, got {0}")]
    InvalidInterval(f64),
}

/// Fatal conditions raised while initializing or running the simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("degenerate bounds [{lo}, {hi}]")]
    DegenerateBounds { lo: f64, hi: f64 },

    #[error("LPAR {lpar}: {field} = {value} escaped its declared interval")]
    InvariantViolated {
        lpar: String,
        field: &'static str,
        value: f64,
    },

    #[error("non-finite or negative sampler input {what} = {value}")]
    NonFiniteInput { what: &'static str, value: f64 },

    #[error("latency distribution: {0}")]
    Distribution(String),
}

pub type Result<T, E = SimError> = std::result::Result<T, E>;
