//! crates/em_core/src/errors.rs
//! Error kinds shared across the monitor.

use thiserror::Error;

use crate::ids::{CandidateId, DistrictId};

/// Domain errors surfaced by the registry, the district store and the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Candidate-count floor violated or malformed candidate input.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Operation on a candidate id the registry does not hold.
    #[error("candidate not found: {0}")]
    NotFound(CandidateId),

    /// Numeric failure inside one district's tick (isolated by the engine).
    #[error("computation failed for district {district}: {reason}")]
    Computation {
        district: DistrictId,
        reason: String,
    },
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Rejected configuration values (file or flags).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} out of range: {detail}")]
    OutOfRange { field: &'static str, detail: String },

    #[error("unsupported tick interval: {0} ms (expected 1000, 2000 or 5000)")]
    TickInterval(u64),

    #[error("invalid district table: {0}")]
    Districts(String),

    #[error("invalid candidate list: {0}")]
    Candidates(String),

    #[error("config parse error: {0}")]
    Parse(String),
}

impl ConfigError {
    pub(crate) fn range(field: &'static str, detail: impl Into<String>) -> Self {
        ConfigError::OutOfRange { field, detail: detail.into() }
    }
}
