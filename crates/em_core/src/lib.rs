//! em_core — Core types, configuration, registry/store, and seedable RNG.
//!
//! This crate is **I/O-free**. It defines the stable types/APIs used across the
//! monitor (`em_algo`, `em_pipeline`, `em_report`, `em_cli`).
//!
//! - Identifiers: `CandidateId` (`c<N>`), `DistrictId` (1..N)
//! - Entities: `Candidate`, `District`, `VoteHistoryEntry`, `Anomaly`
//! - Configuration surface with defaults: `MonitorConfig`
//! - Candidate Registry (insertion-ordered, floor of two candidates)
//! - District State Store helpers (initialize, attach/detach candidate keys)
//! - Seedable RNG (ChaCha20) behind the `RandomSource` trait

#![forbid(unsafe_code)]

pub mod config;
pub mod districts;
pub mod entities;
pub mod errors;
pub mod ids;
pub mod registry;
pub mod rng;

pub use config::MonitorConfig;
pub use entities::{
    Anomaly, AnomalyDetail, AnomalyType, Candidate, CandidateData, District, DistrictStatus,
    Severity, Timestamp, VoteHistoryEntry,
};
pub use errors::{ConfigError, CoreError, CoreResult};
pub use ids::{CandidateId, DistrictId};
pub use registry::CandidateRegistry;
pub use rng::{RandomSource, SequenceRng, SimRng};
