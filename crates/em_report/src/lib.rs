//! em_report — read-only dashboard model + renderers (JSON/text).
//!
//! - No I/O and no clock; callers pass the monitor's current state.
//! - Stable section order: summary → candidates → districts → anomalies → trend.

#![deny(unsafe_code)]

pub mod structure;
#[cfg(feature = "render_json")]
pub mod render_json;
#[cfg(feature = "render_text")]
pub mod render_text;

pub use structure::{build_model, AnomalyPanel, AnomalyRow, CandidateRow, DashboardModel, DistrictRow, Summary};
#[cfg(feature = "render_json")]
pub use render_json::render_json;
#[cfg(feature = "render_text")]
pub use render_text::render_text;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("serialize: {0}")]
    Serialize(String),
}
