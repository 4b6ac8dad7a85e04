//! em_pipeline — tick orchestration (simulate → fold → analyze) over owned state.
//! Clock access is limited to the `*_at`-less convenience methods; everything else
//! takes an explicit timestamp so tests can drive ticks synchronously.

pub mod activity;
pub mod history;
pub mod monitor;
pub mod scheduler;

pub use activity::{ActivityEntry, ActivityKind, ActivityLog, AlertSuppressor};
pub use history::{fold, HistoryBuffer};
pub use monitor::{Monitor, TickReport};
pub use scheduler::Scheduler;
#[cfg(feature = "timer")]
pub use scheduler::{drive, Control, DriveSummary, StopReason};

use em_core::errors::{ConfigError, CoreError};

/// Single error surface for monitor construction and candidate CRUD.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}
