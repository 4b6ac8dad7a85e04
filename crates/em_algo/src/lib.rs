// crates/em_algo/src/lib.rs
#![forbid(unsafe_code)]

// Core types used throughout the algorithm surface
pub use em_core::{
    entities::{Anomaly, AnomalyDetail, AnomalyType, Candidate, District, Severity, VoteHistoryEntry},
    ids::{CandidateId, DistrictId},
};

// ----------------------------- Statistics primitives ---------------------------------

pub mod stats;

// ----------------------------- Simulation (public surface) ---------------------------

pub mod simulation {
    // File modules (actual implementations)
    pub mod increment;
    pub mod split;
    pub mod engine;

    pub use engine::{simulate_district, simulate_district_with, tick, DistrictEvent, TickOutcome};
    pub use increment::{draw_increment, varied_increment, IncrementDraw};
    pub use split::{apportion, random_split};
}

// Convenience re-exports (pipeline imports these from crate root)
pub use simulation::{tick, DistrictEvent, TickOutcome};

// ----------------------------- Analysis (public surface) -----------------------------

pub mod analysis {
    // File modules (actual implementations)
    pub mod series;
    pub mod zscore;
    pub mod moving_average;
    pub mod turnout;
    pub mod vote_rate;
    pub mod severity;
    pub mod combined;

    pub use combined::analyze;
    pub use moving_average::detect_moving_average_anomalies;
    pub use severity::{anomaly_score, district_score};
    pub use turnout::detect_turnout_anomalies;
    pub use vote_rate::detect_vote_rate_anomalies;
    pub use zscore::detect_zscore_anomalies;
}

pub use analysis::{analyze, anomaly_score, district_score};
