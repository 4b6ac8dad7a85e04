//! Run every analyzer over one snapshot and concatenate the findings.
//!
//! Order is stable: turnout, vote-rate, z-score, moving-average. Within an analyzer,
//! anomalies follow district order. The same input always yields the same list.

use em_core::config::AnalysisParams;
use em_core::entities::{Anomaly, District, Timestamp, VoteHistoryEntry};

use super::{
    detect_moving_average_anomalies, detect_turnout_anomalies, detect_vote_rate_anomalies,
    detect_zscore_anomalies,
};

pub fn analyze(
    districts: &[District],
    history: &[VoteHistoryEntry],
    params: &AnalysisParams,
    at: Timestamp,
) -> Vec<Anomaly> {
    let mut out = detect_turnout_anomalies(districts, params, at);
    out.extend(detect_vote_rate_anomalies(districts, params, at));
    out.extend(detect_zscore_anomalies(districts, history, params, at));
    out.extend(detect_moving_average_anomalies(districts, history, params, at));
    tracing::trace!(count = out.len(), "analysis pass complete");
    out
}
