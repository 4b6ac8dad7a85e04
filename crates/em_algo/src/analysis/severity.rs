//! Aggregate anomaly score: `min(100, 10·high + 5·medium + 2·low)`.

use em_core::entities::Anomaly;
use em_core::ids::DistrictId;

pub const MAX_SCORE: u32 = 100;

/// Score a list of anomalies (intended: all anomalies of one district).
pub fn anomaly_score(anomalies: &[Anomaly]) -> u32 {
    anomalies
        .iter()
        .fold(0u32, |acc, a| acc.saturating_add(a.severity.weight()))
        .min(MAX_SCORE)
}

/// Score only the anomalies that belong to `district`.
pub fn district_score(anomalies: &[Anomaly], district: DistrictId) -> u32 {
    anomalies
        .iter()
        .filter(|a| a.district_id == district)
        .fold(0u32, |acc, a| acc.saturating_add(a.severity.weight()))
        .min(MAX_SCORE)
}
