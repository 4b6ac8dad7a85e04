//! Z-score analyzer over the latest per-tick increment.
//!
//! Increments are normalized per 1000 registered voters so large and small districts
//! share one population. Closed districts are left out of the population.
//! Severity: z > 1.5·threshold → high, z > threshold → medium, z < -threshold → low.

use em_core::config::AnalysisParams;
use em_core::entities::{Anomaly, AnomalyDetail, District, Severity, Timestamp, VoteHistoryEntry};

use super::series::latest_increments;
use crate::stats::z_scores;

pub fn detect_zscore_anomalies(
    districts: &[District],
    history: &[VoteHistoryEntry],
    params: &AnalysisParams,
    at: Timestamp,
) -> Vec<Anomaly> {
    let latest = latest_increments(history);
    let members: Vec<(&District, f64)> = districts
        .iter()
        .filter(|d| !d.is_closed() && d.registered_voters > 0)
        .filter_map(|d| {
            latest
                .get(&d.id)
                .map(|inc| (d, inc / d.registered_voters as f64 * 1000.0))
        })
        .collect();
    if members.len() < 2 {
        return Vec::new();
    }

    let values: Vec<f64> = members.iter().map(|(_, v)| *v).collect();
    let zs = z_scores(&values);
    let threshold = params.zscore_threshold;

    let mut out = Vec::new();
    for ((d, per_thousand), z) in members.into_iter().zip(zs) {
        if z.abs() <= threshold {
            continue;
        }
        let severity = if z > 1.5 * threshold {
            Severity::High
        } else if z > 0.0 {
            Severity::Medium
        } else {
            Severity::Low
        };
        out.push(Anomaly {
            district_id: d.id,
            district_name: Some(d.name.clone()),
            severity,
            message: format!(
                "{}: latest increment of {per_thousand:.2} votes per 1000 voters is an outlier (z = {z:.2})",
                d.name
            ),
            timestamp: at,
            detail: AnomalyDetail::ZScore { z_score: z },
        });
    }
    out
}
