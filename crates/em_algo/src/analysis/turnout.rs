//! Turnout-rate analyzer.
//!
//! Two triggers, checked in order per district:
//!   (a) turnout > 100%                      → high
//!   (b) |z| of turnout among all districts > threshold → high if z > 0, else medium

use em_core::config::AnalysisParams;
use em_core::entities::{Anomaly, AnomalyDetail, District, Severity, Timestamp};

use crate::stats::z_scores;

pub fn detect_turnout_anomalies(
    districts: &[District],
    params: &AnalysisParams,
    at: Timestamp,
) -> Vec<Anomaly> {
    let rates: Vec<f64> = districts.iter().map(District::turnout_pct).collect();
    let zs = z_scores(&rates);

    let mut out = Vec::new();
    for ((d, &rate), &z) in districts.iter().zip(rates.iter()).zip(zs.iter()) {
        let (severity, message, z_field) = if rate > 100.0 {
            (
                Severity::High,
                format!("{}: turnout {rate:.1}% exceeds 100% of registered voters", d.name),
                None,
            )
        } else if z.abs() > params.turnout_zscore_threshold {
            let (sev, dir) = if z > 0.0 {
                (Severity::High, "abnormally high")
            } else {
                (Severity::Medium, "abnormally low")
            };
            (sev, format!("{}: turnout {rate:.1}% is {dir} (z = {z:.2})", d.name), Some(z))
        } else {
            continue;
        };

        out.push(Anomaly {
            district_id: d.id,
            district_name: Some(d.name.clone()),
            severity,
            message,
            timestamp: at,
            detail: AnomalyDetail::TurnoutRate { turnout_rate_percent: rate, z_score: z_field },
        });
    }
    out
}


#[cfg(test)]
mod tests {
    use super::fixtures::{at, district};
    use super::*;
    use em_core::entities::AnomalyType;

    #[test]
    fn over_one_hundred_percent_is_high() {
        let ds = [district(1, 1100, 1000, 0.0)];
        let out = detect_turnout_anomalies(&ds, &AnalysisParams::default(), at());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].severity, Severity::High);
        assert_eq!(out[0].kind(), AnomalyType::TurnoutRate);
        assert!(out[0].message.contains("exceeds 100%"));
    }

    #[test]
    fn ordinary_spread_is_quiet() {
        let ds = [district(1, 700, 1000, 0.0), district(2, 650, 1000, 0.0)];
        assert!(detect_turnout_anomalies(&ds, &AnalysisParams::default(), at()).is_empty());
    }

    #[test]
    fn z_outliers_use_direction_for_severity() {
        // 20 districts at 50%, one at 95% (z ≈ 3.3) and one at 5% (z ≈ -3.3)
        let mut ds: Vec<_> = (1..=20).map(|i| district(i, 500, 1000, 0.0)).collect();
        ds.push(district(21, 950, 1000, 0.0));
        ds.push(district(22, 50, 1000, 0.0));
        let out = detect_turnout_anomalies(&ds, &AnalysisParams::default(), at());
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].district_id.get(), 21);
        assert_eq!(out[0].severity, Severity::High);
        assert_eq!(out[1].district_id.get(), 22);
        assert_eq!(out[1].severity, Severity::Medium);
    }

    #[test]
    fn empty_store_is_quiet() {
        assert!(detect_turnout_anomalies(&[], &AnalysisParams::default(), at()).is_empty());
    }
}
