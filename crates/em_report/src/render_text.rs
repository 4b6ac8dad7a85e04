//! render_text.rs — fixed-width terminal summary.

use std::fmt::Write as _;

use em_core::entities::DistrictStatus;

use crate::structure::DashboardModel;

/// Candidates, then districts, then the anomaly panel (high first).
pub fn render_text(model: &DashboardModel) -> String {
    let mut out = String::new();
    let s = &model.summary;

    // writing into a String cannot fail
    let _ = writeln!(
        out,
        "Total votes {} of {} registered ({:.1}%), {}/{} districts closed, {} history entries",
        s.total_votes, s.registered_voters, s.turnout_pct, s.districts_closed, s.districts_total, s.history_len
    );

    let _ = writeln!(out, "\n{:<6} {:<24} {:<24} {:>10} {:>7}", "ID", "CANDIDATE", "PARTY", "VOTES", "SHARE");
    for c in &model.candidates {
        let mark = if s.leader.as_ref() == Some(&c.id) { "*" } else { "" };
        let _ = writeln!(
            out,
            "{:<6} {:<24} {:<24} {:>10} {:>6.1}%",
            c.id.as_str(),
            format!("{}{mark}", c.name),
            c.party,
            c.votes,
            c.share_pct
        );
    }

    let _ = writeln!(
        out,
        "\n{:<4} {:<12} {:>9} {:>9} {:>8} {:>8} {:<8} {:<20} {:>5}",
        "ID", "DISTRICT", "VOTES", "REG", "TURNOUT", "VPM", "STATUS", "LEADING", "SCORE"
    );
    for d in &model.districts {
        let status = match d.status {
            DistrictStatus::Active => "active",
            DistrictStatus::Closed => "closed",
        };
        let _ = writeln!(
            out,
            "{:<4} {:<12} {:>9} {:>9} {:>7.1}% {:>8.1} {:<8} {:<20} {:>5}",
            d.id.get(),
            d.name,
            d.votes,
            d.registered_voters,
            d.turnout_pct,
            d.votes_per_minute,
            status,
            d.leading.as_deref().unwrap_or("-"),
            d.anomaly_score
        );
    }

    let a = &model.anomalies;
    let _ = writeln!(out, "\nAnomalies: {} high, {} medium, {} low", a.high, a.medium, a.low);
    for row in &a.items {
        let _ = writeln!(out, "  [{:<6}] {:<14} {}", row.severity.as_str(), row.kind.as_str(), row.message);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::build_model;
    use crate::structure::fixtures::{anomaly, candidates, district};
    use em_core::entities::Severity;

    #[test]
    fn table_lists_everything() {
        let ds = [district(1, 70, 30, DistrictStatus::Active), district(2, 0, 0, DistrictStatus::Closed)];
        let m = build_model(&candidates(), &ds, &[anomaly(1, Severity::Medium)], &[]);
        let text = render_text(&m);

        assert!(text.starts_with("Total votes 100 of 2000 registered (5.0%), 1/2 districts closed"));
        assert!(text.contains("Alice*"));
        assert!(text.contains("closed"));
        assert!(text.contains("Anomalies: 0 high, 1 medium, 0 low"));
        assert!(text.contains("[medium] z-score"));
    }
}
