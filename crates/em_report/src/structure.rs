//! crates/em_report/src/structure.rs
//! Dashboard data model and the mapper from monitor state.
//! Pure: reads districts/candidates/anomalies/history, never mutates or re-analyzes.

use em_algo::analysis::district_score;
use em_core::entities::{Anomaly, AnomalyType, Candidate, District, DistrictStatus, Severity, VoteHistoryEntry};
use em_core::ids::{CandidateId, DistrictId};

// -------------------- Model root & sections --------------------

#[cfg_attr(feature = "render_json", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct DashboardModel {
    pub summary: Summary,
    pub candidates: Vec<CandidateRow>,
    pub districts: Vec<DistrictRow>,
    pub anomalies: AnomalyPanel,
    /// Total votes per retained history entry, oldest first.
    pub vote_trend: Vec<u64>,
}

#[cfg_attr(feature = "render_json", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    pub total_votes: u64,
    pub registered_voters: u64,
    pub turnout_pct: f64,
    pub districts_total: usize,
    pub districts_closed: usize,
    pub leader: Option<CandidateId>,
    pub history_len: usize,
}

#[cfg_attr(feature = "render_json", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct CandidateRow {
    pub id: CandidateId,
    pub name: String,
    pub party: String,
    pub color: String,
    pub votes: u64,
    pub share_pct: f64,
}

#[cfg_attr(feature = "render_json", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct DistrictRow {
    pub id: DistrictId,
    pub name: String,
    pub votes: u64,
    pub registered_voters: u64,
    pub turnout_pct: f64,
    pub status: DistrictStatus,
    pub votes_per_minute: f64,
    /// Name of the leading candidate; `None` before any votes.
    pub leading: Option<String>,
    pub anomaly_score: u32,
}

#[cfg_attr(feature = "render_json", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq, Default)]
pub struct AnomalyPanel {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub items: Vec<AnomalyRow>,
}

#[cfg_attr(feature = "render_json", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct AnomalyRow {
    pub district_id: DistrictId,
    pub severity: Severity,
    pub kind: AnomalyType,
    pub message: String,
}

// -------------------- Mapper --------------------

pub fn build_model(
    candidates: &[Candidate],
    districts: &[District],
    anomalies: &[Anomaly],
    history: &[VoteHistoryEntry],
) -> DashboardModel {
    let total_votes: u64 = districts.iter().fold(0u64, |acc, d| acc.saturating_add(d.votes));
    let registered_voters: u64 = districts.iter().fold(0u64, |acc, d| acc.saturating_add(d.registered_voters));

    let candidate_rows: Vec<CandidateRow> = candidates
        .iter()
        .map(|c| {
            let votes = districts
                .iter()
                .filter_map(|d| d.candidate_votes.get(&c.id))
                .fold(0u64, |acc, v| acc.saturating_add(*v));
            CandidateRow {
                id: c.id.clone(),
                name: c.name.clone(),
                party: c.party.clone(),
                color: c.color.clone(),
                votes,
                share_pct: pct(votes, total_votes),
            }
        })
        .collect();

    // first in registry order wins a tie
    let leader = candidate_rows
        .iter()
        .filter(|r| r.votes > 0)
        .fold(None::<&CandidateRow>, |best, r| match best {
            Some(b) if b.votes >= r.votes => Some(b),
            _ => Some(r),
        })
        .map(|r| r.id.clone());

    let district_rows = districts
        .iter()
        .map(|d| DistrictRow {
            id: d.id,
            name: d.name.clone(),
            votes: d.votes,
            registered_voters: d.registered_voters,
            turnout_pct: d.turnout_pct(),
            status: d.status,
            votes_per_minute: d.vote_velocity,
            leading: d
                .leader()
                .filter(|(_, v)| *v > 0)
                .map(|(id, _)| candidate_name(candidates, id)),
            anomaly_score: district_score(anomalies, d.id),
        })
        .collect();

    let mut panel = AnomalyPanel::default();
    for a in anomalies {
        match a.severity {
            Severity::High => panel.high += 1,
            Severity::Medium => panel.medium += 1,
            Severity::Low => panel.low += 1,
        }
        panel.items.push(AnomalyRow {
            district_id: a.district_id,
            severity: a.severity,
            kind: a.kind(),
            message: a.message.clone(),
        });
    }
    // high first; stable within a severity
    panel.items.sort_by_key(|r| r.severity);

    DashboardModel {
        summary: Summary {
            total_votes,
            registered_voters,
            turnout_pct: pct(total_votes, registered_voters),
            districts_total: districts.len(),
            districts_closed: districts.iter().filter(|d| d.is_closed()).count(),
            leader,
            history_len: history.len(),
        },
        candidates: candidate_rows,
        districts: district_rows,
        anomalies: panel,
        vote_trend: history.iter().map(|h| h.total_votes).collect(),
    }
}

fn pct(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

fn candidate_name(candidates: &[Candidate], id: &CandidateId) -> String {
    candidates
        .iter()
        .find(|c| &c.id == id)
        .map(|c| c.name.clone())
        .unwrap_or_else(|| id.to_string())
}
