//! crates/em_core/src/entities.rs
//! Data model: candidates, district state, history entries and anomalies.
//! Wire names are camelCase so presentation-layer consumers can read snapshots verbatim.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, CoreResult};
use crate::ids::{CandidateId, DistrictId};

/// Wall-clock instant attached to ticks, history entries and anomalies.
pub type Timestamp = DateTime<Utc>;

// -------------------------------------------------------------------------------------------------
// Candidates
// -------------------------------------------------------------------------------------------------

const MAX_FIELD_LEN: usize = 80;

/// Registry-owned candidate record. `id` is immutable once assigned.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub party: String,
    /// Opaque display token (e.g. `#3b82f6`); never interpreted here.
    pub color: String,
}

/// Caller-supplied fields for add/update.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateData {
    pub name: String,
    pub party: String,
    pub color: String,
}

impl CandidateData {
    pub fn new(name: impl Into<String>, party: impl Into<String>, color: impl Into<String>) -> Self {
        Self { name: name.into(), party: party.into(), color: color.into() }
    }

    /// Trim every field and reject empty or oversized values.
    pub fn normalized(&self) -> CoreResult<CandidateData> {
        let name = clean_field("name", &self.name)?;
        let party = clean_field("party", &self.party)?;
        let color = clean_field("color", &self.color)?;
        if color.chars().any(char::is_whitespace) {
            return Err(CoreError::Validation("color must be a single token".into()));
        }
        Ok(CandidateData { name, party, color })
    }
}

fn clean_field(field: &str, raw: &str) -> CoreResult<String> {
    let v = raw.trim();
    if v.is_empty() {
        return Err(CoreError::Validation(format!("candidate {field} must not be empty")));
    }
    if v.chars().count() > MAX_FIELD_LEN {
        return Err(CoreError::Validation(format!(
            "candidate {field} longer than {MAX_FIELD_LEN} characters"
        )));
    }
    Ok(v.to_string())
}

// -------------------------------------------------------------------------------------------------
// Districts
// -------------------------------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistrictStatus {
    Active,
    Closed,
}

/// Per-district simulation state.
///
/// Invariant: `candidate_votes.values().sum() == votes` after every engine step and
/// every registry cascade.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct District {
    pub id: DistrictId,
    pub name: String,
    pub registered_voters: u64,
    pub base_vote_rate: u64,
    pub votes: u64,
    pub candidate_votes: BTreeMap<CandidateId, u64>,
    /// Votes per minute since the previous tick.
    pub vote_velocity: f64,
    pub last_update: Timestamp,
    pub status: DistrictStatus,
}

impl District {
    /// `votes / registered_voters * 100`; 0 when the roll is empty.
    pub fn turnout_pct(&self) -> f64 {
        if self.registered_voters == 0 {
            return 0.0;
        }
        self.votes as f64 / self.registered_voters as f64 * 100.0
    }

    pub fn is_closed(&self) -> bool {
        self.status == DistrictStatus::Closed
    }

    /// Sum of the per-candidate breakdown (u128 so it cannot overflow).
    pub fn breakdown_total(&self) -> u128 {
        self.candidate_votes.values().map(|&v| v as u128).sum()
    }

    /// Candidate with the most votes; ties go to the lowest id.
    pub fn leader(&self) -> Option<(&CandidateId, u64)> {
        self.candidate_votes
            .iter()
            .fold(None, |best: Option<(&CandidateId, u64)>, (id, &v)| match best {
                Some((_, bv)) if bv >= v => best,
                _ => Some((id, v)),
            })
    }
}

// -------------------------------------------------------------------------------------------------
// History
// -------------------------------------------------------------------------------------------------

/// Immutable per-tick snapshot folded from the district store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteHistoryEntry {
    pub timestamp: Timestamp,
    pub candidate_totals: BTreeMap<CandidateId, u64>,
    pub total_votes: u64,
    pub per_district_votes: BTreeMap<DistrictId, u64>,
}

// -------------------------------------------------------------------------------------------------
// Anomalies
// -------------------------------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    /// Contribution to the aggregate district score.
    pub fn weight(self) -> u32 {
        match self {
            Severity::High => 10,
            Severity::Medium => 5,
            Severity::Low => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnomalyType {
    ZScore,
    MovingAverage,
    TurnoutRate,
    VoteRate,
}

impl AnomalyType {
    pub fn as_str(self) -> &'static str {
        match self {
            AnomalyType::ZScore => "z-score",
            AnomalyType::MovingAverage => "moving-average",
            AnomalyType::TurnoutRate => "turnout-rate",
            AnomalyType::VoteRate => "vote-rate",
        }
    }
}

/// Method-specific measurements; only the fields of the firing method exist.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum AnomalyDetail {
    ZScore {
        z_score: f64,
    },
    MovingAverage {
        moving_average_value: f64,
        deviation_percent: f64,
    },
    TurnoutRate {
        turnout_rate_percent: f64,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        z_score: Option<f64>,
    },
    VoteRate {
        vote_rate: f64,
        expected_rate: f64,
        deviation_percent: f64,
    },
}

impl AnomalyDetail {
    pub fn kind(&self) -> AnomalyType {
        match self {
            AnomalyDetail::ZScore { .. } => AnomalyType::ZScore,
            AnomalyDetail::MovingAverage { .. } => AnomalyType::MovingAverage,
            AnomalyDetail::TurnoutRate { .. } => AnomalyType::TurnoutRate,
            AnomalyDetail::VoteRate { .. } => AnomalyType::VoteRate,
        }
    }
}

/// Transient output of one analysis pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anomaly {
    pub district_id: DistrictId,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub district_name: Option<String>,
    pub severity: Severity,
    pub message: String,
    pub timestamp: Timestamp,
    #[serde(flatten)]
    pub detail: AnomalyDetail,
}

impl Anomaly {
    pub fn kind(&self) -> AnomalyType {
        self.detail.kind()
    }
}
