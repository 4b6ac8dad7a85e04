//! config.rs — configuration surface with safe defaults.
//! Every field has a default, so a partial JSON file (or `{}`) is a valid config.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::entities::CandidateData;
use crate::errors::ConfigError;
use crate::ids::DistrictId;

/// ------------ Canonical enums (wire tokens explicit) ------------

/// Selectable tick intervals; serialized as milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub enum TickInterval {
    Fast,
    Normal,
    Slow,
}

impl TickInterval {
    pub fn as_millis(self) -> u64 {
        match self {
            TickInterval::Fast => 1000,
            TickInterval::Normal => 2000,
            TickInterval::Slow => 5000,
        }
    }

    pub fn as_duration(self) -> Duration {
        Duration::from_millis(self.as_millis())
    }
}

impl Default for TickInterval {
    fn default() -> Self { TickInterval::Normal }
}

impl TryFrom<u64> for TickInterval {
    type Error = ConfigError;
    fn try_from(ms: u64) -> Result<Self, Self::Error> {
        match ms {
            1000 => Ok(TickInterval::Fast),
            2000 => Ok(TickInterval::Normal),
            5000 => Ok(TickInterval::Slow),
            other => Err(ConfigError::TickInterval(other)),
        }
    }
}

impl From<TickInterval> for u64 {
    fn from(t: TickInterval) -> u64 { t.as_millis() }
}

/// Synthetic anomaly shapes the engine can inject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// 5× the base rate, spread across candidates.
    HighTurnout,
    /// 8× the base rate, spread across candidates.
    SuspiciousRate,
    /// Base rate, entire increment to one candidate.
    Imbalanced,
}

impl AnomalyKind {
    pub fn multiplier(self) -> f64 {
        match self {
            AnomalyKind::HighTurnout => 5.0,
            AnomalyKind::SuspiciousRate => 8.0,
            AnomalyKind::Imbalanced => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AnomalyKind::HighTurnout => "high_turnout",
            AnomalyKind::SuspiciousRate => "suspicious_rate",
            AnomalyKind::Imbalanced => "imbalanced",
        }
    }
}

/// ------------ Complex shapes ------------

/// Static description of one district (constant for the whole run).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistrictSpec {
    pub id: DistrictId,
    pub name: String,
    pub registered_voters: u64,
    pub base_vote_rate: u64,
}

impl DistrictSpec {
    fn new(id: u32, name: &str, registered_voters: u64, base_vote_rate: u64) -> Self {
        Self { id: DistrictId(id), name: name.to_string(), registered_voters, base_vote_rate }
    }
}

/// The eight-district base configuration.
pub fn default_districts() -> Vec<DistrictSpec> {
    vec![
        DistrictSpec::new(1, "Downtown", 45_000, 120),
        DistrictSpec::new(2, "Riverside", 38_000, 95),
        DistrictSpec::new(3, "Northgate", 52_000, 140),
        DistrictSpec::new(4, "Westfield", 41_000, 110),
        DistrictSpec::new(5, "Eastview", 35_000, 85),
        DistrictSpec::new(6, "Southpark", 47_000, 125),
        DistrictSpec::new(7, "Hillcrest", 29_000, 70),
        DistrictSpec::new(8, "Lakeside", 33_000, 80),
    ]
}

pub fn default_candidates() -> Vec<CandidateData> {
    vec![
        CandidateData::new("Alice Johnson", "Progressive Party", "#3b82f6"),
        CandidateData::new("Robert Chen", "Conservative Alliance", "#ef4444"),
        CandidateData::new("Maria Garcia", "Independent", "#10b981"),
    ]
}

/// ------------ Parameter groups ------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    /// Per-district, per-tick probability of injecting an anomaly.
    pub anomaly_rate: f64,
    /// Kinds drawn uniformly when an injection fires.
    pub injected_kinds: Vec<AnomalyKind>,
    /// Total width of the multiplicative noise band (0.3 → ±15%).
    pub vote_variance: f64,
    /// Normal increments may not push votes above `registered * tolerance`.
    pub overflow_tolerance: f64,
    /// Upper bound of each candidate's draw as a fraction of the remaining share.
    pub max_split_share: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            anomaly_rate: 0.05,
            injected_kinds: vec![AnomalyKind::HighTurnout, AnomalyKind::SuspiciousRate],
            vote_variance: 0.3,
            overflow_tolerance: 1.02,
            max_split_share: 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisParams {
    pub zscore_threshold: f64,
    pub turnout_zscore_threshold: f64,
    pub moving_average_window: usize,
    /// Medium above this deviation (percent).
    pub moving_average_threshold_pct: f64,
    /// High above this deviation (percent).
    pub moving_average_high_pct: f64,
    pub vote_rate_threshold_pct: f64,
    pub vote_rate_high_pct: f64,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            zscore_threshold: 2.5,
            turnout_zscore_threshold: 3.0,
            moving_average_window: 5,
            moving_average_threshold_pct: 150.0,
            moving_average_high_pct: 200.0,
            vote_rate_threshold_pct: 300.0,
            vote_rate_high_pct: 500.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionParams {
    pub max_history: usize,
    pub max_activity: usize,
    /// Repeat alerts for the same district and type inside this window are not logged.
    pub alert_cooldown_secs: u64,
}

impl Default for RetentionParams {
    fn default() -> Self {
        Self { max_history: 50, max_activity: 100, alert_cooldown_secs: 30 }
    }
}

/// ------------ MonitorConfig ------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub tick_interval: TickInterval,
    /// Absent → OS entropy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub simulation: SimulationParams,
    pub analysis: AnalysisParams,
    pub retention: RetentionParams,
    pub districts: Vec<DistrictSpec>,
    pub candidates: Vec<CandidateData>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            tick_interval: TickInterval::default(),
            seed: None,
            simulation: SimulationParams::default(),
            analysis: AnalysisParams::default(),
            retention: RetentionParams::default(),
            districts: default_districts(),
            candidates: default_candidates(),
        }
    }
}

impl MonitorConfig {
    /// Parse a (possibly partial) JSON document and validate it.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: MonitorConfig =
            serde_json::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Range and shape checks. Called by `from_json_str` and by the monitor constructor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.simulation;
        check_unit("simulation.anomaly_rate", s.anomaly_rate)?;
        if !(s.vote_variance.is_finite() && (0.0..2.0).contains(&s.vote_variance)) {
            return Err(ConfigError::range("simulation.vote_variance", format!("{} not in [0, 2)", s.vote_variance)));
        }
        if !(s.overflow_tolerance.is_finite() && s.overflow_tolerance >= 1.0) {
            return Err(ConfigError::range("simulation.overflow_tolerance", format!("{} < 1", s.overflow_tolerance)));
        }
        if !(s.max_split_share.is_finite() && s.max_split_share > 0.0 && s.max_split_share <= 1.0) {
            return Err(ConfigError::range("simulation.max_split_share", format!("{} not in (0, 1]", s.max_split_share)));
        }
        if s.anomaly_rate > 0.0 && s.injected_kinds.is_empty() {
            return Err(ConfigError::range("simulation.injected_kinds", "empty while anomaly_rate > 0"));
        }

        let a = &self.analysis;
        for (field, v) in [
            ("analysis.zscore_threshold", a.zscore_threshold),
            ("analysis.turnout_zscore_threshold", a.turnout_zscore_threshold),
            ("analysis.moving_average_threshold_pct", a.moving_average_threshold_pct),
            ("analysis.moving_average_high_pct", a.moving_average_high_pct),
            ("analysis.vote_rate_threshold_pct", a.vote_rate_threshold_pct),
            ("analysis.vote_rate_high_pct", a.vote_rate_high_pct),
        ] {
            if !(v.is_finite() && v > 0.0) {
                return Err(ConfigError::range(field, format!("{v} must be > 0")));
            }
        }
        if a.moving_average_window == 0 {
            return Err(ConfigError::range("analysis.moving_average_window", "must be ≥ 1"));
        }

        let r = &self.retention;
        if r.max_history == 0 {
            return Err(ConfigError::range("retention.max_history", "must be ≥ 1"));
        }
        if r.max_activity == 0 {
            return Err(ConfigError::range("retention.max_activity", "must be ≥ 1"));
        }

        self.validate_districts()?;
        self.validate_candidates()
    }

    fn validate_districts(&self) -> Result<(), ConfigError> {
        if self.districts.is_empty() {
            return Err(ConfigError::Districts("at least one district is required".into()));
        }
        let mut seen = BTreeSet::new();
        for d in &self.districts {
            if d.id.get() == 0 {
                return Err(ConfigError::Districts("district ids start at 1".into()));
            }
            if !seen.insert(d.id) {
                return Err(ConfigError::Districts(format!("duplicate district id {}", d.id)));
            }
            if d.name.trim().is_empty() {
                return Err(ConfigError::Districts(format!("district {} has an empty name", d.id)));
            }
            if d.registered_voters == 0 {
                return Err(ConfigError::Districts(format!("district {} has no registered voters", d.id)));
            }
            if d.base_vote_rate == 0 {
                return Err(ConfigError::Districts(format!("district {} has a zero base vote rate", d.id)));
            }
        }
        Ok(())
    }

    fn validate_candidates(&self) -> Result<(), ConfigError> {
        if self.candidates.len() < 2 {
            return Err(ConfigError::Candidates(format!(
                "at least 2 candidates are required, got {}",
                self.candidates.len()
            )));
        }
        for c in &self.candidates {
            c.normalized().map_err(|e| ConfigError::Candidates(e.to_string()))?;
        }
        Ok(())
    }
}

fn check_unit(field: &'static str, v: f64) -> Result<(), ConfigError> {
    if v.is_finite() && (0.0..=1.0).contains(&v) {
        Ok(())
    } else {
        Err(ConfigError::range(field, format!("{v} not in [0, 1]")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let cfg = MonitorConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.districts.len(), 8);
        assert_eq!(cfg.tick_interval.as_millis(), 2000);
        assert_eq!(cfg.analysis.moving_average_window, 5);
        assert_eq!(cfg.retention.max_history, 50);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg = MonitorConfig::from_json_str(
            r#"{"tick_interval": 1000, "simulation": {"anomaly_rate": 0.0}, "seed": 9}"#,
        )
        .unwrap();
        assert_eq!(cfg.tick_interval, TickInterval::Fast);
        assert_eq!(cfg.simulation.anomaly_rate, 0.0);
        assert_eq!(cfg.simulation.overflow_tolerance, 1.02);
        assert_eq!(cfg.seed, Some(9));
    }

    #[test]
    fn rejects_unknown_interval() {
        let err = MonitorConfig::from_json_str(r#"{"tick_interval": 1500}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut cfg = MonitorConfig::default();
        cfg.simulation.anomaly_rate = 1.5;
        assert!(cfg.validate().is_err());

        let mut cfg = MonitorConfig::default();
        cfg.simulation.overflow_tolerance = 0.9;
        assert!(cfg.validate().is_err());

        let mut cfg = MonitorConfig::default();
        cfg.candidates.truncate(1);
        assert!(matches!(cfg.validate(), Err(ConfigError::Candidates(_))));

        let mut cfg = MonitorConfig::default();
        cfg.districts[1].id = DistrictId(1);
        assert!(matches!(cfg.validate(), Err(ConfigError::Districts(_))));
    }

    #[test]
    fn interval_serializes_as_millis() {
        let v = serde_json::to_value(TickInterval::Slow).unwrap();
        assert_eq!(v, serde_json::json!(5000));
    }
}
