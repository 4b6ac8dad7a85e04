//! `Monitor` — owns the registry, district store, history and activity rings, and
//! runs one tick as simulate → fold → analyze, strictly in that order.

use chrono::Utc;

use em_algo::analysis::district_score;
use em_algo::{analyze, DistrictEvent};
use em_core::config::{MonitorConfig, TickInterval};
use em_core::districts::{self, attach_candidate, detach_candidate};
use em_core::entities::{Anomaly, Candidate, CandidateData, District, Timestamp, VoteHistoryEntry};
use em_core::ids::{CandidateId, DistrictId};
use em_core::registry::CandidateRegistry;
use em_core::rng::{RandomSource, SimRng};

use crate::activity::{ActivityKind, ActivityLog, AlertSuppressor};
use crate::history::{fold, HistoryBuffer};
use crate::scheduler::Scheduler;
use crate::PipelineError;

/// Everything one tick produced.
#[derive(Debug, Clone)]
pub struct TickReport {
    /// 1-based tick number since construction or the last reset.
    pub tick: u64,
    pub timestamp: Timestamp,
    pub districts: Vec<District>,
    pub history_entry: VoteHistoryEntry,
    /// Full analyzer output for this tick (never filtered).
    pub anomalies: Vec<Anomaly>,
    /// Anomalies that passed the cooldown and were written to the activity feed.
    pub alerts: Vec<Anomaly>,
    pub suppressed: usize,
    pub events: Vec<DistrictEvent>,
}

pub struct Monitor<R: RandomSource = SimRng> {
    config: MonitorConfig,
    registry: CandidateRegistry,
    districts: Vec<District>,
    history: HistoryBuffer,
    anomalies: Vec<Anomaly>,
    activity: ActivityLog,
    suppressor: AlertSuppressor,
    scheduler: Scheduler,
    ticks: u64,
    rng: R,
}

impl Monitor<SimRng> {
    /// Validate `config`, seed the RNG (`config.seed`, else OS entropy) and initialize.
    pub fn new(config: MonitorConfig) -> Result<Self, PipelineError> {
        Self::new_at(config, Utc::now())
    }

    /// As `new`, with districts stamped at `now`.
    pub fn new_at(config: MonitorConfig, now: Timestamp) -> Result<Self, PipelineError> {
        let rng = SimRng::from_optional_seed(config.seed);
        Self::with_rng_at(config, rng, now)
    }
}

impl<R: RandomSource> Monitor<R> {
    /// Construct with an explicit RNG and start time (deterministic tests).
    pub fn with_rng_at(config: MonitorConfig, rng: R, now: Timestamp) -> Result<Self, PipelineError> {
        config.validate()?;
        let registry = CandidateRegistry::with_candidates(&config.candidates)?;
        let districts = districts::initialize(&config.districts, registry.list(), now);
        tracing::info!(
            districts = districts.len(),
            candidates = registry.len(),
            interval_ms = config.tick_interval.as_millis(),
            "monitor initialized"
        );
        Ok(Self {
            history: HistoryBuffer::new(config.retention.max_history),
            activity: ActivityLog::new(config.retention.max_activity),
            suppressor: AlertSuppressor::new(config.retention.alert_cooldown_secs),
            scheduler: Scheduler::new(config.tick_interval),
            anomalies: Vec::new(),
            ticks: 0,
            config,
            registry,
            districts,
            rng,
        })
    }

    // ----------------------------------- ticking -----------------------------------

    pub fn tick(&mut self) -> TickReport {
        self.tick_at(Utc::now())
    }

    /// Run one full tick at `now`. Never fails: per-district faults are isolated by the
    /// engine and reported as `DistrictEvent::Failed`.
    pub fn tick_at(&mut self, now: Timestamp) -> TickReport {
        let snapshot = self.registry.snapshot();

        let outcome = em_algo::tick(&self.districts, &snapshot, &self.config.simulation, now, &mut self.rng);
        self.districts = outcome.districts;
        self.ticks += 1;

        let entry = fold(&self.districts, &snapshot, now);
        self.history.push(entry.clone());

        let anomalies = analyze(&self.districts, self.history.as_slice(), &self.config.analysis, now);

        for ev in &outcome.events {
            if let DistrictEvent::Closed { district, votes } = ev {
                let name = self.district_name(*district);
                self.activity.record(now, ActivityKind::DistrictClosed, format!("{name} closed at {votes} votes"));
            }
        }

        let mut alerts = Vec::new();
        let mut suppressed = 0usize;
        for a in &anomalies {
            if self.suppressor.admit(a, now) {
                self.activity.record(now, ActivityKind::Anomaly, format!("[{}] {}", a.severity.as_str(), a.message));
                alerts.push(a.clone());
            } else {
                suppressed += 1;
            }
        }

        tracing::debug!(
            tick = self.ticks,
            total_votes = entry.total_votes,
            anomalies = anomalies.len(),
            suppressed,
            "tick complete"
        );

        self.anomalies = anomalies.clone();
        TickReport {
            tick: self.ticks,
            timestamp: now,
            districts: self.districts.clone(),
            history_entry: entry,
            anomalies,
            alerts,
            suppressed,
            events: outcome.events,
        }
    }

    // ---------------------------------- scheduling ----------------------------------

    pub fn start(&mut self) {
        if self.scheduler.start() {
            self.activity.record(Utc::now(), ActivityKind::Started, "simulation started");
            tracing::info!(interval_ms = self.scheduler.interval().as_millis(), "simulation started");
        }
    }

    pub fn pause(&mut self) {
        if self.scheduler.stop() {
            self.activity.record(Utc::now(), ActivityKind::Paused, "simulation paused");
            tracing::info!(tick = self.ticks, "simulation paused");
        }
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn tick_interval(&self) -> TickInterval {
        self.scheduler.interval()
    }

    pub fn set_tick_interval(&mut self, interval: TickInterval) {
        self.config.tick_interval = interval;
        self.scheduler.set_interval(interval);
    }

    /// Change the per-district injection probability; must lie in `[0, 1]`.
    pub fn set_anomaly_rate(&mut self, rate: f64) -> Result<(), PipelineError> {
        let mut next = self.config.clone();
        next.simulation.anomaly_rate = rate;
        next.validate()?;
        self.config = next;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.reset_at(Utc::now());
    }

    /// Zero every district against the current registry and drop history, anomalies,
    /// activity and cooldowns. Candidates are kept; the simulation is left paused.
    pub fn reset_at(&mut self, now: Timestamp) {
        self.scheduler.stop();
        self.districts = districts::initialize(&self.config.districts, self.registry.list(), now);
        self.history.clear();
        self.anomalies.clear();
        self.activity.clear();
        self.suppressor.clear();
        self.ticks = 0;
        self.activity.record(now, ActivityKind::Reset, "simulation reset");
        tracing::info!("simulation reset");
    }

    // --------------------------------- candidate CRUD ---------------------------------

    /// Register a candidate and give it a zero entry in every district.
    pub fn add_candidate(&mut self, data: &CandidateData) -> Result<Candidate, PipelineError> {
        let candidate = self.registry.add(data)?;
        attach_candidate(&mut self.districts, &candidate.id);
        self.activity.record(
            Utc::now(),
            ActivityKind::CandidateAdded,
            format!("candidate {} ({}) added", candidate.name, candidate.id),
        );
        tracing::info!(candidate = %candidate.id, name = %candidate.name, "candidate added");
        Ok(candidate)
    }

    pub fn update_candidate(&mut self, id: &CandidateId, data: &CandidateData) -> Result<Candidate, PipelineError> {
        let candidate = self.registry.update(id, data)?;
        self.activity.record(
            Utc::now(),
            ActivityKind::CandidateUpdated,
            format!("candidate {} updated", candidate.id),
        );
        Ok(candidate)
    }

    /// Remove a candidate and subtract its votes from every district.
    /// Fails without touching any state if `id` is unknown or only two candidates remain.
    pub fn remove_candidate(&mut self, id: &CandidateId) -> Result<Candidate, PipelineError> {
        self.registry.ensure_removable(id)?;
        let removed = self.registry.remove(id)?;
        let stripped = detach_candidate(&mut self.districts, id);
        let total: u64 = stripped.values().sum();
        self.activity.record(
            Utc::now(),
            ActivityKind::CandidateRemoved,
            format!("candidate {} ({}) removed, {total} votes withdrawn", removed.name, removed.id),
        );
        tracing::info!(candidate = %removed.id, votes_withdrawn = total, "candidate removed");
        Ok(removed)
    }

    pub fn list_candidates(&self) -> &[Candidate] {
        self.registry.list()
    }

    // ------------------------------------ queries ------------------------------------

    pub fn districts(&self) -> &[District] {
        &self.districts
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    /// Analyzer output of the most recent tick.
    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    /// Anomaly score of one district from the latest analysis pass.
    pub fn score(&self, district: DistrictId) -> u32 {
        district_score(&self.anomalies, district)
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    fn district_name(&self, id: DistrictId) -> String {
        self.districts
            .iter()
            .find(|d| d.id == id)
            .map(|d| d.name.clone())
            .unwrap_or_else(|| format!("district {id}"))
    }
}
