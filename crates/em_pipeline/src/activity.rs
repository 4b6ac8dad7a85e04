//! Bounded activity feed and the repeat-alert cooldown in front of it.

use std::collections::{BTreeMap, VecDeque};

use chrono::Duration;
use serde::{Deserialize, Serialize};

use em_core::entities::{Anomaly, AnomalyType, Timestamp};
use em_core::ids::DistrictId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Started,
    Paused,
    Reset,
    CandidateAdded,
    CandidateUpdated,
    CandidateRemoved,
    DistrictClosed,
    Anomaly,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub timestamp: Timestamp,
    pub kind: ActivityKind,
    pub message: String,
}

/// Newest-last FIFO ring capped at `capacity` entries.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    entries: VecDeque<ActivityEntry>,
    capacity: usize,
}

impl ActivityLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { entries: VecDeque::with_capacity(capacity), capacity }
    }

    pub fn record(&mut self, timestamp: Timestamp, kind: ActivityKind, message: impl Into<String>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(ActivityEntry { timestamp, kind, message: message.into() });
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ActivityEntry> + '_ {
        self.entries.iter()
    }

    /// Up to `n` entries, newest first.
    pub fn recent(&self, n: usize) -> Vec<&ActivityEntry> {
        self.entries.iter().rev().take(n).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Remembers when each `(district, type)` last alerted.
#[derive(Debug, Clone)]
pub struct AlertSuppressor {
    cooldown: Duration,
    last_seen: BTreeMap<(DistrictId, AnomalyType), Timestamp>,
}

impl AlertSuppressor {
    pub fn new(cooldown_secs: u64) -> Self {
        let secs = i64::try_from(cooldown_secs).unwrap_or(i64::MAX);
        Self { cooldown: Duration::seconds(secs), last_seen: BTreeMap::new() }
    }

    /// `true` if the alert should be shown; records `at` as the new last-alert time.
    /// A suppressed alert does not extend the window.
    pub fn admit(&mut self, anomaly: &Anomaly, at: Timestamp) -> bool {
        let key = (anomaly.district_id, anomaly.kind());
        match self.last_seen.get(&key) {
            Some(prev) if at - *prev < self.cooldown => false,
            _ => {
                self.last_seen.insert(key, at);
                true
            }
        }
    }

    pub fn clear(&mut self) {
        self.last_seen.clear();
    }
}
