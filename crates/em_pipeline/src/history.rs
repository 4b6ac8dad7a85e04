//! History Aggregator: fold the district store into one `VoteHistoryEntry` per tick,
//! and keep the most recent entries in a bounded FIFO ring.

use std::collections::{BTreeMap, VecDeque};

use em_core::entities::{Candidate, District, Timestamp, VoteHistoryEntry};

/// Sum per-candidate votes across districts for every candidate in `candidates`
/// (the registry at fold time). Keys a district holds for other ids are ignored;
/// registry candidates a district lacks count as 0.
pub fn fold(districts: &[District], candidates: &[Candidate], timestamp: Timestamp) -> VoteHistoryEntry {
    let mut candidate_totals: BTreeMap<_, u64> =
        candidates.iter().map(|c| (c.id.clone(), 0)).collect();
    let mut per_district_votes = BTreeMap::new();
    let mut total_votes: u64 = 0;

    for d in districts {
        for (id, slot) in candidate_totals.iter_mut() {
            if let Some(v) = d.candidate_votes.get(id) {
                *slot = slot.saturating_add(*v);
            }
        }
        total_votes = total_votes.saturating_add(d.votes);
        per_district_votes.insert(d.id, d.votes);
    }

    VoteHistoryEntry { timestamp, candidate_totals, total_votes, per_district_votes }
}

/// Oldest-first ring of history entries; pushing past `capacity` evicts the oldest.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    entries: VecDeque<VoteHistoryEntry>,
    capacity: usize,
}

impl HistoryBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { entries: VecDeque::with_capacity(capacity), capacity }
    }

    /// Append, returning the evicted entry if the ring was full.
    pub fn push(&mut self, entry: VoteHistoryEntry) -> Option<VoteHistoryEntry> {
        let evicted = if self.entries.len() == self.capacity { self.entries.pop_front() } else { None };
        self.entries.push_back(entry);
        evicted
    }

    /// Contiguous oldest-first view for the analyzers.
    pub fn as_slice(&mut self) -> &[VoteHistoryEntry] {
        self.entries.make_contiguous()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &VoteHistoryEntry> + '_ {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<VoteHistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<&VoteHistoryEntry> {
        self.entries.back()
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
