//! crates/em_core/src/registry.rs
//! Candidate Registry: the single source of truth for valid candidate ids.
//!
//! The registry only manages its own records. Cascading the structural changes into
//! district vote maps is done by `districts::attach_candidate` / `detach_candidate`,
//! which the orchestrator calls in the same step.

use crate::entities::{Candidate, CandidateData};
use crate::errors::{CoreError, CoreResult};
use crate::ids::CandidateId;

/// A race needs at least this many candidates at all times.
pub const MIN_CANDIDATES: usize = 2;

/// Insertion-ordered candidate set with a never-reused id counter.
#[derive(Debug, Clone, Default)]
pub struct CandidateRegistry {
    candidates: Vec<Candidate>,
    last_counter: u64,
}

impl CandidateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from seed data (ids `c1`, `c2`, … in order).
    pub fn with_candidates(seed: &[CandidateData]) -> CoreResult<Self> {
        let mut reg = Self::new();
        for data in seed {
            reg.add(data)?;
        }
        Ok(reg)
    }

    /// Validate `data`, assign the next id and store the record.
    pub fn add(&mut self, data: &CandidateData) -> CoreResult<Candidate> {
        let clean = data.normalized()?;
        let counter = self
            .last_counter
            .checked_add(1)
            .ok_or_else(|| CoreError::Validation("candidate id space exhausted".into()))?;
        let candidate = Candidate {
            id: CandidateId::from_counter(counter),
            name: clean.name,
            party: clean.party,
            color: clean.color,
        };
        self.last_counter = counter;
        self.candidates.push(candidate.clone());
        tracing::debug!(candidate = %candidate.id, name = %candidate.name, "candidate registered");
        Ok(candidate)
    }

    /// Replace name/party/color in place; the id never changes.
    /// An unknown id is `NotFound` whatever the data looks like.
    pub fn update(&mut self, id: &CandidateId, data: &CandidateData) -> CoreResult<Candidate> {
        let slot = self
            .candidates
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| CoreError::NotFound(id.clone()))?;
        let clean = data.normalized()?;
        slot.name = clean.name;
        slot.party = clean.party;
        slot.color = clean.color;
        Ok(slot.clone())
    }

    /// Check that `id` exists and that removing it keeps the floor. Mutates nothing.
    pub fn ensure_removable(&self, id: &CandidateId) -> CoreResult<()> {
        if !self.contains(id) {
            return Err(CoreError::NotFound(id.clone()));
        }
        if self.candidates.len() <= MIN_CANDIDATES {
            return Err(CoreError::Validation(format!(
                "cannot remove {id}: at least {MIN_CANDIDATES} candidates must remain"
            )));
        }
        Ok(())
    }

    /// Remove and return the record. Fails without side effects when the floor would break.
    pub fn remove(&mut self, id: &CandidateId) -> CoreResult<Candidate> {
        self.ensure_removable(id)?;
        let pos = self
            .candidates
            .iter()
            .position(|c| &c.id == id)
            .ok_or_else(|| CoreError::NotFound(id.clone()))?;
        let removed = self.candidates.remove(pos);
        tracing::debug!(candidate = %removed.id, "candidate removed");
        Ok(removed)
    }

    /// Candidates in insertion order.
    pub fn list(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Owned copy for one tick; later CRUD calls cannot leak into it.
    pub fn snapshot(&self) -> Vec<Candidate> {
        self.candidates.clone()
    }

    pub fn get(&self, id: &CandidateId) -> Option<&Candidate> {
        self.candidates.iter().find(|c| &c.id == id)
    }

    pub fn contains(&self, id: &CandidateId) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = &CandidateId> + '_ {
        self.candidates.iter().map(|c| &c.id)
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}
