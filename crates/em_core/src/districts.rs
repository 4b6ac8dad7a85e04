//! District State Store helpers: fresh state and registry cascades.
//!
//! The store itself is a plain `Vec<District>` ordered by id; these functions keep the
//! vote maps consistent with the Candidate Registry.

use std::collections::BTreeMap;

use crate::config::DistrictSpec;
use crate::entities::{Candidate, District, DistrictStatus, Timestamp};
use crate::ids::{CandidateId, DistrictId};

/// Fresh state for every configured district: zero votes, every candidate at 0, active.
pub fn initialize(specs: &[DistrictSpec], candidates: &[Candidate], now: Timestamp) -> Vec<District> {
    let mut out: Vec<District> = specs
        .iter()
        .map(|s| District {
            id: s.id,
            name: s.name.clone(),
            registered_voters: s.registered_voters,
            base_vote_rate: s.base_vote_rate,
            votes: 0,
            candidate_votes: candidates.iter().map(|c| (c.id.clone(), 0)).collect(),
            vote_velocity: 0.0,
            last_update: now,
            status: DistrictStatus::Active,
        })
        .collect();
    out.sort_by_key(|d| d.id);
    out
}

/// Add a zero entry for `id` to every district; `votes` is unchanged.
pub fn attach_candidate(districts: &mut [District], id: &CandidateId) {
    for d in districts.iter_mut() {
        d.candidate_votes.entry(id.clone()).or_insert(0);
    }
}

/// Drop `id` from every district and subtract what it held from `votes`.
///
/// Returns the amount removed per district (only districts that held the key).
pub fn detach_candidate(districts: &mut [District], id: &CandidateId) -> BTreeMap<DistrictId, u64> {
    let mut removed = BTreeMap::new();
    for d in districts.iter_mut() {
        if let Some(held) = d.candidate_votes.remove(id) {
            d.votes = d.votes.saturating_sub(held);
            removed.insert(d.id, held);
        }
    }
    removed
}

/// Insert missing keys for the given candidates at 0. Returns how many were added.
pub fn reconcile(district: &mut District, candidates: &[Candidate]) -> usize {
    let mut added = 0;
    for c in candidates {
        if !district.candidate_votes.contains_key(&c.id) {
            district.candidate_votes.insert(c.id.clone(), 0);
            added += 1;
        }
    }
    added
}

/// `sum(candidate_votes) == votes`.
pub fn breakdown_consistent(district: &District) -> bool {
    district.breakdown_total() == district.votes as u128
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_districts;
    use chrono::{TimeZone, Utc};

    fn cands(n: u64) -> Vec<Candidate> {
        (1..=n)
            .map(|i| Candidate {
                id: CandidateId::from_counter(i),
                name: format!("C{i}"),
                party: "P".into(),
                color: "#000".into(),
            })
            .collect()
    }

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 11, 5, 7, 0, 0).unwrap()
    }

    #[test]
    fn initialize_is_zeroed() {
        let ds = initialize(&default_districts(), &cands(3), now());
        assert_eq!(ds.len(), 8);
        for d in &ds {
            assert_eq!(d.votes, 0);
            assert_eq!(d.status, DistrictStatus::Active);
            assert_eq!(d.candidate_votes.len(), 3);
            assert!(d.candidate_votes.values().all(|&v| v == 0));
        }
        assert_eq!(ds[2].registered_voters, 52_000);
    }

    #[test]
    fn detach_subtracts_held_votes() {
        let mut ds = initialize(&default_districts()[..2], &cands(3), now());
        let c3 = CandidateId::from_counter(3);
        ds[0].candidate_votes.insert(CandidateId::from_counter(1), 10);
        ds[0].candidate_votes.insert(c3.clone(), 5);
        ds[0].votes = 15;
        let removed = detach_candidate(&mut ds, &c3);
        assert_eq!(ds[0].votes, 10);
        assert!(!ds[0].candidate_votes.contains_key(&c3));
        assert_eq!(removed.get(&DistrictId(1)), Some(&5));
        assert!(ds.iter().all(breakdown_consistent));
    }

    #[test]
    fn attach_then_detach_is_identity() {
        let mut ds = initialize(&default_districts(), &cands(2), now());
        ds[4].candidate_votes.insert(CandidateId::from_counter(1), 7);
        ds[4].votes = 7;
        let before = ds.clone();
        let c9 = CandidateId::from_counter(9);
        attach_candidate(&mut ds, &c9);
        assert!(ds.iter().all(|d| d.candidate_votes.get(&c9) == Some(&0)));
        detach_candidate(&mut ds, &c9);
        assert_eq!(ds, before);
    }

    #[test]
    fn reconcile_adds_missing_keys_only() {
        let mut ds = initialize(&default_districts()[..1], &cands(2), now());
        assert_eq!(reconcile(&mut ds[0], &cands(3)), 1);
        assert_eq!(reconcile(&mut ds[0], &cands(3)), 0);
    }
}
