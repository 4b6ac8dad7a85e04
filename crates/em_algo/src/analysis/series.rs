//! Per-district increment series derived from consecutive history entries.

use std::collections::BTreeMap;

use em_core::entities::VoteHistoryEntry;
use em_core::ids::DistrictId;

/// For each district, `votes[t] - votes[t-1]` over the retained history (saturating at 0,
/// since a removal cascade can lower totals). A district missing from either entry of a
/// pair contributes nothing for that step.
pub fn increment_series(history: &[VoteHistoryEntry]) -> BTreeMap<DistrictId, Vec<f64>> {
    let mut out: BTreeMap<DistrictId, Vec<f64>> = BTreeMap::new();
    for pair in history.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        for (id, &now) in &cur.per_district_votes {
            if let Some(&before) = prev.per_district_votes.get(id) {
                out.entry(*id).or_default().push(now.saturating_sub(before) as f64);
            }
        }
    }
    out
}

/// Latest increment per district (last two entries only).
pub fn latest_increments(history: &[VoteHistoryEntry]) -> BTreeMap<DistrictId, f64> {
    match history.len() {
        0 | 1 => BTreeMap::new(),
        n => increment_series(&history[n - 2..])
            .into_iter()
            .filter_map(|(id, v)| v.last().map(|x| (id, *x)))
            .collect(),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    /// History whose entry `t` holds `totals[t][i]` for district `i + 1`.
    pub fn history(totals: &[Vec<u64>]) -> Vec<VoteHistoryEntry> {
        let t0 = Utc.with_ymd_and_hms(2024, 11, 5, 7, 0, 0).unwrap();
        totals
            .iter()
            .enumerate()
            .map(|(t, row)| VoteHistoryEntry {
                timestamp: t0 + Duration::seconds(2 * t as i64),
                candidate_totals: BTreeMap::new(),
                total_votes: row.iter().sum(),
                per_district_votes: row
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (DistrictId(i as u32 + 1), *v))
                    .collect(),
            })
            .collect()
    }
}
