// crates/em_algo/src/simulation/engine.rs
//
// Vote Simulation Engine: advance every district by exactly one tick.
//
// Per active district (draw order matters for seeded replays):
//   1. increment draw (Bernoulli → kind → variance), see `increment.rs`
//   2. split: `n - 1` fraction draws, or one target draw for `imbalanced`
//   3. ceiling: a normal increment that would pass `registered * tolerance` closes
//      the district instead of adding votes; injected increments are exempt
//   4. velocity = applied increment / elapsed minutes (0 when elapsed ≤ 0)
//
// Closed districts are skipped (no draws, no changes). A failing district keeps its
// prior state and the failure is logged; the rest of the tick proceeds.

use em_core::config::{AnomalyKind, SimulationParams};
use em_core::districts::reconcile;
use em_core::entities::{Candidate, District, DistrictStatus, Timestamp};
use em_core::errors::{CoreError, CoreResult};
use em_core::ids::DistrictId;
use em_core::rng::RandomSource;

use super::increment::{draw_increment, IncrementDraw};
use super::split::{apportion, random_split};

/// What happened to a district during one tick (beyond an ordinary increment).
#[derive(Clone, Debug, PartialEq)]
pub enum DistrictEvent {
    /// A normal increment would have passed the ceiling; no votes were added.
    Closed { district: DistrictId, votes: u64 },
    /// An anomaly-shaped increment was applied.
    Injected { district: DistrictId, kind: AnomalyKind, increment: u64 },
    /// Computation failed; prior state retained.
    Failed { district: DistrictId, error: CoreError },
}

/// Result of one engine step over the whole store.
#[derive(Clone, Debug)]
pub struct TickOutcome {
    pub districts: Vec<District>,
    pub events: Vec<DistrictEvent>,
}

/// Single-district result.
#[derive(Clone, Debug)]
pub struct StepOutcome {
    pub district: District,
    pub event: Option<DistrictEvent>,
}

/// Advance every district once. `candidates` must be the registry snapshot for this tick.
pub fn tick<R: RandomSource + ?Sized>(
    districts: &[District],
    candidates: &[Candidate],
    params: &SimulationParams,
    now: Timestamp,
    rng: &mut R,
) -> TickOutcome {
    let mut next = Vec::with_capacity(districts.len());
    let mut events = Vec::new();

    for d in districts {
        match simulate_district(d, candidates, params, now, rng) {
            Ok(step) => {
                if let Some(ev) = step.event {
                    events.push(ev);
                }
                next.push(step.district);
            }
            Err(error) => {
                tracing::warn!(district = %d.id, %error, "district tick failed; keeping prior state");
                events.push(DistrictEvent::Failed { district: d.id, error });
                next.push(d.clone());
            }
        }
    }

    TickOutcome { districts: next, events }
}

/// Advance one district with the configured anomaly injection.
pub fn simulate_district<R: RandomSource + ?Sized>(
    district: &District,
    candidates: &[Candidate],
    params: &SimulationParams,
    now: Timestamp,
    rng: &mut R,
) -> CoreResult<StepOutcome> {
    simulate_district_with(district, candidates, params, now, None, rng)
}

/// Advance one district; `forced = Some(kind)` injects `kind` regardless of the rate.
pub fn simulate_district_with<R: RandomSource + ?Sized>(
    district: &District,
    candidates: &[Candidate],
    params: &SimulationParams,
    now: Timestamp,
    forced: Option<AnomalyKind>,
    rng: &mut R,
) -> CoreResult<StepOutcome> {
    if district.is_closed() {
        return Ok(StepOutcome { district: district.clone(), event: None });
    }
    if candidates.is_empty() {
        return Err(computation(district.id, "no candidates to split votes across"));
    }

    let draw = draw_increment(district.base_vote_rate, params, forced, rng);
    let shares = split_shares(&draw, candidates.len(), params.max_split_share, rng)
        .ok_or_else(|| computation(district.id, "imbalanced target out of range"))?;

    let applied = shares
        .iter()
        .try_fold(0u64, |acc, s| acc.checked_add(*s))
        .ok_or_else(|| computation(district.id, "increment overflow"))?;
    let prospective = district
        .votes
        .checked_add(applied)
        .ok_or_else(|| computation(district.id, "vote total overflow"))?;

    let ceiling = district.registered_voters as f64 * params.overflow_tolerance;
    if draw.injected.is_none() && prospective as f64 > ceiling {
        let mut closed = district.clone();
        closed.status = DistrictStatus::Closed;
        closed.vote_velocity = 0.0;
        tracing::debug!(district = %district.id, votes = district.votes, "district closed at ceiling");
        return Ok(StepOutcome {
            event: Some(DistrictEvent::Closed { district: district.id, votes: closed.votes }),
            district: closed,
        });
    }

    let mut next = district.clone();
    reconcile(&mut next, candidates);
    for (c, share) in candidates.iter().zip(shares.iter()) {
        let slot = next.candidate_votes.entry(c.id.clone()).or_insert(0);
        *slot = slot
            .checked_add(*share)
            .ok_or_else(|| computation(district.id, "candidate total overflow"))?;
    }
    next.votes = prospective;

    let velocity = velocity_per_minute(applied, district.last_update, now);
    if !velocity.is_finite() {
        return Err(computation(district.id, "non-finite velocity"));
    }
    next.vote_velocity = velocity;
    next.last_update = now;

    let event = draw.injected.map(|kind| {
        tracing::debug!(district = %district.id, kind = kind.as_str(), increment = applied, "anomaly injected");
        DistrictEvent::Injected { district: district.id, kind, increment: applied }
    });

    Ok(StepOutcome { district: next, event })
}

/// Per-candidate shares in candidate order. `None` only if the target draw fails.
fn split_shares<R: RandomSource + ?Sized>(
    draw: &IncrementDraw,
    n: usize,
    max_share: f64,
    rng: &mut R,
) -> Option<Vec<u64>> {
    if draw.injected == Some(AnomalyKind::Imbalanced) {
        let target = rng.index(n)?;
        let mut shares = vec![0u64; n];
        shares[target] = draw.raw;
        return Some(shares);
    }
    Some(apportion(draw.raw, &random_split(n, max_share, rng)))
}

/// Votes per minute between `since` and `now`; 0 when no time has passed.
pub fn velocity_per_minute(increment: u64, since: Timestamp, now: Timestamp) -> f64 {
    let elapsed_ms = (now - since).num_milliseconds();
    if elapsed_ms <= 0 {
        return 0.0;
    }
    increment as f64 / (elapsed_ms as f64 / 60_000.0)
}

fn computation(district: DistrictId, reason: &str) -> CoreError {
    CoreError::Computation { district, reason: reason.to_string() }
}
