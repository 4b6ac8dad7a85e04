//! End-to-end scenarios driven synchronously through `Monitor::tick_at`.

use chrono::{DateTime, Duration, TimeZone, Utc};

use em_algo::analysis::detect_turnout_anomalies;
use em_core::config::{AnalysisParams, AnomalyKind, MonitorConfig};
use em_core::districts::{breakdown_consistent, initialize};
use em_core::entities::{CandidateData, District, DistrictStatus, Severity};
use em_core::errors::CoreError;
use em_core::ids::{CandidateId, DistrictId};
use em_core::rng::{SequenceRng, SimRng};
use em_pipeline::{Monitor, PipelineError};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 11, 5, 7, 0, 0).unwrap()
}

fn at(tick: i64) -> DateTime<Utc> {
    t0() + Duration::seconds(2 * tick)
}

fn quiet(seed: u64) -> Monitor<SimRng> {
    let mut cfg = MonitorConfig::default();
    cfg.simulation.anomaly_rate = 0.0;
    Monitor::with_rng_at(cfg, SimRng::from_seed_u64(seed), t0()).unwrap()
}

#[test]
fn thousand_quiet_ticks_respect_the_ceiling_and_close_everything() {
    let mut m = quiet(2024);
    let registered: Vec<u64> = m.districts().iter().map(|d| d.registered_voters).collect();
    assert_eq!(registered, vec![45000, 38000, 52000, 41000, 35000, 47000, 29000, 33000]);

    let mut prev: Vec<District> = m.districts().to_vec();
    for i in 1..=1000 {
        let report = m.tick_at(at(i));
        for (before, after) in prev.iter().zip(report.districts.iter()) {
            assert!(breakdown_consistent(after), "tick {i}: breakdown drift in {}", after.name);
            assert!(after.votes >= before.votes, "tick {i}: {} went backwards", after.name);
            assert!(after.votes as f64 <= after.registered_voters as f64 * 1.02);
            if before.status == DistrictStatus::Closed {
                assert_eq!(after.status, DistrictStatus::Closed);
                assert_eq!(after.votes, before.votes);
            }
        }
        prev = report.districts;
    }
    assert!(m.districts().iter().all(|d| d.status == DistrictStatus::Closed));
    assert!(m.districts().iter().all(|d| d.vote_velocity == 0.0));
}

#[test]
fn same_seed_same_run() {
    let mut a = quiet(99);
    let mut b = quiet(99);
    for i in 1..=50 {
        a.tick_at(at(i));
        b.tick_at(at(i));
    }
    assert_eq!(a.districts(), b.districts());
    assert_eq!(a.history().to_vec(), b.history().to_vec());
}

#[test]
fn add_then_remove_restores_every_district() {
    let mut m = quiet(5);
    for i in 1..=20 {
        m.tick_at(at(i));
    }
    let before = m.districts().to_vec();

    let added = m.add_candidate(&CandidateData::new("Dana Park", "Green", "#22c55e")).unwrap();
    assert_eq!(added.id, CandidateId::from_counter(4));
    for (b, d) in before.iter().zip(m.districts()) {
        assert_eq!(d.votes, b.votes);
        assert_eq!(d.candidate_votes.get(&added.id), Some(&0));
    }

    m.remove_candidate(&added.id).unwrap();
    assert_eq!(m.districts(), before.as_slice());
}

#[test]
fn candidate_floor_and_removal_cascade() {
    let mut m = quiet(8);
    for i in 1..=30 {
        m.tick_at(at(i));
    }
    let victim = CandidateId::from_counter(2);
    let before = m.districts().to_vec();

    m.remove_candidate(&victim).unwrap();
    for (b, d) in before.iter().zip(m.districts()) {
        let held = b.candidate_votes[&victim];
        assert_eq!(d.votes, b.votes - held);
        assert!(!d.candidate_votes.contains_key(&victim));
        assert!(breakdown_consistent(d));
    }

    let snapshot = m.districts().to_vec();
    let err = m.remove_candidate(&CandidateId::from_counter(1)).unwrap_err();
    assert!(matches!(err, PipelineError::Core(CoreError::Validation(_))));
    assert_eq!(m.list_candidates().len(), 2);
    assert_eq!(m.districts(), snapshot.as_slice());

    // ids are never reused after a removal
    let next = m.add_candidate(&CandidateData::new("Eve Stone", "Reform", "#a855f7")).unwrap();
    assert_eq!(next.id, CandidateId::from_counter(4));
}

#[test]
fn reset_reproduces_a_fresh_start() {
    let mut m = quiet(3);
    m.start();
    for i in 1..=40 {
        m.tick_at(at(i));
    }
    let when = at(41);
    m.reset_at(when);

    let fresh = initialize(&m.config().districts, m.list_candidates(), when);
    assert_eq!(m.districts(), fresh.as_slice());
    assert!(m.history().is_empty());
    assert!(m.anomalies().is_empty());
    assert_eq!(m.tick_count(), 0);
    assert!(!m.is_running());
    assert!(m.districts().iter().all(|d| d.votes == 0 && d.status == DistrictStatus::Active));
}

#[test]
fn forced_imbalanced_injection_goes_to_one_candidate() {
    let mut cfg = MonitorConfig::default();
    cfg.simulation.anomaly_rate = 1.0;
    cfg.simulation.injected_kinds = vec![AnomalyKind::Imbalanced];
    // all draws 0.0: injection fires, target index 0
    let mut m = Monitor::with_rng_at(cfg, SequenceRng::constant(0.0), t0()).unwrap();
    m.tick_at(at(1));

    let first = CandidateId::from_counter(1);
    for d in m.districts() {
        assert!(d.votes > 0);
        assert_eq!(d.candidate_votes[&first], d.votes, "{}", d.name);
    }
}

#[test]
fn turnout_scenarios() {
    let mut m = quiet(1);
    m.tick_at(at(1));
    let mut ds = m.districts()[..2].to_vec();
    ds[0].registered_voters = 1000;
    ds[0].votes = 1100;
    let out = detect_turnout_anomalies(&ds[..1], &AnalysisParams::default(), at(1));
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].severity, Severity::High);

    ds[0].votes = 700;
    ds[1].registered_voters = 1000;
    ds[1].votes = 650;
    assert!(detect_turnout_anomalies(&ds, &AnalysisParams::default(), at(1)).is_empty());
}

#[test]
fn anomalies_are_scored_and_cooldown_only_filters_the_feed() {
    let mut cfg = MonitorConfig::default();
    cfg.simulation.anomaly_rate = 0.3;
    let mut m = Monitor::with_rng_at(cfg, SimRng::from_seed_u64(42), t0()).unwrap();

    let mut total_anomalies = 0usize;
    let mut total_alerts = 0usize;
    for i in 1..=60 {
        let r = m.tick_at(at(i));
        assert_eq!(r.alerts.len() + r.suppressed, r.anomalies.len());
        total_anomalies += r.anomalies.len();
        total_alerts += r.alerts.len();
    }
    assert!(total_alerts <= total_anomalies);
    for id in 1..=8 {
        assert!(m.score(DistrictId(id)) <= 100);
    }
    assert!(m.activity().len() <= m.config().retention.max_activity);
}
