//! Scheduler state and the async interval driver.
//!
//! Ticks are synchronous calls on `Monitor`; nothing here can interrupt one. The driver
//! only decides *when* the next whole tick starts, so pausing takes effect between ticks.

use em_core::config::TickInterval;

/// Running flag plus the selected interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Scheduler {
    running: bool,
    interval: TickInterval,
}

impl Scheduler {
    pub fn new(interval: TickInterval) -> Self {
        Self { running: false, interval }
    }

    /// Returns `true` if the state changed.
    pub fn start(&mut self) -> bool {
        !std::mem::replace(&mut self.running, true)
    }

    /// Returns `true` if the state changed.
    pub fn stop(&mut self) -> bool {
        std::mem::replace(&mut self.running, false)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn interval(&self) -> TickInterval {
        self.interval
    }

    pub fn set_interval(&mut self, interval: TickInterval) {
        self.interval = interval;
    }
}

#[cfg(feature = "timer")]
pub use driver::{drive, Control, DriveSummary, StopReason};

#[cfg(feature = "timer")]
mod driver {
    use std::future::Future;

    use em_core::config::TickInterval;
    use em_core::entities::CandidateData;
    use em_core::ids::CandidateId;
    use em_core::rng::RandomSource;
    use tokio::sync::mpsc;
    use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

    use crate::monitor::{Monitor, TickReport};

    /// Commands applied to the monitor between ticks while `drive` owns it.
    #[derive(Debug, Clone, PartialEq)]
    pub enum Control {
        Start,
        Pause,
        Reset,
        SetInterval(TickInterval),
        SetAnomalyRate(f64),
        AddCandidate(CandidateData),
        UpdateCandidate(CandidateId, CandidateData),
        RemoveCandidate(CandidateId),
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum StopReason {
        Limit,
        Shutdown,
        /// Paused with no control channel left to resume it.
        Paused,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DriveSummary {
        pub ticks: u64,
        pub reason: StopReason,
    }

    fn beat(interval: TickInterval) -> Interval {
        let period = interval.as_duration();
        let mut timer = interval_at(Instant::now() + period, period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        timer
    }

    async fn next_control(controls: &mut Option<mpsc::Receiver<Control>>) -> Option<Control> {
        match controls {
            Some(rx) => rx.recv().await,
            None => std::future::pending().await,
        }
    }

    /// Apply one command. Returns `true` when the monitor went from paused to running.
    fn apply<R: RandomSource>(monitor: &mut Monitor<R>, cmd: Control) -> bool {
        let was_running = monitor.is_running();
        let outcome = match cmd {
            Control::Start => {
                monitor.start();
                Ok(())
            }
            Control::Pause => {
                monitor.pause();
                Ok(())
            }
            Control::Reset => {
                monitor.reset();
                Ok(())
            }
            Control::SetInterval(interval) => {
                monitor.set_tick_interval(interval);
                Ok(())
            }
            Control::SetAnomalyRate(rate) => monitor.set_anomaly_rate(rate),
            Control::AddCandidate(data) => monitor.add_candidate(&data).map(drop),
            Control::UpdateCandidate(id, data) => monitor.update_candidate(&id, &data).map(drop),
            Control::RemoveCandidate(id) => monitor.remove_candidate(&id).map(drop),
        };
        if let Err(e) = outcome {
            tracing::warn!(error = %e, "control command rejected");
        }
        !was_running && monitor.is_running()
    }

    /// Tick `monitor` on its configured interval until `limit` ticks have run or
    /// `shutdown` resolves.
    ///
    /// Timer beats that arrive while the monitor is paused are skipped. Commands from
    /// `controls` are applied between ticks; resuming restarts the beat so the next tick
    /// lands one full interval later. When the monitor is paused and there is no open
    /// control channel, nothing can resume it and the driver returns `StopReason::Paused`.
    ///
    /// `on_tick` runs after every tick and may pause the monitor or change its interval;
    /// a new interval applies from the next beat.
    pub async fn drive<R, S, F>(
        monitor: &mut Monitor<R>,
        limit: Option<u64>,
        mut controls: Option<mpsc::Receiver<Control>>,
        shutdown: S,
        mut on_tick: F,
    ) -> DriveSummary
    where
        R: RandomSource,
        S: Future<Output = ()>,
        F: FnMut(&mut Monitor<R>, &TickReport),
    {
        tokio::pin!(shutdown);

        let mut current = monitor.tick_interval();
        let mut timer = beat(current);

        let mut ticks = 0u64;
        if limit == Some(0) {
            return DriveSummary { ticks, reason: StopReason::Limit };
        }

        loop {
            if controls.is_none() && !monitor.is_running() {
                tracing::info!(ticks, "paused with no control channel");
                return DriveSummary { ticks, reason: StopReason::Paused };
            }

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::info!(ticks, "shutdown requested");
                    return DriveSummary { ticks, reason: StopReason::Shutdown };
                }
                cmd = next_control(&mut controls) => match cmd {
                    Some(cmd) => {
                        tracing::debug!(?cmd, "control command");
                        if apply(monitor, cmd) {
                            timer.reset();
                        }
                    }
                    None => {
                        tracing::debug!("control channel closed");
                        controls = None;
                    }
                },
                _ = timer.tick() => {
                    if !monitor.is_running() {
                        continue;
                    }
                    let report = monitor.tick();
                    ticks += 1;
                    on_tick(monitor, &report);

                    if limit.is_some_and(|n| ticks >= n) {
                        return DriveSummary { ticks, reason: StopReason::Limit };
                    }
                }
            }

            let wanted = monitor.tick_interval();
            if wanted != current {
                tracing::debug!(from = current.as_millis(), to = wanted.as_millis(), "tick interval changed");
                current = wanted;
                timer = beat(current);
            }
        }
    }
}
