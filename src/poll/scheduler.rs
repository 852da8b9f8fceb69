//! Poll scheduling
//!
//! Drives periodic fetches for the currently selected device and feeds the
//! results to the alarm evaluator. One dedicated scheduler thread owns all
//! mutable scheduling state; commands from the owner and results from fetch
//! workers arrive over the same channel, so everything for a device is
//! processed in arrival order.
//!
//! Fetches run on short-lived worker threads: a hung fetch never blocks the
//! tick timer. At most one fetch is in flight at a time; a tick that fires
//! while one is outstanding is coalesced (dropped) rather than queued.
//! Every outstanding fetch is stamped with the generation current at spawn;
//! `start`/`stop` bump the generation, so late results from a previous
//! schedule are discarded without touching state.

use crate::alarm::{evaluate, AlarmStateStore};
use crate::domain::{Observation, ThresholdStore};
use crate::source::ReadingSource;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant, SystemTime};

/// Consecutive fetch failures before the single unreachable notice
pub const UNREACHABLE_AFTER_FAILURES: u32 = 3;

/// Wait used when no schedule is active
const IDLE_WAIT: Duration = Duration::from_secs(60);

enum Msg {
    Start {
        device_id: String,
        interval: Duration,
    },
    SetInterval(Duration),
    Stop,
    Shutdown,
    FetchDone {
        generation: u64,
        seq: u64,
        device_id: String,
        outcome: Observation,
        failed: bool,
    },
}

/// Periodic poll driver for one device view
///
/// Interval floors are enforced by the configuration layer; the scheduler
/// runs whatever cadence it is handed.
pub struct PollScheduler {
    tx: Sender<Msg>,
    handle: Option<JoinHandle<()>>,
}

impl PollScheduler {
    /// Create a scheduler and spawn its thread
    ///
    /// The scheduler is idle until [`start`](Self::start) is called.
    pub fn new(
        source: Arc<dyn ReadingSource>,
        thresholds: Arc<ThresholdStore>,
        alarms: Arc<AlarmStateStore>,
        lock_duration: Duration,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        let worker_tx = tx.clone();

        let handle = thread::spawn(move || {
            let mut state = SchedulerState {
                source,
                thresholds,
                alarms,
                lock_duration,
                tx: worker_tx,
                generation: 0,
                active: None,
            };

            loop {
                let timeout = match &state.active {
                    Some(schedule) => schedule.next_tick.saturating_duration_since(Instant::now()),
                    None => IDLE_WAIT,
                };

                match rx.recv_timeout(timeout) {
                    Ok(Msg::Shutdown) => break,
                    Ok(msg) => state.handle(msg),
                    Err(RecvTimeoutError::Timeout) => state.on_tick(),
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });

        Self {
            tx,
            handle: Some(handle),
        }
    }

    /// Begin polling a device at the given interval
    ///
    /// Replaces any previous schedule; a re-start with identical parameters
    /// is a no-op. The first tick fires immediately.
    pub fn start(&self, device_id: &str, interval: Duration) {
        let _ = self.tx.send(Msg::Start {
            device_id: device_id.to_string(),
            interval,
        });
    }

    /// Change the cadence of the running schedule
    ///
    /// The next tick is rescheduled relative to now; shrinking the interval
    /// never produces a burst of catch-up ticks. Ignored when idle.
    pub fn set_interval(&self, interval: Duration) {
        let _ = self.tx.send(Msg::SetInterval(interval));
    }

    /// Halt polling; idempotent
    ///
    /// Any outstanding fetch result is discarded when it arrives.
    pub fn stop(&self) {
        let _ = self.tx.send(Msg::Stop);
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        let _ = self.tx.send(Msg::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

struct ActiveSchedule {
    device_id: String,
    interval: Duration,
    next_tick: Instant,
    in_flight: bool,
    seq: u64,
    consecutive_failures: u32,
    unreachable_reported: bool,
}

struct SchedulerState {
    source: Arc<dyn ReadingSource>,
    thresholds: Arc<ThresholdStore>,
    alarms: Arc<AlarmStateStore>,
    lock_duration: Duration,
    tx: Sender<Msg>,
    generation: u64,
    active: Option<ActiveSchedule>,
}

impl SchedulerState {
    fn handle(&mut self, msg: Msg) {
        match msg {
            Msg::Start {
                device_id,
                interval,
            } => self.on_start(device_id, interval),
            Msg::SetInterval(interval) => self.on_set_interval(interval),
            Msg::Stop => self.on_stop(),
            Msg::FetchDone {
                generation,
                seq,
                device_id,
                outcome,
                failed,
            } => self.on_fetch_done(generation, seq, device_id, outcome, failed),
            Msg::Shutdown => unreachable!("handled by the run loop"),
        }
    }

    fn on_start(&mut self, device_id: String, interval: Duration) {
        if let Some(schedule) = &self.active {
            if schedule.device_id == device_id && schedule.interval == interval {
                log::debug!("start for {} with unchanged parameters, ignoring", device_id);
                return;
            }
        }

        // Invalidate any outstanding fetch from the previous schedule.
        self.generation += 1;
        log::debug!(
            "polling {} every {:?} (generation {})",
            device_id,
            interval,
            self.generation
        );

        self.active = Some(ActiveSchedule {
            device_id,
            interval,
            next_tick: Instant::now(),
            in_flight: false,
            seq: 0,
            consecutive_failures: 0,
            unreachable_reported: false,
        });
    }

    fn on_set_interval(&mut self, interval: Duration) {
        let Some(schedule) = &mut self.active else {
            log::debug!("set_interval while idle, ignoring");
            return;
        };
        schedule.interval = interval;
        schedule.next_tick = Instant::now() + interval;
        log::debug!(
            "interval for {} changed to {:?}",
            schedule.device_id,
            interval
        );
    }

    fn on_stop(&mut self) {
        if self.active.take().is_some() {
            self.generation += 1;
            log::debug!("polling stopped (generation {})", self.generation);
        }
    }

    fn on_tick(&mut self) {
        let generation = self.generation;
        let Some(schedule) = &mut self.active else {
            return;
        };

        schedule.next_tick = Instant::now() + schedule.interval;

        if schedule.in_flight {
            log::debug!(
                "tick for {} coalesced, fetch #{} still outstanding",
                schedule.device_id,
                schedule.seq
            );
            return;
        }

        schedule.in_flight = true;
        schedule.seq += 1;

        let tx = self.tx.clone();
        let source = Arc::clone(&self.source);
        let device_id = schedule.device_id.clone();
        let seq = schedule.seq;

        thread::spawn(move || {
            let (outcome, failed) = match source.fetch_reading(&device_id) {
                Ok(observation) => (observation, false),
                Err(e) => {
                    log::debug!("fetch #{} for {} failed: {}", seq, device_id, e);
                    (Observation::NoData, true)
                }
            };
            // The scheduler may already be gone during shutdown.
            let _ = tx.send(Msg::FetchDone {
                generation,
                seq,
                device_id,
                outcome,
                failed,
            });
        });
    }

    fn on_fetch_done(
        &mut self,
        generation: u64,
        seq: u64,
        device_id: String,
        outcome: Observation,
        failed: bool,
    ) {
        let current_generation = self.generation;
        let Some(schedule) = self
            .active
            .as_mut()
            .filter(|s| generation == current_generation && s.device_id == device_id)
        else {
            log::debug!("stale result for {} (fetch #{}) discarded", device_id, seq);
            return;
        };
        schedule.in_flight = false;

        if failed {
            schedule.consecutive_failures += 1;
            if schedule.consecutive_failures == UNREACHABLE_AFTER_FAILURES
                && !schedule.unreachable_reported
            {
                schedule.unreachable_reported = true;
                log::warn!(
                    "device {} unreachable after {} consecutive failed polls",
                    device_id,
                    schedule.consecutive_failures
                );
            }
        } else {
            schedule.consecutive_failures = 0;
            schedule.unreachable_reported = false;
        }

        // Thresholds are read once per evaluation; a concurrent set()
        // applies from the next tick onward.
        let thresholds = self.thresholds.get();
        let prev = self.alarms.get(&device_id);
        let evaluation = evaluate(
            &device_id,
            &prev,
            &outcome,
            &thresholds,
            SystemTime::now(),
            self.lock_duration,
        );
        self.alarms.apply(&device_id, evaluation);
    }
}
