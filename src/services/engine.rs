//! Monitoring engine facade
//!
//! Wires the threshold store, alarm store, and poll scheduler together and
//! exposes the surface the presentation layer consumes. One engine watches
//! one device at a time; nothing here precludes holding several engines
//! against the same shared stores for multi-device watching.

use crate::alarm::{AlarmEvent, AlarmState, AlarmStateStore, AlarmSubscriber};
use crate::config::EngineConfig;
use crate::domain::{ThresholdSet, ThresholdStore};
use crate::error::{FetchError, Result};
use crate::poll::PollScheduler;
use crate::source::ReadingSource;
use std::sync::Arc;
use std::time::Duration;

/// Threshold monitoring and alarm engine
pub struct MonitorEngine {
    source: Arc<dyn ReadingSource>,
    thresholds: Arc<ThresholdStore>,
    alarms: Arc<AlarmStateStore>,
    scheduler: PollScheduler,
}

impl MonitorEngine {
    /// Create an engine from configuration and a reading source
    ///
    /// Fails when the configured thresholds are invalid.
    pub fn new(config: &EngineConfig, source: Arc<dyn ReadingSource>) -> Result<Self> {
        let initial = config.thresholds.to_threshold_set()?;
        let thresholds = Arc::new(ThresholdStore::new(initial, config.interval()));
        let alarms = Arc::new(AlarmStateStore::new(config.general.max_history));
        let scheduler = PollScheduler::new(
            Arc::clone(&source),
            Arc::clone(&thresholds),
            Arc::clone(&alarms),
            config.lock_duration(),
        );

        Ok(Self {
            source,
            thresholds,
            alarms,
            scheduler,
        })
    }

    /// Begin watching a device at the configured interval
    ///
    /// Switching devices retargets the scheduler; results still in flight
    /// for the previous device are discarded.
    pub fn watch(&self, device_id: &str) {
        self.scheduler.start(device_id, self.thresholds.interval());
    }

    /// Stop watching; idempotent
    pub fn stop(&self) {
        self.scheduler.stop();
    }

    /// Snapshot of the current thresholds
    pub fn thresholds(&self) -> ThresholdSet {
        self.thresholds.get()
    }

    /// Replace the thresholds
    ///
    /// Rejected sets leave the previous thresholds in effect; accepted sets
    /// apply from the next poll tick.
    pub fn set_thresholds(&self, thresholds: ThresholdSet) -> Result<()> {
        self.thresholds.set(thresholds)?;
        Ok(())
    }

    /// Current poll interval
    pub fn interval(&self) -> Duration {
        self.thresholds.interval()
    }

    /// Change the poll interval, floored to one second
    ///
    /// Also retunes a running schedule; the next tick fires one new
    /// interval from now.
    pub fn set_interval(&self, interval: Duration) {
        let clamped = self.thresholds.set_interval(interval);
        self.scheduler.set_interval(clamped);
    }

    /// Current alarm state for a device
    pub fn alarm_state(&self, device_id: &str) -> AlarmState {
        self.alarms.get(device_id)
    }

    /// Alarm history for a device, most recent first
    pub fn alarm_history(&self, device_id: &str) -> Vec<AlarmEvent> {
        self.alarms.history(device_id)
    }

    /// Register a callback invoked whenever a device's alarm state changes
    pub fn subscribe(&self, device_id: &str, subscriber: AlarmSubscriber) {
        self.alarms.subscribe(device_id, subscriber);
    }

    /// Known device identifiers, in presentation order
    pub fn device_ids(&self) -> std::result::Result<Vec<String>, FetchError> {
        self.source.list_device_ids()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::AlarmPhase;
    use crate::config::ThresholdsConfig;
    use crate::domain::Metric;
    use crate::mock::MockSource;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    fn engine_with(source: MockSource, temp_max: f64) -> MonitorEngine {
        let config = EngineConfig {
            thresholds: ThresholdsConfig {
                temperature: Some(temp_max),
                ..Default::default()
            },
            ..Default::default()
        };
        MonitorEngine::new(&config, Arc::new(source)).unwrap()
    }

    #[test]
    fn test_rejects_invalid_config_thresholds() {
        let config = EngineConfig {
            thresholds: ThresholdsConfig {
                humidity: Some(200.0),
                ..Default::default()
            },
            ..Default::default()
        };
        let result = MonitorEngine::new(&config, Arc::new(MockSource::new()));
        assert!(result.is_err());
    }

    #[test]
    fn test_set_thresholds_validates() {
        let engine = engine_with(MockSource::new(), 30.0);

        let bad = ThresholdSet::default().with_bound(Metric::Temperature, -5.0);
        assert!(engine.set_thresholds(bad).is_err());
        // Previous thresholds remain in effect
        assert_eq!(engine.thresholds().bound(Metric::Temperature), Some(30.0));
    }

    #[test]
    fn test_interval_floor() {
        let engine = engine_with(MockSource::new(), 30.0);
        engine.set_interval(Duration::from_millis(50));
        assert_eq!(engine.interval(), Duration::from_millis(1000));
    }

    #[test]
    fn test_device_ids_delegates_to_source() {
        let source = MockSource::new()
            .with_temperature("127.0.0.1", 20.0)
            .with_temperature("192.168.0.2", 20.0);
        let engine = engine_with(source, 30.0);

        let ids = engine.device_ids().unwrap();
        assert_eq!(ids, vec!["127.0.0.1", "192.168.0.2"]);
    }

    #[test]
    fn test_watch_raises_alarm_and_notifies_subscriber() {
        let source = MockSource::new().with_temperature("192.168.0.2", 35.0);
        let engine = engine_with(source, 30.0);

        let notified = Arc::new(AtomicUsize::new(0));
        let notified_clone = Arc::clone(&notified);
        engine.subscribe(
            "192.168.0.2",
            Box::new(move |_, state| {
                if state.phase == AlarmPhase::Locked {
                    notified_clone.fetch_add(1, Ordering::SeqCst);
                }
            }),
        );

        engine.watch("192.168.0.2");
        thread::sleep(Duration::from_millis(150));
        engine.stop();

        assert_eq!(engine.alarm_state("192.168.0.2").phase, AlarmPhase::Locked);
        let history = engine.alarm_history("192.168.0.2");
        assert_eq!(history.len(), 1);
        assert!(history[0].message.contains("temperature"));
        assert!(notified.load(Ordering::SeqCst) >= 1);
    }

    #[test]
    fn test_unwatched_device_reads_clear() {
        let engine = engine_with(MockSource::new(), 30.0);
        let state = engine.alarm_state("10.9.9.9");
        assert_eq!(state.phase, AlarmPhase::Clear);
        assert!(state.since.is_none());
    }
}
