//! Alarm state store
//!
//! Holds per-device alarm state and a capped, append-only event history,
//! and fans state changes out to registered subscribers. Shared across
//! schedulers; every mutation goes through [`AlarmStateStore::apply`].

use crate::alarm::evaluator::{AlarmAction, Evaluation};
use crate::alarm::types::{AlarmEvent, AlarmState};
use std::collections::{HashMap, VecDeque};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

/// Default cap on retained events per device; oldest evicted first.
pub const DEFAULT_MAX_HISTORY: usize = 500;

/// Callback invoked when a device's alarm state changes
pub type AlarmSubscriber = Box<dyn Fn(&str, &AlarmState) + Send + Sync>;

#[derive(Default)]
struct DeviceRecord {
    state: AlarmState,
    history: VecDeque<AlarmEvent>,
}

/// Per-device alarm state and history
pub struct AlarmStateStore {
    // Subscribers live behind their own lock so callbacks can read the
    // store without deadlocking.
    devices: Mutex<HashMap<String, DeviceRecord>>,
    subscribers: Mutex<HashMap<String, Vec<Arc<dyn Fn(&str, &AlarmState) + Send + Sync>>>>,
    max_history: usize,
}

impl AlarmStateStore {
    /// Create a store with the given per-device history cap
    pub fn new(max_history: usize) -> Self {
        Self {
            devices: Mutex::new(HashMap::new()),
            subscribers: Mutex::new(HashMap::new()),
            max_history,
        }
    }

    /// Current alarm state for a device
    ///
    /// A device that has never been evaluated reads as `Clear` with no
    /// `since`.
    pub fn get(&self, device_id: &str) -> AlarmState {
        let devices = self.devices.lock().unwrap_or_else(|e| e.into_inner());
        devices
            .get(device_id)
            .map(|r| r.state)
            .unwrap_or_default()
    }

    /// Apply an evaluation result: replace the state and update history
    ///
    /// Subscribers for the device are invoked after the mutation when the
    /// state actually changed.
    pub fn apply(&self, device_id: &str, evaluation: Evaluation) {
        let changed = {
            let mut devices = self.devices.lock().unwrap_or_else(|e| e.into_inner());
            let record = devices.entry(device_id.to_string()).or_default();

            let changed = record.state != evaluation.state;
            record.state = evaluation.state;

            match evaluation.action {
                Some(AlarmAction::Raised(event)) => {
                    Self::push_event(record, event, self.max_history);
                }
                Some(AlarmAction::Cleared { at }) => {
                    Self::finalize_open_event(record, at);
                }
                Some(AlarmAction::Rearmed { at, event }) => {
                    Self::finalize_open_event(record, at);
                    Self::push_event(record, event, self.max_history);
                }
                None => {}
            }

            changed
        };

        if changed {
            self.notify(device_id, &evaluation.state);
        }
    }

    /// Alarm history for a device, most recent first
    pub fn history(&self, device_id: &str) -> Vec<AlarmEvent> {
        let devices = self.devices.lock().unwrap_or_else(|e| e.into_inner());
        devices
            .get(device_id)
            .map(|r| r.history.iter().rev().cloned().collect())
            .unwrap_or_default()
    }

    /// Register a callback invoked on every state change for a device
    pub fn subscribe(&self, device_id: &str, subscriber: AlarmSubscriber) {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        subscribers
            .entry(device_id.to_string())
            .or_default()
            .push(Arc::from(subscriber));
    }

    fn push_event(record: &mut DeviceRecord, event: AlarmEvent, max_history: usize) {
        if max_history == 0 {
            return;
        }
        record.history.push_back(event);
        while record.history.len() > max_history {
            record.history.pop_front();
        }
    }

    fn finalize_open_event(record: &mut DeviceRecord, at: std::time::SystemTime) {
        if let Some(event) = record.history.iter_mut().rev().find(|e| e.is_open()) {
            event.cleared_at = Some(at);
        }
    }

    // Snapshot the list under the lock, invoke outside it: callbacks may
    // call back into the store, and a panicking callback must not take the
    // polling thread down with it.
    fn notify(&self, device_id: &str, state: &AlarmState) {
        let snapshot = {
            let subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
            match subscribers.get(device_id) {
                Some(list) => list.clone(),
                None => return,
            }
        };

        for subscriber in snapshot {
            if catch_unwind(AssertUnwindSafe(|| subscriber(device_id, state))).is_err() {
                log::warn!("alarm subscriber for {} panicked", device_id);
            }
        }
    }
}

impl Default for AlarmStateStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}
