//! Mock implementations for testing
//!
//! Provides a scripted reading source for unit testing without a network.

use crate::domain::{Observation, Reading};
use crate::error::FetchError;
use crate::source::ReadingSource;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

/// Scripted response for one fetch
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Deliver a reading with the given temperature
    Temperature(f64),
    /// Deliver an empty tick
    NoData,
    /// Fail with a transport error
    Fail,
}

/// Mock reading source
///
/// Each device carries a queue of scripted responses; the last one is
/// sticky and repeats once the queue is drained. An optional delay makes
/// every fetch slow, for in-flight coalescing and staleness tests.
pub struct MockSource {
    device_order: Mutex<Vec<String>>,
    scripts: Mutex<HashMap<String, Vec<MockResponse>>>,
    positions: Mutex<HashMap<String, usize>>,
    fetch_counts: Mutex<HashMap<String, AtomicUsize>>,
    delay: Mutex<Duration>,
}

impl MockSource {
    /// Create an empty mock source
    pub fn new() -> Self {
        Self {
            device_order: Mutex::new(Vec::new()),
            scripts: Mutex::new(HashMap::new()),
            positions: Mutex::new(HashMap::new()),
            fetch_counts: Mutex::new(HashMap::new()),
            delay: Mutex::new(Duration::ZERO),
        }
    }

    /// Builder: script a response for a device
    pub fn with_response(self, device_id: &str, response: MockResponse) -> Self {
        self.push_response(device_id, response);
        self
    }

    /// Builder: device always reports the given temperature
    pub fn with_temperature(self, device_id: &str, value: f64) -> Self {
        self.with_response(device_id, MockResponse::Temperature(value))
    }

    /// Builder: device always fails with a transport error
    pub fn with_failures(self, device_id: &str) -> Self {
        self.with_response(device_id, MockResponse::Fail)
    }

    /// Builder: every fetch takes this long
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock().unwrap() = delay;
        self
    }

    /// Append a scripted response for a device
    pub fn push_response(&self, device_id: &str, response: MockResponse) {
        let mut order = self.device_order.lock().unwrap();
        if !order.iter().any(|d| d == device_id) {
            order.push(device_id.to_string());
        }
        self.scripts
            .lock()
            .unwrap()
            .entry(device_id.to_string())
            .or_default()
            .push(response);
    }

    /// Number of fetches issued for a device
    pub fn fetch_count(&self, device_id: &str) -> usize {
        self.fetch_counts
            .lock()
            .unwrap()
            .get(device_id)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    fn next_response(&self, device_id: &str) -> Option<MockResponse> {
        let scripts = self.scripts.lock().unwrap();
        let script = scripts.get(device_id)?;
        if script.is_empty() {
            return None;
        }

        let mut positions = self.positions.lock().unwrap();
        let position = positions.entry(device_id.to_string()).or_insert(0);
        // The last scripted response is sticky
        let index = (*position).min(script.len() - 1);
        *position += 1;
        Some(script[index].clone())
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadingSource for MockSource {
    fn fetch_reading(&self, device_id: &str) -> Result<Observation, FetchError> {
        self.fetch_counts
            .lock()
            .unwrap()
            .entry(device_id.to_string())
            .or_insert_with(|| AtomicUsize::new(0))
            .fetch_add(1, Ordering::SeqCst);

        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }

        match self.next_response(device_id) {
            Some(MockResponse::Temperature(value)) => Ok(Observation::Reading(
                Reading::new(device_id, SystemTime::now()).with_temperature(value),
            )),
            Some(MockResponse::NoData) | None => Ok(Observation::NoData),
            Some(MockResponse::Fail) => Err(FetchError::Transport {
                device: device_id.to_string(),
                message: "connection refused".to_string(),
            }),
        }
    }

    fn list_device_ids(&self) -> Result<Vec<String>, FetchError> {
        Ok(self.device_order.lock().unwrap().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Metric;

    #[test]
    fn test_scripted_responses_in_order_with_sticky_last() {
        let source = MockSource::new()
            .with_response("127.0.0.1", MockResponse::NoData)
            .with_temperature("127.0.0.1", 25.0);

        assert_eq!(source.fetch_reading("127.0.0.1").unwrap(), Observation::NoData);
        for _ in 0..3 {
            let obs = source.fetch_reading("127.0.0.1").unwrap();
            assert_eq!(obs.reading().unwrap().value(Metric::Temperature), Some(25.0));
        }
        assert_eq!(source.fetch_count("127.0.0.1"), 4);
    }

    #[test]
    fn test_unknown_device_yields_no_data() {
        let source = MockSource::new();
        assert_eq!(source.fetch_reading("10.0.0.1").unwrap(), Observation::NoData);
    }

    #[test]
    fn test_failures_surface_as_transport_errors() {
        let source = MockSource::new().with_failures("127.0.0.1");
        assert!(matches!(
            source.fetch_reading("127.0.0.1"),
            Err(FetchError::Transport { .. })
        ));
    }

    #[test]
    fn test_device_listing_preserves_order() {
        let source = MockSource::new()
            .with_temperature("192.168.0.2", 20.0)
            .with_temperature("127.0.0.1", 20.0);
        assert_eq!(
            source.list_device_ids().unwrap(),
            vec!["192.168.0.2", "127.0.0.1"]
        );
    }
}
