//! Record payload decoding
//!
//! The fleet's collection API wraps every response in a `{code, data}`
//! envelope. A record carries the device address and nullable metric
//! fields; a null field means the device does not report that metric.

use crate::domain::{Observation, Reading};
use crate::error::FetchError;
use serde::Deserialize;
use std::time::SystemTime;

/// Response envelope used by the collection API
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Status code; 200 means the payload is usable
    pub code: u16,
    /// Payload, absent on non-success responses
    pub data: Option<T>,
}

/// One record as delivered by the collection API
#[derive(Debug, Deserialize)]
pub struct RecordPayload {
    /// Record id assigned by the collector
    #[serde(default)]
    pub eid: Option<u64>,
    /// Temperature sample, null when unsupported
    #[serde(rename = "temperatureVal")]
    pub temperature: Option<f64>,
    /// Smoke sample, null when unsupported
    #[serde(rename = "SmokeVal")]
    pub smoke: Option<f64>,
    /// Humidity sample, null when unsupported
    #[serde(rename = "HumidityVal")]
    pub humidity: Option<f64>,
    /// Collection timestamp as reported by the device, informational only
    #[serde(default)]
    pub etime: Option<String>,
    /// Device address the record belongs to
    #[serde(default)]
    pub ip: Option<String>,
}

impl RecordPayload {
    /// Convert into a [`Reading`] received at `now`
    ///
    /// `device_id` wins over the `ip` field: the scheduler already knows
    /// which device it asked about.
    pub fn into_reading(self, device_id: &str, now: SystemTime) -> Reading {
        Reading {
            device_id: device_id.to_string(),
            timestamp: now,
            temperature: self.temperature,
            smoke: self.smoke,
            humidity: self.humidity,
        }
    }
}

/// Decode a raw API response body into an observation
///
/// A non-200 envelope code or missing payload decodes to `NoData`; only a
/// malformed body is an error.
pub fn parse_record(
    body: &str,
    device_id: &str,
    now: SystemTime,
) -> Result<Observation, FetchError> {
    let envelope: ApiEnvelope<RecordPayload> = serde_json::from_str(body)?;

    if envelope.code != 200 {
        return Ok(Observation::NoData);
    }

    match envelope.data {
        Some(payload) => Ok(Observation::Reading(payload.into_reading(device_id, now))),
        None => Ok(Observation::NoData),
    }
}
