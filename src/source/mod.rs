//! Device reading source abstraction
//!
//! The engine never talks to the network itself; the surrounding
//! application supplies a [`ReadingSource`] backed by its HTTP layer. The
//! trait exists so tests can run against mocks, the same seam the rest of
//! the crate is built on.

pub mod record;

use crate::domain::Observation;
use crate::error::FetchError;

pub use record::{parse_record, ApiEnvelope, RecordPayload};

/// External collaborator that produces readings for devices
///
/// Implementations may block; the poll scheduler calls `fetch_reading` from
/// a worker thread so a hung fetch never stalls the timer.
pub trait ReadingSource: Send + Sync {
    /// Fetch the latest reading for a device
    ///
    /// Returns `Observation::NoData` when the device has nothing new. A
    /// transport failure is an `Err`; the scheduler degrades it to no-data
    /// and counts it toward the unreachable notice.
    fn fetch_reading(&self, device_id: &str) -> Result<Observation, FetchError>;

    /// List the known device identifiers, in presentation order
    ///
    /// Identifiers are opaque keys; the engine does not validate them.
    fn list_device_ids(&self) -> Result<Vec<String>, FetchError>;
}
