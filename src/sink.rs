use crate::error::SinkError;
use crate::record::LogEntry;
use async_trait::async_trait;

/// Asynchronous destination for [`LogEntry`]s produced by the shipper.
///
/// Implementations transport entries to a concrete backend (an HTTP
/// collector, nothing at all, a test buffer). The shipper calls `send`
/// from a spawned task, once per entry, and never awaits it on the
/// caller's thread.
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Deliver a single entry.
    ///
    /// **Returns**
    /// - `Ok(())` if the backend accepted the entry.
    /// - `Err(..)` on serialization, network or status failure. The
    ///   shipper reports it once and does not retry.
    async fn send(&self, entry: &LogEntry) -> Result<(), SinkError>;
}
