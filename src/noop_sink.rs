use crate::error::SinkError;
use crate::record::LogEntry;
use crate::sink::LogSink;
use async_trait::async_trait;

/// Accepts every entry and discards it.
///
/// Lets the `default_load` demo time the dispatch path alone: console
/// rendering, task spawn and entry serialization never reach a socket.
#[derive(Clone, Default)]
pub struct NoopSink;

#[async_trait]
impl LogSink for NoopSink {
    async fn send(&self, _entry: &LogEntry) -> Result<(), SinkError> {
        Ok(())
    }
}
