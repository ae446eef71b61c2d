/// Failure of a single delivery attempt.
///
/// Terminal for that entry: the shipper reports it on the local error
/// stream and drops the entry.
#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("failed to serialize log entry: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to send log entry: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("collector returned error status {0}")]
    Status(u16),
}

/// Error type returned when building or accessing a shipper.
#[derive(thiserror::Error, Debug)]
pub enum ShipperError {
    #[error("logger not initialized; call init_logger first")]
    NotInitialized,

    #[error("no tokio runtime available to run shipping tasks")]
    NoRuntime,

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}
