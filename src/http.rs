use crate::config::TransportConfig;
use crate::error::{ShipperError, SinkError};
use crate::record::LogEntry;
use crate::sink::LogSink;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

/// HTTP implementation of [`LogSink`]: one JSON document per POST.
///
/// The underlying [`Client`] owns the connection pool and is built once;
/// clones of the sink share it.
#[derive(Clone, Debug)]
pub struct HttpSink {
    client: Client,
    endpoint: String,
}

impl HttpSink {
    /// Build a sink posting to `endpoint` with the given pool and timeout
    /// settings.
    ///
    /// **Returns**
    /// - `Err(ShipperError::Client)` if the TLS backend or client could
    ///   not be initialized.
    pub fn new(endpoint: impl Into<String>, transport: &TransportConfig) -> Result<Self, ShipperError> {
        let client = Client::builder()
            .timeout(transport.timeout)
            .pool_max_idle_per_host(transport.max_idle_per_host.min(transport.max_idle_total))
            .pool_idle_timeout(transport.idle_timeout)
            .build()
            .map_err(ShipperError::Client)?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl LogSink for HttpSink {
    async fn send(&self, entry: &LogEntry) -> Result<(), SinkError> {
        let body = serde_json::to_vec(entry)?;
        let resp = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        // Body is discarded either way.
        let status = resp.status();
        if status.as_u16() >= 400 {
            Err(SinkError::Status(status.as_u16()))
        } else {
            Ok(())
        }
    }
}
