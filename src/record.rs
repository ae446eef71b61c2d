use crate::config::ShipperConfig;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::panic::Location;

/// Free-form structured data attached to an entry.
pub type Fields = BTreeMap<String, serde_json::Value>;

/// Key under which the originating call site is recorded.
pub const CALLER_KEY: &str = "caller";

/// Severity of a [`LogEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `pad` so that width specifiers like `{:<5}` apply.
        f.pad(self.as_str())
    }
}

/// One structured record as it is sent to the collector.
///
/// Static fields (`service`, `environment`, `host`, `server_ip`,
/// `runtime_version`) are copied from the [`ShipperConfig`] and are the
/// same for every entry built from it.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    #[serde(rename = "@timestamp", serialize_with = "rfc3339_nanos")]
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub service: String,
    pub message: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: Fields,
    pub environment: String,
    pub host: String,
    pub server_ip: String,
    /// Kept under the collector's existing `go_version` column.
    #[serde(rename = "go_version")]
    pub runtime_version: String,
}

impl LogEntry {
    /// Build a fully-populated entry.
    ///
    /// **Parameters**
    /// - `config`: source of the static fields.
    /// - `level`, `message`: copied as-is.
    /// - `fields`: caller-supplied map; `None` is treated as empty.
    /// - `caller`: `file:line` of the originating call; stored under
    ///   [`CALLER_KEY`], replacing any caller-supplied value. Omitted
    ///   when `None`.
    pub fn build(
        config: &ShipperConfig,
        level: Level,
        message: impl Into<String>,
        fields: Option<Fields>,
        caller: Option<String>,
    ) -> Self {
        let mut fields = fields.unwrap_or_default();
        if let Some(caller) = caller {
            fields.insert(CALLER_KEY.to_string(), serde_json::Value::String(caller));
        }

        LogEntry {
            timestamp: Utc::now(),
            level,
            service: config.service_name.clone(),
            message: message.into(),
            fields,
            environment: config.environment.clone(),
            host: config.hostname.clone(),
            server_ip: config.server_ip.clone(),
            runtime_version: config.runtime_version.clone(),
        }
    }
}

/// Render a call site as `file:line`.
pub fn caller_of(location: &Location<'_>) -> String {
    format!("{}:{}", location.file(), location.line())
}

fn rfc3339_nanos<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Nanos, true))
}
