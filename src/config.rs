use crate::env::{self, ENVIRONMENT_ENV, SERVER_IP_ENV};
use std::time::Duration;

/// Collector the environment loader ships to.
pub const DEFAULT_ENDPOINT: &str = "http://logstash:5000";

/// Service name stamped on every entry.
pub const DEFAULT_SERVICE_NAME: &str = "go-api";

/// Used when `ENVIRONMENT` is unset.
pub const DEFAULT_ENVIRONMENT: &str = "production";

/// Used when `SERVER_IP` is unset.
pub const DEFAULT_SERVER_IP: &str = "147.45.183.143";

/// The only environment in which `debug` entries are emitted.
pub const DEVELOPMENT: &str = "development";

/// Connection settings for the shared HTTP client.
///
/// **Fields**
/// - `timeout`: upper bound for one POST, connect included.
/// - `max_idle_per_host`: idle connections kept per collector host.
/// - `max_idle_total`: overall idle budget. reqwest pools per host, so
///   with a single collector this equals `max_idle_per_host`.
/// - `idle_timeout`: idle connections older than this are closed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub max_idle_per_host: usize,
    pub max_idle_total: usize,
    pub idle_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            max_idle_per_host: 100,
            max_idle_total: 100,
            idle_timeout: Duration::from_secs(90),
        }
    }
}

/// Immutable shipper configuration.
///
/// Built once, either from the environment with [`ShipperConfig::from_env`]
/// or explicitly with [`ShipperConfig::new`] and the `with_*` methods,
/// then shared by every entry the shipper produces.
#[derive(Clone, Debug)]
pub struct ShipperConfig {
    pub endpoint: String,
    pub service_name: String,
    pub environment: String,
    pub hostname: String,
    pub server_ip: String,
    /// Compiler identifier captured at build time.
    pub runtime_version: String,
    pub transport: TransportConfig,
    /// Mirror every entry to stdout.
    pub console: bool,
}

impl ShipperConfig {
    /// Configuration for `endpoint` with every other field at its default.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            environment: DEFAULT_ENVIRONMENT.to_string(),
            hostname: env::hostname(),
            server_ip: DEFAULT_SERVER_IP.to_string(),
            runtime_version: env!("LOG_SHIPPER_RUSTC_VERSION").to_string(),
            transport: TransportConfig::default(),
            console: true,
        }
    }

    /// Read `ENVIRONMENT`, `SERVER_IP` and the host name from the process
    /// environment. The endpoint is always [`DEFAULT_ENDPOINT`].
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ShipperConfig::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self::new(DEFAULT_ENDPOINT)
            .with_environment(var(ENVIRONMENT_ENV, DEFAULT_ENVIRONMENT))
            .with_server_ip(var(SERVER_IP_ENV, DEFAULT_SERVER_IP))
    }

    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    pub fn with_server_ip(mut self, ip: impl Into<String>) -> Self {
        self.server_ip = ip.into();
        self
    }

    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_console(mut self, enabled: bool) -> Self {
        self.console = enabled;
        self
    }

    /// Whether `debug` entries should be emitted.
    pub fn is_development(&self) -> bool {
        self.environment == DEVELOPMENT
    }
}
