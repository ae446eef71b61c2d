use crate::config::ShipperConfig;
use crate::console::Console;
use crate::error::ShipperError;
use crate::http::HttpSink;
use crate::record::{caller_of, Fields, Level, LogEntry};
use crate::sink::LogSink;
use std::panic::Location;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::time::Duration;
use tracing::instrument::WithSubscriber;
use tracing::subscriber::NoSubscriber;

/// Fire-and-forget log shipper.
///
/// Every call mirrors the entry to the console synchronously and spawns
/// one task that builds, serializes and delivers it to the [`LogSink`].
/// The caller never waits for delivery and never observes its failure;
/// failures are written once to the console's error stream and the entry
/// is dropped. There is no retry and no ordering between entries.
///
/// Cloning is cheap: clones share configuration, sink, console and
/// counters.
#[derive(Clone)]
pub struct AsyncLogShipper {
    config: Arc<ShipperConfig>,
    sink: Arc<dyn LogSink>,
    console: Console,
    runtime: Handle,
    stats: Arc<Counters>,
    drained: Arc<Notify>,
}

#[derive(Debug, Default)]
struct Counters {
    dispatched: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
    suppressed: AtomicU64,
    in_flight: AtomicUsize,
}

/// Point-in-time view of the shipper's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShipperStats {
    /// Entries handed to a shipping task.
    pub dispatched: u64,
    /// Entries the sink accepted.
    pub delivered: u64,
    /// Entries dropped after a delivery failure.
    pub failed: u64,
    /// `debug` calls dropped outside development.
    pub suppressed: u64,
    /// Shipping tasks not yet finished.
    pub in_flight: usize,
}

impl AsyncLogShipper {
    /// Shipper posting to `config.endpoint` over a pooled HTTP client and
    /// mirroring to stdout/stderr.
    ///
    /// Must be called from within a tokio runtime; shipping tasks run on
    /// that runtime even when later `log` calls come from other threads.
    pub fn new(config: ShipperConfig) -> Result<Self, ShipperError> {
        let sink = HttpSink::new(config.endpoint.clone(), &config.transport)?;
        Self::with_sink(config, Arc::new(sink))
    }

    /// Shipper delivering to an arbitrary sink.
    pub fn with_sink(config: ShipperConfig, sink: Arc<dyn LogSink>) -> Result<Self, ShipperError> {
        let runtime = Handle::try_current().map_err(|_| ShipperError::NoRuntime)?;

        tracing::debug!(
            endpoint = %config.endpoint,
            environment = %config.environment,
            hostname = %config.hostname,
            "log shipper constructed"
        );

        Ok(Self {
            config: Arc::new(config),
            sink,
            console: Console::stdio(),
            runtime,
            stats: Arc::new(Counters::default()),
            drained: Arc::new(Notify::new()),
        })
    }

    /// Replace the local output streams.
    pub fn with_console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }

    pub fn config(&self) -> &ShipperConfig {
        &self.config
    }

    pub fn stats(&self) -> ShipperStats {
        ShipperStats {
            dispatched: self.stats.dispatched.load(Ordering::Relaxed),
            delivered: self.stats.delivered.load(Ordering::Relaxed),
            failed: self.stats.failed.load(Ordering::Relaxed),
            suppressed: self.stats.suppressed.load(Ordering::Relaxed),
            in_flight: self.stats.in_flight.load(Ordering::Acquire),
        }
    }

    /// Mirror to the console and ship in the background. Returns without
    /// waiting for delivery.
    ///
    /// `fields["caller"]` is set to the file and line that invoked this
    /// method (or the public wrapper that forwarded to it).
    #[track_caller]
    pub fn log(&self, level: Level, message: impl Into<String>, fields: Option<Fields>) {
        let caller = caller_of(Location::caller());
        self.dispatch(level, message.into(), fields, Some(caller));
    }

    #[track_caller]
    pub fn info(&self, message: impl Into<String>, fields: Option<Fields>) {
        self.log(Level::Info, message, fields);
    }

    #[track_caller]
    pub fn warn(&self, message: impl Into<String>, fields: Option<Fields>) {
        self.log(Level::Warn, message, fields);
    }

    #[track_caller]
    pub fn error(&self, message: impl Into<String>, fields: Option<Fields>) {
        self.log(Level::Error, message, fields);
    }

    /// Like [`info`](Self::info) but only in the `development`
    /// environment; elsewhere the call is dropped before anything is
    /// built or printed.
    #[track_caller]
    pub fn debug(&self, message: impl Into<String>, fields: Option<Fields>) {
        if self.suppress_debug() {
            return;
        }
        self.log(Level::Debug, message, fields);
    }

    /// Records the drop when debug output is disabled.
    pub(crate) fn suppress_debug(&self) -> bool {
        if self.config.is_development() {
            return false;
        }
        self.stats.suppressed.fetch_add(1, Ordering::Relaxed);
        true
    }

    pub(crate) fn dispatch(&self, level: Level, message: String, fields: Option<Fields>, caller: Option<String>) {
        if self.config.console {
            self.console.mirror(level, &message, fields.as_ref());
        }

        self.stats.dispatched.fetch_add(1, Ordering::Relaxed);
        let guard = InFlight::enter(Arc::clone(&self.stats), Arc::clone(&self.drained));

        let config = Arc::clone(&self.config);
        let sink = Arc::clone(&self.sink);
        let console = self.console.clone();
        let stats = Arc::clone(&self.stats);

        // Detached: nothing awaits the handle. The transport's own
        // events must not reach a `ShipperLayer`, or every delivery
        // would log further entries.
        let ship = async move {
            let _guard = guard;
            let entry = LogEntry::build(&config, level, message, fields, caller);
            match sink.send(&entry).await {
                Ok(()) => {
                    stats.delivered.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    stats.failed.fetch_add(1, Ordering::Relaxed);
                    console.report_error(&format!("failed to ship log entry: {}", e));
                }
            }
        };
        self.runtime.spawn(ship.with_subscriber(NoSubscriber::default()));
    }

    /// Wait until no shipping task is in flight, for at most `timeout`.
    ///
    /// Returns `true` if everything drained. Entries logged while
    /// waiting are waited for too.
    pub async fn flush(&self, timeout: Duration) -> bool {
        let drained = async {
            loop {
                let notified = self.drained.notified();
                tokio::pin!(notified);
                notified.as_mut().enable();
                if self.stats.in_flight.load(Ordering::Acquire) == 0 {
                    return;
                }
                notified.await;
            }
        };
        tokio::time::timeout(timeout, drained).await.is_ok()
    }
}

/// Counts one shipping task from spawn until it finishes or is dropped
/// unrun by a runtime that shut down.
struct InFlight {
    stats: Arc<Counters>,
    drained: Arc<Notify>,
}

impl InFlight {
    fn enter(stats: Arc<Counters>, drained: Arc<Notify>) -> Self {
        stats.in_flight.fetch_add(1, Ordering::AcqRel);
        Self { stats, drained }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if self.stats.in_flight.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.drained.notify_waiters();
        }
    }
}
