use crate::record::{Fields, Level as EntryLevel};
use crate::shipper::AsyncLogShipper;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that forwards `tracing` events to an
/// [`AsyncLogShipper`].
///
/// Events above `max_level` in verbosity are ignored. The event's
/// `message` becomes the entry message, its other fields become entry
/// fields, and its `file:line` becomes `caller`. `TRACE` and `DEBUG`
/// events follow the shipper's debug rule and are dropped outside
/// development. Events emitted by this crate or by the HTTP stack it
/// ships with are never forwarded.
pub struct ShipperLayer {
    shipper: AsyncLogShipper,
    max_level: Level,
}

impl ShipperLayer {
    /// Forward events at `INFO` and more severe.
    pub fn new(shipper: AsyncLogShipper) -> Self {
        Self::with_max_level(shipper, Level::INFO)
    }

    pub fn with_max_level(shipper: AsyncLogShipper, max_level: Level) -> Self {
        Self { shipper, max_level }
    }
}

/// Targets whose events would feed back into delivery. hyper spawns
/// connection tasks of its own, so scoping the shipping task alone does
/// not silence them.
const SHIPPING_TARGETS: &[&str] = &[
    env!("CARGO_CRATE_NAME"),
    "reqwest",
    "hyper",
    "hyper_util",
    "h2",
    "rustls",
    "tokio_rustls",
    "want",
];

fn is_shipping_target(target: &str) -> bool {
    SHIPPING_TARGETS.iter().any(|prefix| {
        target == *prefix
            || target
                .strip_prefix(prefix)
                .map_or(false, |rest| rest.starts_with("::"))
    })
}

fn entry_level(level: &Level) -> EntryLevel {
    match *level {
        Level::ERROR => EntryLevel::Error,
        Level::WARN => EntryLevel::Warn,
        Level::INFO => EntryLevel::Info,
        _ => EntryLevel::Debug,
    }
}

impl<S> Layer<S> for ShipperLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if *meta.level() > self.max_level {
            return;
        }
        if is_shipping_target(meta.target()) {
            return;
        }

        let level = entry_level(meta.level());
        if level == EntryLevel::Debug && self.shipper.suppress_debug() {
            return;
        }

        let mut fields = Fields::new();
        let mut message: Option<String> = None;
        event.record(&mut FieldVisitor { fields: &mut fields, message: &mut message });

        let caller = match (meta.file(), meta.line()) {
            (Some(file), Some(line)) => Some(format!("{}:{}", file, line)),
            _ => None,
        };

        let fields = if fields.is_empty() { None } else { Some(fields) };
        self.shipper.dispatch(level, message.unwrap_or_default(), fields, caller);
    }
}

struct FieldVisitor<'a> {
    fields: &'a mut Fields,
    message: &'a mut Option<String>,
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.fields.insert(field.name().to_string(), serde_json::Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        // `info!("text")` records its message through here.
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.fields.insert(field.name().to_string(), serde_json::Value::String(format!("{:?}", value)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShipperConfig;
    use crate::console::{CaptureBuffer, Console};
    use crate::error::SinkError;
    use crate::record::LogEntry;
    use crate::sink::LogSink;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use tokio::time::Duration;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::Registry;

    #[derive(Default)]
    struct RecordingSink(Mutex<Vec<LogEntry>>);

    #[async_trait]
    impl LogSink for RecordingSink {
        async fn send(&self, entry: &LogEntry) -> Result<(), SinkError> {
            self.0.lock().unwrap().push(entry.clone());
            Ok(())
        }
    }

    fn shipper(environment: &str, sink: Arc<RecordingSink>) -> AsyncLogShipper {
        AsyncLogShipper::with_sink(
            ShipperConfig::new("http://unused.test").with_environment(environment),
            sink,
        )
        .unwrap()
        .with_console(Console::with_writers(CaptureBuffer::new(), CaptureBuffer::new()))
    }

    #[tokio::test]
    async fn forwards_events_with_fields_and_call_site() {
        let sink = Arc::new(RecordingSink::default());
        let shipper = shipper("production", sink.clone());
        let subscriber = Registry::default().with(ShipperLayer::new(shipper.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::error!(target: "app", user_id = 42, reason = "invalid password", "authentication failed");
            tracing::debug!(target: "app", "dropped outside development");
        });
        assert!(shipper.flush(Duration::from_secs(2)).await);

        let entries = sink.0.lock().unwrap().clone();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.level, EntryLevel::Error);
        assert_eq!(entry.message, "authentication failed");
        assert_eq!(entry.fields["user_id"], json!(42));
        assert_eq!(entry.fields["reason"], json!("invalid password"));
        assert!(entry.fields["caller"].as_str().unwrap().starts_with("src/layer.rs:"));
    }

    #[test]
    fn shipping_targets_match_whole_path_segments() {
        assert!(is_shipping_target("log_shipper"));
        assert!(is_shipping_target("log_shipper::shipper"));
        assert!(is_shipping_target("hyper::proto::h1::conn"));
        assert!(is_shipping_target("reqwest::connect"));
        assert!(!is_shipping_target("hyperion"));
        assert!(!is_shipping_target("app::orders"));
    }

    #[tokio::test]
    async fn drops_events_from_the_shipping_stack() {
        let sink = Arc::new(RecordingSink::default());
        let shipper = shipper("development", sink.clone());
        let subscriber = Registry::default().with(ShipperLayer::with_max_level(shipper.clone(), Level::TRACE));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "log_shipper::shipper", "internal");
            tracing::debug!(target: "hyper::client::pool", "reuse idle connection");
            tracing::info!(target: "app", "kept");
        });
        assert!(shipper.flush(Duration::from_secs(2)).await);

        let entries = sink.0.lock().unwrap().clone();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "kept");
        assert_eq!(shipper.stats().dispatched, 1);
    }

    #[tokio::test]
    async fn trace_maps_to_debug_in_development() {
        let sink = Arc::new(RecordingSink::default());
        let shipper = shipper("development", sink.clone());
        let layer = ShipperLayer::with_max_level(shipper.clone(), Level::TRACE);
        let subscriber = Registry::default().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::trace!(target: "app", "fine-grained");
        });
        assert!(shipper.flush(Duration::from_secs(2)).await);

        let entries = sink.0.lock().unwrap().clone();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, EntryLevel::Debug);
    }

    #[tokio::test]
    async fn ignores_events_more_verbose_than_max_level() {
        let sink = Arc::new(RecordingSink::default());
        let shipper = shipper("development", sink.clone());
        let subscriber = Registry::default().with(ShipperLayer::with_max_level(shipper.clone(), Level::WARN));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "app", "below threshold");
            tracing::warn!(target: "app", "kept");
        });
        assert!(shipper.flush(Duration::from_secs(2)).await);

        let entries = sink.0.lock().unwrap().clone();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "kept");
    }
}
