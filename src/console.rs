use crate::record::{Fields, Level};
use chrono::{DateTime, Local};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

const RESET: &str = "\x1b[0m";

/// ANSI color used for a level's console line.
pub fn color(level: Level) -> &'static str {
    match level {
        Level::Error => "\x1b[31m",
        Level::Warn => "\x1b[33m",
        Level::Info => "\x1b[32m",
        Level::Debug => "\x1b[36m",
    }
}

/// Render one console line, newline included:
/// `<color>[HH:MM:SS.mmm] LEVEL message<reset> | k=v k=v`.
pub fn render_line(level: Level, message: &str, fields: Option<&Fields>, now: DateTime<Local>) -> String {
    let mut line = format!(
        "{}[{}] {:<5} {}{}",
        color(level),
        now.format("%H:%M:%S%.3f"),
        level,
        message,
        RESET
    );

    if let Some(fields) = fields.filter(|f| !f.is_empty()) {
        line.push_str(" |");
        for (key, value) in fields {
            line.push(' ');
            line.push_str(key);
            line.push('=');
            match value {
                serde_json::Value::String(s) => line.push_str(s),
                other => line.push_str(&other.to_string()),
            }
        }
    }

    line.push('\n');
    line
}

type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

/// Local output streams: `out` receives mirrored entries, `err`
/// receives delivery failures.
///
/// Every write is a single pre-rendered line taken under the stream's
/// lock, so concurrent callers never interleave within a line. Write
/// errors are swallowed.
#[derive(Clone)]
pub struct Console {
    out: SharedWriter,
    err: SharedWriter,
}

impl Console {
    /// Process stdout and stderr.
    pub fn stdio() -> Self {
        Self::with_writers(io::stdout(), io::stderr())
    }

    pub fn with_writers<O, E>(out: O, err: E) -> Self
    where
        O: Write + Send + 'static,
        E: Write + Send + 'static,
    {
        Self {
            out: Arc::new(Mutex::new(Box::new(out))),
            err: Arc::new(Mutex::new(Box::new(err))),
        }
    }

    pub fn mirror(&self, level: Level, message: &str, fields: Option<&Fields>) {
        let line = render_line(level, message, fields, Local::now());
        write_line(&self.out, &line);
    }

    pub fn report_error(&self, line: &str) {
        let mut line = line.to_string();
        if !line.ends_with('\n') {
            line.push('\n');
        }
        write_line(&self.err, &line);
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::stdio()
    }
}

fn write_line(writer: &SharedWriter, line: &str) {
    // A poisoned lock only means another writer panicked mid-write.
    let mut guard = match writer.lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    };
    let _ = guard.write_all(line.as_bytes());
    let _ = guard.flush();
}

/// In-memory writer whose clones share one buffer. Pass it to
/// [`Console::with_writers`] to capture output.
#[derive(Clone, Default)]
pub struct CaptureBuffer(Arc<Mutex<Vec<u8>>>);

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        let buf = match self.0.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        String::from_utf8_lossy(&buf).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for CaptureBuffer {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut buf = match self.0.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, 9, 7, 3).unwrap() + chrono::Duration::milliseconds(42)
    }

    #[test]
    fn renders_level_message_and_fields() {
        let mut fields = Fields::new();
        fields.insert("order_id".into(), json!(42));
        fields.insert("status".into(), json!("paid"));

        let line = render_line(Level::Info, "order placed", Some(&fields), at());
        assert_eq!(
            line,
            "\x1b[32m[09:07:03.042] INFO  order placed\x1b[0m | order_id=42 status=paid\n"
        );
    }

    #[test]
    fn omits_separator_without_fields() {
        let line = render_line(Level::Error, "boom", None, at());
        assert_eq!(line, "\x1b[31m[09:07:03.042] ERROR boom\x1b[0m\n");

        let empty = Fields::new();
        let line = render_line(Level::Warn, "careful", Some(&empty), at());
        assert_eq!(line, "\x1b[33m[09:07:03.042] WARN  careful\x1b[0m\n");
    }

    #[test]
    fn debug_is_cyan() {
        assert!(render_line(Level::Debug, "x", None, at()).starts_with("\x1b[36m"));
    }

    #[test]
    fn console_writes_to_separate_streams() {
        let out = CaptureBuffer::new();
        let err = CaptureBuffer::new();
        let console = Console::with_writers(out.clone(), err.clone());

        console.mirror(Level::Info, "hello", None);
        console.report_error("failed to ship log entry: nope");

        assert_eq!(out.lines().len(), 1);
        assert!(out.contents().contains("hello"));
        assert_eq!(err.lines(), vec!["failed to ship log entry: nope".to_string()]);
    }
}
