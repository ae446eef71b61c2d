//! Fire-and-forget structured log shipping.
//!
//! [`AsyncLogShipper`] mirrors each entry to the console and POSTs it as
//! JSON to a collector from a spawned task, so logging never blocks or
//! fails the caller. The [`global`] module offers a process-wide
//! instance behind `init_logger` and free `info`/`warn`/`error`/`debug`
//! functions.

pub mod config;
pub mod console;
pub mod env;
pub mod error;
pub mod global;
pub mod http;
pub mod init;
pub mod layer;
pub mod noop_sink;
pub mod record;
pub mod shipper;
pub mod sink;

pub use config::ShipperConfig;
pub use error::{ShipperError, SinkError};
pub use global::{debug, error, info, init_logger, init_logger_with, logger, try_logger, warn};
pub use record::{Fields, Level, LogEntry};
pub use shipper::{AsyncLogShipper, ShipperStats};

#[doc(hidden)]
pub use serde_json;

/// Build a [`Fields`] map from `key => value` pairs. Values may be any
/// `Serialize` expression.
///
/// ```
/// let fields = log_shipper::fields! { "order_id" => 42, "status" => "paid" };
/// assert_eq!(fields["order_id"], 42);
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::record::Fields::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::record::Fields::new();
        $(
            map.insert(::std::string::String::from($key), $crate::serde_json::json!($value));
        )+
        map
    }};
}
