//! Process-wide shipper and free-function logging API.
//!
//! The global holder is a convenience over an explicitly constructed
//! [`AsyncLogShipper`]: it is built at most once, never torn down, and
//! must be initialized before any of the free functions are used.

use crate::config::ShipperConfig;
use crate::error::ShipperError;
use crate::fields;
use crate::record::{caller_of, Fields, Level};
use crate::shipper::AsyncLogShipper;
use once_cell::sync::OnceCell;
use std::panic::Location;

static LOGGER: OnceCell<AsyncLogShipper> = OnceCell::new();

const INIT_MESSAGE: &str = "Logger initialized";

/// Fields of the entry announcing a freshly built global shipper.
fn init_fields(cfg: &ShipperConfig) -> Fields {
    fields! {
        "server_ip" => cfg.server_ip.clone(),
        "endpoint" => cfg.endpoint.clone(),
        "environment" => cfg.environment.clone(),
        "hostname" => cfg.hostname.clone(),
    }
}

/// Initialize the global shipper from the process environment.
///
/// Safe to call concurrently and repeatedly: exactly one shipper is
/// built, and every call returns it. The first successful
/// initialization logs one INFO entry describing the resolved endpoint,
/// environment and host. Must run inside a tokio runtime.
#[track_caller]
pub fn init_logger() -> Result<&'static AsyncLogShipper, ShipperError> {
    init_logger_with(|| AsyncLogShipper::new(ShipperConfig::from_env()))
}

/// Initialize the global shipper with a custom constructor.
///
/// `build` runs only if no shipper exists yet; a failed build leaves the
/// holder empty so a later call may try again.
#[track_caller]
pub fn init_logger_with<F>(build: F) -> Result<&'static AsyncLogShipper, ShipperError>
where
    F: FnOnce() -> Result<AsyncLogShipper, ShipperError>,
{
    let caller = caller_of(Location::caller());
    let mut built_here = false;

    let logger = LOGGER.get_or_try_init(|| {
        let shipper = build()?;
        built_here = true;
        Ok::<_, ShipperError>(shipper)
    })?;

    if built_here {
        logger.dispatch(
            Level::Info,
            INIT_MESSAGE.to_string(),
            Some(init_fields(logger.config())),
            Some(caller),
        );
    }

    Ok(logger)
}

/// The global shipper, if initialized.
pub fn try_logger() -> Result<&'static AsyncLogShipper, ShipperError> {
    LOGGER.get().ok_or(ShipperError::NotInitialized)
}

/// The global shipper.
///
/// # Panics
///
/// If [`init_logger`] has not completed. Using the logger before
/// initialization is a startup-ordering bug.
pub fn logger() -> &'static AsyncLogShipper {
    match try_logger() {
        Ok(logger) => logger,
        Err(e) => panic!("{}", e),
    }
}

#[track_caller]
pub fn info(message: impl Into<String>, fields: Option<Fields>) {
    logger().info(message, fields);
}

#[track_caller]
pub fn warn(message: impl Into<String>, fields: Option<Fields>) {
    logger().warn(message, fields);
}

#[track_caller]
pub fn error(message: impl Into<String>, fields: Option<Fields>) {
    logger().error(message, fields);
}

#[track_caller]
pub fn debug(message: impl Into<String>, fields: Option<Fields>) {
    logger().debug(message, fields);
}
