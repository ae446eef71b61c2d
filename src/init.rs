use crate::layer::ShipperLayer;
use crate::shipper::AsyncLogShipper;
use tracing::subscriber::SetGlobalDefaultError;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Install a global `tracing` subscriber that forwards events at or
/// above `INFO` to `shipper`.
///
/// The shipper already mirrors entries to the console, so no `fmt`
/// layer is added.
///
/// **Returns**
/// - `Err(..)` if a global subscriber was already installed.
pub fn init_tracing(shipper: AsyncLogShipper) -> Result<(), SetGlobalDefaultError> {
    init_tracing_with_max_level(shipper, Level::INFO)
}

/// Like [`init_tracing`] with a custom verbosity threshold.
pub fn init_tracing_with_max_level(shipper: AsyncLogShipper, max_level: Level) -> Result<(), SetGlobalDefaultError> {
    let subscriber = Registry::default().with(ShipperLayer::with_max_level(shipper, max_level));
    tracing::subscriber::set_global_default(subscriber)
}
