use tokio::time::Duration;
use tracing::{error, info};

use log_shipper::init::init_tracing;
use log_shipper::{AsyncLogShipper, ShipperConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let shipper = AsyncLogShipper::new(ShipperConfig::from_env())?;
    init_tracing(shipper.clone())?;

    info!("starting service");

    error!(
        user_id = 42,
        reason = "invalid password",
        "authentication failed"
    );

    shipper.flush(Duration::from_secs(6)).await;
    Ok(())
}
