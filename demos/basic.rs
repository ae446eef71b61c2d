use log_shipper::{debug, error, fields, info, init_logger, warn};
use tokio::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ENVIRONMENT and SERVER_IP are read here; the collector is
    // http://logstash:5000, so without one running every entry ends up
    // as a line on stderr.
    let logger = init_logger()?;

    info("Health check requested", Some(fields! {
        "client_ip" => "127.0.0.1:53211",
        "user_agent" => "curl/8.5.0",
    }));

    warn("Low stock", Some(fields! { "product_id" => 3, "stock" => 2 }));

    error("Database connection failed", Some(fields! {
        "request_id" => "req-1718031234",
        "error_type" => "database_error",
        "retry_count" => 2,
    }));

    debug("Only visible with ENVIRONMENT=development", None);

    // Shipping is fire-and-forget; give in-flight entries a chance
    // before the runtime goes away.
    logger.flush(Duration::from_secs(6)).await;
    println!("stats: {:?}", logger.stats());
    Ok(())
}
