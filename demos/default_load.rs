use std::sync::Arc;
use std::time::Instant;
use tokio::time::Duration;

use log_shipper::noop_sink::NoopSink;
use log_shipper::{fields, AsyncLogShipper, ShipperConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ShipperConfig::new("http://unused").with_console(false);
    let shipper = AsyncLogShipper::with_sink(config, Arc::new(NoopSink))?;

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        shipper.error("default load test error", Some(fields! { "iteration" => i }));
    }

    let elapsed = start.elapsed();
    println!("noop sink: dispatched {} entries in {:?} (~{:.0} entries/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );

    let drained = shipper.flush(Duration::from_secs(10)).await;
    println!("drained: {}, stats: {:?}", drained, shipper.stats());
    Ok(())
}
