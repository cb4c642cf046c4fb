use std::error::Error;

use refs_hook_engine::telemetry;
use tracing::Level;
use tracing_subscriber::{Layer, filter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // .env is optional; the process environment wins either way
    dotenvy::dotenv().ok();

    let others = fmt::layer()
        .with_target(true)
        .with_filter(filter::filter_fn(|meta| {
            !meta.target().starts_with(telemetry::TARGET_PREFIX)
        }));

    tracing_subscriber::registry()
        .with(telemetry::env_filter_with_level("info", Level::INFO))
        .with(telemetry::layer())
        .with(others)
        .try_init()?;

    api::start().await?;

    Ok(())
}
