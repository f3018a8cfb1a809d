use tubely_api::{setup, telemetry};
use tubely_core::Config;

// Use mimalloc as the global allocator for better performance and lower fragmentation,
// especially when running on musl-based systems inside containers.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    telemetry::init_telemetry(&config.environment)?;
    tracing::info!("Configuration loaded and validated successfully");

    let (state, router) = setup::initialize_app(config.clone()).await?;

    setup::server::start_server(&config, router, state).await?;

    Ok(())
}
