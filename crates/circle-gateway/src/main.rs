//! Circle gateway binary.

use circle_gateway::config::DEFAULT_LOG_FILTER;
use circle_gateway::{create_router, open_store, AppState, Args, GatewayConfig};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line args
    let args = Args::parse();

    // Initialize tracing
    let filter = match &args.log_level {
        Some(directive) => EnvFilter::try_new(directive)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();

    let config = GatewayConfig::from(&args);
    info!(
        listen = %config.listen_addr,
        origin = %config.site.origin,
        city = %config.site.city,
        "Starting Circle gateway"
    );

    // Open the content store and build the resolver
    let store = open_store(&config).await?;
    let state = AppState::new(store, config.clone())?;

    // Create router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!("Gateway listening on {}", config.listen_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
