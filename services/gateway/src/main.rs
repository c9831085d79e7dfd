use anyhow::Context;
use gateway::config::GatewayConfig;
use gateway::shutdown::ShutdownSignal;
use gateway::{AppState, create_router};
use swap_engine::{EngineConfig, NegotiationEngine, snapshot};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = GatewayConfig::load().context("loading gateway configuration")?;
    tracing::info!(bind_addr = %config.bind_addr, "Starting SlotSwap gateway");

    let engine = match &config.snapshot_path {
        Some(path) => match snapshot::load(path)
            .with_context(|| format!("reading snapshot {}", path.display()))?
        {
            Some(image) => NegotiationEngine::restore(image, EngineConfig::default())
                .context("restoring engine from snapshot")?,
            None => {
                tracing::info!(path = %path.display(), "No snapshot found, starting empty");
                NegotiationEngine::new()
            }
        },
        None => NegotiationEngine::new(),
    };

    let state = AppState::new(engine, config.clone());
    let app = create_router(state.clone());

    let shutdown = ShutdownSignal::install().context("installing signal handlers")?;
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.wait())
        .await?;

    if let Some(path) = &config.snapshot_path {
        let image = state.engine.snapshot()?;
        snapshot::save(path, &image)
            .with_context(|| format!("writing snapshot {}", path.display()))?;
        tracing::info!(
            path = %path.display(),
            slots = image.slots.len(),
            requests = image.requests.len(),
            "Snapshot saved"
        );
    }

    Ok(())
}
