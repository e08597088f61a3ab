use api_server::{create_router, AppState};
use config_manager::SystemConfig;
use explorer_client::ExplorerClients;
use persistence_layer::SuspectStore;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,api_server=debug".into()),
        )
        .init();

    info!("Starting Fund Tracer API Server...");

    let config = SystemConfig::load()?;
    info!("Configuration loaded successfully");

    let store = SuspectStore::connect(&config.database.url, config.database.max_connections).await?;
    info!("Suspect ledger connected");

    let clients = ExplorerClients::from_config(&config)?;
    let engine = clients.trace_engine(&config.trace)?;
    let inspector = clients.wallet_inspector();
    info!("Explorer clients initialized");

    let bind_addr = format!("{}:{}", config.api.host, config.api.port);
    let payment_enabled = config.payment.enabled;
    let app = create_router(AppState::new(config, engine, store, inspector));

    info!("📋 Available endpoints:");
    info!("   • POST /api/trace - Backward fund trace (payment gate: {})", payment_enabled);
    info!("   • POST /api/submit - Report a suspect wallet");
    info!("   • GET /api/recent - Latest suspect reports");
    info!("   • GET / - Web interface");
    info!("   • GET /health - Health check");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Server listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
