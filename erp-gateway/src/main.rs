use erp_gateway::AppState;
use erp_gateway::config::get_configuration;
use erp_gateway::startup::build_router;
use service_core::observability::init_tracing;
use service_core::store;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        "erp-gateway",
        &configuration.observability.log_level,
        &configuration.observability.otlp_endpoint,
    );

    let store = store::connect(&configuration.store).await?;
    let state = AppState::new(store, &configuration);
    let app = build_router(state);

    let address = format!(
        "{}:{}",
        configuration.server.host, configuration.server.port
    );
    let listener = tokio::net::TcpListener::bind(&address).await.map_err(|e| {
        tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
        anyhow::anyhow!("Failed to bind to address {}: {}", address, e)
    })?;

    info!("Starting erp-gateway on {}", address);
    axum::serve(listener, app).await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}
