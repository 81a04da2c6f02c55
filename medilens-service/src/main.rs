use medilens_service::config::MedilensConfig;
use medilens_service::startup::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_tracing("medilens-service", "info");

    let config = MedilensConfig::load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    app.run_until_stopped().await
}
