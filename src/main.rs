use loss_aversion_survey::api::{run_server, AppState};
use loss_aversion_survey::config::AppConfig;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();

    // Load Configuration (before logging so the configured level applies)
    let config = AppConfig::load()?;

    // Setup Logging; RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Stock Simulator survey...");
    info!("Loaded Configuration: {:?}", config);
    info!(
        "📋 Profile: {} (results table: {}, instructor export: {})",
        config.profile,
        config.profile.shows_results_table(),
        config.export_secret().is_some()
    );
    info!("🗒️ Responses log: {}", config.log_path.display());

    let app_state = Arc::new(AppState::new(config));

    // Start API Server
    run_server(app_state).await?;

    Ok(())
}
