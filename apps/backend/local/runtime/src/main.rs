#[cfg(not(any(all(target_os = "macos", target_arch = "aarch64"), target_os = "ios")))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use dotenv::dotenv;
use ecobuild_inference::{inference_router, InferenceConfig, InferenceService, InferenceState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting EcoBuild Local Inference Runtime");

    let config = config::Config::from_env()?;
    let inference_config = InferenceConfig::from_env();
    tracing::info!(
        "Loaded configuration: port={}, worker_script={}, timeout_ms={}, simulation={}",
        config.port,
        inference_config.worker_script.display(),
        inference_config.inference_timeout_ms,
        inference_config.allow_simulation
    );

    let service = InferenceService::new(inference_config);
    let status = service.model_status().await;
    if status.available {
        tracing::info!("Active model found");
    } else {
        tracing::warn!(
            simulation = status.simulation_enabled,
            "No active model configured"
        );
    }

    let app = inference_router(InferenceState::new(service));

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Runtime listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
