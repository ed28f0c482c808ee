//! Damage classification inference server.

use anyhow::{Context, Result};
use damage_classifier::prelude::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServiceConfig::from_env().context("invalid service configuration")?;

    let model_info = ModelInfo::load(&config.model_info_path)
        .with_context(|| format!("failed to load {}", config.model_info_path.display()))?;

    // A model that fails to load aborts startup; the service never runs
    // in a degraded mode.
    info!(path = %config.model_path.display(), "loading model");
    let model = OrtInfer::new(&config.model_path)
        .with_context(|| format!("failed to load model {}", config.model_path.display()))?;
    info!(model = model.model_name(), "model loaded");

    let classifier = DamageClassifier::new(model)?;
    let state = AppState::new(classifier, model_info);

    let addr = config.socket_addr()?;
    let server = HttpServer::new(addr);
    server.start(state).await?;

    Ok(())
}
