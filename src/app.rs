/*
 * Responsibility
 * - Config -> pipeline definition -> Pipeline (explicit composition root)
 * - Router assembly + middleware
 * - axum::serve()
 */
use std::{panic, path::Path, process, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api,
    config::Config,
    middleware,
    pipeline::{
        Pipeline,
        factory::{self, PipelineSpec},
    },
    state::AppState,
};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,claimgate=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Development: crash so it gets noticed. Production: default hook, keep serving.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    let pipeline = load_pipeline(&config.pipeline_path)?;
    tracing::info!(
        components = pipeline.len(),
        path = %config.pipeline_path.display(),
        "claim pipeline loaded"
    );

    let state = AppState::new(Arc::new(pipeline));
    let app = build_router(state, &config);

    tracing::info!(
        "starting claimgate in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn load_pipeline(path: &Path) -> Result<Pipeline> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read pipeline definition {}", path.display()))?;
    let spec = PipelineSpec::from_json(&json)
        .with_context(|| format!("failed to parse pipeline definition {}", path.display()))?;
    factory::build(&spec).context("failed to build claim pipeline")
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let router = api::routes(state.clone()).with_state(state);

    middleware::http::apply(router, config)
}
