use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod html;
mod markdown;
mod metadata;
mod models;
mod pages;
mod site;
mod watch;

use html::PageShell;

async fn run(is_development: bool) -> error::Result<()> {
    let config = config::load_config().await?;

    let summary = site::build_site(&config, &PageShell::current(&config)).await?;
    info!(
        articles = summary.articles,
        output = %summary.output_dir.display(),
        "Build complete"
    );

    if is_development {
        info!("Watch mode enabled, rebuilding on article changes.");
        watch::watch_and_rebuild(&config).await?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let is_development = std::env::var("RUST_ENV")
        .map(|v| v == "development")
        .unwrap_or(false);

    // logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("RUST_ENV is set to development: {}", is_development);

    match run(is_development).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Build failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
