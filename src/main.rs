use anyhow::{Context, Result};
use locale_sync::config::Config;
use locale_sync::sync;
use locale_sync::translation::DeepLClient;
use std::process::ExitCode;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file (ignored in CI)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("locale_sync=info".parse()?),
        )
        .init();

    let dry_run = std::env::args().skip(1).any(|arg| arg == "--dry-run");

    // Credentials are checked before anything else happens
    let config = Config::from_env()?;

    info!(
        "Starting translation sync{}",
        if dry_run { " (dry run)" } else { "" }
    );
    info!("Documents: {}", config.i18n_dir.display());

    let client = DeepLClient::new(reqwest::Client::new(), &config);

    if !dry_run {
        match client.usage().await {
            Ok(usage) => match usage.character_limit {
                Some(limit) => info!(
                    "DeepL usage: {} / {} characters",
                    usage.character_count, limit
                ),
                None => info!("DeepL usage: {} characters", usage.character_count),
            },
            Err(e) => warn!("Could not check DeepL usage: {}", e),
        }
    }

    let summary = sync::run(&config, &client, dry_run)
        .await
        .context("Translation sync aborted")?;

    summary.log();
    if dry_run {
        info!(
            "Dry run done: {} keys would be translated, nothing written",
            summary.planned()
        );
    } else {
        info!(
            "Done: {} keys translated in {} requests",
            summary.translated(),
            summary.api_calls()
        );
    }

    if summary.has_failures() {
        let failed: Vec<_> = summary.failures().map(|o| o.locale()).collect();
        error!("Sync failed for: {}", failed.join(", "));
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}
