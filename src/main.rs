//! player-ingest entry point.
//!
//! Loads the players and valuations files, nests valuations under their
//! players, and inserts one document per player into the store.

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use player_ingest::config::IngestConfig;
use player_ingest::service;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load configuration
    let config = match IngestConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            init_tracing(false);
            tracing::error!(error = %err, "invalid configuration");
            return ExitCode::from(err.exit_code());
        }
    };
    init_tracing(config.json_logs);

    tracing::info!(
        players = %config.players_path.display(),
        valuations = %config.valuations_path.display(),
        key = %config.join_key,
        "starting player-ingest"
    );

    match service::run(&config).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, category = ?err.category(), "load aborted");
            ExitCode::from(err.exit_code())
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
