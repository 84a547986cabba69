//! Beacon CLI entrypoint for reporting CI status to GitHub.

mod cli;

use std::io::{self, Write};
use std::process::ExitCode;

use beacon::config::OperationMode;
use beacon::{BeaconConfig, ReportError};
use ortho_config::OrthoConfig;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV_VAR: &str = "BEACON_LOG";

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), ReportError> {
    let config = load_config()?;
    let mode = config.operation_mode();
    if mode == OperationMode::MigrateDatabase {
        return cli::operations::migrate(&config);
    }

    let reporter = cli::bootstrap::build_reporter(&config)?;
    cli::operations::run(&reporter, &config, mode).await
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`ReportError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<BeaconConfig, ReportError> {
    BeaconConfig::load().map_err(|error| ReportError::Configuration {
        message: error.to_string(),
    })
}

fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .with_env_var(LOG_ENV_VAR)
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}
