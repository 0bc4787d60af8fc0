#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use naukri_headline::Config;
use naukri_headline::errors::{EXIT_FAILURE, FlowFailure, RefreshError};

mod commands;

// Exit codes
const EXIT_SUCCESS: i32 = 0;

/// Everything else is configured through the environment
#[derive(Parser)]
#[command(name = "naukri-headline", version)]
#[command(about = "Re-save the resume headline to keep the profile fresh", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in by hand through the external identity provider and save the session cookies
    CaptureSession,
}

#[tokio::main]
async fn main() {
    let result = run().await;

    match result {
        Ok(()) => std::process::exit(EXIT_SUCCESS),
        Err(err) => {
            let exit_code = exit_code_for(&err);

            // Output JSON error to stdout for programmatic consumption
            let error_json = json!({
                "error": true,
                "message": err.to_string(),
                "exit_code": exit_code
            });
            println!(
                "{}",
                serde_json::to_string(&error_json).unwrap_or_else(|_| "{}".to_string())
            );

            // Also log to stderr for human reading
            eprintln!("Error: {:#}", err);
            std::process::exit(exit_code);
        }
    }
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    if let Some(failure) = err.downcast_ref::<FlowFailure>() {
        failure.error.exit_code()
    } else if let Some(refresh) = err.downcast_ref::<RefreshError>() {
        refresh.exit_code()
    } else {
        EXIT_FAILURE
    }
}

async fn run() -> Result<()> {
    // Initialize tracing to stderr (so JSON output to stdout remains clean)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "naukri_headline=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();

    // Usage errors share the failure exit code; help and version still exit 0
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if err.use_stderr() => {
            let _ = err.print();
            std::process::exit(EXIT_FAILURE);
        }
        Err(err) => err.exit(),
    };

    // A missing .env is fine; the process environment may carry everything
    match dotenvy::dotenv() {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("Ignoring unreadable .env file: {}", e),
    }
    let config = Config::from_env()?;

    match cli.command {
        None => commands::update::handle_update(&config).await?,
        Some(Commands::CaptureSession) => commands::capture::handle_capture(&config).await?,
    }

    Ok(())
}
