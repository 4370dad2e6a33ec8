//! Lendia CLI and REST API entry point.
//!
//! Binary name: `lendia`
//!
//! Parses CLI arguments, initializes the database and services, then either
//! starts the REST API server or runs the admin report.

mod cli;
mod http;
mod state;

use clap::Parser;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "info,lendia=debug",
        _ => "trace",
    };
    lendia_observe::tracing_setup::init_tracing(filter, cli.otel)
        .map_err(|e| anyhow::anyhow!("tracing init: {e}"))?;

    // Initialize application state (DB, stores, desk)
    let state = AppState::init().await?;

    match cli.command {
        Commands::Serve { addr } => {
            http::serve(state, &addr).await?;
        }
        Commands::Report { loan_type } => {
            cli::report::run(&state, loan_type.as_deref(), cli.json).await?;
        }
    }

    lendia_observe::tracing_setup::shutdown_tracing();
    Ok(())
}
