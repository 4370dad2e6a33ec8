//! CLI argument definitions and command modules.

pub mod report;

use clap::{Parser, Subcommand};

/// Conversational loan origination service.
#[derive(Debug, Parser)]
#[command(name = "lendia", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit machine-readable JSON where applicable
    #[arg(long, global = true)]
    pub json: bool,

    /// Export spans via OpenTelemetry (stdout exporter)
    #[arg(long, global = true)]
    pub otel: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1:8080", env = "LENDIA_ADDR")]
        addr: String,
    },

    /// Print stored applications for admin reporting
    Report {
        /// Restrict to one loan type (education, home, personal, gold,
        /// business, car)
        #[arg(long)]
        loan_type: Option<String>,
    },
}
