#![cfg(not(tarpaulin_include))]

use clap::Parser;
use payroll_dashboard::app::{self, ServerConfig};
use payroll_dashboard::config::Profile;
use std::path::PathBuf;

/// Command-line arguments for the dashboard server
#[derive(Parser, Debug)]
#[command(name = "dashboard")]
#[command(about = "Payroll upload and analysis dashboard")]
#[command(version)]
struct Args {
    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// Verbose logging and template reload on every request
    #[arg(short, long)]
    debug: bool,

    /// Column layout: "worker" or "department"
    #[arg(long, default_value = "worker")]
    profile: Profile,

    /// TrueType font for chart labels (defaults to a system sans-serif)
    #[arg(long)]
    font: Option<PathBuf>,
}

/// Main entry point for the dashboard web application
///
/// Logging goes through env_logger; `RUST_LOG` overrides the level picked
/// from `--debug`.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    log::info!(
        "Starting payroll dashboard v{} ({} profile)",
        env!("CARGO_PKG_VERSION"),
        args.profile
    );

    app::run(ServerConfig {
        host: args.host,
        port: args.port,
        debug: args.debug,
        profile: args.profile,
        font: args.font,
    })
    .await
}
