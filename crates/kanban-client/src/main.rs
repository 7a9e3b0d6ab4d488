//! kanban CLI entry point.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use kanban_client::cli::Cli;
use kanban_client::commands::{self, Context};

#[tokio::main]
async fn main() {
    // Load .env.local from the working directory, then from the config dir
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_path(kanban_core::env_file());

    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().to_string()));

    fmt().with_env_filter(filter).with_target(false).init();

    let ctx = Context::new(cli.api_url(), cli.state_dir());

    if let Err(e) = commands::execute(cli.command, &ctx).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
