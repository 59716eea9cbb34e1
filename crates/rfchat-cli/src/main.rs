//! rfchat - line-oriented Bluetooth RFCOMM chat

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::filter::LevelFilter;

use rfchat_cli::{app, cli::Cli, config::AppConfig, Invocation};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Load configuration, then let flags win
    let mut config = load_configuration(&cli)?;
    config.apply_overrides(&cli);
    config.validate().context("invalid configuration")?;

    // Initialize logging
    setup_logging(&config, cli.quiet);

    // Reject bad addresses and UUIDs before touching the adapter
    let invocation = Invocation::from_command(&cli.command).context("invalid arguments")?;

    let stats = app::run(invocation, &config).await?;
    info!(
        "rfchat exited after {} runs and {} sessions",
        stats.runs, stats.sessions
    );

    // The blocking stdin reader would otherwise hold the runtime open
    std::process::exit(0)
}

/// Setup logging on stderr so stdout only carries chat traffic
fn setup_logging(config: &AppConfig, quiet: bool) {
    let level = if quiet {
        LevelFilter::OFF
    } else {
        config
            .log_level
            .parse::<LevelFilter>()
            .unwrap_or(LevelFilter::INFO)
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// Load configuration from file or use defaults
fn load_configuration(cli: &Cli) -> anyhow::Result<AppConfig> {
    match &cli.config {
        Some(path) => AppConfig::load_from_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display())),
        None => Ok(AppConfig::default()),
    }
}
