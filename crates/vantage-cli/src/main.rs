//! Vantage CLI - run the competitor intelligence pipeline.

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use vantage_cli::commands;
use vantage_cli::{Cli, Command, Formatter};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Logs go to stderr so reports on stdout stay clean.
fn init_tracing(log_level: Option<&str>) {
    let filter = match log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let formatter = Formatter::new(cli.format.into(), !cli.no_color);

    if let Command::InitConfig(args) = cli.command {
        commands::execute_init_config(args, &cli.config, &formatter)?;
        return Ok(());
    }

    let config = commands::load_config(&cli.config)
        .with_context(|| format!("cannot load {}", cli.config.display()))?;

    match cli.command {
        Command::Cleanup(args) => commands::execute_cleanup(args, &config, &formatter)?,
        Command::Show => commands::execute_show(&config, &formatter).await?,
        command => {
            let stages = command.stages().unwrap_or_default();
            commands::execute_run(stages, &config, &formatter).await?;
        }
    }

    Ok(())
}
