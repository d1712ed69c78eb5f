use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vocalink::{Config, bot};

/// Vocalink - Discord voice companion gateway
#[derive(Parser)]
#[command(name = "vocalink", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Validate environment configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,vocalink=info",
        1 => "info,vocalink=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Missing secrets abort here, before anything connects.
    let config = Config::from_env()?;

    if let Some(Command::Check) = cli.command {
        println!(
            "configuration ok (prefix: {}, model: {}, voice: {})",
            config.command_prefix, config.llm_model, config.voice_id
        );
        return Ok(());
    }

    bot::run(config).await?;
    Ok(())
}
