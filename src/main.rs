//! Credit Fairness - Main Entry Point

use clap::Parser;
use credit_fairness::cli::{cmd_config, cmd_evaluate, cmd_info, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "credit_fairness=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate(args) => {
            cmd_evaluate(&args)?;
        }
        Commands::Config => {
            cmd_config()?;
        }
        Commands::Info { data } => {
            cmd_info(&data)?;
        }
    }

    Ok(())
}
