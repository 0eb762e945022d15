use clap::Parser;
use tracing::error;

use mapseq_barcodes::cli::{Cli, Commands};
use mapseq_barcodes::commands;

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt()
        .compact()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Extract(cmd) => commands::extract::command(cmd),
        Commands::Dedup(cmd) => commands::dedup::command(cmd),
        Commands::Run(cmd) => commands::run::command(cmd),
        Commands::Stats(cmd) => commands::stats::command(cmd),
        Commands::Simulate(cmd) => commands::simulate::command(cmd),
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}
