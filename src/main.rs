//! # sharpe-rank CLI

use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;

use crate::cli::Commands;

mod cli;

#[derive(Parser)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(
        global = true,
        long = "config",
        help = "The settings file to use instead of the default location"
    )]
    config_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = sharpe_rank::init(cli.config_path).await {
        println!("[!] {}", err.to_string().red());
        return;
    }

    match &cli.command {
        Commands::Analyze(cmd) => {
            cmd.exec().await;
        }
        Commands::Check(cmd) => {
            cmd.exec().await;
        }
        Commands::Config(cmd) => {
            cmd.exec().await;
        }
        Commands::Gui(cmd) => {
            cmd.exec().await;
        }
    }
}
