mod buddy;
mod commands;
mod config;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "upnext")]
#[command(about = "Show upcoming calendar events from icalBuddy, grouped by day")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the agenda (the default when no command is given)
    Show {
        /// Days ahead to include (overrides the configured days_ahead)
        #[arg(short, long)]
        days: Option<u32>,

        /// Print the parsed events as JSON instead of rendering
        #[arg(long)]
        json: bool,

        /// Append each event's raw source lines (debugging)
        #[arg(long)]
        raw: bool,
    },
    /// Print the merged configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let command = cli.command.unwrap_or(Commands::Show {
        days: None,
        json: false,
        raw: false,
    });

    match command {
        Commands::Show { days, json, raw } => commands::show::run(days, json, raw).await,
        Commands::Config => commands::config::run(),
    }
}
