//! Roster CLI
//!
//! Command-line front-end for the person store

use clap::{Parser, Subcommand};
use roster_core::logging_facility::{init, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "roster")]
#[command(about = "Roster - a live list of people backed by SQLite", long_about = None)]
struct Cli {
    /// Emit JSON logs instead of human-readable ones
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Add a person and print the assigned id
    Add(commands::add::AddArgs),
    /// Print every person, newest first
    List(commands::list::ListArgs),
    /// Keep the list on screen, re-rendered on every change, while reading
    /// new people from stdin
    Watch(commands::watch::WatchArgs),
}

fn main() {
    let cli = Cli::parse();

    init(if cli.log_json {
        Profile::Production
    } else {
        Profile::Development
    });

    let result = match cli.command {
        Commands::Add(args) => commands::add::execute(args),
        Commands::List(args) => commands::list::execute(args),
        Commands::Watch(args) => commands::watch::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
