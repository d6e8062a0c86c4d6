//! failkit CLI
//!
//! Command-line interface for validating and exporting error-ID catalogues

use clap::{Parser, Subcommand};
use failkit_core::logging_facility::{self, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "failkit")]
#[command(about = "failkit - Error identity catalogue tooling", long_about = None)]
struct Cli {
    /// Log library diagnostics to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Catalogue operations (check, export)
    Catalog(commands::catalog::CatalogArgs),
    /// Print the library's internal identifiers
    Builtin(commands::builtin::BuiltinArgs),
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        logging_facility::init(Profile::Development);
    }

    let result = match cli.command {
        Commands::Catalog(args) => commands::catalog::execute(args),
        Commands::Builtin(args) => commands::builtin::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
