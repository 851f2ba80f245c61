//! hlpdec CLI
//!
//! Command-line tools for WinHelp (`.HLP`) files.
//!
//! # Commands
//!
//! - `list` - List the internal streams of a help file
//! - `extract` - Write one internal stream to disk, optionally decompressed
//! - `system` - Show the `|SYSTEM` header and records
//! - `dump` - Hex dump an internal stream

mod commands;
mod error;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Inspect and extract WinHelp files.
#[derive(Parser)]
#[command(name = "hlpdec")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the help file
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    /// Longest internal name accepted from the directory
    #[arg(global = true, long, default_value = "255")]
    max_name_length: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the internal streams
    List {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Write an internal stream to a file
    Extract {
        /// Internal stream name, e.g. "|SYSTEM"
        name: String,

        /// Output file (defaults to the stream name without '|')
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Decompression method (0 copy, 1 run-length, 2 LZ77, 3 both)
        #[arg(short, long, default_value = "0")]
        method: u8,

        /// Overwrite an existing output file
        #[arg(long)]
        force: bool,
    },

    /// Show the |SYSTEM header and records
    System {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Hex dump an internal stream
    Dump {
        /// Internal stream name
        name: String,

        /// Decompression method applied before dumping
        #[arg(short, long, default_value = "0")]
        method: u8,

        /// Maximum number of bytes to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = hlpdec_core::Config::new().max_name_length(cli.max_name_length);

    match cli.command {
        Commands::List { format } => {
            let path = cli.path.ok_or("Help file path required for list")?;
            commands::list::run(&path, config, &format)?;
        }
        Commands::Extract {
            name,
            output,
            method,
            force,
        } => {
            let path = cli.path.ok_or("Help file path required for extract")?;
            let config = config.overwrite_existing(force);
            commands::extract::run(&path, config, &name, output, method)?;
        }
        Commands::System { format } => {
            let path = cli.path.ok_or("Help file path required for system")?;
            commands::system::run(&path, config, &format)?;
        }
        Commands::Dump {
            name,
            method,
            limit,
        } => {
            let path = cli.path.ok_or("Help file path required for dump")?;
            commands::dump::run(&path, config, &name, method, limit)?;
        }
        Commands::Version => {
            println!("hlpdec CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("hlpdec Core v{}", hlpdec_core::VERSION);
        }
    }

    Ok(())
}
