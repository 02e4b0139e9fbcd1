//! Ringlog CLI
//!
//! Command-line tools around the ring log.
//!
//! # Commands
//!
//! - `write` - Write a string to a file
//! - `serve` - Run the TCP line logger in the foreground
//! - `replay` - Feed lines through a ring log and show what survives
//! - `version` - Show version information

mod commands;

use clap::{Parser, Subcommand};
use commands::serve::ServeOptions;
use ringlog_core::DEFAULT_CAPACITY;
use ringlog_server::DEFAULT_PORT;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Ringlog command-line tools.
#[derive(Parser)]
#[command(name = "ringlog")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a string to a file, replacing its contents
    Write {
        /// File to write
        file: PathBuf,

        /// Text to write
        text: String,
    },

    /// Run the TCP line logger until SIGINT or SIGTERM
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Number of records kept by the ring log
        #[arg(short, long, default_value_t = DEFAULT_CAPACITY)]
        capacity: usize,

        /// Append to this data file instead of the ring log
        #[arg(short, long)]
        data_file: Option<PathBuf>,

        /// Append a timestamp record every N seconds
        #[arg(short, long)]
        timestamp_interval: Option<u64>,
    },

    /// Feed lines through a ring log and print the live records
    Replay {
        /// Input file (stdin if omitted)
        input: Option<PathBuf>,

        /// Number of records kept by the ring log
        #[arg(short, long, default_value_t = DEFAULT_CAPACITY)]
        capacity: usize,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Write { file, text } => {
            commands::write::run(&file, &text)?;
        }
        Commands::Serve {
            port,
            capacity,
            data_file,
            timestamp_interval,
        } => {
            commands::serve::run(&ServeOptions {
                port,
                capacity,
                data_file,
                timestamp_interval,
            })?;
        }
        Commands::Replay {
            input,
            capacity,
            format,
        } => {
            commands::replay::run(input.as_deref(), capacity, &format)?;
        }
        Commands::Version => {
            println!("Ringlog CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Ringlog Core v{}", ringlog_core::VERSION);
        }
    }

    Ok(())
}
