//! ldapsync CLI
//!
//! Command-line tools for LDAP sync controls.
//!
//! # Commands
//!
//! - `decode` - Decode a hex-encoded control or `[0] Controls` sequence
//! - `encode` - Build a request control and print its encoding
//! - `types` - List the supported control types

mod commands;

use clap::{Parser, Subcommand};
use commands::encode::EncodeTarget;
use tracing_subscriber::EnvFilter;

/// Inspect and build LDAP sync controls.
#[derive(Parser)]
#[command(name = "ldapsync")]
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
    /// Decode a BER-encoded control
    Decode {
        /// Hex-encoded control bytes (whitespace is ignored)
        input: String,

        /// Print the annotated packet tree
        #[arg(short, long)]
        tree: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Encode a request control
    Encode {
        /// Print the annotated packet tree
        #[arg(short, long, global = true)]
        tree: bool,

        #[command(subcommand)]
        target: EncodeTarget,
    },

    /// List supported control types
    Types {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
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

    match cli.command {
        Commands::Decode {
            input,
            tree,
            format,
        } => {
            commands::decode::run(&input, tree, &format)?;
        }
        Commands::Encode { tree, target } => {
            commands::encode::run(target, tree)?;
        }
        Commands::Types { format } => {
            commands::types::run(&format)?;
        }
        Commands::Version => {
            println!("ldapsync CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("ldapsync controls v{}", ldapsync_controls::VERSION);
            println!("ldapsync engine v{}", ldapsync_engine::VERSION);
        }
    }

    Ok(())
}
