use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "talon")]
#[command(author, version, about = "Resolve and download videos from X/Twitter posts")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,
    },

    /// Resolve a post reference and print its media catalog
    Resolve {
        /// Post URL or numeric ID
        reference: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Download a post's video
    Download {
        /// Post URL or numeric ID
        reference: String,

        /// Output file name (directory components are stripped)
        #[arg(short, long)]
        output: Option<String>,

        /// Variant quality tag, e.g. "2176000" or "HLS"; best available
        /// when omitted
        #[arg(short, long)]
        quality: Option<String>,

        /// Output container format
        #[arg(short, long, default_value = "mp4")]
        format: String,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Display version information
    Version,
}
