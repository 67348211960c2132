pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bindery")]
#[command(about = "Turn a blog's paginated feed into an e-book", long_about = None)]
pub struct Cli {
    /// Path to the config file (default: ~/.config/bindery/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch new pages, then write the HTML book and convert it
    Build {
        /// Use cached pages and images only
        #[arg(long)]
        offline: bool,

        /// Keep remote image references
        #[arg(long)]
        no_images: bool,

        /// Skip the external converter
        #[arg(long)]
        no_convert: bool,

        /// Open the table of contents when done
        #[arg(long)]
        open: bool,
    },
    /// Update the page cache without building
    Fetch,
    /// Show cached pages and post count
    Status,
    /// Run the converter on an existing HTML book
    Convert,
}
