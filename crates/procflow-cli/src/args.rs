//! Command-line argument definitions for the Procflow CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the input collection and the documents to
//! show, control how many layout requests are issued, and choose output
//! paths, configuration file and logging verbosity.

use clap::Parser;

/// Command-line arguments for the Procflow layout tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input process collection (JSON)
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Path to the output scene file
    #[arg(short, long, default_value = "scene.json")]
    pub output: String,

    /// Id of the document to lay out (defaults to the first one)
    #[arg(short, long)]
    pub process: Option<String>,

    /// Id of the document to compare the selected one against
    #[arg(long)]
    pub compare: Option<String>,

    /// Number of layout requests after the initial top-down pass
    #[arg(long, default_value_t = 0)]
    pub relayout: u32,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Path to write the updated collection to
    #[arg(long)]
    pub export: Option<String>,
}
