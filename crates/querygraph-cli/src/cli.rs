//! CLI argument parsing using clap.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// QueryGraph - lineage graph viewer for analyzed SQL queries
#[derive(Parser, Debug)]
#[command(name = "querygraph")]
#[command(about = "Build and explore lineage graphs from analyzed SQL batches", long_about = None)]
#[command(version)]
pub struct Args {
    /// Batch JSON files to load, in order (reads from stdin if none provided)
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "table", value_enum)]
    pub format: OutputFormat,

    /// Click a node after loading (can be repeated; clicks apply in order)
    #[arg(long = "select", value_name = "NODE_ID")]
    pub select: Vec<String>,

    /// JSON layout configuration; missing keys keep their defaults
    #[arg(long, value_name = "FILE")]
    pub layout_config: Option<PathBuf>,

    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Project name used for titles and default export filenames
    #[arg(long, default_value = "lineage")]
    pub project_name: String,

    /// Compact JSON output (no pretty-printing)
    #[arg(short, long)]
    pub compact: bool,

    /// Suppress warnings on stderr
    #[arg(short, long)]
    pub quiet: bool,

    /// Print diagnostic logs to stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the JSON Schema of the batch documents and exit
    #[arg(long)]
    pub emit_schema: bool,

    /// Start HTTP server with the interactive viewer
    #[cfg(feature = "serve")]
    #[arg(long)]
    pub serve: bool,

    /// Port for HTTP server (default: 3000)
    #[cfg(feature = "serve")]
    #[arg(long, default_value = "3000")]
    pub port: u16,

    /// Directories to watch for batch JSON files (can be repeated)
    #[cfg(feature = "serve")]
    #[arg(long, value_name = "DIR")]
    pub watch: Vec<PathBuf>,

    /// Open browser automatically when server starts
    #[cfg(feature = "serve")]
    #[arg(long)]
    pub open: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary of the graph
    Table,
    /// Graph model JSON
    Json,
    /// Rendered view frame JSON (selection included)
    Frame,
    /// Mermaid flowchart
    Mermaid,
    /// Standalone interactive HTML page
    Html,
    /// CSV archive (zip)
    Csv,
}
