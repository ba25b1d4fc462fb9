//! CLI parse: clap types for ipfs-add. No behavior; definitions only.

use clap::Parser;
use std::path::PathBuf;

/// ipfs-add - Store files and directory trees on an IPFS gateway
#[derive(Parser, Debug)]
#[command(name = "ipfs-add")]
#[command(about = "Add files and directories to IPFS through a gateway's HTTP API")]
pub struct Cli {
    /// Files or directories to add, in order
    #[arg(required = true, num_args = 1..)]
    pub paths: Vec<PathBuf>,

    /// Gateway API base URL (overrides config)
    #[arg(long)]
    pub node: Option<String>,

    /// Include files and directories whose name starts with "."
    #[arg(short = 'H', long)]
    pub hidden: bool,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long)]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stderr, stdout, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}
