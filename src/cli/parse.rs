//! CLI parse: clap types for RogueFS. No behavior; definitions only.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// RogueFS - explore a filesystem as a procedurally laid out world
#[derive(Parser)]
#[command(name = "roguefs")]
#[command(about = "Stable identities and seeded room layouts for filesystem directories")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root (used for workspace config and the fallback index)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Extra configuration file applied after the workspace file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output format for command results
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Enable verbose logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reconcile a directory with the index and lay out its room
    Generate {
        dir: PathBuf,
        /// Treat the directory as a world root even if its parent is indexed
        #[arg(long)]
        root: bool,
    },
    /// Re-lay out an indexed room without rescanning
    Reflow {
        dir: PathBuf,
        /// Also move pinned nodes
        #[arg(long)]
        include_pins: bool,
    },
    /// List an indexed room's contents
    Show { dir: PathBuf },
    /// Find indexed nodes by path substring
    Search {
        needle: String,
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Toggle the pin on a node
    Pin { path: PathBuf },
    /// Record a visit to a node
    Visit { path: PathBuf },
    /// Show the chain of rooms from the root down to a node
    Trail { path: PathBuf },
    /// Summon the dead librarian into a room
    Summon { dir: PathBuf },
    /// Drop pins and visits that belong to no node
    Prune,
    /// Print the effective configuration
    Config,
}
