//! Command-line interface definitions.
//!
//! Defines all CLI arguments using clap.

use crate::render::Format;
use clap::Parser;
use std::path::PathBuf;

/// Reference documentation generator for C++ catalogs
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Serialized catalog (JSON), relative to the project root
    pub catalog: PathBuf,

    /// Project root directory (default: current directory)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Config file name (default: refgen.toml)
    #[arg(short = 'C', long, default_value = "refgen.toml")]
    pub config: PathBuf,

    /// Output directory, or output file in single-page mode
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write one file per entity instead of a single document
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub multipage: Option<bool>,

    /// Output markup
    #[arg(short, long, value_enum)]
    pub format: Option<Format>,

    /// Number of workers (0 = one per core)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Write the Doxygen tag file
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub tagfile: Option<bool>,

    /// Directory with layout overrides
    #[arg(long)]
    pub addons: Option<PathBuf>,
}
