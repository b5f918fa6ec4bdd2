//! Command line argument parsing for the kwcat CLI using clap.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// kwcat - rule-first search keyword categorizer
#[derive(Parser, Debug, Clone)]
#[command(name = "kwcat")]
#[command(about = "Classify search keywords into a marketing taxonomy")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct KwcatArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl KwcatArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Classify a keyword file and write the report
    Classify(ClassifyArgs),

    /// Classify a single keyword with the rules
    Keyword(KeywordArgs),

    /// Load and validate token lists and taxonomy
    #[command(name = "check-config")]
    CheckConfig(CheckConfigArgs),

    /// Run the HTTP API
    Serve(ServeArgs),
}

/// Configuration file locations shared by every command.
#[derive(Parser, Debug, Clone)]
pub struct ConfigPaths {
    /// Token lists file (YAML or JSON)
    #[arg(long, env = "KWCAT_LISTS", value_name = "LISTS_FILE")]
    pub lists: PathBuf,

    /// Taxonomy file (YAML or JSON), built-in enumerations when omitted
    #[arg(long, env = "KWCAT_TAXONOMY", value_name = "TAXONOMY_FILE")]
    pub taxonomy: Option<PathBuf>,
}

/// Arguments for classifying a file
#[derive(Parser, Debug, Clone)]
pub struct ClassifyArgs {
    /// Keyword file (.csv, .xlsx or .xls)
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    #[command(flatten)]
    pub config: ConfigPaths,

    /// Directory for categorized_output.xlsx, the CSV files and report.json
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Skip the fallback classifier
    #[arg(long)]
    pub no_fallback: bool,

    /// Keywords per fallback request
    #[arg(long, default_value = "80")]
    pub fallback_batch_size: usize,

    /// Fallback requests in flight at once
    #[arg(long, default_value = "1")]
    pub fallback_concurrency: usize,

    /// Rule pass worker threads (default: number of CPUs)
    #[arg(short, long)]
    pub threads: Option<usize>,
}

/// Arguments for classifying one keyword
#[derive(Parser, Debug, Clone)]
pub struct KeywordArgs {
    /// The keyword to classify
    #[arg(value_name = "KEYWORD")]
    pub keyword: String,

    /// Token lists file (YAML or JSON)
    #[arg(long, env = "KWCAT_LISTS", value_name = "LISTS_FILE")]
    pub lists: PathBuf,

    /// Show signals and the rule that fired
    #[arg(long)]
    pub explain: bool,
}

/// Arguments for validating configuration
#[derive(Parser, Debug, Clone)]
pub struct CheckConfigArgs {
    #[command(flatten)]
    pub config: ConfigPaths,
}

/// Arguments for the HTTP API
#[derive(Parser, Debug, Clone)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "KWCAT_BIND", default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    #[command(flatten)]
    pub config: ConfigPaths,

    /// Never call the fallback classifier
    #[arg(long)]
    pub no_fallback: bool,

    /// Rule pass worker threads (default: number of CPUs)
    #[arg(short, long)]
    pub threads: Option<usize>,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
    /// CSV output (categorized rows for `classify`)
    Csv,
}
