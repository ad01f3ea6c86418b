//! CLI command definitions

use clap::{ArgGroup, Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the batch report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Per-document gate verdicts and outcome
    Full,
    /// One line per document
    Summary,
    /// JSON results
    Json,
}

/// CLI arguments for udc
#[derive(Parser, Debug)]
#[command(name = "udc")]
#[command(author, version, about = "Universal data converter - agent panels verify, convert and validate documents")]
#[command(long_about = r#"
udc converts documents with a single conversion agent guarded by two voting panels.

Each document goes through:
1. Verification: a panel decides whether the input is convertible at all
2. Conversion: the conversion agent produces the output
3. Validation: a panel compares output against input; rejections are fed
   back into the next conversion attempt until attempts run out

Configuration files are loaded from (in priority order):
1. UDC_* environment variables
2. --config <path>     Explicit config file
3. ./udc.toml          Project-level config
4. ~/.config/udc/config.toml   Global config

Example:
  udc --prompts conversions/invoice.yaml --file data/invoice.csv
  udc --prompts conversions/invoice.yaml --folder data --pattern '*.csv' --parallel-agents
"#)]
#[command(group(ArgGroup::new("input").args(["file", "folder"])))]
pub struct Cli {
    /// Prompt set (YAML) with the verification, conversion and validation templates
    #[arg(long, value_name = "PATH", required_unless_present = "show_config")]
    pub prompts: Option<PathBuf>,

    /// Convert a single document
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Convert every document in a folder matching --pattern
    #[arg(long, value_name = "DIR", requires = "pattern")]
    pub folder: Option<PathBuf>,

    /// File pattern used with --folder (e.g. '*.csv')
    #[arg(long, value_name = "GLOB")]
    pub pattern: Option<String>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Folder for converted documents (overrides [output].folder)
    #[arg(long, value_name = "DIR")]
    pub output_folder: Option<PathBuf>,

    /// Folder for run logs (overrides [run_log].folder)
    #[arg(long, value_name = "DIR")]
    pub log_folder: Option<PathBuf>,

    /// Dispatch panel members concurrently (faster for cloud APIs, not recommended for local LLMs)
    #[arg(long)]
    pub parallel_agents: bool,

    /// Also write diagnostic logs to daily-rolling files in this folder
    #[arg(long, value_name = "DIR")]
    pub log_file: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum, default_value = "full")]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}
