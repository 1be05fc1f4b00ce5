//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Attest - governance layer for a portfolio chatbot.
#[derive(Debug, Parser)]
#[command(name = "attest")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "ATTEST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Plain-text résumé (overrides the configured path)
    #[arg(long, global = true, env = "ATTEST_RESUME")]
    pub resume: Option<PathBuf>,

    /// Availability JSON record (overrides the configured path)
    #[arg(long, global = true, env = "ATTEST_AVAILABILITY")]
    pub availability: Option<PathBuf>,

    /// Governance preset (replaces the configured policy)
    #[arg(short, long, value_enum, global = true)]
    pub preset: Option<PresetArg>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// Governance preset options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PresetArg {
    /// Employers and date ranges are high-stakes
    Default,
    /// Everything but skills is high-stakes
    Strict,
    /// Only employers are high-stakes
    Permissive,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a model response through the governance pipeline
    Check(CheckArgs),

    /// List the facts extracted from the knowledge source
    Facts(FactsArgs),

    /// Print the structured profile
    Profile,

    /// Print the availability report
    Availability,

    /// Architecture audit for one project
    Project(ProjectArgs),

    /// Check an employment record field by field
    VerifyEmployment(VerifyEmploymentArgs),

    /// Keep the knowledge base loaded and reload it on change
    Watch(WatchArgs),
}

/// Arguments for the check command.
#[derive(Debug, Parser)]
pub struct CheckArgs {
    /// The visitor's query
    #[arg(short, long)]
    pub query: String,

    /// File holding the model response (reads stdin when omitted)
    #[arg(short, long)]
    pub response: Option<PathBuf>,
}

/// Arguments for the facts command.
#[derive(Debug, Parser)]
pub struct FactsArgs {
    /// Only list facts of this kind (e.g. EMPLOYER, DATE_RANGE)
    #[arg(short, long)]
    pub kind: Option<String>,
}

/// Arguments for the project command.
#[derive(Debug, Parser)]
pub struct ProjectArgs {
    /// Project name (case-insensitive)
    pub name: String,
}

/// Arguments for the verify-employment command.
#[derive(Debug, Parser)]
pub struct VerifyEmploymentArgs {
    /// Employer name
    pub employer: String,

    /// Job title held there
    #[arg(short, long)]
    pub role: Option<String>,

    /// Date range, e.g. "2019 - 2022"
    #[arg(short, long)]
    pub dates: Option<String>,
}

/// Arguments for the watch command.
#[derive(Debug, Parser)]
pub struct WatchArgs {
    /// Seconds between change checks (overrides the configured interval)
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Stop after this many checks instead of waiting for Ctrl+C
    #[arg(long)]
    pub cycles: Option<usize>,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}

impl PresetArg {
    /// Preset name as understood by the governance config
    pub fn as_str(&self) -> &'static str {
        match self {
            PresetArg::Default => "default",
            PresetArg::Strict => "strict",
            PresetArg::Permissive => "permissive",
        }
    }
}
