use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "PrimerForge Contributors",
    version,
    about = "PrimerForge CLI - PCR primer design on top of primer3, with automatic constraint relaxation when a design comes back empty.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Design primers once with the requested constraints.
    Design(DesignArgs),
    /// Design primers, relaxing GC clamp and Tm constraints until pairs are found.
    Troubleshoot(DesignArgs),
    /// Serve `design_primers` and `troubleshoot_primers` as MCP tools over stdio.
    Serve(ServeArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

/// Arguments shared by `design` and `troubleshoot`.
#[derive(Args, Debug)]
pub struct DesignArgs {
    // --- Input ---
    /// Template sequence with exactly one `[n]` marker at the target position.
    #[arg(short, long, value_name = "SEQ", conflicts_with = "input", required_unless_present = "input")]
    pub sequence: Option<String>,

    /// Read the template sequence from a plain or FASTA file.
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Write results to a file instead of stdout.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Path to the primer3_core executable.
    #[arg(long, value_name = "PATH")]
    pub primer3: Option<PathBuf>,

    // --- Design overrides ---
    #[arg(long, value_name = "INT")]
    pub primer_size_min: Option<u32>,

    #[arg(long, value_name = "INT")]
    pub primer_size_opt: Option<u32>,

    #[arg(long, value_name = "INT")]
    pub primer_size_max: Option<u32>,

    #[arg(long, value_name = "FLOAT")]
    pub primer_tm_min: Option<f64>,

    #[arg(long, value_name = "FLOAT")]
    pub primer_tm_opt: Option<f64>,

    #[arg(long, value_name = "FLOAT")]
    pub primer_tm_max: Option<f64>,

    #[arg(long, value_name = "INT")]
    pub gc_clamp: Option<u32>,

    /// Override the target start taken from the `[n]` marker (0-based).
    #[arg(long, value_name = "INT")]
    pub target_start: Option<usize>,

    #[arg(long, value_name = "INT")]
    pub target_length: Option<usize>,

    /// Maximum number of primer pairs to return.
    #[arg(short = 'n', long, value_name = "INT")]
    pub num_return: Option<u32>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S design.gc-clamp=1
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Path to the primer3_core executable.
    #[arg(long, value_name = "PATH")]
    pub primer3: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}
