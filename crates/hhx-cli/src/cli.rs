use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "HHX Truth Analysis Contributors",
    version,
    about = "hhx - Truth-level ntuple maker for neutralino pair production with Higgs + gravitino decays.",
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
    /// Select matching events from a truth-record file and write the ntuple.
    Run(RunArgs),
    /// Print the branch names of the output ntuple.
    Schema(SchemaArgs),
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the input truth-record file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Directory that receives the output stream.
    /// The ntuple is written to <OUTPUT>/<file-name>/<tree-name>.csv.
    #[arg(short, long, required = true, value_name = "DIR")]
    pub output: PathBuf,

    /// Path to an optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the name of the output tree.
    #[arg(long, value_name = "NAME")]
    pub tree_name: Option<String>,

    /// Override the name of the output stream.
    #[arg(long, value_name = "NAME")]
    pub file_name: Option<String>,

    /// Log every processed event.
    #[arg(long)]
    pub debug: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S input.truth-collection=TruthBSM
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `schema` subcommand.
#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Print the names as a single comma-separated header line.
    #[arg(long)]
    pub header: bool,
}
