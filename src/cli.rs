use crate::builder::RuleMergeStrategy;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Resolve lint options into per-file-group linter configurations.
#[derive(Parser, Debug)]
#[command(name = "xoopt", version, about, long_about = None)]
pub struct Cli {
    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a settings file. When omitted, `.xoopt.toml` or `xoopt.toml`
    /// is searched for upward from the working directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log decisions to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the canonical form of a loosely written options file.
    Normalize(NormalizeArgs),
    /// Show how files are grouped by the overrides that apply to them.
    Groups(GroupsArgs),
    /// Emit one linter configuration per group of files.
    Resolve(ResolveArgs),
}

/// Output format for command results.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed JSON.
    #[default]
    Json,
    /// YAML.
    Yaml,
    /// A terminal table.
    Table,
    /// A compact plain-text listing.
    Text,
}

/// Arguments for `normalize`.
#[derive(Args, Debug, Clone)]
pub struct NormalizeArgs {
    /// JSON file with the options to normalize. Reads `{}` when omitted.
    #[arg(long)]
    pub options: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum)]
    pub output: Option<OutputFormat>,
}

/// Arguments shared by the commands that work on a set of files.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Files or directories to lint. Defaults to the working directory.
    pub paths: Vec<PathBuf>,

    /// Working directory. Defaults to the current directory.
    #[arg(long)]
    pub cwd: Option<PathBuf>,

    /// JSON file with explicit options, merged over the manifest's.
    #[arg(long)]
    pub options: Option<PathBuf>,

    /// Manifest key the stored options live under.
    #[arg(long)]
    pub manifest_key: Option<String>,

    /// Output format.
    #[arg(long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Number of threads used to match overrides.
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

/// Arguments for `groups`.
#[derive(Args, Debug, Clone, Default)]
pub struct GroupsArgs {
    /// Files, working directory and output settings.
    #[command(flatten)]
    pub target: TargetArgs,
}

/// Arguments for `resolve`.
#[derive(Args, Debug, Clone, Default)]
pub struct ResolveArgs {
    /// Files, working directory and output settings.
    #[command(flatten)]
    pub target: TargetArgs,

    /// JSON file with the formatter's settings. Defaults to the `prettier`
    /// key of the nearest `package.json`.
    #[arg(long)]
    pub formatter_config: Option<PathBuf>,

    /// How explicit `rules` combine with generated rules.
    #[arg(long, value_enum)]
    pub rules_strategy: Option<RuleMergeStrategy>,
}
