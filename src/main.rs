use clap::Parser;
use color_eyre::eyre::{eyre, Result, WrapErr};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use xoopt_core::builder::ConfigBuilder;
use xoopt_core::cli::{Cli, Commands, NormalizeArgs, OutputFormat, ResolveArgs, TargetArgs};
use xoopt_core::config::{load_config, merge_resolve_args, merge_target_args, XooptConfig};
use xoopt_core::file_utils::collect_lint_targets;
use xoopt_core::formatter::FormatterOptions;
use xoopt_core::grouping::{group_by_options, ConfigGroup};
use xoopt_core::module_resolver::NodeModulesResolver;
use xoopt_core::options::{normalize, Options};
use xoopt_core::pkg_conf::{merge_with_pkg_conf, PackageJsonLoader};
use xoopt_core::report::{render_groups, render_options, render_resolved};
use xoopt_core::Error;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "XOOPT_LOG";

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn init_thread_pool(jobs: Option<usize>) -> Result<()> {
    let jobs = jobs.unwrap_or_else(num_cpus::get).max(1);
    rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build_global()
        .wrap_err("Failed to configure the worker pool")
}

/// Reads a JSON file of loosely written options.
fn read_json_file(path: &Path) -> std::result::Result<serde_json::Value, Error> {
    let content = fs::read_to_string(path)
        .map_err(|err| Error::io_error_with_source("read options", path.to_path_buf(), err))?;
    serde_json::from_str(&content)
        .map_err(|err| Error::parse_error_with_file(path.to_path_buf(), "invalid JSON", err))
}

fn read_options(path: Option<&Path>) -> Result<Options> {
    let Some(path) = path else {
        return Ok(Options::default());
    };
    match read_json_file(path)? {
        serde_json::Value::Object(raw) => Ok(normalize(&raw)?),
        _ => Err(eyre!("Options file '{}' must contain a JSON object", path.display())),
    }
}

fn read_formatter_options(path: &Path) -> Result<FormatterOptions> {
    let value = read_json_file(path)?;
    serde_json::from_value(value)
        .map_err(|err| Error::parse_error_with_file(path.to_path_buf(), "invalid formatter settings", err).into())
}

fn absolute_cwd(cwd: Option<&Path>) -> Result<PathBuf> {
    let current = std::env::current_dir().wrap_err("Failed to read the current directory")?;
    Ok(match cwd {
        Some(cwd) => current.join(cwd),
        None => current,
    })
}

/// Loads the explicit options, merges them over the manifest and groups the
/// target files, with paths relative to `cwd`.
fn group_targets(target: &TargetArgs, cwd: &Path, config: &XooptConfig) -> Result<Vec<ConfigGroup>> {
    let explicit = read_options(target.options.as_deref())?;

    let key = target
        .manifest_key
        .clone()
        .unwrap_or_else(|| config.manifest_key().to_string());
    let opts = merge_with_pkg_conf(cwd, &explicit, &PackageJsonLoader::new(key))?;

    let mut extensions = opts.extensions.clone().unwrap_or_default();
    extensions.extend(config.resolve.extensions.iter().cloned());

    let files: Vec<PathBuf> = collect_lint_targets(&target.paths, cwd, &extensions)
        .map_err(|err| eyre!("{err:#}"))?
        .into_iter()
        .map(|path| path.strip_prefix(cwd).map(Path::to_path_buf).unwrap_or(path))
        .collect();
    tracing::info!(files = files.len(), "Grouping files");

    init_thread_pool(target.jobs)?;
    Ok(group_by_options(&files, &opts)?)
}

fn run_normalize(args: &NormalizeArgs, config: &XooptConfig) -> Result<String> {
    let opts = read_options(args.options.as_deref())?;
    let format = match args.output {
        Some(format) => format,
        None => merge_target_args(&TargetArgs::default(), config)?
            .output
            .unwrap_or_default(),
    };
    Ok(render_options(&opts, format)?)
}

fn run_groups(target: &TargetArgs, cwd: &Path, config: &XooptConfig) -> Result<String> {
    let target = merge_target_args(target, config)?;
    let groups = group_targets(&target, cwd, config)?;
    Ok(render_groups(&groups, target.output.unwrap_or(OutputFormat::Text))?)
}

fn run_resolve(args: &ResolveArgs, cwd: &Path, config: &XooptConfig) -> Result<String> {
    let args = merge_resolve_args(args, config)?;
    let groups = group_targets(&args.target, cwd, config)?;

    let formatter = match &args.formatter_config {
        Some(path) => Some(read_formatter_options(path)?),
        None => PackageJsonLoader::default().load_formatter_options(cwd)?,
    };

    let resolver = NodeModulesResolver;
    let mut builder =
        ConfigBuilder::new(cwd, &resolver).rules_strategy(args.rules_strategy.unwrap_or_default());
    if let Some(formatter) = formatter {
        builder = builder.formatter_options(formatter);
    }

    let resolved = builder.build_groups(&groups)?;
    Ok(render_resolved(&resolved, args.target.output.unwrap_or_default())?)
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let cwd_arg = match &cli.command {
        Commands::Groups(args) => args.target.cwd.as_deref(),
        Commands::Resolve(args) => args.target.cwd.as_deref(),
        Commands::Normalize(_) => None,
    };
    let cwd = absolute_cwd(cwd_arg)?;

    let config = load_config(cli.config.as_deref(), &cwd)?
        .map(|(_, config)| config)
        .unwrap_or_default();

    init_tracing(cli.verbose || config.general.verbose);
    tracing::debug!(cwd = %cwd.display(), "Starting");

    let output = match &cli.command {
        Commands::Normalize(args) => run_normalize(args, &config)?,
        Commands::Groups(args) => run_groups(&args.target, &cwd, &config)?,
        Commands::Resolve(args) => run_resolve(args, &cwd, &config)?,
    };

    println!("{}", output.trim_end());
    Ok(())
}
