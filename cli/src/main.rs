use std::path::{Path, PathBuf};
use std::rc::Rc;

use clap::{Args, Parser, Subcommand};
use envflag_core::{
    FlagInfo, FlagManifest, FlagSet, LookupEnvFn, ValidationError, apply_and_parse,
    default_lookup_env, validate_manifest,
};
use serde::Serialize;
use tracing::{Level, debug};
use tracing_subscriber::FmtSubscriber;

const DEFAULT_SET_NAME: &str = "envflag";

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "envflag")]
#[command(about = "Validate, describe and resolve YAML flag manifests", version)]
struct Cli {
    /// Log resolution details to stderr.
    #[arg(long, short, global = true, conflicts_with = "quiet")]
    verbose: bool,
    /// Only log errors.
    #[arg(long, short, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check a manifest for invalid names, collisions and defaults.
    Validate(ValidateArgs),
    /// Print every declared flag with its default, without reading the environment.
    Describe(DescribeArgs),
    /// Resolve the declared flags against the environment and the given arguments.
    Resolve(ResolveArgs),
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Path to the YAML manifest.
    #[arg(long)]
    manifest: PathBuf,
}

#[derive(Debug, Args)]
struct DescribeArgs {
    /// Path to the YAML manifest.
    #[arg(long)]
    manifest: PathBuf,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct ResolveArgs {
    /// Path to the YAML manifest.
    #[arg(long)]
    manifest: PathBuf,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Arguments to parse against the declared flags, given after `--`.
    #[arg(last = true)]
    args: Vec<String>,
}

/// Output of `resolve`: the flag snapshots plus leftover positionals.
#[derive(Debug, Serialize)]
struct ResolveReport {
    flags: Vec<FlagInfo>,
    args: Vec<String>,
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = initialize_logging(&cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }

    let result = match cli.command {
        Command::Validate(args) => run_validate(args),
        Command::Describe(args) => run_describe(args),
        Command::Resolve(args) => run_resolve(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn initialize_logging(cli: &Cli) -> Result<(), String> {
    let level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::WARN
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|err| format!("Failed to initialize logging: {err}"))
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let manifest = load_valid_manifest(&args.manifest)?;
    println!(
        "Validated manifest '{}' with {} flag(s).",
        manifest.name.as_deref().unwrap_or(DEFAULT_SET_NAME),
        manifest.flags.len()
    );
    Ok(())
}

fn run_describe(args: DescribeArgs) -> Result<(), String> {
    let manifest = load_valid_manifest(&args.manifest)?;
    let no_env: LookupEnvFn = Rc::new(|_: &str| None::<String>);
    let flags = manifest.build_flags(&no_env).map_err(|e| e.to_string())?;

    let infos: Vec<FlagInfo> = flags.iter().map(|f| FlagInfo::from_flag(f.as_ref())).collect();
    println!("{}", render(&infos, args.format)?);
    Ok(())
}

fn run_resolve(args: ResolveArgs) -> Result<(), String> {
    let manifest = load_valid_manifest(&args.manifest)?;
    let mut flags = manifest
        .build_flags(&default_lookup_env())
        .map_err(|e| e.to_string())?;

    let mut set = FlagSet::new(manifest.name.as_deref().unwrap_or(DEFAULT_SET_NAME));
    apply_and_parse(&mut set, &mut flags, &args.args).map_err(|e| e.to_string())?;
    debug!(flags = flags.len(), args = ?set.args(), "Resolved manifest flags");

    let report = ResolveReport {
        flags: flags.iter().map(|f| FlagInfo::from_flag(f.as_ref())).collect(),
        args: set.args().to_vec(),
    };
    println!("{}", render(&report, args.format)?);
    Ok(())
}

/// Loads a manifest and fails with every validation error joined into one message.
fn load_valid_manifest(path: &Path) -> Result<FlagManifest, String> {
    let manifest = FlagManifest::load(path)
        .map_err(|err| format!("Failed to load '{}': {err}", path.display()))?;
    debug!(path = %path.display(), flags = manifest.flags.len(), "Loaded manifest");

    let errors = validate_manifest(&manifest);
    if !errors.is_empty() {
        return Err(format_validation_errors(path, &errors));
    }
    Ok(manifest)
}

fn format_validation_errors(path: &Path, errors: &[ValidationError]) -> String {
    let details: Vec<String> = errors.iter().map(ToString::to_string).collect();
    format!("Invalid manifest '{}': {}", path.display(), details.join("; "))
}

fn render<T: Serialize>(value: &T, format: CliOutputFormat) -> Result<String, String> {
    match format {
        CliOutputFormat::Json => {
            serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
        }
        CliOutputFormat::Yaml => {
            serde_yaml::to_string(value).map_err(|e| format!("YAML serialization failed: {e}"))
        }
    }
}
