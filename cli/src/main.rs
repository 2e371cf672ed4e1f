use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use sqlgen_codegen::{BuildIdentity, GenerateReport, GeneratorConfig, IdentityFallback, generate};
use sqlgen_core::{Column, parse_template, probe};
use sqlgen_sqlite::{Nullability, SqliteConnectionFactory};
use tracing::debug;

const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum CliNullability {
    Declared,
    Nullable,
    NotNull,
}

impl From<CliNullability> for Nullability {
    fn from(value: CliNullability) -> Self {
        match value {
            CliNullability::Declared => Self::Declared,
            CliNullability::Nullable => Self::Nullable,
            CliNullability::NotNull => Self::NotNull,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum CliIdentityFallback {
    Now,
    Epoch,
}

impl From<CliIdentityFallback> for IdentityFallback {
    fn from(value: CliIdentityFallback) -> Self {
        match value {
            CliIdentityFallback::Now => Self::Now,
            CliIdentityFallback::Epoch => Self::Epoch,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "sqlgen", version = PACKAGE_VERSION)]
#[command(about = "Generate typed Rust accessors from SQL templates")]
struct Cli {
    /// Log debug output to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate accessor modules and stored queries for a directory of SQL files.
    Generate(GenerateArgs),
    /// Parse one SQL template and print its parameters.
    Parse(ParseArgs),
    /// Probe one SQL template and print its result columns.
    Describe(DescribeArgs),
}

/// Probe database selection shared by `generate` and `describe`.
#[derive(Debug, Args)]
struct DatabaseArgs {
    /// SQLite database file, opened read-only.
    #[arg(long, conflicts_with = "init_sql")]
    database: Option<PathBuf>,
    /// SQL script that builds an in-memory probe database.
    #[arg(long)]
    init_sql: Option<PathBuf>,
    /// Result-column nullability; `declared` follows the origin column's
    /// `NOT NULL` constraint, the others override it for every column.
    #[arg(long, value_enum, default_value = "declared")]
    nullable: CliNullability,
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// YAML generator configuration.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Root of the `.sql` input tree (overrides the config file).
    #[arg(long)]
    sql_dir: Option<PathBuf>,
    /// Root for generated `.rs` files (overrides the config file).
    #[arg(long)]
    source_dir: Option<PathBuf>,
    /// Root for generated query resources (overrides the config file).
    #[arg(long)]
    resource_dir: Option<PathBuf>,
    /// Worker threads (default: available parallelism).
    #[arg(long)]
    jobs: Option<usize>,
    /// Regenerate every file even if its outputs are current.
    #[arg(long)]
    force: bool,
    /// Build identity JSON file used for staleness.
    #[arg(long)]
    identity: Option<PathBuf>,
    /// Build time to assume when the binary was built without an embedded
    /// identity and none is given.
    #[arg(long, value_enum, default_value = "epoch")]
    identity_fallback: CliIdentityFallback,
    /// Write a JSON report of the run.
    #[arg(long)]
    report: Option<PathBuf>,
    #[command(flatten)]
    database: DatabaseArgs,
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// SQL template file.
    file: PathBuf,
    /// Output format.
    #[arg(long, value_enum, default_value = "json")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct DescribeArgs {
    /// SQL template file.
    file: PathBuf,
    /// Output format.
    #[arg(long, value_enum, default_value = "json")]
    format: CliOutputFormat,
    #[command(flatten)]
    database: DatabaseArgs,
}

/// Result shape printed by `describe`.
#[derive(Debug, Serialize)]
struct DescribeOutput<'a> {
    file: &'a Path,
    populated: &'a str,
    columns: &'a [Column],
}

fn main() {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    let result = match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Parse(args) => run_parse(args),
        Command::Describe(args) => run_describe(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn setup_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_generate(args: GenerateArgs) -> Result<(), String> {
    let factory = probe_factory(&args.database)?;
    let config = resolve_config(&args)?;
    let identity = match &args.identity {
        Some(path) => BuildIdentity::load(path).map_err(|err| err.to_string())?,
        None => BuildIdentity::resolve(args.identity_fallback.into()),
    };
    debug!(
        version = %identity.version,
        build_time = %identity.build_time,
        "resolved build identity"
    );

    let report = generate(&config, &factory, &identity).map_err(|err| err.to_string())?;

    if let Some(path) = &args.report {
        write_report(path, &report)?;
    }

    println!(
        "Generated: {}, Up to date: {}",
        report.generated_count(),
        report.up_to_date_count()
    );
    Ok(())
}

fn run_parse(args: ParseArgs) -> Result<(), String> {
    let raw = read_sql(&args.file)?;
    let template =
        parse_template(&raw).map_err(|err| format!("{}: {err}", args.file.display()))?;
    println!("{}", render(&template, args.format)?);
    Ok(())
}

fn run_describe(args: DescribeArgs) -> Result<(), String> {
    let factory = probe_factory(&args.database)?;
    let raw = read_sql(&args.file)?;
    let template =
        parse_template(&raw).map_err(|err| format!("{}: {err}", args.file.display()))?;
    let schema = probe(&factory, template.populated())
        .map_err(|err| format!("{}: {err}", args.file.display()))?;

    let output = DescribeOutput {
        file: &args.file,
        populated: template.populated(),
        columns: schema.columns(),
    };
    println!("{}", render(&output, args.format)?);
    Ok(())
}

/// Builds the generator configuration from `--config` and the directory flags.
///
/// Flags win over the config file; without a config file all three
/// directories must be given.
fn resolve_config(args: &GenerateArgs) -> Result<GeneratorConfig, String> {
    let mut config = match &args.config {
        Some(path) => GeneratorConfig::load(path).map_err(|err| err.to_string())?,
        None => {
            let (Some(sql_dir), Some(source_dir), Some(resource_dir)) =
                (&args.sql_dir, &args.source_dir, &args.resource_dir)
            else {
                return Err(
                    "Specify --config or all of --sql-dir, --source-dir and --resource-dir"
                        .to_string(),
                );
            };
            GeneratorConfig::new(sql_dir.clone(), source_dir.clone(), resource_dir.clone())
        }
    };

    if let Some(dir) = &args.sql_dir {
        config.sql_source_dir = dir.clone();
    }
    if let Some(dir) = &args.source_dir {
        config.generated_source_dir = dir.clone();
    }
    if let Some(dir) = &args.resource_dir {
        config.generated_resource_dir = dir.clone();
    }
    if let Some(jobs) = args.jobs {
        if jobs == 0 {
            return Err("--jobs must be at least 1".to_string());
        }
        config.jobs = Some(jobs);
    }
    if args.force {
        config.force = true;
    }
    Ok(config)
}

fn probe_factory(args: &DatabaseArgs) -> Result<SqliteConnectionFactory, String> {
    let factory = match (&args.database, &args.init_sql) {
        (Some(path), _) => {
            if !path.is_file() {
                return Err(format!("Database file '{}' does not exist", path.display()));
            }
            SqliteConnectionFactory::open(path.clone())
        }
        (None, Some(path)) => {
            SqliteConnectionFactory::in_memory_from_file(path).map_err(|err| err.to_string())?
        }
        (None, None) => {
            return Err("Specify a probe database: --database or --init-sql".to_string());
        }
    };
    Ok(factory.with_nullability(args.nullable.into()))
}

fn read_sql(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|err| format!("Failed to read '{}': {err}", path.display()))
}

fn write_report(path: &Path, report: &GenerateReport) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                format!(
                    "Failed to create report directory '{}': {err}",
                    parent.display()
                )
            })?;
        }
    }
    let raw = serde_json::to_string_pretty(report)
        .map_err(|err| format!("Failed to serialize report: {err}"))?;
    fs::write(path, raw).map_err(|err| format!("Failed to write '{}': {err}", path.display()))
}

fn render<T: Serialize>(value: &T, format: CliOutputFormat) -> Result<String, String> {
    match format {
        CliOutputFormat::Json => serde_json::to_string_pretty(value)
            .map_err(|err| format!("Failed to serialize JSON: {err}")),
        CliOutputFormat::Yaml => {
            serde_yaml::to_string(value).map_err(|err| format!("Failed to serialize YAML: {err}"))
        }
    }
}
