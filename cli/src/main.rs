use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use node_schema_core::{NodeSchema, SchemaRegistry};
use node_schema_defs::{Declarations, ToolConfig};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Output format for `show`.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Text,
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "node-schema")]
#[command(about = "Check and inspect syntax-tree node declarations")]
struct Cli {
    /// Tool configuration file listing declaration sources.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load declarations and validate every node kind.
    Check(SourceArgs),
    /// Print node kind schemas.
    Show(ShowArgs),
    /// List declared node kinds.
    Kinds(SourceArgs),
}

#[derive(Debug, Args)]
struct SourceArgs {
    /// Declaration files and/or directories (defaults to the config's list).
    inputs: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct ShowArgs {
    #[command(flatten)]
    sources: SourceArgs,
    /// Only show this node kind.
    #[arg(long)]
    kind: Option<String>,
    /// Output format.
    #[arg(long, default_value = "text")]
    format: CliOutputFormat,
}

fn main() {
    let cli = Cli::parse();

    let result = load_config(cli.config.as_ref()).and_then(|config| {
        init_tracing(&config, cli.verbose);
        match cli.command {
            Command::Check(args) => run_check(&config, args),
            Command::Show(args) => run_show(&config, args),
            Command::Kinds(args) => run_kinds(&config, args),
        }
    });

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<ToolConfig, String> {
    match path {
        Some(path) => ToolConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display())),
        None => Ok(ToolConfig::default()),
    }
}

fn init_tracing(config: &ToolConfig, verbose: u8) {
    let level = match verbose {
        0 => config.log_level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_declarations(config: &ToolConfig, args: &SourceArgs) -> Result<Declarations, String> {
    let inputs = if args.inputs.is_empty() {
        &config.declarations
    } else {
        &args.inputs
    };
    if inputs.is_empty() {
        return Err("No declaration sources: pass paths or a --config listing them".to_string());
    }
    debug!(sources = inputs.len(), "Loading declarations");
    Declarations::from_paths(inputs).map_err(|err| err.to_string())
}

fn seal(decls: Declarations) -> Result<&'static SchemaRegistry, String> {
    decls
        .into_registry()
        .and_then(|registry| registry.seal().map_err(Into::into))
        .map_err(|err| err.to_string())
}

fn run_check(config: &ToolConfig, args: SourceArgs) -> Result<(), String> {
    let decls = load_declarations(config, &args)?;
    let fingerprint = decls.fingerprint().map_err(|err| err.to_string())?;
    let registry = seal(decls)?;

    println!("Checked {} node kind(s).", registry.len());
    println!("fingerprint: {fingerprint}");
    Ok(())
}

fn run_show(config: &ToolConfig, args: ShowArgs) -> Result<(), String> {
    let registry = seal(load_declarations(config, &args.sources)?)?;

    let schemas: Vec<&NodeSchema> = match &args.kind {
        Some(kind) => vec![registry.schema(kind).map_err(|err| err.to_string())?],
        None => registry.schemas().collect(),
    };

    let raw = match args.format {
        CliOutputFormat::Text => schemas
            .iter()
            .map(|schema| schema.to_string())
            .collect::<Vec<_>>()
            .join("\n\n"),
        CliOutputFormat::Json => serde_json::to_string_pretty(&schemas)
            .map_err(|err| format!("Failed to serialize schemas: {err}"))?,
        CliOutputFormat::Yaml => serde_yaml::to_string(&schemas)
            .map_err(|err| format!("Failed to serialize schemas: {err}"))?,
    };
    println!("{}", raw.trim_end());
    Ok(())
}

fn run_kinds(config: &ToolConfig, args: SourceArgs) -> Result<(), String> {
    let registry = seal(load_declarations(config, &args)?)?;
    for schema in registry.schemas() {
        match &schema.extends {
            Some(parent) => println!("{} ({parent})", schema.kind),
            None => println!("{}", schema.kind),
        }
    }
    Ok(())
}
