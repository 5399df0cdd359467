//! code-context CLI - print context records for JavaScript sources

#![deny(warnings)]

// Global invariants enforced:
// - Deterministic output ordering
// - Identical input yields byte-for-byte identical output
// - Diagnostics go to stderr, results to stdout

use anyhow::Context;
use clap::{Parser, Subcommand};
use code_context_core::config::{self, ResolvedConfig};
use code_context_core::{
    extract_path, extract_source, render_json, render_jsonl, render_text, ContextKind,
    FileContext,
};
use std::collections::BTreeSet;
use std::io::Read;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser)]
#[command(name = "code-context")]
#[command(about = "Extract comments, functions, methods, properties and declarations from JavaScript")]
#[command(version = env!("CODE_CONTEXT_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract context records from a file, a directory, or stdin (`-`)
    Extract {
        /// Path to source file or directory, or `-` for stdin
        path: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Only keep these record types (overrides config file)
        #[arg(long = "type", value_name = "TYPE")]
        types: Vec<String>,

        /// Attach literal comment text to comment records
        #[arg(long)]
        comment_body: bool,

        /// Fail on unterminated block comments instead of skipping them
        #[arg(long)]
        strict_comments: bool,
    },
    /// Inspect configuration
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file without running extraction
    Validate {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Jsonl,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Extract {
            path,
            format,
            config: config_path,
            types,
            comment_body,
            strict_comments,
        } => {
            let from_stdin = path.as_os_str() == "-";

            // Load configuration
            let project_root = if from_stdin || path.is_file() {
                std::env::current_dir()?
            } else {
                path.clone()
            };
            let mut resolved_config =
                config::load_and_resolve(&project_root, config_path.as_deref())
                    .context("failed to load configuration")?;

            if let Some(config_path) = &resolved_config.config_path {
                debug!("using config: {}", config_path.display());
            }

            // CLI flags override config file values
            apply_overrides(&mut resolved_config, &types, comment_body, strict_comments)?;

            let results = if from_stdin {
                vec![extract_stdin(&resolved_config)?]
            } else {
                if !path.exists() {
                    anyhow::bail!("Path does not exist: {}", path.display());
                }
                extract_path(&path, &resolved_config)?
            };

            match format {
                OutputFormat::Text => print!("{}", render_text(&results)),
                OutputFormat::Json => println!("{}", render_json(&results)),
                OutputFormat::Jsonl => print!("{}", render_jsonl(&results)),
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => {
                let project_root = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&project_root, path.as_deref());

                match resolved {
                    Ok(config) => {
                        if let Some(ref p) = config.config_path {
                            println!("Config valid: {}", p.display());
                        } else {
                            println!("No config file found. Using defaults.");
                        }
                    }
                    Err(e) => {
                        eprintln!("Config validation failed: {:#}", e);
                        std::process::exit(1);
                    }
                }
            }
            ConfigAction::Show { path } => {
                let project_root = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&project_root, path.as_deref())
                    .context("failed to load configuration")?;
                print_config(&resolved);
            }
        },
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Apply CLI flags on top of the resolved config
fn apply_overrides(
    resolved: &mut ResolvedConfig,
    types: &[String],
    comment_body: bool,
    strict_comments: bool,
) -> anyhow::Result<()> {
    if !types.is_empty() {
        let kinds = types
            .iter()
            .map(|name| name.parse::<ContextKind>().map_err(|e| anyhow::anyhow!(e)))
            .collect::<anyhow::Result<BTreeSet<_>>>()?;
        resolved.types = Some(kinds);
    }
    if comment_body {
        resolved.parse_options.include_comment_body = true;
    }
    if strict_comments {
        resolved.parse_options.strict_comments = true;
    }
    Ok(())
}

fn extract_stdin(resolved: &ResolvedConfig) -> anyhow::Result<FileContext> {
    let mut bytes = Vec::new();
    std::io::stdin()
        .read_to_end(&mut bytes)
        .context("failed to read stdin")?;
    let text = code_context_core::classifier::as_text(&bytes)?;
    Ok(extract_source("<stdin>", text, resolved)?)
}

fn print_config(resolved: &ResolvedConfig) {
    println!("Configuration:");
    match resolved.config_path.as_deref() {
        Some(p) => println!("  Source: {}", p.display()),
        None => println!("  Source: defaults (no config file found)"),
    }
    println!();
    println!("Extraction:");
    println!(
        "  types: {}",
        match &resolved.types {
            Some(types) => types
                .iter()
                .map(ContextKind::as_str)
                .collect::<Vec<_>>()
                .join(", "),
            None => "all".to_string(),
        }
    );
    println!(
        "  comment_body: {}",
        resolved.parse_options.include_comment_body
    );
    println!(
        "  strict_comments: {}",
        resolved.parse_options.strict_comments
    );
    println!();
    println!("Filters:");
    println!(
        "  include: {}",
        if resolved.include.is_some() {
            "custom patterns"
        } else {
            "all files"
        }
    );
    println!("  exclude: {} patterns", resolved.exclude.len());
}
