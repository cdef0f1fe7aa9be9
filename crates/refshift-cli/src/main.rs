use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use refshift_core::{Config, ConfigError};
use refshift_dbt::Manifest;

mod hook;
mod tracking;

use hook::process_files;
use tracking::{tracker_from_env, HookEvent};

const HOOK_NAME: &str = "refshift";
const HOOK_DESCRIPTION: &str =
    "Replace table names with source() or ref() macros in the script.";

/// refshift - rewrite hardcoded table names into ref()/source() macros
#[derive(Parser)]
#[command(name = "refshift")]
#[command(version, about, long_about = None)]
struct Cli {
    /// SQL files to rewrite in place
    filenames: Vec<PathBuf>,

    /// Path to dbt manifest.json (overrides config)
    #[arg(short, long)]
    manifest: Option<PathBuf>,

    /// Path to config file (default: refshift.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Mark this run as a test invocation in the tracking event
    #[arg(long)]
    is_test: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    std::process::exit(run(&cli));
}

fn run(cli: &Cli) -> i32 {
    let config = match load_config(cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            return 1;
        }
    };

    if cli.verbose {
        eprintln!("{} dialect: {:?}", "Using".cyan(), config.dialect);
    }

    // The manifest must load before any file is touched
    let manifest_path = cli
        .manifest
        .clone()
        .unwrap_or_else(|| config.manifest_path.clone());
    let manifest = match Manifest::from_file(&manifest_path) {
        Ok(manifest) => manifest,
        Err(e) => {
            eprintln!("{} {}", "Unable to load manifest file:".red(), e);
            return 1;
        }
    };

    let start = Instant::now();
    let status = match process_files(&cli.filenames, &manifest, &config, cli.verbose) {
        Ok(status) => status,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red(), e);
            return 1;
        }
    };
    let execution_time = start.elapsed().as_secs_f64();

    if cli.verbose {
        eprintln!(
            "{} {} files in {:.3}s",
            "Processed".cyan(),
            cli.filenames.len(),
            execution_time
        );
    }

    tracker_from_env(&config).track_hook_event(&HookEvent {
        hook_name: HOOK_NAME,
        description: HOOK_DESCRIPTION,
        status,
        execution_time,
        file_count: cli.filenames.len(),
        is_test: cli.is_test,
    });

    status
}

fn load_config(cli: &Cli) -> Result<Config, ConfigError> {
    if let Some(path) = &cli.config {
        Config::from_file(path)
    } else if std::path::Path::new("refshift.toml").exists() {
        Config::from_file(std::path::Path::new("refshift.toml"))
    } else {
        Ok(Config::default())
    }
}
