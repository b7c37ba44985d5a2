mod config;
mod store;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use config::StowageConfig;
use store::FsStore;
use stowage_logging::{error_if, fatal_if, log_println, Logger};

#[derive(Parser, Debug)]
#[command(
    name = "stowage",
    about = "Filesystem object store",
    version,
    author
)]
struct Cli {
    /// Data directory (default: from stowage.toml, else current directory)
    #[arg(short = 'd', long)]
    data_dir: Option<PathBuf>,

    /// Path to a config file (default: ./stowage.toml, then the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Suppress informational output
    #[arg(short, long)]
    quiet: bool,

    /// Output error records as JSON lines (implies --quiet)
    #[arg(long)]
    json: bool,

    /// Filter for internal diagnostics on stderr
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show a bucket, or an object's size
    Stat { bucket: String, object: Option<String> },
    /// List objects in a bucket
    List { bucket: String },
    /// Create a bucket
    MakeBucket { bucket: String },
    /// Remove an empty bucket
    RemoveBucket { bucket: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let working_dir = std::env::current_dir().context("Failed to get current directory")?;
    let file_config = match &cli.config {
        Some(path) => StowageConfig::load_file(path)?,
        None => StowageConfig::discover(&working_dir)?.unwrap_or_default(),
    };

    let logger_config = file_config.logger_config(cli.quiet, cli.json);
    stowage_logging::init_tracing(
        file_config.diagnostics_level(cli.log_level.as_deref()),
        logger_config.json(),
    );
    let logger = Logger::new(logger_config);

    let data_dir = cli
        .data_dir
        .clone()
        .or_else(|| file_config.data_dir.clone())
        .unwrap_or(working_dir);

    let store = match FsStore::open(&data_dir) {
        Ok(store) => store,
        Err(e) => {
            fatal_if!(logger, &e, "Unable to open data directory {}", data_dir.display());
            return Err(e.into());
        }
    };

    run(&logger, &store, cli.command);
    Ok(())
}

fn run(logger: &Logger, store: &FsStore, command: Command) {
    tracing::debug!(?command, root = %store.root().display(), "running command");
    match command {
        Command::Stat { bucket, object: None } => match store.stat_bucket(&bucket) {
            Ok(()) => log_println!(logger, "{}/", bucket),
            Err(e) => error_if!(logger, &e, "Unable to stat bucket {}", bucket),
        },
        Command::Stat {
            bucket,
            object: Some(object),
        } => match store.stat_object(&bucket, &object) {
            Ok(info) => log_println!(logger, "{}/{}: {} bytes", info.bucket, info.name, info.size),
            Err(e) => error_if!(logger, &e, "Unable to stat object {}/{}", bucket, object),
        },
        Command::List { bucket } => match store.list_objects(&bucket) {
            Ok(objects) => {
                for info in objects {
                    log_println!(logger, "{:>10}  {}", info.size, info.name);
                }
            }
            Err(e) => error_if!(logger, &e, "Unable to list bucket {}", bucket),
        },
        Command::MakeBucket { bucket } => match store.make_bucket(&bucket) {
            Ok(()) => log_println!(logger, "Bucket created successfully `{}`.", bucket),
            Err(e) => error_if!(logger, &e, "Unable to create bucket {}", bucket),
        },
        Command::RemoveBucket { bucket } => match store.remove_bucket(&bucket) {
            Ok(()) => log_println!(logger, "Removed `{}` successfully.", bucket),
            Err(e) => error_if!(logger, &e, "Unable to remove bucket {}", bucket),
        },
    }
}
