//! Command-line wiring for the `classbook` binary.
//!
//! This module owns the clap definitions, sets up logging and storage, and
//! hands the resulting [`Logic`] to the shell.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use classbook::logging::{DEFAULT_LOG_LEVEL, init_logging};
use classbook::model::prefs::UserPrefs;
use classbook::storage::DEFAULT_PREFS_PATH;
use classbook::{JsonStorage, Logic, Storage};
use log::info;

pub mod render;
pub mod shell;

/// Parsed CLI entrypoint for the `classbook` binary.
#[derive(Parser, Debug)]
#[command(
    name = "classbook",
    version,
    about = "Keep track of students, tutorials, assignments and attendance"
)]
pub struct Cli {
    /// Address book JSON file (default: the path stored in the preferences).
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Preferences JSON file.
    #[arg(long, default_value = DEFAULT_PREFS_PATH)]
    pub prefs: PathBuf,

    /// Minimum level of log records to emit.
    #[arg(long = "log-level", value_enum, default_value_t = LogLevelArg::Warn)]
    pub log_level: LogLevelArg,

    /// Write logs to rotating files in this directory instead of stderr.
    #[arg(long = "log-dir")]
    pub log_dir: Option<PathBuf>,

    /// Run these commands in order and exit instead of starting the shell.
    #[arg(short = 'c', long = "command")]
    pub commands: Vec<String>,
}

/// Log levels accepted on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevelArg {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevelArg {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevelArg::Off => "off",
            LogLevelArg::Error => "error",
            LogLevelArg::Warn => DEFAULT_LOG_LEVEL,
            LogLevelArg::Info => "info",
            LogLevelArg::Debug => "debug",
            LogLevelArg::Trace => "trace",
        }
    }
}

/// Execute the binary.
pub fn run(cli: Cli) -> Result<()> {
    let _logger = init_logging(cli.log_level.as_str(), cli.log_dir.as_deref())?;

    let storage = open_storage(&cli)?;
    let mut logic = Logic::load(storage)
        .context("could not load saved data; fix or remove the file and try again")?;

    let outcome = if cli.commands.is_empty() {
        shell::interactive(&mut logic)
    } else {
        shell::batch(&mut logic, &cli.commands)
    };

    logic.save_prefs().context("failed to save preferences")?;
    info!("event=app_exit status={}", if outcome.is_ok() { "ok" } else { "error" });
    outcome
}

/// Resolve the data path: `--data` wins over the stored preference.
fn open_storage(cli: &Cli) -> Result<JsonStorage> {
    let prefs_only = JsonStorage::new(PathBuf::new(), &cli.prefs);
    let prefs = prefs_only.read_prefs()?.unwrap_or_default();
    let data = cli
        .data
        .clone()
        .unwrap_or_else(|| prefs.address_book_path.clone());
    let storage = JsonStorage::new(&data, &cli.prefs);

    if cli.data.is_some() && data != prefs.address_book_path {
        storage.save_prefs(&UserPrefs {
            address_book_path: data.clone(),
            ..prefs
        })?;
    }
    info!(
        "event=storage_opened data={} prefs={}",
        data.display(),
        cli.prefs.display()
    );
    Ok(storage)
}
