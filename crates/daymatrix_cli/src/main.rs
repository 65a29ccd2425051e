//! `daymatrix` command-line entry point.
//!
//! # Responsibility
//! - Resolve configuration from flags, environment and defaults.
//! - Bootstrap logging and the layered storage gateway.
//! - Dispatch one subcommand against the store and print its report.

mod commands;

use clap::Parser;
use commands::{execute, Cli, RunContext};
use daymatrix_core::{init_logging, DayMatrixConfig, MatrixStore};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = resolve_config(&cli);

    // Logging is best-effort; the command still runs without it.
    if let Err(err) = init_logging(&config.log_level, &config.log_dir()) {
        eprintln!("warning: logging disabled: {err}");
    }

    let gateway = match config.build_gateway() {
        Ok(gateway) => gateway,
        Err(err) => {
            error!("event=cli_start module=cli status=error error={err}");
            eprintln!("error: cannot open storage in `{}`: {err}", config.data_dir.display());
            return ExitCode::FAILURE;
        }
    };

    let mut store = MatrixStore::open(gateway);
    let context = RunContext {
        date: cli.date.unwrap_or_else(|| store.today()),
        lookback_days: config.lookback_days,
    };
    info!(
        "event=cli_command module=cli status=start date={}",
        context.date
    );

    match execute(&mut store, context, cli.command) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn resolve_config(cli: &Cli) -> DayMatrixConfig {
    let mut config = DayMatrixConfig::from_env();
    if let Some(dir) = &cli.data_dir {
        config.data_dir = absolutize(dir);
    }
    if let Some(file) = &cli.json_file {
        config.json_file = Some(absolutize(file));
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    config.data_dir = absolutize(&config.data_dir);
    config
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
