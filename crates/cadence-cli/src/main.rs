//! cadence - manual harness for the cadence real-time sender
//!
//! Drives each building block on its own (`timer`, `tcp-send`), the full
//! real-time loop (`run`) and a throughput-printing client (`receive`).

mod commands;
mod config;
mod error;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use cadence_errors::{ErrorSeverity, SystemError};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::{ReceiveArgs, RunArgs, TcpSendArgs, TimerArgs};
use crate::config::CadenceConfig;
use crate::error::CliError;

#[derive(Parser)]
#[command(name = "cadence")]
#[command(about = "Fixed-rate packet streaming over TCP with real-time scheduling")]
#[command(version)]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (.json, .yaml or .yml)
    #[arg(short, long, global = true, env = "CADENCE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Tick a timer and print the measured interval of every tick
    Timer(TimerArgs),

    /// Stream two fixed messages to one client as fast as sends complete
    TcpSend(TcpSendArgs),

    /// Run the full real-time system with a generated payload
    Run(RunArgs),

    /// Connect to a sender and print the bytes received per second
    Receive(ReceiveArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match execute_command(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::print_error_human(&e);
            ExitCode::from(exit_code(&e))
        }
    }
}

fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_env| format!("cadence={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<CadenceConfig> {
    match path {
        Some(path) => CadenceConfig::load(path)
            .with_context(|| format!("failed to load configuration {}", path.display())),
        None => Ok(CadenceConfig::default()),
    }
}

fn execute_command(cli: &Cli) -> Result<()> {
    let config = load_config(cli.config.as_ref())?;
    match &cli.command {
        Commands::Timer(args) => commands::timer::execute(args, &config),
        Commands::TcpSend(args) => commands::tcp_send::execute(args, &config),
        Commands::Run(args) => commands::run::execute(args, &config),
        Commands::Receive(args) => commands::receive::execute(args, &config),
    }
}

/// 4 for configuration problems, 3 for lost real-time guarantees, 1 otherwise.
fn exit_code(error: &anyhow::Error) -> u8 {
    if let Some(cli_error) = error.downcast_ref::<CliError>() {
        return if cli_error.is_configuration() { 4 } else { 1 };
    }
    match error.downcast_ref::<SystemError>() {
        Some(system_error) if system_error.severity() == ErrorSeverity::Critical => 3,
        _ => 1,
    }
}
