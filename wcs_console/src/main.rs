//! # WCS Console Binary
//!
//! Interactive operator console for a 3-axis stage with work coordinate
//! offsets.
//!
//! # Usage
//!
//! ```bash
//! # Built-in defaults (simulation backend, /axisX /axisY /axisZ)
//! wcs_console
//!
//! # Explicit configuration file
//! wcs_console --config config/console.toml
//!
//! # Debug logging as JSON on stderr
//! wcs_console -c config/console.toml -v --json 2> console.log
//! ```

#![deny(warnings)]

use clap::Parser;
use std::io;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use wcs_common::config::{ConfigError, ConsoleConfig, LogLevel, load_config};
use wcs_console::input::{CancelFlag, StdinSource};
use wcs_console::{CommandInterpreter, Session};
use wcs_hal::BackendRegistry;

/// WCS Console - jog a 3-axis stage in work coordinates
#[derive(Parser, Debug)]
#[command(name = "wcs_console")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Operator console with per-axis work coordinate offsets")]
#[command(long_about = None)]
struct Args {
    /// Path to console configuration file (console.toml).
    /// Built-in defaults are used when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Motion backend to use, overriding `[backend] driver`
    #[arg(short, long)]
    driver: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    let config = load(&args);

    let level = config
        .as_ref()
        .map(|config| config.shared.log_level)
        .unwrap_or_default();
    setup_tracing(&args, level);

    let result = config
        .map_err(Box::<dyn std::error::Error>::from)
        .and_then(run);
    if let Err(e) = result {
        error!("Console failed: {}", e);
        std::process::exit(1);
    }
}

fn load(args: &Args) -> Result<ConsoleConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ConsoleConfig::default(),
    };
    if let Some(driver) = &args.driver {
        config.backend.driver = driver.clone();
        config.validate()?;
    }
    Ok(config)
}

fn run(config: ConsoleConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        "WCS Console v{} starting ({}, backend {})",
        env!("CARGO_PKG_VERSION"),
        config.shared.service_name,
        config.backend.driver
    );

    // Installed before the backend starts so an early Ctrl+C still reaches
    // the loop, which then stops the session.
    let cancel = CancelFlag::new();
    let handler_flag = cancel.clone();
    ctrlc::set_handler(move || {
        info!("Received interrupt");
        handler_flag.cancel();
    })?;

    let registry = BackendRegistry::with_builtin();
    let backend = wcs_hal::connect(&registry, &config)?;
    let session = Session::open(backend, &config.axes)?;

    let mut input = StdinSource::spawn(cancel.clone())?;
    let stdout = io::stdout();
    let interpreter = CommandInterpreter::new(session, config.console.clone(), stdout.lock(), cancel);
    let reason = interpreter.run(&mut input)?;

    info!("WCS Console shutdown complete ({:?})", reason);
    Ok(())
}

/// Setup tracing on stderr so logs never interleave with the operator prompt.
fn setup_tracing(args: &Args, level: LogLevel) {
    let directive = if args.verbose {
        LogLevel::Debug.as_directive()
    } else {
        level.as_directive()
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
}
