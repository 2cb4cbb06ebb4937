// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-icsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

// Main entry point for the process simulator
use anyhow::Result;
use clap::Parser;
use log::info;
use std::path::PathBuf;
use tokio::signal;

use rust_icsim::config::{self, Config};
use rust_icsim::daemon::Daemon;
use rust_icsim::plant::points::describe_points;

/// Pump, valve and tank process simulator exposed over Modbus TCP
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file (YAML format)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to a configuration to validate and exit
    #[arg(long)]
    validate_config: Option<PathBuf>,

    /// Output the configuration schema as JSON and exit
    #[arg(long)]
    show_config_schema: bool,

    /// Print the point map and exit
    #[arg(long)]
    list_points: bool,

    /// Modbus enabled
    #[arg(long)]
    modbus_enabled: Option<bool>,

    /// Modbus server address
    #[arg(long)]
    modbus_address: Option<String>,

    /// Modbus server port
    #[arg(long)]
    modbus_port: Option<u16>,

    /// Period of the process step in milliseconds
    #[arg(long)]
    tick_interval_ms: Option<u64>,

    /// Seed of the process random source, for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Enable verbose logging (debug level)
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Disable all logging output
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logger with appropriate level based on verbose and quiet flags
    let log_level = if args.quiet {
        log::LevelFilter::Off
    } else if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if args.show_config_schema {
        return config::output_config_schema();
    }

    if args.list_points {
        for line in describe_points() {
            println!("{}", line);
        }
        return Ok(());
    }

    // Validate configuration file if --validate-config is set
    if let Some(validate_path) = args.validate_config {
        if !validate_path.exists() {
            return Err(anyhow::anyhow!(
                "Configuration file does not exist: {}",
                validate_path.display()
            ));
        }

        Config::from_file(&validate_path)
            .map_err(|err| anyhow::anyhow!("Configuration validation failed: {}", err))?;
        println!("Configuration file is valid: {}", validate_path.display());
        return Ok(());
    }

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from("config.yaml"));
    let mut config = Config::from_file(&config_path)?;

    // Apply command line overrides
    config.apply_args(
        args.modbus_enabled,
        args.modbus_address.clone(),
        args.modbus_port,
        args.tick_interval_ms,
        args.seed,
    );
    config::validate_specific_rules(&config)?;

    info!("Starting in daemon mode");
    let mut daemon = Daemon::new();
    daemon.launch(&config).await?;

    // Wait for termination signal
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Received shutdown signal, terminating daemon");
        }
        Err(err) => {
            eprintln!("Error waiting for shutdown signal: {}", err);
        }
    }
    daemon.shutdown();
    daemon.join().await?;

    Ok(())
}
