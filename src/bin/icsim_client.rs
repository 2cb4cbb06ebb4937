// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-icsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use anyhow::{Context, Result};
use clap::Parser;
use log::warn;
use std::net::SocketAddr;
use tokio_modbus::prelude::*;

use rust_icsim::plant::{BoolBank, BoolPoint, WordBank, WordPoint};

/// Operator client for the process simulator
///
/// Applies the requested writes, then prints every point of the plant.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Modbus server address
    #[clap(long, default_value = "127.0.0.1")]
    address: String,

    /// Modbus server port
    #[clap(long, default_value = "502")]
    port: u16,

    /// Unit identifier put in every request
    #[clap(long, default_value = "1")]
    unit_id: u8,

    /// Request a motor start
    #[clap(long)]
    start: bool,

    /// Request a motor stop
    #[clap(long)]
    stop: bool,

    /// Switch automatic mode on or off
    #[clap(long)]
    auto: Option<bool>,

    /// Open or close the discharge valve
    #[clap(long)]
    valve: Option<bool>,

    /// New Hi setpoint
    #[clap(long)]
    hi: Option<u16>,

    /// New Lo setpoint
    #[clap(long)]
    lo: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"),
    );

    let args = Args::parse();

    let socket_addr: SocketAddr = format!("{}:{}", args.address, args.port)
        .parse()
        .with_context(|| format!("Invalid server address {}:{}", args.address, args.port))?;
    println!("Connecting to Modbus server at {}", socket_addr);

    let mut ctx = tcp::connect_slave(socket_addr, Slave(args.unit_id))
        .await
        .with_context(|| format!("Failed to connect to {}", socket_addr))?;

    let coil_writes = [
        (BoolPoint::StartRequest, args.start.then_some(true)),
        (BoolPoint::StopRequest, args.stop.then_some(true)),
        (BoolPoint::AutoMode, args.auto),
        (BoolPoint::ValveOpen, args.valve),
    ];
    for (point, value) in coil_writes {
        if let Some(value) = value {
            println!("Writing {} to coil {}", value, point.address());
            ctx.write_single_coil(point.address(), value).await??;
        }
    }

    let register_writes = [
        (WordPoint::TankHiSetpoint, args.hi),
        (WordPoint::TankLoSetpoint, args.lo),
    ];
    for (point, value) in register_writes {
        if let Some(value) = value {
            println!("Writing {} to holding register {}", value, point.address());
            ctx.write_single_register(point.address(), value).await??;
        }
    }

    println!("Process values");
    for point in BoolPoint::ALL {
        let values = match point.bank() {
            BoolBank::Coil => ctx.read_coils(point.address(), 1).await??,
            BoolBank::DiscreteInput => ctx.read_discrete_inputs(point.address(), 1).await??,
        };
        let value = values.first().copied().unwrap_or_default();
        println!(
            "  {:<5} {:>5}  {}",
            value,
            point.address(),
            point.description()
        );
    }
    for point in WordPoint::ALL {
        let values = match point.bank() {
            WordBank::InputRegister => ctx.read_input_registers(point.address(), 1).await??,
            WordBank::HoldingRegister => ctx.read_holding_registers(point.address(), 1).await??,
        };
        let value = values.first().copied().unwrap_or_default();
        println!(
            "  {:<5} {:>5}  {}",
            value,
            point.address(),
            point.description()
        );
    }

    // Identification is informative only, a server without it is still usable
    match ctx.call(Request::ReportServerId).await {
        Ok(Ok(Response::ReportServerId(unit_id, running, identity))) => println!(
            "Server {} ({}): {}",
            unit_id,
            if running { "running" } else { "stopped" },
            String::from_utf8_lossy(&identity)
        ),
        Ok(Ok(response)) => warn!("Unexpected Report Server ID response: {:?}", response),
        Ok(Err(exception)) => warn!("Report Server ID not supported: {}", exception),
        Err(e) => {
            warn!("Report Server ID failed: {}", e);
            return Ok(());
        }
    }

    ctx.disconnect().await?;
    Ok(())
}
