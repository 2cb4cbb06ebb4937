// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-icsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! End to end tests: a launched daemon driven over Modbus TCP

use std::time::Duration;
use tokio::time;
use tokio_modbus::prelude::*;

use rust_icsim::config::Config;
use rust_icsim::daemon::Daemon;

fn test_config() -> Config {
    let mut config = Config::default();
    config.modbus.address = "127.0.0.1".to_string();
    config.modbus.port = 0;
    config.simulation.tick_interval_ms = 10;
    config.simulation.seed = Some(1);
    config.simulation.log_process_values = false;
    config
}

#[tokio::test]
async fn operator_starts_and_stops_the_pump() -> anyhow::Result<()> {
    let mut daemon = Daemon::new();
    daemon.launch(&test_config()).await?;
    let addr = daemon
        .modbus_addr()
        .ok_or_else(|| anyhow::anyhow!("Modbus server not started"))?;

    let mut ctx = tcp::connect(addr).await?;
    ctx.write_single_coil(100, true).await??;
    time::sleep(Duration::from_millis(100)).await;

    assert!(ctx.read_discrete_inputs(100, 1).await??[0]);
    assert!(!ctx.read_coils(100, 1).await??[0]);
    assert!(ctx.read_coils(120, 1).await??[0]);
    let load = ctx.read_input_registers(100, 1).await??[0];
    assert!((60..=100).contains(&load));
    assert!(ctx.read_input_registers(120, 1).await??[0] > 0);

    ctx.write_single_coil(110, true).await??;
    time::sleep(Duration::from_millis(100)).await;
    assert!(!ctx.read_discrete_inputs(100, 1).await??[0]);
    assert_eq!(ctx.read_input_registers(110, 1).await??, vec![0]);

    assert!(daemon.stats().ticks() > 0);
    assert_eq!(daemon.stats().trips(), 0);

    ctx.disconnect().await?;
    daemon.shutdown();
    time::timeout(Duration::from_secs(10), daemon.join()).await??;
    Ok(())
}

#[tokio::test]
async fn closing_the_valve_trips_the_motor() -> anyhow::Result<()> {
    let mut daemon = Daemon::new();
    daemon.launch(&test_config()).await?;
    let store = daemon.store();

    store.write_bool(rust_icsim::plant::BoolBank::Coil, 100, true)?;
    time::sleep(Duration::from_millis(100)).await;
    assert!(store.snapshot().motor_running);

    store.write_bool(rust_icsim::plant::BoolBank::Coil, 120, false)?;
    time::sleep(Duration::from_millis(100)).await;
    let image = store.snapshot();
    assert!(image.motor_tripped);
    assert!(!image.motor_running);
    assert_eq!(image.flow, 0);
    assert_eq!(daemon.stats().trips(), 1);

    daemon.shutdown();
    time::timeout(Duration::from_secs(10), daemon.join()).await??;
    Ok(())
}

#[tokio::test]
async fn disabled_modbus_still_runs_the_plant() -> anyhow::Result<()> {
    let mut config = test_config();
    config.modbus.enabled = false;
    config.simulation.tank_hi_setpoint = 5000;

    let mut daemon = Daemon::new();
    daemon.launch(&config).await?;
    assert!(daemon.modbus_addr().is_none());
    assert_eq!(daemon.store().snapshot().tank_hi_setpoint, 5000);

    time::sleep(Duration::from_millis(100)).await;
    assert!(daemon.stats().ticks() > 0);

    daemon.shutdown();
    time::timeout(Duration::from_secs(10), daemon.join()).await??;
    Ok(())
}

#[tokio::test]
async fn launch_fails_when_the_port_is_taken() -> anyhow::Result<()> {
    let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let mut config = test_config();
    config.modbus.port = taken.local_addr()?.port();

    let mut daemon = Daemon::new();
    let result = daemon.launch(&config).await;
    assert!(result.is_err());

    // Tasks started before the failure stop on their own
    time::timeout(Duration::from_secs(10), daemon.join()).await??;
    Ok(())
}

#[tokio::test]
async fn launch_rejects_a_zero_tick_interval() -> anyhow::Result<()> {
    let mut config = test_config();
    config.modbus.enabled = false;
    config.simulation.tick_interval_ms = 0;

    let mut daemon = Daemon::new();
    let err = daemon.launch(&config).await.unwrap_err();
    assert!(format!("{:#}", err).contains("tick period"));
    assert_eq!(daemon.stats().ticks(), 0);

    time::timeout(Duration::from_secs(10), daemon.join()).await??;
    Ok(())
}

#[tokio::test]
async fn launch_rejects_a_zero_heartbeat_interval() -> anyhow::Result<()> {
    let mut config = test_config();
    config.simulation.heartbeat_interval_s = 0;

    let mut daemon = Daemon::new();
    assert!(daemon.launch(&config).await.is_err());

    // The scheduler and the Modbus server started before the heartbeat stop
    time::timeout(Duration::from_secs(10), daemon.join()).await??;
    Ok(())
}
