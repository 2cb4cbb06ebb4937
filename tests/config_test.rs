// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-icsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use anyhow::Result;
use rust_icsim::config::{self, Config, ModbusConfig, SimulationConfig};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_config_load_and_save() -> Result<()> {
    // Create a temporary directory
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");

    // Create a custom config
    let config = Config {
        modbus: ModbusConfig {
            enabled: false,
            port: 5020,
            address: "0.0.0.0".to_string(),
            unit_id: 3,
        },
        simulation: SimulationConfig {
            tick_interval_ms: 250,
            seed: Some(42),
            tank_hi_setpoint: 50000,
            ..SimulationConfig::default()
        },
        ..Config::default()
    };

    // Save config to file
    config.save_to_file(&config_path)?;

    // Load config from file
    let loaded_config = Config::from_file(&config_path)?;

    // Verify loaded config matches the saved one
    assert!(!loaded_config.modbus.enabled);
    assert_eq!(loaded_config.modbus.port, 5020);
    assert_eq!(loaded_config.modbus.address, "0.0.0.0");
    assert_eq!(loaded_config.modbus.unit_id, 3);
    assert_eq!(loaded_config.simulation.tick_interval_ms, 250);
    assert_eq!(loaded_config.simulation.seed, Some(42));
    assert_eq!(loaded_config.simulation.tank_hi_setpoint, 50000);
    assert_eq!(loaded_config.simulation.tank_lo_setpoint, 10000);

    // Test loading default config for non-existent file
    let non_existent_path = temp_dir.path().join("non_existent.yaml");
    let default_config = Config::from_file(&non_existent_path)?;

    // Verify default config was created
    assert!(non_existent_path.exists());
    assert!(default_config.modbus.enabled);
    assert_eq!(default_config.modbus.port, 502);
    assert_eq!(default_config.modbus.address, "127.0.0.1");
    assert_eq!(default_config.simulation.tick_interval_ms, 100);
    assert_eq!(default_config.simulation.seed, None);

    Ok(())
}

#[test]
fn test_partial_and_empty_files_use_defaults() -> Result<()> {
    let temp_dir = tempdir()?;

    let partial_path = temp_dir.path().join("partial.yaml");
    fs::write(
        &partial_path,
        "simulation:\n  seed: 7\n  tank_lo_setpoint: 2000\n",
    )?;
    let partial = Config::from_file(&partial_path)?;
    assert_eq!(partial.simulation.seed, Some(7));
    assert_eq!(partial.simulation.tank_lo_setpoint, 2000);
    assert_eq!(partial.simulation.tank_hi_setpoint, 60000);
    assert_eq!(partial.modbus.port, 502);
    assert_eq!(partial.identity.vendor_name, "akiUP");

    let empty_path = temp_dir.path().join("empty.yaml");
    fs::write(&empty_path, "")?;
    let empty = Config::from_file(&empty_path)?;
    assert_eq!(empty.simulation.tick_interval_ms, 100);

    Ok(())
}

#[test]
fn test_apply_args() {
    let mut config = Config::default();

    // Nothing given, nothing changes
    config.apply_args(None, None, None, None, None);
    assert!(config.modbus.enabled);
    assert_eq!(config.modbus.port, 502);
    assert_eq!(config.simulation.seed, None);

    config.apply_args(
        Some(false),
        Some("192.168.0.1".to_string()),
        Some(1502),
        Some(20),
        Some(99),
    );

    assert!(!config.modbus.enabled);
    assert_eq!(config.modbus.address, "192.168.0.1");
    assert_eq!(config.modbus.port, 1502);
    assert_eq!(config.simulation.tick_interval_ms, 20);
    assert_eq!(config.simulation.seed, Some(99));
}

#[test]
fn test_initial_image_uses_setpoints() {
    let simulation = SimulationConfig {
        tank_hi_setpoint: 30000,
        tank_lo_setpoint: 500,
        ..SimulationConfig::default()
    };
    let image = simulation.initial_image();
    assert_eq!(image.tank_hi_setpoint, 30000);
    assert_eq!(image.tank_lo_setpoint, 500);
    assert_eq!(image.tank_level, 0);
    assert!(!image.motor_running);
}

#[test]
fn test_config_schema_output() -> Result<()> {
    // The schema goes to stdout, only check that it is well formed
    config::output_config_schema()?;
    Ok(())
}
