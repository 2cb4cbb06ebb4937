// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-icsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use anyhow::Result;
use rust_icsim::config::Config;
use std::fs;
use std::path::Path;
use std::sync::Once;
use tempfile::tempdir;

static INIT: Once = Once::new();

// Setup logger for tests
fn setup() {
    INIT.call_once(|| {
        env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .is_test(true)
            .init();
    });
}

fn assert_fails_with_sample(contents: &str) -> Result<()> {
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents)?;

    // Try to load the config, which should fail but create a sample file
    let result = Config::from_file(&config_path);
    assert!(result.is_err(), "Config loading should have failed");

    let sample_path = config_path.with_extension("sample.yaml");
    assert!(
        Path::new(&sample_path).exists(),
        "Sample config file was not created"
    );

    // Load and verify the sample file is valid
    let sample_config = Config::from_file(&sample_path)?;
    assert_eq!(sample_config.modbus.port, 502);
    assert_eq!(sample_config.simulation.tank_hi_setpoint, 60000);

    Ok(())
}

#[test]
fn test_config_type_mismatch_creates_sample_file() -> Result<()> {
    setup();

    assert_fails_with_sample(
        r#"
modbus:
  port: "not-an-integer"  # Integer field with string value
  address: 12345          # String field with number value
  enabled: "true"         # Boolean field with string value
"#,
    )
}

#[test]
fn test_config_out_of_range_creates_sample_file() -> Result<()> {
    setup();

    assert_fails_with_sample(
        r#"
modbus:
  port: 99999  # Port out of range (valid range is 1-65534)
  address: "127.0.0.1"
"#,
    )
}

#[test]
fn test_unknown_section_creates_sample_file() -> Result<()> {
    setup();

    assert_fails_with_sample(
        r#"
visualization:
  port: 8080
"#,
    )
}

#[test]
fn test_inverted_setpoints_create_sample_file() -> Result<()> {
    setup();

    // Valid for the schema, rejected by the additional rules
    assert_fails_with_sample(
        r#"
simulation:
  tank_hi_setpoint: 1000
  tank_lo_setpoint: 2000
"#,
    )
}

#[test]
fn test_zero_tick_interval_is_rejected() -> Result<()> {
    setup();

    assert_fails_with_sample(
        r#"
simulation:
  tick_interval_ms: 0
"#,
    )
}
