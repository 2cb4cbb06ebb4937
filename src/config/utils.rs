// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-icsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration utilities
//!
//! This module provides utility functions for working with configuration
//! settings, including validation and schema management.

use anyhow::{Context, Result};
use log::{debug, warn};

use super::{Config, CONFIG_SCHEMA};

/// Longest tick period accepted, in milliseconds.
pub const MAX_TICK_INTERVAL_MS: u64 = 60_000;

/// Output the embedded JSON schema to the console.
///
/// This function is called when the `--show-config-schema` flag is provided
/// on the command line.
///
/// # Example
///
/// ```bash
/// ./rust_icsim --show-config-schema > config_schema.json
/// ```
pub fn output_config_schema() -> Result<()> {
    let schema: serde_json::Value =
        serde_json::from_str(CONFIG_SCHEMA).context("Failed to parse JSON schema")?;

    let formatted_schema =
        serde_json::to_string_pretty(&schema).context("Failed to format JSON schema")?;

    println!("{}", formatted_schema);

    Ok(())
}

/// Check if a string is a valid IP address
///
/// Validates that a string represents a valid IPv4 or IPv6 address,
/// or is one of the special values like "localhost" or "0.0.0.0".
pub fn is_valid_ip_address(addr: &str) -> bool {
    if addr.parse::<std::net::IpAddr>().is_ok() {
        return true;
    }

    // Special cases
    matches!(addr, "localhost" | "::" | "::0" | "0.0.0.0")
}

/// Validates the configuration against additional rules that aren't covered by the JSON schema.
///
/// # Validation Rules
///
/// - **Port Range**: the Modbus port is within 1-65534
/// - **Tick Interval**: the process period is within 1-60000 ms
/// - **Setpoints**: the initial Lo setpoint does not exceed the Hi setpoint
/// - **IP Address Format**: an unusual bind address only produces a warning
pub fn validate_specific_rules(config: &Config) -> Result<()> {
    debug!("Performing additional validation checks");

    if config.modbus.port < 1 || config.modbus.port > 65534 {
        anyhow::bail!("Invalid Modbus port number: {}", config.modbus.port);
    }

    if !is_valid_ip_address(&config.modbus.address) {
        warn!(
            "Potentially invalid Modbus address format: {}",
            config.modbus.address
        );
    }

    let interval = config.simulation.tick_interval_ms;
    if interval == 0 || interval > MAX_TICK_INTERVAL_MS {
        anyhow::bail!(
            "Invalid tick interval: {} ms (expected 1-{} ms)",
            interval,
            MAX_TICK_INTERVAL_MS
        );
    }

    if config.simulation.heartbeat_interval_s == 0 {
        anyhow::bail!("Heartbeat interval must be at least one second");
    }

    if config.simulation.tank_lo_setpoint > config.simulation.tank_hi_setpoint {
        anyhow::bail!(
            "Tank Lo setpoint ({}) is above the Hi setpoint ({})",
            config.simulation.tank_lo_setpoint,
            config.simulation.tank_hi_setpoint
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_passes_rules() {
        assert!(validate_specific_rules(&Config::default()).is_ok());
    }

    #[test]
    fn rejects_inverted_setpoints() {
        let mut config = Config::default();
        config.simulation.tank_lo_setpoint = 50000;
        config.simulation.tank_hi_setpoint = 40000;
        assert!(validate_specific_rules(&config).is_err());
    }

    #[test]
    fn rejects_zero_tick_interval_and_port() {
        let mut config = Config::default();
        config.simulation.tick_interval_ms = 0;
        assert!(validate_specific_rules(&config).is_err());

        let mut config = Config::default();
        config.modbus.port = 0;
        assert!(validate_specific_rules(&config).is_err());
    }

    #[test]
    fn ip_addresses() {
        assert!(is_valid_ip_address("127.0.0.1"));
        assert!(is_valid_ip_address("::1"));
        assert!(is_valid_ip_address("localhost"));
        assert!(!is_valid_ip_address("not an address"));
    }
}
