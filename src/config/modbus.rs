// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-icsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Modbus TCP server configuration
//!
//! This module defines the structures for configuring the Modbus TCP server
//! exposing the simulated plant.

use serde::{Deserialize, Serialize};

/// Configuration for the Modbus TCP server component.
///
/// # Fields
///
/// * `enabled` - Flag to enable or disable the Modbus server
/// * `port` - TCP port number for the Modbus server (default: 502)
/// * `address` - Network address for the Modbus server to bind to (default: 127.0.0.1)
/// * `unit_id` - Unit identifier reported by Report Server ID (default: 0)
///
/// # Example
///
/// ```
/// use rust_icsim::config::ModbusConfig;
///
/// let modbus_config = ModbusConfig {
///     enabled: true,
///     port: 5020,
///     address: "0.0.0.0".to_string(),
///     unit_id: 1,
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModbusConfig {
    /// Flag to enable or disable the Modbus server.
    ///
    /// When disabled the plant still runs, but nothing outside the process
    /// can observe or drive it.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// The TCP port the Modbus server will listen on.
    ///
    /// Valid range is 1-65534. Default value is 502, which is the standard Modbus TCP port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// The network address the Modbus server will bind to.
    ///
    /// Use "0.0.0.0" to bind to all IPv4 interfaces.
    #[serde(default = "default_address")]
    pub address: String,

    /// Unit identifier of the simulated device.
    #[serde(default)]
    pub unit_id: u8,
}

fn default_enabled() -> bool {
    true
}

fn default_port() -> u16 {
    502
}

fn default_address() -> String {
    "127.0.0.1".to_string()
}

impl Default for ModbusConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            port: default_port(),       // Standard Modbus TCP port
            address: default_address(), // Localhost for security
            unit_id: 0,
        }
    }
}
