// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-icsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration management for the process simulator
//!
//! This module provides functionality for loading, validating, and applying
//! configuration settings. The configuration is backed by a YAML file and
//! validated against a JSON schema before being deserialized.
//!
//! ## Configuration Structure
//!
//! - `modbus`: Settings for the Modbus TCP server
//! - `simulation`: Tick period, random seed, initial setpoints and logging
//! - `identity`: Device identification reported to Modbus clients
//!
//! ## Usage
//!
//! ```no_run
//! use rust_icsim::config::Config;
//! use std::path::Path;
//!
//! // Load config from file, creates a default if not found
//! let mut config = Config::from_file(Path::new("config.yaml")).unwrap();
//!
//! // Apply command line overrides if needed
//! config.apply_args(
//!     Some(true),                  // Enable Modbus
//!     Some("0.0.0.0".to_string()), // Modbus address
//!     Some(5020),                  // Modbus port
//!     Some(250),                   // Tick interval (ms)
//!     Some(42),                    // Random seed
//! );
//!
//! println!("Modbus port: {}", config.modbus.port);
//! ```

pub mod identity;
pub mod modbus;
pub mod simulation;
pub mod utils;

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, error};
use serde::{Deserialize, Serialize};

pub use identity::IdentityConfig;
pub use modbus::ModbusConfig;
pub use simulation::SimulationConfig;
pub use utils::{is_valid_ip_address, output_config_schema, validate_specific_rules};

/// JSON schema the YAML configuration is validated against.
pub const CONFIG_SCHEMA: &str = include_str!("../../resources/config.schema.json");

/// Root configuration structure of the simulator.
///
/// Each section falls back to its default values when absent from the file,
/// so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Modbus TCP server settings.
    #[serde(default)]
    pub modbus: ModbusConfig,

    /// Plant and scheduler settings.
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Device identification strings.
    #[serde(default)]
    pub identity: IdentityConfig,
}

impl Config {
    /// Helper method to create a sample config file when validation fails
    fn create_sample_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        let sample_path = path.with_extension("sample.yaml");
        debug!("Creating sample configuration file at {:?}", sample_path);

        if let Some(parent) = sample_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                debug!("Creating parent directory: {:?}", parent);
                fs::create_dir_all(parent).with_context(|| {
                    format!(
                        "Failed to create parent directory for sample config at {:?}",
                        parent
                    )
                })?;
            }
        }

        Self::default()
            .save_to_file(&sample_path)
            .with_context(|| format!("Failed to save sample config to {:?}", sample_path))?;

        error!(
            "Sample configuration file created at {:?}\nPlease edit and rename it",
            sample_path
        );
        Ok(())
    }

    /// Load configuration from a file
    ///
    /// A missing file is created with default values. A file that fails schema
    /// validation, deserialization or the additional rules produces an error and
    /// a `*.sample.yaml` file with default values next to it.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(
                "Configuration file not found at {:?}, creating default",
                path
            );
            let default_config = Self::default();
            default_config.save_to_file(path)?;
            return Ok(default_config);
        }

        debug!("Loading configuration from {:?}", path);
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file at {:?}", path))?;

        if contents.trim().is_empty() {
            debug!("Configuration file {:?} is empty, using defaults", path);
            return Ok(Self::default());
        }

        Self::validate_against_schema(&contents, path)?;

        debug!("Schema validation passed, deserializing into Config structure");
        let config: Config = match serde_yml::from_str(&contents) {
            Ok(config) => config,
            Err(err) => {
                error!("Configuration deserialization error: {}", err);
                if let Err(e) = Self::create_sample_config(path) {
                    error!("Failed to create sample config: {}", e);
                }
                return Err(anyhow::anyhow!(
                    "Failed to deserialize configuration from {}: {}",
                    path.display(),
                    err
                ));
            }
        };

        if let Err(err) = validate_specific_rules(&config) {
            error!("Configuration specific validation error: {}", err);
            Self::create_sample_config(path)?;
            return Err(err);
        }

        Ok(config)
    }

    fn validate_against_schema(contents: &str, path: &Path) -> Result<()> {
        let yaml_value: serde_yml::Value = serde_yml::from_str(contents)
            .with_context(|| format!("Failed to parse YAML configuration from {:?}", path))?;
        let json_value = serde_json::to_value(&yaml_value).with_context(|| {
            format!("Failed to convert YAML to JSON for validation: {:?}", path)
        })?;

        let schema: serde_json::Value =
            serde_json::from_str(CONFIG_SCHEMA).context("Failed to parse JSON schema")?;
        let validator = jsonschema::draft202012::options()
            .should_validate_formats(true)
            .build(&schema)?;

        debug!("Validating {} configuration against schema", path.display());
        if let Err(error) = validator.validate(&json_value) {
            error!("Configuration validation error before deserialization");
            Self::create_sample_config(path)?;
            anyhow::bail!("Configuration validation failed: {}", error);
        }
        Ok(())
    }

    /// Save the configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml =
            serde_yml::to_string(self).context("Failed to serialize configuration to YAML")?;

        let mut file = File::create(path.as_ref())
            .with_context(|| format!("Failed to create config file at {:?}", path.as_ref()))?;

        file.write_all(yaml.as_bytes())
            .with_context(|| format!("Failed to write configuration to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Apply command line arguments to override configuration values.
    ///
    /// Only values explicitly provided override the existing configuration.
    ///
    /// # Parameters
    ///
    /// * `modbus_enabled` - Optional flag to enable/disable the Modbus server
    /// * `modbus_address` - Optional network address for the Modbus server
    /// * `modbus_port` - Optional TCP port for the Modbus server
    /// * `tick_interval_ms` - Optional period of the process step in milliseconds
    /// * `seed` - Optional seed of the process random source
    pub fn apply_args(
        &mut self,
        modbus_enabled: Option<bool>,
        modbus_address: Option<String>,
        modbus_port: Option<u16>,
        tick_interval_ms: Option<u64>,
        seed: Option<u64>,
    ) {
        if let Some(enabled) = modbus_enabled {
            debug!("Overriding Modbus enabled from command line: {}", enabled);
            self.modbus.enabled = enabled;
        }
        if let Some(address) = modbus_address {
            debug!("Overriding Modbus address from command line: {}", address);
            self.modbus.address = address;
        }
        if let Some(port) = modbus_port {
            debug!("Overriding Modbus port from command line: {}", port);
            self.modbus.port = port;
        }
        if let Some(interval) = tick_interval_ms {
            debug!("Overriding tick interval from command line: {} ms", interval);
            self.simulation.tick_interval_ms = interval;
        }
        if let Some(seed) = seed {
            debug!("Overriding random seed from command line: {}", seed);
            self.simulation.seed = Some(seed);
        }
    }
}
