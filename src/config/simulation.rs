// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-icsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Process simulation configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::plant::image::{DEFAULT_TANK_HI_SETPOINT, DEFAULT_TANK_LO_SETPOINT};
use crate::plant::ProcessImage;

/// Settings of the simulated plant and of its scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Period between two process steps in milliseconds (1-60000).
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Seed of the random source. When absent the source is seeded from the
    /// operating system and every run differs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Initial value of the Hi setpoint holding register.
    #[serde(default = "default_tank_hi_setpoint")]
    pub tank_hi_setpoint: u16,

    /// Initial value of the Lo setpoint holding register.
    #[serde(default = "default_tank_lo_setpoint")]
    pub tank_lo_setpoint: u16,

    /// Log the process values of every tick at info level (debug otherwise).
    #[serde(default = "default_log_process_values")]
    pub log_process_values: bool,

    /// Period of the daemon heartbeat log line in seconds.
    #[serde(default = "default_heartbeat_interval_s")]
    pub heartbeat_interval_s: u64,
}

fn default_tick_interval_ms() -> u64 {
    100
}

fn default_tank_hi_setpoint() -> u16 {
    DEFAULT_TANK_HI_SETPOINT
}

fn default_tank_lo_setpoint() -> u16 {
    DEFAULT_TANK_LO_SETPOINT
}

fn default_log_process_values() -> bool {
    true
}

fn default_heartbeat_interval_s() -> u64 {
    60
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            seed: None,
            tank_hi_setpoint: default_tank_hi_setpoint(),
            tank_lo_setpoint: default_tank_lo_setpoint(),
            log_process_values: default_log_process_values(),
            heartbeat_interval_s: default_heartbeat_interval_s(),
        }
    }
}

impl SimulationConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_s)
    }

    /// Image the point store starts from.
    pub fn initial_image(&self) -> ProcessImage {
        ProcessImage::with_setpoints(self.tank_hi_setpoint, self.tank_lo_setpoint)
    }
}
