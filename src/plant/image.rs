// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-icsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Process image
//!
//! A [`ProcessImage`] holds the value of every point of the plant at one
//! instant. The point store keeps exactly one live image behind its lock and
//! hands out copies of it as snapshots.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::points::{BoolPoint, WordPoint};

/// Default Hi setpoint of the tank (motor stops in auto mode).
pub const DEFAULT_TANK_HI_SETPOINT: u16 = 60000;

/// Default Lo setpoint of the tank (motor starts in auto mode).
pub const DEFAULT_TANK_LO_SETPOINT: u16 = 10000;

/// Values of all points of the plant.
///
/// Field names follow the point catalogue in [`super::points`]. The image is a
/// plain value: copying it is how a consistent view of the plant is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessImage {
    // Coils
    pub start_request: bool,
    pub stop_request: bool,
    pub valve_open: bool,
    pub auto_mode: bool,

    // Discrete inputs
    pub motor_running: bool,
    pub motor_tripped: bool,

    // Input registers
    pub motor_load: u16,
    pub flow: u16,
    pub tank_level: u16,
    pub tank_drain: u16,

    // Holding registers
    pub tank_hi_setpoint: u16,
    pub tank_lo_setpoint: u16,
}

impl Default for ProcessImage {
    fn default() -> Self {
        Self::with_setpoints(DEFAULT_TANK_HI_SETPOINT, DEFAULT_TANK_LO_SETPOINT)
    }
}

impl ProcessImage {
    /// Initial image of the plant: everything off and empty, setpoints as given.
    pub fn with_setpoints(tank_hi_setpoint: u16, tank_lo_setpoint: u16) -> Self {
        Self {
            start_request: false,
            stop_request: false,
            valve_open: false,
            auto_mode: false,
            motor_running: false,
            motor_tripped: false,
            motor_load: 0,
            flow: 0,
            tank_level: 0,
            tank_drain: 0,
            tank_hi_setpoint,
            tank_lo_setpoint,
        }
    }

    pub fn bool_value(&self, point: BoolPoint) -> bool {
        match point {
            BoolPoint::StartRequest => self.start_request,
            BoolPoint::StopRequest => self.stop_request,
            BoolPoint::ValveOpen => self.valve_open,
            BoolPoint::AutoMode => self.auto_mode,
            BoolPoint::MotorRunning => self.motor_running,
            BoolPoint::MotorTripped => self.motor_tripped,
        }
    }

    pub fn set_bool(&mut self, point: BoolPoint, value: bool) {
        let slot = match point {
            BoolPoint::StartRequest => &mut self.start_request,
            BoolPoint::StopRequest => &mut self.stop_request,
            BoolPoint::ValveOpen => &mut self.valve_open,
            BoolPoint::AutoMode => &mut self.auto_mode,
            BoolPoint::MotorRunning => &mut self.motor_running,
            BoolPoint::MotorTripped => &mut self.motor_tripped,
        };
        *slot = value;
    }

    pub fn word_value(&self, point: WordPoint) -> u16 {
        match point {
            WordPoint::MotorLoad => self.motor_load,
            WordPoint::Flow => self.flow,
            WordPoint::TankLevel => self.tank_level,
            WordPoint::TankDrain => self.tank_drain,
            WordPoint::TankHiSetpoint => self.tank_hi_setpoint,
            WordPoint::TankLoSetpoint => self.tank_lo_setpoint,
        }
    }

    pub fn set_word(&mut self, point: WordPoint, value: u16) {
        let slot = match point {
            WordPoint::MotorLoad => &mut self.motor_load,
            WordPoint::Flow => &mut self.flow,
            WordPoint::TankLevel => &mut self.tank_level,
            WordPoint::TankDrain => &mut self.tank_drain,
            WordPoint::TankHiSetpoint => &mut self.tank_hi_setpoint,
            WordPoint::TankLoSetpoint => &mut self.tank_lo_setpoint,
        };
        *slot = value;
    }

    /// Stop the motor and zero the derived values, closing the valve.
    pub(crate) fn halt_motor(&mut self) {
        self.motor_running = false;
        self.flow = 0;
        self.motor_load = 0;
        self.valve_open = false;
    }
}

impl fmt::Display for ProcessImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Motor running: {} | Tripped: {} | Auto mode: {} | Valve open: {} | Motor load: {} | Flow: {} | Tank level: {} | Tank drain: {} | Start signal: {} | Stop signal: {}",
            self.motor_running,
            self.motor_tripped,
            self.auto_mode,
            self.valve_open,
            self.motor_load,
            self.flow,
            self.tank_level,
            self.tank_drain,
            self.start_request,
            self.stop_request
        )
    }
}
