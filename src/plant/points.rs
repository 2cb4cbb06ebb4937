// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-icsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Point catalogue of the simulated plant
//!
//! Every value exposed by the simulator lives at a fixed address in one of four
//! banks. The banks follow the Modbus data model so that protocol addresses map
//! one to one onto point addresses (zero-based addressing, address 100 is
//! point 100).
//!
//! | Bank | Access | Type | Address | Point |
//! |------|--------|------|---------|-------|
//! | Coil | read/write | bool | 100 | Start request |
//! | Coil | read/write | bool | 110 | Stop request |
//! | Coil | read/write | bool | 120 | Valve open |
//! | Coil | read/write | bool | 130 | Auto mode |
//! | Discrete input | read-only | bool | 100 | Motor running |
//! | Discrete input | read-only | bool | 110 | Motor tripped |
//! | Input register | read-only | u16 | 100 | Motor load (0-100 %) |
//! | Input register | read-only | u16 | 110 | Flow (0-10) |
//! | Input register | read-only | u16 | 120 | Tank level (0-65535) |
//! | Input register | read-only | u16 | 130 | Tank drain |
//! | Holding register | read/write | u16 | 100 | Tank Hi setpoint |
//! | Holding register | read/write | u16 | 110 | Tank Lo setpoint |

use std::fmt;

use serde::{Deserialize, Serialize};

/// Tank level above which the motor trips on overflow (HiHi alarm).
pub const TANK_OVERFLOW_LEVEL: u16 = 65500;

/// Tank level at or below which the tank is considered empty and not drained.
pub const TANK_EMPTY_LEVEL: u16 = 6;

/// Upper bound of the motor load in percent.
pub const MAX_MOTOR_LOAD: u16 = 100;

/// Upper bound of the flow meter reading.
pub const MAX_FLOW: u16 = 10;

/// Upper bound of a drain sample.
pub const MAX_TANK_DRAIN: u16 = 6;

/// One of the four banks of points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bank {
    Coil,
    DiscreteInput,
    InputRegister,
    HoldingRegister,
}

impl Bank {
    /// Whether an external party may write points of this bank.
    pub fn is_writable(self) -> bool {
        matches!(self, Bank::Coil | Bank::HoldingRegister)
    }
}

impl fmt::Display for Bank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Bank::Coil => "coil",
            Bank::DiscreteInput => "discrete input",
            Bank::InputRegister => "input register",
            Bank::HoldingRegister => "holding register",
        };
        f.pad(name)
    }
}

/// Banks holding boolean points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoolBank {
    Coil,
    DiscreteInput,
}

/// Banks holding 16-bit unsigned points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordBank {
    InputRegister,
    HoldingRegister,
}

impl From<BoolBank> for Bank {
    fn from(bank: BoolBank) -> Self {
        match bank {
            BoolBank::Coil => Bank::Coil,
            BoolBank::DiscreteInput => Bank::DiscreteInput,
        }
    }
}

impl From<WordBank> for Bank {
    fn from(bank: WordBank) -> Self {
        match bank {
            WordBank::InputRegister => Bank::InputRegister,
            WordBank::HoldingRegister => Bank::HoldingRegister,
        }
    }
}

/// A boolean point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoolPoint {
    StartRequest,
    StopRequest,
    ValveOpen,
    AutoMode,
    MotorRunning,
    MotorTripped,
}

/// A 16-bit unsigned point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordPoint {
    MotorLoad,
    Flow,
    TankLevel,
    TankDrain,
    TankHiSetpoint,
    TankLoSetpoint,
}

impl BoolPoint {
    pub const ALL: [BoolPoint; 6] = [
        BoolPoint::StartRequest,
        BoolPoint::StopRequest,
        BoolPoint::ValveOpen,
        BoolPoint::AutoMode,
        BoolPoint::MotorRunning,
        BoolPoint::MotorTripped,
    ];

    pub fn bank(self) -> BoolBank {
        match self {
            BoolPoint::StartRequest
            | BoolPoint::StopRequest
            | BoolPoint::ValveOpen
            | BoolPoint::AutoMode => BoolBank::Coil,
            BoolPoint::MotorRunning | BoolPoint::MotorTripped => BoolBank::DiscreteInput,
        }
    }

    pub fn address(self) -> u16 {
        match self {
            BoolPoint::StartRequest => 100,
            BoolPoint::StopRequest => 110,
            BoolPoint::ValveOpen => 120,
            BoolPoint::AutoMode => 130,
            BoolPoint::MotorRunning => 100,
            BoolPoint::MotorTripped => 110,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            BoolPoint::StartRequest => "Start request, resets after activation",
            BoolPoint::StopRequest => "Stop request, resets after activation",
            BoolPoint::ValveOpen => "Discharge valve, true when open",
            BoolPoint::AutoMode => "Automatic mode driven by the Hi/Lo setpoints",
            BoolPoint::MotorRunning => "Motor running",
            BoolPoint::MotorTripped => "Motor tripped on valve loss or tank overflow",
        }
    }

    /// Find the point stored at `address` in `bank`.
    pub fn lookup(bank: BoolBank, address: u16) -> Option<BoolPoint> {
        Self::ALL
            .into_iter()
            .find(|point| point.bank() == bank && point.address() == address)
    }
}

impl WordPoint {
    pub const ALL: [WordPoint; 6] = [
        WordPoint::MotorLoad,
        WordPoint::Flow,
        WordPoint::TankLevel,
        WordPoint::TankDrain,
        WordPoint::TankHiSetpoint,
        WordPoint::TankLoSetpoint,
    ];

    pub fn bank(self) -> WordBank {
        match self {
            WordPoint::MotorLoad
            | WordPoint::Flow
            | WordPoint::TankLevel
            | WordPoint::TankDrain => WordBank::InputRegister,
            WordPoint::TankHiSetpoint | WordPoint::TankLoSetpoint => WordBank::HoldingRegister,
        }
    }

    pub fn address(self) -> u16 {
        match self {
            WordPoint::MotorLoad => 100,
            WordPoint::Flow => 110,
            WordPoint::TankLevel => 120,
            WordPoint::TankDrain => 130,
            WordPoint::TankHiSetpoint => 100,
            WordPoint::TankLoSetpoint => 110,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            WordPoint::MotorLoad => "Motor load in percent (0-100)",
            WordPoint::Flow => "Flow meter reading (0-10)",
            WordPoint::TankLevel => "Tank level (0-65535), overflow trip above 65500",
            WordPoint::TankDrain => "Tank drain applied on the next tick (0-6)",
            WordPoint::TankHiSetpoint => "Hi setpoint, stops the motor in auto mode",
            WordPoint::TankLoSetpoint => "Lo setpoint, starts the motor in auto mode",
        }
    }

    /// Find the point stored at `address` in `bank`.
    pub fn lookup(bank: WordBank, address: u16) -> Option<WordPoint> {
        Self::ALL
            .into_iter()
            .find(|point| point.bank() == bank && point.address() == address)
    }
}

/// Render the whole point map, one point per line.
///
/// Used by `--list-points` and by the operator client.
pub fn describe_points() -> Vec<String> {
    let bools = BoolPoint::ALL.into_iter().map(|point| {
        let bank = Bank::from(point.bank());
        (bank, point.address(), "bool", point.description())
    });
    let words = WordPoint::ALL.into_iter().map(|point| {
        let bank = Bank::from(point.bank());
        (bank, point.address(), "u16", point.description())
    });

    bools
        .chain(words)
        .map(|(bank, address, kind, description)| {
            let access = if bank.is_writable() { "rw" } else { "ro" };
            format!("{bank:<16} {address:>5} {kind:<4} {access}  {description}")
        })
        .collect()
}
