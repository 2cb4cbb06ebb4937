// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-icsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Industrial control system process simulator
//!
//! This library simulates a small plant, a pump feeding a storage tank through
//! a discharge valve, and exposes its live state over Modbus TCP the way a
//! PLC would.
//!
//! ## Modules
//!
//! - [`plant`]: point map, process model, point store and scheduler
//! - [`modbus`]: Modbus TCP service over the point store
//! - [`config`]: YAML configuration validated against a JSON schema
//! - [`daemon`]: background tasks wiring everything together

pub mod config;
pub mod daemon;
pub mod modbus;
pub mod plant;
