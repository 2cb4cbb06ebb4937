// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-icsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Modbus communication module
//!
//! This module provides the Modbus TCP server exposing the simulated plant, so
//! that HMIs, scanners and the `icsim_client` operator tool can observe the
//! process and drive it through its coils and holding registers.
//!
//! ## Key Components
//!
//! - `ProcessModbusServer`: the service translating Modbus requests into
//!   [`PointStore`](crate::plant::PointStore) accesses.
//!
//! ## Usage
//!
//! The Modbus server is started as part of the application daemon:
//!
//! ```no_run
//! use rust_icsim::config::Config;
//! use rust_icsim::daemon::launch_daemon::Daemon;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::default();
//! let mut daemon = Daemon::new();
//! daemon.launch(&config).await?;
//! # Ok(())
//! # }
//! ```

pub mod modbus_server;
pub use modbus_server::ProcessModbusServer;
