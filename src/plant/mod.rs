// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-icsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Simulated plant: a pump, a discharge valve and a storage tank
//!
//! ## Key Components
//!
//! - [`points`]: the catalogue of addressable points and their banks
//! - [`PointStore`]: the lock-protected table the protocol layer reads and writes
//! - [`ProcessModel`]: the pure transition function applied on every tick
//! - [`Scheduler`]: the periodic driver committing each step atomically
//! - [`StepObserver`]: the sink notified after every committed step
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::{atomic::AtomicBool, Arc};
//! use rust_icsim::plant::{PointStore, ProcessModel, RandomSource, Scheduler, DEFAULT_TICK_INTERVAL};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let store = Arc::new(PointStore::default());
//! let model = ProcessModel::new(RandomSource::seeded(1));
//! let running = Arc::new(AtomicBool::new(true));
//! Scheduler::new(store, model, DEFAULT_TICK_INTERVAL)?
//!     .spawn(running)
//!     .await??;
//! # Ok(())
//! # }
//! ```

pub mod image;
pub mod model;
pub mod observer;
pub mod points;
pub mod random;
pub mod scheduler;
pub mod store;

pub use image::ProcessImage;
pub use model::{BoundClamp, ProcessEvent, ProcessModel, StepOutcome};
pub use observer::{LogObserver, StepObserver};
pub use points::{Bank, BoolBank, BoolPoint, WordBank, WordPoint};
pub use random::{ProcessRandom, RandomSource, ScriptedRandom};
pub use scheduler::{Scheduler, SchedulerStats, DEFAULT_TICK_INTERVAL};
pub use store::{PointError, PointStore};
