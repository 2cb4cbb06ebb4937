// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-icsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Periodic driver of the process step
//!
//! The scheduler runs on a single tokio task, so two steps can never overlap.
//! When a tick is late (the runtime was starved or a step overran its period)
//! the missed ticks are skipped rather than run back to back.

use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::{bail, Result};
use log::{debug, info};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use super::model::{ProcessModel, StepOutcome};
use super::observer::{LogObserver, StepObserver};
use super::random::ProcessRandom;
use super::store::PointStore;

/// Default period between two process steps.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Counters shared with the rest of the daemon.
#[derive(Debug, Default)]
pub struct SchedulerStats {
    ticks: AtomicU64,
    trips: AtomicU64,
}

impl SchedulerStats {
    /// Number of committed steps.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Number of steps that tripped the motor.
    pub fn trips(&self) -> u64 {
        self.trips.load(Ordering::Relaxed)
    }
}

/// Drives a [`ProcessModel`] against a [`PointStore`] on a fixed period.
pub struct Scheduler<R> {
    store: Arc<PointStore>,
    model: ProcessModel<R>,
    period: Duration,
    observer: Box<dyn StepObserver>,
    stats: Arc<SchedulerStats>,
}

impl<R: ProcessRandom + 'static> Scheduler<R> {
    /// Create a scheduler stepping `model` every `period`.
    ///
    /// # Errors
    ///
    /// A zero period is rejected, the tokio interval cannot tick on it.
    pub fn new(store: Arc<PointStore>, model: ProcessModel<R>, period: Duration) -> Result<Self> {
        if period.is_zero() {
            bail!("Process tick period must be greater than zero");
        }
        Ok(Self {
            store,
            model,
            period,
            observer: Box::new(LogObserver::default()),
            stats: Arc::new(SchedulerStats::default()),
        })
    }

    /// Replace the default [`LogObserver`].
    pub fn with_observer(mut self, observer: impl StepObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn stats(&self) -> Arc<SchedulerStats> {
        Arc::clone(&self.stats)
    }

    /// Run one step: snapshot, compute and commit under the store lock, then
    /// notify the observer.
    pub fn tick(&mut self) -> StepOutcome {
        let model = &mut self.model;
        let outcome = self.store.transact(|image| {
            let outcome = model.step(image);
            (outcome.image, outcome)
        });

        let tick = self.stats.ticks.fetch_add(1, Ordering::Relaxed) + 1;
        if outcome.tripped() {
            self.stats.trips.fetch_add(1, Ordering::Relaxed);
        }
        self.observer.on_step(tick, &outcome);
        outcome
    }

    /// Tick every period until `running` is cleared.
    ///
    /// The first step happens one period after the call.
    pub async fn run(mut self, running: Arc<AtomicBool>) -> Result<()> {
        info!("Process scheduler started with a period of {:?}", self.period);

        let mut interval = time::interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        while running.load(Ordering::SeqCst) {
            interval.tick().await;
            if !running.load(Ordering::SeqCst) {
                break;
            }

            let started = Instant::now();
            self.tick();
            let elapsed = started.elapsed();
            if elapsed > self.period {
                debug!(
                    "Process step took {:?}, longer than the {:?} period, next tick skipped",
                    elapsed, self.period
                );
            }
        }

        info!(
            "Process scheduler stopped after {} ticks ({} trips)",
            self.stats.ticks(),
            self.stats.trips()
        );
        Ok(())
    }

    /// Spawn [`Scheduler::run`] on the current tokio runtime.
    pub fn spawn(self, running: Arc<AtomicBool>) -> JoinHandle<Result<()>> {
        tokio::spawn(self.run(running))
    }
}
