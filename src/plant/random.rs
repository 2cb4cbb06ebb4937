// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-icsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Random sources for the stochastic part of the process
//!
//! The motor load and the tank drain are drawn from a [`ProcessRandom`] that
//! is handed to the model at construction. Production code uses
//! [`RandomSource`] over a seedable [`StdRng`]; tests and replays use
//! [`ScriptedRandom`] to force exact sequences.

use std::collections::VecDeque;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::points::MAX_TANK_DRAIN;

/// Number of discrete motor load steps (60, 70, 80, 90, 100 %).
pub const LOAD_STEPS: u16 = 5;

/// Source of the random terms of a process step.
pub trait ProcessRandom: Send {
    /// Load step index in `0..LOAD_STEPS`.
    fn load_step(&mut self) -> u16;

    /// Drain amount in `0..=MAX_TANK_DRAIN`.
    fn drain(&mut self) -> u16;
}

/// [`ProcessRandom`] backed by any [`rand::Rng`].
#[derive(Debug, Clone)]
pub struct RandomSource<R = StdRng> {
    rng: R,
}

impl RandomSource<StdRng> {
    /// Deterministic source, the same seed yields the same process.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Source seeded from the operating system entropy pool.
    ///
    /// This is the only fallible point of the random source; once built it
    /// always produces a value.
    pub fn from_entropy() -> Result<Self> {
        let rng = StdRng::try_from_os_rng().context("Failed to seed the process random source")?;
        Ok(Self::new(rng))
    }

    /// Seeded source when `seed` is given, entropy otherwise.
    pub fn from_seed_option(seed: Option<u64>) -> Result<Self> {
        match seed {
            Some(seed) => Ok(Self::seeded(seed)),
            None => Self::from_entropy(),
        }
    }
}

impl<R: Rng> RandomSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng + Send> ProcessRandom for RandomSource<R> {
    fn load_step(&mut self) -> u16 {
        self.rng.random_range(0..LOAD_STEPS)
    }

    fn drain(&mut self) -> u16 {
        self.rng.random_range(0..=MAX_TANK_DRAIN)
    }
}

/// Replays fixed sequences of load steps and drain samples.
///
/// Once a sequence is exhausted its fallback value is returned (load step 0,
/// drain 0 unless changed with [`ScriptedRandom::with_fallback`]).
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    load_steps: VecDeque<u16>,
    drains: VecDeque<u16>,
    fallback_load_step: u16,
    fallback_drain: u16,
}

impl ScriptedRandom {
    pub fn new(
        load_steps: impl IntoIterator<Item = u16>,
        drains: impl IntoIterator<Item = u16>,
    ) -> Self {
        Self {
            load_steps: load_steps.into_iter().collect(),
            drains: drains.into_iter().collect(),
            fallback_load_step: 0,
            fallback_drain: 0,
        }
    }

    pub fn with_fallback(mut self, load_step: u16, drain: u16) -> Self {
        self.fallback_load_step = load_step;
        self.fallback_drain = drain;
        self
    }
}

impl ProcessRandom for ScriptedRandom {
    fn load_step(&mut self) -> u16 {
        self.load_steps
            .pop_front()
            .unwrap_or(self.fallback_load_step)
    }

    fn drain(&mut self) -> u16 {
        self.drains.pop_front().unwrap_or(self.fallback_drain)
    }
}
