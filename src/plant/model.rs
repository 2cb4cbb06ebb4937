// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-icsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Process step of the pump / valve / tank plant
//!
//! [`ProcessModel::step`] is a pure function of the current [`ProcessImage`]
//! and the injected random source. It never logs and never fails: what
//! happened during the step is described by the returned [`StepOutcome`] and
//! left to a [`StepObserver`](super::observer::StepObserver).
//!
//! ## Step stages
//!
//! 1. **Motor running**: consume the start request, draw the load, fill the
//!    tank, then apply in order the valve-loss trip, the overflow trip, the
//!    stop request and the auto-mode Hi setpoint stop.
//! 2. **Motor halted**: start on a start request, otherwise start in auto
//!    mode when the level is at or below the Lo setpoint and the motor is not
//!    tripped.
//! 3. **Always**: honour a stop request still pending (clears auto mode and
//!    the trip of a halted motor), then drain the tank unless it is empty and
//!    draw the drain for the next tick.

use serde::Serialize;

use super::image::ProcessImage;
use super::points::{MAX_TANK_DRAIN, TANK_EMPTY_LEVEL, TANK_OVERFLOW_LEVEL};
use super::random::{ProcessRandom, LOAD_STEPS};

/// Base motor load in percent, one load step adds 10 %.
const BASE_MOTOR_LOAD: u16 = 60;

/// Notable transitions of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProcessEvent {
    /// Motor tripped because the discharge valve was closed while running.
    ValveTrip,
    /// Motor tripped because the tank level exceeded the overflow threshold.
    OverflowTrip,
    /// Running motor stopped by a stop request, auto mode cleared.
    ManualStop,
    /// Motor stopped in auto mode on the Hi setpoint.
    HiSetpointStop,
    /// Halted motor started by a start request.
    ManualStart,
    /// Motor started in auto mode on the Lo setpoint.
    LoSetpointStart,
    /// Stop request honoured while the motor was halted: auto mode and trip cleared.
    IdleStopReset,
}

impl ProcessEvent {
    pub fn is_trip(self) -> bool {
        matches!(self, ProcessEvent::ValveTrip | ProcessEvent::OverflowTrip)
    }
}

/// A value forced back into its declared range during a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BoundClamp {
    /// Tank filling would have exceeded `u16::MAX`.
    TankLevelSaturated { requested: u32 },
    /// The random source returned a load step outside `0..LOAD_STEPS`.
    LoadStepOutOfRange { sample: u16 },
    /// The random source returned a drain above the maximum.
    DrainOutOfRange { sample: u16 },
}

/// Result of one process step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    /// Image to commit.
    pub image: ProcessImage,
    /// Transitions in the order they happened.
    pub events: Vec<ProcessEvent>,
    /// Range corrections applied before commit.
    pub clamps: Vec<BoundClamp>,
}

impl StepOutcome {
    pub fn tripped(&self) -> bool {
        self.events.iter().any(|event| event.is_trip())
    }
}

/// The process transition function together with its random source.
pub struct ProcessModel<R> {
    random: R,
}

impl<R: ProcessRandom> ProcessModel<R> {
    pub fn new(random: R) -> Self {
        Self { random }
    }

    /// Compute the image following `current`.
    pub fn step(&mut self, current: &ProcessImage) -> StepOutcome {
        let mut image = *current;
        let mut events = Vec::new();
        let mut clamps = Vec::new();

        if image.motor_running {
            self.run_motor(&mut image, &mut events, &mut clamps);
        } else {
            start_motor(&mut image, &mut events);
        }

        if image.stop_request {
            image.motor_running = false;
            image.auto_mode = false;
            image.motor_tripped = false;
            image.stop_request = false;
            events.push(ProcessEvent::IdleStopReset);
        }

        if image.tank_level > TANK_EMPTY_LEVEL {
            image.tank_level = image.tank_level.saturating_sub(image.tank_drain);
            image.tank_drain = self.draw_drain(&mut clamps);
        }

        StepOutcome {
            image,
            events,
            clamps,
        }
    }

    fn run_motor(
        &mut self,
        image: &mut ProcessImage,
        events: &mut Vec<ProcessEvent>,
        clamps: &mut Vec<BoundClamp>,
    ) {
        image.start_request = false;

        image.motor_load = BASE_MOTOR_LOAD + 10 * self.draw_load_step(clamps);
        image.flow = image.motor_load / 10;

        let requested = image.tank_level as u32 + image.flow as u32;
        image.tank_level = image.tank_level.saturating_add(image.flow);
        if requested > u16::MAX as u32 {
            clamps.push(BoundClamp::TankLevelSaturated { requested });
        }

        if !image.valve_open {
            trip(image);
            events.push(ProcessEvent::ValveTrip);
        }

        if image.tank_level > TANK_OVERFLOW_LEVEL {
            trip(image);
            events.push(ProcessEvent::OverflowTrip);
        }

        if image.stop_request {
            image.halt_motor();
            image.stop_request = false;
            image.auto_mode = false;
            events.push(ProcessEvent::ManualStop);
        }

        // Only reported when it actually stops the motor; a tripped motor is
        // already halted.
        if image.auto_mode && image.tank_level >= image.tank_hi_setpoint {
            let was_running = image.motor_running;
            image.halt_motor();
            image.stop_request = false;
            if was_running {
                events.push(ProcessEvent::HiSetpointStop);
            }
        }
    }

    fn draw_load_step(&mut self, clamps: &mut Vec<BoundClamp>) -> u16 {
        let sample = self.random.load_step();
        if sample >= LOAD_STEPS {
            clamps.push(BoundClamp::LoadStepOutOfRange { sample });
            return LOAD_STEPS - 1;
        }
        sample
    }

    fn draw_drain(&mut self, clamps: &mut Vec<BoundClamp>) -> u16 {
        let sample = self.random.drain();
        if sample > MAX_TANK_DRAIN {
            clamps.push(BoundClamp::DrainOutOfRange { sample });
            return MAX_TANK_DRAIN;
        }
        sample
    }
}

fn start_motor(image: &mut ProcessImage, events: &mut Vec<ProcessEvent>) {
    if image.start_request {
        image.start_request = false;
        image.stop_request = false;
        image.motor_running = true;
        image.motor_tripped = false;
        image.valve_open = true;
        events.push(ProcessEvent::ManualStart);
    } else if image.auto_mode
        && image.tank_level <= image.tank_lo_setpoint
        && !image.motor_tripped
    {
        image.motor_running = true;
        image.valve_open = true;
        events.push(ProcessEvent::LoSetpointStart);
    }
}

// Fail-close: the valve is closed on any trip.
fn trip(image: &mut ProcessImage) {
    image.halt_motor();
    image.motor_tripped = true;
}
