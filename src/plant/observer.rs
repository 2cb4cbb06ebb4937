// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-icsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Observability sink for committed process steps

use log::{debug, info, warn};

use super::model::{BoundClamp, ProcessEvent, StepOutcome};

/// Receives every step once it has been committed to the point store.
pub trait StepObserver: Send {
    fn on_step(&mut self, tick: u64, outcome: &StepOutcome);
}

/// Default observer: writes events and process values to the log.
#[derive(Debug, Clone)]
pub struct LogObserver {
    /// Log the process values of every tick at info level instead of debug.
    log_process_values: bool,
}

impl Default for LogObserver {
    fn default() -> Self {
        Self::new(true)
    }
}

impl LogObserver {
    pub fn new(log_process_values: bool) -> Self {
        Self { log_process_values }
    }
}

impl StepObserver for LogObserver {
    fn on_step(&mut self, tick: u64, outcome: &StepOutcome) {
        for event in &outcome.events {
            match event {
                ProcessEvent::ValveTrip => {
                    warn!("Tick {tick}: motor tripped, discharge valve closed while running")
                }
                ProcessEvent::OverflowTrip => warn!(
                    "Tick {tick}: motor tripped, tank overflow (level {})",
                    outcome.image.tank_level
                ),
                ProcessEvent::ManualStop => info!("Tick {tick}: STOP signal received"),
                ProcessEvent::HiSetpointStop => info!(
                    "Tick {tick}: stopping motor on Hi setpoint ({})",
                    outcome.image.tank_hi_setpoint
                ),
                ProcessEvent::ManualStart => {
                    info!("Tick {tick}: START signal received, starting motor")
                }
                ProcessEvent::LoSetpointStart => info!(
                    "Tick {tick}: starting motor on Lo setpoint ({})",
                    outcome.image.tank_lo_setpoint
                ),
                ProcessEvent::IdleStopReset => {
                    info!("Tick {tick}: STOP signal received, auto mode and trip reset")
                }
            }
        }

        for clamp in &outcome.clamps {
            match clamp {
                BoundClamp::TankLevelSaturated { requested } => {
                    warn!("Tick {tick}: tank level {requested} saturated at {}", u16::MAX)
                }
                BoundClamp::LoadStepOutOfRange { sample } => {
                    warn!("Tick {tick}: load step {sample} out of range, clamped")
                }
                BoundClamp::DrainOutOfRange { sample } => {
                    warn!("Tick {tick}: drain sample {sample} out of range, clamped")
                }
            }
        }

        if self.log_process_values {
            info!("Process values: {}", outcome.image);
        } else {
            debug!("Process values: {}", outcome.image);
        }
    }
}
