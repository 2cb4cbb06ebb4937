// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-icsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Operator scenarios and step properties of the process model
//!
//! The deterministic scenarios use a scripted random source so that every
//! value of the resulting image is known. The properties are checked with
//! proptest over random operator actions and seeds.

use proptest::prelude::*;

use rust_icsim::plant::points::{MAX_FLOW, MAX_MOTOR_LOAD, MAX_TANK_DRAIN, TANK_OVERFLOW_LEVEL};
use rust_icsim::plant::{
    ProcessEvent, ProcessImage, ProcessModel, RandomSource, ScriptedRandom,
};

fn scripted(load_steps: &[u16], drains: &[u16]) -> ProcessModel<ScriptedRandom> {
    ProcessModel::new(ScriptedRandom::new(
        load_steps.iter().copied(),
        drains.iter().copied(),
    ))
}

#[test]
fn scenario_manual_start() {
    let image = ProcessImage {
        start_request: true,
        ..ProcessImage::default()
    };
    let outcome = scripted(&[], &[]).step(&image);

    assert!(outcome.image.motor_running);
    assert!(outcome.image.valve_open);
    assert!(!outcome.image.start_request);
    assert!(!outcome.image.motor_tripped);
    assert_eq!(outcome.events, vec![ProcessEvent::ManualStart]);
}

#[test]
fn scenario_valve_loss_trip() {
    let image = ProcessImage {
        motor_running: true,
        valve_open: false,
        motor_load: 80,
        flow: 8,
        tank_level: 1000,
        ..ProcessImage::default()
    };
    let outcome = scripted(&[2], &[1]).step(&image);

    assert!(!outcome.image.motor_running);
    assert!(outcome.image.motor_tripped);
    assert_eq!(outcome.image.motor_load, 0);
    assert_eq!(outcome.image.flow, 0);
    assert!(!outcome.image.valve_open);
    assert_eq!(outcome.events, vec![ProcessEvent::ValveTrip]);
}

#[test]
fn scenario_overflow_trip() {
    let image = ProcessImage {
        motor_running: true,
        valve_open: true,
        tank_level: 65501,
        ..ProcessImage::default()
    };
    let outcome = scripted(&[0], &[0]).step(&image);

    assert!(outcome.image.motor_tripped);
    assert!(!outcome.image.motor_running);
    assert_eq!(outcome.image.flow, 0);
    assert_eq!(outcome.image.motor_load, 0);
    assert!(!outcome.image.valve_open);
    assert_eq!(outcome.events, vec![ProcessEvent::OverflowTrip]);
}

#[test]
fn scenario_auto_start() {
    let image = ProcessImage {
        auto_mode: true,
        tank_level: 9500,
        tank_lo_setpoint: 10000,
        ..ProcessImage::default()
    };
    let outcome = scripted(&[], &[]).step(&image);

    assert!(outcome.image.motor_running);
    assert!(outcome.image.valve_open);
    assert!(outcome.image.auto_mode);
    assert_eq!(outcome.events, vec![ProcessEvent::LoSetpointStart]);
}

#[test]
fn scenario_drain() {
    let image = ProcessImage {
        tank_level: 10,
        tank_drain: 3,
        ..ProcessImage::default()
    };
    let outcome = scripted(&[], &[5]).step(&image);

    assert_eq!(outcome.image.tank_level, 7);
    assert_eq!(outcome.image.tank_drain, 5);
    assert!(outcome.events.is_empty());
}

#[test]
fn empty_tank_is_not_drained() {
    let image = ProcessImage {
        tank_level: 6,
        tank_drain: 4,
        ..ProcessImage::default()
    };
    let outcome = scripted(&[], &[1]).step(&image);

    assert_eq!(outcome.image.tank_level, 6);
    // The drain is only drawn again once the tank is drained
    assert_eq!(outcome.image.tank_drain, 4);
}

#[test]
fn fill_then_trip_then_reset_sequence() {
    let mut model = scripted(&[4, 4, 4], &[0, 0, 0]);

    let mut image = ProcessImage {
        start_request: true,
        tank_level: 65485,
        ..ProcessImage::default()
    };
    image = model.step(&image).image;
    assert!(image.motor_running);

    // 65485 + 10 + 10 crosses the overflow threshold on the second running tick
    image = model.step(&image).image;
    assert!(image.motor_running);
    let outcome = model.step(&image);
    assert!(outcome.tripped());
    image = outcome.image;
    assert!(image.motor_tripped);

    // A trip is sticky until an operator stop or start
    image = model.step(&image).image;
    assert!(image.motor_tripped);
    image.stop_request = true;
    let outcome = model.step(&image);
    assert!(!outcome.image.motor_tripped);
    assert_eq!(outcome.events, vec![ProcessEvent::IdleStopReset]);
}

#[derive(Debug, Clone)]
enum OperatorAction {
    Start,
    Stop,
    Valve(bool),
    Auto(bool),
    HiSetpoint(u16),
    LoSetpoint(u16),
    Wait,
}

fn operator_action() -> impl Strategy<Value = OperatorAction> {
    prop_oneof![
        Just(OperatorAction::Start),
        Just(OperatorAction::Stop),
        any::<bool>().prop_map(OperatorAction::Valve),
        any::<bool>().prop_map(OperatorAction::Auto),
        any::<u16>().prop_map(OperatorAction::HiSetpoint),
        any::<u16>().prop_map(OperatorAction::LoSetpoint),
        Just(OperatorAction::Wait),
    ]
}

fn apply(image: &mut ProcessImage, action: &OperatorAction) {
    match action {
        OperatorAction::Start => image.start_request = true,
        OperatorAction::Stop => image.stop_request = true,
        OperatorAction::Valve(open) => image.valve_open = *open,
        OperatorAction::Auto(auto) => image.auto_mode = *auto,
        OperatorAction::HiSetpoint(value) => image.tank_hi_setpoint = *value,
        OperatorAction::LoSetpoint(value) => image.tank_lo_setpoint = *value,
        OperatorAction::Wait => {}
    }
}

proptest! {
    #[test]
    fn closed_valve_means_no_flow_and_no_load(
        seed in any::<u64>(),
        start_level in any::<u16>(),
        actions in prop::collection::vec(operator_action(), 1..200),
    ) {
        let mut model = ProcessModel::new(RandomSource::seeded(seed));
        let mut image = ProcessImage {
            tank_level: start_level,
            ..ProcessImage::default()
        };

        for action in &actions {
            apply(&mut image, action);
            image = model.step(&image).image;

            if !image.valve_open {
                prop_assert_eq!(image.flow, 0);
                prop_assert_eq!(image.motor_load, 0);
            }
            prop_assert!(image.motor_load <= MAX_MOTOR_LOAD);
            prop_assert!(image.flow <= MAX_FLOW);
            prop_assert!(image.tank_drain <= MAX_TANK_DRAIN);
            prop_assert!(!image.start_request || !image.motor_running);
            prop_assert!(!(image.motor_running && image.motor_tripped));
        }
    }

    #[test]
    fn running_above_overflow_always_trips(
        seed in any::<u64>(),
        level in (TANK_OVERFLOW_LEVEL + 1)..=u16::MAX,
        auto_mode in any::<bool>(),
    ) {
        let image = ProcessImage {
            motor_running: true,
            valve_open: true,
            auto_mode,
            tank_level: level,
            ..ProcessImage::default()
        };
        let outcome = ProcessModel::new(RandomSource::seeded(seed)).step(&image);

        prop_assert!(outcome.image.motor_tripped);
        prop_assert!(!outcome.image.motor_running);
        prop_assert!(outcome.tripped());
    }

    #[test]
    fn idle_plant_only_drains(
        seed in any::<u64>(),
        level in any::<u16>(),
        drain in 0..=MAX_TANK_DRAIN,
        tripped in any::<bool>(),
        valve_open in any::<bool>(),
    ) {
        let image = ProcessImage {
            motor_tripped: tripped,
            valve_open,
            tank_level: level,
            tank_drain: drain,
            ..ProcessImage::default()
        };
        let outcome = ProcessModel::new(RandomSource::seeded(seed)).step(&image);

        let mut expected = image;
        expected.tank_level = outcome.image.tank_level;
        expected.tank_drain = outcome.image.tank_drain;
        prop_assert_eq!(outcome.image, expected);
        prop_assert!(outcome.events.is_empty());

        if level <= 6 {
            prop_assert_eq!(outcome.image.tank_level, level);
        } else {
            prop_assert_eq!(outcome.image.tank_level, level - drain.min(level));
        }
    }
}
