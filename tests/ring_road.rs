//! Tests of the car following rule on a ring of vehicles.

use assert_approx_eq::assert_approx_eq;
use phantom_jam::{
    ManualClock, Ring, Simulation, SimulationConfig, Vehicle, VehicleId, VehicleState,
};
use std::f64::consts::TAU;
use std::time::Duration;

const FRAME: Duration = Duration::from_micros(16_667);

fn four_cars() -> SimulationConfig {
    SimulationConfig {
        car_count: 4,
        max_speed: 0.02,
        acceleration: 0.0003,
        braking_power: 0.0008,
        safe_distance: 0.25,
        seed: Some(1),
    }
}

fn ids(sim: &Simulation) -> Vec<VehicleId> {
    sim.ring().ids().collect()
}

/// Every vehicle accelerates away from a standstill when evenly spaced.
#[test]
fn evenly_spaced_vehicles_accelerate() {
    let mut sim = Simulation::with_clock(four_cars(), ManualClock::new()).unwrap();
    let stats = sim.step();

    for vehicle in sim.iter_vehicles() {
        assert_approx_eq!(vehicle.speed(), 0.0003);
        assert_eq!(vehicle.state(), VehicleState::Accelerating);
    }
    assert_eq!(stats.braking_count, 0);
    assert_approx_eq!(stats.average_speed, 0.03);
}

/// Stopping one vehicle makes the vehicles behind it brake in turn.
#[test]
fn jam_propagates_backwards() {
    let clock = ManualClock::new();
    let mut sim = Simulation::with_clock(four_cars(), clock).unwrap();
    let ids = ids(&sim);
    sim.step();
    sim.jam_vehicle(ids[0]).unwrap();

    let stats = sim.step();
    let stopped = sim.get_vehicle(ids[0]).unwrap();
    assert_eq!(stopped.speed(), 0.0);
    assert_eq!(stopped.state(), VehicleState::Stopped);
    assert_eq!(stats.braking_count, 1);
    let stopped_at = stopped.angle();

    // The clock never moves, so the jam is never released
    let mut first_braking = [None; 4];
    let mut max_braking = 0;
    for frame in 0..3000 {
        let stats = sim.step();
        max_braking = max_braking.max(stats.braking_count);
        for (seq, id) in ids.iter().enumerate() {
            let vehicle = sim.get_vehicle(*id).unwrap();
            if vehicle.state() == VehicleState::Braking && first_braking[seq].is_none() {
                first_braking[seq] = Some(frame);
            }
        }
        let stopped = sim.get_vehicle(ids[0]).unwrap();
        assert_eq!(stopped.speed(), 0.0);
        assert_eq!(stopped.angle(), stopped_at);
    }

    let [_, b1, b2, b3] = first_braking.map(|frame| frame.expect("vehicle never braked"));
    assert!(b3 < b2 && b2 < b1, "braking order was {:?}", first_braking);
    assert_eq!(max_braking, 4);
}

/// The braking count only rises once the follower reaches the safe distance.
#[test]
fn follower_brakes_inside_safe_distance() {
    let mut sim = Simulation::with_clock(four_cars(), ManualClock::new()).unwrap();
    let ids = ids(&sim);
    sim.jam_vehicle(ids[0]).unwrap();

    for _ in 0..500 {
        let free = sim.ring().free_space(ids[3]).unwrap();
        let stats = sim.step();
        let follower = sim.get_vehicle(ids[3]).unwrap();
        if free < 0.25 {
            assert_eq!(follower.state(), VehicleState::Braking);
            assert!(stats.braking_count >= 2);
            return;
        }
        assert_eq!(stats.braking_count, 1);
    }
    panic!("follower never caught up with the stopped vehicle");
}

/// Speeds stay non-negative, angles stay on the ring, and the statistics
/// describe the vehicles exactly, while jams come and go.
#[test]
fn invariants_hold_under_repeated_jams() {
    let clock = ManualClock::new();
    let config = SimulationConfig::default().with_car_count(12).with_seed(3);
    let mut sim = Simulation::with_clock(config, clock.clone()).unwrap();

    for frame in 0..4000 {
        if frame % 250 == 0 {
            let _ = sim.trigger_jam();
        }

        let before = sim
            .iter_vehicles()
            .map(|v| {
                let free = sim.ring().free_space(v.id()).unwrap();
                (v.id(), v.speed(), free, v.is_forced_stopped())
            })
            .collect::<Vec<_>>();

        let stats = sim.step();
        clock.advance(FRAME);

        for (id, speed, free, was_forced) in before {
            let vehicle = sim.get_vehicle(id).unwrap();
            if vehicle.is_forced_stopped() {
                assert_eq!(vehicle.speed(), 0.0);
                assert_eq!(vehicle.state(), VehicleState::Stopped);
            } else if !was_forced && free < config.safe_distance {
                assert_eq!(vehicle.state(), VehicleState::Braking);
                assert!(vehicle.speed() <= speed);
            }
        }

        let total: f64 = sim.iter_vehicles().map(Vehicle::speed).sum();
        let braking = sim.iter_vehicles().filter(|v| v.state().is_braking()).count();
        assert_eq!(stats.braking_count, braking);
        assert_approx_eq!(stats.average_speed, 100.0 * total / 12.0);

        for vehicle in sim.iter_vehicles() {
            assert!(vehicle.speed() >= 0.0);
            assert!((0.0..TAU).contains(&vehicle.angle()));
        }
    }
}

/// Emergency braking takes off three times the braking power.
#[test]
fn emergency_braking() {
    let config = four_cars();
    let mut ring = Ring::new(&config);
    let ids = ring.ids().collect::<Vec<_>>();
    let footprint = phantom_jam::track::VEHICLE_FOOTPRINT;

    // Vehicle 0 is very close behind vehicle 1, vehicle 2 a little further behind vehicle 3
    ring.place_vehicle(ids[0], 0.0, 0.015);
    ring.place_vehicle(ids[1], footprint + 0.05, 0.015);
    ring.place_vehicle(ids[2], 2.0, 0.015);
    ring.place_vehicle(ids[3], 2.0 + footprint + 0.15, 0.015);

    ring.tick(&config);
    let emergency = 0.015 - ring.get_vehicle(ids[0]).unwrap().speed();
    let normal = 0.015 - ring.get_vehicle(ids[2]).unwrap().speed();
    assert_approx_eq!(emergency, 3.0 * config.braking_power);
    assert_approx_eq!(normal, config.braking_power);
    assert!(emergency > normal);
}

/// Building a ring twice gives the same starting positions, whatever happened before.
#[test]
fn initialization_is_idempotent() {
    let config = four_cars();
    let fresh = Ring::new(&config)
        .iter_vehicles()
        .map(Vehicle::angle)
        .collect::<Vec<_>>();

    let mut sim = Simulation::with_clock(config, ManualClock::new()).unwrap();
    sim.trigger_jam().unwrap();
    for _ in 0..200 {
        sim.step();
    }
    sim.reset();

    let reset = sim.iter_vehicles().map(Vehicle::angle).collect::<Vec<_>>();
    assert_eq!(fresh, reset);
    assert!(sim.iter_vehicles().all(|v| v.speed() == 0.0));
    assert!(sim.iter_vehicles().all(|v| !v.is_forced_stopped()));
    assert_eq!(sim.frame(), 0);
}

/// Lowering the target speed slows vehicles down gradually.
#[test]
fn lowering_target_speed() {
    let mut sim = Simulation::with_clock(four_cars(), ManualClock::new()).unwrap();
    for _ in 0..200 {
        sim.step();
    }
    assert!(sim.iter_vehicles().all(|v| v.speed() == 0.02));

    sim.set_config(four_cars().with_max_speed(0.01)).unwrap();
    assert_eq!(sim.frame(), 200);
    sim.step();
    for vehicle in sim.iter_vehicles() {
        assert_eq!(vehicle.state(), VehicleState::Cruising);
        assert_approx_eq!(vehicle.speed(), 0.02 - 0.5 * 0.0008);
    }
    for _ in 0..100 {
        sim.step();
    }
    assert!(sim.iter_vehicles().all(|v| v.speed() == 0.01));
}

/// Vehicles are drawn on a circle around the origin, facing along the road.
#[test]
fn world_coordinates() {
    use phantom_jam::cgmath::prelude::*;

    let ring = Ring::new(&four_cars());
    let quarter = ring.vehicle_at(1).unwrap();
    let pos = quarter.position();
    assert_approx_eq!(pos.x, 0.0);
    assert_approx_eq!(pos.y, phantom_jam::track::TRACK_RADIUS);
    assert_approx_eq!(quarter.direction().x, -1.0);
    assert_approx_eq!(pos.to_vec().dot(quarter.direction()), 0.0);
}
