use super::VehicleState;
use crate::track::{CONTACT_EPSILON, CRUISE_DOWN_FACTOR, EMERGENCY_FACTOR, EMERGENCY_THRESHOLD};
use crate::SimulationConfig;

/// The adaptive cruise control model shared by every vehicle on the ring.
#[derive(Clone, Copy, Debug)]
pub struct CruiseControl {
    max_speed: f64,
    acceleration: f64,
    braking_power: f64,
    safe_distance: f64,
}

/// The parameters of the cruise control model.
pub struct ModelParams {
    /// The target cruising speed in rad/tick.
    pub max_speed: f64,
    /// The speed gained per tick in rad/tick.
    pub acceleration: f64,
    /// The speed lost per tick while braking, in rad/tick.
    pub braking_power: f64,
    /// The free space below which the vehicle brakes, in rad.
    pub safe_distance: f64,
}

/// The outcome of one application of the model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Response {
    /// The vehicle's new speed.
    pub speed: f64,
    /// The branch of the model that was taken.
    pub state: VehicleState,
}

impl CruiseControl {
    /// Creates a new cruise control model.
    pub fn new(params: &ModelParams) -> Self {
        Self {
            max_speed: params.max_speed,
            acceleration: params.acceleration,
            braking_power: params.braking_power,
            safe_distance: params.safe_distance,
        }
    }

    /// Creates the model described by a simulation configuration.
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(&ModelParams {
            max_speed: config.max_speed,
            acceleration: config.acceleration,
            braking_power: config.braking_power,
            safe_distance: config.safe_distance,
        })
    }

    /// Computes a vehicle's new speed from the free space to the vehicle ahead.
    ///
    /// # Arguments
    /// * `speed` - The vehicle's speed before this tick (rad/tick).
    /// * `free_space` - The gap to the vehicle ahead, less the vehicle footprint (rad).
    /// * `leader_speed` - The vehicle ahead's speed before this tick (rad/tick).
    pub fn respond(&self, speed: f64, free_space: f64, leader_speed: f64) -> Response {
        let (mut speed, state) = if free_space < self.safe_distance {
            (f64::max(speed - self.braking(free_space), 0.0), VehicleState::Braking)
        } else if speed < self.max_speed {
            (speed + self.acceleration, VehicleState::Accelerating)
        } else if speed > self.max_speed {
            let slowed = speed - CRUISE_DOWN_FACTOR * self.braking_power;
            (f64::max(self.max_speed, slowed), VehicleState::Cruising)
        } else {
            (speed, VehicleState::Cruising)
        };

        // Touching vehicles can't close the gap any further
        if free_space <= CONTACT_EPSILON && speed > leader_speed {
            speed = leader_speed;
        }

        Response { speed, state }
    }

    /// The speed reduction applied when braking with the given free space.
    fn braking(&self, free_space: f64) -> f64 {
        if free_space < EMERGENCY_THRESHOLD * self.safe_distance {
            EMERGENCY_FACTOR * self.braking_power
        } else {
            self.braking_power
        }
    }
}
