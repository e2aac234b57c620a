//! Tunable parameters of the simulation.

use thiserror::Error;

/// The parameters of a ring road simulation.
///
/// All speeds and distances are angular: speeds in rad per tick,
/// distances in rad of arc along the ring.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationConfig {
    /// The number of vehicles on the ring.
    /// Changing it requires the ring to be rebuilt.
    pub car_count: usize,
    /// The target cruising speed.
    pub max_speed: f64,
    /// The speed gained per tick while below the target speed.
    pub acceleration: f64,
    /// The speed lost per tick while braking.
    pub braking_power: f64,
    /// The free space to the vehicle ahead below which a vehicle brakes.
    pub safe_distance: f64,
    /// Seed for choosing which vehicle gets stopped. `None` seeds from entropy.
    pub seed: Option<u64>,
}

/// A problem with a [SimulationConfig].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("the ring must contain at least one vehicle")]
    NoVehicles,

    #[error("{0} must be a finite number")]
    NonFinite(&'static str),

    #[error("{0} must not be negative")]
    Negative(&'static str),
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            car_count: 15,
            max_speed: 0.02,
            acceleration: 0.0003,
            braking_power: 0.0008,
            safe_distance: 0.25,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Sets the number of vehicles.
    pub fn with_car_count(mut self, car_count: usize) -> Self {
        self.car_count = car_count;
        self
    }

    /// Sets the target cruising speed.
    pub fn with_max_speed(mut self, max_speed: f64) -> Self {
        self.max_speed = max_speed;
        self
    }

    /// Sets the safe distance.
    pub fn with_safe_distance(mut self, safe_distance: f64) -> Self {
        self.safe_distance = safe_distance;
        self
    }

    /// Sets the seed used to pick jammed vehicles.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks that the configuration describes a ring that can be simulated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.car_count == 0 {
            return Err(ConfigError::NoVehicles);
        }
        let fields = [
            ("max_speed", self.max_speed),
            ("acceleration", self.acceleration),
            ("braking_power", self.braking_power),
            ("safe_distance", self.safe_distance),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite(name));
            }
            if value < 0.0 {
                return Err(ConfigError::Negative(name));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(SimulationConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_empty_ring() {
        let config = SimulationConfig::default().with_car_count(0);
        assert_eq!(config.validate(), Err(ConfigError::NoVehicles));
    }

    #[test]
    fn rejects_bad_numbers() {
        let config = SimulationConfig::default().with_max_speed(f64::NAN);
        assert_eq!(config.validate(), Err(ConfigError::NonFinite("max_speed")));

        let config = SimulationConfig::default().with_safe_distance(-0.1);
        assert_eq!(config.validate(), Err(ConfigError::Negative("safe_distance")));
    }
}
