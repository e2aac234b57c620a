#[cfg(feature = "debug")]
use crate::debug::debug_vehicle;
use crate::math::arc_gap;
use crate::track::VEHICLE_FOOTPRINT;
use crate::util::Interval;
use crate::vehicle::acceleration::CruiseControl;
use crate::{SimulationConfig, TickStats, Vehicle, VehicleId, VehicleSet};
use itertools::{Itertools, MinMaxResult};
use std::f64::consts::TAU;

/// A closed single lane road with vehicles travelling around it.
///
/// Each vehicle follows the one after it in ring order, and the
/// ring order is fixed when the ring is built.
#[derive(Clone, Default)]
pub struct Ring {
    /// The vehicles on the ring.
    vehicles: VehicleSet,
    /// The vehicle IDs in ring order; each vehicle follows the next one.
    order: Vec<VehicleId>,
    /// The angle and speed of every vehicle before the current tick, in ring order.
    snapshot: Vec<(f64, f64)>,
}

impl Ring {
    /// Creates a ring with `config.car_count` stationary, evenly spaced vehicles.
    ///
    /// The configuration must have been validated; an empty ring can't be ticked.
    pub fn new(config: &SimulationConfig) -> Self {
        let mut ring = Self::default();
        ring.reinitialize(config);
        ring
    }

    /// Replaces every vehicle with a fresh, evenly spaced, stationary one.
    /// IDs of the old vehicles are no longer valid afterwards.
    pub fn reinitialize(&mut self, config: &SimulationConfig) {
        self.vehicles.clear();
        self.order.clear();
        let count = config.car_count;
        let spacing = TAU / count as f64;
        for seq in 0..count {
            let id = self
                .vehicles
                .insert_with_key(|id| Vehicle::new(id, seq, seq as f64 * spacing));
            self.order.push(id);
        }
        log::debug!("Placed {} vehicles {:.3} rad apart", count, spacing);
    }

    /// The number of vehicles on the ring.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the ring has no vehicles.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns an iterator over the vehicles in ring order.
    pub fn iter_vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.order.iter().map(|id| &self.vehicles[*id])
    }

    /// Returns an iterator over the vehicle IDs in ring order.
    pub fn ids(&self) -> impl Iterator<Item = VehicleId> + '_ {
        self.order.iter().copied()
    }

    /// Gets a reference to the vehicle with the given ID, if it is on this ring.
    pub fn get_vehicle(&self, vehicle_id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(vehicle_id)
    }

    /// Gets the vehicle at the given position in ring order.
    pub fn vehicle_at(&self, seq: usize) -> Option<&Vehicle> {
        self.order.get(seq).map(|id| &self.vehicles[*id])
    }

    /// Gets the vehicle that the given vehicle follows.
    pub fn leader_of(&self, vehicle_id: VehicleId) -> Option<&Vehicle> {
        let seq = self.vehicles.get(vehicle_id)?.seq();
        self.vehicle_at((seq + 1) % self.len())
    }

    /// Gets the free space between a vehicle and the one it follows, in rad.
    /// Negative once the follower is inside the clearance buffer of the leader.
    pub fn free_space(&self, vehicle_id: VehicleId) -> Option<f64> {
        let vehicle = self.vehicles.get(vehicle_id)?;
        let leader = self.leader_of(vehicle_id)?;
        Some(arc_gap(vehicle.angle(), leader.angle()) - VEHICLE_FOOTPRINT)
    }

    /// Moves a vehicle to the given angle and speed. Returns `false` if it isn't on this ring.
    /// Used to set up scenarios; the caller is responsible for keeping the ring order.
    pub fn place_vehicle(&mut self, vehicle_id: VehicleId, angle: f64, speed: f64) -> bool {
        match self.vehicles.get_mut(vehicle_id) {
            Some(vehicle) => {
                vehicle.set_kinematics(angle, speed);
                true
            }
            None => false,
        }
    }

    /// Holds a vehicle still. Returns `false` if it isn't on this ring.
    pub(crate) fn force_stop(&mut self, vehicle_id: VehicleId) -> bool {
        match self.vehicles.get_mut(vehicle_id) {
            Some(vehicle) => {
                vehicle.force_stop();
                true
            }
            None => false,
        }
    }

    /// Releases a held vehicle. Returns `false` if it isn't on this ring.
    pub(crate) fn release(&mut self, vehicle_id: VehicleId) -> bool {
        match self.vehicles.get_mut(vehicle_id) {
            Some(vehicle) => {
                vehicle.release();
                true
            }
            None => false,
        }
    }

    /// Advances every vehicle by one tick and reports the resulting statistics.
    ///
    /// All vehicles decide their new speed from the state of the ring before the
    /// tick, and only then do they all move.
    pub fn tick(&mut self, config: &SimulationConfig) -> TickStats {
        let model = CruiseControl::from_config(config);
        let count = self.order.len();

        self.snapshot.clear();
        self.snapshot.extend(self.order.iter().map(|id| {
            let vehicle = &self.vehicles[*id];
            (vehicle.angle(), vehicle.speed())
        }));

        let mut braking_count = 0;
        for (idx, id) in self.order.iter().enumerate() {
            let (angle, _) = self.snapshot[idx];
            let (leader_angle, leader_speed) = self.snapshot[(idx + 1) % count];
            let gap = arc_gap(angle, leader_angle);
            if self.vehicles[*id].apply_model(&model, gap, leader_speed) {
                braking_count += 1;
            }
        }

        let mut total_speed = 0.0;
        for id in &self.order {
            let vehicle = &mut self.vehicles[*id];
            vehicle.integrate();
            total_speed += vehicle.speed();
            #[cfg(feature = "debug")]
            debug_vehicle(vehicle);
        }

        TickStats::new(total_speed, count, braking_count)
    }

    /// Computes the statistics of the ring as it is now, without advancing it.
    pub fn stats(&self) -> TickStats {
        let total_speed = self.iter_vehicles().map(Vehicle::speed).sum();
        let braking = self
            .iter_vehicles()
            .filter(|v| v.state().is_braking())
            .count();
        TickStats::new(total_speed, self.len(), braking)
    }

    /// The slowest and fastest speeds on the ring.
    pub fn speed_spread(&self) -> Interval<f64> {
        let speeds = self.iter_vehicles().map(Vehicle::speed);
        match speeds.minmax_by(|a, b| a.total_cmp(b)) {
            MinMaxResult::NoElements => Interval::default(),
            MinMaxResult::OneElement(speed) => Interval::new(speed, speed),
            MinMaxResult::MinMax(min, max) => Interval::new(min, max),
        }
    }

    /// The number of vehicles that have had to brake since the ring was built.
    pub fn affected_count(&self) -> usize {
        self.iter_vehicles().filter(|v| v.has_braked()).count()
    }

    /// Whether any two vehicles have overlapped since the ring was built.
    pub fn any_collided(&self) -> bool {
        self.iter_vehicles().any(Vehicle::has_collided)
    }
}
