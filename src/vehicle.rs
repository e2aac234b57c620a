use self::acceleration::CruiseControl;
use crate::math::{polar, tangent, wrap_angle, Point2d, Vector2d};
use crate::track::{TRACK_RADIUS, VEHICLE_BODY, VEHICLE_FOOTPRINT};
use crate::VehicleId;
use std::time::Duration;

pub(crate) mod acceleration;

/// The body colours handed out to vehicles, in order.
pub const PALETTE: [&str; 13] = [
    "#ef4444", "#f97316", "#f59e0b", "#84cc16", "#10b981", "#06b6d4", "#3b82f6", "#6366f1",
    "#8b5cf6", "#d946ef", "#f43f5e", "#e2e8f0", "#94a3b8",
];

/// Half-period of the hazard lights of a stopped vehicle.
const HAZARD_BLINK: Duration = Duration::from_millis(300);

/// A simulated vehicle on the ring.
#[derive(Clone, Debug)]
pub struct Vehicle {
    /// The vehicle's ID.
    pub(crate) id: VehicleId,
    /// The vehicle's index in the ring, assigned at creation.
    seq: usize,
    /// The position along the ring in rad, in `[0, 2π)`.
    angle: f64,
    /// The angular velocity in rad/tick.
    speed: f64,
    /// Whether the vehicle is being held still by a jam.
    forced_stop: bool,
    /// What the vehicle did during the last tick.
    state: VehicleState,
    /// Whether the vehicle has ever had to brake for the vehicle ahead.
    has_braked: bool,
    /// Whether the vehicle has ever overlapped the vehicle ahead.
    collided: bool,
    /// The body colour.
    colour: &'static str,
}

/// What a vehicle did during the last tick.
/// Only used for observation, never fed back into the model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VehicleState {
    Accelerating,
    Braking,
    Cruising,
    Stopped,
}

impl VehicleState {
    /// Whether the brake lights are lit in this state.
    pub fn is_braking(self) -> bool {
        matches!(self, Self::Braking | Self::Stopped)
    }
}

impl Vehicle {
    /// Creates a new stationary vehicle.
    pub(crate) fn new(id: VehicleId, seq: usize, angle: f64) -> Self {
        Self {
            id,
            seq,
            angle: wrap_angle(angle),
            speed: 0.0,
            forced_stop: false,
            state: VehicleState::Stopped,
            has_braked: false,
            collided: false,
            colour: PALETTE[seq % PALETTE.len()],
        }
    }

    /// Gets the vehicle's ID.
    pub fn id(&self) -> VehicleId {
        self.id
    }

    /// The vehicle's index in the ring, which never changes.
    pub fn seq(&self) -> usize {
        self.seq
    }

    /// The vehicle's position along the ring in rad.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// The vehicle's angular velocity in rad/tick.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// What the vehicle did during the last tick.
    pub fn state(&self) -> VehicleState {
        self.state
    }

    /// Whether the vehicle is currently held still by a jam.
    pub fn is_forced_stopped(&self) -> bool {
        self.forced_stop
    }

    /// Whether the vehicle has had to brake since the ring was built.
    pub fn has_braked(&self) -> bool {
        self.has_braked
    }

    /// Whether the vehicle has overlapped the vehicle ahead since the ring was built.
    pub fn has_collided(&self) -> bool {
        self.collided
    }

    /// The vehicle's body colour as a CSS hex string.
    pub fn colour(&self) -> &'static str {
        self.colour
    }

    /// The coordinates in world space of the centre of the vehicle.
    pub fn position(&self) -> Point2d {
        polar(self.angle, TRACK_RADIUS)
    }

    /// A unit vector in world space aligned with the vehicle's heading.
    pub fn direction(&self) -> Vector2d {
        tangent(self.angle)
    }

    /// Whether the hazard lights are lit, `elapsed` since some fixed epoch.
    pub fn hazard_lights_on(&self, elapsed: Duration) -> bool {
        self.forced_stop && (elapsed.as_millis() / HAZARD_BLINK.as_millis()) % 2 == 0
    }

    /// Holds the vehicle still until it is released.
    pub(crate) fn force_stop(&mut self) {
        self.forced_stop = true;
        self.state = VehicleState::Stopped;
    }

    /// Releases a forced stop.
    pub(crate) fn release(&mut self) {
        self.forced_stop = false;
    }

    /// Moves the vehicle, wrapping the angle onto the ring.
    pub(crate) fn set_kinematics(&mut self, angle: f64, speed: f64) {
        self.angle = wrap_angle(angle);
        self.speed = f64::max(speed, 0.0);
    }

    /// Applies the car following model, given the arc from this vehicle to the vehicle
    /// ahead and its speed before this tick. Returns `true` if the vehicle counts as braking.
    ///
    /// The clearance buffer only counts towards braking; the vehicles have collided
    /// once their bodies overlap.
    pub(crate) fn apply_model(&mut self, model: &CruiseControl, gap: f64, leader_speed: f64) -> bool {
        if gap < VEHICLE_BODY {
            self.collided = true;
        }
        let free_space = gap - VEHICLE_FOOTPRINT;

        if self.forced_stop {
            self.speed = 0.0;
            self.state = VehicleState::Stopped;
            return true;
        }

        let res = model.respond(self.speed, free_space, leader_speed);
        self.speed = res.speed;
        self.state = res.state;
        if res.state == VehicleState::Braking {
            self.has_braked = true;
            true
        } else {
            false
        }
    }

    /// Advances the vehicle along the ring by its current speed.
    pub(crate) fn integrate(&mut self) {
        self.angle = wrap_angle(self.angle + self.speed);
    }
}
