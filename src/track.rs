//! Physical constants of the ring road and of the car following rule.

use std::time::Duration;

/// The radius of the ring road, in world units.
pub const TRACK_RADIUS: f64 = 200.0;

/// The length of a vehicle, in world units.
pub const VEHICLE_LENGTH: f64 = 24.0;

/// The width of a vehicle, in world units.
pub const VEHICLE_WIDTH: f64 = 12.0;

/// The clearance kept behind the vehicle ahead on top of its length, in world units.
pub const CLEARANCE_BUFFER: f64 = 6.0;

/// The angle occupied by the body of one vehicle, in rad.
pub const VEHICLE_BODY: f64 = VEHICLE_LENGTH / TRACK_RADIUS;

/// The angle occupied by one vehicle and its clearance buffer, in rad.
pub const VEHICLE_FOOTPRINT: f64 = (VEHICLE_LENGTH + CLEARANCE_BUFFER) / TRACK_RADIUS;

/// Braking is multiplied by this factor when a collision is imminent.
pub const EMERGENCY_FACTOR: f64 = 3.0;

/// Fraction of the safe distance below which braking becomes emergency braking.
pub const EMERGENCY_THRESHOLD: f64 = 0.3;

/// Fraction of the braking power used to slow down to a lowered target speed.
pub const CRUISE_DOWN_FACTOR: f64 = 0.5;

/// Free space at or below which two vehicles are considered touching, in rad.
pub const CONTACT_EPSILON: f64 = 0.001;

/// How long a forced stop lasts before the vehicle is released.
pub const JAM_DURATION: Duration = Duration::from_secs(2);
