//! A ring road simulation of phantom traffic jams.
//!
//! Vehicles drive around a circular single lane road, each following the one
//! ahead with a simple adaptive cruise control. Briefly stopping a single
//! vehicle with [Simulation::trigger_jam] sends a stop-and-go wave backwards
//! around the ring, which shows up in the [TickStats] of every tick.

pub use cgmath;
pub use config::{ConfigError, SimulationConfig};
pub use experiment::{Experiment, ExperimentParams, ExperimentSummary, RunSummary};
pub use jam::{Clock, JamError, JamRelease, ManualClock, SystemClock};
pub use observer::{NoopObserver, SimObserver};
pub use ring::Ring;
pub use simulation::Simulation;
use slotmap::{new_key_type, SlotMap};
pub use slotmap::{Key, KeyData};
pub use stats::{EfficiencySample, StatsHistory, TickStats};
pub use util::Interval;
pub use vehicle::{Vehicle, VehicleState, PALETTE};

mod config;
#[cfg(feature = "debug")]
mod debug;
mod experiment;
mod jam;
pub mod math;
mod observer;
mod ring;
mod simulation;
pub mod stats;
pub mod track;
mod util;
mod vehicle;

new_key_type! {
    /// Unique ID of a [Vehicle].
    pub struct VehicleId;
}

type VehicleSet = SlotMap<VehicleId, Vehicle>;
