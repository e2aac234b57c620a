//! Callbacks for drivers that want to hear about simulation events.

use crate::{JamRelease, TickStats, VehicleId};

/// Callbacks invoked by a [Simulation](crate::Simulation) as things happen.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
pub trait SimObserver {
    /// Called after every tick with the tick's statistics.
    fn on_tick(&mut self, _frame: usize, _stats: &TickStats) {}

    /// Called when a vehicle is forced to stop.
    fn on_jam_started(&mut self, _vehicle: VehicleId) {}

    /// Called exactly once for every jam that was started, no earlier than
    /// the jam duration after it started.
    fn on_jam_released(&mut self, _release: &JamRelease) {}

    /// Called after the ring has been rebuilt.
    fn on_reset(&mut self, _car_count: usize) {}
}

/// A [SimObserver] that does nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
