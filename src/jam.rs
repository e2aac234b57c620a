//! Forced stops ("jams") and their timed release.
//!
//! A jam holds one vehicle still for [JAM_DURATION](crate::track::JAM_DURATION)
//! of wall-clock time, however many ticks that turns out to be. Releases are
//! deferred tasks which the owner of the ring polls; nothing runs on another
//! thread. A release carries the [VehicleId] it targets, and the generation
//! check in that ID means a release scheduled before the ring was rebuilt
//! can never touch a vehicle of the new ring.

use crate::{Ring, VehicleId};
use smallvec::SmallVec;
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// A source of wall-clock time.
pub trait Clock {
    /// The current time.
    fn now(&self) -> Instant;
}

/// The system's monotonic clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Clone, Debug)]
pub struct ManualClock {
    start: Instant,
    offset: Rc<Cell<Duration>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    /// Creates a clock stopped at the current time.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            offset: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }

    /// The time elapsed since the clock was created.
    pub fn elapsed(&self) -> Duration {
        self.offset.get()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + self.offset.get()
    }
}

/// Why a jam could not be started.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum JamError {
    #[error("vehicle {0:?} is already jammed")]
    AlreadyActive(VehicleId),

    #[error("vehicle {0:?} is not on the ring")]
    UnknownVehicle(VehicleId),
}

/// Notification that a jam has ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JamRelease {
    /// The vehicle that was held still.
    pub vehicle: VehicleId,
    /// When the jam started.
    pub triggered_at: Instant,
    /// When the jam was released.
    pub released_at: Instant,
    /// Whether the ring was rebuilt in the meantime, so nothing was released.
    pub stale: bool,
}

/// A jam waiting to be released.
#[derive(Clone, Copy, Debug)]
struct PendingJam {
    vehicle: VehicleId,
    triggered_at: Instant,
    release_at: Instant,
}

/// Keeps track of vehicles held still and when to let them go.
#[derive(Clone, Debug)]
pub(crate) struct JamScheduler {
    duration: Duration,
    pending: SmallVec<[PendingJam; 2]>,
}

impl JamScheduler {
    /// Creates a scheduler whose jams last `duration`.
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            pending: SmallVec::new(),
        }
    }

    /// The vehicle of the jam still running at `now` that targets a vehicle
    /// on the ring, if any. Jams that are due count as over even before
    /// [release_due](Self::release_due) lets them go.
    pub fn active(&self, ring: &Ring, now: Instant) -> Option<VehicleId> {
        self.pending
            .iter()
            .filter(|jam| jam.release_at > now)
            .map(|jam| jam.vehicle)
            .find(|id| ring.get_vehicle(*id).is_some())
    }

    /// Stops the given vehicle and schedules its release.
    ///
    /// Only one jam may be active at a time; pending jams on vehicles of
    /// an older ring don't count.
    pub fn start(&mut self, ring: &mut Ring, vehicle: VehicleId, now: Instant) -> Result<(), JamError> {
        if let Some(active) = self.active(ring, now) {
            return Err(JamError::AlreadyActive(active));
        }
        if !ring.force_stop(vehicle) {
            return Err(JamError::UnknownVehicle(vehicle));
        }
        self.pending.push(PendingJam {
            vehicle,
            triggered_at: now,
            release_at: now + self.duration,
        });
        Ok(())
    }

    /// Releases every jam that is due at `now`, oldest first.
    pub fn release_due(&mut self, ring: &mut Ring, now: Instant) -> SmallVec<[JamRelease; 2]> {
        let mut released = SmallVec::new();
        self.pending.retain(|jam| {
            if jam.release_at > now {
                return true;
            }
            let stale = !ring.release(jam.vehicle);
            released.push(JamRelease {
                vehicle: jam.vehicle,
                triggered_at: jam.triggered_at,
                released_at: now,
                stale,
            });
            false
        });
        released
    }

    /// The number of jams waiting to be released, including stale ones.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::track::JAM_DURATION;
    use crate::SimulationConfig;

    fn setup() -> (Ring, JamScheduler, ManualClock) {
        let ring = Ring::new(&SimulationConfig::default().with_car_count(4));
        (ring, JamScheduler::new(JAM_DURATION), ManualClock::new())
    }

    #[test]
    fn manual_clock_is_shared() {
        let clock = ManualClock::new();
        let copy = clock.clone();
        let before = clock.now();
        copy.advance(Duration::from_millis(1500));
        assert_eq!(clock.now() - before, Duration::from_millis(1500));
        assert_eq!(clock.elapsed(), Duration::from_millis(1500));
    }

    #[test]
    fn releases_after_duration() {
        let (mut ring, mut jams, clock) = setup();
        let id = ring.vehicle_at(2).unwrap().id();
        jams.start(&mut ring, id, clock.now()).unwrap();
        assert!(ring.get_vehicle(id).unwrap().is_forced_stopped());

        clock.advance(Duration::from_millis(1999));
        assert!(jams.release_due(&mut ring, clock.now()).is_empty());
        assert!(ring.get_vehicle(id).unwrap().is_forced_stopped());

        clock.advance(Duration::from_millis(1));
        let released = jams.release_due(&mut ring, clock.now());
        assert_eq!(released.len(), 1);
        assert_eq!(released[0].vehicle, id);
        assert!(!released[0].stale);
        assert!(!ring.get_vehicle(id).unwrap().is_forced_stopped());
        assert_eq!(jams.pending(), 0);
    }

    #[test]
    fn second_jam_is_rejected() {
        let (mut ring, mut jams, clock) = setup();
        let a = ring.vehicle_at(0).unwrap().id();
        let b = ring.vehicle_at(1).unwrap().id();
        jams.start(&mut ring, a, clock.now()).unwrap();
        assert_eq!(jams.start(&mut ring, b, clock.now()), Err(JamError::AlreadyActive(a)));
        assert!(!ring.get_vehicle(b).unwrap().is_forced_stopped());
    }

    #[test]
    fn due_jam_is_no_longer_active() {
        let (mut ring, mut jams, clock) = setup();
        let id = ring.vehicle_at(0).unwrap().id();
        jams.start(&mut ring, id, clock.now()).unwrap();
        assert_eq!(jams.active(&ring, clock.now()), Some(id));

        clock.advance(JAM_DURATION);
        assert_eq!(jams.active(&ring, clock.now()), None);
        assert_eq!(jams.pending(), 1);
    }

    #[test]
    fn stale_jam_leaves_new_ring_alone() {
        let (mut ring, mut jams, clock) = setup();
        let old = ring.vehicle_at(1).unwrap().id();
        jams.start(&mut ring, old, clock.now()).unwrap();

        ring.reinitialize(&SimulationConfig::default().with_car_count(4));
        assert_eq!(jams.active(&ring, clock.now()), None);

        // A jam on the new ring may start while the stale one is pending
        let new = ring.vehicle_at(1).unwrap().id();
        clock.advance(Duration::from_millis(500));
        jams.start(&mut ring, new, clock.now()).unwrap();

        clock.advance(Duration::from_millis(1500));
        let released = jams.release_due(&mut ring, clock.now());
        assert_eq!(released.len(), 1);
        assert!(released[0].stale);
        assert!(ring.get_vehicle(new).unwrap().is_forced_stopped());
    }
}
