#[cfg(feature = "debug")]
use crate::debug::take_debug_frame;
use crate::jam::{Clock, JamError, JamScheduler, SystemClock};
use crate::observer::{NoopObserver, SimObserver};
use crate::stats::{StatsHistory, TickStats};
use crate::track::JAM_DURATION;
use crate::{ConfigError, Ring, SimulationConfig, Vehicle, VehicleId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A ring road traffic simulation, driven one tick at a time.
pub struct Simulation {
    /// The current parameters.
    config: SimulationConfig,
    /// The vehicles on the road.
    ring: Ring,
    /// Vehicles held still and when to release them.
    jams: JamScheduler,
    /// The time source for jam durations and statistics sampling.
    clock: Box<dyn Clock>,
    /// Picks which vehicle gets jammed.
    rng: StdRng,
    /// Flow efficiency sampled over time.
    history: StatsHistory,
    /// Receives notifications of simulation events.
    observer: Box<dyn SimObserver>,
    /// The statistics of the most recent tick.
    stats: TickStats,
    /// The current frame of simulation.
    frame: usize,
    /// Debugging information from the previously simulated frame.
    #[cfg(feature = "debug")]
    debug: serde_json::Value,
}

impl Simulation {
    /// Creates a new simulation timed by the system clock.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, SystemClock)
    }

    /// Creates a new simulation timed by the given clock.
    pub fn with_clock(
        config: SimulationConfig,
        clock: impl Clock + 'static,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            ring: Ring::new(&config),
            jams: JamScheduler::new(JAM_DURATION),
            clock: Box::new(clock),
            rng: seeded_rng(config.seed),
            history: StatsHistory::default(),
            observer: Box::new(NoopObserver),
            stats: TickStats::default(),
            frame: 0,
            #[cfg(feature = "debug")]
            debug: serde_json::Value::Null,
            config,
        })
    }

    /// Sets the observer that is notified of simulation events.
    pub fn set_observer(&mut self, observer: impl SimObserver + 'static) {
        self.observer = Box::new(observer);
    }

    /// Gets the current parameters.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Changes the parameters. If the number of vehicles changes the ring is rebuilt;
    /// other changes take effect from the next tick.
    pub fn set_config(&mut self, config: SimulationConfig) -> Result<(), ConfigError> {
        if let Err(err) = config.validate() {
            log::warn!("Rejected configuration: {}", err);
            return Err(err);
        }
        let rebuild = config.car_count != self.config.car_count;
        if config.seed != self.config.seed {
            self.rng = seeded_rng(config.seed);
        }
        self.config = config;
        if rebuild {
            self.rebuild();
        }
        Ok(())
    }

    /// Puts every vehicle back at its starting position, stationary.
    /// Jams still pending are left to expire without effect.
    pub fn reset(&mut self) {
        self.rebuild();
    }

    /// Forces a randomly chosen vehicle to stop for the jam duration.
    pub fn trigger_jam(&mut self) -> Result<VehicleId, JamError> {
        self.poll();
        if let Some(active) = self.jam_active() {
            return Err(JamError::AlreadyActive(active));
        }
        let seq = self.rng.gen_range(0..self.ring.len());
        let vehicle_id = self
            .ring
            .vehicle_at(seq)
            .map(Vehicle::id)
            .expect("Ring is never empty");
        self.jam_vehicle(vehicle_id)?;
        Ok(vehicle_id)
    }

    /// Forces the given vehicle to stop for the jam duration.
    pub fn jam_vehicle(&mut self, vehicle_id: VehicleId) -> Result<(), JamError> {
        self.poll();
        let now = self.clock.now();
        self.jams.start(&mut self.ring, vehicle_id, now)?;
        log::debug!("Jammed vehicle {:?} at frame {}", vehicle_id, self.frame);
        self.observer.on_jam_started(vehicle_id);
        Ok(())
    }

    /// Gets the vehicle currently held still, if there is one.
    /// A jam whose time is up doesn't count, even before it's released by [poll](Self::poll).
    pub fn jam_active(&self) -> Option<VehicleId> {
        self.jams.active(&self.ring, self.clock.now())
    }

    /// Releases any jams that are due. Returns the number of jams released.
    ///
    /// Called at the start of every [step](Self::step); a paused driver
    /// should call it directly so that jams still end on time.
    pub fn poll(&mut self) -> usize {
        let now = self.clock.now();
        let released = self.jams.release_due(&mut self.ring, now);
        for release in &released {
            if release.stale {
                log::warn!(
                    "Jam on vehicle {:?} expired after the ring was rebuilt",
                    release.vehicle
                );
            } else {
                log::info!("Released vehicle {:?}", release.vehicle);
            }
            self.observer.on_jam_released(release);
        }
        released.len()
    }

    /// Advances the simulation by one tick.
    pub fn step(&mut self) -> TickStats {
        self.poll();
        self.stats = self.ring.tick(&self.config);
        self.frame += 1;
        self.history.record(
            self.clock.now(),
            self.frame,
            &self.stats,
            self.config.max_speed,
        );
        self.observer.on_tick(self.frame, &self.stats);

        #[cfg(feature = "debug")]
        {
            self.debug = take_debug_frame();
        }

        self.stats
    }

    /// Gets the current simulation frame index.
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Gets the statistics of the most recent tick.
    pub fn stats(&self) -> TickStats {
        self.stats
    }

    /// Gets the flow efficiency history.
    pub fn history(&self) -> &StatsHistory {
        &self.history
    }

    /// Gets the ring of vehicles.
    pub fn ring(&self) -> &Ring {
        &self.ring
    }

    /// Returns an iterator over all the vehicles in ring order.
    pub fn iter_vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.ring.iter_vehicles()
    }

    /// Gets a reference to the vehicle with the given ID.
    pub fn get_vehicle(&self, vehicle_id: VehicleId) -> Option<&Vehicle> {
        self.ring.get_vehicle(vehicle_id)
    }

    /// Gets the debugging information for the previously simulated frame as JSON array.
    #[cfg(feature = "debug")]
    pub fn debug(&mut self) -> serde_json::Value {
        self.debug.clone()
    }

    /// Rebuilds the ring from the current configuration.
    fn rebuild(&mut self) {
        self.ring.reinitialize(&self.config);
        self.history.clear();
        self.stats = TickStats::default();
        self.frame = 0;
        if self.jams.pending() > 0 {
            log::debug!("{} jams outlived the ring", self.jams.pending());
        }
        self.observer.on_reset(self.config.car_count);
    }
}

/// Creates the RNG used to pick jammed vehicles.
fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
