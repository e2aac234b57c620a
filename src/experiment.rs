//! Repeated, seeded runs measuring how far a single jam spreads.
//!
//! Experiments count time in ticks rather than wall-clock time so that
//! every run is reproducible from its seed.

use crate::{ConfigError, Ring, SimulationConfig, Vehicle};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// The parameters of an experiment.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExperimentParams {
    /// The number of runs.
    pub runs: usize,
    /// The seed of the first run; subsequent runs use consecutive seeds.
    pub seed_start: u64,
    /// The number of ticks in each run.
    pub duration_ticks: usize,
    /// The tick at which a random vehicle is stopped.
    pub jam_at_tick: usize,
    /// The number of ticks the vehicle is held still for.
    pub jam_duration_ticks: usize,
    /// The simulation parameters.
    pub config: SimulationConfig,
}

impl Default for ExperimentParams {
    fn default() -> Self {
        // 30 s runs with a 2 s jam after 5 s, at 60 ticks per second
        Self {
            runs: 100,
            seed_start: 0,
            duration_ticks: 1800,
            jam_at_tick: 300,
            jam_duration_ticks: 120,
            config: SimulationConfig::default(),
        }
    }
}

/// The outcome of a single run.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunSummary {
    /// The seed of the run.
    pub seed: u64,
    /// The ring index of the vehicle that was stopped.
    pub jammed: usize,
    /// The number of vehicles that had to brake.
    pub affected: usize,
    /// The number of vehicles on the ring.
    pub total: usize,
    /// Whether any vehicles overlapped.
    pub collided: bool,
    /// The lowest average speed from the jam onwards.
    pub min_average_speed: f64,
    /// The average speed after the last tick.
    pub final_average_speed: f64,
}

/// Summary statistics over the runs of an experiment.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExperimentSummary {
    /// The number of runs.
    pub runs: usize,
    /// The number of runs in which vehicles overlapped.
    pub collisions: usize,
    /// The fraction of runs in which vehicles overlapped.
    pub collision_fraction: f64,
    /// The mean number of vehicles that had to brake.
    pub affected_mean: f64,
    /// The population standard deviation of the number of vehicles that had to brake.
    pub affected_std: f64,
}

/// A batch of seeded simulation runs.
#[derive(Clone, Debug)]
pub struct Experiment {
    params: ExperimentParams,
    runs: Vec<RunSummary>,
}

impl Experiment {
    /// Creates an experiment. No runs are performed until [run](Self::run) is called.
    pub fn new(params: ExperimentParams) -> Result<Self, ConfigError> {
        params.config.validate()?;
        Ok(Self {
            params,
            runs: vec![],
        })
    }

    /// Performs `runs` runs with consecutive seeds from `seed_start`, replacing the
    /// results of any previous call.
    pub fn run(&mut self) -> ExperimentSummary {
        let seeds = self.params.seed_start..self.params.seed_start + self.params.runs as u64;
        self.runs = seeds.map(|seed| run_single(&self.params, seed)).collect();
        self.report()
    }

    /// Performs one run for each of the given seeds, ignoring `runs` and `seed_start`.
    pub fn run_seeds(&mut self, seeds: &[u64]) -> ExperimentSummary {
        self.runs = seeds
            .iter()
            .map(|&seed| run_single(&self.params, seed))
            .collect();
        self.report()
    }

    fn report(&self) -> ExperimentSummary {
        let summary = self.summary();
        log::info!(
            "{} runs: {:.2} ± {:.2} vehicles affected, {} with collisions",
            summary.runs,
            summary.affected_mean,
            summary.affected_std,
            summary.collisions
        );
        summary
    }

    /// The results of the individual runs.
    pub fn runs(&self) -> &[RunSummary] {
        &self.runs
    }

    /// Summarises the results of the individual runs.
    pub fn summary(&self) -> ExperimentSummary {
        ExperimentSummary::from_runs(&self.runs)
    }

    /// Runs the experiment once for every safe distance given.
    pub fn sweep_safe_distance(
        params: ExperimentParams,
        distances: &[f64],
    ) -> Result<Vec<(f64, ExperimentSummary)>, ConfigError> {
        distances
            .iter()
            .map(|&distance| -> Result<_, ConfigError> {
                let config = params.config.with_safe_distance(distance);
                let mut experiment = Self::new(ExperimentParams { config, ..params })?;
                Ok((distance, experiment.run()))
            })
            .collect()
    }
}

impl ExperimentSummary {
    /// Summarises a set of runs.
    pub fn from_runs(runs: &[RunSummary]) -> Self {
        if runs.is_empty() {
            return Self::default();
        }
        let count = runs.len() as f64;
        let collisions = runs.iter().filter(|run| run.collided).count();
        let affected_mean = runs.iter().map(|run| run.affected as f64).sum::<f64>() / count;
        let variance = runs
            .iter()
            .map(|run| (run.affected as f64 - affected_mean).powi(2))
            .sum::<f64>()
            / count;
        Self {
            runs: runs.len(),
            collisions,
            collision_fraction: collisions as f64 / count,
            affected_mean,
            affected_std: variance.sqrt(),
        }
    }
}

/// Performs one run of an experiment.
fn run_single(params: &ExperimentParams, seed: u64) -> RunSummary {
    let config = &params.config;
    let mut ring = Ring::new(config);
    let mut rng = StdRng::seed_from_u64(seed);
    let jammed = rng.gen_range(0..ring.len());
    let target = ring
        .vehicle_at(jammed)
        .map(Vehicle::id)
        .expect("Ring is never empty");
    let release_at = params.jam_at_tick + params.jam_duration_ticks;

    let mut stats = ring.stats();
    let mut min_average_speed = f64::INFINITY;
    for tick in 0..params.duration_ticks {
        if tick == params.jam_at_tick {
            ring.force_stop(target);
        }
        if tick == release_at {
            ring.release(target);
        }
        stats = ring.tick(config);
        if tick >= params.jam_at_tick {
            min_average_speed = f64::min(min_average_speed, stats.average_speed);
        }
    }

    RunSummary {
        seed,
        jammed,
        affected: ring.affected_count(),
        total: ring.len(),
        collided: ring.any_collided(),
        min_average_speed: if min_average_speed.is_finite() {
            min_average_speed
        } else {
            stats.average_speed
        },
        final_average_speed: stats.average_speed,
    }
}
