use std::time::Duration;

use phantom_jam::{
    Experiment, ExperimentParams, JamRelease, ManualClock, SimObserver, Simulation,
    SimulationConfig,
};

/// Simulated time per frame, at 60 frames per second.
const FRAME: Duration = Duration::from_micros(16_667);

struct Reporter;

impl SimObserver for Reporter {
    fn on_jam_released(&mut self, release: &JamRelease) {
        println!(
            "Vehicle {:?} released after {:?}",
            release.vehicle,
            release.released_at - release.triggered_at
        );
    }
}

fn main() {
    env_logger::init();

    let runs = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(100);

    let clock = ManualClock::new();
    let config = SimulationConfig::default().with_seed(42);
    let mut sim = Simulation::with_clock(config, clock.clone()).expect("Default config is valid");
    sim.set_observer(Reporter);

    println!("Simulating {} vehicles...", config.car_count);
    for frame in 0..1800 {
        if frame == 300 {
            match sim.trigger_jam() {
                Ok(id) => println!("Jammed vehicle {:?}", id),
                Err(err) => println!("Could not jam: {}", err),
            }
        }
        let stats = sim.step();
        clock.advance(FRAME);
        if frame % 60 == 0 {
            let spread = sim.ring().speed_spread();
            println!(
                "t={:>4.1}s  avg speed {:>5.2}  braking {:>2}  speeds {:.4}..{:.4}",
                clock.elapsed().as_secs_f32(),
                stats.average_speed,
                stats.braking_count,
                spread.min,
                spread.max,
            );
        }
    }

    println!("Running {} seeded experiments...", runs);
    let params = ExperimentParams {
        runs,
        ..Default::default()
    };
    let sweep = Experiment::sweep_safe_distance(params, &[0.15, 0.2, 0.25, 0.3, 0.35])
        .expect("Sweep distances are valid");
    println!("{:<15} {:<12} {:<20}", "Safe distance", "Collisions", "Affected vehicles");
    for (distance, summary) in sweep {
        println!(
            "{:<15.2} {:<12} {:.2} ± {:.2}",
            distance, summary.collisions, summary.affected_mean, summary.affected_std
        );
    }
}
