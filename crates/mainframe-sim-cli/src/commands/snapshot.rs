use std::process;

use log::error;

use mainframe_sim_core::{MetricSink, RecordingSink, Simulation, SimulationConfig};
use mainframe_sim_server::PrometheusSink;

use super::SimArgs;

pub fn run(args: &SimArgs, ticks: u64, format: &str) {
    let config = super::build_config(args, None);

    let output = if format == "json" {
        let sink = RecordingSink::new();
        simulate(config, ticks, &sink);
        serde_json::to_string_pretty(&sink.emissions()).map_err(|e| e.to_string())
    } else {
        match PrometheusSink::new() {
            Ok(sink) => {
                simulate(config, ticks, &sink);
                sink.render().map_err(|e| e.to_string())
            }
            Err(e) => Err(e.to_string()),
        }
    };

    match output {
        Ok(text) => println!("{text}"),
        Err(e) => {
            error!("failed to render snapshot: {e}");
            process::exit(1);
        }
    }
}

/// Tick `ticks` times without sleeping; tick `i` reports `i * interval` uptime.
fn simulate<S: MetricSink>(config: SimulationConfig, ticks: u64, sink: &S) {
    let interval = config.interval();
    let mut sim = match Simulation::new(config) {
        Ok(sim) => sim,
        Err(e) => {
            error!("failed to initialize simulation: {e}");
            process::exit(1);
        }
    };

    sim.publish_static(sink);
    for i in 0..ticks {
        let uptime = interval.mul_f64(i as f64);
        if let Err(e) = sim.tick(sink, uptime) {
            error!("simulation stopped at tick {}: {e}", i + 1);
            process::exit(1);
        }
    }
}
