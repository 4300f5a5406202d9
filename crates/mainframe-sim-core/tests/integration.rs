//! Integration tests for mainframe-sim-core.
//!
//! These drive the full tick pipeline through a recording sink:
//! config → state store → walks → derived values → transactions → sink.

use std::time::Duration;

use mainframe_sim_core::{
    AddressSpaceGauge, Emission, LparGauge, MEMORY_TIERS_GIB, MIN_TRANSACTIONS_PER_TICK,
    RecordingSink, Service, SimError, Simulation, SimulationConfig, TransactionSampler,
    address_space_usage, mips_consumed, run, transaction_count,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use statrs::statistics::Statistics;

const GIB: u64 = 1 << 30;

fn config(lpars: &str, interval: f64, seed: u64) -> SimulationConfig {
    SimulationConfig::from_csv(lpars, "PLEX1", interval, seed).unwrap()
}

fn run_offline(cfg: SimulationConfig, ticks: u64) -> Vec<Emission> {
    let interval = cfg.interval();
    let mut sim = Simulation::new(cfg).unwrap();
    let sink = RecordingSink::new();
    sim.publish_static(&sink);
    for i in 0..ticks {
        sim.tick(&sink, interval * i as u32).unwrap();
    }
    sink.take()
}

#[test]
fn bounded_scalars_hold_over_many_ticks() {
    let mut sim = Simulation::new(config("SYSA,SYSB,SYSC", 5.0, 7)).unwrap();
    let sink = RecordingSink::new();
    for _ in 0..2000 {
        sim.tick(&sink, Duration::ZERO).unwrap();
        for lpar in sim.store().iter() {
            let total = lpar.memory_total_bytes() as f64;
            assert!((0.0..=100.0).contains(&lpar.cpu_percent));
            assert!((0.0..=100.0).contains(&lpar.ziip_percent));
            assert!((0.0..=8000.0).contains(&lpar.iops));
            assert!((0.0..=200.0).contains(&lpar.job_queue_depth));
            assert!((0.0..=80.0).contains(&lpar.cf_queue_depth));
            assert!((0.30 * total..=0.97 * total).contains(&lpar.memory_used_bytes));
        }
        // Keep the sink from growing without bound.
        sink.take();
    }
}

#[test]
fn memory_total_never_changes() {
    let mut sim = Simulation::new(config("LPAR1,LPAR2", 5.0, 3)).unwrap();
    let before: Vec<u64> = sim.store().iter().map(|l| l.memory_total_bytes()).collect();
    let sink = RecordingSink::new();
    for _ in 0..500 {
        sim.tick(&sink, Duration::ZERO).unwrap();
        sink.take();
    }
    let after: Vec<u64> = sim.store().iter().map(|l| l.memory_total_bytes()).collect();
    assert_eq!(before, after);
}

#[test]
fn same_seed_same_emissions() {
    let a = run_offline(config("LPAR1,LPAR2", 5.0, 42), 25);
    let b = run_offline(config("LPAR1,LPAR2", 5.0, 42), 25);
    assert!(!a.is_empty());
    assert_eq!(a, b);
}

#[test]
fn different_seed_different_emissions() {
    let a = run_offline(config("LPAR1", 5.0, 1), 3);
    let b = run_offline(config("LPAR1", 5.0, 2), 3);
    assert_ne!(a, b);
}

#[test]
fn memory_total_published_once_with_labels() {
    let emissions = run_offline(config("LPAR1,LPAR2", 5.0, 42), 10);
    let totals: Vec<&Emission> = emissions
        .iter()
        .filter(|e| {
            matches!(
                e,
                Emission::LparGauge {
                    gauge: LparGauge::MemoryTotalBytes,
                    ..
                }
            )
        })
        .collect();
    assert_eq!(totals.len(), 2);
    for e in totals {
        if let Emission::LparGauge { sysplex, value, .. } = e {
            assert_eq!(sysplex, "PLEX1");
            assert_eq!(*value as u64 % GIB, 0);
        }
    }
}

#[test]
fn every_series_emitted_each_tick() {
    let sink = RecordingSink::new();
    let mut sim = Simulation::new(config("LPAR1", 5.0, 5)).unwrap();
    let summary = sim.tick(&sink, Duration::ZERO).unwrap();
    let emissions = sink.take();

    let lpar_gauges = emissions
        .iter()
        .filter(|e| matches!(e, Emission::LparGauge { .. }))
        .count();
    let as_gauges = emissions
        .iter()
        .filter(|e| matches!(e, Emission::AddressSpaceGauge { .. }))
        .count();
    let transactions = emissions
        .iter()
        .filter(|e| matches!(e, Emission::Transaction { .. }))
        .count();

    // Every per-LPAR gauge except the static memory total.
    assert_eq!(lpar_gauges, 8);
    assert_eq!(as_gauges, 10 * 2);
    assert_eq!(transactions as u64, summary.transactions);
    assert_eq!(summary.tick, 1);
}

#[test]
fn mips_non_negative_and_tracks_cpu() {
    let mut rng = StdRng::seed_from_u64(99);
    let low: Vec<f64> = (0..2000)
        .map(|i| mips_consumed(&mut rng, 10_000, (i % 30) as f64))
        .collect();
    let high: Vec<f64> = (0..2000)
        .map(|i| mips_consumed(&mut rng, 10_000, 70.0 + (i % 30) as f64))
        .collect();
    assert!(low.iter().chain(&high).all(|&m| m >= 0.0));
    assert!(high.mean() > low.mean());
}

#[test]
fn emitted_mips_non_negative() {
    let emissions = run_offline(config("LPAR1,LPAR2", 5.0, 17), 200);
    for e in emissions {
        if let Emission::LparGauge {
            gauge: LparGauge::MipsConsumed,
            value,
            ..
        } = e
        {
            assert!(value >= 0.0);
        }
    }
}

#[test]
fn transaction_count_floor_across_cpu_range() {
    let mut rng = StdRng::seed_from_u64(5);
    for cpu in 0..=100 {
        for service in Service::ALL {
            for interval in [0.001, 0.5, 1.0, 5.0, 60.0] {
                let n = transaction_count(&mut rng, service, cpu as f64, interval);
                assert!(n >= MIN_TRANSACTIONS_PER_TICK);
            }
        }
    }
}

#[test]
fn latency_positive_and_grows_with_queue_depth() {
    let sampler = TransactionSampler::new().unwrap();
    let mut rng = StdRng::seed_from_u64(1234);
    let mut shallow = Vec::new();
    let mut deep = Vec::new();
    for _ in 0..200 {
        shallow.extend(
            sampler
                .sample_service(&mut rng, Service::Cics, 50.0, 0.0, 5.0)
                .unwrap()
                .latencies,
        );
        deep.extend(
            sampler
                .sample_service(&mut rng, Service::Cics, 50.0, 200.0, 5.0)
                .unwrap()
                .latencies,
        );
    }
    assert!(shallow.iter().chain(&deep).all(|&l| l > 0.0));
    assert!(deep.mean() > shallow.mean());
}

#[test]
fn invariant_violation_is_fatal() {
    let mut sim = Simulation::new(config("LPAR1", 5.0, 1)).unwrap();
    sim.store_mut().get_mut("LPAR1").unwrap().job_queue_depth = f64::NAN;
    let err = sim.tick(&RecordingSink::new(), Duration::ZERO).unwrap_err();
    assert!(matches!(
        err,
        SimError::InvariantViolated {
            field: "job_queue_depth",
            ..
        }
    ));
}

#[test]
fn invalid_config_refuses_to_start() {
    assert!(SimulationConfig::from_csv("", "PLEX1", 5.0, 42).is_err());
    assert!(SimulationConfig::from_csv("LPAR1", "PLEX1", 0.0, 42).is_err());
    assert!(SimulationConfig::from_csv("LPAR1", "PLEX1", 1e20, 42).is_err());
    assert!(SimulationConfig::from_csv("A,A", "PLEX1", 5.0, 42).is_err());
}

// ---------------------------------------------------------------------------
// End-to-end scenarios
// ---------------------------------------------------------------------------

#[test]
fn scenario_a_initial_state_from_catalogs() {
    let sim = Simulation::new(config("LPAR1", 5.0, 42)).unwrap();
    let lpar = sim.store().get("LPAR1").unwrap();
    assert_eq!(lpar.memory_total_bytes() % GIB, 0);
    assert!(MEMORY_TIERS_GIB.contains(&(lpar.memory_total_bytes() / GIB)));
    assert!((10.0..=70.0).contains(&lpar.cpu_percent));
}

#[tokio::test(start_paused = true)]
async fn scenario_b_uptime_tracks_ticks() {
    let cfg = config("LPAR1", 1.0, 42).with_max_ticks(Some(100));
    let mut sim = Simulation::new(cfg).unwrap();
    let sink = RecordingSink::new();

    let ticks = run(&mut sim, &sink, std::future::pending()).await.unwrap();
    assert_eq!(ticks, 100);

    let uptime = sink
        .last_lpar_gauge("LPAR1", LparGauge::UptimeSeconds)
        .unwrap();
    assert!((uptime - 100.0).abs() <= 1.0, "uptime {uptime}");
}

#[tokio::test(start_paused = true)]
async fn run_stops_on_shutdown() {
    let mut sim = Simulation::new(config("LPAR1", 5.0, 42)).unwrap();
    let sink = RecordingSink::new();
    let shutdown = tokio::time::sleep(Duration::from_secs(12));

    let ticks = run(&mut sim, &sink, shutdown).await.unwrap();
    // Ticks at t = 0, 5 and 10; shutdown fires during the third sleep.
    assert_eq!(ticks, 3);
}

#[test]
fn scenario_c_full_cpu_shares_clamped() {
    let mut rng = StdRng::seed_from_u64(42);
    for usage in address_space_usage(&mut rng, 100.0, 10.0 * GIB as f64) {
        assert!(usage.cpu_percent <= 100.0);
    }
}

#[test]
fn emitted_address_space_cpu_within_percent_range() {
    let mut sim = Simulation::new(config("LPAR1,LPAR2", 5.0, 42)).unwrap();
    let sink = RecordingSink::new();
    for _ in 0..50 {
        sim.tick(&sink, Duration::ZERO).unwrap();
    }
    for e in sink.take() {
        if let Emission::AddressSpaceGauge {
            gauge: AddressSpaceGauge::CpuPercent,
            value,
            ..
        } = e
        {
            assert!((0.0..=100.0).contains(&value));
        }
    }
}

#[test]
fn scenario_d_queue_depth_doubles_latency() {
    let sampler = TransactionSampler::new().unwrap();
    for service in Service::ALL {
        let idle = sampler
            .sample_service(&mut StdRng::seed_from_u64(42), service, 35.0, 0.0, 5.0)
            .unwrap();
        let saturated = sampler
            .sample_service(&mut StdRng::seed_from_u64(42), service, 35.0, 400.0, 5.0)
            .unwrap();
        assert_eq!(idle.count(), saturated.count());
        for (a, b) in idle.latencies.iter().zip(&saturated.latencies) {
            assert_eq!(*b, *a * 2.0);
        }
    }
}
