//! The simulation loop.
//!
//! [`Simulation::new`] is the one-shot initialization: seed the RNG, provision
//! every LPAR, build the latency distributions. [`run`] is the running state:
//! publish static gauges, tick immediately, then sleep a fixed delay between
//! ticks until the shutdown future resolves (or a configured tick limit is
//! reached).
//!
//! A tick is synchronous and depends only on the RNG state and the uptime it
//! is given, so [`Simulation::tick`] can also be driven offline.

use std::future::Future;
use std::time::Duration;

use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::time::Instant;

use crate::config::SimulationConfig;
use crate::derived::{address_space_usage, mips_consumed, uptime_seconds};
use crate::error::Result;
use crate::sink::{AddressSpaceGauge, LparGauge, LparLabels, MetricSink};
use crate::state::{LparState, LparStore, WalkTable};
use crate::transactions::TransactionSampler;
use crate::walk::RandomWalk;

/// What one tick produced, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummary {
    /// 1-based tick number.
    pub tick: u64,
    pub lpars: usize,
    pub transactions: u64,
}

/// Owned simulation state: configuration, LPAR store and RNG.
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    store: LparStore,
    walks: WalkTable,
    sampler: TransactionSampler,
    rng: StdRng,
    ticks: u64,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(config.seed());
        let store = LparStore::initialize(&config, &mut rng);
        let walks = WalkTable::standard()?;
        let sampler = TransactionSampler::new()?;
        for lpar in store.iter() {
            lpar.check_invariants()?;
            debug!(
                "provisioned {}: {} GiB, {} MIPS",
                lpar.id(),
                lpar.memory_total_bytes() >> 30,
                lpar.mips_capacity()
            );
        }

        Ok(Self {
            config,
            store,
            walks,
            sampler,
            rng,
            ticks: 0,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn store(&self) -> &LparStore {
        &self.store
    }

    /// Direct access to LPAR state between ticks.
    pub fn store_mut(&mut self) -> &mut LparStore {
        &mut self.store
    }

    /// Ticks completed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Publish values that never change after initialization.
    pub fn publish_static<S: MetricSink + ?Sized>(&self, sink: &S) {
        for lpar in self.store.iter() {
            sink.set_lpar_gauge(
                self.labels(lpar),
                LparGauge::MemoryTotalBytes,
                lpar.memory_total_bytes() as f64,
            );
        }
    }

    /// Advance every LPAR one step and publish the results.
    pub fn tick<S: MetricSink + ?Sized>(
        &mut self,
        sink: &S,
        uptime: Duration,
    ) -> Result<TickSummary> {
        let interval_secs = self.config.interval_secs();
        let sysplex = self.config.sysplex();
        let uptime = uptime_seconds(uptime);
        let mut transactions = 0;

        for lpar in self.store.iter_mut() {
            advance(lpar, &self.walks, &mut self.rng);
            let mips = mips_consumed(&mut self.rng, lpar.mips_capacity(), lpar.cpu_percent);
            let memory = RandomWalk::unanchored(self.walks.memory_drift, lpar.memory_bounds()?);
            lpar.memory_used_bytes = memory.step(&mut self.rng, lpar.memory_used_bytes);
            lpar.check_invariants()?;

            let labels = LparLabels {
                lpar: lpar.id(),
                sysplex,
            };

            sink.set_lpar_gauge(labels, LparGauge::CpuPercent, lpar.cpu_percent);
            sink.set_lpar_gauge(labels, LparGauge::ZiipPercent, lpar.ziip_percent);
            sink.set_lpar_gauge(labels, LparGauge::MipsConsumed, mips);
            sink.set_lpar_gauge(labels, LparGauge::IoOpsPerSec, lpar.iops);
            sink.set_lpar_gauge(labels, LparGauge::MemoryUsedBytes, lpar.memory_used_bytes);
            sink.set_lpar_gauge(labels, LparGauge::JobQueueDepth, lpar.job_queue_depth);
            sink.set_lpar_gauge(labels, LparGauge::CfQueueDepth, lpar.cf_queue_depth);
            sink.set_lpar_gauge(labels, LparGauge::UptimeSeconds, uptime);

            let usages = address_space_usage(&mut self.rng, lpar.cpu_percent, lpar.memory_used_bytes);
            for usage in usages {
                sink.set_address_space_gauge(
                    labels,
                    usage.address_space,
                    AddressSpaceGauge::CpuPercent,
                    usage.cpu_percent,
                );
                sink.set_address_space_gauge(
                    labels,
                    usage.address_space,
                    AddressSpaceGauge::RssBytes,
                    usage.rss_bytes,
                );
            }

            let batches = self.sampler.sample(
                &mut self.rng,
                lpar.cpu_percent,
                lpar.job_queue_depth,
                interval_secs,
            )?;
            for batch in batches {
                transactions += batch.count() as u64;
                for latency in batch.latencies {
                    sink.record_transaction(labels, batch.service, latency);
                }
            }
        }

        self.ticks += 1;
        Ok(TickSummary {
            tick: self.ticks,
            lpars: self.store.len(),
            transactions,
        })
    }

    fn labels<'a>(&'a self, lpar: &'a LparState) -> LparLabels<'a> {
        LparLabels {
            lpar: lpar.id(),
            sysplex: self.config.sysplex(),
        }
    }
}

/// Walk the utilization and queue scalars of one LPAR, in fixed draw order.
fn advance(lpar: &mut LparState, walks: &WalkTable, rng: &mut StdRng) {
    lpar.cpu_percent = walks.cpu.step(rng, lpar.cpu_percent);
    lpar.ziip_percent = walks.ziip.step(rng, lpar.ziip_percent);
    lpar.iops = walks.iops.step(rng, lpar.iops);
    lpar.job_queue_depth = walks.job_queue.step(rng, lpar.job_queue_depth);
    lpar.cf_queue_depth = walks.cf_queue.step(rng, lpar.cf_queue_depth);
}

/// Run the simulation until `shutdown` resolves or the tick limit is reached.
///
/// Scheduling is fixed-delay: the interval is slept after each tick finishes,
/// so a slow tick delays the next one instead of causing a burst. Returns the
/// number of ticks completed.
pub async fn run<S, F>(sim: &mut Simulation, sink: &S, shutdown: F) -> Result<u64>
where
    S: MetricSink + ?Sized,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let interval = sim.config().interval();
    let limit = sim.config().max_ticks();
    let started = Instant::now();

    info!(
        "simulating {} LPAR(s) in sysplex {} every {:.3}s (seed {})",
        sim.store().len(),
        sim.config().sysplex(),
        interval.as_secs_f64(),
        sim.config().seed()
    );
    sim.publish_static(sink);

    loop {
        let tick_started = Instant::now();
        let summary = sim.tick(sink, started.elapsed())?;
        let spent = tick_started.elapsed();
        debug!(
            "tick {}: {} LPAR(s), {} transactions in {:?}",
            summary.tick, summary.lpars, summary.transactions, spent
        );
        if spent > interval {
            warn!(
                "tick {} took {:?}, longer than the {:?} interval; next tick delayed",
                summary.tick, spent, interval
            );
        }

        if limit.is_some_and(|n| summary.tick >= n) {
            info!("tick limit reached after {} ticks", summary.tick);
            break;
        }

        tokio::select! {
            () = &mut shutdown => {
                info!("shutdown requested after {} ticks", summary.tick);
                break;
            }
            () = tokio::time::sleep(interval) => {}
        }
    }

    Ok(sim.ticks())
}
