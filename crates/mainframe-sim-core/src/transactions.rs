//! Per-service transaction counts and log-normal response times.

use rand::Rng;
use rand_distr::{Distribution, LogNormal};

use crate::catalog::Service;
use crate::error::{Result, SimError};

/// Every service reports at least this many transactions per tick.
pub const MIN_TRANSACTIONS_PER_TICK: u64 = 10;

/// Job-queue depth at which response times double.
pub const QUEUE_PRESSURE_DEPTH: f64 = 400.0;

/// Interval length the base rates are expressed against, in seconds.
const RATE_UNIT_SECS: f64 = 5.0;

/// Latencies sampled for one service during one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionBatch {
    pub service: Service,
    /// One entry per transaction, in seconds.
    pub latencies: Vec<f64>,
}

impl TransactionBatch {
    pub fn count(&self) -> usize {
        self.latencies.len()
    }
}

/// `1 + depth / 400`.
pub fn queue_pressure(job_queue_depth: f64) -> f64 {
    1.0 + job_queue_depth / QUEUE_PRESSURE_DEPTH
}

/// `max(10, round(base × (0.5 + cpu/200) × U[0.8, 1.3) × interval / 5))`.
pub fn transaction_count<R: Rng + ?Sized>(
    rng: &mut R,
    service: Service,
    cpu_percent: f64,
    interval_secs: f64,
) -> u64 {
    let tps = service.base_rate() * (0.5 + cpu_percent / 200.0) * rng.random_range(0.8..1.3);
    let count = (tps * interval_secs / RATE_UNIT_SECS).round();
    // Saturating float-to-int cast; inputs are guarded finite upstream.
    (count as u64).max(MIN_TRANSACTIONS_PER_TICK)
}

/// Holds one log-normal distribution per catalog service.
#[derive(Debug, Clone)]
pub struct TransactionSampler {
    profiles: Vec<(Service, LogNormal<f64>)>,
}

impl TransactionSampler {
    pub fn new() -> Result<Self> {
        let profiles = Service::ALL
            .iter()
            .map(|&service| {
                let (mu, sigma) = service.latency_profile();
                LogNormal::new(mu, sigma)
                    .map(|dist| (service, dist))
                    .map_err(|e| SimError::Distribution(format!("{service}: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { profiles })
    }

    /// Sample every service in catalog order.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        cpu_percent: f64,
        job_queue_depth: f64,
        interval_secs: f64,
    ) -> Result<Vec<TransactionBatch>> {
        guard("cpu_percent", cpu_percent)?;
        guard("job_queue_depth", job_queue_depth)?;
        guard("interval_secs", interval_secs)?;

        Ok(self
            .profiles
            .iter()
            .map(|(service, dist)| {
                sample_batch(rng, *service, dist, cpu_percent, job_queue_depth, interval_secs)
            })
            .collect())
    }

    /// Sample a single service.
    pub fn sample_service<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        service: Service,
        cpu_percent: f64,
        job_queue_depth: f64,
        interval_secs: f64,
    ) -> Result<TransactionBatch> {
        guard("cpu_percent", cpu_percent)?;
        guard("job_queue_depth", job_queue_depth)?;
        guard("interval_secs", interval_secs)?;

        let (_, dist) = self
            .profiles
            .iter()
            .find(|(s, _)| *s == service)
            .ok_or_else(|| SimError::Distribution(format!("no profile for {service}")))?;
        Ok(sample_batch(
            rng,
            service,
            dist,
            cpu_percent,
            job_queue_depth,
            interval_secs,
        ))
    }
}

fn sample_batch<R: Rng + ?Sized>(
    rng: &mut R,
    service: Service,
    dist: &LogNormal<f64>,
    cpu_percent: f64,
    job_queue_depth: f64,
    interval_secs: f64,
) -> TransactionBatch {
    let count = transaction_count(rng, service, cpu_percent, interval_secs);
    let pressure = queue_pressure(job_queue_depth);
    let latencies = (0..count).map(|_| dist.sample(rng) * pressure).collect();
    TransactionBatch { service, latencies }
}

fn guard(what: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimError::NonFiniteInput { what, value })
    }
}
