//! Quantities derived from an LPAR's walk state rather than walked directly.
//!
//! Address-space shares are not renormalized after noise and
//! clamping: the per-address-space sum tracks the LPAR total only roughly.

use std::time::Duration;

use rand::Rng;

use crate::catalog::AddressSpace;

/// Exponent applied to uniform weights to skew CPU toward a few address spaces.
pub const WEIGHT_SKEW: f64 = 1.8;

/// Per-address-space values for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AddressSpaceUsage {
    pub address_space: AddressSpace,
    pub cpu_percent: f64,
    pub rss_bytes: f64,
}

/// `capacity × cpu% × U[0.85, 1.15)`. May exceed capacity.
pub fn mips_consumed<R: Rng + ?Sized>(rng: &mut R, mips_capacity: u32, cpu_percent: f64) -> f64 {
    f64::from(mips_capacity) * (cpu_percent / 100.0) * rng.random_range(0.85..1.15)
}

/// Split LPAR CPU and memory across the address-space catalog.
///
/// All ten weights are drawn first, then each address space draws its CPU
/// multiplier followed by its RSS multiplier.
pub fn address_space_usage<R: Rng + ?Sized>(
    rng: &mut R,
    cpu_percent: f64,
    memory_used_bytes: f64,
) -> Vec<AddressSpaceUsage> {
    let weights: Vec<f64> = AddressSpace::ALL
        .iter()
        .map(|_| rng.random::<f64>().powf(WEIGHT_SKEW))
        .collect();
    let sum: f64 = weights.iter().sum();
    let sum = if sum > 0.0 { sum } else { 1.0 };
    let per_space_memory = memory_used_bytes / AddressSpace::ALL.len() as f64;

    AddressSpace::ALL
        .iter()
        .zip(weights)
        .map(|(&address_space, w)| {
            let share = cpu_percent * (w / sum) * rng.random_range(0.7..1.3);
            let rss_bytes = per_space_memory * rng.random_range(0.6..1.6);
            AddressSpaceUsage {
                address_space,
                cpu_percent: share.clamp(0.0, 100.0),
                rss_bytes,
            }
        })
        .collect()
}

/// Seconds since the driver's first tick.
pub fn uptime_seconds(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64()
}
