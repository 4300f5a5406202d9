//! Per-LPAR walk state and the store that owns it.
//!
//! The store only initializes and hands out state; all evolution happens in
//! the driver through [`crate::walk`].

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::catalog::{GIB, MEMORY_TIERS_GIB, MIPS_CAPACITIES};
use crate::config::SimulationConfig;
use crate::error::{Result, SimError};
use crate::walk::{Bounds, RandomWalk};

/// Lower and upper fractions of total memory that `memory_used_bytes` walks between.
pub const MEMORY_USED_FLOOR: f64 = 0.30;
pub const MEMORY_USED_CEILING: f64 = 0.97;

pub const PERCENT_BOUNDS: (f64, f64) = (0.0, 100.0);
pub const IOPS_BOUNDS: (f64, f64) = (0.0, 8000.0);
pub const JOB_QUEUE_BOUNDS: (f64, f64) = (0.0, 200.0);
pub const CF_QUEUE_BOUNDS: (f64, f64) = (0.0, 80.0);

/// Walk parameters for every scalar the driver advances each tick.
#[derive(Debug, Clone, Copy)]
pub struct WalkTable {
    pub cpu: RandomWalk,
    pub ziip: RandomWalk,
    pub iops: RandomWalk,
    pub job_queue: RandomWalk,
    pub cf_queue: RandomWalk,
    /// Noise range for memory drift in bytes; bounds depend on the LPAR.
    pub memory_drift: (f64, f64),
}

impl WalkTable {
    pub fn standard() -> Result<Self> {
        let percent = Bounds::new(PERCENT_BOUNDS.0, PERCENT_BOUNDS.1)?;
        Ok(Self {
            cpu: RandomWalk::reverting((-6.0, 6.0), 35.0, 0.03, percent),
            ziip: RandomWalk::reverting((-6.0, 6.0), 25.0, 0.03, percent),
            iops: RandomWalk::unanchored(
                (-250.0, 250.0),
                Bounds::new(IOPS_BOUNDS.0, IOPS_BOUNDS.1)?,
            ),
            job_queue: RandomWalk::unanchored(
                (-3.0, 3.0),
                Bounds::new(JOB_QUEUE_BOUNDS.0, JOB_QUEUE_BOUNDS.1)?,
            ),
            cf_queue: RandomWalk::reverting(
                (-2.0, 2.0),
                10.0,
                0.02,
                Bounds::new(CF_QUEUE_BOUNDS.0, CF_QUEUE_BOUNDS.1)?,
            ),
            memory_drift: (-0.7 * GIB, 0.9 * GIB),
        })
    }
}

/// Mutable state of one logical partition.
///
/// `memory_total_bytes` and `mips_capacity` are fixed at creation and only
/// readable; the walked scalars are public so the driver (and tests) can
/// drive them directly.
#[derive(Debug, Clone, PartialEq)]
pub struct LparState {
    id: String,
    memory_total_bytes: u64,
    mips_capacity: u32,
    pub cpu_percent: f64,
    pub ziip_percent: f64,
    pub iops: f64,
    pub job_queue_depth: f64,
    pub cf_queue_depth: f64,
    pub memory_used_bytes: f64,
}

impl LparState {
    /// Draw a fresh LPAR from the provisioning catalogs.
    ///
    /// Draw order is fixed: memory tier, memory fraction, CPU, zIIP, MIPS
    /// rating, I/O, job queue, CF queue.
    pub fn provision<R: Rng + ?Sized>(id: impl Into<String>, rng: &mut R) -> Self {
        let tier_gib = *MEMORY_TIERS_GIB
            .choose(rng)
            .unwrap_or(&MEMORY_TIERS_GIB[0]);
        let memory_total_bytes = tier_gib * 1024 * 1024 * 1024;
        let memory_used_bytes = memory_total_bytes as f64 * rng.random_range(0.45..0.75);
        let cpu_percent = rng.random_range(10.0..70.0);
        let ziip_percent = rng.random_range(5.0..60.0);
        let mips_capacity = *MIPS_CAPACITIES.choose(rng).unwrap_or(&MIPS_CAPACITIES[0]);
        let iops = rng.random_range(500.0..3500.0);
        let job_queue_depth = rng.random_range(0.0..40.0);
        let cf_queue_depth = rng.random_range(1.0..20.0);

        Self {
            id: id.into(),
            memory_total_bytes,
            mips_capacity,
            cpu_percent,
            ziip_percent,
            iops,
            job_queue_depth,
            cf_queue_depth,
            memory_used_bytes,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn memory_total_bytes(&self) -> u64 {
        self.memory_total_bytes
    }

    pub fn mips_capacity(&self) -> u32 {
        self.mips_capacity
    }

    /// `[0.30 × total, 0.97 × total]`.
    pub fn memory_bounds(&self) -> Result<Bounds> {
        let total = self.memory_total_bytes as f64;
        Bounds::new(total * MEMORY_USED_FLOOR, total * MEMORY_USED_CEILING)
    }

    /// Verify every walked scalar is finite and inside its declared interval.
    pub fn check_invariants(&self) -> Result<()> {
        let memory = self.memory_bounds()?;
        let checks = [
            ("cpu_percent", self.cpu_percent, PERCENT_BOUNDS),
            ("ziip_percent", self.ziip_percent, PERCENT_BOUNDS),
            ("iops", self.iops, IOPS_BOUNDS),
            ("job_queue_depth", self.job_queue_depth, JOB_QUEUE_BOUNDS),
            ("cf_queue_depth", self.cf_queue_depth, CF_QUEUE_BOUNDS),
            (
                "memory_used_bytes",
                self.memory_used_bytes,
                (memory.lo(), memory.hi()),
            ),
        ];
        for (field, value, (lo, hi)) in checks {
            if !(value >= lo && value <= hi) {
                return Err(SimError::InvariantViolated {
                    lpar: self.id.clone(),
                    field,
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Exclusive owner of every LPAR's state, in configuration order.
#[derive(Debug, Clone, PartialEq)]
pub struct LparStore {
    lpars: Vec<LparState>,
}

impl LparStore {
    pub fn initialize<R: Rng + ?Sized>(config: &SimulationConfig, rng: &mut R) -> Self {
        let lpars = config
            .lpars()
            .iter()
            .map(|id| LparState::provision(id.as_str(), rng))
            .collect();
        Self { lpars }
    }

    pub fn len(&self) -> usize {
        self.lpars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lpars.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&LparState> {
        self.lpars.iter().find(|l| l.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut LparState> {
        self.lpars.iter_mut().find(|l| l.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LparState> {
        self.lpars.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, LparState> {
        self.lpars.iter_mut()
    }
}
