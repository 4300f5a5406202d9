//! # mainframe-sim-core
//!
//! **Plausible z/OS telemetry without a mainframe.**
//!
//! `mainframe-sim-core` fabricates temporally correlated metrics for a set of
//! simulated logical partitions (LPARs): CPU, zIIP, MIPS, I/O, memory, JES and
//! coupling-facility queue depths, per-address-space CPU/RSS and per-service
//! transaction latency.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use mainframe_sim_core::{RecordingSink, Simulation, SimulationConfig};
//!
//! let config = SimulationConfig::from_csv("LPAR1,LPAR2", "PLEX1", 5.0, 42).unwrap();
//! let mut sim = Simulation::new(config).unwrap();
//! let sink = RecordingSink::new();
//!
//! sim.publish_static(&sink);
//! let summary = sim.tick(&sink, Duration::ZERO).unwrap();
//! println!("{} transactions across {} LPARs", summary.transactions, summary.lpars);
//! ```
//!
//! ## Architecture
//!
//! Config → State Store → (Walk → Derived → Transactions) per tick → Sink
//!
//! - [`walk`]: bounded, linearly mean-reverting random walk.
//! - [`state`]: per-LPAR state, provisioned from fixed catalogs.
//! - [`derived`]: MIPS, address-space shares, uptime.
//! - [`transactions`]: per-service counts and log-normal latencies.
//! - [`driver`]: the tick function and the async fixed-delay loop.
//! - [`sink`]: the [`MetricSink`] trait the exporter implements.
//!
//! Every random draw comes from one seeded [`rand::rngs::StdRng`] in a fixed
//! order, so two runs with the same configuration emit identical values.

pub mod catalog;
pub mod config;
pub mod derived;
pub mod driver;
pub mod error;
pub mod sink;
pub mod state;
pub mod transactions;
pub mod walk;

pub use catalog::{
    AddressSpace, GIB, LATENCY_BUCKETS, MEMORY_TIERS_GIB, MIPS_CAPACITIES, Service,
};
pub use config::{SimulationConfig, parse_lpar_list};
pub use derived::{AddressSpaceUsage, address_space_usage, mips_consumed, uptime_seconds};
pub use driver::{Simulation, TickSummary, run};
pub use error::{ConfigError, Result, SimError};
pub use sink::{
    AddressSpaceGauge, Emission, LparGauge, LparLabels, MetricSink, RecordingSink,
    TRANSACTION_COUNT_HELP, TRANSACTION_COUNT_METRIC, TRANSACTION_LATENCY_HELP,
    TRANSACTION_LATENCY_METRIC,
};
pub use state::{LparState, LparStore};
pub use transactions::{
    MIN_TRANSACTIONS_PER_TICK, TransactionBatch, TransactionSampler, queue_pressure,
    transaction_count,
};
pub use walk::{Bounds, RandomWalk};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
