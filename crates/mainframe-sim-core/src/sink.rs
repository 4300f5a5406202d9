//! The boundary between the simulation and whatever exposes its values.
//!
//! The driver only ever hands the sink copies of computed values. Sinks must
//! tolerate calls from multiple threads; the HTTP exporter reads the same
//! registry the driver writes.

use std::sync::{Mutex, PoisonError};

use serde::Serialize;

use crate::catalog::{AddressSpace, Service};

/// Label tuple shared by every series: `(lpar, sysplex)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LparLabels<'a> {
    pub lpar: &'a str,
    pub sysplex: &'a str,
}

/// Per-LPAR gauges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LparGauge {
    CpuPercent,
    ZiipPercent,
    MipsConsumed,
    IoOpsPerSec,
    MemoryTotalBytes,
    MemoryUsedBytes,
    JobQueueDepth,
    CfQueueDepth,
    UptimeSeconds,
}

impl LparGauge {
    pub const ALL: [LparGauge; 9] = [
        Self::CpuPercent,
        Self::ZiipPercent,
        Self::MipsConsumed,
        Self::IoOpsPerSec,
        Self::MemoryTotalBytes,
        Self::MemoryUsedBytes,
        Self::JobQueueDepth,
        Self::CfQueueDepth,
        Self::UptimeSeconds,
    ];

    /// Exposition series name.
    pub fn metric_name(self) -> &'static str {
        match self {
            Self::CpuPercent => "mainframe_cpu_utilization_percent",
            Self::ZiipPercent => "mainframe_ziip_utilization_percent",
            Self::MipsConsumed => "mainframe_mips_consumed",
            Self::IoOpsPerSec => "mainframe_io_ops_per_sec",
            Self::MemoryTotalBytes => "mainframe_memory_total_bytes",
            Self::MemoryUsedBytes => "mainframe_memory_used_bytes",
            Self::JobQueueDepth => "mainframe_job_queue_depth",
            Self::CfQueueDepth => "mainframe_cf_queue_depth",
            Self::UptimeSeconds => "mainframe_uptime_seconds",
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            Self::CpuPercent => "Simulated z/OS CPU utilization percentage by LPAR",
            Self::ZiipPercent => "Simulated zIIP utilization percentage by LPAR",
            Self::MipsConsumed => "Simulated MIPS consumed by LPAR",
            Self::IoOpsPerSec => "Simulated I/O operations per second",
            Self::MemoryTotalBytes => "Simulated total memory (bytes) assigned to the LPAR",
            Self::MemoryUsedBytes => "Simulated used memory (bytes) in the LPAR",
            Self::JobQueueDepth => "Simulated JES job queue depth",
            Self::CfQueueDepth => "Simulated coupling facility queue depth (sysplex health proxy)",
            Self::UptimeSeconds => "Simulated uptime since exporter start (seconds)",
        }
    }
}

/// Per-address-space gauges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressSpaceGauge {
    CpuPercent,
    RssBytes,
}

impl AddressSpaceGauge {
    pub const ALL: [AddressSpaceGauge; 2] = [Self::CpuPercent, Self::RssBytes];

    pub fn metric_name(self) -> &'static str {
        match self {
            Self::CpuPercent => "mainframe_address_space_cpu_percent",
            Self::RssBytes => "mainframe_address_space_rss_bytes",
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            Self::CpuPercent => "Simulated CPU% by address space",
            Self::RssBytes => "Simulated resident memory (RSS) by address space",
        }
    }
}

/// Transaction histogram series.
pub const TRANSACTION_LATENCY_METRIC: &str = "mainframe_transaction_response_seconds";
pub const TRANSACTION_LATENCY_HELP: &str = "Simulated transaction response time (seconds)";
/// Transaction counter series.
pub const TRANSACTION_COUNT_METRIC: &str = "mainframe_transactions_total";
pub const TRANSACTION_COUNT_HELP: &str = "Simulated number of transactions processed";

/// Receiver for everything the driver publishes.
pub trait MetricSink: Send + Sync {
    fn set_lpar_gauge(&self, labels: LparLabels<'_>, gauge: LparGauge, value: f64);

    fn set_address_space_gauge(
        &self,
        labels: LparLabels<'_>,
        address_space: AddressSpace,
        gauge: AddressSpaceGauge,
        value: f64,
    );

    /// One completed transaction: a latency observation plus a count of one.
    fn record_transaction(&self, labels: LparLabels<'_>, service: Service, latency_seconds: f64);
}

impl<S: MetricSink + ?Sized> MetricSink for std::sync::Arc<S> {
    fn set_lpar_gauge(&self, labels: LparLabels<'_>, gauge: LparGauge, value: f64) {
        (**self).set_lpar_gauge(labels, gauge, value);
    }

    fn set_address_space_gauge(
        &self,
        labels: LparLabels<'_>,
        address_space: AddressSpace,
        gauge: AddressSpaceGauge,
        value: f64,
    ) {
        (**self).set_address_space_gauge(labels, address_space, gauge, value);
    }

    fn record_transaction(&self, labels: LparLabels<'_>, service: Service, latency_seconds: f64) {
        (**self).record_transaction(labels, service, latency_seconds);
    }
}

// ---------------------------------------------------------------------------
// In-memory sink
// ---------------------------------------------------------------------------

/// One value handed to a sink, in emission order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Emission {
    LparGauge {
        lpar: String,
        sysplex: String,
        gauge: LparGauge,
        value: f64,
    },
    AddressSpaceGauge {
        lpar: String,
        sysplex: String,
        address_space: AddressSpace,
        gauge: AddressSpaceGauge,
        value: f64,
    },
    Transaction {
        lpar: String,
        sysplex: String,
        service: Service,
        latency_seconds: f64,
    },
}

/// Sink that keeps every emission, for tests and offline snapshots.
#[derive(Debug, Default)]
pub struct RecordingSink {
    emissions: Mutex<Vec<Emission>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, emission: Emission) {
        self.emissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(emission);
    }

    /// Copy of everything recorded so far.
    pub fn emissions(&self) -> Vec<Emission> {
        self.emissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drain and return everything recorded so far.
    pub fn take(&self) -> Vec<Emission> {
        std::mem::take(&mut *self.emissions.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Most recent value of a per-LPAR gauge.
    pub fn last_lpar_gauge(&self, lpar: &str, gauge: LparGauge) -> Option<f64> {
        self.emissions().into_iter().rev().find_map(|e| match e {
            Emission::LparGauge {
                lpar: l,
                gauge: g,
                value,
                ..
            } if l == lpar && g == gauge => Some(value),
            _ => None,
        })
    }

    /// All latencies recorded for one LPAR and service.
    pub fn latencies(&self, lpar: &str, service: Service) -> Vec<f64> {
        self.emissions()
            .into_iter()
            .filter_map(|e| match e {
                Emission::Transaction {
                    lpar: l,
                    service: s,
                    latency_seconds,
                    ..
                } if l == lpar && s == service => Some(latency_seconds),
                _ => None,
            })
            .collect()
    }
}

impl MetricSink for RecordingSink {
    fn set_lpar_gauge(&self, labels: LparLabels<'_>, gauge: LparGauge, value: f64) {
        self.push(Emission::LparGauge {
            lpar: labels.lpar.to_string(),
            sysplex: labels.sysplex.to_string(),
            gauge,
            value,
        });
    }

    fn set_address_space_gauge(
        &self,
        labels: LparLabels<'_>,
        address_space: AddressSpace,
        gauge: AddressSpaceGauge,
        value: f64,
    ) {
        self.push(Emission::AddressSpaceGauge {
            lpar: labels.lpar.to_string(),
            sysplex: labels.sysplex.to_string(),
            address_space,
            gauge,
            value,
        });
    }

    fn record_transaction(&self, labels: LparLabels<'_>, service: Service, latency_seconds: f64) {
        self.push(Emission::Transaction {
            lpar: labels.lpar.to_string(),
            sysplex: labels.sysplex.to_string(),
            service,
            latency_seconds,
        });
    }
}
