//! Prometheus registry implementing the simulator's [`MetricSink`].

use std::collections::HashMap;

use prometheus::{
    Encoder, GaugeVec, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

use mainframe_sim_core::{
    AddressSpace, AddressSpaceGauge, LATENCY_BUCKETS, LparGauge, LparLabels, MetricSink, Service,
    TRANSACTION_COUNT_HELP, TRANSACTION_COUNT_METRIC, TRANSACTION_LATENCY_HELP,
    TRANSACTION_LATENCY_METRIC,
};

use crate::ServerError;

const LPAR_LABELS: [&str; 2] = ["lpar", "sysplex"];
const ADDRESS_SPACE_LABELS: [&str; 3] = ["lpar", "sysplex", "address_space"];
const SERVICE_LABELS: [&str; 3] = ["lpar", "sysplex", "service"];

/// Every simulator series, registered on a private registry.
pub struct PrometheusSink {
    registry: Registry,
    lpar_gauges: HashMap<LparGauge, GaugeVec>,
    address_space_gauges: HashMap<AddressSpaceGauge, GaugeVec>,
    latency: HistogramVec,
    transactions: IntCounterVec,
}

impl PrometheusSink {
    /// Create and register all series.
    pub fn new() -> Result<Self, ServerError> {
        let registry = Registry::new();

        let mut lpar_gauges = HashMap::new();
        for gauge in LparGauge::ALL {
            let vec = GaugeVec::new(Opts::new(gauge.metric_name(), gauge.help()), &LPAR_LABELS)?;
            registry.register(Box::new(vec.clone()))?;
            lpar_gauges.insert(gauge, vec);
        }

        let mut address_space_gauges = HashMap::new();
        for gauge in AddressSpaceGauge::ALL {
            let vec = GaugeVec::new(
                Opts::new(gauge.metric_name(), gauge.help()),
                &ADDRESS_SPACE_LABELS,
            )?;
            registry.register(Box::new(vec.clone()))?;
            address_space_gauges.insert(gauge, vec);
        }

        let latency = HistogramVec::new(
            HistogramOpts::new(TRANSACTION_LATENCY_METRIC, TRANSACTION_LATENCY_HELP)
                .buckets(LATENCY_BUCKETS.to_vec()),
            &SERVICE_LABELS,
        )?;
        registry.register(Box::new(latency.clone()))?;

        let transactions = IntCounterVec::new(
            Opts::new(TRANSACTION_COUNT_METRIC, TRANSACTION_COUNT_HELP),
            &SERVICE_LABELS,
        )?;
        registry.register(Box::new(transactions.clone()))?;

        Ok(Self {
            registry,
            lpar_gauges,
            address_space_gauges,
            latency,
            transactions,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Content type of [`render`](Self::render) output.
    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }

    /// Prometheus text exposition of the current registry state.
    pub fn render(&self) -> Result<String, ServerError> {
        let encoder = TextEncoder::new();
        let families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

impl MetricSink for PrometheusSink {
    fn set_lpar_gauge(&self, labels: LparLabels<'_>, gauge: LparGauge, value: f64) {
        if let Some(vec) = self.lpar_gauges.get(&gauge) {
            vec.with_label_values(&[labels.lpar, labels.sysplex]).set(value);
        }
    }

    fn set_address_space_gauge(
        &self,
        labels: LparLabels<'_>,
        address_space: AddressSpace,
        gauge: AddressSpaceGauge,
        value: f64,
    ) {
        if let Some(vec) = self.address_space_gauges.get(&gauge) {
            vec.with_label_values(&[labels.lpar, labels.sysplex, address_space.name()])
                .set(value);
        }
    }

    fn record_transaction(&self, labels: LparLabels<'_>, service: Service, latency_seconds: f64) {
        let values = [labels.lpar, labels.sysplex, service.name()];
        self.latency.with_label_values(&values).observe(latency_seconds);
        self.transactions.with_label_values(&values).inc();
    }
}
