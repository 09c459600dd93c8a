//! Metrics sink contract
//!
//! The per-device states and the exporter write into a sink; the sink owns
//! the transport. `PrometheusSink` (in `exporter`) is the production one.

/// Semantic kind of a series. It does not change how values are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
    Counter,
}

pub trait MetricsSink {
    /// Advertise a series
    fn describe(&mut self, name: &'static str, help: &'static str, labels: &'static [&'static str]);

    /// Emit one sample of a described series
    fn sample(&mut self, name: &'static str, label_values: &[String], value: f64, kind: MetricKind);
}
