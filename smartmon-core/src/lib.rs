//! smartmon core - SMART health polling and Prometheus export
//!
//! - `smartctl`: device probe running `smartctl -j` and decoding its output
//! - `catalog`: static table of exported metric series
//! - `device_metrics`: per-device cache of the last health record
//! - `poller`: discovery + refresh loop (fail-fast passes)
//! - `exporter`: `prometheus` collector reading the cache on scrape

pub mod catalog;
pub mod device_metrics;
pub mod exporter;
pub mod poller;
pub mod probe;
pub mod record;
pub mod sink;
pub mod smartctl;
pub mod stats;

pub use catalog::{Sample, SeriesDef, CATALOG};
pub use device_metrics::{DeviceMetrics, DeviceStates};
pub use exporter::{Exporter, PrometheusSink};
pub use poller::{start, Poller, PollerHandle, DEFAULT_POLL_INTERVAL};
pub use probe::{DeviceProbe, DiscoveryError, FetchError, ProbeError};
pub use record::{DeviceEntry, ExitStatus, HealthRecord};
pub use sink::{MetricKind, MetricsSink};
pub use smartctl::Smartctl;
pub use stats::{LastPass, PassStats};
