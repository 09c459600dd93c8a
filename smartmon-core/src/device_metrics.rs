//! Per-device cache of the last health record
//!
//! Each device owns its own reader/writer lock around an `Arc` of the record.
//! Writers swap the `Arc`, readers clone it and render outside the lock, so a
//! scrape sees either the previous record or the new one, never a mix.

use crate::catalog::CATALOG;
use crate::record::HealthRecord;
use crate::sink::MetricsSink;
use parking_lot::RwLock;
use std::sync::Arc;

/// Last-known metrics of one discovered device
#[derive(Debug)]
pub struct DeviceMetrics {
    device: String,
    record: RwLock<Option<Arc<HealthRecord>>>,
}

impl DeviceMetrics {
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            record: RwLock::new(None),
        }
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    /// Replace the held record wholesale
    pub fn ingest(&self, mut record: HealthRecord) {
        // le label `device` vient du record, on garde l'identifiant de découverte s'il manque
        if record.device.name.is_empty() {
            record.device.name = self.device.clone();
        }
        *self.record.write() = Some(Arc::new(record));
    }

    /// Snapshot of the held record, if any
    pub fn snapshot(&self) -> Option<Arc<HealthRecord>> {
        self.record.read().clone()
    }

    pub fn has_record(&self) -> bool {
        self.record.read().is_some()
    }

    /// Emit one sample per catalog series that renders for the held record
    pub fn render(&self, sink: &mut dyn MetricsSink) {
        let Some(record) = self.snapshot() else {
            return;
        };
        for def in CATALOG {
            if let Some(sample) = def.render(&record) {
                sink.sample(def.name, &sample.label_values, sample.value, def.kind);
            }
        }
    }

    /// Advertise every catalog series, with or without a record
    pub fn describe(&self, sink: &mut dyn MetricsSink) {
        describe_catalog(sink);
    }
}

pub(crate) fn describe_catalog(sink: &mut dyn MetricsSink) {
    for def in CATALOG {
        sink.describe(def.name, def.help, def.labels);
    }
}

/// Fixed set of device states, in discovery order
///
/// Membership never changes after construction; cloning shares the same
/// states.
#[derive(Debug, Clone)]
pub struct DeviceStates(Arc<[DeviceMetrics]>);

impl DeviceStates {
    pub fn new<I, S>(devices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(devices.into_iter().map(DeviceMetrics::new).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeviceMetrics> {
        self.0.iter()
    }

    pub fn get(&self, device: &str) -> Option<&DeviceMetrics> {
        self.0.iter().find(|m| m.device() == device)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn with_data(&self) -> usize {
        self.0.iter().filter(|m| m.has_record()).count()
    }
}
