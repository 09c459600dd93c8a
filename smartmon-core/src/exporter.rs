//! Prometheus boundary
//!
//! `Exporter` is registered in a `prometheus::Registry`. A scrape only reads
//! the cached device states: it never starts a fetch and never waits for
//! one, devices without a record just contribute no samples.

use crate::catalog::CATALOG;
use crate::device_metrics::{describe_catalog, DeviceStates};
use crate::sink::{MetricKind, MetricsSink};
use prometheus::core::{Collector, Desc};
use prometheus::proto::{Counter, Gauge, LabelPair, Metric, MetricFamily, MetricType};
use std::collections::HashMap;
use tracing::{debug, warn};

pub struct Exporter {
    states: DeviceStates,
    descs: Vec<Desc>,
}

impl Exporter {
    pub fn new(states: DeviceStates) -> prometheus::Result<Self> {
        let descs = CATALOG
            .iter()
            .map(|def| {
                Desc::new(
                    def.name.to_string(),
                    def.help.to_string(),
                    def.labels.iter().map(|l| l.to_string()).collect(),
                    HashMap::new(),
                )
            })
            .collect::<prometheus::Result<Vec<_>>>()?;
        Ok(Self { states, descs })
    }

    pub fn states(&self) -> &DeviceStates {
        &self.states
    }

    /// Every catalog series once, whatever the number of devices
    pub fn describe(&self, sink: &mut dyn MetricsSink) {
        describe_catalog(sink);
    }

    /// Render the cached record of every device
    pub fn collect_into(&self, sink: &mut dyn MetricsSink) {
        for metrics in self.states.iter() {
            metrics.render(sink);
        }
    }
}

impl Collector for Exporter {
    fn desc(&self) -> Vec<&Desc> {
        self.descs.iter().collect()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let mut sink = PrometheusSink::default();
        self.describe(&mut sink);
        self.collect_into(&mut sink);
        let families = sink.into_families();
        debug!(families = families.len(), devices = self.states.len(), "collected all metrics");
        families
    }
}

struct Series {
    name: &'static str,
    help: &'static str,
    labels: &'static [&'static str],
    kind: MetricKind,
    samples: Vec<(Vec<String>, f64)>,
}

/// Groups samples per series for one scrape and turns them into metric families
///
/// Each sample becomes one constant metric carrying its value as is, whatever
/// the kind. A label set already seen in the series keeps its first sample.
#[derive(Default)]
pub struct PrometheusSink {
    series: Vec<Series>,
}

impl MetricsSink for PrometheusSink {
    fn describe(&mut self, name: &'static str, help: &'static str, labels: &'static [&'static str]) {
        if self.series.iter().any(|s| s.name == name) {
            return;
        }
        self.series.push(Series {
            name,
            help,
            labels,
            kind: MetricKind::Gauge,
            samples: Vec::new(),
        });
    }

    fn sample(&mut self, name: &'static str, label_values: &[String], value: f64, kind: MetricKind) {
        let Some(series) = self.series.iter_mut().find(|s| s.name == name) else {
            warn!(series = name, "sample for an undescribed series dropped");
            return;
        };
        if label_values.len() != series.labels.len() {
            warn!(series = name, labels = ?label_values, "label values do not match the series schema");
            return;
        }
        // deux devices qui rendent les mêmes labels (ex: plusieurs /dev/bus/0 megaraid)
        if series.samples.iter().any(|(values, _)| values.as_slice() == label_values) {
            warn!(series = name, labels = ?label_values, "duplicate label set, keeping the first sample");
            return;
        }
        series.kind = kind;
        series.samples.push((label_values.to_vec(), value));
    }
}

impl PrometheusSink {
    pub fn into_families(self) -> Vec<MetricFamily> {
        self.series
            .into_iter()
            .filter(|s| !s.samples.is_empty())
            .map(build_family)
            .collect()
    }
}

fn build_family(series: Series) -> MetricFamily {
    let mut family = MetricFamily::default();
    family.set_name(series.name.to_string());
    family.set_help(series.help.to_string());
    family.set_field_type(match series.kind {
        MetricKind::Gauge => MetricType::GAUGE,
        MetricKind::Counter => MetricType::COUNTER,
    });

    for (values, value) in series.samples {
        let mut metric = Metric::default();
        let mut pairs: Vec<LabelPair> = series
            .labels
            .iter()
            .zip(values)
            .map(|(name, label_value)| {
                let mut pair = LabelPair::default();
                pair.set_name(name.to_string());
                pair.set_value(label_value);
                pair
            })
            .collect();
        pairs.sort_by(|a, b| a.get_name().cmp(b.get_name()));
        for pair in pairs {
            metric.mut_label().push(pair);
        }

        match series.kind {
            MetricKind::Gauge => {
                let mut gauge = Gauge::default();
                gauge.set_value(value);
                metric.set_gauge(gauge);
            }
            MetricKind::Counter => {
                let mut counter = Counter::default();
                counter.set_value(value);
                metric.set_counter(counter);
            }
        }
        family.mut_metric().push(metric);
    }
    family
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Attribute, HealthRecord};
    use prometheus::proto::MetricType;
    use prometheus::{Encoder, Registry, TextEncoder};

    fn record(device: &str, temp: i64) -> HealthRecord {
        let mut r = HealthRecord::default();
        r.device.name = device.to_string();
        r.temperature.current = temp;
        r.ata_smart_attributes.table.push(Attribute {
            id: 5,
            name: "Reallocated_Sector_Ct".into(),
            value: 100,
            ..Default::default()
        });
        r
    }

    fn family<'a>(families: &'a [MetricFamily], name: &str) -> Option<&'a MetricFamily> {
        families.iter().find(|f| f.get_name() == name)
    }

    #[test]
    fn test_desc_once_per_series() {
        let exporter = Exporter::new(DeviceStates::new(["/dev/sda", "/dev/sdb"])).unwrap();
        assert_eq!(exporter.desc().len(), CATALOG.len());
    }

    #[test]
    fn test_collect_without_records_is_empty() {
        let exporter = Exporter::new(DeviceStates::new(["/dev/sda"])).unwrap();
        assert!(exporter.collect().is_empty());
    }

    #[test]
    fn test_collect_groups_devices_per_family() {
        let states = DeviceStates::new(["/dev/sda", "/dev/sdb", "/dev/sdc"]);
        states.get("/dev/sda").unwrap().ingest(record("/dev/sda", 31));
        states.get("/dev/sdb").unwrap().ingest(record("/dev/sdb", 44));
        let exporter = Exporter::new(states).unwrap();

        let families = exporter.collect();
        let temp = family(&families, "smart_device_temperature").unwrap();
        assert_eq!(temp.get_field_type(), MetricType::COUNTER);
        assert_eq!(temp.get_metric().len(), 2);

        let realloc = family(&families, "smart_device_reallocated_sector_count").unwrap();
        assert_eq!(realloc.get_field_type(), MetricType::GAUGE);
        assert!(family(&families, "smart_device_spin_up_time").is_none());
    }

    #[test]
    fn test_negative_counter_exported_as_is() {
        let states = DeviceStates::new(["/dev/sda"]);
        states.get("/dev/sda").unwrap().ingest(record("/dev/sda", -5));
        let exporter = Exporter::new(states).unwrap();

        let families = exporter.collect();
        let temp = family(&families, "smart_device_temperature").unwrap();
        assert_eq!(temp.get_field_type(), MetricType::COUNTER);
        assert_eq!(temp.get_metric()[0].get_counter().get_value(), -5.0);
    }

    #[test]
    fn test_duplicate_device_label_keeps_first_sample() {
        let states = DeviceStates::new(["/dev/bus/0", "/dev/bus/0"]);
        for (metrics, (cycles, temp)) in states.iter().zip([(57, 30), (99, 40)]) {
            let mut r = record("/dev/bus/0", temp);
            r.power_cycle_count = cycles;
            metrics.ingest(r);
        }
        let exporter = Exporter::new(states).unwrap();
        let families = exporter.collect();

        let cycles = family(&families, "smart_device_power_cycle").unwrap();
        assert_eq!(cycles.get_metric().len(), 1);
        assert_eq!(cycles.get_metric()[0].get_counter().get_value(), 57.0);

        let temp = family(&families, "smart_device_temperature").unwrap();
        assert_eq!(temp.get_metric().len(), 1);
        assert_eq!(temp.get_metric()[0].get_counter().get_value(), 30.0);

        let realloc = family(&families, "smart_device_reallocated_sector_count").unwrap();
        assert_eq!(realloc.get_metric()[0].get_gauge().get_value(), 100.0);
    }

    #[test]
    fn test_info_labels_carried_per_metric() {
        let states = DeviceStates::new(["/dev/sda"]);
        let mut r = record("/dev/sda", 30);
        r.model_name = "WDC WD40EFRX".into();
        states.get("/dev/sda").unwrap().ingest(r);
        let families = Exporter::new(states).unwrap().collect();

        let info = family(&families, "smart_device_info").unwrap();
        let labels: Vec<(&str, &str)> = info.get_metric()[0]
            .get_label()
            .iter()
            .map(|p| (p.get_name(), p.get_value()))
            .collect();
        assert_eq!(labels.len(), 5);
        assert!(labels.contains(&("device", "/dev/sda")));
        assert!(labels.contains(&("model_name", "WDC WD40EFRX")));
        assert_eq!(info.get_metric()[0].get_gauge().get_value(), 1.0);
    }

    #[test]
    fn test_registry_text_output() {
        let states = DeviceStates::new(["/dev/sda"]);
        let registry = Registry::new();
        registry.register(Box::new(Exporter::new(states.clone()).unwrap())).unwrap();

        states.get("/dev/sda").unwrap().ingest(record("/dev/sda", 36));
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&registry.gather(), &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.contains("# TYPE smart_device_temperature counter"));
        assert!(text.contains("smart_device_temperature{device=\"/dev/sda\"} 36"));
        assert!(text.contains("smart_device_reallocated_sector_count{device=\"/dev/sda\"} 100"));
    }

    #[test]
    fn test_registry_text_output_negative_temperature() {
        let states = DeviceStates::new(["/dev/sda"]);
        let registry = Registry::new();
        registry.register(Box::new(Exporter::new(states.clone()).unwrap())).unwrap();

        states.get("/dev/sda").unwrap().ingest(record("/dev/sda", -3));
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&registry.gather(), &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.contains("smart_device_temperature{device=\"/dev/sda\"} -3"));
    }
}
