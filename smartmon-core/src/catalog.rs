//! Metric series catalog
//!
//! One row per exported series: name, help, label schema, kind and the pure
//! function that turns a health record into at most one sample. Adding a
//! series means adding a row to `CATALOG`.

use crate::record::HealthRecord;
use crate::sink::MetricKind;

const DEVICE: &[&str] = &["device"];

/// One rendered sample: label values follow the row's label schema
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub value: f64,
    pub label_values: Vec<String>,
}

/// Declarative definition of one metric series
pub struct SeriesDef {
    pub name: &'static str,
    pub help: &'static str,
    pub labels: &'static [&'static str],
    pub kind: MetricKind,
    pub render: fn(&HealthRecord) -> Option<Sample>,
}

impl SeriesDef {
    pub fn render(&self, record: &HealthRecord) -> Option<Sample> {
        (self.render)(record)
    }
}

pub static CATALOG: &[SeriesDef] = &[
    SeriesDef {
        name: "smart_device_info",
        help: "Information about the device",
        labels: &["device", "model_family", "model_name", "serial_number", "firmware_version"],
        kind: MetricKind::Gauge,
        render: device_info,
    },
    SeriesDef {
        name: "smart_device_user_capacity_blocks",
        help: "User capacity of the device",
        labels: DEVICE,
        kind: MetricKind::Gauge,
        render: user_capacity_blocks,
    },
    SeriesDef {
        name: "smart_device_user_capacity_bytes",
        help: "User capacity of the device",
        labels: DEVICE,
        kind: MetricKind::Gauge,
        render: user_capacity_bytes,
    },
    SeriesDef {
        name: "smart_device_logical_block_size",
        help: "Logical block size of the device",
        labels: DEVICE,
        kind: MetricKind::Gauge,
        render: logical_block_size,
    },
    SeriesDef {
        name: "smart_device_physical_block_size",
        help: "Physical block size of the device",
        labels: DEVICE,
        kind: MetricKind::Gauge,
        render: physical_block_size,
    },
    SeriesDef {
        name: "smart_device_interface_max_speed_bits_per_second",
        help: "Interface speed of the device",
        labels: DEVICE,
        kind: MetricKind::Gauge,
        render: interface_max_speed,
    },
    SeriesDef {
        name: "smart_device_smart_status_passed",
        help: "Whether the SMART status is a pass",
        labels: DEVICE,
        kind: MetricKind::Gauge,
        render: smart_status_passed,
    },
    SeriesDef {
        name: "smart_device_power_on_time_seconds",
        help: "Power on time of the device",
        labels: DEVICE,
        kind: MetricKind::Gauge,
        render: power_on_time_seconds,
    },
    SeriesDef {
        name: "smart_device_power_cycle",
        help: "Number of power cycles of the device",
        labels: DEVICE,
        kind: MetricKind::Counter,
        render: power_cycle_count,
    },
    // exported as a counter although it can go down
    SeriesDef {
        name: "smart_device_temperature",
        help: "Current temperature of the device",
        labels: DEVICE,
        kind: MetricKind::Counter,
        render: temperature,
    },
    SeriesDef {
        name: "smart_device_raw_read_error_rate",
        help: "Raw read error rate of the device",
        labels: DEVICE,
        kind: MetricKind::Gauge,
        render: raw_read_error_rate,
    },
    SeriesDef {
        name: "smart_device_seek_error_rate",
        help: "Seek error rate of the device",
        labels: DEVICE,
        kind: MetricKind::Gauge,
        render: seek_error_rate,
    },
    SeriesDef {
        name: "smart_device_reallocated_sector_count",
        help: "Reallocated sector count of the device",
        labels: DEVICE,
        kind: MetricKind::Gauge,
        render: reallocated_sector_count,
    },
    SeriesDef {
        name: "smart_device_spin_up_time",
        help: "Spin up time of the device",
        labels: DEVICE,
        kind: MetricKind::Gauge,
        render: spin_up_time,
    },
];

/// Look a series up by name
pub fn series(name: &str) -> Option<&'static SeriesDef> {
    CATALOG.iter().find(|def| def.name == name)
}

fn per_device(record: &HealthRecord, value: f64) -> Option<Sample> {
    Some(Sample {
        value,
        label_values: vec![record.device.name.clone()],
    })
}

fn device_info(r: &HealthRecord) -> Option<Sample> {
    Some(Sample {
        value: 1.0,
        label_values: vec![
            r.device.name.clone(),
            r.model_family.clone(),
            r.model_name.clone(),
            r.serial_number.clone(),
            r.firmware_version.clone(),
        ],
    })
}

fn user_capacity_blocks(r: &HealthRecord) -> Option<Sample> {
    per_device(r, r.user_capacity.blocks as f64)
}

fn user_capacity_bytes(r: &HealthRecord) -> Option<Sample> {
    per_device(r, r.user_capacity.bytes as f64)
}

fn logical_block_size(r: &HealthRecord) -> Option<Sample> {
    per_device(r, r.logical_block_size as f64)
}

fn physical_block_size(r: &HealthRecord) -> Option<Sample> {
    per_device(r, r.physical_block_size as f64)
}

fn interface_max_speed(r: &HealthRecord) -> Option<Sample> {
    per_device(r, r.interface_speed.max.bits_per_second() as f64)
}

fn smart_status_passed(r: &HealthRecord) -> Option<Sample> {
    per_device(r, if r.smart_status.passed { 1.0 } else { 0.0 })
}

fn power_on_time_seconds(r: &HealthRecord) -> Option<Sample> {
    per_device(r, r.power_on_time.hours.saturating_mul(3600) as f64)
}

fn power_cycle_count(r: &HealthRecord) -> Option<Sample> {
    per_device(r, r.power_cycle_count as f64)
}

fn temperature(r: &HealthRecord) -> Option<Sample> {
    per_device(r, r.temperature.current as f64)
}

fn attribute_value(r: &HealthRecord, name: &str) -> Option<Sample> {
    let attribute = r.attribute(name)?;
    per_device(r, attribute.value as f64)
}

fn raw_read_error_rate(r: &HealthRecord) -> Option<Sample> {
    attribute_value(r, "Raw_Read_Error_Rate")
}

fn seek_error_rate(r: &HealthRecord) -> Option<Sample> {
    attribute_value(r, "Seek_Error_Rate")
}

fn reallocated_sector_count(r: &HealthRecord) -> Option<Sample> {
    attribute_value(r, "Reallocated_Sector_Ct")
}

fn spin_up_time(r: &HealthRecord) -> Option<Sample> {
    attribute_value(r, "Spin_Up_Time")
}
