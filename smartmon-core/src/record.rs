//! Structured output of `smartctl -j`
//!
//! Every section is defaulted: NVMe and SCSI devices omit the ATA blocks, and
//! a missing section simply reads as zero values instead of a parse failure.

use serde::{Deserialize, Serialize};

/// Decoded `smartctl` exit status (bit mask, see smartctl(8) "RETURN VALUES")
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitStatus {
    pub command_line_parse_error: bool,
    pub device_open_failed: bool,
    pub command_failed: bool,
    pub disk_failing: bool,
    pub prefail_above_threshold: bool,
    pub prefail_above_threshold_in_past: bool,
    pub device_errors_logged: bool,
    pub recent_self_test_errors: bool,
}

impl ExitStatus {
    pub fn from_code(code: i32) -> Self {
        Self {
            command_line_parse_error: code & 0x01 != 0,
            device_open_failed: code & 0x02 != 0,
            command_failed: code & 0x04 != 0,
            disk_failing: code & 0x08 != 0,
            prefail_above_threshold: code & 0x10 != 0,
            prefail_above_threshold_in_past: code & 0x20 != 0,
            device_errors_logged: code & 0x40 != 0,
            recent_self_test_errors: code & 0x80 != 0,
        }
    }

    /// Bits after which smartctl has no device data to report
    pub fn is_fatal(&self) -> bool {
        self.command_line_parse_error || self.device_open_failed
    }
}

/// `smartctl` self-description block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmartctlInfo {
    pub version: Vec<u32>,
    pub svn_revision: String,
    pub platform_info: String,
    pub build_info: String,
    pub argv: Vec<String>,
    pub exit_status: i32,
}

/// Device entry as reported by `--scan-open` and inside `-i` output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceEntry {
    pub name: String,
    pub info_name: String,
    #[serde(rename = "type")]
    pub device_type: String,
    pub protocol: String,
}

/// Output of `smartctl --scan-open -j`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOutput {
    pub smartctl: SmartctlInfo,
    pub devices: Vec<DeviceEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Wwn {
    pub naa: u64,
    pub oui: u64,
    pub id: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserCapacity {
    pub blocks: u64,
    pub bytes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Trim {
    pub supported: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtaVersion {
    pub string: String,
    pub major_value: u32,
    pub minor_value: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SataVersion {
    pub string: String,
    pub value: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceSpeedValue {
    pub sata_value: u32,
    pub string: String,
    pub units_per_second: u64,
    pub bits_per_unit: u64,
}

impl InterfaceSpeedValue {
    pub fn bits_per_second(&self) -> u64 {
        self.units_per_second.saturating_mul(self.bits_per_unit)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceSpeed {
    pub max: InterfaceSpeedValue,
    pub current: InterfaceSpeedValue,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalTime {
    pub time_t: i64,
    pub asctime: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmartStatus {
    pub passed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeFlags {
    pub value: u32,
    pub string: String,
    pub prefailure: bool,
    pub updated_online: bool,
    pub performance: bool,
    pub error_rate: bool,
    pub event_count: bool,
    pub auto_keep: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeRaw {
    pub value: u64,
    pub string: String,
}

/// One row of the ATA SMART attribute table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attribute {
    pub id: u32,
    pub name: String,
    pub value: i64,
    pub worst: i64,
    pub thresh: i64,
    pub when_failed: String,
    pub flags: AttributeFlags,
    pub raw: AttributeRaw,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtaSmartAttributes {
    pub revision: u32,
    pub table: Vec<Attribute>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerOnTime {
    pub hours: u64,
    pub minutes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Temperature {
    pub current: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSummary {
    pub revision: u32,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtaSmartErrorLog {
    pub summary: LogSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtaSmartSelfTestLog {
    pub standard: LogSummary,
}

/// Output of `smartctl -iaj <device>`: one immutable health snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthRecord {
    pub smartctl: SmartctlInfo,
    pub device: DeviceEntry,
    pub model_family: String,
    pub model_name: String,
    pub serial_number: String,
    pub wwn: Wwn,
    pub firmware_version: String,
    pub user_capacity: UserCapacity,
    pub logical_block_size: u64,
    pub physical_block_size: u64,
    pub trim: Trim,
    pub in_smartctl_database: bool,
    pub ata_version: AtaVersion,
    pub sata_version: SataVersion,
    pub interface_speed: InterfaceSpeed,
    pub local_time: LocalTime,
    pub smart_status: SmartStatus,
    pub ata_smart_attributes: AtaSmartAttributes,
    pub power_on_time: PowerOnTime,
    pub power_cycle_count: u64,
    pub temperature: Temperature,
    pub ata_smart_error_log: AtaSmartErrorLog,
    pub ata_smart_self_test_log: AtaSmartSelfTestLog,
    #[serde(skip)]
    pub exit_status: ExitStatus,
}

impl HealthRecord {
    /// First attribute whose name matches exactly
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.ata_smart_attributes.table.iter().find(|a| a.name == name)
    }
}
