/*!
Fixtures de health records

- `RecordBuilder` pour construire un `HealthRecord` champ par champ
- sorties `smartctl -j` réelles (SATA, NVMe, scan) pour les tests de parsing
*/

use smartmon_core::record::{Attribute, AttributeRaw};
use smartmon_core::HealthRecord;

/// Sortie `smartctl -iaj /dev/sda` d'un disque SATA
pub const SMARTCTL_INFO_ALL_SATA: &str = r#"{
  "json_format_version": [1, 0],
  "smartctl": {
    "version": [7, 2],
    "svn_revision": "5155",
    "platform_info": "x86_64-linux-5.15.0",
    "build_info": "(local build)",
    "argv": ["smartctl", "-iaj", "/dev/sda"],
    "exit_status": 0
  },
  "device": {"name": "/dev/sda", "info_name": "/dev/sda [SAT]", "type": "sat", "protocol": "ATA"},
  "model_family": "Western Digital Red",
  "model_name": "WDC WD40EFRX-68N32N0",
  "serial_number": "WD-WCC7K1234567",
  "wwn": {"naa": 5, "oui": 5358, "id": 12345678901},
  "firmware_version": "82.00A82",
  "user_capacity": {"blocks": 7814037168, "bytes": 4000787030016},
  "logical_block_size": 512,
  "physical_block_size": 4096,
  "rotation_rate": 5400,
  "trim": {"supported": false},
  "in_smartctl_database": true,
  "ata_version": {"string": "ACS-3 T13/2161-D revision 5", "major_value": 2040, "minor_value": 109},
  "sata_version": {"string": "SATA 3.1", "value": 127},
  "interface_speed": {
    "max": {"sata_value": 14, "string": "6.0 Gb/s", "units_per_second": 60, "bits_per_unit": 100000000},
    "current": {"sata_value": 3, "string": "6.0 Gb/s", "units_per_second": 60, "bits_per_unit": 100000000}
  },
  "local_time": {"time_t": 1700000000, "asctime": "Tue Nov 14 22:13:20 2023 UTC"},
  "smart_status": {"passed": true},
  "ata_smart_attributes": {
    "revision": 16,
    "table": [
      {"id": 1, "name": "Raw_Read_Error_Rate", "value": 200, "worst": 200, "thresh": 51, "when_failed": "",
       "flags": {"value": 47, "string": "POSR-K ", "prefailure": true, "updated_online": true, "performance": true, "error_rate": true, "event_count": false, "auto_keep": true},
       "raw": {"value": 0, "string": "0"}},
      {"id": 3, "name": "Spin_Up_Time", "value": 175, "worst": 172, "thresh": 21, "when_failed": "",
       "flags": {"value": 39, "string": "POS--K ", "prefailure": true, "updated_online": true, "performance": true, "error_rate": false, "event_count": false, "auto_keep": true},
       "raw": {"value": 8216, "string": "8216"}},
      {"id": 5, "name": "Reallocated_Sector_Ct", "value": 200, "worst": 200, "thresh": 140, "when_failed": "",
       "flags": {"value": 51, "string": "PO--CK ", "prefailure": true, "updated_online": true, "performance": false, "error_rate": false, "event_count": true, "auto_keep": true},
       "raw": {"value": 0, "string": "0"}},
      {"id": 7, "name": "Seek_Error_Rate", "value": 100, "worst": 253, "thresh": 0, "when_failed": "",
       "flags": {"value": 46, "string": "-OSR-K ", "prefailure": false, "updated_online": true, "performance": true, "error_rate": true, "event_count": false, "auto_keep": true},
       "raw": {"value": 0, "string": "0"}},
      {"id": 194, "name": "Temperature_Celsius", "value": 113, "worst": 104, "thresh": 0, "when_failed": "",
       "flags": {"value": 34, "string": "-O---K ", "prefailure": false, "updated_online": true, "performance": false, "error_rate": false, "event_count": false, "auto_keep": true},
       "raw": {"value": 37, "string": "37"}}
    ]
  },
  "power_on_time": {"hours": 21030},
  "power_cycle_count": 57,
  "temperature": {"current": 37},
  "ata_smart_error_log": {"summary": {"revision": 1, "count": 0}},
  "ata_smart_self_test_log": {"standard": {"revision": 1, "count": 6}}
}"#;

/// Sortie `smartctl -iaj /dev/nvme0` (pas de table d'attributs ATA)
pub const SMARTCTL_INFO_ALL_NVME: &str = r#"{
  "smartctl": {"version": [7, 2], "exit_status": 0},
  "device": {"name": "/dev/nvme0", "info_name": "/dev/nvme0", "type": "nvme", "protocol": "NVMe"},
  "model_name": "Samsung SSD 970 EVO Plus 1TB",
  "serial_number": "S4EWNX0R000000",
  "firmware_version": "2B2QEXM7",
  "user_capacity": {"blocks": 1953525168, "bytes": 1000204886016},
  "logical_block_size": 512,
  "smart_status": {"passed": true},
  "temperature": {"current": 41},
  "power_cycle_count": 311,
  "power_on_time": {"hours": 9120}
}"#;

/// Sortie `smartctl --scan-open -j`
pub const SMARTCTL_SCAN_OPEN: &str = r#"{
  "smartctl": {"version": [7, 2], "argv": ["smartctl", "--scan-open", "-j"], "exit_status": 0},
  "devices": [
    {"name": "/dev/sda", "info_name": "/dev/sda [SAT]", "type": "sat", "protocol": "ATA"},
    {"name": "/dev/nvme0", "info_name": "/dev/nvme0", "type": "nvme", "protocol": "NVMe"}
  ]
}"#;

/// Builder fluide pour `HealthRecord`
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    record: HealthRecord,
}

impl RecordBuilder {
    pub fn new(device: &str) -> Self {
        let mut record = HealthRecord::default();
        record.device.name = device.to_string();
        record.device.device_type = "sat".to_string();
        record.device.protocol = "ATA".to_string();
        Self { record }
    }

    pub fn identity(mut self, family: &str, model: &str, serial: &str, firmware: &str) -> Self {
        self.record.model_family = family.to_string();
        self.record.model_name = model.to_string();
        self.record.serial_number = serial.to_string();
        self.record.firmware_version = firmware.to_string();
        self
    }

    pub fn capacity(mut self, blocks: u64, logical_block_size: u64) -> Self {
        self.record.user_capacity.blocks = blocks;
        self.record.user_capacity.bytes = blocks * logical_block_size;
        self.record.logical_block_size = logical_block_size;
        self
    }

    pub fn interface_speed(mut self, units_per_second: u64, bits_per_unit: u64) -> Self {
        self.record.interface_speed.max.units_per_second = units_per_second;
        self.record.interface_speed.max.bits_per_unit = bits_per_unit;
        self
    }

    pub fn passed(mut self, passed: bool) -> Self {
        self.record.smart_status.passed = passed;
        self
    }

    pub fn power_on_hours(mut self, hours: u64) -> Self {
        self.record.power_on_time.hours = hours;
        self
    }

    pub fn power_cycles(mut self, count: u64) -> Self {
        self.record.power_cycle_count = count;
        self
    }

    pub fn temperature(mut self, celsius: i64) -> Self {
        self.record.temperature.current = celsius;
        self
    }

    /// Ajoute une ligne à la table d'attributs (ordre conservé)
    pub fn attribute(mut self, id: u32, name: &str, value: i64) -> Self {
        self.record.ata_smart_attributes.table.push(Attribute {
            id,
            name: name.to_string(),
            value,
            worst: value,
            raw: AttributeRaw {
                value: 0,
                string: "0".to_string(),
            },
            ..Default::default()
        });
        self
    }

    pub fn build(self) -> HealthRecord {
        self.record
    }
}

/// Record cohérent où chaque valeur numérique vaut `generation`
///
/// Sert à détecter un record déchiré: tous les samples d'un même scrape
/// doivent porter la même génération.
pub fn generation_record(device: &str, generation: u64) -> HealthRecord {
    let g = generation as i64;
    RecordBuilder::new(device)
        .capacity(generation, 1)
        .power_cycles(generation)
        .temperature(g)
        .attribute(1, "Raw_Read_Error_Rate", g)
        .attribute(7, "Seek_Error_Rate", g)
        .build()
}

/// Parse une sortie smartctl embarquée
pub fn parse_record(json: &str) -> anyhow::Result<HealthRecord> {
    Ok(serde_json::from_str(json)?)
}
