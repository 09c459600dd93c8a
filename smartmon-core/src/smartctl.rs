//! `smartctl` device probe
//!
//! Runs `smartctl --scan-open -j` and `smartctl -iaj <device>` and decodes
//! their JSON output. A non-zero exit status is normal here: smartctl reports
//! disk conditions through its exit bit mask, so the status is decoded and
//! attached to the output instead of being treated as an error.

use crate::probe::{DeviceProbe, ProbeError};
use crate::record::{DeviceEntry, ExitStatus, HealthRecord, ScanOutput};
use serde::de::DeserializeOwned;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command as AsyncCommand;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct Smartctl {
    binary: String,
    timeout: Option<Duration>,
}

impl Default for Smartctl {
    fn default() -> Self {
        Self::new("smartctl")
    }
}

impl Smartctl {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            timeout: None,
        }
    }

    /// Kill an invocation that runs longer than `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    async fn exec(&self, args: &[&str]) -> Result<(Vec<u8>, ExitStatus), ProbeError> {
        let command = format!("{} {}", self.binary, args.join(" "));
        debug!(command = %command, "executing command");

        let child = AsyncCommand::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ProbeError::Spawn {
                command: command.clone(),
                source,
            })?;

        let start = Instant::now();
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| ProbeError::Timeout {
                    command: command.clone(),
                    elapsed: start.elapsed(),
                })?,
            None => child.wait_with_output().await,
        }
        .map_err(|source| ProbeError::Spawn {
            command: command.clone(),
            source,
        })?;

        // killed by a signal: no exit code, nothing to decode
        let Some(code) = output.status.code() else {
            return Err(ProbeError::Invocation {
                command,
                reason: format!("terminated abnormally ({})", output.status),
            });
        };

        let status = ExitStatus::from_code(code);
        if code != 0 {
            warn!(
                command = %command,
                exit_code = code,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "smartctl reported a non-zero exit status"
            );
        }
        if status.is_fatal() {
            let reason = if status.command_line_parse_error {
                "command line did not parse"
            } else {
                "device open failed"
            };
            return Err(ProbeError::Invocation {
                command,
                reason: reason.to_string(),
            });
        }

        Ok((output.stdout, status))
    }

    async fn exec_json<T: DeserializeOwned>(&self, args: &[&str]) -> Result<(T, ExitStatus), ProbeError> {
        let (stdout, status) = self.exec(args).await?;
        let parsed = decode(&stdout).map_err(|source| ProbeError::Parse {
            command: format!("{} {}", self.binary, args.join(" ")),
            source,
        })?;
        Ok((parsed, status))
    }
}

fn decode<T: DeserializeOwned>(stdout: &[u8]) -> Result<T, serde_json::Error> {
    serde_json::from_slice(stdout)
}

impl DeviceProbe for Smartctl {
    async fn enumerate(&self) -> Result<Vec<DeviceEntry>, ProbeError> {
        let (scan, _): (ScanOutput, _) = self.exec_json(&["--scan-open", "-j"]).await?;
        Ok(scan.devices)
    }

    async fn fetch(&self, device: &str) -> Result<HealthRecord, ProbeError> {
        let (mut record, status): (HealthRecord, _) = self.exec_json(&["-iaj", device]).await?;
        record.exit_status = status;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCAN_OPEN: &str = r#"{
        "json_format_version": [1, 0],
        "smartctl": {"version": [7, 2], "svn_revision": "5155", "argv": ["smartctl", "--scan-open", "-j"], "exit_status": 0},
        "devices": [
            {"name": "/dev/sda", "info_name": "/dev/sda [SAT]", "type": "sat", "protocol": "ATA"},
            {"name": "/dev/nvme0", "info_name": "/dev/nvme0", "type": "nvme", "protocol": "NVMe"}
        ]
    }"#;

    #[test]
    fn test_decode_scan_open() {
        let scan: ScanOutput = decode(SCAN_OPEN.as_bytes()).unwrap();
        assert_eq!(scan.smartctl.version, vec![7, 2]);
        assert_eq!(scan.devices.len(), 2);
        assert_eq!(scan.devices[0].name, "/dev/sda");
        assert_eq!(scan.devices[0].device_type, "sat");
        assert_eq!(scan.devices[1].protocol, "NVMe");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let result: Result<HealthRecord, _> = decode(b"smartctl: command not found");
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let probe = Smartctl::new("/nonexistent/smartctl-binary");
        match probe.enumerate().await {
            Err(ProbeError::Spawn { command, .. }) => {
                assert!(command.contains("--scan-open"));
            }
            other => panic!("expected spawn error, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fatal_exit_bits_are_invocation_errors() {
        // exit 2 = device open failed
        let probe = Smartctl::new("sh");
        let err = probe.exec(&["-c", "exit 2"]).await.unwrap_err();
        assert!(matches!(err, ProbeError::Invocation { .. }));
        assert!(!err.is_parse());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_fatal_exit_bits_keep_output() {
        // exit 8 = disk failing, output must still be returned
        let probe = Smartctl::new("sh");
        let (stdout, status) = probe
            .exec(&["-c", "printf '{\"smart_status\":{\"passed\":false}}'; exit 8"])
            .await
            .unwrap();
        assert!(status.disk_failing);
        let record: HealthRecord = decode(&stdout).unwrap();
        assert!(!record.smart_status.passed);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_kills_invocation() {
        let probe = Smartctl::new("sleep").with_timeout(Some(Duration::from_millis(50)));
        let err = probe.exec(&["5"]).await.unwrap_err();
        assert!(matches!(err, ProbeError::Timeout { .. }));
    }
}
