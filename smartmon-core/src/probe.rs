//! Device probe contract
//!
//! A probe enumerates the devices it can open and fetches one full health
//! record per device. The poller only depends on this trait; `smartctl`
//! is the production implementation, tests script their own.

use crate::record::{DeviceEntry, HealthRecord};
use std::future::Future;
use std::time::Duration;

/// Erreurs remontées par un probe
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{command} timed out after {elapsed:?}")]
    Timeout { command: String, elapsed: Duration },
    #[error("{command} failed: {reason}")]
    Invocation { command: String, reason: String },
    #[error("could not parse output of {command}: {source}")]
    Parse {
        command: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ProbeError {
    /// True when the tool ran but its output was unusable
    pub fn is_parse(&self) -> bool {
        matches!(self, ProbeError::Parse { .. })
    }
}

/// Enumeration failed: the device list cannot be built
#[derive(Debug, thiserror::Error)]
#[error("device discovery failed: {0}")]
pub struct DiscoveryError(#[from] pub ProbeError);

/// Fetch failed for one device during a pass
#[derive(Debug, thiserror::Error)]
#[error("failed to fetch health of {device}: {source}")]
pub struct FetchError {
    pub device: String,
    #[source]
    pub source: ProbeError,
}

pub trait DeviceProbe: Send + Sync + 'static {
    /// List the devices that can be opened right now
    fn enumerate(&self) -> impl Future<Output = Result<Vec<DeviceEntry>, ProbeError>> + Send;

    /// Fetch the full health record of one device
    fn fetch(&self, device: &str) -> impl Future<Output = Result<HealthRecord, ProbeError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_families() {
        let parse = ProbeError::Parse {
            command: "smartctl -iaj /dev/sda".into(),
            source: serde_json::from_str::<HealthRecord>("not json").unwrap_err(),
        };
        assert!(parse.is_parse());

        let spawn = ProbeError::Spawn {
            command: "smartctl --scan-open -j".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert!(!spawn.is_parse());

        let discovery = DiscoveryError::from(spawn);
        assert!(discovery.to_string().starts_with("device discovery failed"));
    }

    #[test]
    fn test_fetch_error_names_device() {
        let err = FetchError {
            device: "/dev/sdb".into(),
            source: ProbeError::Invocation {
                command: "smartctl -iaj /dev/sdb".into(),
                reason: "device open failed".into(),
            },
        };
        assert!(err.to_string().contains("/dev/sdb"));
    }
}
