//! Background refresh loop
//!
//! Devices are discovered once; afterwards the loop runs one pass right away
//! and one per tick. A pass fetches the devices in discovery order and stops
//! at the first failing device: the devices after it keep their previous
//! record until the next pass, which starts again from the first device.

use crate::device_metrics::DeviceStates;
use crate::exporter::Exporter;
use crate::probe::{DeviceProbe, DiscoveryError, FetchError};
use crate::stats::PassStats;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

// tokio refuses a zero period
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

pub struct Poller<P> {
    probe: P,
    states: DeviceStates,
    poll_interval: Duration,
    stats: PassStats,
}

impl<P: DeviceProbe> Poller<P> {
    /// Enumerate devices once and build an empty state per device
    pub async fn discover(probe: P, poll_interval: Duration) -> Result<Self, DiscoveryError> {
        let devices = probe.enumerate().await?;
        for device in &devices {
            info!(device = %device.name, device_type = %device.device_type, "found device");
        }
        let states = DeviceStates::new(devices.into_iter().map(|d| d.name));
        info!(count = states.len(), "device discovery complete");

        Ok(Self {
            probe,
            states,
            poll_interval,
            stats: PassStats::new(),
        })
    }

    pub fn states(&self) -> DeviceStates {
        self.states.clone()
    }

    pub fn stats(&self) -> PassStats {
        self.stats.clone()
    }

    /// One pass over every device, aborted on the first fetch failure
    pub async fn poll_once(&self) -> Result<usize, FetchError> {
        for metrics in self.states.iter() {
            let record = self
                .probe
                .fetch(metrics.device())
                .await
                .map_err(|source| FetchError {
                    device: metrics.device().to_string(),
                    source,
                })?;
            info!(device = %metrics.device(), "got info");
            metrics.ingest(record);
        }
        Ok(self.states.len())
    }

    async fn run_pass(&self) {
        match self.poll_once().await {
            Ok(refreshed) => {
                debug!(refreshed, "poll pass complete");
                self.stats.record_completed();
            }
            Err(e) => {
                error!(device = %e.device, parse_error = e.source.is_parse(), error = %e.source, "failed to poll");
                self.stats.record_aborted(e.to_string());
            }
        }
    }

    /// Run passes forever; the first one starts immediately
    pub async fn run(self) {
        let mut ticker = interval(self.poll_interval.max(MIN_POLL_INTERVAL));
        // a pass longer than the period pushes the next tick back instead of bursting
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.run_pass().await;
        }
    }

    /// Move the loop onto a background task
    pub fn spawn(self) -> PollerHandle {
        let states = self.states();
        let stats = self.stats();
        let task = tokio::spawn(self.run());
        PollerHandle { states, stats, task }
    }
}

/// Discover devices and start the refresh loop
pub async fn start<P: DeviceProbe>(probe: P, poll_interval: Duration) -> Result<PollerHandle, DiscoveryError> {
    let poller = Poller::discover(probe, poll_interval).await?;
    Ok(poller.spawn())
}

/// Read side of a running poller
pub struct PollerHandle {
    states: DeviceStates,
    stats: PassStats,
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub fn states(&self) -> DeviceStates {
        self.states.clone()
    }

    pub fn stats(&self) -> PassStats {
        self.stats.clone()
    }

    pub fn exporter(&self) -> prometheus::Result<Exporter> {
        Exporter::new(self.states())
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn abort(&self) {
        self.task.abort();
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
