use serde::{Deserialize, Serialize};
use smartmon_core::{DeviceStates, PassStats};
use std::time::Instant;
use time::format_description::well_known::Rfc3339;

#[derive(Debug, Serialize, Deserialize)]
pub struct ExporterHealth {
    pub uptime_seconds: u64,
    pub devices_tracked: u32,
    pub devices_with_data: u32,
    pub passes_completed: u64,
    pub passes_aborted: u64,
    pub last_pass_at: Option<String>,
    pub last_error: Option<String>,
}

#[derive(Clone)]
pub struct HealthTracker {
    start_time: Instant,
    states: DeviceStates,
    stats: PassStats,
}

impl HealthTracker {
    pub fn new(states: DeviceStates, stats: PassStats) -> Self {
        Self {
            start_time: Instant::now(),
            states,
            stats,
        }
    }

    pub fn get_health(&self) -> ExporterHealth {
        let last = self.stats.last();
        ExporterHealth {
            uptime_seconds: self.start_time.elapsed().as_secs(),
            devices_tracked: self.states.len() as u32,
            devices_with_data: self.states.with_data() as u32,
            passes_completed: self.stats.completed(),
            passes_aborted: self.stats.aborted(),
            last_pass_at: last.finished_at.and_then(|at| at.format(&Rfc3339).ok()),
            last_error: last.error,
        }
    }
}
