use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use time::OffsetDateTime;

/// Outcome counters of the refresh loop, shared with the health endpoint
#[derive(Debug, Clone, Default)]
pub struct PassStats {
    completed: Arc<AtomicU64>,
    aborted: Arc<AtomicU64>,
    last: Arc<Mutex<LastPass>>,
}

#[derive(Debug, Clone, Default)]
pub struct LastPass {
    pub finished_at: Option<OffsetDateTime>,
    pub error: Option<String>,
}

impl PassStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
        let mut last = self.last.lock();
        last.finished_at = Some(OffsetDateTime::now_utc());
        last.error = None;
    }

    pub fn record_aborted(&self, error: String) {
        self.aborted.fetch_add(1, Ordering::Relaxed);
        let mut last = self.last.lock();
        last.finished_at = Some(OffsetDateTime::now_utc());
        last.error = Some(error);
    }

    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn aborted(&self) -> u64 {
        self.aborted.load(Ordering::Relaxed)
    }

    pub fn last(&self) -> LastPass {
        self.last.lock().clone()
    }
}
