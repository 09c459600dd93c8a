/*!
Probe scripté pour tests sans smartctl

Chaque device a une file de réponses (record ou erreur). Quand la file est
vide, le dernier record servi est rejoué. Tous les appels sont enregistrés
et un device peut être bloqué pour simuler un smartctl qui ne répond plus.
*/

use smartmon_core::{DeviceEntry, DeviceProbe, HealthRecord, ProbeError};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Type d'échec à simuler pour un fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubFailure {
    /// le binaire n'a pas pu être lancé / a échoué
    Invocation,
    /// la sortie n'est pas du JSON exploitable
    Parse,
}

impl StubFailure {
    fn into_error(self, device: &str) -> ProbeError {
        let command = format!("smartctl -iaj {device}");
        match self {
            StubFailure::Invocation => ProbeError::Invocation {
                command,
                reason: "device open failed".to_string(),
            },
            StubFailure::Parse => ProbeError::Parse {
                command,
                source: serde_json::from_str::<serde_json::Value>("{truncated").unwrap_err(),
            },
        }
    }
}

#[derive(Debug, Clone)]
enum StubResponse {
    Record(HealthRecord),
    Failure(StubFailure),
}

/// Probe qui simule smartctl (compatible avec `DeviceProbe`)
#[derive(Clone, Default)]
pub struct StubProbe {
    devices: Arc<Mutex<Vec<DeviceEntry>>>,
    scripts: Arc<Mutex<HashMap<String, VecDeque<StubResponse>>>>,
    last_served: Arc<Mutex<HashMap<String, HealthRecord>>>,
    blocked: Arc<Mutex<HashMap<String, Arc<Notify>>>>,
    fail_enumeration: Arc<AtomicBool>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl StubProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Probe avec une liste de devices (type `sat`, protocole ATA)
    pub fn with_devices(names: &[&str]) -> Self {
        let probe = Self::new();
        *probe.devices.lock().unwrap() = names
            .iter()
            .map(|name| DeviceEntry {
                name: name.to_string(),
                info_name: format!("{name} [SAT]"),
                device_type: "sat".to_string(),
                protocol: "ATA".to_string(),
            })
            .collect();
        probe
    }

    /// L'énumération échouera
    pub fn fail_enumeration(&self) {
        self.fail_enumeration.store(true, Ordering::SeqCst);
    }

    /// Ajoute un record à servir pour ce device
    pub fn push_record(&self, device: &str, record: HealthRecord) -> &Self {
        self.push(device, StubResponse::Record(record));
        self
    }

    /// Ajoute un échec à servir pour ce device
    pub fn push_failure(&self, device: &str, failure: StubFailure) -> &Self {
        self.push(device, StubResponse::Failure(failure));
        self
    }

    fn push(&self, device: &str, response: StubResponse) {
        self.scripts
            .lock()
            .unwrap()
            .entry(device.to_string())
            .or_default()
            .push_back(response);
    }

    /// Bloque les fetch de ce device jusqu'à `notify_one()` sur le handle retourné
    pub fn block(&self, device: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.blocked
            .lock()
            .unwrap()
            .insert(device.to_string(), notify.clone());
        notify
    }

    pub fn unblock(&self, device: &str) {
        if let Some(notify) = self.blocked.lock().unwrap().remove(device) {
            notify.notify_waiters();
            notify.notify_one();
        }
    }

    /// Tous les fetch reçus, dans l'ordre
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fetch_count(&self, device: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|d| *d == device).count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn next_response(&self, device: &str) -> StubResponse {
        let scripted = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(device)
            .and_then(|queue| queue.pop_front());
        match scripted {
            Some(StubResponse::Record(record)) => {
                self.last_served
                    .lock()
                    .unwrap()
                    .insert(device.to_string(), record.clone());
                StubResponse::Record(record)
            }
            Some(failure) => failure,
            None => match self.last_served.lock().unwrap().get(device) {
                Some(record) => StubResponse::Record(record.clone()),
                None => StubResponse::Failure(StubFailure::Invocation),
            },
        }
    }
}

impl DeviceProbe for StubProbe {
    async fn enumerate(&self) -> Result<Vec<DeviceEntry>, ProbeError> {
        if self.fail_enumeration.load(Ordering::SeqCst) {
            return Err(ProbeError::Invocation {
                command: "smartctl --scan-open -j".to_string(),
                reason: "command line did not parse".to_string(),
            });
        }
        Ok(self.devices.lock().unwrap().clone())
    }

    async fn fetch(&self, device: &str) -> Result<HealthRecord, ProbeError> {
        self.calls.lock().unwrap().push(device.to_string());

        let gate = self.blocked.lock().unwrap().get(device).cloned();
        if let Some(notify) = gate {
            tracing::debug!(device, "[stub] fetch blocked");
            notify.notified().await;
        }

        match self.next_response(device) {
            StubResponse::Record(record) => Ok(record),
            StubResponse::Failure(failure) => Err(failure.into_error(device)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::RecordBuilder;

    #[tokio::test]
    async fn test_scripted_responses_then_replay() {
        let probe = StubProbe::with_devices(&["/dev/sda"]);
        probe
            .push_record("/dev/sda", RecordBuilder::new("/dev/sda").temperature(30).build())
            .push_failure("/dev/sda", StubFailure::Parse);

        assert_eq!(probe.fetch("/dev/sda").await.unwrap().temperature.current, 30);
        assert!(probe.fetch("/dev/sda").await.unwrap_err().is_parse());
        // file vide: le dernier record est rejoué
        assert_eq!(probe.fetch("/dev/sda").await.unwrap().temperature.current, 30);
        assert_eq!(probe.fetch_count("/dev/sda"), 3);
    }

    #[tokio::test]
    async fn test_unscripted_device_fails() {
        let probe = StubProbe::with_devices(&["/dev/sdb"]);
        let err = probe.fetch("/dev/sdb").await.unwrap_err();
        assert!(!err.is_parse());
    }

    #[tokio::test]
    async fn test_enumeration() {
        let probe = StubProbe::with_devices(&["/dev/sda", "/dev/sdb"]);
        let devices = probe.enumerate().await.unwrap();
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[1].info_name, "/dev/sdb [SAT]");

        probe.fail_enumeration();
        assert!(probe.enumerate().await.is_err());
    }
}
