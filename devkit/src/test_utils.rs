/*!
Test Harness pour le poller smartmon

Câble un `StubProbe` sur un `Poller` et un `Exporter` partageant les mêmes
device states, sans lancer la boucle: chaque test pilote ses passes.
*/

use crate::probe_stub::StubProbe;
use crate::recording_sink::RecordingSink;
use anyhow::Result;
use prometheus::{Encoder, Registry, TextEncoder};
use smartmon_core::{DeviceStates, Exporter, FetchError, PassStats, Poller, DEFAULT_POLL_INTERVAL};
use std::sync::Arc;

/// Harness de test complet: probe scripté, poller, exporter
pub struct TestHarness {
    pub probe: StubProbe,
    pub poller: Arc<Poller<StubProbe>>,
    pub exporter: Arc<Exporter>,
}

impl TestHarness {
    /// Découvre les devices du probe et prépare l'exporter
    pub async fn new(probe: StubProbe) -> Result<Self> {
        init_tracing();
        let poller = Poller::discover(probe.clone(), DEFAULT_POLL_INTERVAL).await?;
        let exporter = Exporter::new(poller.states())?;
        tracing::info!(devices = poller.states().len(), "🧪 test harness ready");
        Ok(Self {
            probe,
            poller: Arc::new(poller),
            exporter: Arc::new(exporter),
        })
    }

    /// Harness sur des devices SATA nommés
    pub async fn with_devices(names: &[&str]) -> Result<Self> {
        Self::new(StubProbe::with_devices(names)).await
    }

    pub fn states(&self) -> DeviceStates {
        self.poller.states()
    }

    pub fn stats(&self) -> PassStats {
        self.poller.stats()
    }

    /// Une passe de refresh
    pub async fn poll(&self) -> std::result::Result<usize, FetchError> {
        self.poller.poll_once().await
    }

    /// Scrape complet dans un sink d'enregistrement
    pub fn scrape(&self) -> RecordingSink {
        let mut sink = RecordingSink::new();
        self.exporter.describe(&mut sink);
        self.exporter.collect_into(&mut sink);
        sink
    }

    /// Scrape via un registry Prometheus, au format texte
    pub fn scrape_text(&self) -> Result<String> {
        let registry = Registry::new();
        registry.register(Box::new(Exporter::new(self.states())?))?;
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

/// Init du logging pour tests (idempotent)
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::RecordBuilder;

    #[tokio::test]
    async fn test_harness_basic_functionality() {
        let harness = TestHarness::with_devices(&["/dev/sda"]).await.unwrap();
        harness
            .probe
            .push_record("/dev/sda", RecordBuilder::new("/dev/sda").temperature(35).build());

        assert!(harness.scrape().samples().is_empty());
        assert_eq!(harness.poll().await.unwrap(), 1);

        let sink = harness.scrape();
        assert_eq!(sink.value("smart_device_temperature", "/dev/sda"), Some(35.0));
        assert!(harness
            .scrape_text()
            .unwrap()
            .contains("smart_device_temperature{device=\"/dev/sda\"} 35"));
    }
}
