/*!
Sink d'enregistrement pour assertions sur les métriques

Garde tous les `describe` et tous les `sample` reçus, sans dédoublonnage,
pour pouvoir vérifier ce qu'un scrape a réellement émis.
*/

use smartmon_core::{MetricKind, MetricsSink};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedSample {
    pub name: &'static str,
    pub label_values: Vec<String>,
    pub value: f64,
    pub kind: MetricKind,
}

#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    described: Vec<&'static str>,
    samples: Vec<RecordedSample>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Noms passés à `describe`, dans l'ordre (doublons inclus)
    pub fn described(&self) -> &[&'static str] {
        &self.described
    }

    pub fn samples(&self) -> &[RecordedSample] {
        &self.samples
    }

    /// Samples d'une série
    pub fn series(&self, name: &str) -> Vec<&RecordedSample> {
        self.samples.iter().filter(|s| s.name == name).collect()
    }

    /// Valeur d'une série pour un device (premier label = device)
    pub fn value(&self, name: &str, device: &str) -> Option<f64> {
        self.samples
            .iter()
            .find(|s| s.name == name && s.label_values.first().map(String::as_str) == Some(device))
            .map(|s| s.value)
    }

    /// Devices présents dans au moins un sample
    pub fn devices(&self) -> Vec<String> {
        let mut devices: Vec<String> = self
            .samples
            .iter()
            .filter_map(|s| s.label_values.first().cloned())
            .collect();
        devices.sort();
        devices.dedup();
        devices
    }

    pub fn clear(&mut self) {
        self.described.clear();
        self.samples.clear();
    }
}

impl MetricsSink for RecordingSink {
    fn describe(&mut self, name: &'static str, _help: &'static str, _labels: &'static [&'static str]) {
        self.described.push(name);
    }

    fn sample(&mut self, name: &'static str, label_values: &[String], value: f64, kind: MetricKind) {
        self.samples.push(RecordedSample {
            name,
            label_values: label_values.to_vec(),
            value,
            kind,
        });
    }
}
