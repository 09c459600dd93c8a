/*!
# Smartmon DevKit - Stubs et Utilitaires pour Tests

Bibliothèque facilitant les tests du poller smartmon avec:
- Probe scripté pour tests sans smartctl ni disques
- Sink d'enregistrement des métriques émises
- Fixtures de records et sorties smartctl JSON
- Harness câblant probe, poller et exporter
*/

pub mod fixtures;
pub mod probe_stub;
pub mod recording_sink;
pub mod test_utils;

pub use fixtures::{generation_record, parse_record, RecordBuilder};
pub use probe_stub::{StubFailure, StubProbe};
pub use recording_sink::{RecordedSample, RecordingSink};
pub use test_utils::TestHarness;
