use thiserror::Error;

use super::config::ConfigError;
use crate::core::io::ntuple::NtupleError;
use crate::core::io::truth::TruthFileError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Required input '{key}' could not be retrieved from the event store")]
    MissingInput { key: String },

    #[error("Ntuple schema setup failed: {source}")]
    SchemaSetup {
        #[source]
        source: NtupleError,
    },

    #[error("Failed to write ntuple record: {source}")]
    Sink {
        #[source]
        source: NtupleError,
    },

    #[error("Lifecycle violation: algorithm must be {expected}, but it is {found}")]
    Lifecycle {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to read the next event: {source}")]
    Input {
        #[from]
        source: TruthFileError,
    },
}

impl EngineError {
    /// Whether the failure only invalidates the current event.
    ///
    /// Event-scoped failures are skipped by the event loop; every other
    /// variant aborts the run.
    pub fn is_event_scoped(&self) -> bool {
        matches!(self, EngineError::MissingInput { .. })
    }
}
