use hhxtruth::core::io::ntuple::NtupleError;
use hhxtruth::engine::error::EngineError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to open ntuple output '{path}': {source}", path = path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: NtupleError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
