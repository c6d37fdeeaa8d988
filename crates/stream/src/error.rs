use overworld_common::RegionKey;

use crate::locator::GenerationStage;

/// Error reported by an external content generator for one stage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct GeneratorError(pub String);

impl GeneratorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A region failed to populate. Never escapes the per-tick update.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{stage} generation failed for region {key}: {source}")]
pub struct GenerationError {
    pub key: RegionKey,
    pub stage: GenerationStage,
    #[source]
    pub source: GeneratorError,
}

/// Errors from loading or validating a streaming configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid streaming config: {0}")]
    Invalid(String),
}
