use thiserror::Error;

use crate::core::types::CollectionId;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Collection not found: {0:?}")]
    CollectionNotFound(CollectionId),

    #[error("Scenario error: {0}")]
    ScenarioError(String),

    #[error("Routing error: {0}")]
    RoutingError(#[from] RouterError),

    #[error("Terrain error: {0}")]
    TerrainError(#[from] TerrainError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Scenario parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Failures from the route collaborator.
///
/// `RateLimited` is eventually-recoverable and retried with a fixed delay;
/// everything else surfaces to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    #[error("route service rate-limited")]
    RateLimited,

    #[error("route failed: {0}")]
    Failed(String),
}

/// Failures from the terrain collaborator. Never silently defaulted:
/// a malformed sample would corrupt grade calculations downstream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TerrainError {
    #[error("malformed terrain response: {0}")]
    Malformed(String),

    #[error("terrain sampler unreachable: {0}")]
    Unreachable(String),
}

pub type Result<T> = std::result::Result<T, SimError>;
