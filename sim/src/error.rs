//! Error types for the simulation core.

use crate::components::EntityId;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type SimResult<T> = Result<T, SimError>;

/// Errors raised by grid queries, entity lookups and construction.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("tile ({x}, {y}) is outside the grid")]
    OutOfBounds { x: i32, y: i32 },
    #[error("entity {0} does not exist")]
    NotFound(EntityId),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("entity {0} has a non-finite position or velocity")]
    NonFiniteState(EntityId),
    #[error("failed to parse configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl SimError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        SimError::InvalidConfiguration(message.into())
    }
}
