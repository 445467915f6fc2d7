use thiserror::Error;

/// Top-level error type for the weldmesh kernel.
#[derive(Debug, Error)]
pub enum WeldError {
    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Tessellation(#[from] TessellationError),
}

/// Errors related to the topology store and its invariants.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(&'static str),

    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}

/// Errors related to building or editing geometry.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("non-manifold edge between input vertices {v0} and {v1}")]
    NonManifoldEdge { v0: usize, v1: usize },

    #[error("operation failed: {0}")]
    Failed(String),
}

/// Errors raised by [`crate::config::EditConfig::validate`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl ConfigError {
    /// Creates an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        Self::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}

/// Errors related to polygon triangulation.
#[derive(Debug, Error)]
pub enum TessellationError {
    #[error("polygon outline needs at least 3 points, got {0}")]
    TooFewPoints(usize),

    #[error("triangulation failed: {0}")]
    Failed(String),
}

/// Convenience type alias for results using [`WeldError`].
pub type Result<T> = std::result::Result<T, WeldError>;
