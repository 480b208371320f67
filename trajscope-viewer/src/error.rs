//! Error types for the trajectory viewer.

use thiserror::Error;
use trajscope_core::{ProjectionError, SelectorError};

use crate::loader::LoadError;

/// Viewer error type.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Model id not present in the registry
    #[error("unknown model '{0}'")]
    UnknownModel(String),

    /// Either tensor failed to load for a model
    #[error("failed to load data for model '{model}': {source}")]
    Load {
        model: String,
        #[source]
        source: LoadError,
    },

    /// Update requested before any model finished loading
    #[error("no model data loaded")]
    NotLoaded,

    /// Basis selection text rejected
    #[error("invalid basis selection: {0}")]
    Selection(#[from] SelectorError),

    /// Projection preconditions failed
    #[error("projection failed: {0}")]
    Projection(#[from] ProjectionError),

    /// Projection succeeded but produced nothing to draw
    #[error("no data to plot")]
    EmptyProjection,

    /// Renderer rejected the figure
    #[error("render error: {0}")]
    Render(String),
}

/// Result type alias using the viewer Error.
pub type Result<T> = std::result::Result<T, Error>;
