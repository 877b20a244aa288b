//! Errors raised while building a search widget.

use thiserror::Error;

/// Errors that can occur when building a widget from its configuration.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Configuration could not be parsed: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    #[error("Input height must be positive, got {0}")]
    InvalidInputHeight(f64),

    #[error("Row height and border must not be negative")]
    InvalidRowGeometry,

    #[error("At least one result row must be visible")]
    NoVisibleRows,

    #[error("Dialog duration must be non-zero")]
    ZeroDialogDuration,

    #[error("Page size must be between 1 and {max}, got {found}")]
    InvalidPageSize { found: u32, max: u32 },

    #[error("Search endpoint must not be empty")]
    MissingEndpoint,
}
