//! ## Custom Errors for tabprep
//!
//! This module defines the error type shared by every transformer in the crate.
//! It uses the `thiserror` crate to derive the `Error` trait.
//! The `TabPrepError` enum covers configuration problems, lifecycle misuse
//! (transforming before fitting), unseen categories, and errors bubbling up from
//! DataFusion and Arrow.
//!
//! The `TabPrepResult` type alias is the result type returned throughout the library.
//!
//! ### Example
//!
//! ```rust
//! use tabprep::exceptions::{TabPrepError, TabPrepResult};
//!
//! fn lookup(column: &str) -> TabPrepResult<()> {
//!     Err(TabPrepError::NotFitted(column.into()))
//! }
//! ```

use thiserror::Error;

/// Errors specific to the tabprep library.
#[derive(Debug, Error)]
pub enum TabPrepError {
    /// Wraps errors from DataFusion.
    #[error("DataFusion error: {0}")]
    DataFusionError(#[from] datafusion::error::DataFusionError),

    /// Wraps errors from Arrow.
    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),

    /// Indicates an invalid construction-time setting (e.g., an unknown encoding method).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Indicates that transform was requested for a column that was never fit.
    #[error("Column '{0}' has not been fit")]
    NotFitted(String),

    /// Indicates a category that is not part of the fitted vocabulary.
    #[error("Unknown category '{category}' in column '{column}'")]
    UnknownCategory { column: String, category: String },

    /// Indicates that the specified column does not exist in the DataFrame.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Indicates that a column has no usable (non-null) values to fit on.
    #[error("Empty column: {0}")]
    EmptyColumn(String),

    /// Indicates a column whose data type cannot be handled by the transformer.
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),
}

/// A convenient result type for tabprep operations.
pub type TabPrepResult<T> = std::result::Result<T, TabPrepError>;
