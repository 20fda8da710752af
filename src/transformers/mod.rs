//! # Transformer Implementations
//!
//! The submodules contain the stateful transformers and the column helpers they share.

pub mod categorical_encoding;
pub mod columns;
pub mod outlier_handling;
