//! # tabprep
//!
//! Stateful preprocessing for tabular data held in Apache DataFusion DataFrames.
//!
//! - [`transformers::categorical_encoding::CategoricalEncoder`] learns per-column vocabularies
//!   and applies one-hot or ordinal encoding.
//! - [`transformers::outlier_handling::OutlierHandler`] learns IQR fences per numeric column and
//!   replaces values outside them with the column median.
//! - [`splitting::DataSplitter`] partitions the result into ordered train/test sets.
//!
//! Both transformers follow the [`transformer::Transformer`] fit/transform contract.

pub mod exceptions;
mod logging;
pub mod splitting;
pub mod transformer;
pub mod transformers;
