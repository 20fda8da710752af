//! ## Train/test splitting
//!
//! [`DataSplitter`] partitions a DataFrame into a training prefix and a testing suffix without
//! shuffling, which keeps temporal order intact. The test partition holds
//! `ceil(n_rows * test_size)` rows; the remaining leading rows form the training partition.

use crate::exceptions::{TabPrepError, TabPrepResult};
use crate::transformers::columns::validate_columns;
use arrow::compute::concat_batches;
use arrow::record_batch::RecordBatch;
use datafusion::logical_expr::{ident, Expr};
use datafusion::prelude::*;
use tracing::debug;

/// Default fraction of rows assigned to the test partition.
pub const DEFAULT_TEST_SIZE: f64 = 0.2;

/// Feature and target partitions produced by [`DataSplitter::split`].
pub struct SplitData {
    pub x_train: DataFrame,
    pub x_test: DataFrame,
    pub y_train: DataFrame,
    pub y_test: DataFrame,
}

/// Order-preserving splitter over a fixed set of feature columns and one target column.
#[derive(Debug, Clone)]
pub struct DataSplitter {
    pub features: Vec<String>,
    pub target: String,
    pub test_size: f64,
}

impl DataSplitter {
    /// Create a splitter with the default test size of 0.2.
    pub fn new(features: Vec<String>, target: impl Into<String>) -> Self {
        Self {
            features,
            target: target.into(),
            test_size: DEFAULT_TEST_SIZE,
        }
    }

    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    /// Number of (train, test) rows for a table of `n_rows` rows.
    pub fn partition_sizes(&self, n_rows: usize) -> TabPrepResult<(usize, usize)> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(TabPrepError::Configuration(format!(
                "test_size {} must be between 0 and 1 (exclusive)",
                self.test_size
            )));
        }
        let n_test = (n_rows as f64 * self.test_size).ceil() as usize;
        let n_train = n_rows.saturating_sub(n_test);
        if n_train == 0 || n_test == 0 {
            return Err(TabPrepError::Configuration(format!(
                "test_size {} leaves an empty partition for {} rows",
                self.test_size, n_rows
            )));
        }
        Ok((n_train, n_test))
    }

    /// Split `df` into feature and target partitions, keeping row order.
    pub async fn split(&self, df: &DataFrame) -> TabPrepResult<SplitData> {
        if self.features.contains(&self.target) {
            return Err(TabPrepError::Configuration(format!(
                "target '{}' is also listed as a feature",
                self.target
            )));
        }
        let mut selected: Vec<String> = self.features.clone();
        selected.push(self.target.clone());
        validate_columns(df, &selected)?;

        let exprs: Vec<Expr> = selected.iter().map(|name| ident(name)).collect();
        let batches = df.clone().select(exprs)?.collect().await?;
        let n_rows: usize = batches.iter().map(RecordBatch::num_rows).sum();
        let (n_train, n_test) = self.partition_sizes(n_rows)?;
        let all_rows = concat_batches(&batches[0].schema(), &batches)?;

        let feature_idx: Vec<usize> = (0..self.features.len()).collect();
        let target_idx = [self.features.len()];
        let train = all_rows.slice(0, n_train);
        let test = all_rows.slice(n_train, n_test);
        debug!(train_rows = n_train, test_rows = n_test, "split dataset");

        let ctx = SessionContext::new();
        Ok(SplitData {
            x_train: ctx.read_batch(train.project(&feature_idx)?)?,
            x_test: ctx.read_batch(test.project(&feature_idx)?)?,
            y_train: ctx.read_batch(train.project(&target_idx)?)?,
            y_test: ctx.read_batch(test.project(&target_idx)?)?,
        })
    }
}
