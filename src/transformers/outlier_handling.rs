//! ## Outlier handling
//!
//! This module provides [`OutlierHandler`], which neutralizes extreme values in numeric
//! columns using the interquartile-range (IQR) rule.
//!
//! At fit time the handler computes, per column, the median and the first and third quartiles
//! (linear interpolation between order statistics). A value is an outlier when it lies strictly
//! outside `[Q1 - multiplier * IQR, Q3 + multiplier * IQR]`. At transform time outliers are
//! replaced with the fitted median, so the row count and column layout never change.
//!
//! Every flagged row is also copied into an outlier log kept by the handler. The log grows
//! across transform calls and is only emptied by [`OutlierHandler::clear_outliers`].

use crate::exceptions::{TabPrepError, TabPrepResult};
use crate::impl_transformer;
use crate::transformers::columns::{
    ensure_numeric, extract_float_values, float_expr, unique_columns, validate_columns,
};
use arrow::record_batch::RecordBatch;
use datafusion::functions::math::expr_fn::isnan;
use datafusion::logical_expr::{ident, lit, not, Case as DFCase, Expr};
use datafusion::prelude::*;
use std::collections::HashMap;
use tracing::debug;

/// Default IQR multiplier (Tukey's fences).
pub const DEFAULT_MULTIPLIER: f64 = 1.5;

/// Value at quantile `q` of an ascending slice, interpolating linearly between neighbours.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let idx = q * (sorted.len() - 1) as f64;
    let lower = idx.floor() as usize;
    let upper = (lower + 1).min(sorted.len() - 1);
    let frac = idx - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Fitted statistics for one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IqrBounds {
    pub median: f64,
    pub q1: f64,
    pub q3: f64,
    pub lower: f64,
    pub upper: f64,
}

impl IqrBounds {
    /// Compute the statistics from raw values. Returns `None` when `values` is empty.
    pub fn from_values(mut values: Vec<f64>, multiplier: f64) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);
        let q1 = quantile(&values, 0.25);
        let q3 = quantile(&values, 0.75);
        let iqr = q3 - q1;
        Some(Self {
            median: quantile(&values, 0.5),
            q1,
            q3,
            lower: q1 - multiplier * iqr,
            upper: q3 + multiplier * iqr,
        })
    }

    /// Returns true if `value` falls strictly outside the fences.
    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.lower || value > self.upper
    }
}

/// `value < lower OR value > upper`, excluding NaN (Arrow orders NaN above every number).
fn outlier_predicate(col_name: &str, bounds: &IqrBounds) -> Expr {
    let value = float_expr(col_name);
    not(isnan(value.clone())).and(
        value
            .clone()
            .lt(lit(bounds.lower))
            .or(value.gt(lit(bounds.upper))),
    )
}

/// `CASE WHEN <outlier> THEN median ELSE value END`, as Float64.
fn replace_expr(col_name: &str, bounds: &IqrBounds) -> Expr {
    Expr::Case(DFCase {
        expr: None,
        when_then_expr: vec![(
            Box::new(outlier_predicate(col_name, bounds)),
            Box::new(lit(bounds.median)),
        )],
        else_expr: Some(Box::new(float_expr(col_name))),
    })
}

/// Replaces IQR outliers with the column median and logs the affected rows.
#[derive(Debug, Clone)]
pub struct OutlierHandler {
    pub multiplier: f64,
    bounds: HashMap<String, IqrBounds>,
    outliers: Vec<RecordBatch>,
}

impl Default for OutlierHandler {
    fn default() -> Self {
        Self::new(DEFAULT_MULTIPLIER)
    }
}

impl OutlierHandler {
    /// Create a new OutlierHandler with the given fence multiplier.
    pub fn new(multiplier: f64) -> Self {
        Self {
            multiplier,
            bounds: HashMap::new(),
            outliers: Vec::new(),
        }
    }

    /// Compute median and IQR bounds for each target column.
    pub async fn fit(&mut self, df: &DataFrame, columns: &[String]) -> TabPrepResult<()> {
        if !self.multiplier.is_finite() || self.multiplier <= 0.0 {
            return Err(TabPrepError::Configuration(format!(
                "multiplier {} must be a positive finite number",
                self.multiplier
            )));
        }
        let columns = unique_columns(columns);
        validate_columns(df, &columns)?;
        for col_name in &columns {
            ensure_numeric(df, col_name)?;
        }

        for col_name in columns {
            let values = extract_float_values(df, &col_name).await?;
            let bounds = IqrBounds::from_values(values, self.multiplier)
                .ok_or_else(|| TabPrepError::EmptyColumn(col_name.clone()))?;
            debug!(
                column = %col_name,
                median = bounds.median,
                lower = bounds.lower,
                upper = bounds.upper,
                "fitted IQR bounds"
            );
            self.bounds.insert(col_name, bounds);
        }
        Ok(())
    }

    /// Replace outliers in each target column with its fitted median.
    ///
    /// Columns are processed in the order given; the rows logged for a column reflect the
    /// replacements already made for earlier columns of the same call.
    pub async fn transform(
        &mut self,
        df: DataFrame,
        columns: &[String],
    ) -> TabPrepResult<DataFrame> {
        let columns = unique_columns(columns);
        for col_name in &columns {
            if !self.is_fitted(col_name) {
                return Err(TabPrepError::NotFitted(col_name.clone()));
            }
        }
        validate_columns(&df, &columns)?;
        for col_name in &columns {
            ensure_numeric(&df, col_name)?;
        }

        let mut current = df;
        for col_name in &columns {
            let bounds = *self
                .bounds
                .get(col_name)
                .ok_or_else(|| TabPrepError::NotFitted(col_name.clone()))?;

            let flagged = current
                .clone()
                .filter(outlier_predicate(col_name, &bounds))?
                .collect()
                .await?;
            let flagged_rows: usize = flagged.iter().map(RecordBatch::num_rows).sum();
            self.outliers
                .extend(flagged.into_iter().filter(|batch| batch.num_rows() > 0));
            debug!(column = %col_name, outliers = flagged_rows, "replaced outliers with median");

            let exprs: Vec<Expr> = current
                .schema()
                .fields()
                .iter()
                .map(|field| {
                    let name = field.name();
                    if name == col_name {
                        replace_expr(name, &bounds).alias(name)
                    } else {
                        ident(name)
                    }
                })
                .collect();
            current = current.select(exprs)?;
        }
        Ok(current)
    }

    /// Fit on `df` and then transform it.
    pub async fn fit_transform(
        &mut self,
        df: DataFrame,
        columns: &[String],
    ) -> TabPrepResult<DataFrame> {
        self.fit(&df, columns).await?;
        self.transform(df, columns).await
    }

    /// Fitted statistics for `column`, if any.
    pub fn bounds(&self, column: &str) -> Option<&IqrBounds> {
        self.bounds.get(column)
    }

    /// Returns true if bounds have been fitted for `column`.
    pub fn is_fitted(&self, column: &str) -> bool {
        self.bounds.contains_key(column)
    }

    /// Every row flagged so far, one batch per (call, column) that found outliers.
    pub fn outliers(&self) -> &[RecordBatch] {
        &self.outliers
    }

    /// Total number of rows in the outlier log.
    pub fn outlier_count(&self) -> usize {
        self.outliers.iter().map(RecordBatch::num_rows).sum()
    }

    /// Empty the outlier log. Fitted bounds are kept.
    pub fn clear_outliers(&mut self) {
        self.outliers.clear();
    }
}

impl_transformer!(OutlierHandler);

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_quantile_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
        assert_relative_eq!(quantile(&sorted, 0.25), 2.25);
        assert_relative_eq!(quantile(&sorted, 0.5), 3.5);
        assert_relative_eq!(quantile(&sorted, 0.75), 4.75);
        assert_relative_eq!(quantile(&sorted, 0.0), 1.0);
        assert_relative_eq!(quantile(&sorted, 1.0), 100.0);
    }

    #[test]
    fn test_quantile_single_value() {
        assert_relative_eq!(quantile(&[7.0], 0.25), 7.0);
        assert_relative_eq!(quantile(&[7.0], 0.75), 7.0);
    }

    #[test]
    fn test_bounds_from_unsorted_values() {
        let bounds = IqrBounds::from_values(vec![100.0, 3.0, 1.0, 5.0, 2.0, 4.0], 1.5).unwrap();
        assert_relative_eq!(bounds.median, 3.5);
        assert_relative_eq!(bounds.q1, 2.25);
        assert_relative_eq!(bounds.q3, 4.75);
        assert_relative_eq!(bounds.lower, -1.5);
        assert_relative_eq!(bounds.upper, 8.5);
        assert!(bounds.is_outlier(100.0));
        assert!(!bounds.is_outlier(8.5));
        assert!(!bounds.is_outlier(-1.5));
        assert!(bounds.is_outlier(-1.6));
    }

    #[test]
    fn test_bounds_multiplier_scales_fences() {
        let bounds = IqrBounds::from_values(vec![1.0, 2.0, 3.0, 4.0, 5.0], 3.0).unwrap();
        // Q1 = 2, Q3 = 4, IQR = 2
        assert_relative_eq!(bounds.lower, -4.0);
        assert_relative_eq!(bounds.upper, 10.0);
    }

    #[test]
    fn test_bounds_empty() {
        assert!(IqrBounds::from_values(vec![], 1.5).is_none());
    }

    #[test]
    fn test_default_multiplier() {
        let handler = OutlierHandler::default();
        assert_relative_eq!(handler.multiplier, 1.5);
        assert_eq!(handler.outlier_count(), 0);
        assert!(!handler.is_fitted("value"));
    }
}
