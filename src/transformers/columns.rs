//! ## Column helpers
//!
//! Conventions shared by the transformers: validating requested column names against a
//! DataFrame schema, de-duplicating column selections, and materializing a single column
//! either as text (for categorical encoders) or as `f64` (for numeric transformers).

use crate::exceptions::{TabPrepError, TabPrepResult};
use arrow::array::{Array, Float64Array, StringArray};
use arrow::datatypes::DataType;
use datafusion::logical_expr::{cast, ident, Expr};
use datafusion::prelude::*;

/// Validates that every column in `target_cols` exists in the DataFrame.
/// Returns an error naming the first missing column.
pub fn validate_columns(df: &DataFrame, target_cols: &[String]) -> TabPrepResult<()> {
    let schema = df.schema();
    for col_name in target_cols {
        if schema.field_with_unqualified_name(col_name).is_err() {
            return Err(TabPrepError::MissingColumn(format!(
                "Column '{}' not found in DataFrame",
                col_name
            )));
        }
    }
    Ok(())
}

/// Returns the requested columns with duplicates removed, keeping first-occurrence order.
pub fn unique_columns(columns: &[String]) -> Vec<String> {
    let mut seen = Vec::with_capacity(columns.len());
    for name in columns {
        if !seen.contains(name) {
            seen.push(name.clone());
        }
    }
    seen
}

/// The column rendered as text, so categories can be compared regardless of the stored type.
pub fn text_expr(col_name: &str) -> Expr {
    cast(ident(col_name), DataType::Utf8)
}

/// The column rendered as `Float64`.
pub fn float_expr(col_name: &str) -> Expr {
    cast(ident(col_name), DataType::Float64)
}

/// Fails with `UnsupportedType` unless the column holds numbers.
pub fn ensure_numeric(df: &DataFrame, col_name: &str) -> TabPrepResult<()> {
    let field = df
        .schema()
        .field_with_unqualified_name(col_name)
        .map_err(|_| TabPrepError::MissingColumn(col_name.to_string()))?;
    if field.data_type().is_numeric() {
        Ok(())
    } else {
        Err(TabPrepError::UnsupportedType(format!(
            "Column '{}' has type {} but a numeric column is required",
            col_name,
            field.data_type()
        )))
    }
}

/// Extract the distinct non-null values of a column, rendered as text.
/// The result is sorted so callers get a deterministic order.
pub async fn extract_distinct_values(
    df: &DataFrame,
    col_name: &str,
) -> TabPrepResult<Vec<String>> {
    let distinct_df = df
        .clone()
        .select(vec![text_expr(col_name).alias(col_name)])?
        .distinct()?;
    let batches = distinct_df.collect().await?;
    let mut values = Vec::new();
    for batch in batches {
        let array = batch
            .column(0)
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| {
                TabPrepError::UnsupportedType(format!(
                    "Expected Utf8 array for column {}",
                    col_name
                ))
            })?;
        for i in 0..array.len() {
            if !array.is_null(i) {
                values.push(array.value(i).to_string());
            }
        }
    }
    values.sort();
    values.dedup();
    Ok(values)
}

/// Extract the non-null, non-NaN values of a numeric column in row order.
pub async fn extract_float_values(df: &DataFrame, col_name: &str) -> TabPrepResult<Vec<f64>> {
    ensure_numeric(df, col_name)?;
    let batches = df
        .clone()
        .select(vec![float_expr(col_name).alias(col_name)])?
        .collect()
        .await?;
    let mut values = Vec::new();
    for batch in batches {
        let array = batch
            .column(0)
            .as_any()
            .downcast_ref::<Float64Array>()
            .ok_or_else(|| {
                TabPrepError::UnsupportedType(format!(
                    "Expected Float64 array for column {}",
                    col_name
                ))
            })?;
        values.extend(array.iter().flatten().filter(|v| !v.is_nan()));
    }
    Ok(values)
}
