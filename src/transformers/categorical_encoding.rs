//! # Categorical Encoding
//!
//! This module provides [`CategoricalEncoder`], which turns categorical columns into numeric
//! representations. One encoding record is kept per column, so different columns can carry
//! different vocabularies and failures can be attributed to a specific column.
//!
//! Two strategies are supported:
//! - **One-hot:** Expands a column into one `Float64` indicator column per category, named
//!   `<column>_<category>`. The source column is dropped. Values outside the fitted vocabulary
//!   produce an all-zero row.
//! - **Ordinal:** Replaces a column with the `Int64` index of each value in the vocabulary.
//!   Values outside the fitted vocabulary are an error, since there is no index to give them.
//!
//! The vocabulary is either learned at fit time (distinct values, sorted) or supplied
//! explicitly, one list per column.

use crate::exceptions::{TabPrepError, TabPrepResult};
use crate::impl_transformer;
use crate::transformers::columns::{
    extract_distinct_values, text_expr, unique_columns, validate_columns,
};
use datafusion::logical_expr::{ident, lit, Case as DFCase, Expr, Literal};
use datafusion::prelude::*;
use datafusion::scalar::ScalarValue;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// The encoding strategy applied to a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncodingMethod {
    #[default]
    OneHot,
    Ordinal,
}

impl FromStr for EncodingMethod {
    type Err = TabPrepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "onehot" => Ok(EncodingMethod::OneHot),
            "ordinal" => Ok(EncodingMethod::Ordinal),
            other => Err(TabPrepError::Configuration(format!(
                "Invalid method: {} (expected \"onehot\" or \"ordinal\")",
                other
            ))),
        }
    }
}

impl fmt::Display for EncodingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingMethod::OneHot => write!(f, "onehot"),
            EncodingMethod::Ordinal => write!(f, "ordinal"),
        }
    }
}

/// Where the vocabulary of each column comes from.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Categories {
    /// Learn the distinct values seen during fit, sorted.
    #[default]
    Auto,
    /// One ordered category list per fitted column, matched by position.
    Explicit(Vec<Vec<String>>),
}

/// Fitted state for a single column.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedEncoding {
    pub method: EncodingMethod,
    pub vocabulary: Vec<String>,
}

impl FittedEncoding {
    /// Names of the output columns this encoding produces for `column`.
    pub fn feature_names(&self, column: &str) -> Vec<String> {
        match self.method {
            EncodingMethod::OneHot => self
                .vocabulary
                .iter()
                .map(|cat| one_hot_name(column, cat))
                .collect(),
            EncodingMethod::Ordinal => vec![column.to_string()],
        }
    }

    /// Position of `category` in the vocabulary.
    pub fn index_of(&self, category: &str) -> Option<usize> {
        self.vocabulary.iter().position(|c| c == category)
    }

    /// The category stored at `index`.
    pub fn category_at(&self, index: usize) -> Option<&str> {
        self.vocabulary.get(index).map(String::as_str)
    }
}

fn one_hot_name(column: &str, category: &str) -> String {
    format!("{}_{}", column, category)
}

/// Helper to build a CASE WHEN expression given a mapping from category strings to values.
/// For each pair, the expression generated is:
/// `WHEN CAST(<col> AS Utf8) = lit(<category>) THEN lit(<encoded_value>)`
/// If provided, `default` is used as the ELSE branch; otherwise unmatched rows become null.
fn build_case_expr<T: Clone + Literal>(
    col_name: &str,
    mapping: &[(String, T)],
    default: Option<Expr>,
) -> Expr {
    let when_then_expr = mapping
        .iter()
        .map(|(cat, val)| {
            (
                Box::new(text_expr(col_name).eq(lit(cat.clone()))),
                Box::new(lit(val.clone())),
            )
        })
        .collect();
    Expr::Case(DFCase {
        expr: None,
        when_then_expr,
        else_expr: default.map(Box::new),
    })
}

/// Drop `col_name` and append one indicator column per category.
fn one_hot_expand(
    df: DataFrame,
    col_name: &str,
    vocabulary: &[String],
) -> TabPrepResult<DataFrame> {
    let mut exprs: Vec<Expr> = df
        .schema()
        .fields()
        .iter()
        .filter(|field| field.name() != col_name)
        .map(|field| ident(field.name()))
        .collect();
    for cat in vocabulary {
        let indicator = build_case_expr(col_name, &[(cat.clone(), 1.0_f64)], Some(lit(0.0_f64)));
        exprs.push(indicator.alias(one_hot_name(col_name, cat)));
    }
    Ok(df.select(exprs)?)
}

/// Replace `col_name` (same name, same position) with its vocabulary index.
fn ordinal_replace(
    df: DataFrame,
    col_name: &str,
    vocabulary: &[String],
) -> TabPrepResult<DataFrame> {
    let mapping: Vec<(String, i64)> = vocabulary
        .iter()
        .enumerate()
        .map(|(i, cat)| (cat.clone(), i as i64))
        .collect();
    let encoded = if mapping.is_empty() {
        lit(ScalarValue::Int64(None))
    } else {
        build_case_expr(col_name, &mapping, None)
    };
    let exprs: Vec<Expr> = df
        .schema()
        .fields()
        .iter()
        .map(|field| {
            let name = field.name();
            if name == col_name {
                encoded.clone().alias(name)
            } else {
                ident(name)
            }
        })
        .collect();
    Ok(df.select(exprs)?)
}

/// Returns the first value of `col_name` (in sorted order) that is not in `vocabulary`.
async fn find_unknown_category(
    df: &DataFrame,
    col_name: &str,
    vocabulary: &[String],
) -> TabPrepResult<Option<String>> {
    let observed = extract_distinct_values(df, col_name).await?;
    Ok(observed.into_iter().find(|v| !vocabulary.contains(v)))
}

/// Encodes categorical columns with one strategy and one vocabulary per column.
///
/// ```rust,no_run
/// use tabprep::transformers::categorical_encoding::{CategoricalEncoder, Categories, EncodingMethod};
/// # async fn run(df: datafusion::prelude::DataFrame) -> tabprep::exceptions::TabPrepResult<()> {
/// let mut encoder = CategoricalEncoder::new(EncodingMethod::OneHot, Categories::Auto);
/// let encoded = encoder.fit_transform(df, &["color".to_string()]).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CategoricalEncoder {
    pub method: EncodingMethod,
    pub categories: Categories,
    encoders: HashMap<String, FittedEncoding>,
}

impl CategoricalEncoder {
    /// Create a new encoder with the given strategy and category source.
    pub fn new(method: EncodingMethod, categories: Categories) -> Self {
        Self {
            method,
            categories,
            encoders: HashMap::new(),
        }
    }

    /// Create an encoder from the textual method name (`"onehot"` or `"ordinal"`).
    pub fn from_config(method: &str, categories: Categories) -> TabPrepResult<Self> {
        Ok(Self::new(method.parse()?, categories))
    }

    /// Pairs each requested column with its explicit vocabulary (if any).
    /// Checks the whole configuration before anything is fitted.
    fn plan(&self, columns: &[String]) -> TabPrepResult<Vec<(String, Option<Vec<String>>)>> {
        let paired: Vec<(String, Option<Vec<String>>)> = match &self.categories {
            Categories::Auto => columns.iter().map(|c| (c.clone(), None)).collect(),
            Categories::Explicit(lists) => {
                if lists.len() != columns.len() {
                    return Err(TabPrepError::Configuration(format!(
                        "{} category lists were given for {} columns",
                        lists.len(),
                        columns.len()
                    )));
                }
                for (col_name, list) in columns.iter().zip(lists) {
                    if list.is_empty() {
                        return Err(TabPrepError::Configuration(format!(
                            "Category list for column '{}' is empty",
                            col_name
                        )));
                    }
                    let mut seen = HashSet::with_capacity(list.len());
                    if !list.iter().all(|cat| seen.insert(cat)) {
                        return Err(TabPrepError::Configuration(format!(
                            "Category list for column '{}' contains duplicates",
                            col_name
                        )));
                    }
                }
                columns
                    .iter()
                    .cloned()
                    .zip(lists.iter().cloned().map(Some))
                    .collect()
            }
        };
        let mut planned: Vec<(String, Option<Vec<String>>)> = Vec::with_capacity(paired.len());
        for (col_name, vocab) in paired {
            if !planned.iter().any(|(name, _)| *name == col_name) {
                planned.push((col_name, vocab));
            }
        }
        Ok(planned)
    }

    /// Learn the vocabulary of each column.
    ///
    /// Configuration problems and missing columns are reported before any state changes.
    /// An error on a later column (e.g. a value outside an explicit vocabulary) leaves
    /// earlier columns of the same call fitted.
    pub async fn fit(&mut self, df: &DataFrame, columns: &[String]) -> TabPrepResult<()> {
        let planned = self.plan(columns)?;
        validate_columns(df, &unique_columns(columns))?;
        for (col_name, explicit) in planned {
            let vocabulary = match explicit {
                None => extract_distinct_values(df, &col_name).await?,
                Some(vocab) => {
                    if let Some(category) = find_unknown_category(df, &col_name, &vocab).await? {
                        return Err(TabPrepError::UnknownCategory {
                            column: col_name,
                            category,
                        });
                    }
                    vocab
                }
            };
            debug!(
                column = %col_name,
                method = %self.method,
                categories = vocabulary.len(),
                "fitted categorical encoding"
            );
            self.encoders.insert(
                col_name,
                FittedEncoding {
                    method: self.method,
                    vocabulary,
                },
            );
        }
        Ok(())
    }

    /// Encode each requested column with its fitted record, in the order given.
    pub async fn transform(&self, df: DataFrame, columns: &[String]) -> TabPrepResult<DataFrame> {
        let columns = unique_columns(columns);
        for col_name in &columns {
            if !self.is_fitted(col_name) {
                return Err(TabPrepError::NotFitted(col_name.clone()));
            }
        }
        validate_columns(&df, &columns)?;

        let mut current = df;
        for col_name in &columns {
            let encoding = self
                .encoders
                .get(col_name)
                .ok_or_else(|| TabPrepError::NotFitted(col_name.clone()))?;
            current = match encoding.method {
                EncodingMethod::OneHot => one_hot_expand(current, col_name, &encoding.vocabulary)?,
                EncodingMethod::Ordinal => {
                    if let Some(category) =
                        find_unknown_category(&current, col_name, &encoding.vocabulary).await?
                    {
                        return Err(TabPrepError::UnknownCategory {
                            column: col_name.clone(),
                            category,
                        });
                    }
                    ordinal_replace(current, col_name, &encoding.vocabulary)?
                }
            };
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

    /// The fitted record for `column`, if any.
    pub fn encoding(&self, column: &str) -> Option<&FittedEncoding> {
        self.encoders.get(column)
    }

    /// Returns true if `column` has a fitted encoding record.
    pub fn is_fitted(&self, column: &str) -> bool {
        self.encoders.contains_key(column)
    }
}

impl_transformer!(CategoricalEncoder);
