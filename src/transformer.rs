//! ## Transformer lifecycle
//!
//! Every stateful component in tabprep follows the same contract:
//!
//! 1. `fit` computes per-column parameters from a reference DataFrame and stores them,
//!    replacing whatever was stored for those columns before.
//! 2. `transform` applies the stored parameters to a (possibly different) DataFrame and
//!    returns a new DataFrame. Requesting a column that was never fit is an error.
//! 3. `fit_transform` is `fit` followed by `transform` on the same data.
//!
//! The [`Transformer`] trait captures this contract so heterogeneous transformers can be
//! driven through `Box<dyn Transformer + Send + Sync>`. The [`crate::impl_transformer`]
//! macro implements it for a type that already has matching inherent methods.

use crate::exceptions::TabPrepResult;
use async_trait::async_trait;
use datafusion::prelude::*;

/// Common fit/transform interface for column-wise transformers.
#[async_trait]
pub trait Transformer: Send + Sync {
    /// Fit the transformer on the given columns of `df`.
    ///
    /// # Arguments
    ///
    /// * `df` - The reference DataFrame.
    /// * `columns` - Names of the columns to fit. Each must exist in `df`.
    async fn fit(&mut self, df: &DataFrame, columns: &[String]) -> TabPrepResult<()>;

    /// Apply the fitted parameters for `columns` and return the transformed DataFrame.
    ///
    /// Takes `&mut self` because transformers may record what they saw (e.g. the outlier log).
    async fn transform(&mut self, df: DataFrame, columns: &[String]) -> TabPrepResult<DataFrame>;

    /// Returns true if `column` has fitted state.
    fn is_fitted(&self, column: &str) -> bool;

    /// Fit on `df` and then transform it.
    async fn fit_transform(
        &mut self,
        df: DataFrame,
        columns: &[String],
    ) -> TabPrepResult<DataFrame> {
        self.fit(&df, columns).await?;
        self.transform(df, columns).await
    }
}

/// Macro to implement the [`Transformer`] trait for tabprep transformers.
///
/// The type must already have inherent methods:
/// - `async fn fit(&mut self, &DataFrame, &[String]) -> TabPrepResult<()>`
/// - `async fn transform(&mut self, DataFrame, &[String]) -> TabPrepResult<DataFrame>`
/// - `fn is_fitted(&self, &str) -> bool`
#[macro_export]
macro_rules! impl_transformer {
    ($ty:ty) => {
        #[async_trait::async_trait]
        impl $crate::transformer::Transformer for $ty {
            async fn fit(
                &mut self,
                df: &datafusion::prelude::DataFrame,
                columns: &[String],
            ) -> $crate::exceptions::TabPrepResult<()> {
                <$ty>::fit(self, df, columns).await
            }
            async fn transform(
                &mut self,
                df: datafusion::prelude::DataFrame,
                columns: &[String],
            ) -> $crate::exceptions::TabPrepResult<datafusion::prelude::DataFrame> {
                <$ty>::transform(self, df, columns).await
            }
            fn is_fitted(&self, column: &str) -> bool {
                <$ty>::is_fitted(self, column)
            }
        }
    };
}
