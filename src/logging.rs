//! ## Logging Configuration
//!
//! Logging is set up automatically at program startup using the `ctor` crate.
//! The transformers emit `tracing` events (fitted vocabularies, IQR bounds, outlier counts);
//! whether anything is printed is controlled by the `DEBUG_TABPREP` environment variable:
//!
//! - **Disabled** (default): If the variable is unset, empty, or explicitly set to `"0"` or `"false"`,
//!   no subscriber is installed.
//! - **Enabled**: Any other value installs a formatting subscriber with a maximum level of `DEBUG`.
//!
//! ```sh
//! export DEBUG_TABPREP=true
//! ```

use ctor::ctor;
use tracing::Level;

/// Returns true when the given value of `DEBUG_TABPREP` turns logging on.
fn logging_enabled(value: Option<&str>) -> bool {
    value.is_some_and(|v| !(v == "0" || v == "false" || v.is_empty()))
}

#[ctor]
fn set_debug_level() {
    let value = std::env::var("DEBUG_TABPREP").ok();
    if logging_enabled(value.as_deref()) {
        // Another subscriber may already be installed by the host application.
        let _ = tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .try_init();
    }
}
