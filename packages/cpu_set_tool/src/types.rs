// Public API types for cpu_set_tool.
//
// These types are used by main.rs and exposed via the crate's public API.

use thiserror::Error;

/// How the resulting set is printed.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum OutputFormat {
    /// Every CPU ID on its own, e.g. `0 1 2 3 8`.
    #[default]
    Ids,
    /// Runs of consecutive IDs collapsed into ranges, e.g. `0-3 8`.
    Ranges,
}

/// Input parameters for the `run` function.
///
/// This is the parsed and validated input that the core logic operates on.
#[doc(hidden)]
#[derive(Debug)]
#[allow(
    clippy::exhaustive_structs,
    reason = "This is a hidden struct for internal/test use only"
)]
pub struct RunInput {
    /// Start from the affinity of the current thread instead of an empty set.
    pub current: bool,
    /// How to print the result.
    pub format: OutputFormat,
    /// CPU lists to apply in order.
    pub lists: Vec<String>,
}

/// Errors that can occur while running the tool.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RunError {
    /// The affinity of the current thread could not be determined.
    #[error("failed to determine the affinity of the current thread")]
    Affinity(#[source] cpu_set::Error),

    /// One of the CPU lists could not be applied.
    #[error("invalid CPU list '{list}'")]
    InvalidList {
        /// The CPU list as given on the command line.
        list: String,

        /// Why the list was rejected.
        #[source]
        source: cpu_set::Error,
    },
}
