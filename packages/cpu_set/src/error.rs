use std::io;
use std::num::ParseIntError;

use thiserror::Error;

use crate::Item;

/// Errors that can occur when building, parsing or querying CPU sets.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A CPU ID was at or above [`CPU_ID_LIMIT`][crate::CPU_ID_LIMIT].
    ///
    /// The set the ID was being added to is left unchanged.
    #[error("CPU {cpu} is out of range, CPU IDs must be below {}", crate::CPU_ID_LIMIT)]
    OutOfRange {
        /// The rejected CPU ID.
        cpu: Item,
    },

    /// The bit buffer of a set could not be grown because memory allocation failed.
    ///
    /// The set that was being grown is left unchanged.
    #[error("failed to grow CPU set to {requested_bytes} bytes")]
    AllocationFailure {
        /// The capacity in bytes that could not be reserved.
        requested_bytes: usize,
    },

    /// The caller provided a supposed CPU list but it did not match the expected format.
    #[error("invalid CPU list syntax: '{invalid_value}' is invalid: {problem}")]
    MalformedToken {
        /// The specific value that was invalid. This may either be the entire input
        /// or a single token of it, depending on the problem.
        invalid_value: String,

        /// A human-readable description of the problem.
        problem: String,

        /// The integer conversion error behind the problem, if there was one.
        #[source]
        caused_by: Option<ParseIntError>,
    },

    /// The operating system could not report the affinity mask of the current thread.
    #[error("failed to query the processor affinity of the current thread")]
    OsQueryFailure(#[source] io::Error),
}

impl Error {
    pub(crate) fn malformed(invalid_value: impl Into<String>, problem: impl Into<String>) -> Self {
        Self::MalformedToken {
            invalid_value: invalid_value.into(),
            problem: problem.into(),
            caused_by: None,
        }
    }

    pub(crate) fn caused_by(
        invalid_value: impl Into<String>,
        problem: impl Into<String>,
        caused_by: ParseIntError,
    ) -> Self {
        Self::MalformedToken {
            invalid_value: invalid_value.into(),
            problem: problem.into(),
            caused_by: Some(caused_by),
        }
    }
}

/// A specialized `Result` type for CPU set operations, returning the crate's
/// [`Error`] type as the error value.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::error::Error as _;
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Error: Send, Sync, Debug);

    #[test]
    fn out_of_range_names_the_limit() {
        let error = Error::OutOfRange { cpu: 9000 };

        assert_eq!(
            error.to_string(),
            "CPU 9000 is out of range, CPU IDs must be below 8192"
        );
    }

    #[test]
    fn malformed_token_names_value_and_problem() {
        let error = Error::malformed("abc", "not a number");

        assert_eq!(
            error.to_string(),
            "invalid CPU list syntax: 'abc' is invalid: not a number"
        );
    }

    #[test]
    fn malformed_token_without_cause_has_no_source() {
        let error = Error::malformed("abc", "not a number");

        assert!(error.source().is_none());
    }

    #[test]
    fn malformed_token_exposes_integer_error() {
        let inner = "99999999999".parse::<Item>().unwrap_err();
        let error = Error::caused_by("99999999999", "too big", inner.clone());

        assert_eq!(
            error.to_string(),
            "invalid CPU list syntax: '99999999999' is invalid: too big"
        );

        let source = error.source().unwrap();
        assert_eq!(source.downcast_ref::<ParseIntError>(), Some(&inner));
    }

    #[test]
    fn os_query_failure_exposes_source() {
        let error = Error::OsQueryFailure(io::Error::from(io::ErrorKind::PermissionDenied));

        let source = error.source().unwrap();
        assert!(source.downcast_ref::<io::Error>().is_some());
    }
}
