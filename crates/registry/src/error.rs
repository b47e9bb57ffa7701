//! Registry error types
//!
//! Every failure the registries can report is a [`RegistryError`]. The
//! dimensional and pattern layers pass these through untouched, so callers
//! see the same variant whether they went through the flat registry directly
//! or through a decorator.

use thiserror::Error;

use crate::metrics::MetricKind;

/// Errors produced by metric registration and registry construction
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A key-derivation pattern failed to compile
    #[error("Invalid key pattern '{pattern}': {source}")]
    InvalidPattern {
        /// Pattern text as supplied by the caller
        pattern: String,
        /// Underlying syntax error
        #[source]
        source: regex::Error,
    },

    /// The resolved key already holds a metric of another kind
    #[error("Metric '{key}' is registered as a {existing}, requested a {requested}")]
    KindMismatch {
        /// Resolved storage key
        key: String,
        /// Kind currently stored under the key
        existing: MetricKind,
        /// Kind the caller asked for
        requested: MetricKind,
    },

    /// `add` was called for a key that already holds a metric of that kind
    #[error("Metric '{key}' is already registered as a {kind}")]
    AlreadyRegistered {
        /// Resolved storage key
        key: String,
        /// Kind stored under the key
        kind: MetricKind,
    },

    /// Registry configuration failed validation
    #[error("Invalid registry configuration: {message}")]
    InvalidConfig {
        /// Human-readable reason
        message: String,
    },
}

impl RegistryError {
    /// Stable label suitable for log fields
    pub fn label(&self) -> &'static str {
        match self {
            Self::InvalidPattern { .. } => "invalid_pattern",
            Self::KindMismatch { .. } => "kind_mismatch",
            Self::AlreadyRegistered { .. } => "already_registered",
            Self::InvalidConfig { .. } => "invalid_config",
        }
    }
}

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mismatch_display() {
        let err = RegistryError::KindMismatch {
            key: "requests".to_string(),
            existing: MetricKind::Counter,
            requested: MetricKind::Histogram,
        };
        assert_eq!(
            err.to_string(),
            "Metric 'requests' is registered as a counter, requested a histogram"
        );
        assert_eq!(err.label(), "kind_mismatch");
    }

    /// Validates the invalid pattern variant keeps the regex error as source.
    ///
    /// Assertions:
    /// - Ensures `std::error::Error::source(&err)` is present.
    /// - Ensures the message names the offending pattern.
    #[test]
    fn test_invalid_pattern_source() {
        let source = regex::Regex::new("(unclosed").unwrap_err();
        let err = RegistryError::InvalidPattern { pattern: "(unclosed".to_string(), source };

        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("'(unclosed'"));
    }
}
