//! Failure taxonomy shared by every pipeline stage
//!
//! Each crate keeps its own error enum, but every error maps onto one of these
//! kinds. Retry helpers use the kind to decide whether a call is repeated, and
//! the orchestrator logs every skipped unit of work with its kind.

use std::fmt;

/// Classification of a failure, independent of which crate raised it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FailureKind {
    /// A collector or its upstream failed; the source is skipped for this run
    SourceUnavailable,

    /// Timeout, 5xx or rate limit; retried with bounded backoff at the call site
    TransientService,

    /// Authentication or malformed request; never retried
    PermanentService,

    /// Inference output did not match the expected document shape
    MalformedResponse,

    /// A stored table header did not match the canonical header
    SchemaDrift,
}

impl FailureKind {
    /// Stable lowercase name, used as a structured log field
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::SourceUnavailable => "source_unavailable",
            FailureKind::TransientService => "transient_service",
            FailureKind::PermanentService => "permanent_service",
            FailureKind::MalformedResponse => "malformed_response",
            FailureKind::SchemaDrift => "schema_drift",
        }
    }

    /// Whether a call that failed this way may be attempted again immediately
    pub fn is_retryable(&self) -> bool {
        matches!(self, FailureKind::TransientService)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can be placed in the failure taxonomy
pub trait Classify {
    /// The taxonomy kind of this failure
    fn kind(&self) -> FailureKind;

    /// Shorthand for `self.kind().is_retryable()`
    fn is_transient(&self) -> bool {
        self.kind().is_retryable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Flaky;

    impl Classify for Flaky {
        fn kind(&self) -> FailureKind {
            FailureKind::TransientService
        }
    }

    #[test]
    fn test_only_transient_is_retryable() {
        assert!(FailureKind::TransientService.is_retryable());
        assert!(!FailureKind::PermanentService.is_retryable());
        assert!(!FailureKind::SourceUnavailable.is_retryable());
        assert!(!FailureKind::MalformedResponse.is_retryable());
        assert!(!FailureKind::SchemaDrift.is_retryable());
    }

    #[test]
    fn test_classify_default_is_transient() {
        assert!(Flaky.is_transient());
    }

    #[test]
    fn test_display_names() {
        assert_eq!(FailureKind::SchemaDrift.to_string(), "schema_drift");
        assert_eq!(FailureKind::SourceUnavailable.to_string(), "source_unavailable");
    }
}
