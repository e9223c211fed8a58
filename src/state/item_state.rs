/// Per-candidate failure classification
///
/// A skipped candidate produces no record; it is logged and never retried.
use crate::state::CandidateId;
use std::fmt;

/// Why a candidate was dropped from the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The detail page did not finish loading within the bound
    NavigationTimeout,

    /// Navigation failed outright (driver error, refused connection, ...)
    NavigationFailed(String),

    /// The page loaded but the identity element never appeared
    IdentityTimeout,

    /// The rendered document could not be read back from the session
    DocumentUnavailable(String),
}

impl SkipReason {
    /// Short machine-friendly label
    pub fn label(&self) -> &'static str {
        match self {
            Self::NavigationTimeout => "navigation_timeout",
            Self::NavigationFailed(_) => "navigation_failed",
            Self::IdentityTimeout => "identity_timeout",
            Self::DocumentUnavailable(_) => "document_unavailable",
        }
    }

    /// Returns true if a bounded wait expired
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::NavigationTimeout | Self::IdentityTimeout)
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NavigationFailed(detail) | Self::DocumentUnavailable(detail) => {
                write!(f, "{} ({})", self.label(), detail)
            }
            _ => write!(f, "{}", self.label()),
        }
    }
}

/// A candidate that produced no record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedItem {
    /// 1-based position in the candidate list
    pub position: usize,
    pub candidate: CandidateId,
    pub reason: SkipReason,
}
