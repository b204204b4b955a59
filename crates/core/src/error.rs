//! Error types for the crash signal pipeline.
//!
//! Only conditions a caller must act on are modelled as errors. Duplicate
//! deliveries and short histories are ordinary outcomes and never show up here.

use thiserror::Error;

/// A raw round record that cannot become a `RoundEvent`.
///
/// These are dropped by the pipeline and counted, never surfaced as failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Multiplier parsed but lies outside the domain-valid range.
    #[error("multiplier {0} outside valid range [1.0, 1000.0]")]
    OutOfRange(f64),

    /// Multiplier missing, unparseable, or not finite.
    #[error("malformed round record: {0}")]
    Malformed(String),
}

impl ValidationError {
    /// Stable reason code for diagnostics.
    #[must_use]
    pub const fn reason_code(&self) -> &'static str {
        match self {
            Self::OutOfRange(_) => "OUT_OF_RANGE",
            Self::Malformed(_) => "MALFORMED",
        }
    }
}

/// Invalid simulation policy, raised when a session is activated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("stake must be positive, got {0}")]
    NonPositiveStake(String),

    #[error("target multiplier must be greater than 1.0, got {0}")]
    TargetNotAboveOne(String),

    #[error("stop-loss must be positive, got {0}")]
    NonPositiveStopLoss(String),

    #[error("take-profit must be positive, got {0}")]
    NonPositiveTakeProfit(String),
}

/// Failure inside an external collaborator (store or notification sink).
///
/// Caught at the pipeline boundary and logged; never propagated into ingestion.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("persistence unavailable: {0}")]
    Persistence(String),

    #[error("notification delivery failed: {0}")]
    Notification(String),
}

impl CollaboratorError {
    /// Wraps any displayable error as a persistence failure.
    pub fn persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    /// Wraps any displayable error as a notification failure.
    pub fn notification(err: impl std::fmt::Display) -> Self {
        Self::Notification(err.to_string())
    }
}
