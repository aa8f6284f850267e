//! Domain error types

use thiserror::Error;

/// Domain-level errors
///
/// Scoring, consensus and validation report their outcomes as data. These
/// errors only surface when a configuration table is invalid or when an
/// internal computation produces something it must never return.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Dimension weights for {stage} sum to {sum}, expected 1.0")]
    InvalidWeights { stage: String, sum: f64 },

    #[error("Invalid thresholds for {stage}: {reason}")]
    InvalidThresholds { stage: String, reason: String },

    #[error("Non-finite score for dimension {0}")]
    NonFiniteScore(String),
}

impl DomainError {
    /// Whether the error comes from an injected table rather than a computation
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DomainError::InvalidWeights { .. } | DomainError::InvalidThresholds { .. }
        )
    }
}
