//! Error types for bin2dec-evo
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Error type for genome operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GenomeError {
    /// A phenotype index past the number of declared variables
    #[error("Variable index {index} out of range ({count} variables declared)")]
    IndexOutOfRange { index: usize, count: usize },

    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Error type for operator failures
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OperatorError {
    /// Crossover operation failed
    #[error("Crossover failed: {0}")]
    CrossoverFailed(String),

    /// Invalid operator configuration
    #[error("Invalid operator configuration: {0}")]
    InvalidConfiguration(String),
}

/// Failure reported by a user-supplied objective function
#[derive(Debug, Error)]
#[error("Objective evaluation failed: {message}")]
pub struct ObjectiveError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl ObjectiveError {
    /// Create an objective error from a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create an objective error wrapping an underlying cause
    pub fn with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// The message describing the failure
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Top-level error type for evolution operations
#[derive(Debug, Error)]
pub enum EvolutionError {
    /// Genome error
    #[error("Genome error: {0}")]
    Genome(#[from] GenomeError),

    /// Operator error
    #[error("Operator error: {0}")]
    Operator(#[from] OperatorError),

    /// The objective function failed; the run is aborted
    #[error(transparent)]
    Objective(#[from] ObjectiveError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Empty population
    #[error("Empty population")]
    EmptyPopulation,
}

/// Result type alias for evolution operations
pub type EvoResult<T> = Result<T, EvolutionError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_genome_error_display() {
        let err = GenomeError::IndexOutOfRange { index: 3, count: 2 };
        assert_eq!(
            err.to_string(),
            "Variable index 3 out of range (2 variables declared)"
        );

        let err = GenomeError::DimensionMismatch {
            expected: 10,
            actual: 5,
        };
        assert_eq!(err.to_string(), "Dimension mismatch: expected 10, got 5");
    }

    #[test]
    fn test_operator_error_display() {
        let err = OperatorError::CrossoverFailed("incompatible parents".to_string());
        assert_eq!(err.to_string(), "Crossover failed: incompatible parents");
    }

    #[test]
    fn test_evolution_error_from_genome_error() {
        let genome_err = GenomeError::IndexOutOfRange { index: 1, count: 1 };
        let evo_err: EvolutionError = genome_err.into();
        assert!(matches!(evo_err, EvolutionError::Genome(_)));
    }

    #[test]
    fn test_objective_error_is_transparent() {
        let err: EvolutionError = ObjectiveError::new("domain error").into();
        assert_eq!(err.to_string(), "Objective evaluation failed: domain error");
    }

    #[test]
    fn test_objective_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err = ObjectiveError::with_source("lookup failed", io);
        assert_eq!(err.message(), "lookup failed");
        assert!(err.source().is_some());
    }
}
