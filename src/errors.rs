//! Error types for ontoval
//!
//! Every error here is fatal for the run that raised it. The first four
//! variants are caller-contract violations (bad input shape or inconsistent
//! data); the rest come from the environment the run executes in.

use thiserror::Error;

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Main error type for ontoval
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// An input row does not have the expected shape
    #[error("Format error at line {line}: {message}")]
    Format { line: usize, message: String },

    /// A distance was requested between nodes that are not connected
    #[error("Node '{to}' is unreachable from '{from}'")]
    UnreachableNode { from: String, to: String },

    /// Two distance matrices cannot be compared position by position
    #[error("Dimension mismatch: {left} vs {right} entries")]
    DimensionMismatch { left: usize, right: usize },

    /// A square matrix with no off-diagonal entries
    #[error("Degenerate distance matrix with {len} entries")]
    DegenerateMatrix { len: usize },

    /// The background corpus cannot supply the requested sample
    #[error("Corpus has {distinct} distinct elements, {requested} requested")]
    InsufficientCorpus { distinct: usize, requested: usize },

    /// Configuration validation failed
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// A statistical distribution could not be constructed or evaluated
    #[error("Statistics error: {message}")]
    Statistics { message: String },

    /// The worker pool could not be built, or a task vanished
    #[error("Worker pool error: {message}")]
    WorkerPool { message: String },

    /// Reading or writing a file failed
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl ValidationError {
    /// Create a format error for a 1-based input line
    pub fn format(line: usize, message: impl Into<String>) -> Self {
        Self::Format {
            line,
            message: message.into(),
        }
    }

    /// Create an unreachable node error
    pub fn unreachable(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::UnreachableNode {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Create a dimension mismatch error
    pub fn dimension_mismatch(left: usize, right: usize) -> Self {
        Self::DimensionMismatch { left, right }
    }

    /// Create an insufficient corpus error
    pub fn insufficient_corpus(distinct: usize, requested: usize) -> Self {
        Self::InsufficientCorpus {
            distinct,
            requested,
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a statistics error
    pub fn statistics(message: impl Into<String>) -> Self {
        Self::Statistics {
            message: message.into(),
        }
    }

    /// Create a worker pool error
    pub fn worker_pool(message: impl Into<String>) -> Self {
        Self::WorkerPool {
            message: message.into(),
        }
    }

    /// Create an I/O error for the given path
    pub fn io(path: impl AsRef<std::path::Path>, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            message: err.to_string(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Check if this error reflects a violated caller precondition
    /// (as opposed to a failure of the environment)
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::Format { .. }
                | Self::UnreachableNode { .. }
                | Self::DimensionMismatch { .. }
                | Self::DegenerateMatrix { .. }
                | Self::InsufficientCorpus { .. }
        )
    }
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ValidationError::format(7, "expected 2 fields, found 1");
        assert!(err.to_string().contains("line 7"));
        assert!(err.to_string().contains("expected 2 fields"));

        let err = ValidationError::unreachable("heart", "lung");
        assert_eq!(err.to_string(), "Node 'lung' is unreachable from 'heart'");

        let err = ValidationError::insufficient_corpus(3, 5);
        assert!(err.to_string().contains("3 distinct"));
        assert!(err.to_string().contains("5 requested"));
    }

    #[test]
    fn test_is_contract_violation() {
        assert!(ValidationError::dimension_mismatch(4, 9).is_contract_violation());
        assert!(ValidationError::DegenerateMatrix { len: 1 }.is_contract_violation());
        assert!(!ValidationError::worker_pool("gone").is_contract_violation());
        assert!(!ValidationError::invalid_config("workers must be > 0").is_contract_violation());
    }

    #[test]
    fn test_from_serde_json() {
        let err: ValidationError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, ValidationError::Serialization { .. }));
    }
}
