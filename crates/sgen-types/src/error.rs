// ─────────────────────────────────────────────────────────────────────
// SGEN Spatial Network Generator — Error Hierarchy
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

/// Root error type for all generator failures.
///
/// None of these are recoverable inside a run: the engine propagates
/// them and aborts.
#[derive(Error, Debug)]
pub enum GenerateError {
    /// A value fell outside the range covered by a histogram or
    /// distribution parameter.
    #[error("domain error: value {value} outside [{min}, {max}]")]
    Domain { value: f64, min: f64, max: f64 },

    /// A randomized selection or sampling loop ran out of attempts.
    #[error("retry exhausted: {operation} failed after {attempts} attempts")]
    RetryExhausted { operation: String, attempts: usize },

    /// A move was asked to undo or commit without a pending proposal.
    #[error("invalid sequencing: {0}")]
    InvalidSequencing(String),

    /// Invalid graph input (unknown handle, non-graphical sequence, ...).
    #[error("graph error: {0}")]
    Graph(String),

    /// The external path generator failed.
    #[error("path generation error: {0}")]
    PathGeneration(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Reading or writing a report or parameter file failed.
    #[error("io error: {0}")]
    Io(String),
}

impl GenerateError {
    /// Shorthand for [`GenerateError::RetryExhausted`].
    pub fn retry_exhausted(operation: impl Into<String>, attempts: usize) -> Self {
        Self::RetryExhausted {
            operation: operation.into(),
            attempts,
        }
    }
}

impl From<std::io::Error> for GenerateError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

pub type GenerateResult<T> = Result<T, GenerateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_message() {
        let e = GenerateError::Domain {
            value: 2.5,
            min: 0.0,
            max: 1.0,
        };
        assert_eq!(e.to_string(), "domain error: value 2.5 outside [0, 1]");
    }

    #[test]
    fn test_retry_exhausted_message() {
        let e = GenerateError::retry_exhausted("select_two_valid_edges", 11);
        assert!(e.to_string().contains("select_two_valid_edges"));
        assert!(e.to_string().contains("11"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.json");
        let e: GenerateError = io.into();
        assert!(matches!(e, GenerateError::Io(ref m) if m.contains("missing.json")));
    }
}
