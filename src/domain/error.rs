//! Domain-level errors (no I/O or configuration concerns)

use itertools::Itertools;
use thiserror::Error;

use crate::domain::entities::Position;

/// Domain errors represent malformed input or an inconsistent tree.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug)]
pub enum DomainError {
    /// A header or node line does not have the expected lexical shape.
    #[error("format error at line {line}: {reason}")]
    Format { line: usize, reason: String },

    /// The declared tree structure needs more lines than the input holds.
    #[error("unexpected end of input at line {line}: expected {expected}")]
    UnexpectedEndOfInput { line: usize, expected: String },

    #[error("failed to read line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: std::io::Error,
    },

    /// Well-formed tree whose replayed path produces an impossible board.
    #[error("data integrity violation at path [{}]: {reason}", format_path(.path))]
    DataIntegrity { path: Vec<Position>, reason: String },

    #[error("unsupported mark type count {0}: boards can only be reconstructed for two mark types")]
    UnsupportedMarkTypes(usize),

    #[error("unknown outcome code {0}")]
    UnknownOutcome(i64),
}

impl DomainError {
    pub(crate) fn format(line: usize, reason: impl Into<String>) -> Self {
        Self::Format {
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn integrity(path: &[Position], reason: impl Into<String>) -> Self {
        Self::DataIntegrity {
            path: path.to_vec(),
            reason: reason.into(),
        }
    }

    /// True for errors caused by the shape or content of the input data.
    pub fn is_data_error(&self) -> bool {
        !matches!(self, DomainError::Read { .. })
    }
}

fn format_path(path: &[Position]) -> String {
    path.iter().join(" ")
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
