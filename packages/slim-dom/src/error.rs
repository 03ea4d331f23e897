//! Error types for tree operations

use thiserror::Error;

pub type DomResult<T> = Result<T, DomError>;

/// A caller handed a tree operation something it cannot act on.
///
/// These are contract violations of the surrounding layer. Operations fail
/// fast with one of these instead of clamping or guessing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("Index {index} out of range for {kind} of length {len}")]
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Path step {step} cannot be followed")]
    InvalidPath { step: usize },

    #[error("Expected {expected}, found {found}")]
    KindMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Object not found: {0}")]
    NodeNotFound(String),
}

impl DomError {
    pub(crate) fn out_of_range(kind: &'static str, index: usize, len: usize) -> Self {
        DomError::IndexOutOfRange { kind, index, len }
    }
}
