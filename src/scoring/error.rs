use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScoringError {
    #[error(
        "embedding dimension mismatch for candidate {origin}: context has {expected}, candidate has {actual}"
    )]
    DimensionMismatch {
        origin: usize,
        expected: usize,
        actual: usize,
    },
}
