//! Similarity scoring of candidate replies against the dialogue context.
//!
//! Each candidate's score is the raw dot product of its response embedding with the
//! context embedding. Vectors are not normalized here: a dual encoder trained with a
//! dot-product objective is scored the way it was trained.
//!
//! Ranking is a stable descending sort, so candidates with equal scores keep the
//! order they were generated in and the canonical reply (origin `0`) wins ties.

pub mod error;
pub mod ranker;
pub mod types;


pub use error::ScoringError;
pub use ranker::{SimilarityRanker, dot_product};
pub use types::{RankedList, ScoredCandidate};
