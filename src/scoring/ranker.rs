use std::cmp::Ordering;

use tracing::debug;

use crate::embedding::Embedding;
use crate::variants::CandidateVariant;

use super::error::ScoringError;
use super::types::{RankedList, ScoredCandidate};

/// Scores candidates by dot product with the context and sorts them.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityRanker;

impl SimilarityRanker {
    pub fn new() -> Self {
        Self
    }

    /// Ranks `candidates` against `context`, highest score first.
    ///
    /// The output is a permutation of the input; equal scores keep input order and
    /// NaN scores sort last. Every candidate vector must have the context's dimension.
    pub fn rank(
        &self,
        candidates: Vec<(CandidateVariant, Embedding)>,
        context: &[f32],
    ) -> Result<RankedList, ScoringError> {
        let mut scored = candidates
            .into_iter()
            .map(|(variant, embedding)| {
                if embedding.len() != context.len() {
                    return Err(ScoringError::DimensionMismatch {
                        origin: variant.origin,
                        expected: context.len(),
                        actual: embedding.len(),
                    });
                }
                let score = dot_product(&embedding, context);
                Ok(ScoredCandidate::new(variant.text, variant.origin, score))
            })
            .collect::<Result<Vec<_>, _>>()?;

        // `sort_by` is stable.
        scored.sort_by(|a, b| by_score_desc(a.score, b.score));

        for candidate in &scored {
            debug!(
                origin = candidate.origin,
                score = candidate.score,
                text = %candidate.text,
                "Scored candidate"
            );
        }

        Ok(RankedList::from_sorted(scored))
    }
}

/// Unnormalized inner product of two equal-length vectors.
#[inline]
pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn by_score_desc(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}
