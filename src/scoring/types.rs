use serde::{Deserialize, Serialize};

/// A candidate reply with its similarity to the dialogue context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub text: String,
    /// `0` for the canonical reply, `i` for the variant built from the `i`-th modifier.
    pub origin: usize,
    pub score: f32,
}

impl ScoredCandidate {
    pub fn new(text: impl Into<String>, origin: usize, score: f32) -> Self {
        Self {
            text: text.into(),
            origin,
            score,
        }
    }

    pub fn is_canonical(&self) -> bool {
        self.origin == crate::variants::CANONICAL_ORIGIN
    }
}

impl std::fmt::Display for ScoredCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:.4}] {}", self.score, self.text)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
/// Candidates sorted by descending score.
pub struct RankedList {
    candidates: Vec<ScoredCandidate>,
}

impl RankedList {
    pub(crate) fn from_sorted(candidates: Vec<ScoredCandidate>) -> Self {
        Self { candidates }
    }

    /// Highest-scoring candidate.
    pub fn top(&self) -> Option<&ScoredCandidate> {
        self.candidates.first()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScoredCandidate> {
        self.candidates.iter()
    }

    pub fn as_slice(&self) -> &[ScoredCandidate] {
        &self.candidates
    }

    /// Candidate texts in ranked order.
    pub fn texts(&self) -> Vec<&str> {
        self.candidates.iter().map(|c| c.text.as_str()).collect()
    }

    pub fn into_vec(self) -> Vec<ScoredCandidate> {
        self.candidates
    }

    pub fn into_top_text(self) -> Option<String> {
        self.candidates.into_iter().next().map(|c| c.text)
    }
}

impl IntoIterator for RankedList {
    type Item = ScoredCandidate;
    type IntoIter = std::vec::IntoIter<ScoredCandidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.into_iter()
    }
}

impl<'a> IntoIterator for &'a RankedList {
    type Item = &'a ScoredCandidate;
    type IntoIter = std::slice::Iter<'a, ScoredCandidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}
