//! Surface variants of a canonical reply.
//!
//! Variant 0 is always the canonical text, unchanged. Every configured modifier
//! then contributes one variant, `"{modifier} {canonical}"`, in configuration order.


use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{DEFAULT_MODIFIERS, MODIFIER_SEPARATOR};

/// Origin index of the unmodified canonical reply.
pub const CANONICAL_ORIGIN: usize = 0;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VariantError {
    #[error("canonical text is empty")]
    EmptyCanonical,
}

/// One phrasing of the reply to be scored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateVariant {
    pub text: String,
    /// `0` for the canonical text, `1..=k` for the k-th modifier.
    pub origin: usize,
}

impl CandidateVariant {
    pub fn new(text: impl Into<String>, origin: usize) -> Self {
        Self {
            text: text.into(),
            origin,
        }
    }

    pub fn is_canonical(&self) -> bool {
        self.origin == CANONICAL_ORIGIN
    }
}

/// Generates `1 + modifiers.len()` variants of `canonical`.
///
/// No deduplication: two modifiers yielding the same string produce two variants
/// that are ranked independently.
pub fn generate_variants<S: AsRef<str>>(
    canonical: &str,
    modifiers: &[S],
) -> Result<Vec<CandidateVariant>, VariantError> {
    if canonical.trim().is_empty() {
        return Err(VariantError::EmptyCanonical);
    }

    let mut variants = Vec::with_capacity(1 + modifiers.len());
    variants.push(CandidateVariant::new(canonical, CANONICAL_ORIGIN));
    variants.extend(modifiers.iter().enumerate().map(|(idx, modifier)| {
        CandidateVariant::new(
            format!("{}{}{}", modifier.as_ref(), MODIFIER_SEPARATOR, canonical),
            idx + 1,
        )
    }));

    Ok(variants)
}

/// Variant generator with a modifier list fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantGenerator {
    modifiers: Vec<String>,
}

impl Default for VariantGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_MODIFIERS.iter().copied())
    }
}

impl VariantGenerator {
    pub fn new<I, S>(modifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            modifiers: modifiers.into_iter().map(Into::into).collect(),
        }
    }

    pub fn modifiers(&self) -> &[String] {
        &self.modifiers
    }

    /// Number of variants produced per call (`1 + modifiers`).
    pub fn variant_count(&self) -> usize {
        1 + self.modifiers.len()
    }

    pub fn generate_variants(&self, canonical: &str) -> Result<Vec<CandidateVariant>, VariantError> {
        generate_variants(canonical, &self.modifiers)
    }
}
