//! Semantic distance between two document texts
//!
//! Distance is `1 - cosine(tfidf(d1), tfidf(d2))`. The TF-IDF model is
//! fitted on exactly the two texts being compared, on every call. Document
//! frequencies therefore only say whether a term occurs in one or both of
//! the pair, never how common it is across a corpus. This is a debatable
//! modeling choice, but contribution scores computed elsewhere depend on
//! it, so corpus-wide statistics would change published numbers.

use crate::text::{cosine_similarity, TextNormalizer, TfIdf};
use serde::Serialize;
use thiserror::Error;

/// Slack allowed around [0, 1] before a distance counts as out of range
pub const DISTANCE_TOLERANCE: f64 = 1e-9;

/// Why no distance could be produced for a pair of texts
#[derive(Error, Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Unavailable {
    #[error("one of the texts is empty or missing")]
    EmptyText,

    #[error("no terms left to vectorize after normalization")]
    EmptyVocabulary,

    #[error("computed distance {value} is outside [0, 1]")]
    OutOfRange { value: f64 },
}

impl Unavailable {
    /// Short label for metrics
    pub fn label(&self) -> &'static str {
        match self {
            Unavailable::EmptyText => "empty_text",
            Unavailable::EmptyVocabulary => "empty_vocabulary",
            Unavailable::OutOfRange { .. } => "out_of_range",
        }
    }
}

/// Anything that can measure the distance between two texts
///
/// `None` and `Some("")` are both "no usable text".
pub trait DocumentDistance: Send + Sync {
    fn document_distance(&self, d1: Option<&str>, d2: Option<&str>) -> Result<f64, Unavailable>;
}

/// TF-IDF cosine distance engine
#[derive(Debug, Clone, Default)]
pub struct DistanceEngine {
    normalizer: TextNormalizer,
}

impl DistanceEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_normalizer(normalizer: TextNormalizer) -> Self {
        Self { normalizer }
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }
}

impl DocumentDistance for DistanceEngine {
    fn document_distance(&self, d1: Option<&str>, d2: Option<&str>) -> Result<f64, Unavailable> {
        let (d1, d2) = match (non_empty(d1), non_empty(d2)) {
            (Some(d1), Some(d2)) => (d1, d2),
            _ => return Err(Unavailable::EmptyText),
        };

        let documents = [self.normalizer.normalize(d1), self.normalizer.normalize(d2)];
        let vectors = TfIdf::fit_transform(&documents[..]).ok_or(Unavailable::EmptyVocabulary)?;

        // A side with no terms has a zero vector and no defined angle.
        let similarity =
            cosine_similarity(&vectors[0], &vectors[1]).ok_or(Unavailable::EmptyVocabulary)?;

        checked_distance(1.0 - similarity)
    }
}

fn non_empty(text: Option<&str>) -> Option<&str> {
    text.filter(|t| !t.is_empty())
}

/// Snap rounding noise onto the bounds, reject anything further out
///
/// Values within [`DISTANCE_TOLERANCE`] of 0 or 1 become exactly 0 or 1,
/// so identical texts always compare at distance 0.
pub fn checked_distance(distance: f64) -> Result<f64, Unavailable> {
    if distance.abs() <= DISTANCE_TOLERANCE {
        Ok(0.0)
    } else if (distance - 1.0).abs() <= DISTANCE_TOLERANCE {
        Ok(1.0)
    } else if (0.0..=1.0).contains(&distance) {
        Ok(distance)
    } else {
        Err(Unavailable::OutOfRange { value: distance })
    }
}
