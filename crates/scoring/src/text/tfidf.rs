//! TF-IDF vectorization fitted on a fixed, small set of documents
//!
//! Term frequency is the raw count. Inverse document frequency uses the
//! smoothed form `ln((1 + n) / (1 + df)) + 1`, and every document vector
//! is L2 normalized, which is what scikit-learn's `TfidfVectorizer` does
//! with its defaults.

use std::collections::{BTreeMap, HashSet};

/// Sparse term-weight vector
pub type SparseVector = BTreeMap<String, f64>;

/// Vectorizer whose vocabulary is the documents it was given
#[derive(Debug, Clone, Default)]
pub struct TfIdf {
    idf: BTreeMap<String, f64>,
}

impl TfIdf {
    /// Fit vocabulary and document frequencies on tokenized documents
    ///
    /// Returns `None` when the documents contain no terms at all.
    pub fn fit<S: AsRef<str>>(documents: &[Vec<S>]) -> Option<Self> {
        let mut df: BTreeMap<String, usize> = BTreeMap::new();

        for doc in documents {
            let unique: HashSet<&str> = doc.iter().map(|t| t.as_ref()).collect();
            for term in unique {
                *df.entry(term.to_string()).or_insert(0) += 1;
            }
        }

        if df.is_empty() {
            return None;
        }

        let n = documents.len() as f64;
        let idf = df
            .into_iter()
            .map(|(term, count)| {
                let weight = ((1.0 + n) / (1.0 + count as f64)).ln() + 1.0;
                (term, weight)
            })
            .collect();

        Some(Self { idf })
    }

    /// Weight a tokenized document against the fitted vocabulary
    ///
    /// Terms outside the vocabulary are ignored.
    pub fn transform<S: AsRef<str>>(&self, document: &[S]) -> SparseVector {
        let mut tf: BTreeMap<&str, f64> = BTreeMap::new();
        for term in document {
            *tf.entry(term.as_ref()).or_insert(0.0) += 1.0;
        }

        let mut vector: SparseVector = tf
            .into_iter()
            .filter_map(|(term, count)| {
                self.idf.get(term).map(|idf| (term.to_string(), count * idf))
            })
            .collect();

        let norm = l2_norm(&vector);
        if norm > 0.0 {
            for weight in vector.values_mut() {
                *weight /= norm;
            }
        }
        vector
    }

    /// Fit on the documents and return their vectors
    pub fn fit_transform<S: AsRef<str>>(documents: &[Vec<S>]) -> Option<Vec<SparseVector>> {
        let model = Self::fit(documents)?;
        Some(documents.iter().map(|doc| model.transform(doc)).collect())
    }
}

fn l2_norm(vector: &SparseVector) -> f64 {
    vector.values().map(|w| w * w).sum::<f64>().sqrt()
}

/// Cosine similarity of two sparse vectors
///
/// Returns `None` if either vector has zero length.
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> Option<f64> {
    let norm_a = l2_norm(a);
    let norm_b = l2_norm(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }

    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let dot: f64 = small
        .iter()
        .filter_map(|(term, w)| large.get(term).map(|v| w * v))
        .sum();

    Some(dot / (norm_a * norm_b))
}
