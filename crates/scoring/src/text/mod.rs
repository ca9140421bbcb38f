//! Text normalization primitives
//!
//! Provides:
//! - Tokenization (lowercase folding, punctuation stripping)
//! - English stopword filtering
//! - Porter stemming
//! - Pair-scoped TF-IDF vectors and cosine similarity

mod stem;
mod stopwords;
mod tfidf;
mod tokenize;

pub use stem::PorterStemmer;
pub use stopwords::{StopWords, ENGLISH_STOP_WORDS};
pub use tfidf::{cosine_similarity, SparseVector, TfIdf};
pub use tokenize::Tokenizer;

/// Turns raw text into the terms that get vectorized
///
/// Stopwords are matched against the stemmed tokens, so a stopword whose
/// stem differs from it (`"was"` stems to `"wa"`) survives.
#[derive(Debug, Clone, Default)]
pub struct TextNormalizer {
    tokenizer: Tokenizer,
    stop_words: StopWords,
    stemmer: PorterStemmer,
}

impl TextNormalizer {
    /// Normalizer with the English stopword list
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stopword list
    pub fn with_stop_words(mut self, stop_words: StopWords) -> Self {
        self.stop_words = stop_words;
        self
    }

    /// Normalize a text into stemmed, stopword-free terms
    pub fn normalize(&self, text: &str) -> Vec<String> {
        let tokens = self.tokenizer.tokenize(text);
        let stems = self.stemmer.stem_tokens(tokens);
        self.stop_words.filter(stems)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_sentence() {
        let terms = TextNormalizer::new().normalize("The cats were RUNNING, happily!");
        assert_eq!(terms, vec!["cat", "run", "happili"]);
    }

    #[test]
    fn test_stopword_only_text() {
        assert!(TextNormalizer::new().normalize("The a an, of!").is_empty());
    }

    #[test]
    fn test_stop_words_match_stems() {
        assert_eq!(TextNormalizer::new().normalize("it was there"), vec!["wa"]);
    }

    #[test]
    fn test_custom_stop_words() {
        let normalizer = TextNormalizer::new().with_stop_words(StopWords::none());
        assert_eq!(normalizer.normalize("the cat"), vec!["the", "cat"]);
    }
}
