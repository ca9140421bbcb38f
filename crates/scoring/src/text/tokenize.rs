//! Tokenization for document distance
//!
//! Lowercases, drops ASCII punctuation and splits on whitespace.
//! Punctuation is deleted rather than replaced, so `"state-of-the-art"`
//! becomes the single token `"stateoftheart"`.

/// Splits raw text into lowercase word tokens
#[derive(Debug, Clone, Copy, Default)]
pub struct Tokenizer;

impl Tokenizer {
    pub fn new() -> Self {
        Self
    }

    /// Tokenize a text
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let folded: String = text
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_ascii_punctuation())
            .collect();

        folded.split_whitespace().map(str::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_and_split() {
        let tokens = Tokenizer::new().tokenize("The Cat  sat\ton the\nMAT");
        assert_eq!(tokens, vec!["the", "cat", "sat", "on", "the", "mat"]);
    }

    #[test]
    fn test_punctuation_is_deleted() {
        let tokens = Tokenizer::new().tokenize("Hello, world! (state-of-the-art) it's \"done\".");
        assert_eq!(tokens, vec!["hello", "world", "stateoftheart", "its", "done"]);
    }

    #[test]
    fn test_only_punctuation() {
        assert!(Tokenizer::new().tokenize("... -- !!! ?").is_empty());
        assert!(Tokenizer::new().tokenize("").is_empty());
    }

    #[test]
    fn test_non_ascii_is_kept() {
        let tokens = Tokenizer::new().tokenize("Café «naïve»");
        assert_eq!(tokens, vec!["café", "«naïve»"]);
    }
}
