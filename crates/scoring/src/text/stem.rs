//! Porter stemmer
//!
//! Implements the suffix-stripping algorithm of Porter (1980), steps 1a
//! through 5b. It works on lowercase ASCII words; anything containing
//! non-ASCII characters is returned unchanged.
//!
//! # References
//!
//! Porter, M.F. (1980). "An algorithm for suffix stripping."
//! Program, 14(3), 130-137.

/// Step 2 rules, tried in order; the first matching suffix decides.
const STEP2_RULES: &[(&str, &str)] = &[
    ("ational", "ate"),
    ("tional", "tion"),
    ("enci", "ence"),
    ("anci", "ance"),
    ("izer", "ize"),
    ("abli", "able"),
    ("alli", "al"),
    ("entli", "ent"),
    ("eli", "e"),
    ("ousli", "ous"),
    ("ization", "ize"),
    ("ation", "ate"),
    ("ator", "ate"),
    ("alism", "al"),
    ("iveness", "ive"),
    ("fulness", "ful"),
    ("ousness", "ous"),
    ("aliti", "al"),
    ("iviti", "ive"),
    ("biliti", "ble"),
];

const STEP3_RULES: &[(&str, &str)] = &[
    ("icate", "ic"),
    ("ative", ""),
    ("alize", "al"),
    ("iciti", "ic"),
    ("ical", "ic"),
    ("ful", ""),
    ("ness", ""),
];

/// Step 4 suffixes; `ement` must precede `ment` and `ent`.
const STEP4_SUFFIXES: &[&str] = &[
    "al", "ance", "ence", "er", "ic", "able", "ible", "ant", "ement", "ment",
    "ent", "ion", "ou", "ism", "ate", "iti", "ous", "ive", "ize",
];

/// Stateless Porter stemmer
#[derive(Debug, Clone, Copy, Default)]
pub struct PorterStemmer;

impl PorterStemmer {
    pub fn new() -> Self {
        Self
    }

    /// Stem one lowercase word
    pub fn stem(&self, word: &str) -> String {
        if word.len() <= 2 || !word.is_ascii() {
            return word.to_string();
        }

        let mut w = word.as_bytes().to_vec();
        step1a(&mut w);
        step1b(&mut w);
        step1c(&mut w);
        replace_first(&mut w, STEP2_RULES);
        replace_first(&mut w, STEP3_RULES);
        step4(&mut w);
        step5(&mut w);

        // Only ASCII bytes were removed or appended.
        String::from_utf8(w).unwrap_or_else(|_| word.to_string())
    }

    /// Stem every token in place order
    pub fn stem_tokens(&self, tokens: Vec<String>) -> Vec<String> {
        tokens.into_iter().map(|t| self.stem(&t)).collect()
    }
}

fn is_consonant(w: &[u8], i: usize) -> bool {
    match w[i] {
        b'a' | b'e' | b'i' | b'o' | b'u' => false,
        b'y' => i == 0 || !is_consonant(w, i - 1),
        _ => true,
    }
}

/// Number of vowel-consonant sequences, the `m` of the paper
fn measure(w: &[u8]) -> usize {
    let n = w.len();
    let mut i = 0;
    while i < n && is_consonant(w, i) {
        i += 1;
    }

    let mut m = 0;
    loop {
        while i < n && !is_consonant(w, i) {
            i += 1;
        }
        if i >= n {
            return m;
        }
        while i < n && is_consonant(w, i) {
            i += 1;
        }
        m += 1;
    }
}

fn has_vowel(w: &[u8]) -> bool {
    (0..w.len()).any(|i| !is_consonant(w, i))
}

fn ends_double_consonant(w: &[u8]) -> bool {
    let n = w.len();
    n >= 2 && w[n - 1] == w[n - 2] && is_consonant(w, n - 1)
}

/// consonant-vowel-consonant ending, last consonant not w, x or y
fn ends_cvc(w: &[u8]) -> bool {
    let n = w.len();
    n >= 3
        && is_consonant(w, n - 3)
        && !is_consonant(w, n - 2)
        && is_consonant(w, n - 1)
        && !matches!(w[n - 1], b'w' | b'x' | b'y')
}

fn stem_len(w: &[u8], suffix: &str) -> Option<usize> {
    w.ends_with(suffix.as_bytes()).then(|| w.len() - suffix.len())
}

fn set_suffix(w: &mut Vec<u8>, stem_len: usize, replacement: &str) {
    w.truncate(stem_len);
    w.extend_from_slice(replacement.as_bytes());
}

fn step1a(w: &mut Vec<u8>) {
    if let Some(len) = stem_len(w, "sses") {
        set_suffix(w, len, "ss");
    } else if let Some(len) = stem_len(w, "ies") {
        set_suffix(w, len, "i");
    } else if !w.ends_with(b"ss") && w.ends_with(b"s") {
        w.pop();
    }
}

fn step1b(w: &mut Vec<u8>) {
    if let Some(len) = stem_len(w, "eed") {
        if measure(&w[..len]) > 0 {
            set_suffix(w, len, "ee");
        }
        return;
    }

    let word: &[u8] = w;
    let stripped = ["ed", "ing"]
        .iter()
        .find_map(|suffix| stem_len(word, suffix).filter(|&len| has_vowel(&word[..len])));
    let Some(len) = stripped else {
        return;
    };
    w.truncate(len);

    if w.ends_with(b"at") || w.ends_with(b"bl") || w.ends_with(b"iz") {
        w.push(b'e');
    } else if ends_double_consonant(w) && !matches!(w[w.len() - 1], b'l' | b's' | b'z') {
        w.pop();
    } else if measure(w) == 1 && ends_cvc(w) {
        w.push(b'e');
    }
}

fn step1c(w: &mut [u8]) {
    let n = w.len();
    if n > 1 && w[n - 1] == b'y' && has_vowel(&w[..n - 1]) {
        w[n - 1] = b'i';
    }
}

fn replace_first(w: &mut Vec<u8>, rules: &[(&str, &str)]) {
    for (suffix, replacement) in rules {
        if let Some(len) = stem_len(w, suffix) {
            if measure(&w[..len]) > 0 {
                set_suffix(w, len, replacement);
            }
            return;
        }
    }
}

fn step4(w: &mut Vec<u8>) {
    for suffix in STEP4_SUFFIXES {
        if let Some(len) = stem_len(w, suffix) {
            let stem = &w[..len];
            let removable = measure(stem) > 1
                && (*suffix != "ion" || matches!(stem.last(), Some(b's' | b't')));
            if removable {
                w.truncate(len);
            }
            return;
        }
    }
}

fn step5(w: &mut Vec<u8>) {
    if let Some(len) = stem_len(w, "e") {
        let stem = &w[..len];
        let m = measure(stem);
        if m > 1 || (m == 1 && !ends_cvc(stem)) {
            w.truncate(len);
        }
    }

    if w.ends_with(b"ll") && measure(w) > 1 {
        w.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stem(word: &str) -> String {
        PorterStemmer::new().stem(word)
    }

    #[test]
    fn test_plurals() {
        assert_eq!(stem("caresses"), "caress");
        assert_eq!(stem("ponies"), "poni");
        assert_eq!(stem("caress"), "caress");
        assert_eq!(stem("cats"), "cat");
    }

    #[test]
    fn test_ed_ing() {
        assert_eq!(stem("feed"), "feed");
        assert_eq!(stem("plastered"), "plaster");
        assert_eq!(stem("motoring"), "motor");
        assert_eq!(stem("sing"), "sing");
        assert_eq!(stem("hopping"), "hop");
        assert_eq!(stem("running"), "run");
        assert_eq!(stem("filing"), "file");
    }

    #[test]
    fn test_y_suffix() {
        assert_eq!(stem("happy"), "happi");
        assert_eq!(stem("sky"), "sky");
    }

    #[test]
    fn test_derivational_suffixes() {
        assert_eq!(stem("relational"), "relat");
        assert_eq!(stem("conditional"), "condit");
        assert_eq!(stem("generalization"), "gener");
        assert_eq!(stem("adjustment"), "adjust");
        assert_eq!(stem("controlling"), "control");
        assert_eq!(stem("entanglement"), "entangl");
    }

    #[test]
    fn test_short_and_non_ascii_untouched() {
        assert_eq!(stem("is"), "is");
        assert_eq!(stem(""), "");
        assert_eq!(stem("naïveties"), "naïveties");
    }

    #[test]
    fn test_measure() {
        assert_eq!(measure(b"tree"), 0);
        assert_eq!(measure(b"trouble"), 1);
        assert_eq!(measure(b"troubles"), 2);
        assert_eq!(measure(b"oaten"), 2);
    }

    #[test]
    fn test_stem_tokens() {
        let tokens = vec!["cats".to_string(), "sat".to_string()];
        assert_eq!(PorterStemmer::new().stem_tokens(tokens), vec!["cat", "sat"]);
    }
}
