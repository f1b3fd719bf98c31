//! Name similarity scoring
//!
//! Names are compared with a normalized Levenshtein score:
//! `1 - distance(a, b) / max(len(a), len(b))`, case-insensitive and counted
//! in `char`s. Knows nothing about schemas.

/// Best candidate for a source word
#[derive(Debug, Clone, PartialEq)]
pub struct WordMatch {
    /// The winning candidate, or the source word when there were no candidates
    pub word: String,

    /// Normalized similarity in `[0, 1]`
    pub score: f64,
}

/// Stateless name similarity judge
#[derive(Debug, Clone, Copy, Default)]
pub struct NameScorer;

impl NameScorer {
    pub fn new() -> Self {
        Self
    }

    /// Classic Levenshtein distance with unit costs, one row at a time
    pub fn levenshtein(&self, a: &str, b: &str) -> usize {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();

        // Keep the shorter string in the row
        let (long, short) = if a.len() >= b.len() { (&a, &b) } else { (&b, &a) };
        if short.is_empty() {
            return long.len();
        }

        let mut previous: Vec<usize> = (0..=short.len()).collect();
        let mut current = Vec::with_capacity(short.len() + 1);

        for (i, lc) in long.iter().enumerate() {
            current.clear();
            current.push(i + 1);
            for (j, sc) in short.iter().enumerate() {
                let insertion = previous[j + 1] + 1;
                let deletion = current[j] + 1;
                let substitution = previous[j] + usize::from(lc != sc);
                current.push(insertion.min(deletion).min(substitution));
            }
            std::mem::swap(&mut previous, &mut current);
        }

        previous[short.len()]
    }

    /// Case-insensitive similarity in `[0, 1]`; two empty strings score 1.0
    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        let a = a.to_uppercase();
        let b = b.to_uppercase();

        let max_len = a.chars().count().max(b.chars().count());
        if max_len == 0 {
            return 1.0;
        }

        1.0 - self.levenshtein(&a, &b) as f64 / max_len as f64
    }

    /// Index and score of the best candidate
    ///
    /// Ties keep the earliest candidate. `None` for an empty candidate list.
    pub fn best_match<S: AsRef<str>>(&self, source: &str, candidates: &[S]) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;

        for (index, candidate) in candidates.iter().enumerate() {
            let score = self.similarity(source, candidate.as_ref());
            match best {
                Some((_, top)) if score <= top => {}
                _ => best = Some((index, score)),
            }
        }

        best
    }

    /// Best candidate for `source`, or `(source, 0.0)` if there are none
    pub fn compare_word<S: AsRef<str>>(&self, source: &str, candidates: &[S]) -> WordMatch {
        match self.best_match(source, candidates) {
            Some((index, score)) => WordMatch {
                word: candidates[index].as_ref().to_string(),
                score,
            },
            None => WordMatch {
                word: source.to_string(),
                score: 0.0,
            },
        }
    }
}
