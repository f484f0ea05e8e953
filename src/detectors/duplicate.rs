//! DuplicateDetector: shingled-text near-duplicate detection over a Bloom
//! filter
//!
//! Tokens are grouped into overlapping k-grams ("shingles"); a message is
//! flagged as a duplicate when the fraction of its shingles already present
//! in the Bloom filter meets a configured threshold. The filter only ever
//! grows (Bloom bits are never cleared), so the score for repeated or
//! overlapping text trends toward 1.0 over time.

use crate::bloom::BloomFilter;
use crate::common::tokenize;
use crate::common::validation;
use crate::common::Result;

/// Outcome of observing one message against the duplicate filter
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DuplicateReport {
    /// Whether `duplicate_score >= duplicate_threshold`
    pub is_duplicate: bool,
    /// Fraction of this message's shingles already seen, in `[0.0, 1.0]`
    pub duplicate_score: f64,
    /// Current Bloom filter fill ratio, after this message's shingles were
    /// inserted
    pub fill_ratio: f64,
}

/// Shingle + Bloom near-duplicate oracle
#[derive(Clone, Debug)]
pub struct DuplicateDetector {
    bloom: BloomFilter,
    shingle_size: usize,
    duplicate_threshold: f64,
}

impl DuplicateDetector {
    /// Construct a detector
    ///
    /// # Errors
    /// Returns `InvalidParameter` if `shingle_size` is zero, or propagates
    /// `BloomFilter::new`'s validation errors.
    pub fn new(
        capacity: usize,
        error_rate: f64,
        shingle_size: usize,
        duplicate_threshold: f64,
        seed: u64,
    ) -> Result<Self> {
        validation::validate_positive_usize(shingle_size, "shingle_size")?;
        validation::validate_threshold(duplicate_threshold, "duplicate_threshold")?;
        let bloom = BloomFilter::new(capacity, error_rate, seed)?;
        Ok(Self {
            bloom,
            shingle_size,
            duplicate_threshold,
        })
    }

    /// Tokenize `text` and produce its overlapping k-gram shingles
    ///
    /// If `shingle_size <= 1`, shingles are the tokens themselves. If fewer
    /// tokens than `shingle_size` are present, returns an empty list.
    fn shingles(&self, text: &str) -> Vec<String> {
        let tokens: Vec<&str> = tokenize(text).collect();
        if self.shingle_size <= 1 {
            return tokens.into_iter().map(str::to_string).collect();
        }
        if tokens.len() < self.shingle_size {
            return Vec::new();
        }
        tokens
            .windows(self.shingle_size)
            .map(|w| w.join(" "))
            .collect()
    }

    fn score(&self, shingles: &[String]) -> (bool, f64) {
        if shingles.is_empty() {
            return (false, 0.0);
        }
        let hits = shingles
            .iter()
            .filter(|s| self.bloom.contains(s.as_bytes()))
            .count();
        let score = hits as f64 / shingles.len() as f64;
        (score >= self.duplicate_threshold, score)
    }

    /// Compute the duplicate verdict for `text` without mutating state
    pub fn is_duplicate(&self, text: &str) -> (bool, f64) {
        self.score(&self.shingles(text))
    }

    /// Score `text` against the current filter, then insert its shingles
    ///
    /// Query precedes insertion: inserting first would make every message
    /// trivially match itself.
    pub fn observe_message(&mut self, text: &str) -> DuplicateReport {
        let shingles = self.shingles(text);
        let (is_duplicate, duplicate_score) = self.score(&shingles);
        for shingle in &shingles {
            self.bloom.add(shingle.as_bytes());
        }
        DuplicateReport {
            is_duplicate,
            duplicate_score,
            fill_ratio: self.bloom.fill_ratio(),
        }
    }

    /// Current Bloom filter fill ratio
    pub fn fill_ratio(&self) -> f64 {
        self.bloom.fill_ratio()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> DuplicateDetector {
        DuplicateDetector::new(1000, 0.01, 3, 0.7, 0).unwrap()
    }

    #[test]
    fn test_new_rejects_zero_shingle_size() {
        assert!(DuplicateDetector::new(1000, 0.01, 0, 0.7, 0).is_err());
    }

    #[test]
    fn test_new_rejects_bad_threshold() {
        assert!(DuplicateDetector::new(1000, 0.01, 3, 0.0, 0).is_err());
    }

    #[test]
    fn test_shingles_fewer_tokens_than_k_is_empty() {
        let det = detector();
        assert!(det.shingles("one two").is_empty());
    }

    #[test]
    fn test_shingle_size_one_uses_tokens_directly() {
        let det = DuplicateDetector::new(1000, 0.01, 1, 0.7, 0).unwrap();
        assert_eq!(det.shingles("alpha beta"), vec!["alpha", "beta"]);
    }

    #[test]
    fn test_near_duplicate_scenario() {
        // the canonical near-duplicate scenario
        let mut det = detector();
        let text = "wire transfer payment urgent immediate action";

        let first = det.observe_message(text);
        assert!(!first.is_duplicate);
        assert_eq!(first.duplicate_score, 0.0);

        let second = det.observe_message(text);
        assert!(second.is_duplicate);
        assert_eq!(second.duplicate_score, 1.0);
    }

    #[test]
    fn test_query_precedes_insertion() {
        let mut det = detector();
        let text = "alpha beta gamma delta";
        let (is_dup, score) = det.is_duplicate(text);
        assert!(!is_dup);
        assert_eq!(score, 0.0);
        // is_duplicate must not have mutated state
        let (is_dup_again, score_again) = det.is_duplicate(text);
        assert_eq!((is_dup, score), (is_dup_again, score_again));
    }

    #[test]
    fn test_empty_text_never_a_duplicate() {
        let mut det = detector();
        let report = det.observe_message("");
        assert!(!report.is_duplicate);
        assert_eq!(report.duplicate_score, 0.0);
    }

    #[test]
    fn test_partial_overlap_score_between_bounds() {
        let mut det = detector();
        det.observe_message("the quick brown fox jumps over");
        let report = det.observe_message("the quick brown cat jumps over");
        assert!(report.duplicate_score > 0.0 && report.duplicate_score < 1.0);
    }
}
