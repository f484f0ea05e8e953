//! FrequencyDetector: a Count-Min Sketch plus a bounded top-K tracker
//!
//! The CMS alone answers "how often has this token occurred" for a token you
//! already have in hand; it can't enumerate its own heavy hitters. This
//! detector adds a small, explicitly-refreshed map that does, at the cost of
//! occasionally missing a token that became heavy between refreshes (see
//! [`FrequencyDetector::periodic_update`]).

use std::collections::HashMap;

use crate::cms::CountMinSketch;
use crate::common::tokenize;
use crate::common::Result;

/// CMS-backed frequency oracle with a bounded top-K tracker
#[derive(Clone, Debug)]
pub struct FrequencyDetector {
    cms: CountMinSketch,
    top_k: usize,
    tracked: HashMap<String, u64>,
    message_count: u64,
}

impl FrequencyDetector {
    /// Build a detector from an existing Count-Min Sketch
    ///
    /// # Errors
    /// Returns `InvalidParameter` if `top_k` is zero.
    pub fn new(cms: CountMinSketch, top_k: usize) -> Result<Self> {
        crate::common::validation::validate_positive_usize(top_k, "top_k")?;
        Ok(Self {
            cms,
            top_k,
            tracked: HashMap::with_capacity(top_k),
            message_count: 0,
        })
    }

    /// Build a detector sizing its CMS from `(epsilon, delta)`
    ///
    /// # Errors
    /// Propagates CMS construction errors, or `InvalidParameter` if `top_k`
    /// is zero.
    pub fn from_error_rate(epsilon: f64, delta: f64, seed: u64, top_k: usize) -> Result<Self> {
        let cms = CountMinSketch::from_error_rate(epsilon, delta, seed)?;
        Self::new(cms, top_k)
    }

    /// Feed one message: tokenize on whitespace, add every token to the CMS
    ///
    /// Does not touch the top-K map — that only happens in
    /// [`Self::periodic_update`], keeping this the cheap hot path.
    pub fn observe_message(&mut self, text: &str) {
        for token in tokenize(text) {
            self.cms.add(token.as_bytes(), 1);
        }
        self.message_count += 1;
    }

    /// Refresh the top-K map against a candidate set of tokens
    ///
    /// For each candidate: refresh its stored estimate if already tracked;
    /// otherwise insert it if there's room, or replace the minimum-estimate
    /// tracked token if the candidate's estimate is strictly greater.
    pub fn periodic_update<I, S>(&mut self, token_set: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for token in token_set {
            let token = token.as_ref();
            let estimate = self.cms.estimate(token.as_bytes());

            if let Some(stored) = self.tracked.get_mut(token) {
                *stored = estimate;
                continue;
            }

            if self.tracked.len() < self.top_k {
                self.tracked.insert(token.to_string(), estimate);
                continue;
            }

            if let Some((min_token, min_estimate)) = self
                .tracked
                .iter()
                .map(|(t, &e)| (t.clone(), e))
                .min_by_key(|&(_, e)| e)
            {
                if estimate > min_estimate {
                    self.tracked.remove(&min_token);
                    self.tracked.insert(token.to_string(), estimate);
                }
            }
        }
    }

    /// Every tracked token re-queried against the current CMS state, sorted
    /// descending and truncated to `top_n`
    pub fn get_frequency_analysis(&self, top_n: usize) -> Vec<(String, u64)> {
        let mut analysis: Vec<(String, u64)> = self
            .tracked
            .keys()
            .map(|token| (token.clone(), self.cms.estimate(token.as_bytes())))
            .collect();
        analysis.sort_by(|a, b| b.1.cmp(&a.1));
        analysis.truncate(top_n);
        analysis
    }

    /// Estimated count for a single term (lowercased before hashing)
    pub fn estimate_frequency(&self, term: &str) -> u64 {
        self.cms.estimate(term.to_lowercase().as_bytes())
    }

    /// Estimated counts for a batch of terms (each lowercased before
    /// hashing)
    pub fn estimate_batch<I, S>(&self, terms: I) -> HashMap<String, u64>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        terms
            .into_iter()
            .map(|term| {
                let term = term.as_ref();
                (term.to_string(), self.estimate_frequency(term))
            })
            .collect()
    }

    /// Number of messages observed so far
    pub fn message_count(&self) -> u64 {
        self.message_count
    }

    /// Number of tokens currently in the top-K map (always `<= top_k`)
    pub fn tracked_count(&self) -> usize {
        self.tracked.len()
    }

    /// Configured top-K capacity
    pub fn top_k(&self) -> usize {
        self.top_k
    }
}
