//! BurstDetector: DGIM-per-tracked-token with promotion and decay
//!
//! Of the three burst-detection designs this project's predecessor carried
//! (EMA baseline, per-column CMS+DGIM, and this one), this is the one with
//! explicit, testable state transitions: a token is `unseen`, becomes a
//! `candidate` once it's observed, is `promoted` to a tracked DGIM once its
//! candidate counter clears `promotion_threshold`, and can be `evicted` back
//! to unseen if a new candidate outbids it. Promotion and eviction only ever
//! happen inside [`BurstDetector::update_tracked_tokens`] — `observe_message`
//! never resizes the tracked set.

use std::collections::HashMap;

use crate::common::tokenize;
use crate::common::validation;
use crate::common::Result;
use crate::dgim::Dgim;

/// Snapshot of current burst state, shaped for direct display
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BurstSummary {
    /// Whether any tracked token is currently at or above the burst
    /// threshold
    pub active: bool,
    /// `"token: count"` strings for every bursting token, descending by
    /// count
    pub token: Vec<String>,
}

/// Tracks per-token recent activity via one DGIM per heavy token, promoting
/// and evicting candidates on a separate cadence from message ingestion
#[derive(Clone, Debug)]
pub struct BurstDetector {
    window_size: u64,
    top_k_tokens: usize,
    burst_threshold: u64,
    report_top_n: usize,
    promotion_threshold: u64,
    tracked: HashMap<String, Dgim>,
    candidates: HashMap<String, u64>,
    candidate_cap: usize,
    message_count: u64,
}

impl BurstDetector {
    /// Construct a detector
    ///
    /// The candidate buffer is capped at `4 * top_k_tokens` entries; when a
    /// message pushes the buffer past that cap, the lowest-counter
    /// candidates are dropped first.
    ///
    /// # Errors
    /// Returns `InvalidParameter` if `window_size`, `top_k_tokens`, or
    /// `promotion_threshold` is zero.
    pub fn new(
        window_size: u64,
        top_k_tokens: usize,
        burst_threshold: u64,
        report_top_n: usize,
        promotion_threshold: u64,
    ) -> Result<Self> {
        validation::validate_positive_u64(window_size, "window_size")?;
        validation::validate_positive_usize(top_k_tokens, "top_k_tokens")?;
        validation::validate_positive_u64(promotion_threshold, "promotion_threshold")?;

        Ok(Self {
            window_size,
            top_k_tokens,
            burst_threshold,
            report_top_n,
            promotion_threshold,
            tracked: HashMap::with_capacity(top_k_tokens),
            candidates: HashMap::new(),
            candidate_cap: top_k_tokens * 4,
            message_count: 0,
        })
    }

    /// Feed one message
    ///
    /// Every tracked token's DGIM advances exactly once, receiving a 1 if
    /// the token appeared in this message and a 0 otherwise — this keeps
    /// every tracked DGIM's window aligned to `message_count`. Every
    /// untracked token present in the message bumps its candidate counter.
    pub fn observe_message(&mut self, text: &str) {
        let present: std::collections::HashSet<&str> = tokenize(text).collect();

        for (token, dgim) in self.tracked.iter_mut() {
            let bit = u8::from(present.contains(token.as_str()));
            dgim.push(bit).expect("bit is always 0 or 1");
        }

        for token in &present {
            if !self.tracked.contains_key(*token) {
                *self.candidates.entry((*token).to_string()).or_insert(0) += 1;
            }
        }
        self.trim_candidates();

        self.message_count += 1;
    }

    /// Drop the lowest-counter candidates once the buffer exceeds its cap
    fn trim_candidates(&mut self) {
        if self.candidates.len() <= self.candidate_cap {
            return;
        }
        let mut entries: Vec<(String, u64)> = self
            .candidates
            .iter()
            .map(|(k, &v)| (k.clone(), v))
            .collect();
        entries.sort_by_key(|&(_, count)| count);
        let excess = entries.len() - self.candidate_cap;
        for (token, _) in entries.into_iter().take(excess) {
            self.candidates.remove(&token);
        }
    }

    /// Promote ready candidates into the tracked set, evicting the weakest
    /// tracked token if necessary, then decay every remaining candidate
    ///
    /// Call periodically; never from `observe_message`.
    pub fn update_tracked_tokens(&mut self) {
        let ready: Vec<(String, u64)> = self
            .candidates
            .iter()
            .filter(|&(_, &count)| count >= self.promotion_threshold)
            .map(|(token, &count)| (token.clone(), count))
            .collect();

        for (token, counter) in ready {
            self.candidates.remove(&token);

            if self.tracked.len() < self.top_k_tokens {
                self.promote(token, counter);
                continue;
            }

            let weakest = self
                .tracked
                .iter()
                .map(|(t, d)| (t.clone(), d.estimate()))
                .min_by_key(|&(_, estimate)| estimate);

            if let Some((weakest_token, weakest_estimate)) = weakest {
                if counter > weakest_estimate {
                    self.tracked.remove(&weakest_token);
                    self.promote(token, counter);
                }
            }
        }

        self.candidates.retain(|_, counter| {
            *counter = counter.saturating_sub(1);
            *counter > 0
        });
    }

    fn promote(&mut self, token: String, seed_count: u64) {
        let mut dgim = Dgim::new(self.window_size).expect("window_size validated at construction");
        for _ in 0..seed_count {
            dgim.push(1).expect("bit is always 1");
        }
        self.tracked.insert(token, dgim);
    }

    /// Tracked tokens at or above `burst_threshold`, sorted descending,
    /// truncated to `top_n`
    pub fn get_burst_terms(&self, top_n: usize) -> Vec<(String, u64)> {
        let mut terms: Vec<(String, u64)> = self
            .tracked
            .iter()
            .map(|(token, dgim)| (token.clone(), dgim.estimate()))
            .filter(|&(_, estimate)| estimate >= self.burst_threshold)
            .collect();
        terms.sort_by(|a, b| b.1.cmp(&a.1));
        terms.truncate(top_n);
        terms
    }

    /// Whether any tracked token is currently bursting
    pub fn is_burst(&self) -> bool {
        self.tracked.values().any(|dgim| dgim.estimate() >= self.burst_threshold)
    }

    /// Burst summary using the configured `report_top_n`
    pub fn get_burst_summary(&self) -> BurstSummary {
        let terms = self.get_burst_terms(self.report_top_n);
        BurstSummary {
            active: !terms.is_empty(),
            token: terms
                .iter()
                .map(|(token, count)| format!("{token}: {count}"))
                .collect(),
        }
    }

    /// Number of tokens currently tracked (always `<= top_k_tokens`)
    pub fn tracked_count(&self) -> usize {
        self.tracked.len()
    }

    /// Number of messages observed so far
    pub fn message_count(&self) -> u64 {
        self.message_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> BurstDetector {
        BurstDetector::new(50, 3, 5, 10, 2).unwrap()
    }

    #[test]
    fn test_observe_message_never_promotes_directly() {
        let mut det = detector();
        for _ in 0..10 {
            det.observe_message("crypto");
        }
        assert_eq!(det.tracked_count(), 0);
    }

    #[test]
    fn test_tracked_dgims_receive_one_push_per_message() {
        let mut det = BurstDetector::new(50, 2, 5, 10, 1).unwrap();
        det.observe_message("crypto");
        det.update_tracked_tokens();
        assert_eq!(det.tracked_count(), 1);
        for _ in 0..5 {
            det.observe_message("unrelated text here");
        }
        let messages = det.message_count();
        for dgim in det.tracked.values() {
            assert_eq!(dgim.current_time(), messages);
        }
    }

    #[test]
    fn test_tracked_count_never_exceeds_cap() {
        let mut det = BurstDetector::new(50, 2, 1, 10, 1).unwrap();
        for word in ["a", "b", "c", "d"] {
            det.observe_message(word);
            det.update_tracked_tokens();
        }
        assert!(det.tracked_count() <= 2);
    }

    #[test]
    fn test_burst_promotion_scenario() {
        // the canonical burst-promotion scenario
        let mut det = BurstDetector::new(50, 3, 5, 10, 2).unwrap();
        for _ in 0..20 {
            det.observe_message("crypto");
        }
        det.update_tracked_tokens();
        for _ in 0..20 {
            det.observe_message("lottery");
        }
        det.update_tracked_tokens();
        assert!(det.tracked.contains_key("crypto"));
        assert!(det.tracked.contains_key("lottery"));

        let terms = det.get_burst_terms(10);
        let lottery = terms.iter().find(|(t, _)| t == "lottery");
        assert!(lottery.is_some());
        assert!(lottery.unwrap().1 >= 5);
    }

    #[test]
    fn test_eviction_requires_strictly_greater_candidate() {
        let mut det = BurstDetector::new(50, 1, 1, 10, 1).unwrap();
        det.observe_message("incumbent");
        det.update_tracked_tokens();
        assert!(det.tracked.contains_key("incumbent"));

        det.observe_message("challenger");
        det.update_tracked_tokens();
        // challenger's counter (1) does not strictly exceed incumbent's
        // estimate (1), so no eviction should occur
        assert!(det.tracked.contains_key("incumbent"));
    }

    #[test]
    fn test_candidate_decay_floors_at_zero_and_ages_out() {
        let mut det = BurstDetector::new(50, 5, 5, 10, 100).unwrap();
        det.observe_message("onceonly");
        det.update_tracked_tokens();
        assert!(det.candidates.contains_key("onceonly"));
        det.update_tracked_tokens();
        assert!(!det.candidates.contains_key("onceonly"));
    }

    #[test]
    fn test_is_burst_reflects_threshold() {
        let mut det = BurstDetector::new(50, 1, 3, 10, 1).unwrap();
        det.observe_message("alert");
        det.update_tracked_tokens();
        assert!(det.is_burst());
    }

    #[test]
    fn test_get_burst_summary_shape() {
        let mut det = BurstDetector::new(50, 1, 3, 10, 1).unwrap();
        det.observe_message("alert");
        det.update_tracked_tokens();
        let summary = det.get_burst_summary();
        assert!(summary.active);
        assert!(summary.token[0].starts_with("alert:"));
    }
}
