//! StreamingPipeline: fans one message to all three detectors and
//! aggregates their output
//!
//! The detectors are independent of one another, so the fan-out order isn't
//! semantically load-bearing — it's fixed here (frequency, then burst, then
//! duplicate) purely so that observable side effects are deterministic
//! across runs and hosts.

use std::collections::HashMap;

use crate::common::Result;
use crate::detectors::{BurstDetector, BurstSummary, DuplicateDetector, DuplicateReport, FrequencyDetector};

/// Aggregated result of routing one message through the pipeline
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineOutput {
    /// Answers to the caller-supplied frequency queries, if any
    pub frequencies: HashMap<String, u64>,
    /// Current burst state after this message
    pub burst: BurstSummary,
    /// Duplicate verdict for this message
    pub duplicate: DuplicateReport,
}

/// Orchestrates the three detectors as a single ingestion unit
#[derive(Clone, Debug)]
pub struct StreamingPipeline {
    frequency: FrequencyDetector,
    burst: BurstDetector,
    duplicate: DuplicateDetector,
}

impl StreamingPipeline {
    /// Compose a pipeline from already-constructed detectors
    pub fn new(
        frequency: FrequencyDetector,
        burst: BurstDetector,
        duplicate: DuplicateDetector,
    ) -> Self {
        Self {
            frequency,
            burst,
            duplicate,
        }
    }

    /// Build a pipeline with reasonable defaults for ad hoc exploration
    ///
    /// # Errors
    /// Propagates detector construction errors (none expected for these
    /// fixed defaults).
    pub fn with_defaults() -> Result<Self> {
        let frequency = FrequencyDetector::from_error_rate(0.01, 0.001, 0, 100)?;
        let burst = BurstDetector::new(1000, 50, 10, 10, 3)?;
        let duplicate = DuplicateDetector::new(10_000, 0.01, 2, 0.7, 0)?;
        Ok(Self::new(frequency, burst, duplicate))
    }


    /// Route one message through all three detectors in a fixed order and
    /// aggregate their output
    ///
    /// `frequency_queries`, if given, is answered against the frequency
    /// detector's CMS after this message has been folded in.
    pub fn process_message<I, S>(&mut self, text: &str, frequency_queries: Option<I>) -> PipelineOutput
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.frequency.observe_message(text);
        self.burst.observe_message(text);
        let duplicate = self.duplicate.observe_message(text);

        let frequencies = match frequency_queries {
            Some(queries) => self.frequency.estimate_batch(queries),
            None => HashMap::new(),
        };
        let burst = self.burst.get_burst_summary();

        PipelineOutput {
            frequencies,
            burst,
            duplicate,
        }
    }

    /// Delegate to the burst detector's periodic promotion/eviction pass
    ///
    /// Not called automatically by `process_message` — the host decides the
    /// cadence, as a separate maintenance step.
    pub fn update_burst_tracking(&mut self) {
        self.burst.update_tracked_tokens();
    }

    /// Delegate to the frequency detector's periodic top-K refresh
    pub fn update_frequency_tracking<I, S>(&mut self, token_set: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.frequency.periodic_update(token_set);
    }

    /// Shared read access to the frequency detector
    pub fn frequency_detector(&self) -> &FrequencyDetector {
        &self.frequency
    }

    /// Shared read access to the burst detector
    pub fn burst_detector(&self) -> &BurstDetector {
        &self.burst
    }

    /// Shared read access to the duplicate detector
    pub fn duplicate_detector(&self) -> &DuplicateDetector {
        &self.duplicate
    }
}

impl Default for StreamingPipeline {
    /// Equivalent to [`Self::with_defaults`]; the fixed defaults never fail
    /// validation, so this never panics in practice.
    fn default() -> Self {
        Self::with_defaults().expect("default pipeline parameters are always valid")
    }
}
