//! stream_sketch: a streaming text-analytics core built from three
//! cooperating sketches
//!
//! Consumes a sequence of pre-tokenized text messages and maintains, in
//! sub-linear space, three concurrent statistical summaries: approximate
//! per-token frequency ([`cms::CountMinSketch`] via
//! [`detectors::FrequencyDetector`]), burst detection over a sliding window
//! ([`dgim::Dgim`] via [`detectors::BurstDetector`]), and probabilistic
//! near-duplicate detection ([`bloom::BloomFilter`] via
//! [`detectors::DuplicateDetector`]). [`pipeline::StreamingPipeline`] fans
//! one message to all three and aggregates their output.
//!
//! Dataset loading, JSON parsing, stopword/lemmatization preprocessing, CLI
//! parsing, disk caching, and plotting are all out of scope — this crate
//! consumes already-tokenized text (whitespace-separated tokens) and exposes
//! query endpoints; an ingestion front-end adapts to this contract.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bloom;
pub mod cms;
pub mod common;
pub mod detectors;
pub mod dgim;
pub mod pipeline;

pub use bloom::BloomFilter;
pub use cms::CountMinSketch;
pub use common::{Result, SketchError};
pub use detectors::{BurstDetector, BurstSummary, DuplicateDetector, DuplicateReport, FrequencyDetector};
pub use dgim::{Dgim, DgimManager};
pub use pipeline::{PipelineOutput, StreamingPipeline};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_compiles() {
        let _ = StreamingPipeline::with_defaults().unwrap();
    }
}
