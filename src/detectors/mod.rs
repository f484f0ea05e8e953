//! Stateful detectors built on top of the core sketches
//!
//! Each detector owns exactly one sketch (or a small bank of them) and adds
//! the bookkeeping — bounded top-K maps, candidate buffers, shingling — that
//! turns a raw estimate into an answer to a concrete question: "what's
//! trending," "is this bursting," "have we seen this before."

pub mod burst;
pub mod duplicate;
pub mod frequency;

pub use burst::{BurstDetector, BurstSummary};
pub use duplicate::{DuplicateDetector, DuplicateReport};
pub use frequency::FrequencyDetector;
