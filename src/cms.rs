//! Count-Min Sketch for approximate frequency estimation
//!
//! Count-Min Sketch (Cormode & Muthukrishnan, 2003) is the standard algorithm
//! for point-query frequency estimation under bounded additive error:
//! - Never underestimates (only overestimates)
//! - Error bounded by `ε · total_count` with probability `1 - δ`
//! - Space: `O((e/ε) · ln(1/δ))`
//! - Time: `O(ln(1/δ))` per operation
//!
//! # References
//! - Cormode, G., & Muthukrishnan, S. (2003). "An improved data stream
//!   summary: the count-min sketch and its applications"

use crate::common::hash::{keyed_hash64, row_salt};
use crate::common::validation;
use crate::common::{Result, SketchError};

/// Count-Min Sketch for approximate frequency estimation over byte-string items
///
/// # Examples
/// ```
/// use stream_sketch::cms::CountMinSketch;
///
/// let mut cms = CountMinSketch::from_error_rate(0.01, 0.01, 0).unwrap();
///
/// cms.add(b"apple", 1);
/// cms.add(b"apple", 1);
/// cms.add(b"banana", 1);
///
/// assert!(cms.estimate(b"apple") >= 2);
/// assert!(cms.estimate(b"banana") >= 1);
/// assert_eq!(cms.estimate(b"cherry"), 0);
/// ```
#[derive(Clone, Debug)]
pub struct CountMinSketch {
    width: usize,
    depth: usize,
    seed: u64,
    /// Flat `depth × width` table, row-major, for cache locality
    table: Vec<u64>,
    total_count: u64,
}

impl CountMinSketch {
    /// Create a Count-Min Sketch with explicit `(width, depth, seed)`
    ///
    /// # Errors
    /// Returns `InvalidParameter` if `width` or `depth` is zero.
    pub fn new(width: usize, depth: usize, seed: u64) -> Result<Self> {
        validation::validate_width_depth(width, depth)?;

        Ok(Self {
            width,
            depth,
            seed,
            table: vec![0u64; depth * width],
            total_count: 0,
        })
    }

    /// Create a Count-Min Sketch sized from an error bound and a failure
    /// probability: `width = ⌈e/ε⌉`, `depth = ⌈ln(1/δ)⌉`
    ///
    /// # Errors
    /// Returns `InvalidParameter` if `epsilon` or `delta` is not in `(0, 1)`.
    ///
    /// # Examples
    /// ```
    /// use stream_sketch::cms::CountMinSketch;
    ///
    /// // 1% error bound, 1% failure probability
    /// let cms = CountMinSketch::from_error_rate(0.01, 0.01, 0).unwrap();
    /// ```
    pub fn from_error_rate(epsilon: f64, delta: f64, seed: u64) -> Result<Self> {
        validation::validate_probability(epsilon, "epsilon")?;
        validation::validate_probability(delta, "delta")?;

        let width = (std::f64::consts::E / epsilon).ceil() as usize;
        let depth = (1.0 / delta).ln().ceil().max(1.0) as usize;

        Self::new(width, depth, seed)
    }

    /// Increment the counters for `item` in every row by `count`
    ///
    /// # Time Complexity
    /// `O(depth)`
    pub fn add(&mut self, item: &[u8], count: u64) {
        if count == 0 {
            return;
        }
        for row in 0..self.depth {
            let col = self.column(item, row);
            self.table[row * self.width + col] =
                self.table[row * self.width + col].saturating_add(count);
        }
        self.total_count = self.total_count.saturating_add(count);
    }

    /// Like [`add`](Self::add), but takes a signed count and rejects negative
    /// values
    ///
    /// # Errors
    /// Returns `InvalidInput` if `count` is negative.
    pub fn add_signed(&mut self, item: &[u8], count: i64) -> Result<()> {
        if count < 0 {
            return Err(SketchError::InvalidInput {
                reason: format!("count must be non-negative, got {count}"),
            });
        }
        self.add(item, count as u64);
        Ok(())
    }

    /// Estimate the frequency of `item`: the minimum counter across all rows
    ///
    /// Never underestimates the true count.
    pub fn estimate(&self, item: &[u8]) -> u64 {
        (0..self.depth)
            .map(|row| {
                let col = self.column(item, row);
                self.table[row * self.width + col]
            })
            .min()
            .unwrap_or(0)
    }

    /// Merge `other` into `self`: element-wise sum of tables and
    /// `total_count`
    ///
    /// # Errors
    /// Returns `IncompatibleSketches` unless `other` has the same
    /// `(width, depth, seed)`.
    pub fn merge(&mut self, other: &Self) -> Result<()> {
        if self.width != other.width || self.depth != other.depth || self.seed != other.seed {
            return Err(SketchError::IncompatibleSketches {
                reason: format!(
                    "dimension/seed mismatch: ({}, {}, {}) vs ({}, {}, {})",
                    self.width, self.depth, self.seed, other.width, other.depth, other.seed
                ),
            });
        }
        for (a, &b) in self.table.iter_mut().zip(other.table.iter()) {
            *a = a.saturating_add(b);
        }
        self.total_count = self.total_count.saturating_add(other.total_count);
        Ok(())
    }

    /// Column index for `item` in `row`, derived from a single keyed hash of
    /// the item under a per-row salt derived deterministically from
    /// `(seed, row)`
    #[inline]
    fn column(&self, item: &[u8], row: usize) -> usize {
        let salt = row_salt(self.seed, row);
        let hash = keyed_hash64(item, salt);
        (hash % self.width as u64) as usize
    }

    /// Width of each row
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The seed this sketch was constructed with
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Sum of all counts ever added (saturating)
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// `true` if no item has ever been added
    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }

    /// Serialize `(width, depth, seed, total_count, table)` to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(32 + self.table.len() * 8);
        bytes.extend_from_slice(&(self.width as u64).to_le_bytes());
        bytes.extend_from_slice(&(self.depth as u64).to_le_bytes());
        bytes.extend_from_slice(&self.seed.to_le_bytes());
        bytes.extend_from_slice(&self.total_count.to_le_bytes());
        for &count in &self.table {
            bytes.extend_from_slice(&count.to_le_bytes());
        }
        bytes
    }

    /// Deserialize a sketch produced by [`to_bytes`](Self::to_bytes)
    ///
    /// # Errors
    /// Returns `DeserializationError` if `bytes` is too short or its
    /// declared dimensions don't match the remaining data.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 32 {
            return Err(SketchError::DeserializationError(
                "need at least 32 header bytes".to_string(),
            ));
        }
        let width = u64::from_le_bytes(bytes[0..8].try_into().unwrap()) as usize;
        let depth = u64::from_le_bytes(bytes[8..16].try_into().unwrap()) as usize;
        let seed = u64::from_le_bytes(bytes[16..24].try_into().unwrap());
        let total_count = u64::from_le_bytes(bytes[24..32].try_into().unwrap());

        validation::validate_width_depth(width, depth)?;

        let expected = 32 + depth * width * 8;
        if bytes.len() != expected {
            return Err(SketchError::DeserializationError(format!(
                "expected {expected} bytes, got {}",
                bytes.len()
            )));
        }

        let mut table = Vec::with_capacity(depth * width);
        let mut offset = 32;
        for _ in 0..(depth * width) {
            table.push(u64::from_le_bytes(
                bytes[offset..offset + 8].try_into().unwrap(),
            ));
            offset += 8;
        }

        Ok(Self {
            width,
            depth,
            seed,
            table,
            total_count,
        })
    }
}
