//! Bloom filter: space-efficient set membership with no false negatives
//!
//! Backs the duplicate detector's shingle lookups. Sized from a target
//! `capacity` and `error_rate` the same way as [`crate::cms::CountMinSketch`],
//! and indexed with enhanced double hashing: `h_i(x) = (h1(x) + i*h2(x) +
//! i*i) mod m`. The `i*i` term is what distinguishes this from the plain
//! Kirsch-Mitzenmacher scheme — it keeps the derived indices independent even
//! when `h2(x)` happens to be small, which plain KM hashing doesn't guard
//! against.

use crate::common::hash::double_hash;
use crate::common::validation;
use crate::common::{Result, SketchError};

/// Bloom filter over byte-string keys
///
/// # Examples
/// ```
/// use stream_sketch::bloom::BloomFilter;
///
/// let mut filter = BloomFilter::new(1000, 0.01, 0).unwrap();
/// filter.add(b"key1");
/// assert!(filter.contains(b"key1"));
/// ```
#[derive(Clone, Debug)]
pub struct BloomFilter {
    bits: Vec<u64>,
    capacity: usize,
    error_rate: f64,
    num_bits: usize,
    num_hashes: usize,
    seed: u64,
}

impl BloomFilter {
    /// Create a filter sized for `capacity` elements at `error_rate` false
    /// positive probability
    ///
    /// `m = ceil(-capacity * ln(error_rate) / ln(2)^2)`, `k = max(1,
    /// round((m/capacity) * ln 2))`.
    ///
    /// # Errors
    /// Returns `InvalidParameter` if `capacity` is zero or `error_rate` is
    /// not in `(0.0, 1.0)`.
    pub fn new(capacity: usize, error_rate: f64, seed: u64) -> Result<Self> {
        validation::validate_positive_usize(capacity, "capacity")?;
        validation::validate_probability(error_rate, "error_rate")?;

        let m = (-(capacity as f64) * error_rate.ln() / std::f64::consts::LN_2.powi(2)).ceil()
            as usize;
        let num_bits = m.max(1);
        let k = ((num_bits as f64 / capacity as f64) * std::f64::consts::LN_2).round() as usize;
        let num_hashes = k.max(1);

        Ok(Self::with_params(capacity, error_rate, num_bits, num_hashes, seed))
    }

    /// Build a filter from already-computed `num_bits`/`num_hashes`, bypassing
    /// the sizing formula. Used internally by [`Self::new`] and by
    /// [`Self::from_bytes`].
    fn with_params(
        capacity: usize,
        error_rate: f64,
        num_bits: usize,
        num_hashes: usize,
        seed: u64,
    ) -> Self {
        let num_words = num_bits.div_ceil(64);
        Self {
            bits: vec![0u64; num_words],
            capacity,
            error_rate,
            num_bits,
            num_hashes,
            seed,
        }
    }

    fn indices(&self, item: &[u8]) -> impl Iterator<Item = usize> + '_ {
        let (h1, h2) = double_hash(item, self.seed);
        (0..self.num_hashes as u64).map(move |i| {
            let combined = h1
                .wrapping_add(i.wrapping_mul(h2))
                .wrapping_add(i.wrapping_mul(i));
            (combined % self.num_bits as u64) as usize
        })
    }

    /// Add an item to the filter
    pub fn add(&mut self, item: &[u8]) {
        for idx in self.indices(item).collect::<Vec<_>>() {
            self.bits[idx / 64] |= 1u64 << (idx % 64);
        }
    }

    /// Add every item in `items`
    pub fn add_many<I, B>(&mut self, items: I)
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        for item in items {
            self.add(item.as_ref());
        }
    }

    /// Test membership. `false` is certain; `true` may be a false positive.
    pub fn contains(&self, item: &[u8]) -> bool {
        self.indices(item)
            .all(|idx| self.bits[idx / 64] & (1u64 << (idx % 64)) != 0)
    }

    /// Fraction of bits currently set, `0.0..=1.0`
    pub fn fill_ratio(&self) -> f64 {
        let set: usize = self.bits.iter().map(|w| w.count_ones() as usize).sum();
        set as f64 / self.num_bits as f64
    }

    /// Union this filter with `other` in place
    ///
    /// # Errors
    /// Returns `IncompatibleSketches` if the bit-array sizes or hash counts
    /// differ.
    pub fn merge(&mut self, other: &Self) -> Result<()> {
        if self.num_bits != other.num_bits || self.num_hashes != other.num_hashes {
            return Err(SketchError::IncompatibleSketches {
                reason: format!(
                    "cannot merge Bloom filters with (m={}, k={}) and (m={}, k={})",
                    self.num_bits, self.num_hashes, other.num_bits, other.num_hashes
                ),
            });
        }
        for (a, b) in self.bits.iter_mut().zip(other.bits.iter()) {
            *a |= *b;
        }
        Ok(())
    }

    /// Configured capacity this filter was sized for
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Configured target error rate
    pub fn error_rate(&self) -> f64 {
        self.error_rate
    }

    /// Number of bits in the underlying array
    pub fn num_bits(&self) -> usize {
        self.num_bits
    }

    /// Number of hash functions derived per item
    pub fn num_hashes(&self) -> usize {
        self.num_hashes
    }

    /// Serialize to a compact byte layout:
    /// `[capacity:8][error_rate:8][num_bits:8][num_hashes:8][seed:8][bits...]`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(40 + self.bits.len() * 8);
        bytes.extend_from_slice(&(self.capacity as u64).to_le_bytes());
        bytes.extend_from_slice(&self.error_rate.to_le_bytes());
        bytes.extend_from_slice(&(self.num_bits as u64).to_le_bytes());
        bytes.extend_from_slice(&(self.num_hashes as u64).to_le_bytes());
        bytes.extend_from_slice(&self.seed.to_le_bytes());
        for word in &self.bits {
            bytes.extend_from_slice(&word.to_le_bytes());
        }
        bytes
    }

    /// Deserialize from the layout written by [`Self::to_bytes`]
    ///
    /// # Errors
    /// Returns `DeserializationError` if the header is missing or the
    /// trailing bit array length doesn't match the header.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 40 {
            return Err(SketchError::DeserializationError(
                "buffer too small for Bloom filter header".to_string(),
            ));
        }
        let capacity = u64::from_le_bytes(bytes[0..8].try_into().unwrap()) as usize;
        let error_rate = f64::from_le_bytes(bytes[8..16].try_into().unwrap());
        let num_bits = u64::from_le_bytes(bytes[16..24].try_into().unwrap()) as usize;
        let num_hashes = u64::from_le_bytes(bytes[24..32].try_into().unwrap()) as usize;
        let seed = u64::from_le_bytes(bytes[32..40].try_into().unwrap());

        let num_words = num_bits.div_ceil(64);
        let expected_len = 40 + num_words * 8;
        if bytes.len() != expected_len {
            return Err(SketchError::DeserializationError(format!(
                "expected {expected_len} bytes, got {}",
                bytes.len()
            )));
        }

        let mut filter = Self::with_params(capacity, error_rate, num_bits, num_hashes, seed);
        for i in 0..num_words {
            let offset = 40 + i * 8;
            filter.bits[i] = u64::from_le_bytes(bytes[offset..offset + 8].try_into().unwrap());
        }
        Ok(filter)
    }
}
