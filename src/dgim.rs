//! DGIM: approximate counting of 1-bits in a sliding window
//!
//! Datar, Gionis, Indyk & Motwani (2002) maintain an approximate count of
//! 1-bits among the last `N` bits of a binary stream in `O(log²N)` space,
//! with at most 50% relative error. [`Dgim`] is a single binary stream;
//! [`DgimManager`] is a fixed-size bank of independent streams sharing one
//! arrival clock, for the common case of "one column per category, one tick
//! per message."
//!
//! # References
//! - Datar, M., Gionis, A., Indyk, P., & Motwani, R. (2002). "Maintaining
//!   stream statistics over sliding windows"

use crate::common::validation;
use crate::common::{Result, SketchError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Bucket {
    size: u64,
    end_timestamp: u64,
}

/// DGIM over a single binary stream
///
/// # Examples
/// ```
/// use stream_sketch::dgim::Dgim;
///
/// let mut dgim = Dgim::new(16).unwrap();
/// for _ in 0..8 {
///     dgim.push(1).unwrap();
/// }
/// assert_eq!(dgim.estimate(), 8);
/// ```
#[derive(Clone, Debug)]
pub struct Dgim {
    /// Buckets ordered newest-first
    buckets: Vec<Bucket>,
    window_size: u64,
    current_time: u64,
}

impl Dgim {
    /// Create a DGIM counter over a window of `window_size` most recent bits
    ///
    /// # Errors
    /// Returns `InvalidParameter` if `window_size` is zero.
    pub fn new(window_size: u64) -> Result<Self> {
        validation::validate_positive_u64(window_size, "window_size")?;
        Ok(Self {
            buckets: Vec::new(),
            window_size,
            current_time: 0,
        })
    }

    /// Push one bit (`0` or `1`) onto the stream
    ///
    /// # Errors
    /// Returns `InvalidInput` if `bit` is not `0` or `1`.
    pub fn push(&mut self, bit: u8) -> Result<()> {
        if bit > 1 {
            return Err(SketchError::InvalidInput {
                reason: format!("bit must be 0 or 1, got {bit}"),
            });
        }
        self.advance_time();
        if bit == 1 {
            self.insert_one();
        }
        Ok(())
    }

    /// Advance the arrival clock by one event and expire buckets that fell
    /// out of the window. Used directly by [`DgimManager::tick`] so every
    /// bin's clock stays aligned without each bin re-deciding whether a 1 or
    /// 0 arrived.
    pub(crate) fn advance_time(&mut self) {
        self.current_time += 1;
        self.expire();
    }

    /// Append a size-1 bucket at the current time and repair the invariant.
    /// Used directly by [`DgimManager::add_one`], which calls this without
    /// advancing the clock (the clock already advanced via `tick`).
    pub(crate) fn insert_one(&mut self) {
        self.buckets.insert(
            0,
            Bucket {
                size: 1,
                end_timestamp: self.current_time,
            },
        );
        self.repair();
        self.expire();
    }

    fn expire(&mut self) {
        let window_start = self.current_time.saturating_sub(self.window_size);
        self.buckets.retain(|b| b.end_timestamp > window_start);
    }

    /// Merge buckets so at most two of any given size coexist, scanning from
    /// the smallest size upward.
    fn repair(&mut self) {
        let mut i = 0;
        while i < self.buckets.len() {
            let size = self.buckets[i].size;
            let mut j = i;
            while j < self.buckets.len() && self.buckets[j].size == size {
                j += 1;
            }
            let run_len = j - i;
            if run_len >= 3 {
                let newer_idx = j - 2;
                let older_idx = j - 1;
                let merged_timestamp = self.buckets[newer_idx].end_timestamp;
                self.buckets.remove(older_idx);
                self.buckets[newer_idx] = Bucket {
                    size: size * 2,
                    end_timestamp: merged_timestamp,
                };
                // The merged bucket may now form a new run of 3 with a
                // larger size further down the (still newest-first) list;
                // restart the scan rather than trying to reason about where.
                i = 0;
                continue;
            }
            i = j;
        }
    }

    /// Estimate the number of 1-bits in the last `k` events (`current_time -
    /// k + 1 ..= current_time`), defaulting to the full window
    pub fn estimate_last(&self, k: u64) -> u64 {
        if k == 0 {
            return 0;
        }
        let window_start = self.current_time.saturating_sub(k);
        let live: Vec<&Bucket> = self
            .buckets
            .iter()
            .filter(|b| b.end_timestamp > window_start)
            .collect();
        let Some(oldest) = live.last() else {
            return 0;
        };
        let total: u64 = live.iter().map(|b| b.size).sum();
        total - oldest.size / 2
    }

    /// Estimate the number of 1-bits in the full window
    pub fn estimate(&self) -> u64 {
        self.estimate_last(self.window_size)
    }

    /// Number of events pushed so far
    pub fn current_time(&self) -> u64 {
        self.current_time
    }

    /// The configured window size
    pub fn window_size(&self) -> u64 {
        self.window_size
    }

    /// Number of buckets currently held (diagnostic: should stay
    /// `O(log² window_size)`)
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

/// A bank of `num_bins` independent [`Dgim`] streams sharing one arrival
/// clock
///
/// Disentangles "time advancement" (one [`tick`](Self::tick) per ingested
/// message) from "activity" (zero or more [`add_one`](Self::add_one) calls
/// per tick).
///
/// # Examples
/// ```
/// use stream_sketch::dgim::DgimManager;
///
/// let mut mgr = DgimManager::new(4, 16).unwrap();
/// mgr.tick();
/// mgr.add_one(0).unwrap();
/// mgr.add_one(2).unwrap();
/// assert_eq!(mgr.count_last(0, None).unwrap(), 1);
/// assert_eq!(mgr.count_last(1, None).unwrap(), 0);
/// ```
#[derive(Clone, Debug)]
pub struct DgimManager {
    bins: Vec<Dgim>,
    current_time: u64,
}

impl DgimManager {
    /// Create a bank of `num_bins` DGIM streams, each windowed over
    /// `window_size` events
    ///
    /// # Errors
    /// Returns `InvalidParameter` if `num_bins` or `window_size` is zero.
    pub fn new(num_bins: usize, window_size: u64) -> Result<Self> {
        validation::validate_positive_usize(num_bins, "num_bins")?;
        let bins = (0..num_bins)
            .map(|_| Dgim::new(window_size))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            bins,
            current_time: 0,
        })
    }

    /// Advance the shared clock by one event across every bin
    ///
    /// Call exactly once per ingested message.
    pub fn tick(&mut self) {
        self.current_time += 1;
        for bin in &mut self.bins {
            bin.advance_time();
        }
    }

    /// Push a 1-bit into `bin_idx` at the current time, without advancing
    /// time
    ///
    /// Legal to call multiple times per tick (multiple active columns in one
    /// message).
    ///
    /// # Errors
    /// Returns `InvalidParameter` if `bin_idx` is out of range.
    pub fn add_one(&mut self, bin_idx: usize) -> Result<()> {
        let bin = self.bin_mut(bin_idx)?;
        bin.insert_one();
        Ok(())
    }

    /// Estimated 1-bit count for `bin_idx` over the last `k` events,
    /// defaulting to that bin's full window
    ///
    /// # Errors
    /// Returns `InvalidParameter` if `bin_idx` is out of range.
    pub fn count_last(&self, bin_idx: usize, k: Option<u64>) -> Result<u64> {
        let bin = self.bin(bin_idx)?;
        Ok(match k {
            Some(k) => bin.estimate_last(k),
            None => bin.estimate(),
        })
    }

    /// Number of events ticked so far
    pub fn current_time(&self) -> u64 {
        self.current_time
    }

    /// Number of bins in this bank
    pub fn num_bins(&self) -> usize {
        self.bins.len()
    }

    fn bin(&self, idx: usize) -> Result<&Dgim> {
        self.bins.get(idx).ok_or_else(|| SketchError::InvalidParameter {
            param: "bin_idx".to_string(),
            value: idx.to_string(),
            constraint: format!("must be < {}", self.bins.len()),
        })
    }

    fn bin_mut(&mut self, idx: usize) -> Result<&mut Dgim> {
        let len = self.bins.len();
        self.bins.get_mut(idx).ok_or(SketchError::InvalidParameter {
            param: "bin_idx".to_string(),
            value: idx.to_string(),
            constraint: format!("must be < {len}"),
        })
    }
}
