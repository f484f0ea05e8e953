//! Hash functions shared by the Count-Min Sketch and the Bloom filter
//!
//! Both sketches need keyed, independent, reproducible hash functions: CMS
//! derives one salted hash per row, the Bloom filter derives two base hashes
//! and combines them (Kirsch-Mitzenmacher style). Keeping the derivation here
//! means both components agree on how a `(seed, index)` pair turns into an
//! independent hash, and test vectors stay reproducible across runs.

use xxhash_rust::xxh64::xxh64;

/// 64-bit keyed hash of `data` under `seed`
///
/// Thin wrapper around `xxhash-rust`'s xxh64, kept as its own function so
/// every call site in this crate goes through one place.
#[inline]
pub fn keyed_hash64(data: &[u8], seed: u64) -> u64 {
    xxh64(data, seed)
}

/// Derive a per-row salt for row `row` of a Count-Min Sketch seeded with `seed`
///
/// CMS needs `depth` statistically independent hash functions. Rather than
/// storing `depth` random salts, the salt for row `r` is derived
/// deterministically by hashing `seed` together with `r`: `salt_r =
/// keyed_hash64(r.to_le_bytes(), seed)`. This is stable across runs (same
/// `seed` always derives the same salts) and needs no extra storage.
#[inline]
pub fn row_salt(seed: u64, row: usize) -> u64 {
    keyed_hash64(&(row as u64).to_le_bytes(), seed)
}

/// Compute the two independent base hashes the Bloom filter combines into
/// `k` indices via `(h1 + i*h2 + i*i) mod m`
///
/// The two hashes are independent because they're keyed by distinct
/// constants mixed with the caller's seed, not because they use different
/// algorithms.
#[inline]
pub fn double_hash(data: &[u8], seed: u64) -> (u64, u64) {
    let h1 = keyed_hash64(data, seed ^ 0x9E37_79B9_7F4A_7C15);
    let h2 = keyed_hash64(data, seed ^ 0xC2B2_AE3D_27D4_EB4F);
    (h1, h2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyed_hash64_is_deterministic() {
        assert_eq!(keyed_hash64(b"token", 7), keyed_hash64(b"token", 7));
    }

    #[test]
    fn keyed_hash64_seed_changes_output() {
        assert_ne!(keyed_hash64(b"token", 1), keyed_hash64(b"token", 2));
    }

    #[test]
    fn row_salts_differ_across_rows() {
        let salts: Vec<u64> = (0..8).map(|r| row_salt(42, r)).collect();
        for i in 0..salts.len() {
            for j in (i + 1)..salts.len() {
                assert_ne!(salts[i], salts[j], "row {i} and {j} collided");
            }
        }
    }

    #[test]
    fn double_hash_components_are_independent() {
        let (h1, h2) = double_hash(b"item", 0);
        assert_ne!(h1, h2);
    }
}
