//! End-to-end heavy hitter scenario: a Count-Min Sketch under a skewed
//! stream should upper-bound the true count of a deliberately injected
//! "spike" token within its configured error budget.

use stream_sketch::cms::CountMinSketch;

#[test]
fn test_heavy_hitter_within_error_bound() {
    let mut cms = CountMinSketch::from_error_rate(0.01, 0.001, 0).unwrap();

    let alphabet: Vec<String> = (0..100).map(|i| format!("sym{i}")).collect();
    let mut state: u64 = 0x9E3779B97F4A7C15;
    for _ in 0..10_000 {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let idx = (state as usize) % alphabet.len();
        cms.add(alphabet[idx].as_bytes(), 1);
    }
    for _ in 0..5_000 {
        cms.add(b"spike", 1);
    }

    let estimate = cms.estimate(b"spike");
    assert!(estimate >= 5000);
    assert!(estimate as f64 <= 5000.0 + 0.01 * 15_000.0);
}

#[test]
fn test_estimate_never_underestimates_across_many_items() {
    let mut cms = CountMinSketch::from_error_rate(0.05, 0.05, 1).unwrap();
    let mut true_counts = std::collections::HashMap::new();

    let mut state: u64 = 12345;
    for _ in 0..5_000 {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let item = format!("item{}", state % 500);
        cms.add(item.as_bytes(), 1);
        *true_counts.entry(item).or_insert(0u64) += 1;
    }

    for (item, &true_count) in &true_counts {
        assert!(cms.estimate(item.as_bytes()) >= true_count);
    }
}
