//! End-to-end burst promotion scenario: two back-to-back topical floods
//! should both end up tracked, with the more recent one clearing the burst
//! threshold.

use stream_sketch::detectors::BurstDetector;

#[test]
fn test_two_topics_both_promoted_and_lottery_bursts() {
    let mut detector = BurstDetector::new(50, 3, 5, 10, 2).unwrap();

    for _ in 0..20 {
        detector.observe_message("crypto");
    }
    detector.update_tracked_tokens();

    for _ in 0..20 {
        detector.observe_message("lottery");
    }
    detector.update_tracked_tokens();

    assert!(detector.tracked_count() >= 2);

    let terms = detector.get_burst_terms(10);
    let lottery = terms.iter().find(|(token, _)| token == "lottery");
    assert!(lottery.is_some());
    assert!(lottery.unwrap().1 >= 5);
}

#[test]
fn test_burst_summary_active_flag_tracks_threshold() {
    let mut detector = BurstDetector::new(50, 3, 5, 10, 2).unwrap();
    let summary_before = detector.get_burst_summary();
    assert!(!summary_before.active);

    for _ in 0..10 {
        detector.observe_message("crypto");
    }
    detector.update_tracked_tokens();

    let summary_after = detector.get_burst_summary();
    assert!(summary_after.active);
}

#[test]
fn test_tracked_dgims_stay_aligned_with_message_count() {
    let mut detector = BurstDetector::new(50, 2, 5, 10, 1).unwrap();
    detector.observe_message("alpha");
    detector.update_tracked_tokens();
    for _ in 0..15 {
        detector.observe_message("unrelated filler text");
    }
    assert_eq!(detector.message_count(), 16);
}
