use crate::errors::{InvalidConfig, MergeError, RecordError};
use crate::{Counter, Histogram};

#[test]
fn rejects_zero_low() {
    assert_eq!(
        Histogram::<u64>::new(0, 100, 3).unwrap_err(),
        InvalidConfig::LowIsZero
    );
}

#[test]
fn rejects_high_less_than_twice_low() {
    assert_eq!(
        Histogram::<u64>::new(10, 15, 3).unwrap_err(),
        InvalidConfig::HighLessThanTwiceLow
    );
}

#[test]
fn rejects_significant_digits_out_of_range() {
    assert_eq!(
        Histogram::<u64>::new(1, 100, 0).unwrap_err(),
        InvalidConfig::SignificantDigitsOutOfRange
    );
    assert_eq!(
        Histogram::<u64>::new(1, 100, 6).unwrap_err(),
        InvalidConfig::SignificantDigitsOutOfRange
    );
}

#[test]
fn counts_len_matches_worked_example() {
    // low = 1, high = 3_600_000_000, 3 significant digits.
    let hist = Histogram::<u64>::new(1, 3_600_000_000, 3).unwrap();
    assert_eq!(hist.counts_len(), 23552);
}

#[test]
fn record_and_read_back_small_values() {
    let mut hist = Histogram::<u64>::new(1, 10_000, 3).unwrap();
    for v in 0..100 {
        hist.record(v).unwrap();
    }
    assert_eq!(hist.len(), 100);
    for v in 0..100 {
        assert!(hist.count_at(v).as_u64() >= 1, "expected a count at {}", v);
    }
}

#[test]
fn record_out_of_range_is_an_error_and_does_not_mutate() {
    let mut hist = Histogram::<u64>::new(1, 1000, 3).unwrap();
    hist.record(500).unwrap();
    assert_eq!(hist.record(1001), Err(RecordError::OutOfRange));
    assert_eq!(hist.len(), 1);
}

#[test]
fn saturating_record_clamps_instead_of_erroring() {
    let mut hist = Histogram::<u64>::new(1, 1000, 3).unwrap();
    hist.saturating_record(1_000_000);
    assert_eq!(hist.len(), 1);
    assert_eq!(hist.max(), hist.highest_equivalent(1000));
}

#[test]
fn record_n_accumulates_count() {
    let mut hist = Histogram::<u64>::new(1, 1000, 3).unwrap();
    hist.record_n(42, 10).unwrap();
    assert_eq!(hist.count_at(42).as_u64(), 10);
    assert_eq!(hist.len(), 10);
}

#[test]
fn min_max_mean_on_empty_histogram_are_zero() {
    let hist = Histogram::<u64>::new(1, 1000, 3).unwrap();
    assert_eq!(hist.min(), 0);
    assert_eq!(hist.max(), 0);
    assert_eq!(hist.mean(), 0);
    assert_eq!(hist.std_dev(), 0);
}

#[test]
fn min_and_max_track_recorded_extremes() {
    let mut hist = Histogram::<u64>::new(1, 100_000, 3).unwrap();
    hist.record(5).unwrap();
    hist.record(50_000).unwrap();
    hist.record(500).unwrap();
    assert!(hist.min() <= 5);
    assert!(hist.max() >= 50_000);
}

#[test]
fn mean_of_constant_values_is_that_value() {
    let mut hist = Histogram::<u64>::new(1, 100_000, 3).unwrap();
    for _ in 0..1000 {
        hist.record(1000).unwrap();
    }
    let mean = hist.mean();
    // Should be within the equivalent range of 1000.
    assert_eq!(hist.lowest_equivalent(mean), hist.lowest_equivalent(1000));
}

#[test]
fn std_dev_of_constant_values_is_zero() {
    let mut hist = Histogram::<u64>::new(1, 100_000, 3).unwrap();
    for _ in 0..1000 {
        hist.record(1000).unwrap();
    }
    assert_eq!(hist.std_dev(), 0);
}

#[test]
fn percentiles_are_monotonic_and_bounded_by_max() {
    let mut hist = Histogram::<u64>::new(1, 3_600_000_000, 3).unwrap();
    for v in 1..=1000u64 {
        hist.record(v).unwrap();
    }
    let targets = [0.0, 50.0, 90.0, 99.0, 99.9, 100.0];
    let results = hist.percentiles(&targets);
    for pair in results.windows(2) {
        assert!(pair[0] <= pair[1], "percentiles must be non-decreasing: {:?}", results);
    }
    assert!(results[targets.len() - 1] <= hist.max());
}

#[test]
fn zero_percentile_is_first_nonempty_bucket() {
    let mut hist = Histogram::<u64>::new(1, 100_000, 3).unwrap();
    hist.record(777).unwrap();
    hist.record(99_999).unwrap();
    let results = hist.percentiles(&[0.0]);
    assert_eq!(results[0], hist.highest_equivalent(777));
}

#[test]
fn merge_combines_counts() {
    let mut a = Histogram::<u64>::new(1, 10_000, 3).unwrap();
    let mut b = Histogram::<u64>::new(1, 10_000, 3).unwrap();
    a.record(5).unwrap();
    b.record(5).unwrap();
    b.record(6).unwrap();
    a.merge(&b).unwrap();
    assert_eq!(a.len(), 3);
    assert_eq!(a.count_at(5).as_u64(), 2);
    assert_eq!(a.count_at(6).as_u64(), 1);
}

#[test]
fn merge_rejects_incompatible_layout() {
    let mut a = Histogram::<u64>::new(1, 10_000, 3).unwrap();
    let b = Histogram::<u64>::new(1, 20_000, 3).unwrap();
    assert_eq!(a.merge(&b).unwrap_err(), MergeError::IncompatibleLayout);
}

#[test]
fn iterator_covers_every_slot_in_ascending_order() {
    let hist = Histogram::<u64>::new(1, 1000, 2).unwrap();
    let buckets: Vec<_> = hist.iter().collect();
    assert_eq!(buckets.len(), hist.counts_len());
    for pair in buckets.windows(2) {
        assert!(pair[0].lowest_equivalent_value < pair[1].lowest_equivalent_value);
        assert!(pair[0].highest_equivalent_value < pair[1].lowest_equivalent_value + 1);
    }
}

#[test]
fn equivalent_range_is_self_consistent() {
    let hist = Histogram::<u64>::new(1, 3_600_000_000, 3).unwrap();
    for v in [1u64, 1000, 1_000_000, 3_599_999_999].iter() {
        let lo = hist.lowest_equivalent(*v);
        let hi = hist.highest_equivalent(*v);
        assert!(lo <= *v);
        assert!(hi >= *v);
        assert!(hist.equivalent(lo, hi));
    }
}

#[test]
fn encode_round_trips_through_a_buffer_without_erroring() {
    let mut hist = Histogram::<u64>::new(1, 3_600_000_000, 3).unwrap();
    for v in 0..5000u64 {
        hist.record(v * 7).unwrap();
    }
    let mut buf = Vec::new();
    let written = hist.encode(&mut buf).unwrap();
    assert_eq!(written, buf.len());
    // header is 17 bytes; the rest is the run-length-encoded counter stream.
    assert!(buf.len() > 17);
}

#[test]
fn narrow_counter_saturates_instead_of_overflowing() {
    let mut hist = Histogram::<u8>::new(1, 1000, 2).unwrap();
    for _ in 0..300 {
        hist.record(10).unwrap();
    }
    assert_eq!(hist.count_at(10), u8::max_value());
}
