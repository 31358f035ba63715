//! A bucketed histogram for recording distributions of positive integer observations — latencies
//! in nanoseconds, request sizes, queue depths — across a wide dynamic range while keeping the
//! worst-case relative error and the memory footprint both bounded and known ahead of time.
//!
//! This is a close relative of Gil Tene's HdrHistogram: it keeps the count for recorded samples
//! in "buckets" of values, where the resolution and distribution of those buckets is tuned based
//! on the highest trackable value and the number of significant decimal digits the caller wants
//! preserved. The buckets are organized the way floats are: there is a mantissa and an exponent,
//! and each bucket represents a different exponent, while the "sub-buckets" within a bucket
//! represent different values for the mantissa.
//!
//! To a first approximation, the sub-buckets of the first bucket hold the values `0`, `1`, `2`,
//! `3`, …; the sub-buckets of the second bucket hold `0`, `2`, `4`, `6`, …; the third holds `0`,
//! `4`, `8`, and so on. The low half of every bucket except the first is redundant, since those
//! values are already covered by the sub-buckets of all the preceding buckets, so only the top
//! half of buckets after the first is actually stored.
//!
//! Unlike the upstream HdrHistogram, this crate deliberately does not support auto-resizing,
//! dynamic range shifting, or concurrent recording: the layout is fixed at construction, sized
//! once from `(lowest_discernible_value, highest_trackable_value, significant_digits)`, and
//! `record` never allocates.
//!
//! # Recording samples
//!
//! ```
//! use bucket_histogram::Histogram;
//!
//! let mut hist = Histogram::<u64>::new(1, 60 * 60 * 1000, 2).unwrap();
//! hist.record(54321).expect("value 54321 should be in range");
//!
//! // callers that would rather clamp out-of-range values than get an error can use the
//! // saturating variant instead:
//! hist.saturating_record(10_000_000_000);
//! ```
//!
//! # Querying samples
//!
//! ```
//! use bucket_histogram::Histogram;
//!
//! let mut hist = Histogram::<u64>::new(1, 3_600_000_000, 3).unwrap();
//! for v in 0..1000 {
//!     hist.record(v).unwrap();
//! }
//! println!("# of samples: {}", hist.len());
//! println!("99.9'th percentile: {}", hist.percentiles(&[99.9])[0]);
//! ```
//!
//! # Panics and error handling
//!
//! As long as you're using the non-panicking functions (everything except the `saturating_*`
//! convenience wrappers, which cannot fail by construction), this crate should never panic on
//! valid input. Any panic you encounter is a bug.

#![deny(
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces
)]

use crate::errors::{EncodeError, InvalidConfig, MergeError, RecordError};
use std::io::Write;

mod core;
pub mod encoding;
pub mod errors;
pub mod iterator;

pub use crate::core::counter::Counter;
pub use crate::errors::*;
pub use crate::iterator::{Bucket, BucketIterator};

/// `Histogram` is the core data structure of this crate. It records values and performs
/// analytics over the recorded distribution.
///
/// The type parameter `T` is the width of the per-bucket counter (`u8`/`u16`/`u32`/`u64`);
/// narrower counters use less memory but saturate (stop increasing) sooner. `u64` is the usual
/// choice.
#[derive(Debug, Clone)]
pub struct Histogram<T: Counter> {
    lowest_discernible_value: u64,
    highest_trackable_value: u64,
    significant_digits: u8,

    /// Largest exponent of 2 that's smaller than the lowest discernible value, in `[0, 62]`.
    unit_magnitude: u32,
    /// `sub_bucket_count = 2^(sub_bucket_half_count_magnitude + 1)`, in `[2, 2^18]`.
    sub_bucket_count: u32,
    /// `sub_bucket_count / 2`.
    sub_bucket_half_count: u32,
    /// log2 of `sub_bucket_half_count`.
    sub_bucket_half_count_magnitude: u32,
    /// The bottom sub-bucket's bits set, shifted left by `unit_magnitude`.
    sub_bucket_mask: u64,
    /// Number of leading zeros used by the largest value representable in bucket 0. Lets
    /// `bucket_index_for` be a single subtraction on the hot path.
    leading_zero_count_base: u32,
    /// Number of geometric buckets.
    bucket_count: u32,

    total_count: u64,
    counts: Vec<T>,
}

impl<T: Counter> Histogram<T> {
    // ****************************************************************************************
    // Construction
    // ****************************************************************************************

    /// Construct a `Histogram` with the given lowest discernible value, highest trackable value,
    /// and number of significant decimal digits.
    ///
    /// `low` is the smallest value the histogram distinguishes from 0; it must be `>= 1` and may
    /// be rounded down internally to the nearest power of two. If you're not sure, use 1.
    ///
    /// `high` is the largest value the histogram can record without clamping or erroring; it
    /// must be `>= 2 * low`.
    ///
    /// `significant_digits` controls the worst-case relative error: it must be in `[1, 5]`, and
    /// the worst-case error on any recorded value is `1 / 10^significant_digits`. Memory usage
    /// grows roughly exponentially in this parameter, so pick the smallest value that meets your
    /// accuracy needs.
    pub fn new(low: u64, high: u64, significant_digits: u8) -> Result<Histogram<T>, InvalidConfig> {
        if low < 1 {
            return Err(InvalidConfig::LowIsZero);
        }
        if low > u64::max_value() / 2 {
            return Err(InvalidConfig::LowExceedsHalfOfMax);
        }
        if high < 2 * low {
            return Err(InvalidConfig::HighLessThanTwiceLow);
        }
        if significant_digits < 1 || significant_digits > 5 {
            return Err(InvalidConfig::SignificantDigitsOutOfRange);
        }

        // Given D decimal digits of accuracy, it's fine to be +/- 1 unit at 10^D, and +/- 2
        // units at 2 * 10^D, but NOT fine to be +/- 2 units just below 2 * 10^D. So we need
        // single-unit resolution out to 2 * 10^D.
        let largest_value_with_single_unit_resolution = 2 * 10_u64.pow(u32::from(significant_digits));

        let unit_magnitude = 63 - low.leading_zeros();

        // Smallest power-of-two sub_bucket_count that gives single-unit resolution out to
        // largest_value_with_single_unit_resolution. In [5, 18].
        let sub_bucket_count_magnitude =
            64 - (largest_value_with_single_unit_resolution - 1).leading_zeros();
        let sub_bucket_half_count_magnitude = sub_bucket_count_magnitude - 1;
        let sub_bucket_count = 1_u32 << sub_bucket_count_magnitude;

        if unit_magnitude + sub_bucket_count_magnitude > 63 {
            return Err(InvalidConfig::UnrepresentableLayout);
        }

        let sub_bucket_half_count = sub_bucket_count / 2;
        let sub_bucket_mask = (u64::from(sub_bucket_count) - 1) << unit_magnitude;
        let leading_zero_count_base = 64 - unit_magnitude - sub_bucket_count_magnitude;

        let bucket_count = Self::buckets_to_cover(high, sub_bucket_count, unit_magnitude);
        let counts_len = (bucket_count as usize + 1) * (sub_bucket_half_count as usize);

        Ok(Histogram {
            lowest_discernible_value: low,
            highest_trackable_value: high,
            significant_digits,

            unit_magnitude,
            sub_bucket_count,
            sub_bucket_half_count,
            sub_bucket_half_count_magnitude,
            sub_bucket_mask,
            leading_zero_count_base,
            bucket_count,

            total_count: 0,
            counts: vec![T::zero(); counts_len],
        })
    }

    /// Find the number of geometric buckets needed so that `high` is representable: the
    /// smallest `B >= 1` such that `sub_bucket_count * 2^(unit_magnitude + B - 1) >= high`.
    fn buckets_to_cover(high: u64, sub_bucket_count: u32, unit_magnitude: u32) -> u32 {
        let mut smallest_untrackable_value = u64::from(sub_bucket_count) << unit_magnitude;
        let mut buckets_needed = 1;
        while smallest_untrackable_value <= high {
            if smallest_untrackable_value > u64::max_value() / 2 {
                // Doubling would overflow; this bucket can already represent values beyond
                // what a u64 can hold, so it's the last one.
                return buckets_needed + 1;
            }
            smallest_untrackable_value <<= 1;
            buckets_needed += 1;
        }
        buckets_needed
    }

    // ****************************************************************************************
    // Administrative read-outs
    // ****************************************************************************************

    /// The lowest discernible value for the histogram in its current configuration.
    pub fn low(&self) -> u64 {
        self.lowest_discernible_value
    }

    /// The highest trackable value for the histogram in its current configuration.
    pub fn high(&self) -> u64 {
        self.highest_trackable_value
    }

    /// The number of significant decimal digits kept by this histogram.
    pub fn significant_digits(&self) -> u8 {
        self.significant_digits
    }

    /// The total number of samples recorded.
    pub fn len(&self) -> u64 {
        self.total_count
    }

    /// Whether this histogram has no recorded values.
    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }

    /// The number of counter slots backing this histogram. Includes empty slots; this directly
    /// drives the histogram's memory footprint.
    pub fn counts_len(&self) -> usize {
        self.counts.len()
    }

    // ****************************************************************************************
    // Index mapping: value <-> (bucket, sub-bucket) <-> flat index
    // ****************************************************************************************

    /// The lowest-precision bucket whose sub-buckets can represent `value`.
    #[inline]
    fn bucket_index_for(&self, value: u64) -> u32 {
        // How many powers of two `value` is larger than the biggest value bucket 0 can hold.
        // ORing with the mask floors small values into bucket 0, and guarantees this
        // subtraction cannot underflow.
        self.leading_zero_count_base - (value | self.sub_bucket_mask).leading_zeros()
    }

    /// The position within `bucket_index`'s sub-buckets that `value` maps to. In `[0,
    /// sub_bucket_count)` for bucket 0, and in `[sub_bucket_count / 2, sub_bucket_count)` for
    /// any later bucket.
    #[inline]
    fn sub_bucket_index_for(&self, value: u64, bucket_index: u32) -> u32 {
        (value >> (bucket_index + self.unit_magnitude)) as u32
    }

    /// The value that `(bucket_index, sub_bucket_index)` maps to — the lowest value equivalent
    /// to that counter slot.
    #[inline]
    fn value_from_index(&self, bucket_index: u32, sub_bucket_index: u32) -> u64 {
        u64::from(sub_bucket_index) << (bucket_index + self.unit_magnitude)
    }

    /// The flat counter index for `(bucket_index, sub_bucket_index)`.
    #[inline]
    fn counts_index(&self, bucket_index: u32, sub_bucket_index: u32) -> usize {
        let bucket_base_index = (bucket_index as usize + 1) << self.sub_bucket_half_count_magnitude;
        let offset = sub_bucket_index as isize - self.sub_bucket_half_count as isize;
        (bucket_base_index as isize + offset) as usize
    }

    /// The flat counter index that `value` maps to.
    #[inline]
    fn index_for(&self, value: u64) -> usize {
        let bucket_index = self.bucket_index_for(value);
        let sub_bucket_index = self.sub_bucket_index_for(value, bucket_index);
        self.counts_index(bucket_index, sub_bucket_index)
    }

    /// The size, in value units, of the equivalent range for values mapping to `bucket_index`.
    #[inline]
    fn size_of_equivalent_range_at(&self, bucket_index: u32) -> u64 {
        1_u64 << (self.unit_magnitude + bucket_index)
    }

    fn clamp_to_trackable(&self, value: u64) -> u64 {
        std::cmp::min(value, self.highest_trackable_value)
    }

    /// The lowest value equivalent to `value` at this histogram's resolution: samples recorded
    /// for any two equivalent values are folded into the same counter.
    pub fn lowest_equivalent(&self, value: u64) -> u64 {
        let value = self.clamp_to_trackable(value);
        let bucket_index = self.bucket_index_for(value);
        let sub_bucket_index = self.sub_bucket_index_for(value, bucket_index);
        self.value_from_index(bucket_index, sub_bucket_index)
    }

    /// The highest value equivalent to `value` at this histogram's resolution.
    pub fn highest_equivalent(&self, value: u64) -> u64 {
        let value = self.clamp_to_trackable(value);
        let bucket_index = self.bucket_index_for(value);
        self.lowest_equivalent(value) + self.size_of_equivalent_range_at(bucket_index) - 1
    }

    /// A value in the middle (rounded up) of the range of values equivalent to `value`.
    pub fn median_equivalent(&self, value: u64) -> u64 {
        let lowest = self.lowest_equivalent(value);
        let highest = self.highest_equivalent(value);
        lowest / 2 + highest / 2 + 1
    }

    /// Whether `value1` and `value2` are equivalent at this histogram's resolution: samples
    /// recorded for either are counted in a common total.
    pub fn equivalent(&self, value1: u64, value2: u64) -> bool {
        self.lowest_equivalent(value1) == self.lowest_equivalent(value2)
    }

    // ****************************************************************************************
    // Recording
    // ****************************************************************************************

    /// Record one occurrence of `value`.
    ///
    /// Returns `Err(RecordError::OutOfRange)`, leaving the histogram unmodified, if `value`
    /// exceeds `high()`. Use [`saturating_record`](Self::saturating_record) if you'd rather clamp
    /// than error.
    pub fn record(&mut self, value: u64) -> Result<(), RecordError> {
        self.record_n(value, T::one())
    }

    /// Record `count` occurrences of `value`.
    ///
    /// Returns `Err(RecordError::OutOfRange)`, leaving the histogram unmodified, if `value`
    /// exceeds `high()`.
    pub fn record_n(&mut self, value: u64, count: T) -> Result<(), RecordError> {
        if value > self.highest_trackable_value {
            return Err(RecordError::OutOfRange);
        }
        self.record_n_unchecked(value, count);
        Ok(())
    }

    /// Record one occurrence of `value`, clamping to `high()` if it is out of range. Cannot
    /// fail, but silently hides outliers above `high()` — be aware of that tradeoff.
    pub fn saturating_record(&mut self, value: u64) {
        self.saturating_record_n(value, T::one())
    }

    /// Record `count` occurrences of `value`, clamping to `high()` if it is out of range. Cannot
    /// fail, but silently hides outliers above `high()` — be aware of that tradeoff.
    pub fn saturating_record_n(&mut self, value: u64, count: T) {
        let value = self.clamp_to_trackable(value);
        self.record_n_unchecked(value, count);
    }

    fn record_n_unchecked(&mut self, value: u64, count: T) {
        let index = self.index_for(value);
        debug_assert!(index < self.counts.len(), "value must be representable");
        self.counts[index] = self.counts[index].saturating_add(&count);
        self.total_count = self.total_count.saturating_add(count.as_u64());
    }

    /// The number of samples recorded at `value`'s equivalent range. If `value` is larger than
    /// the maximum representable value, it is clamped to that maximum.
    pub fn count_at(&self, value: u64) -> T {
        let value = self.clamp_to_trackable(value);
        self.counts[self.index_for(value)]
    }

    /// Combine another histogram's counts into this one.
    ///
    /// Returns `Err(MergeError::IncompatibleLayout)`, leaving both histograms unmodified, if
    /// `other` was constructed with different `(low, high, significant_digits)`.
    pub fn merge(&mut self, other: &Histogram<T>) -> Result<(), MergeError> {
        if self.lowest_discernible_value != other.lowest_discernible_value
            || self.highest_trackable_value != other.highest_trackable_value
            || self.significant_digits != other.significant_digits
        {
            return Err(MergeError::IncompatibleLayout);
        }

        debug_assert_eq!(self.counts.len(), other.counts.len());
        for (mine, theirs) in self.counts.iter_mut().zip(other.counts.iter()) {
            *mine = mine.saturating_add(theirs);
        }
        self.total_count = self.total_count.saturating_add(other.total_count);
        Ok(())
    }

    // ****************************************************************************************
    // Iteration
    // ****************************************************************************************

    /// Iterate over every counter slot in ascending value order, including empty ones.
    pub fn iter(&self) -> BucketIterator<T> {
        BucketIterator::new(self)
    }

    // ****************************************************************************************
    // Summary statistics
    // ****************************************************************************************

    /// The lowest recorded value, or 0 if the histogram is empty.
    pub fn min(&self) -> u64 {
        self.iter()
            .find(|b| b.count != T::zero())
            .map(|b| b.lowest_equivalent_value)
            .unwrap_or(0)
    }

    /// The highest recorded value, or 0 if the histogram is empty.
    pub fn max(&self) -> u64 {
        self.iter()
            .filter(|b| b.count != T::zero())
            .last()
            .map(|b| b.highest_equivalent_value)
            .unwrap_or(0)
    }

    /// The mean of all recorded values, or 0 if the histogram is empty.
    pub fn mean(&self) -> u64 {
        if self.total_count == 0 {
            return 0;
        }
        let weighted_sum: u128 = self
            .iter()
            .filter(|b| b.count != T::zero())
            .map(|b| {
                let median = b.lowest_equivalent_value / 2 + b.highest_equivalent_value / 2 + 1;
                u128::from(median) * u128::from(b.count.as_u64())
            })
            .sum();
        (weighted_sum / u128::from(self.total_count)) as u64
    }

    /// The standard deviation of all recorded values, or 0 if the histogram is empty.
    pub fn std_dev(&self) -> u64 {
        if self.total_count == 0 {
            return 0;
        }
        let mean = self.mean() as i128;
        let weighted_sq_dev: u128 = self
            .iter()
            .filter(|b| b.count != T::zero())
            .map(|b| {
                let median = b.lowest_equivalent_value / 2 + b.highest_equivalent_value / 2 + 1;
                let dev = median as i128 - mean;
                (dev * dev) as u128 * u128::from(b.count.as_u64())
            })
            .sum();
        isqrt(weighted_sq_dev / u128::from(self.total_count))
    }

    /// Compute `highest_equivalent_value` at each of `targets`, which must be sorted ascending
    /// and each in `[0.0, 100.0]`.
    ///
    /// This runs a single pass over the histogram's buckets regardless of how many targets are
    /// requested, which matters because callers typically want several percentiles
    /// (50/75/90/95/99/99.9/99.99) at once.
    ///
    /// The 0th percentile is defined as the first non-empty bucket's `highest_equivalent_value`.
    /// Returns all zeros if the histogram is empty.
    pub fn percentiles(&self, targets: &[f64]) -> Vec<u64> {
        debug_assert!(
            targets.windows(2).all(|w| w[0] <= w[1]),
            "percentile targets must be sorted ascending"
        );

        let mut results = vec![0_u64; targets.len()];
        if self.total_count == 0 {
            return results;
        }

        let mut target_idx = 0;
        if targets.iter().any(|&p| p <= 0.0) {
            let first_nonempty = self
                .iter()
                .find(|b| b.count != T::zero())
                .map(|b| b.highest_equivalent_value)
                .unwrap_or(0);
            while target_idx < targets.len() && targets[target_idx] <= 0.0 {
                results[target_idx] = first_nonempty;
                target_idx += 1;
            }
        }

        // Precompute the count threshold each remaining target needs to reach, once, so the
        // bucket scan below does no floating point work per step.
        let thresholds: Vec<u64> = targets[target_idx..]
            .iter()
            .map(|&p| {
                let raw = (p / 100.0 * self.total_count as f64).ceil() as u64;
                std::cmp::max(raw, 1)
            })
            .collect();

        let mut cumulative: u64 = 0;
        let mut threshold_idx = 0;
        'buckets: for bucket in self.iter() {
            cumulative = cumulative.saturating_add(bucket.count.as_u64());
            while threshold_idx < thresholds.len() && cumulative >= thresholds[threshold_idx] {
                results[target_idx + threshold_idx] = bucket.highest_equivalent_value;
                threshold_idx += 1;
                if threshold_idx == thresholds.len() {
                    break 'buckets;
                }
            }
        }

        // Floating point edge cases (e.g. a 100.0 target whose ceil() lands one past the true
        // total due to rounding) could in principle leave a trailing target unset; fill any such
        // gap with the overall max.
        if threshold_idx < thresholds.len() {
            let max = self.max();
            for r in results[(target_idx + threshold_idx)..].iter_mut() {
                *r = max;
            }
        }

        results
    }

    // ****************************************************************************************
    // Encoding
    // ****************************************************************************************

    /// Write this histogram to `writer`: an 8-byte big-endian `low`, an 8-byte big-endian
    /// `high`, a 1-byte `significant_digits`, and the zig-zag/LEB128-encoded counter stream (see
    /// the [`encoding`] module). Returns the number of bytes written.
    ///
    /// This is a compact, self-contained format: the counter array length is reconstructible
    /// from the three header fields, so it isn't written explicitly. It is not compatible with
    /// the upstream HdrHistogram wire format, and there is no decoder in this crate — this is a
    /// write path only.
    pub fn encode<W: Write>(&self, writer: &mut W) -> Result<usize, EncodeError> {
        use byteorder::{BigEndian, WriteBytesExt};

        writer.write_u64::<BigEndian>(self.lowest_discernible_value)?;
        writer.write_u64::<BigEndian>(self.highest_trackable_value)?;
        writer.write_u8(self.significant_digits)?;

        let body_len = encoding::encode_counts(&self.counts, writer)?;
        Ok(8 + 8 + 1 + body_len)
    }
}

/// Deterministic integer square root via Newton's method, used by [`Histogram::std_dev`] to
/// avoid the precision loss `f64::sqrt` would introduce for very large sums of squares.
fn isqrt(n: u128) -> u64 {
    if n == 0 {
        return 0;
    }
    let mut x = n;
    let mut y = (x + 1) / 2;
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x as u64
}

#[cfg(test)]
mod tests;
