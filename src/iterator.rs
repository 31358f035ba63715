//! The bucket iterator: walks every counter slot, including empty ones, in ascending value
//! order.

use crate::core::counter::Counter;
use crate::Histogram;

/// One step of a [`BucketIterator`]: the count recorded for a bucket, and the inclusive range of
/// values that bucket represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket<T> {
    /// Number of samples recorded in this bucket.
    pub count: T,
    /// Lowest value equivalent to this bucket.
    pub lowest_equivalent_value: u64,
    /// Highest value equivalent to this bucket.
    pub highest_equivalent_value: u64,
}

/// Iterates over every counter slot in a [`Histogram`], in ascending `lowest_equivalent_value`
/// order, including buckets with a zero count.
///
/// Holds a borrow of the histogram for its lifetime, so the histogram cannot be mutated while an
/// iterator over it is alive.
pub struct BucketIterator<'a, T: 'a + Counter> {
    hist: &'a Histogram<T>,
    bucket_index: u32,
    sub_bucket_index: u32,
}

impl<'a, T: 'a + Counter> BucketIterator<'a, T> {
    pub(crate) fn new(hist: &'a Histogram<T>) -> Self {
        BucketIterator {
            hist,
            bucket_index: 0,
            sub_bucket_index: 0,
        }
    }
}

impl<'a, T: 'a + Counter> Iterator for BucketIterator<'a, T> {
    type Item = Bucket<T>;

    fn next(&mut self) -> Option<Bucket<T>> {
        if self.sub_bucket_index >= self.hist.sub_bucket_count {
            self.sub_bucket_index = self.hist.sub_bucket_half_count;
            self.bucket_index += 1;
        }

        let index = self
            .hist
            .counts_index(self.bucket_index, self.sub_bucket_index);
        if index >= self.hist.counts.len() {
            return None;
        }

        let lowest = self
            .hist
            .value_from_index(self.bucket_index, self.sub_bucket_index);
        let size = self.hist.size_of_equivalent_range_at(self.bucket_index);
        let bucket = Bucket {
            count: self.hist.counts[index],
            lowest_equivalent_value: lowest,
            highest_equivalent_value: lowest + size - 1,
        };

        self.sub_bucket_index += 1;
        Some(bucket)
    }
}
