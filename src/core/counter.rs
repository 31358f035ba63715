use num_traits;

/// The operations a histogram must be able to perform on the underlying counter type.
///
/// `ToPrimitive` lets us pull a count out as `u64`/`i64` for the integer accumulators used by
/// mean/stdDev and for zig-zag encoding. `Saturating` and `CheckedAdd` give recording two failure
/// modes to choose from: clamp at the type's max, or detect overflow explicitly. `PartialOrd` is
/// used for the zero checks that drive run-length encoding.
pub trait Counter:
    num_traits::Num
    + num_traits::ToPrimitive
    + num_traits::Saturating
    + num_traits::CheckedAdd
    + Copy
    + PartialOrd<Self>
{
    /// Counter as a `u64`.
    fn as_u64(&self) -> u64;
    /// Counter as an `i64`, for zig-zag encoding. `None` if the value doesn't fit.
    fn as_i64(&self) -> Option<i64>;
}

impl Counter for u8 {
    #[inline]
    fn as_u64(&self) -> u64 {
        *self as u64
    }
    #[inline]
    fn as_i64(&self) -> Option<i64> {
        Some(*self as i64)
    }
}

impl Counter for u16 {
    #[inline]
    fn as_u64(&self) -> u64 {
        *self as u64
    }
    #[inline]
    fn as_i64(&self) -> Option<i64> {
        Some(*self as i64)
    }
}

impl Counter for u32 {
    #[inline]
    fn as_u64(&self) -> u64 {
        *self as u64
    }
    #[inline]
    fn as_i64(&self) -> Option<i64> {
        Some(*self as i64)
    }
}

impl Counter for u64 {
    #[inline]
    fn as_u64(&self) -> u64 {
        *self
    }
    #[inline]
    fn as_i64(&self) -> Option<i64> {
        if *self <= i64::max_value() as u64 {
            Some(*self as i64)
        } else {
            None
        }
    }
}
