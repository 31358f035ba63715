//! Zig-zag / LEB128 encoding of the counter stream.
//!
//! Counts are emitted as a sequence of signed integers: a positive value is a literal count, and
//! a negative value `-k` means "skip `k` consecutive zero counters". This compresses the long
//! runs of zero counters that dominate sparsely-populated histograms without needing a general
//! purpose compressor.

use crate::core::counter::Counter;
use crate::errors::EncodeError;
use std::io::Write;

/// Map signed numbers to unsigned: 0 to 0, -1 to 1, 1 to 2, -2 to 3, etc.
#[inline]
pub fn zig_zag_encode(num: i64) -> u64 {
    // If num < 0, num >> 63 is all 1s and vice versa.
    ((num << 1) ^ (num >> 63)) as u64
}

/// Write `input` as a LEB128 little-endian base-128 varint to `buf`, returning the number of
/// bytes written (in `[1, 9]`). This is not quite Protobuf's LEB128: a 64-bit input is encoded in
/// at most 9 bytes rather than 10, because the 9th byte is written as-is with no continuation
/// bit, which is enough to hold the last bit of a `u64`.
#[inline]
pub fn write_varint(input: u64, buf: &mut [u8]) -> usize {
    if shift_by_7s(input, 1) == 0 {
        buf[0] = input as u8;
        return 1;
    }
    buf[0] = 0x80 | ((input & 0x7F) as u8);
    if shift_by_7s(input, 2) == 0 {
        buf[1] = shift_by_7s(input, 1) as u8;
        return 2;
    }
    buf[1] = nth_7b_chunk_with_high_bit(input, 1);
    if shift_by_7s(input, 3) == 0 {
        buf[2] = shift_by_7s(input, 2) as u8;
        return 3;
    }
    buf[2] = nth_7b_chunk_with_high_bit(input, 2);
    if shift_by_7s(input, 4) == 0 {
        buf[3] = shift_by_7s(input, 3) as u8;
        return 4;
    }
    buf[3] = nth_7b_chunk_with_high_bit(input, 3);
    if shift_by_7s(input, 5) == 0 {
        buf[4] = shift_by_7s(input, 4) as u8;
        return 5;
    }
    buf[4] = nth_7b_chunk_with_high_bit(input, 4);
    if shift_by_7s(input, 6) == 0 {
        buf[5] = shift_by_7s(input, 5) as u8;
        return 6;
    }
    buf[5] = nth_7b_chunk_with_high_bit(input, 5);
    if shift_by_7s(input, 7) == 0 {
        buf[6] = shift_by_7s(input, 6) as u8;
        return 7;
    }
    buf[6] = nth_7b_chunk_with_high_bit(input, 6);
    if shift_by_7s(input, 8) == 0 {
        buf[7] = shift_by_7s(input, 7) as u8;
        return 8;
    }
    buf[7] = nth_7b_chunk_with_high_bit(input, 7);
    buf[8] = (input >> 56) as u8;
    9
}

#[inline]
fn shift_by_7s(input: u64, n: u8) -> u64 {
    input >> (7 * n)
}

#[inline]
fn nth_7b_chunk_with_high_bit(input: u64, n: u8) -> u8 {
    (shift_by_7s(input, n) as u8) | 0x80
}

/// Encode `counts` (in flat-index order) as a zig-zag/LEB128 run-length stream, writing directly
/// to `writer`. Returns the number of bytes written.
pub fn encode_counts<T: Counter, W: Write>(
    counts: &[T],
    writer: &mut W,
) -> Result<usize, EncodeError> {
    let mut scratch = [0u8; 9];
    let mut bytes_written = 0;
    let mut zeros: i64 = 0;

    for &count in counts {
        if count == T::zero() {
            zeros += 1;
            continue;
        }

        if zeros > 0 {
            bytes_written += write_value(-zeros, &mut scratch, writer)?;
            zeros = 0;
        }

        let signed = count
            .as_i64()
            .ok_or(EncodeError::CountNotSerializable)?;
        bytes_written += write_value(signed, &mut scratch, writer)?;
    }

    if zeros > 0 {
        bytes_written += write_value(-zeros, &mut scratch, writer)?;
    }

    writer.flush()?;
    Ok(bytes_written)
}

fn write_value<W: Write>(
    value: i64,
    scratch: &mut [u8; 9],
    writer: &mut W,
) -> Result<usize, EncodeError> {
    let len = write_varint(zig_zag_encode(value), scratch);
    writer.write_all(&scratch[..len])?;
    Ok(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zig_zag_known_values() {
        assert_eq!(zig_zag_encode(0), 0);
        assert_eq!(zig_zag_encode(-1), 1);
        assert_eq!(zig_zag_encode(1), 2);
        assert_eq!(zig_zag_encode(-2), 3);
        assert_eq!(zig_zag_encode(2), 4);
    }

    fn encode_to_vec(counts: &[u64]) -> Vec<u8> {
        let mut out = Vec::new();
        encode_counts(counts, &mut out).unwrap();
        out
    }

    #[test]
    fn single_nonzero_count() {
        // a literal count is zig-zagged like any other signed value: zig_zag_encode(56) = 112.
        assert_eq!(encode_to_vec(&[56]), vec![112]);
    }

    #[test]
    fn single_zero_count() {
        // a lone zero is a run of length 1, so the emitted value is zig_zag_encode(-1) = 1.
        assert_eq!(encode_to_vec(&[0]), vec![1]);
    }

    #[test]
    fn run_of_zeros_between_counts() {
        // zig_zag_encode(56) = 112, run of 4 zeros: zig_zag_encode(-4) = 7, zig_zag_encode(57) = 114
        assert_eq!(encode_to_vec(&[56, 0, 0, 0, 0, 57]), vec![112, 7, 114]);
    }

    #[test]
    fn trailing_run_of_zeros_is_emitted() {
        let mut out = Vec::new();
        encode_counts(&[5_u64, 0, 0], &mut out).unwrap();
        // zig_zag_encode(5) = 10, then zig_zag_encode(-2) = 3
        assert_eq!(out, vec![10, 3]);
    }

    #[test]
    fn empty_counts_encode_to_nothing() {
        assert_eq!(encode_to_vec(&[]), Vec::<u8>::new());
    }
}
