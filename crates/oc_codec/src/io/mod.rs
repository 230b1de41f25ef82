//! Byte-stream primitives.
//!
//! [`Output`] appends to a growable buffer, [`Input`] reads from a borrowed
//! slice. Both agree on these encodings:
//!
//! - fixed-width integers: big-endian.
//! - variable-length integers: ULEB128 (7 data bits per byte, low group
//!   first, high bit set on every byte but the last). With
//!   `optimize_positive` the value is stored as is, which keeps small
//!   non-negative values short; otherwise it is zig-zag mapped first, which
//!   keeps small magnitudes of either sign short.
//! - floats: IEEE-754 bits as fixed-width big-endian integers.
//! - strings: variable-length byte count, then UTF-8 bytes.
//! - booleans and presence markers: one byte, `0` or `1`.

// -----------------------------------------------------------------------------
// Modules

mod input;
mod output;

// -----------------------------------------------------------------------------
// Exports

pub use input::Input;
pub use output::Output;

// -----------------------------------------------------------------------------
// Shared helpers

/// Continuation bit of a varint byte.
const CONTINUATION_BIT: u8 = 0x80;

/// Data bits of a varint byte.
const DATA_MASK: u8 = 0x7F;

#[inline(always)]
const fn zigzag_i32(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

#[inline(always)]
const fn unzigzag_i32(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}

#[inline(always)]
const fn zigzag_i64(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

#[inline(always)]
const fn unzigzag_i64(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::{Input, Output};
    use crate::DecodeError;

    #[test]
    fn zigzag_keeps_small_negatives_short() {
        let mut out = Output::new();
        assert_eq!(out.write_var_i32(-1, false), 1);
        assert_eq!(out.write_var_i32(-1, true), 5);
        assert_eq!(out.write_var_i64(-1, true), 10);
        assert_eq!(out.write_var_i32(63, false), 1);
        assert_eq!(out.write_var_i32(64, false), 2);
        assert_eq!(out.write_var_i32(127, true), 1);

        let bytes = out.into_bytes();
        let mut input = Input::new(&bytes);
        assert_eq!(input.read_var_i32(false), Ok(-1));
        assert_eq!(input.read_var_i32(true), Ok(-1));
        assert_eq!(input.read_var_i64(true), Ok(-1));
        assert_eq!(input.read_var_i32(false), Ok(63));
        assert_eq!(input.read_var_i32(false), Ok(64));
        assert_eq!(input.read_var_i32(true), Ok(127));
        assert!(input.is_empty());
    }

    #[test]
    fn known_layouts() {
        let mut out = Output::new();
        out.write_var_u32(300);
        out.write_i32(-2);
        out.write_str("hé");
        out.write_bool(true);
        assert_eq!(
            out.as_bytes(),
            &[0xAC, 0x02, 0xFF, 0xFF, 0xFF, 0xFE, 3, b'h', 0xC3, 0xA9, 1]
        );
    }

    #[test]
    fn extreme_values() {
        let mut out = Output::new();
        out.write_var_i32(i32::MIN, false);
        out.write_var_i64(i64::MAX, false);
        out.write_var_i64(i64::MIN, true);
        out.write_i64(i64::MIN);
        out.write_f64(f64::NEG_INFINITY);

        let bytes = out.into_bytes();
        let mut input = Input::new(&bytes);
        assert_eq!(input.read_var_i32(false), Ok(i32::MIN));
        assert_eq!(input.read_var_i64(false), Ok(i64::MAX));
        assert_eq!(input.read_var_i64(true), Ok(i64::MIN));
        assert_eq!(input.read_i64(), Ok(i64::MIN));
        assert_eq!(input.read_f64(), Ok(f64::NEG_INFINITY));
    }

    #[test]
    fn truncated_input() {
        let bytes = vec![0x80, 0x80];
        let mut input = Input::new(&bytes);
        assert_eq!(
            input.read_var_u32(),
            Err(DecodeError::UnexpectedEnd {
                position: 2,
                needed: 1
            })
        );

        let mut input = Input::new(&[0, 0, 1]);
        assert_eq!(
            input.read_i32(),
            Err(DecodeError::UnexpectedEnd {
                position: 0,
                needed: 1
            })
        );
        assert_eq!(input.position(), 0);
    }

    #[test]
    fn overlong_varint() {
        let bytes = [0xFF, 0xFF, 0xFF, 0xFF, 0x7F];
        assert_eq!(
            Input::new(&bytes).read_var_u32(),
            Err(DecodeError::MalformedVarint { position: 0 })
        );
    }

    #[test]
    fn invalid_bool_and_utf8() {
        assert_eq!(
            Input::new(&[2]).read_bool(),
            Err(DecodeError::InvalidBool { position: 0, byte: 2 })
        );
        assert_eq!(
            Input::new(&[2, 0xC3, 0x28]).read_string(),
            Err(DecodeError::InvalidUtf8 { position: 1 })
        );
    }
}
