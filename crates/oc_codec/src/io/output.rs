use alloc::vec::Vec;

use super::{CONTINUATION_BIT, DATA_MASK, zigzag_i32, zigzag_i64};

// -----------------------------------------------------------------------------
// Output

/// A growable byte sink.
///
/// See the [module documentation](crate::io) for the encodings.
///
/// # Examples
///
/// ```
/// use oc_codec::io::Output;
///
/// let mut out = Output::new();
/// out.write_var_i32(5, true);
/// out.write_str("ok");
/// assert_eq!(out.position(), 4);
/// assert_eq!(out.as_bytes(), &[5, 2, b'o', b'k']);
/// ```
#[derive(Clone, Default, Debug)]
pub struct Output {
    buffer: Vec<u8>,
}

impl Output {
    /// Creates an empty output.
    #[inline]
    pub const fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Creates an empty output with at least `capacity` bytes reserved.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of bytes written so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Discards everything written so far.
    #[inline]
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    #[inline]
    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Writes `1` for `true` and `0` for `false`.
    #[inline]
    pub fn write_bool(&mut self, value: bool) {
        self.buffer.push(u8::from(value));
    }

    #[inline]
    pub fn write_i32(&mut self, value: i32) {
        self.write_bytes(&value.to_be_bytes());
    }

    #[inline]
    pub fn write_i64(&mut self, value: i64) {
        self.write_bytes(&value.to_be_bytes());
    }

    #[inline]
    pub fn write_f32(&mut self, value: f32) {
        self.write_bytes(&value.to_bits().to_be_bytes());
    }

    #[inline]
    pub fn write_f64(&mut self, value: f64) {
        self.write_bytes(&value.to_bits().to_be_bytes());
    }

    /// Writes an unsigned varint, returning the number of bytes used (1-5).
    pub fn write_var_u32(&mut self, value: u32) -> usize {
        self.write_var_u64(u64::from(value))
    }

    /// Writes an unsigned varint, returning the number of bytes used (1-10).
    pub fn write_var_u64(&mut self, mut value: u64) -> usize {
        let start = self.buffer.len();
        loop {
            let byte = (value & u64::from(DATA_MASK)) as u8;
            value >>= 7;
            if value == 0 {
                self.buffer.push(byte);
                return self.buffer.len() - start;
            }
            self.buffer.push(byte | CONTINUATION_BIT);
        }
    }

    /// Writes a variable-length `i32`, returning the number of bytes used.
    ///
    /// Negative values always take 5 bytes when `optimize_positive` is set.
    #[inline]
    pub fn write_var_i32(&mut self, value: i32, optimize_positive: bool) -> usize {
        if optimize_positive {
            self.write_var_u32(value as u32)
        } else {
            self.write_var_u32(zigzag_i32(value))
        }
    }

    /// Writes a variable-length `i64`, returning the number of bytes used.
    ///
    /// Negative values always take 10 bytes when `optimize_positive` is set.
    #[inline]
    pub fn write_var_i64(&mut self, value: i64, optimize_positive: bool) -> usize {
        if optimize_positive {
            self.write_var_u64(value as u64)
        } else {
            self.write_var_u64(zigzag_i64(value))
        }
    }

    /// Writes a length-prefixed UTF-8 string.
    pub fn write_str(&mut self, value: &str) {
        self.write_var_u64(value.len() as u64);
        self.write_bytes(value.as_bytes());
    }
}
