use alloc::string::String;

use super::{CONTINUATION_BIT, DATA_MASK, unzigzag_i32, unzigzag_i64};
use crate::DecodeError;

// -----------------------------------------------------------------------------
// Input

/// A cursor over a borrowed byte slice.
///
/// Every read either consumes exactly the bytes of one value or fails
/// without moving the cursor.
///
/// # Examples
///
/// ```
/// use oc_codec::io::Input;
///
/// let mut input = Input::new(&[0xAC, 0x02, 1]);
/// assert_eq!(input.read_var_u32(), Ok(300));
/// assert_eq!(input.read_bool(), Ok(true));
/// assert!(input.read_u8().is_err());
/// ```
#[derive(Clone, Debug)]
pub struct Input<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Input<'a> {
    #[inline]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    /// Returns the number of bytes consumed so far.
    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Returns the number of bytes left.
    #[inline]
    pub const fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(DecodeError::UnexpectedEnd {
                position: self.position,
                needed: len - remaining,
            });
        }
        let bytes = self.bytes;
        let out = &bytes[self.position..self.position + len];
        self.position += len;
        Ok(out)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    #[inline]
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        self.take(len)
    }

    /// Reads a byte that must be `0` or `1`.
    pub fn read_bool(&mut self) -> Result<bool, DecodeError> {
        match self.bytes.get(self.position) {
            Some(0) => {
                self.position += 1;
                Ok(false)
            }
            Some(1) => {
                self.position += 1;
                Ok(true)
            }
            Some(&byte) => Err(DecodeError::InvalidBool {
                position: self.position,
                byte,
            }),
            None => Err(DecodeError::UnexpectedEnd {
                position: self.position,
                needed: 1,
            }),
        }
    }

    #[inline]
    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        Ok(i32::from_be_bytes(self.take_array()?))
    }

    #[inline]
    pub fn read_i64(&mut self) -> Result<i64, DecodeError> {
        Ok(i64::from_be_bytes(self.take_array()?))
    }

    #[inline]
    pub fn read_f32(&mut self) -> Result<f32, DecodeError> {
        Ok(f32::from_bits(u32::from_be_bytes(self.take_array()?)))
    }

    #[inline]
    pub fn read_f64(&mut self) -> Result<f64, DecodeError> {
        Ok(f64::from_bits(u64::from_be_bytes(self.take_array()?)))
    }

    /// Reads an unsigned varint of at most `max_bits` significant bits.
    fn read_var(&mut self, max_bits: u32) -> Result<u64, DecodeError> {
        let start = self.position;
        let mut result = 0_u64;
        let mut shift = 0_u32;
        let mut cursor = start;
        loop {
            let Some(&byte) = self.bytes.get(cursor) else {
                return Err(DecodeError::UnexpectedEnd {
                    position: cursor,
                    needed: 1,
                });
            };
            cursor += 1;
            let data = u64::from(byte & DATA_MASK);
            if shift >= max_bits || (shift > 0 && data >> (max_bits - shift) != 0) {
                return Err(DecodeError::MalformedVarint { position: start });
            }
            result |= data << shift;
            if byte & CONTINUATION_BIT == 0 {
                self.position = cursor;
                return Ok(result);
            }
            shift += 7;
        }
    }

    #[inline]
    pub fn read_var_u32(&mut self) -> Result<u32, DecodeError> {
        Ok(self.read_var(32)? as u32)
    }

    #[inline]
    pub fn read_var_u64(&mut self) -> Result<u64, DecodeError> {
        self.read_var(64)
    }

    /// Reads a variable-length `i32` written with the same `optimize_positive`.
    #[inline]
    pub fn read_var_i32(&mut self, optimize_positive: bool) -> Result<i32, DecodeError> {
        let raw = self.read_var_u32()?;
        Ok(if optimize_positive {
            raw as i32
        } else {
            unzigzag_i32(raw)
        })
    }

    /// Reads a variable-length `i64` written with the same `optimize_positive`.
    #[inline]
    pub fn read_var_i64(&mut self, optimize_positive: bool) -> Result<i64, DecodeError> {
        let raw = self.read_var_u64()?;
        Ok(if optimize_positive {
            raw as i64
        } else {
            unzigzag_i64(raw)
        })
    }

    /// Reads a length-prefixed UTF-8 string.
    pub fn read_string(&mut self) -> Result<String, DecodeError> {
        let start = self.position;
        let len = self.read_var_u64()?;
        let bytes = match usize::try_from(len) {
            Ok(len) => self.take(len),
            Err(_) => Err(DecodeError::UnexpectedEnd {
                position: self.position,
                needed: usize::MAX,
            }),
        };
        let bytes = match bytes {
            Ok(bytes) => bytes,
            Err(err) => {
                self.position = start;
                return Err(err);
            }
        };
        match core::str::from_utf8(bytes) {
            Ok(s) => Ok(String::from(s)),
            Err(_) => {
                let position = self.position - bytes.len();
                self.position = start;
                Err(DecodeError::InvalidUtf8 { position })
            }
        }
    }
}
