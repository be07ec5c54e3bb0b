//! Bounds-checked cursor over the raw pickle bytes.
//!
//! The decoder owns exactly one cursor. Nested decodes save the position,
//! seek, read, and restore it, strictly stack-disciplined; see the session
//! for that protocol. This module only knows how to read the primitive
//! encodings: single bytes, base-128 varints, and big-endian signed values.

use crate::error::{Result, UnpickleError};

/// Read cursor over an immutable byte buffer.
pub struct PickleBuf<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> PickleBuf<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        PickleBuf { bytes, pos: 0 }
    }

    /// Current byte offset.
    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Move the cursor. Seeking past the end is caught by the next read.
    #[inline]
    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Total buffer length.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Read one byte and advance.
    pub fn read_byte(&mut self) -> Result<u8> {
        let b = *self
            .bytes
            .get(self.pos)
            .ok_or_else(|| UnpickleError::corrupt(self.pos, "read past end of buffer"))?;
        self.pos += 1;
        Ok(b)
    }

    /// Read `n` raw bytes and advance.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(n).filter(|&e| e <= self.bytes.len());
        let end = end.ok_or_else(|| {
            UnpickleError::corrupt(self.pos, format!("truncated: {n} bytes expected"))
        })?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    /// Read an unsigned base-128 varint that must fit in 32 bits.
    ///
    /// Entry lengths and entry references use this encoding.
    pub fn read_nat(&mut self) -> Result<u32> {
        let start = self.pos;
        let wide = self.read_long_nat()?;
        u32::try_from(wide)
            .map_err(|_| UnpickleError::corrupt(start, "varint does not fit in 32 bits"))
    }

    /// Read an unsigned base-128 varint up to 64 bits.
    ///
    /// Each byte carries 7 value bits, high bit set on all but the last.
    pub fn read_long_nat(&mut self) -> Result<u64> {
        let start = self.pos;
        let mut value: u64 = 0;
        loop {
            let b = self.read_byte()?;
            if value >> 57 != 0 {
                return Err(UnpickleError::corrupt(
                    start,
                    "varint does not fit in 64 bits",
                ));
            }
            value = (value << 7) | u64::from(b & 0x7f);
            if b & 0x80 == 0 {
                return Ok(value);
            }
        }
    }

    /// Read a signed big-endian integer occupying all bytes up to `end`.
    ///
    /// Literal constants are stored this way: the entry length determines
    /// the width, and the value is sign-extended from its leading byte.
    pub fn read_long_signed(&mut self, end: usize) -> Result<i64> {
        let start = self.pos;
        if end < self.pos || end - self.pos > 8 {
            return Err(UnpickleError::corrupt(
                start,
                "signed literal wider than 8 bytes",
            ));
        }
        let n = end - self.pos;
        let bytes = self.read_bytes(n)?;
        let mut value: i64 = match bytes.first() {
            // Sign-extend from the first byte.
            Some(&b) => i64::from(b as i8),
            None => 0,
        };
        for &b in bytes.iter().skip(1) {
            value = (value << 8) | i64::from(b);
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Encode a varint the way the producer does, for round-trip checks.
    fn nat(mut v: u64) -> Vec<u8> {
        let mut out = vec![(v & 0x7f) as u8];
        v >>= 7;
        while v != 0 {
            out.push(0x80 | (v & 0x7f) as u8);
            v >>= 7;
        }
        out.reverse();
        out
    }

    #[test]
    fn nat_single_byte() {
        let bytes = nat(0x45);
        let mut buf = PickleBuf::new(&bytes);
        assert_eq!(buf.read_nat().unwrap(), 0x45);
        assert_eq!(buf.pos(), 1);
    }

    #[test]
    fn nat_multi_byte() {
        for v in [128u64, 300, 16_384, 0xFFFF_FFFF] {
            let bytes = nat(v);
            let mut buf = PickleBuf::new(&bytes);
            assert_eq!(buf.read_long_nat().unwrap(), v, "value {v}");
        }
    }

    #[test]
    fn nat_rejects_32_bit_overflow() {
        let bytes = nat(u64::from(u32::MAX) + 1);
        let mut buf = PickleBuf::new(&bytes);
        assert!(buf.read_nat().is_err());
    }

    #[test]
    fn read_past_end_is_an_error() {
        let mut buf = PickleBuf::new(&[0x80]);
        // Continuation bit set but no following byte.
        assert!(buf.read_nat().is_err());
    }

    #[test]
    fn signed_literal_sign_extends() {
        // -2 as a single byte.
        let mut buf = PickleBuf::new(&[0xfe]);
        assert_eq!(buf.read_long_signed(1).unwrap(), -2);
        // 0x0102 as two bytes.
        let mut buf = PickleBuf::new(&[0x01, 0x02]);
        assert_eq!(buf.read_long_signed(2).unwrap(), 0x0102);
        // Empty width reads zero.
        let mut buf = PickleBuf::new(&[]);
        assert_eq!(buf.read_long_signed(0).unwrap(), 0);
    }

    #[test]
    fn signed_literal_full_width() {
        let bytes = (-1234567890123456789i64).to_be_bytes();
        let mut buf = PickleBuf::new(&bytes);
        assert_eq!(buf.read_long_signed(8).unwrap(), -1234567890123456789);
    }
}
