//! Length-prefix framing for packed buffers.
//!
//! Every message inside a packed buffer is preceded by a fixed-width integer
//! holding the payload length. The prefix width is the whole per-frame
//! overhead and feeds directly into capacity accounting, so it is modelled as
//! an explicit value rather than a hard-coded constant.

use bytes::BytesMut;

use crate::error::UnpackError;

/// Byte order used for encoding and decoding length prefixes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endianness {
    /// Most significant byte first (network order).
    Big,
    /// Least significant byte first.
    Little,
}

/// Fixed-width length prefix written before each packed payload.
///
/// The default is a 2-byte big-endian prefix, matching the packed envelope of
/// the market-data transport this crate targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LengthPrefix {
    width: usize,
    endianness: Endianness,
}

impl LengthPrefix {
    /// Creates a prefix with the given width and endianness.
    ///
    /// # Panics
    ///
    /// Panics if `width` is not 1, 2, 4, or 8.
    #[must_use]
    pub const fn new(width: usize, endianness: Endianness) -> Self {
        assert!(matches!(width, 1 | 2 | 4 | 8), "invalid length-prefix width");
        Self { width, endianness }
    }

    /// 1-byte prefix.
    #[must_use]
    pub const fn u8() -> Self { Self::new(1, Endianness::Big) }

    /// 2-byte big-endian prefix.
    #[must_use]
    pub const fn u16_be() -> Self { Self::new(2, Endianness::Big) }

    /// 2-byte little-endian prefix.
    #[must_use]
    pub const fn u16_le() -> Self { Self::new(2, Endianness::Little) }

    /// 4-byte big-endian prefix.
    #[must_use]
    pub const fn u32_be() -> Self { Self::new(4, Endianness::Big) }

    /// 4-byte little-endian prefix.
    #[must_use]
    pub const fn u32_le() -> Self { Self::new(4, Endianness::Little) }

    /// Per-frame overhead in bytes; equal to the prefix width.
    #[must_use]
    pub const fn overhead(&self) -> usize { self.width }

    /// Largest payload length this prefix can express.
    #[must_use]
    pub const fn max_payload(&self) -> usize {
        let bits = self.width * 8;
        if bits >= usize::BITS as usize {
            usize::MAX
        } else {
            (1 << bits) - 1
        }
    }

    /// Read a payload length from the front of `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`UnpackError::TruncatedPrefix`] if `bytes` holds fewer than
    /// [`overhead`](Self::overhead) bytes.
    pub fn read(&self, bytes: &[u8]) -> Result<usize, UnpackError> {
        if bytes.len() < self.width {
            return Err(UnpackError::TruncatedPrefix {
                have: bytes.len(),
                need: self.width,
            });
        }

        let mut buf = [0u8; 8];
        let raw = match self.endianness {
            Endianness::Big => {
                buf[8 - self.width..].copy_from_slice(&bytes[..self.width]);
                u64::from_be_bytes(buf)
            }
            Endianness::Little => {
                buf[..self.width].copy_from_slice(&bytes[..self.width]);
                u64::from_le_bytes(buf)
            }
        };

        // A length beyond usize::MAX can never fit the remaining input, so
        // saturating keeps the truncation check downstream honest.
        Ok(usize::try_from(raw).unwrap_or(usize::MAX))
    }

    /// Append `len` to `dst` in this prefix's encoding.
    ///
    /// Callers must have established `len <= max_payload()`; packed buffers
    /// guarantee this at bind time by bounding their capacity.
    pub fn write(&self, len: usize, dst: &mut BytesMut) {
        debug_assert!(len <= self.max_payload(), "length exceeds prefix range");

        let bytes = match self.endianness {
            Endianness::Big => (len as u64).to_be_bytes(),
            Endianness::Little => (len as u64).to_le_bytes(),
        };
        match self.endianness {
            Endianness::Big => dst.extend_from_slice(&bytes[8 - self.width..]),
            Endianness::Little => dst.extend_from_slice(&bytes[..self.width]),
        }
    }
}

impl Default for LengthPrefix {
    fn default() -> Self { Self::u16_be() }
}
