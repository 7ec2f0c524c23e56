//! Recovery of individual payloads from a received packed buffer.
//!
//! [`Unpacker`] walks the frames of a packed region and yields the original
//! payload byte-ranges in submission order. It never copies or mutates its
//! input; each yielded payload borrows from the received bytes and is handed
//! on to the message decoder by the caller.

use std::iter::FusedIterator;

use crate::{error::UnpackError, frame::LengthPrefix};

/// Lazy iterator over the payloads of a packed buffer.
///
/// The unpacker is cheap to construct and [`Clone`], so a walk can be
/// restarted by cloning the starting state or calling
/// [`Unpacker::new`] again. An empty input yields an empty sequence. After
/// the first error the iterator fuses: framing damage makes every later
/// frame boundary unreliable.
#[derive(Clone, Debug)]
pub struct Unpacker<'a> {
    rest: &'a [u8],
    prefix: LengthPrefix,
    failed: bool,
}

impl<'a> Unpacker<'a> {
    /// Create an unpacker over `bytes` using the given length prefix.
    #[must_use]
    pub const fn new(bytes: &'a [u8], prefix: LengthPrefix) -> Self {
        Self {
            rest: bytes,
            prefix,
            failed: false,
        }
    }

    /// Collect every payload in submission order.
    ///
    /// # Errors
    ///
    /// Returns the first [`UnpackError`] encountered; payloads before the
    /// damage are discarded.
    pub fn payloads(bytes: &'a [u8], prefix: LengthPrefix) -> Result<Vec<&'a [u8]>, UnpackError> {
        Self::new(bytes, prefix).collect()
    }
}

impl<'a> Iterator for Unpacker<'a> {
    type Item = Result<&'a [u8], UnpackError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.rest.is_empty() {
            return None;
        }

        let declared = match self.prefix.read(self.rest) {
            Ok(len) => len,
            Err(err) => {
                self.failed = true;
                return Some(Err(err));
            }
        };

        let body = &self.rest[self.prefix.overhead()..];
        if declared > body.len() {
            self.failed = true;
            return Some(Err(UnpackError::TruncatedPayload {
                declared,
                available: body.len(),
            }));
        }

        let (payload, rest) = body.split_at(declared);
        self.rest = rest;
        Some(Ok(payload))
    }
}

impl FusedIterator for Unpacker<'_> {}

#[cfg(test)]
#[path = "unpack_tests.rs"]
mod tests;
