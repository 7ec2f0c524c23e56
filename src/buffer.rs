//! Bounded buffer that packs length-prefixed messages for one client.
//!
//! [`PackedBuffer`] owns a fixed-capacity byte region bound to a destination
//! client. Encoded messages are appended as `prefix ++ payload` frames in
//! call order until the capacity is exhausted; the filled region is then
//! handed to the transport as a single submission unit and the buffer is
//! cleared for reuse without reallocation.
//!
//! Accounting is exact: `used == Σ (overhead + payload_len)` over the packed
//! frames, and a message whose frame fits the remaining space exactly is
//! admitted, leaving zero bytes free.

use bytes::BytesMut;
use tracing::trace;

use crate::{
    capacity,
    error::PackError,
    frame::LengthPrefix,
    session::{ClientId, ItemId},
};

/// Fixed-capacity packing buffer for a single client connection.
///
/// Designed for exclusive use by one producing task: fill, submit, clear,
/// repeat. Callers needing concurrent producers for the same client must
/// serialize access externally.
#[derive(Debug)]
pub struct PackedBuffer {
    client: ClientId,
    capacity: usize,
    used: usize,
    count: usize,
    prefix: LengthPrefix,
    region: BytesMut,
}

impl PackedBuffer {
    /// Bind a new buffer to `client` with the given capacity and prefix.
    ///
    /// The byte region is allocated once, up front.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::InvalidCapacity`] when `capacity` is zero or the
    /// largest admissible payload (`capacity - overhead`) cannot be expressed
    /// in the prefix width. The latter bound makes every later prefix write
    /// infallible.
    pub fn bind(
        client: ClientId,
        capacity: usize,
        prefix: LengthPrefix,
    ) -> Result<Self, PackError> {
        Self::validate_capacity(capacity, prefix)?;
        trace!(%client, capacity, "bound packing buffer");
        Ok(Self {
            client,
            capacity,
            used: 0,
            count: 0,
            prefix,
            region: BytesMut::with_capacity(capacity),
        })
    }

    fn validate_capacity(capacity: usize, prefix: LengthPrefix) -> Result<(), PackError> {
        let max = prefix
            .max_payload()
            .saturating_add(prefix.overhead());
        if capacity == 0 || capacity > max {
            return Err(PackError::InvalidCapacity {
                requested: capacity,
                max,
            });
        }
        Ok(())
    }

    /// Re-bind the buffer to a (possibly different) client and capacity.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::InvalidState`] while packed messages are present;
    /// call [`clear`](Self::clear) first. Returns
    /// [`PackError::InvalidCapacity`] under the same conditions as
    /// [`bind`](Self::bind).
    pub fn rebind(&mut self, client: ClientId, capacity: usize) -> Result<(), PackError> {
        if self.count != 0 {
            return Err(PackError::InvalidState { count: self.count });
        }
        Self::validate_capacity(capacity, self.prefix)?;
        self.client = client;
        self.capacity = capacity;
        self.used = 0;
        self.region.clear();
        Ok(())
    }

    /// Append one encoded message as a length-prefixed frame.
    ///
    /// `item` identifies the destination stream for the transport's later
    /// dispatch; it is not part of the packed envelope (the payload carries
    /// its own stream identity) and is surfaced here only in trace output.
    ///
    /// On failure the buffer is unchanged: no partial write, no accounting
    /// drift.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::EmptyPayload`] for a zero-length payload and
    /// [`PackError::BufferTooSmall`] when the frame does not fit the
    /// remaining space, even by a single byte.
    pub fn add_message(&mut self, payload: &[u8], item: ItemId) -> Result<(), PackError> {
        if payload.is_empty() {
            return Err(PackError::EmptyPayload);
        }
        let overhead = self.prefix.overhead();
        if !capacity::can_admit(self.capacity, self.used, overhead, payload.len()) {
            return Err(PackError::BufferTooSmall {
                required: capacity::frame_size(overhead, payload.len())
                    .unwrap_or(usize::MAX),
                remaining: self.remaining_size(),
            });
        }

        self.prefix.write(payload.len(), &mut self.region);
        self.region.extend_from_slice(payload);
        self.used = capacity::admit(self.used, overhead, payload.len());
        self.count += 1;

        #[cfg(feature = "metrics")]
        crate::metrics::inc_frames_packed();
        trace!(
            client = %self.client,
            %item,
            len = payload.len(),
            remaining = self.remaining_size(),
            "packed message"
        );
        Ok(())
    }

    /// Bytes still available for frames.
    #[must_use]
    pub fn remaining_size(&self) -> usize { capacity::remaining(self.capacity, self.used) }

    /// Total usable capacity fixed at bind time.
    #[must_use]
    pub const fn max_size(&self) -> usize { self.capacity }

    /// Number of messages packed so far.
    #[must_use]
    pub const fn packed_msg_count(&self) -> usize { self.count }

    /// Client the buffer is bound to.
    #[must_use]
    pub const fn client(&self) -> ClientId { self.client }

    /// Length prefix in effect for this buffer.
    #[must_use]
    pub const fn prefix(&self) -> LengthPrefix { self.prefix }

    /// The framed region written so far.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] { self.region.as_ref() }

    /// Whether the buffer currently holds no frames.
    #[must_use]
    pub const fn is_empty(&self) -> bool { self.count == 0 }

    /// Reset the buffer to empty, keeping capacity and client binding.
    ///
    /// Safe to call repeatedly and before any `add_message`; after clearing,
    /// accounting is indistinguishable from a freshly bound buffer.
    pub fn clear(&mut self) {
        self.used = 0;
        self.count = 0;
        self.region.clear();
    }
}

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;
