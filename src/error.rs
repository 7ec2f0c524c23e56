//! Error types for packing and unpacking.
//!
//! The taxonomy splits along the direction of data flow:
//!
//! - [`PackError`]: failures while building or submitting a packed buffer
//!   (state misuse, capacity exhaustion, handle validation, encoding,
//!   transport submission).
//! - [`UnpackError`]: failures while recovering payloads from a received
//!   packed buffer (truncated framing, payload decoding).
//!
//! All variants are synchronous result outcomes returned to the immediate
//! caller; nothing is retried or swallowed internally. A failed
//! [`add_message`](crate::buffer::PackedBuffer::add_message) leaves the
//! buffer's accounting untouched.

use std::io;

use bincode::error::{DecodeError, EncodeError};
use thiserror::Error;

use crate::session::{ClientId, ItemId};

/// Errors produced while packing messages or submitting a packed buffer.
#[derive(Debug, Error)]
pub enum PackError {
    /// A buffer was re-bound while still holding packed messages.
    #[error("buffer re-bound while holding {count} packed messages; clear it first")]
    InvalidState {
        /// Messages packed at the time of the attempt.
        count: usize,
    },

    /// A message addition would exceed the remaining capacity.
    ///
    /// The buffer is left unchanged; the caller may submit the current
    /// batch and start a new buffer, or trim the batch.
    #[error("message does not fit: needs {required} bytes, {remaining} remaining")]
    BufferTooSmall {
        /// Overhead-adjusted size of the rejected frame.
        required: usize,
        /// Bytes left in the buffer before the attempt.
        remaining: usize,
    },

    /// An empty payload was passed to `add_message`.
    #[error("message payload must not be empty")]
    EmptyPayload,

    /// The requested capacity is zero, not expressible in the configured
    /// length prefix, or above the transport's negotiated maximum.
    #[error("invalid packing capacity {requested}; must be between 1 and {max}")]
    InvalidCapacity {
        /// Capacity the caller asked for.
        requested: usize,
        /// Largest capacity permitted by the prefix or transport.
        max: usize,
    },

    /// The client handle is not registered with the session.
    #[error("unknown client handle {0}")]
    UnknownClient(ClientId),

    /// The item handle is not registered for the buffer's client.
    #[error("item handle {item} is not registered for client {client}")]
    UnknownItem {
        /// Client the buffer is bound to.
        client: ClientId,
        /// Item handle that failed validation.
        item: ItemId,
    },

    /// Message serialization failed before framing.
    #[error("failed to encode message: {0}")]
    Encode(#[from] EncodeError),

    /// The transport rejected the submission.
    #[error("transport submission failed: {0}")]
    Transport(#[from] io::Error),
}

impl PackError {
    /// Returns true when the error means the current batch is full and a
    /// fresh buffer is the expected recovery.
    #[must_use]
    pub fn is_buffer_full(&self) -> bool { matches!(self, Self::BufferTooSmall { .. }) }
}

/// Errors produced while unframing or decoding a received packed buffer.
#[derive(Debug, Error)]
pub enum UnpackError {
    /// Trailing bytes too short to hold a complete length prefix.
    #[error("truncated length prefix: have {have} bytes, need {need}")]
    TruncatedPrefix {
        /// Bytes remaining in the input.
        have: usize,
        /// Prefix width in bytes.
        need: usize,
    },

    /// A length prefix declared more payload bytes than the input holds.
    #[error("frame declares {declared} payload bytes but only {available} remain")]
    TruncatedPayload {
        /// Payload length read from the prefix.
        declared: usize,
        /// Bytes remaining after the prefix.
        available: usize,
    },

    /// A recovered payload could not be decoded into a message.
    #[error("failed to decode message: {0}")]
    Decode(#[from] DecodeError),
}

impl UnpackError {
    /// Returns true for wire-level framing damage, as opposed to a payload
    /// that unframed cleanly but failed to decode.
    #[must_use]
    pub fn is_malformed_frame(&self) -> bool {
        matches!(
            self,
            Self::TruncatedPrefix { .. } | Self::TruncatedPayload { .. }
        )
    }
}
