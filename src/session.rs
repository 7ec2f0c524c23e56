//! Binds packed buffers to live client connections.
//!
//! The transport layer owns connections; it registers a [`ClientId`] here
//! when a consumer logs in and the [`ItemId`]s of the streams that consumer
//! subscribes to. [`PackingSession`] validates those handles, sizes new
//! buffers against the transport's negotiated limits, encodes messages into
//! frames, and hands filled buffers to [`Transport::submit`] as opaque
//! blobs. Everything past that call — I/O, backpressure, reconnection — is
//! the transport's concern.

use std::{collections::HashSet, io};

use dashmap::DashMap;
use tracing::{debug, trace, warn};

use crate::{
    buffer::PackedBuffer,
    error::PackError,
    frame::LengthPrefix,
    message::{MarketMessage, Message},
};

/// Identifier assigned to a connected client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ClientId(u64);

impl ClientId {
    /// Create a new [`ClientId`] with the provided value.
    #[must_use]
    pub const fn new(id: u64) -> Self { Self(id) }

    /// Return the inner `u64` representation.
    #[must_use]
    pub const fn as_u64(self) -> u64 { self.0 }
}

impl From<u64> for ClientId {
    fn from(value: u64) -> Self { Self(value) }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ClientId({})", self.0)
    }
}

/// Identifier assigned to a subscribed item stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ItemId(u64);

impl ItemId {
    /// Create a new [`ItemId`] with the provided value.
    #[must_use]
    pub const fn new(id: u64) -> Self { Self(id) }

    /// Return the inner `u64` representation.
    #[must_use]
    pub const fn as_u64(self) -> u64 { self.0 }
}

impl From<u64> for ItemId {
    fn from(value: u64) -> Self { Self(value) }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ItemId({})", self.0)
    }
}

/// Packed size negotiated by default when the caller does not pick one.
pub const DEFAULT_PACKED_SIZE: usize = 6000;

/// Largest packed buffer the reference transport accepts; a packed buffer
/// must fit in one transport fragment.
pub const MAX_PACKED_SIZE: usize = 6144;

/// Submission seam to the owning transport layer.
///
/// The packed region is handed over as an opaque blob; this crate's
/// responsibility ends once the bytes are framed and bounds-checked.
pub trait Transport {
    /// Write a fully framed packed buffer to `client`'s connection.
    ///
    /// # Errors
    ///
    /// Returns an [`io::Error`] when the transport cannot accept the
    /// submission (disconnection, backpressure).
    fn submit(&self, client: ClientId, bytes: &[u8]) -> io::Result<()>;

    /// Packed size used when the caller does not request one.
    fn default_packed_size(&self) -> usize { DEFAULT_PACKED_SIZE }

    /// Largest packed size the transport accepts.
    fn max_packed_size(&self) -> usize { MAX_PACKED_SIZE }
}

#[derive(Debug, Default)]
struct ClientEntry {
    items: HashSet<ItemId>,
}

/// Factory and submission adapter for per-client packed buffers.
///
/// The registry is concurrent-safe so the transport's connection lifecycle
/// and producing tasks can share one session; individual packed buffers
/// remain single-producer values.
#[derive(Debug)]
pub struct PackingSession<T> {
    transport: T,
    clients: DashMap<ClientId, ClientEntry>,
    prefix: LengthPrefix,
}

impl<T: Transport> PackingSession<T> {
    /// Create a session over `transport` with the default length prefix.
    #[must_use]
    pub fn new(transport: T) -> Self { Self::with_prefix(transport, LengthPrefix::default()) }

    /// Create a session using a specific length prefix for all buffers.
    #[must_use]
    pub fn with_prefix(transport: T, prefix: LengthPrefix) -> Self {
        Self {
            transport,
            clients: DashMap::new(),
            prefix,
        }
    }

    /// Register a newly connected client.
    pub fn register_client(&self, client: ClientId) {
        self.clients.entry(client).or_default();
        debug!(%client, "registered client");
    }

    /// Remove a client on connection teardown.
    pub fn unregister_client(&self, client: ClientId) {
        self.clients.remove(&client);
        debug!(%client, "unregistered client");
    }

    /// Register an item stream subscribed by `client`.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::UnknownClient`] when `client` is not registered.
    pub fn register_item(&self, client: ClientId, item: ItemId) -> Result<(), PackError> {
        let mut entry = self
            .clients
            .get_mut(&client)
            .ok_or(PackError::UnknownClient(client))?;
        entry.items.insert(item);
        trace!(%client, %item, "registered item");
        Ok(())
    }

    /// Build a packed buffer bound to `client`.
    ///
    /// With no explicit capacity the transport's negotiated default is used.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::UnknownClient`] for an unregistered handle and
    /// [`PackError::InvalidCapacity`] when the requested capacity is zero or
    /// exceeds [`Transport::max_packed_size`].
    pub fn init_buffer(
        &self,
        client: ClientId,
        capacity: Option<usize>,
    ) -> Result<PackedBuffer, PackError> {
        if !self.clients.contains_key(&client) {
            return Err(PackError::UnknownClient(client));
        }
        let max = self.transport.max_packed_size();
        let capacity = capacity.unwrap_or_else(|| self.transport.default_packed_size().min(max));
        if capacity > max {
            return Err(PackError::InvalidCapacity {
                requested: capacity,
                max,
            });
        }
        PackedBuffer::bind(client, capacity, self.prefix)
    }

    /// Encode `message` and pack it into `buffer` for delivery on `item`.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::UnknownClient`] when the buffer's client has
    /// disconnected since the buffer was built,
    /// [`PackError::UnknownItem`] when `item` is not subscribed by that
    /// client, [`PackError::Encode`] on serialization failure, and any
    /// [`PackedBuffer::add_message`] error otherwise.
    pub fn add_msg(
        &self,
        buffer: &mut PackedBuffer,
        message: &MarketMessage,
        item: ItemId,
    ) -> Result<(), PackError> {
        let client = buffer.client();
        let entry = self
            .clients
            .get(&client)
            .ok_or(PackError::UnknownClient(client))?;
        if !entry.items.contains(&item) {
            return Err(PackError::UnknownItem { client, item });
        }
        drop(entry);

        let bytes = message.to_bytes()?;
        buffer.add_message(&bytes, item)
    }

    /// Hand the filled buffer to the transport, then clear it for reuse.
    ///
    /// The buffer is cleared whether or not the transport accepts the
    /// submission: a batch the transport rejected is not silently retried,
    /// the caller decides whether to rebuild it. Submitting an empty buffer
    /// is a no-op that still clears.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::UnknownClient`] for a disconnected client and
    /// [`PackError::Transport`] when the transport rejects the bytes.
    pub fn submit(&self, buffer: &mut PackedBuffer) -> Result<(), PackError> {
        let client = buffer.client();
        if !self.clients.contains_key(&client) {
            return Err(PackError::UnknownClient(client));
        }

        let count = buffer.packed_msg_count();
        let result = if count == 0 {
            Ok(())
        } else {
            self.transport.submit(client, buffer.as_bytes())
        };
        buffer.clear();

        match result {
            Ok(()) => {
                #[cfg(feature = "metrics")]
                crate::metrics::inc_buffers_submitted();
                debug!(%client, messages = count, "submitted packed buffer");
                Ok(())
            }
            Err(err) => {
                warn!(%client, messages = count, error = %err, "packed submission failed");
                Err(PackError::Transport(err))
            }
        }
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T { &self.transport }

    /// Length prefix applied to buffers built by this session.
    #[must_use]
    pub fn prefix(&self) -> LengthPrefix { self.prefix }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
