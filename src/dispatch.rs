//! Per-kind dispatch of messages recovered from a packed buffer.
//!
//! Receivers implement [`MarketEventHandler`] for the kinds they care about;
//! unimplemented kinds fall through to default no-op bodies. Dispatch is
//! variant matching on the decoded [`MarketMessage`], not a callback
//! registry.

use crate::{
    error::UnpackError,
    frame::LengthPrefix,
    message::{GenericMsg, MarketMessage, Message, RefreshMsg, StatusMsg, UpdateMsg},
    unpack::Unpacker,
};

/// Receiver-side handler invoked once per unpacked message.
pub trait MarketEventHandler {
    /// An initial image arrived.
    fn on_refresh(&mut self, _msg: &RefreshMsg) {}

    /// An incremental change arrived.
    fn on_update(&mut self, _msg: &UpdateMsg) {}

    /// A stream state change arrived.
    fn on_status(&mut self, _msg: &StatusMsg) {}

    /// An application-defined message arrived.
    fn on_generic(&mut self, _msg: &GenericMsg) {}
}

/// Unframe `bytes`, decode each payload, and route it to `handler`.
///
/// Messages are delivered in submission order. Returns the number of
/// messages dispatched; an empty buffer dispatches zero and is not an
/// error.
///
/// # Errors
///
/// Returns [`UnpackError::TruncatedPrefix`] or
/// [`UnpackError::TruncatedPayload`] on framing damage, and
/// [`UnpackError::Decode`] when a cleanly unframed payload is not a valid
/// message. Messages before the failure have already been delivered.
pub fn dispatch_packed<H: MarketEventHandler>(
    bytes: &[u8],
    prefix: LengthPrefix,
    handler: &mut H,
) -> Result<usize, UnpackError> {
    let mut dispatched = 0;
    for payload in Unpacker::new(bytes, prefix) {
        let (message, _) = MarketMessage::from_bytes(payload?)?;
        match &message {
            MarketMessage::Refresh(msg) => handler.on_refresh(msg),
            MarketMessage::Update(msg) => handler.on_update(msg),
            MarketMessage::Status(msg) => handler.on_status(msg),
            MarketMessage::Generic(msg) => handler.on_generic(msg),
        }
        #[cfg(feature = "metrics")]
        crate::metrics::inc_frames_unpacked();
        dispatched += 1;
    }
    Ok(dispatched)
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
