#![doc(html_root_url = "https://docs.rs/packframe/latest")]
//! Public API for the `packframe` library.
//!
//! This crate packs independently encoded market-data messages into
//! bounded-size transport buffers: length-prefixed framing with exact
//! capacity accounting on the way out, ordered unframing and per-kind
//! dispatch on the way in.

pub mod buffer;
pub mod capacity;
pub mod dispatch;
pub mod error;
pub mod frame;
pub mod message;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod session;
pub mod unpack;

pub use buffer::PackedBuffer;
pub use dispatch::{MarketEventHandler, dispatch_packed};
pub use error::{PackError, UnpackError};
pub use frame::{Endianness, LengthPrefix};
pub use message::{
    DataState,
    FieldEntry,
    FieldId,
    FieldList,
    FieldValue,
    GenericMsg,
    MarketMessage,
    Message,
    RefreshMsg,
    State,
    StatusMsg,
    StreamId,
    StreamState,
    UpdateMsg,
    fid,
};
pub use session::{
    ClientId,
    DEFAULT_PACKED_SIZE,
    ItemId,
    MAX_PACKED_SIZE,
    PackingSession,
    Transport,
};
pub use unpack::Unpacker;
