//! Market-data message model and payload codec.
//!
//! Messages travel through a packed buffer as opaque byte sequences; this
//! module supplies the concrete model those bytes encode. Message kinds form
//! a closed set — refresh, update, status, generic — expressed as a tagged
//! union so receivers dispatch by matching on the variant rather than
//! through a callback interface.

use bincode::error::{DecodeError, EncodeError};
use bincode::{BorrowDecode, Encode, borrow_decode_from_slice, config, encode_to_vec};
use serde::{Deserialize, Serialize};

/// Wrapper trait for wire-encodable message types.
///
/// Any type deriving [`Encode`] and [`BorrowDecode`] automatically implements
/// this trait via a blanket implementation. The default methods serialize
/// and deserialize using bincode's standard configuration.
pub trait Message: Encode + for<'de> BorrowDecode<'de, ()> {
    /// Serialize the message into a byte vector.
    ///
    /// # Errors
    ///
    /// Returns an [`EncodeError`] if serialization fails.
    fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        encode_to_vec(self, config::standard())
    }

    /// Deserialize a message from a byte slice, returning the message and
    /// the number of bytes consumed.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if deserialization fails.
    fn from_bytes(bytes: &[u8]) -> Result<(Self, usize), DecodeError>
    where
        Self: Sized,
    {
        borrow_decode_from_slice(bytes, config::standard())
    }
}

impl<T> Message for T where for<'de> T: Encode + BorrowDecode<'de, ()> {}

/// Stream identifier carried inside every message payload.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Encode, BorrowDecode, Serialize, Deserialize,
)]
pub struct StreamId(i32);

impl StreamId {
    /// Create a new [`StreamId`] with the provided value.
    #[must_use]
    pub const fn new(id: i32) -> Self { Self(id) }

    /// Return the inner `i32` representation.
    #[must_use]
    pub const fn get(self) -> i32 { self.0 }
}

impl std::fmt::Display for StreamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StreamId({})", self.0)
    }
}

/// Field identifier from the reference data dictionary.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Encode, BorrowDecode, Serialize, Deserialize,
)]
pub struct FieldId(pub u16);

/// Well-known field identifiers used across the tests and demo content.
pub mod fid {
    use super::FieldId;

    /// Bid price.
    pub const BID: FieldId = FieldId(22);
    /// Ask price.
    pub const ASK: FieldId = FieldId(25);
    /// Bid size.
    pub const BIDSIZE: FieldId = FieldId(30);
    /// Ask size.
    pub const ASKSIZE: FieldId = FieldId(31);
}

/// Value of a single market-data field.
#[derive(Clone, Debug, PartialEq, Encode, BorrowDecode, Serialize, Deserialize)]
pub enum FieldValue {
    /// Decimal real: `mantissa * 10^exponent`.
    Real {
        /// Scaled integer value.
        mantissa: i64,
        /// Power-of-ten scale, typically negative.
        exponent: i8,
    },
    /// Unsigned integer.
    UInt(u64),
    /// Signed integer.
    Int(i64),
    /// Enumerated value resolved through the dictionary.
    Enum(u16),
    /// ASCII string.
    Ascii(String),
}

impl FieldValue {
    /// Decimal real from a scaled mantissa and exponent.
    #[must_use]
    pub const fn real(mantissa: i64, exponent: i8) -> Self {
        Self::Real { mantissa, exponent }
    }

    /// Approximate `f64` rendering of a [`FieldValue::Real`].
    ///
    /// Returns `None` for non-real values.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Real { mantissa, exponent } => {
                Some(*mantissa as f64 * 10f64.powi(i32::from(*exponent)))
            }
            _ => None,
        }
    }
}

/// One field of a field list.
#[derive(Clone, Debug, PartialEq, Encode, BorrowDecode, Serialize, Deserialize)]
pub struct FieldEntry {
    /// Dictionary field identifier.
    pub field: FieldId,
    /// Field value.
    pub value: FieldValue,
}

/// Ordered collection of fields carried by refresh and update messages.
#[derive(
    Clone, Debug, Default, PartialEq, Encode, BorrowDecode, Serialize, Deserialize,
)]
pub struct FieldList(Vec<FieldEntry>);

impl FieldList {
    /// Empty field list.
    #[must_use]
    pub const fn new() -> Self { Self(Vec::new()) }

    /// Builder-style append.
    #[must_use]
    pub fn with(mut self, field: FieldId, value: FieldValue) -> Self {
        self.push(field, value);
        self
    }

    /// Append a field entry.
    pub fn push(&mut self, field: FieldId, value: FieldValue) {
        self.0.push(FieldEntry { field, value });
    }

    /// First value carried for `field`, if present.
    #[must_use]
    pub fn get(&self, field: FieldId) -> Option<&FieldValue> {
        self.0
            .iter()
            .find(|entry| entry.field == field)
            .map(|entry| &entry.value)
    }

    /// Iterate the entries in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldEntry> { self.0.iter() }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize { self.0.len() }

    /// Whether the list holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl<'a> IntoIterator for &'a FieldList {
    type Item = &'a FieldEntry;
    type IntoIter = std::slice::Iter<'a, FieldEntry>;

    fn into_iter(self) -> Self::IntoIter { self.0.iter() }
}

/// Stream lifecycle state reported by refresh and status messages.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Encode, BorrowDecode, Serialize, Deserialize,
)]
pub enum StreamState {
    /// The stream is open and will receive further updates.
    Open,
    /// A one-shot snapshot; no updates follow.
    NonStreaming,
    /// The stream is closed.
    Closed,
    /// Closed, but the item may be re-requested.
    ClosedRecover,
    /// The item is served elsewhere.
    Redirected,
}

/// Health of the data carried on the stream.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Encode, BorrowDecode, Serialize, Deserialize,
)]
pub enum DataState {
    /// Data is current.
    Ok,
    /// Data may be stale.
    Suspect,
    /// No change from the previous state.
    NoChange,
}

/// Combined stream and data state with optional status text.
#[derive(Clone, Debug, PartialEq, Encode, BorrowDecode, Serialize, Deserialize)]
pub struct State {
    /// Stream lifecycle state.
    pub stream: StreamState,
    /// Data health.
    pub data: DataState,
    /// Human-readable status text.
    pub text: String,
}

impl State {
    /// Open stream carrying current data.
    #[must_use]
    pub fn open_ok(text: impl Into<String>) -> Self {
        Self {
            stream: StreamState::Open,
            data: DataState::Ok,
            text: text.into(),
        }
    }
}

/// Initial image of an item stream.
#[derive(Clone, Debug, PartialEq, Encode, BorrowDecode, Serialize, Deserialize)]
pub struct RefreshMsg {
    /// Destination stream.
    pub stream: StreamId,
    /// Item name.
    pub name: String,
    /// Stream and data state.
    pub state: State,
    /// Whether this refresh completes the image.
    pub complete: bool,
    /// Whether cached data for the item should be discarded first.
    pub clear_cache: bool,
    /// Field values of the image.
    pub fields: FieldList,
}

/// Incremental change to an item stream.
#[derive(Clone, Debug, PartialEq, Encode, BorrowDecode, Serialize, Deserialize)]
pub struct UpdateMsg {
    /// Destination stream.
    pub stream: StreamId,
    /// Changed field values.
    pub fields: FieldList,
}

/// Stream state change without data.
#[derive(Clone, Debug, PartialEq, Encode, BorrowDecode, Serialize, Deserialize)]
pub struct StatusMsg {
    /// Destination stream.
    pub stream: StreamId,
    /// New stream and data state.
    pub state: State,
}

/// Opaque bidirectional message on an established stream.
#[derive(Clone, Debug, PartialEq, Encode, BorrowDecode, Serialize, Deserialize)]
pub struct GenericMsg {
    /// Destination stream.
    pub stream: StreamId,
    /// Application-defined content.
    pub payload: Vec<u8>,
}

/// A single protocol message, dispatched by variant.
#[derive(Clone, Debug, PartialEq, Encode, BorrowDecode, Serialize, Deserialize)]
pub enum MarketMessage {
    /// Initial image.
    Refresh(RefreshMsg),
    /// Incremental change.
    Update(UpdateMsg),
    /// State change.
    Status(StatusMsg),
    /// Application-defined content.
    Generic(GenericMsg),
}

impl MarketMessage {
    /// Stream the message is addressed to.
    #[must_use]
    pub const fn stream(&self) -> StreamId {
        match self {
            Self::Refresh(msg) => msg.stream,
            Self::Update(msg) => msg.stream,
            Self::Status(msg) => msg.stream,
            Self::Generic(msg) => msg.stream,
        }
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
