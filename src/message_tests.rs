//! Unit tests for the message model and payload codec.

use super::{
    DataState, FieldList, FieldValue, MarketMessage, Message, RefreshMsg, State, StreamId,
    StreamState, UpdateMsg, fid,
};

fn sample_update(i: i64) -> MarketMessage {
    MarketMessage::Update(UpdateMsg {
        stream: StreamId::new(5),
        fields: FieldList::new()
            .with(fid::BID, FieldValue::real(3991 + i, -2))
            .with(fid::BIDSIZE, FieldValue::UInt(10 + i as u64)),
    })
}

#[test]
fn update_round_trips_through_bytes() {
    let message = sample_update(3);
    let bytes = message.to_bytes().expect("encode update");
    let (decoded, consumed) = MarketMessage::from_bytes(&bytes).expect("decode update");
    assert_eq!(consumed, bytes.len());
    assert_eq!(decoded, message);
}

#[test]
fn refresh_round_trips_through_bytes() {
    let message = MarketMessage::Refresh(RefreshMsg {
        stream: StreamId::new(5),
        name: "IBM.N".into(),
        state: State::open_ok("Refresh Completed"),
        complete: true,
        clear_cache: true,
        fields: FieldList::new()
            .with(fid::BID, FieldValue::real(3990, -2))
            .with(fid::ASK, FieldValue::real(3994, -2)),
    });
    let bytes = message.to_bytes().expect("encode refresh");
    let (decoded, _) = MarketMessage::from_bytes(&bytes).expect("decode refresh");
    assert_eq!(decoded, message);
}

#[test]
fn field_list_lookup_finds_first_match() {
    let fields = FieldList::new()
        .with(fid::BID, FieldValue::real(3991, -2))
        .with(fid::BIDSIZE, FieldValue::UInt(10));

    assert_eq!(fields.len(), 2);
    assert_eq!(
        fields.get(fid::BID),
        Some(&FieldValue::Real {
            mantissa: 3991,
            exponent: -2,
        })
    );
    assert_eq!(fields.get(fid::ASKSIZE), None);
}

#[test]
fn real_renders_as_decimal() {
    let bid = FieldValue::real(3991, -2);
    let rendered = bid.as_f64().expect("real value");
    assert!((rendered - 39.91).abs() < 1e-9);
    assert_eq!(FieldValue::UInt(10).as_f64(), None);
}

#[test]
fn truncated_payload_fails_to_decode() {
    let bytes = sample_update(0).to_bytes().expect("encode");
    assert!(MarketMessage::from_bytes(&bytes[..bytes.len() - 1]).is_err());
}

#[test]
fn message_reports_its_stream() {
    let message = sample_update(0);
    assert_eq!(message.stream(), StreamId::new(5));

    let status = MarketMessage::Status(super::StatusMsg {
        stream: StreamId::new(9),
        state: State {
            stream: StreamState::Closed,
            data: DataState::Suspect,
            text: "item closed".into(),
        },
    });
    assert_eq!(status.stream(), StreamId::new(9));
}
