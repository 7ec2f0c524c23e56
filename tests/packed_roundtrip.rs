//! End-to-end coverage for packing, submission, unframing, and dispatch.

use std::{io, sync::Mutex};

use packframe::{
    ClientId,
    FieldList,
    FieldValue,
    ItemId,
    LengthPrefix,
    MarketEventHandler,
    MarketMessage,
    Message,
    PackError,
    PackedBuffer,
    PackingSession,
    StreamId,
    Transport,
    UpdateMsg,
    Unpacker,
    dispatch_packed,
    fid,
};

const CLIENT: ClientId = ClientId::new(1);
const ITEM: ItemId = ItemId::new(6);
const STREAM: StreamId = StreamId::new(6);

#[derive(Default)]
struct LoopbackTransport {
    delivered: Mutex<Vec<Vec<u8>>>,
}

impl LoopbackTransport {
    fn delivered(&self) -> Vec<Vec<u8>> { self.delivered.lock().expect("lock").clone() }
}

impl Transport for LoopbackTransport {
    fn submit(&self, _client: ClientId, bytes: &[u8]) -> io::Result<()> {
        self.delivered.lock().expect("lock").push(bytes.to_vec());
        Ok(())
    }
}

#[derive(Default)]
struct UpdateCollector(Vec<UpdateMsg>);

impl MarketEventHandler for UpdateCollector {
    fn on_update(&mut self, msg: &UpdateMsg) { self.0.push(msg.clone()); }
}

fn market_update(i: i64) -> MarketMessage {
    MarketMessage::Update(UpdateMsg {
        stream: STREAM,
        fields: FieldList::new()
            .with(fid::BID, FieldValue::real(3991 + i, -2))
            .with(fid::BIDSIZE, FieldValue::UInt(10 + u64::try_from(i).expect("non-negative"))),
    })
}

fn provider_session() -> PackingSession<LoopbackTransport> {
    let session = PackingSession::new(LoopbackTransport::default());
    session.register_client(CLIENT);
    session.register_item(CLIENT, ITEM).expect("register item");
    session
}

#[test]
fn ten_updates_pack_submit_and_dispatch_in_order() {
    let session = provider_session();
    let mut buf = session.init_buffer(CLIENT, None).expect("default buffer");
    assert_eq!(buf.max_size(), 6000);

    for i in 0..10 {
        session
            .add_msg(&mut buf, &market_update(i), ITEM)
            .expect("update fits the default buffer");
    }
    assert_eq!(buf.packed_msg_count(), 10);
    assert!(buf.remaining_size() < buf.max_size());

    session.submit(&mut buf).expect("submit batch");
    let delivered = session.transport().delivered();
    assert_eq!(delivered.len(), 1);

    let mut collector = UpdateCollector::default();
    let dispatched = dispatch_packed(&delivered[0], session.prefix(), &mut collector)
        .expect("dispatch received buffer");
    assert_eq!(dispatched, 10);
    assert_eq!(collector.0.len(), 10);

    // Bid walks 39.91..=40.00 and bid size 10..=19, in submission order.
    for (i, update) in collector.0.iter().enumerate() {
        assert_eq!(update.stream, STREAM);
        let i = i64::try_from(i).expect("small index");
        assert_eq!(
            update.fields.get(fid::BID),
            Some(&FieldValue::Real {
                mantissa: 3991 + i,
                exponent: -2,
            })
        );
        assert_eq!(
            update.fields.get(fid::BIDSIZE),
            Some(&FieldValue::UInt(10 + u64::try_from(i).expect("non-negative"))),
        );
    }
    let last = collector.0.last().expect("ten updates");
    let bid = last.fields.get(fid::BID).expect("bid present");
    assert!((bid.as_f64().expect("real") - 40.00).abs() < 1e-9);
}

#[test]
fn small_buffer_overflows_after_the_messages_that_fit() {
    // Payloads of 10 bytes frame to 12 with the u16 prefix: four frames use
    // 48 of the 50 bytes, the fifth cannot fit.
    let mut buf = PackedBuffer::bind(CLIENT, 50, LengthPrefix::u16_be()).expect("bind");
    let payload = [0x5a_u8; 10];

    let mut packed = 0usize;
    let mut failure = None;
    for _ in 0..10 {
        match buf.add_message(&payload, ITEM) {
            Ok(()) => packed += 1,
            Err(err) => {
                failure = Some(err);
                break;
            }
        }
    }

    assert_eq!(packed, 4);
    assert_eq!(buf.packed_msg_count(), 4);
    assert_eq!(buf.remaining_size(), 2);
    match failure.expect("fifth addition must fail") {
        PackError::BufferTooSmall {
            required,
            remaining,
        } => {
            assert_eq!(required, 12);
            assert_eq!(remaining, 2);
        }
        other => panic!("expected BufferTooSmall, got {other:?}"),
    }
}

#[test]
fn two_messages_fill_fifty_two_bytes_exactly() {
    let mut buf = PackedBuffer::bind(CLIENT, 52, LengthPrefix::u16_be()).expect("bind");
    buf.add_message(&[1_u8; 24], ITEM).expect("first half");
    buf.add_message(&[2_u8; 24], ITEM).expect("second half");
    assert_eq!(buf.remaining_size(), 0);
    assert_eq!(buf.packed_msg_count(), 2);

    let payloads = Unpacker::payloads(buf.as_bytes(), buf.prefix()).expect("unframe");
    assert_eq!(payloads, vec![[1_u8; 24].as_slice(), [2_u8; 24].as_slice()]);
}

#[test]
fn cleared_buffer_accounts_like_a_fresh_one() {
    let session = provider_session();
    let mut recycled = session.init_buffer(CLIENT, Some(512)).expect("buffer");
    for i in 0..3 {
        session
            .add_msg(&mut recycled, &market_update(i), ITEM)
            .expect("pack");
    }
    session.submit(&mut recycled).expect("submit clears");

    let mut fresh = session.init_buffer(CLIENT, Some(512)).expect("fresh buffer");
    for i in 0..3 {
        session
            .add_msg(&mut recycled, &market_update(i), ITEM)
            .expect("repack");
        session
            .add_msg(&mut fresh, &market_update(i), ITEM)
            .expect("pack fresh");
    }

    assert_eq!(recycled.packed_msg_count(), fresh.packed_msg_count());
    assert_eq!(recycled.remaining_size(), fresh.remaining_size());
    assert_eq!(recycled.as_bytes(), fresh.as_bytes());
}

#[test]
fn empty_packed_buffer_unframes_to_nothing() {
    let buf = PackedBuffer::bind(CLIENT, 128, LengthPrefix::u16_be()).expect("bind");
    let payloads = Unpacker::payloads(buf.as_bytes(), buf.prefix()).expect("empty is valid");
    assert!(payloads.is_empty());
}

#[test]
fn packed_payload_bytes_round_trip_exactly() {
    let messages: Vec<MarketMessage> = (0..4).map(market_update).collect();
    let mut buf = PackedBuffer::bind(CLIENT, 6000, LengthPrefix::u16_be()).expect("bind");
    let mut encoded = Vec::new();
    for message in &messages {
        let bytes = message.to_bytes().expect("encode");
        buf.add_message(&bytes, ITEM).expect("pack");
        encoded.push(bytes);
    }

    let recovered = Unpacker::payloads(buf.as_bytes(), buf.prefix()).expect("unframe");
    assert_eq!(recovered.len(), encoded.len());
    for (sent, received) in encoded.iter().zip(&recovered) {
        assert_eq!(sent.as_slice(), *received);
    }
}
