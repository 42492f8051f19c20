//! Bounded processing, acknowledgement and re-entrant sends.

use super::harness::{fixture_serializer, Foo, MessageC, Recorded, TestHarness};
use crate::error::TransportError;
use crate::options::TransportOptions;
use crate::transport::InMemoryTransport;
use messenger_core::{Envelope, HandlerBus, Stamp, StampKind};
use parking_lot::Mutex;
use std::sync::Arc;

#[test]
fn process_one_handles_only_the_head() {
    let harness = TestHarness::new();
    let transport = harness.transport("async");

    transport.send(Envelope::new(Foo { value: 1 })).unwrap();
    transport.send(Envelope::new(Foo { value: 2 })).unwrap();

    transport.process(Some(1)).unwrap();

    assert_eq!(harness.foo.messages(), vec![Foo { value: 1 }]);
    transport.acknowledged().assert_count(1);
    let remaining = transport.queue();
    remaining.assert_count(1);
    assert_eq!(remaining.messages_of::<Foo>(), vec![&Foo { value: 2 }]);
}

#[test]
fn process_all_drains_in_fifo_order() {
    let harness = TestHarness::new();
    let transport = harness.transport("async");

    transport.send(Envelope::new(Foo { value: 1 })).unwrap();
    transport.send(Envelope::new(MessageC { id: 2 })).unwrap();
    transport.send(Envelope::new(Foo { value: 3 })).unwrap();

    transport.process_all().unwrap();

    transport.queue().assert_empty();
    let kinds: Vec<_> = transport
        .acknowledged()
        .iter()
        .map(|envelope| envelope.kind())
        .collect();
    assert_eq!(kinds, vec!["foo", "message_c", "foo"]);
    assert_eq!(harness.foo.messages(), vec![Foo { value: 1 }, Foo { value: 3 }]);
    assert_eq!(harness.message_c.count(), 1);
}

#[test]
fn requesting_more_than_queued_fails_without_side_effects() {
    let harness = TestHarness::new();
    let transport = harness.transport("async");

    transport.send(Envelope::new(Foo { value: 1 })).unwrap();
    transport.send(Envelope::new(Foo { value: 2 })).unwrap();

    let err = transport.process(Some(3)).unwrap_err();

    assert!(matches!(
        err,
        TransportError::Precondition {
            requested: 3,
            queued: 2
        }
    ));
    assert_eq!(
        err.to_string(),
        "Tried to process 3 queued messages but only 2 are in the queue."
    );
    transport.queue().assert_count(2);
    transport.acknowledged().assert_empty();
    assert_eq!(harness.foo.count(), 0);
}

#[test]
fn requesting_from_an_empty_queue_fails() {
    let harness = TestHarness::new();
    let transport = harness.transport("async");

    let err = transport.process(Some(1)).unwrap_err();

    assert!(matches!(
        err,
        TransportError::Precondition {
            requested: 1,
            queued: 0
        }
    ));
}

#[test]
fn processing_nothing_is_a_no_op() {
    let harness = TestHarness::new();
    let transport = harness.transport("async");

    transport.process(None).unwrap();
    transport.process(Some(0)).unwrap();

    transport.send(Envelope::new(Foo { value: 1 })).unwrap();
    transport.process(Some(0)).unwrap();

    transport.queue().assert_count(1);
    transport.acknowledged().assert_empty();
}

#[test]
fn acknowledged_envelopes_carry_receive_and_handled_stamps() {
    let harness = TestHarness::new();
    let transport = harness.transport("orders");

    transport
        .send(Envelope::new(Foo { value: 1 }).with(Stamp::Delay { millis: 250 }))
        .unwrap();
    transport.process(None).unwrap();

    let acked = transport.acknowledged().first_of_kind("foo").unwrap();
    acked
        .assert_has_stamp(&StampKind::Delay)
        .assert_has_stamp(&StampKind::Received)
        .assert_has_stamp(&StampKind::Handled)
        .assert_not_has_stamp(&StampKind::ErrorDetails);

    assert!(acked.stamps().contains(&Stamp::Received {
        transport: "orders".to_string()
    }));
    assert!(acked.stamps().contains(&Stamp::Handled {
        handler: "foo_handler".to_string()
    }));
}

#[test]
fn sent_log_keeps_the_envelope_as_sent() {
    let harness = TestHarness::new();
    let transport = harness.transport("async");

    transport.send(Envelope::new(Foo { value: 1 })).unwrap();
    transport.process(None).unwrap();

    transport
        .sent()
        .first_any()
        .unwrap()
        .assert_not_has_stamp(&StampKind::Received)
        .assert_not_has_stamp(&StampKind::Handled);
}

/// A transport whose `MessageC` handler sends `Foo { value: id }` back to
/// the same transport.
fn relaying_transport() -> (InMemoryTransport, Recorded<Foo>) {
    let slot: Arc<Mutex<Option<InMemoryTransport>>> = Arc::new(Mutex::new(None));
    let foo = Recorded::<Foo>::new();

    let relay_slot = slot.clone();
    let bus = HandlerBus::new()
        .handle::<Foo, _>("foo_handler", foo.handler())
        .handle("relay", move |message: &MessageC| {
            let transport = relay_slot.lock().clone();
            if let Some(transport) = transport {
                transport.send(Envelope::new(Foo { value: message.id }))?;
            }
            Ok(())
        });

    let transport = InMemoryTransport::new(
        "async",
        Arc::new(bus),
        Arc::new(fixture_serializer()),
        TransportOptions::default(),
    );
    *slot.lock() = Some(transport.clone());

    (transport, foo)
}

#[test]
fn messages_sent_by_handlers_wait_for_the_next_call() {
    let (transport, foo) = relaying_transport();

    transport.send(Envelope::new(MessageC { id: 1 })).unwrap();
    transport.send(Envelope::new(MessageC { id: 2 })).unwrap();

    transport.process(None).unwrap();

    transport.acknowledged().assert_count(2).assert_not_contains("foo");
    transport.queue().assert_count(2).assert_contains("foo", Some(2));
    assert_eq!(foo.count(), 0);

    transport.process(None).unwrap();

    transport.queue().assert_empty();
    transport.acknowledged().assert_contains("foo", Some(2));
    assert_eq!(foo.messages(), vec![Foo { value: 1 }, Foo { value: 2 }]);
}

#[test]
fn unblocked_handler_sends_are_handled_inline() {
    let (transport, foo) = relaying_transport();
    transport.unblock().unwrap();

    transport.send(Envelope::new(MessageC { id: 9 })).unwrap();

    transport.queue().assert_empty();
    transport
        .acknowledged()
        .assert_contains("message_c", Some(1))
        .assert_contains("foo", Some(1));
    assert_eq!(foo.messages(), vec![Foo { value: 9 }]);
}

#[test]
fn nested_precondition_counts_messages_being_handled() {
    let slot: Arc<Mutex<Option<InMemoryTransport>>> = Arc::new(Mutex::new(None));
    let refusal: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));

    let relay_slot = slot.clone();
    let relay_refusal = refusal.clone();
    let bus = HandlerBus::new().handle("relay", move |message: &MessageC| {
        let transport = relay_slot.lock().clone();
        if let Some(transport) = transport {
            transport.send(Envelope::new(Foo { value: message.id }))?;
            if let Err(err) = transport.process(Some(3)) {
                *relay_refusal.lock() = Some(err.to_string());
            }
        }
        Ok(())
    });

    let transport = InMemoryTransport::new(
        "async",
        Arc::new(bus),
        Arc::new(fixture_serializer()),
        TransportOptions::default(),
    );
    *slot.lock() = Some(transport.clone());

    transport.send(Envelope::new(MessageC { id: 1 })).unwrap();
    transport.process(None).unwrap();

    assert_eq!(
        refusal.lock().as_deref(),
        Some("Tried to process 3 queued messages but only 2 are in the queue.")
    );
    transport.acknowledged().assert_contains("message_c", Some(1));
    transport.queue().assert_count(1).assert_contains("foo", Some(1));
}
