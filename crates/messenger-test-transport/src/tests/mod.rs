//! Scenario tests for the in-memory transport.
//!
//! - `harness.rs`       - Fixture messages, recording handlers, bus + codec wiring
//! - `queue.rs`         - Interception, identity-keyed queue, sent log
//! - `processing.rs`    - Bounded processing, ack, snapshot counts, re-entrancy
//! - `exceptions.rs`    - Reject on handler failure, throw_exceptions, panics
//! - `unblock.rs`       - Unblock and intercept toggling
//! - `reset.rs`         - Reset and snapshot isolation
//! - `shared_state.rs`  - Channel state shared through a ChannelStore
//! - `registry.rs`      - Named transport resolution
//! - `serialization.rs` - Codec round-trip on send
//! - `factory.rs`       - DSN-driven construction

mod processing;

use harness::{Foo, TestHarness};
use messenger_core::{Envelope, StampKind};

/// Basic workflow: intercept, inspect, process, inspect again.
#[test]
fn basic_workflow() {
    let harness = TestHarness::new();
    let transport = harness.transport("async");

    transport.send(Envelope::new(Foo { value: 1 })).unwrap();

    transport.queue().assert_count(1).assert_contains("foo", Some(1));
    transport.sent().assert_count(1);
    transport.acknowledged().assert_empty();
    assert_eq!(harness.foo.count(), 0);

    transport.process(Some(1)).unwrap();

    assert_eq!(harness.foo.messages(), vec![Foo { value: 1 }]);
    transport.queue().assert_empty();
    transport
        .acknowledged()
        .assert_contains("foo", Some(1))
        .first_any()
        .unwrap()
        .assert_has_stamp(&StampKind::Received)
        .assert_has_stamp(&StampKind::Handled);
    transport.rejected().assert_empty();
}
