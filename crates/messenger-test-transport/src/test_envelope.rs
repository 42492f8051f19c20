//! Assertion view over a single envelope.

use messenger_core::{AnyMessage, Envelope, Message, Stamp, StampKind};

/// A single envelope as seen by a test.
#[derive(Debug, Clone)]
pub struct TestEnvelope {
    envelope: Envelope,
}

impl TestEnvelope {
    pub fn new(envelope: Envelope) -> Self {
        Self { envelope }
    }

    /// The wrapped envelope.
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn into_envelope(self) -> Envelope {
        self.envelope
    }

    pub fn message(&self) -> &dyn AnyMessage {
        self.envelope.message()
    }

    pub fn message_as<M: Message>(&self) -> Option<&M> {
        self.envelope.message_as::<M>()
    }

    pub fn kind(&self) -> &'static str {
        self.envelope.kind()
    }

    pub fn stamps(&self) -> &[Stamp] {
        self.envelope.stamps()
    }

    #[track_caller]
    pub fn assert_has_stamp(&self, kind: &StampKind) -> &Self {
        assert!(
            self.envelope.has_stamp(kind),
            "Expected envelope for \"{}\" to have a \"{}\" stamp but it has none.",
            self.envelope.kind(),
            kind
        );
        self
    }

    #[track_caller]
    pub fn assert_not_has_stamp(&self, kind: &StampKind) -> &Self {
        let found = self.envelope.all(kind).len();
        assert!(
            found == 0,
            "Expected envelope for \"{}\" to have no \"{}\" stamp but found {}.",
            self.envelope.kind(),
            kind,
            found
        );
        self
    }
}

impl From<Envelope> for TestEnvelope {
    fn from(envelope: Envelope) -> Self {
        Self::new(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Foo {
        value: u32,
    }

    impl Message for Foo {
        const KIND: &'static str = "foo";
    }

    fn delayed() -> TestEnvelope {
        TestEnvelope::new(Envelope::new(Foo { value: 1 }).with(Stamp::Delay { millis: 50 }))
    }

    #[test]
    fn stamp_assertions_chain() {
        delayed()
            .assert_has_stamp(&StampKind::Delay)
            .assert_not_has_stamp(&StampKind::Handled);
    }

    #[test]
    #[should_panic(expected = "to have a \"handled\" stamp but it has none")]
    fn missing_stamp_fails() {
        delayed().assert_has_stamp(&StampKind::Handled);
    }

    #[test]
    #[should_panic(expected = "to have no \"delay\" stamp but found 1")]
    fn unexpected_stamp_fails() {
        delayed().assert_not_has_stamp(&StampKind::Delay);
    }

    #[test]
    fn accessors_expose_the_envelope() {
        let view = delayed();

        assert_eq!(view.kind(), "foo");
        assert_eq!(view.message_as::<Foo>(), Some(&Foo { value: 1 }));
        assert_eq!(view.stamps().len(), 1);
        assert_eq!(
            view.envelope().message_id(),
            view.clone().into_envelope().message_id()
        );
    }
}
