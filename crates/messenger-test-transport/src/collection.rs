//! Assertion-oriented snapshot of envelopes.
//!
//! A collection is captured when a transport is queried; later sends, acks
//! or resets do not change a collection that was already returned.

use crate::error::{TransportError, TransportResult};
use crate::test_envelope::TestEnvelope;
use messenger_core::{AnyMessage, Envelope, Message};
use std::sync::Arc;

const NO_ENVELOPES_FOUND: &str = "No envelopes found.";

/// An ordered, immutable set of envelopes.
#[derive(Debug, Clone, Default)]
pub struct EnvelopeCollection {
    envelopes: Vec<Envelope>,
}

impl EnvelopeCollection {
    pub fn new(envelopes: Vec<Envelope>) -> Self {
        Self { envelopes }
    }

    #[track_caller]
    pub fn assert_empty(&self) -> &Self {
        self.assert_count(0)
    }

    #[track_caller]
    pub fn assert_not_empty(&self) -> &Self {
        assert!(
            !self.envelopes.is_empty(),
            "Expected some messages but found none."
        );
        self
    }

    #[track_caller]
    pub fn assert_count(&self, count: usize) -> &Self {
        assert!(
            self.envelopes.len() == count,
            "Expected {} messages, but {} messages found.",
            count,
            self.envelopes.len()
        );
        self
    }

    /// Asserts at least one message of `kind` is present, exactly `times`
    /// when given.
    #[track_caller]
    pub fn assert_contains(&self, kind: &str, times: Option<usize>) -> &Self {
        let found = self.count_kind(kind);

        assert!(found > 0, "Message \"{kind}\" not found.");

        if let Some(times) = times {
            assert!(
                found == times,
                "Expected to find message \"{kind}\" {times} times but found {found} times."
            );
        }
        self
    }

    #[track_caller]
    pub fn assert_not_contains(&self, kind: &str) -> &Self {
        assert!(
            self.count_kind(kind) == 0,
            "Found message \"{kind}\" but should not."
        );
        self
    }

    /// The unwrapped messages, optionally only those of `kind`.
    pub fn messages(&self, kind: Option<&str>) -> Vec<Arc<dyn AnyMessage>> {
        self.envelopes
            .iter()
            .filter(|envelope| kind.map_or(true, |kind| envelope.kind() == kind))
            .map(|envelope| envelope.shared_message().clone())
            .collect()
    }

    /// The messages of type `M`, in order.
    pub fn messages_of<M: Message>(&self) -> Vec<&M> {
        self.envelopes
            .iter()
            .filter_map(|envelope| envelope.message_as::<M>())
            .collect()
    }

    /// The first envelope matching `predicate`.
    pub fn first<F>(&self, predicate: F) -> TransportResult<TestEnvelope>
    where
        F: Fn(&Envelope) -> bool,
    {
        self.envelopes
            .iter()
            .find(|envelope| predicate(*envelope))
            .cloned()
            .map(TestEnvelope::new)
            .ok_or_else(|| TransportError::NotFound(NO_ENVELOPES_FOUND.to_string()))
    }

    /// The first envelope of any kind.
    pub fn first_any(&self) -> TransportResult<TestEnvelope> {
        self.first(|_| true)
    }

    pub fn first_of_kind(&self, kind: &str) -> TransportResult<TestEnvelope> {
        self.first(|envelope| envelope.kind() == kind)
    }

    /// The first envelope carrying an `M` that satisfies `predicate`.
    ///
    /// Envelopes of other types are skipped without calling `predicate`.
    pub fn first_of<M, F>(&self, predicate: F) -> TransportResult<TestEnvelope>
    where
        M: Message,
        F: Fn(&M) -> bool,
    {
        self.first(|envelope| envelope.message_as::<M>().is_some_and(&predicate))
    }

    pub fn all(&self) -> Vec<TestEnvelope> {
        self.iter().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = TestEnvelope> + '_ {
        self.envelopes.iter().cloned().map(TestEnvelope::new)
    }

    pub fn len(&self) -> usize {
        self.envelopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.envelopes.is_empty()
    }

    /// The raw envelopes.
    pub fn envelopes(&self) -> &[Envelope] {
        &self.envelopes
    }

    fn count_kind(&self, kind: &str) -> usize {
        self.envelopes
            .iter()
            .filter(|envelope| envelope.kind() == kind)
            .count()
    }
}

impl IntoIterator for EnvelopeCollection {
    type Item = TestEnvelope;
    type IntoIter = std::iter::Map<std::vec::IntoIter<Envelope>, fn(Envelope) -> TestEnvelope>;

    fn into_iter(self) -> Self::IntoIter {
        self.envelopes
            .into_iter()
            .map(TestEnvelope::new as fn(Envelope) -> TestEnvelope)
    }
}

impl<'a> IntoIterator for &'a EnvelopeCollection {
    type Item = TestEnvelope;
    type IntoIter = std::iter::Map<std::slice::Iter<'a, Envelope>, fn(&Envelope) -> TestEnvelope>;

    fn into_iter(self) -> Self::IntoIter {
        self.envelopes.iter().map(view as fn(&Envelope) -> TestEnvelope)
    }
}

fn view(envelope: &Envelope) -> TestEnvelope {
    TestEnvelope::new(envelope.clone())
}

impl FromIterator<Envelope> for EnvelopeCollection {
    fn from_iter<I: IntoIterator<Item = Envelope>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
