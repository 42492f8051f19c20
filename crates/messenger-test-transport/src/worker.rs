//! Bounded consume loop driving the bus for an in-memory transport.

use crate::error::TransportResult;
use crate::transport::InMemoryTransport;
use messenger_core::{Envelope, MessageId, Stamp};
use tracing::{debug, warn};

/// Pulls queued envelopes and hands them to the bus until `limit` messages
/// have been handled.
///
/// Each pass re-reads the queue and claims an envelope before handling it, so
/// envelopes settled or claimed elsewhere in the meantime are skipped rather
/// than handled twice.
pub(crate) struct Worker<'a> {
    transport: &'a InMemoryTransport,
    limit: usize,
    handled: usize,
}

impl<'a> Worker<'a> {
    pub(crate) fn new(transport: &'a InMemoryTransport, limit: usize) -> Self {
        Self {
            transport,
            limit,
            handled: 0,
        }
    }

    /// Runs the loop, returning how many messages were handled.
    pub(crate) fn run(mut self) -> TransportResult<usize> {
        while self.handled < self.limit {
            let pending = self.transport.get();
            if pending.is_empty() {
                debug!(
                    transport = %self.transport.name(),
                    handled = self.handled,
                    limit = self.limit,
                    "Queue drained before limit"
                );
                break;
            }

            for envelope in pending {
                if self.handled == self.limit {
                    break;
                }
                let Some(_claim) = Claim::take(self.transport, envelope.message_id()) else {
                    continue;
                };
                self.handle(envelope)?;
            }
        }

        Ok(self.handled)
    }

    fn handle(&mut self, envelope: Envelope) -> TransportResult<()> {
        self.handled += 1;

        let envelope = envelope.with(Stamp::Received {
            transport: self.transport.name().to_string(),
        });

        match self.transport.bus().dispatch(envelope.clone()) {
            Ok(handled) => {
                self.transport.ack(handled);
                Ok(())
            }
            Err(failure) if !self.transport.is_catching_exceptions() => {
                warn!(
                    transport = %self.transport.name(),
                    kind = envelope.kind(),
                    error = %failure,
                    "Handling failed, leaving message queued"
                );
                Err(failure.into())
            }
            Err(failure) => {
                warn!(
                    transport = %self.transport.name(),
                    kind = envelope.kind(),
                    error = %failure,
                    "Handling failed, rejecting message"
                );

                self.transport.reject(envelope.with(Stamp::ErrorDetails {
                    message: failure.to_string(),
                }));
                Ok(())
            }
        }
    }
}

/// A claim on one queued message, released on drop.
///
/// Drop also runs while a panicking handler unwinds, so the message is
/// offered again instead of staying hidden until `reset`.
struct Claim<'a> {
    transport: &'a InMemoryTransport,
    id: MessageId,
}

impl<'a> Claim<'a> {
    fn take(transport: &'a InMemoryTransport, id: MessageId) -> Option<Self> {
        transport.claim(id).then_some(Self { transport, id })
    }
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        self.transport.release(self.id);
    }
}
