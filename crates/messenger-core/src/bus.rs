//! Dispatch contract and the handler-map reference bus.

use crate::envelope::Envelope;
use crate::error::HandlerFailure;
use crate::message::{AnyMessage, Message};
use crate::stamp::{Stamp, StampKind};
use std::collections::HashMap;
use tracing::{debug, warn};

/// The message-processing pipeline a transport drives when it consumes.
///
/// Returns the envelope as handled (with whatever stamps the pipeline
/// added), or the failure that the transport should turn into a reject.
pub trait MessageBus: Send + Sync {
    fn dispatch(&self, envelope: Envelope) -> Result<Envelope, HandlerFailure>;
}

type BoxedHandler = Box<dyn Fn(&dyn AnyMessage) -> anyhow::Result<()> + Send + Sync>;

struct HandlerEntry {
    name: String,
    handler: BoxedHandler,
}

/// Bus that routes each message kind to its registered handlers.
///
/// Handlers run in registration order. A handler already recorded in a
/// `Handled` stamp is skipped, so redelivered envelopes only re-run the
/// handlers that have not succeeded yet.
#[derive(Default)]
pub struct HandlerBus {
    handlers: HashMap<&'static str, Vec<HandlerEntry>>,
    allow_no_handlers: bool,
}

impl HandlerBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for messages of type `M`.
    pub fn handle<M, F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        M: Message,
        F: Fn(&M) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let wrapped: BoxedHandler = Box::new(move |message: &dyn AnyMessage| {
            match message.downcast_ref::<M>() {
                Some(message) => handler(message),
                None => Err(anyhow::anyhow!(
                    "handler for \"{}\" received \"{}\"",
                    M::KIND,
                    message.kind()
                )),
            }
        });

        self.handlers.entry(M::KIND).or_default().push(HandlerEntry {
            name: name.into(),
            handler: wrapped,
        });
        self
    }

    /// Treat kinds without handlers as handled instead of failing.
    pub fn allow_no_handlers(mut self) -> Self {
        self.allow_no_handlers = true;
        self
    }

    pub fn handler_count(&self, kind: &str) -> usize {
        self.handlers.get(kind).map_or(0, Vec::len)
    }
}

impl MessageBus for HandlerBus {
    fn dispatch(&self, envelope: Envelope) -> Result<Envelope, HandlerFailure> {
        let kind = envelope.kind();

        let entries = match self.handlers.get(kind) {
            Some(entries) if !entries.is_empty() => entries,
            _ if self.allow_no_handlers => return Ok(envelope),
            _ => {
                warn!(kind, "No handler for message");
                return Err(HandlerFailure::NoHandler {
                    kind: kind.to_string(),
                });
            }
        };

        let mut envelope = envelope;
        for entry in entries {
            let already_handled = envelope.all(&StampKind::Handled).iter().any(|stamp| {
                matches!(stamp, Stamp::Handled { handler } if handler == &entry.name)
            });
            if already_handled {
                debug!(kind, handler = %entry.name, "Skipping handler already recorded");
                continue;
            }

            (entry.handler)(envelope.message()).map_err(|source| HandlerFailure::Failed {
                kind: kind.to_string(),
                handler: entry.name.clone(),
                source: source.into(),
            })?;

            debug!(kind, handler = %entry.name, "Message handled");
            envelope = envelope.with(Stamp::Handled {
                handler: entry.name.clone(),
            });
        }

        Ok(envelope)
    }
}
