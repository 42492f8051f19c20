//! # Messenger Test Transport
//!
//! An in-memory transport for tests of message-driven code. Sent messages
//! are intercepted and queued instead of reaching a broker; the test decides
//! when they are processed and then asserts on what was sent, queued,
//! acknowledged or rejected.
//!
//! ## Guarantees
//!
//! 1. **Synchronous**: `process` runs handlers on the calling thread and
//!    returns when they are done
//! 2. **Identity-keyed queue**: re-sending the same message replaces its
//!    queue slot; the `sent` log still records both sends
//! 3. **Exactly-once settlement**: a queued message leaves the queue once,
//!    into either `acknowledged` or `rejected`
//! 4. **Wire-safe**: every send round-trips through the codec first
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use messenger_core::{Envelope, HandlerBus, JsonSerializer, Message};
//! use messenger_test_transport::{InMemoryTransport, TransportOptions};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct SendWelcomeEmail {
//!     user_id: u64,
//! }
//!
//! impl Message for SendWelcomeEmail {
//!     const KIND: &'static str = "send_welcome_email";
//! }
//!
//! let bus = Arc::new(HandlerBus::new().handle("mailer", |_: &SendWelcomeEmail| Ok(())));
//! let serializer = Arc::new(JsonSerializer::new().register::<SendWelcomeEmail>());
//! let transport = InMemoryTransport::new("async", bus, serializer, TransportOptions::default());
//!
//! transport.send(Envelope::new(SendWelcomeEmail { user_id: 7 })).unwrap();
//! transport.queue().assert_count(1);
//!
//! transport.process(None).unwrap();
//! transport.queue().assert_empty();
//! transport.acknowledged().assert_contains("send_welcome_email", Some(1));
//! ```
//!
//! ## Crate Structure
//!
//! - [`transport`] - The in-memory transport and the `Transport` seam
//! - [`store`] - Channel state and the shared-by-name store
//! - [`registry`] - Named transport lookup
//! - [`collection`] / [`test_envelope`] - Assertion views
//! - [`options`] / [`factory`] - Configuration and DSN-based construction
//! - [`logging`] - Test log capture

pub mod collection;
mod error;
pub mod factory;
pub mod logging;
pub mod options;
pub mod registry;
pub mod store;
pub mod test_envelope;
pub mod transport;
mod worker;

#[cfg(test)]
mod tests;

pub use collection::EnvelopeCollection;
pub use error::{TransportError, TransportResult};
pub use factory::TransportFactory;
pub use options::{TransportOptions, TEST_SCHEME};
pub use registry::TransportRegistry;
pub use store::{ChannelState, ChannelStore, SharedChannel};
pub use test_envelope::TestEnvelope;
pub use transport::{InMemoryTransport, Transport};
