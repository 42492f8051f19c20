//! # Messenger Core
//!
//! The message model shared by the bus and its transports.
//!
//! - [`Envelope`]: a message plus ordered [`Stamp`] metadata. Identity is the
//!   identity of the wrapped message allocation, not of the envelope.
//! - [`Serializer`]: the wire codec contract, with [`JsonSerializer`] as the
//!   reference implementation.
//! - [`MessageBus`]: the dispatch contract (handler lookup + invocation), with
//!   [`HandlerBus`] as the reference implementation.
//!
//! ## Example
//!
//! ```rust
//! use messenger_core::{Envelope, HandlerBus, Message, MessageBus, StampKind};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Ping {
//!     seq: u32,
//! }
//!
//! impl Message for Ping {
//!     const KIND: &'static str = "ping";
//! }
//!
//! let bus = HandlerBus::new().handle("ping_handler", |_: &Ping| Ok(()));
//! let handled = bus.dispatch(Envelope::new(Ping { seq: 1 })).unwrap();
//! assert!(handled.has_stamp(&StampKind::Handled));
//! ```

mod bus;
mod envelope;
mod error;
mod message;
mod serializer;
mod stamp;

pub use bus::{HandlerBus, MessageBus};
pub use envelope::Envelope;
pub use error::{HandlerFailure, SerializationError, SerializationResult};
pub use message::{AnyMessage, Message, MessageId};
pub use serializer::{JsonSerializer, Serializer};
pub use stamp::{Stamp, StampKind};
