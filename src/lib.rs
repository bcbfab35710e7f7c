//! Open Sound Control receiver over UDP.
//!
//! A [`Listener`] runs one background receive thread that decodes incoming
//! datagrams (via `rosc`) into [`Message`]s. Applications consume them
//! either by polling ([`Listener::get_next_message`]) or by registering a
//! callback; each message goes to exactly one of the two. A thin
//! synchronous send path ([`sender`]) covers the opposite direction.

pub mod bundle;
pub mod callbacks;
pub mod config;
pub mod error;
pub mod listener;
pub mod message;
pub mod queue;
pub mod sender;
pub mod transport;

pub use bundle::Bundle;
pub use callbacks::CallbackHandle;
pub use config::Config;
pub use error::OscError;
pub use listener::Listener;
pub use message::{ArgType, Argument, Message};
pub use sender::{send_bundle, send_message};
