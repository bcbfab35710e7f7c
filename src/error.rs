use std::io;

use crate::message::ArgType;

/// Errors surfaced by the receiver and the typed message accessors.
#[derive(Debug, thiserror::Error)]
pub enum OscError {
    /// The requested UDP port could not be bound. Retrying `setup` with a
    /// different port is the expected recovery.
    #[error("failed to bind UDP port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: io::Error,
    },

    /// An argument index past the end of a message's argument list.
    #[error("argument index {index} out of bounds (message has {len} arguments)")]
    OutOfBounds { index: usize, len: usize },

    /// A typed accessor was called on an argument of a different kind and
    /// coercion was not requested or not possible.
    #[error("argument type mismatch: requested {expected}, stored {actual}")]
    TypeMismatch { expected: ArgType, actual: ArgType },

    /// The wire decoder produced an argument kind outside the supported set.
    /// The packet carrying it is dropped; the listener keeps running.
    #[error("unsupported OSC argument type '{type_tag}'")]
    UnknownArgumentKind { type_tag: &'static str },

    #[error("failed to encode OSC packet: {0}")]
    Encode(#[from] rosc::OscError),

    #[error("failed to send OSC packet: {0}")]
    Send(io::Error),
}
