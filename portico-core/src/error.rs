//! Error types for Portico.
//!
//! Errors are split along the dispatcher's two-phase lifecycle:
//!
//! - [`ConfigError`] - Setup-time registration errors, fatal to host startup
//! - [`InvokeError`] - Per-invocation errors; abort one invocation, leave the
//!   dispatcher and its registries valid for the next

use thiserror::Error;

use crate::body::BodyError;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while configuring a dispatcher.
///
/// These can only occur during the builder phase, before the first
/// invocation is dispatched. A host that hits one should fail startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A handler is already registered for this event tag.
    #[error("a handler is already registered for event type `{0}`")]
    DuplicateHandler(String),

    /// A default handler has already been registered.
    #[error("a default handler has already been registered")]
    DuplicateDefault,

    /// A built-in matcher was requested by a tag that does not exist.
    #[error("no built-in event matcher exists for tag `{0}`")]
    UnknownBuiltin(String),
}

/// Errors raised while processing a single invocation.
///
/// Any of these aborts the remaining pipeline stages of the invocation it
/// occurred in and is reported to the invocation loop as that invocation's
/// failure. None of them poison the dispatcher; retry, if any, belongs to
/// the external loop.
#[derive(Error, Debug)]
pub enum InvokeError {
    /// The input payload is not a single valid JSON document.
    #[error("input payload is not valid JSON")]
    Parse(#[source] serde_json::Error),

    /// No shape predicate matched and no default handler is registered.
    #[error("no event matcher fired and no default handler is registered")]
    Unresolved,

    /// A shape predicate matched, but no handler is registered for its tag.
    ///
    /// Distinct from [`Unresolved`](Self::Unresolved): the shape was
    /// recognized, but nobody chose to handle it.
    #[error("no handler registered for resolved event type `{0}`")]
    Unhandled(String),

    /// The resolved shape failed to decode into its typed representation.
    #[error("failed to decode input as event type `{tag}`")]
    Decode {
        /// Tag of the event type the decode was attempted for.
        tag: String,
        /// The underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },

    /// The invoked handler itself failed; propagated verbatim.
    #[error("handler failed")]
    Handler(#[source] BoxError),

    /// Serialization of a structured result failed.
    #[error("failed to encode handler result")]
    Encode(#[source] serde_json::Error),

    /// The output stream could not be rewound for the caller.
    #[error("failed to finalize the output stream")]
    Finalize(#[source] std::io::Error),
}

impl From<BodyError> for InvokeError {
    fn from(err: BodyError) -> Self {
        match err {
            BodyError::Handler(e) => InvokeError::Handler(e),
            BodyError::Encode(e) => InvokeError::Encode(e),
        }
    }
}
