//! # portico - Event-Shape Dispatch for Function Hosts
//!
//! `portico` routes the raw JSON payloads a function-invocation loop
//! delivers: it guesses each payload's event type by probing its shape (the
//! wire format carries no discriminator), decodes it, runs exactly one
//! registered handler inside a fresh per-invocation scope, and turns the
//! handler's return value into the byte stream the loop hands back.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use portico::prelude::*;
//! use portico::events::BucketNotification;
//!
//! let mut builder = Dispatcher::builder();
//! builder
//!     .builtin_matchers()
//!     .handle::<BucketNotification, _>(|_inv: Invocation, ev: BucketNotification| async move {
//!         Json(Receipt { records: ev.records.len() })
//!     })?
//!     .default_handler(|_inv: Invocation, doc: Value| async move {
//!         tracing::info!(?doc, "unrecognized event");
//!     })?;
//! let dispatcher = builder.build();
//!
//! // Per invocation, driven by the external loop:
//! let response = dispatcher.invoke(request).await?;
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use portico_core::{
    // Result bodies
    Body,
    BodyError,
    // Error types
    BoxError,
    ConfigError,
    // Dispatch
    Dispatcher,
    DispatcherBuilder,
    DynHandler,
    // Matching
    EventMatcher,
    // Handler
    Handler,
    IntoBody,
    // Per-invocation state
    Invocation,
    InvocationContext,
    InvocationMeta,
    InvocationRequest,
    InvocationResponse,
    InvocationStream,
    InvokeError,
    Json,
    MatcherSet,
    OutputStream,
    Scope,
    ShapePredicate,
    ShapedEvent,
};

pub use portico_std::builtin::BuiltinEvents;

/// Built-in event shapes.
pub mod events {
    #![allow(clippy::wildcard_imports)]
    pub use portico_std::events::*;
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use portico_std::testing::*;
}

/// Prelude module - common imports for Portico.
///
/// # Usage
///
/// ```rust,ignore
/// use portico::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Body,
        BoxError,
        BuiltinEvents,
        ConfigError,
        // Core dispatch surface
        Dispatcher,
        Handler,
        IntoBody,
        Invocation,
        InvocationMeta,
        InvocationRequest,
        InvokeError,
        Json,
        ShapedEvent,
    };
}
