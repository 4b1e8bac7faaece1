//! # portico-core
//!
//! Core types for Portico, an event-shape dispatch core for a
//! function-invocation host.
//!
//! A function host receives raw, schema-less JSON payloads from an external
//! invocation loop. The payload carries no discriminator field, so the type
//! of each event has to be inferred from its shape. This crate implements
//! that pipeline:
//!
//! 1. **Resolve**: parse the payload and probe it against an ordered set
//!    of shape predicates ([`MatcherSet`]); the first hit names the event
//!    tag, or the input falls through to the default handler.
//! 2. **Dispatch**: look the tag up in the handler registry; exactly one
//!    handler runs per invocation, inside a fresh per-invocation [`Scope`].
//! 3. **Encode**: coerce the handler's return value into a closed result
//!    union ([`Body`]) and encode it into an output byte stream plus an
//!    ownership flag.
//!
//! Configuration is two-phase: a mutable [`DispatcherBuilder`] collects
//! matchers and handlers, then [`build`](DispatcherBuilder::build) freezes
//! them into an immutable [`Dispatcher`]. Registries are never mutated
//! after the freeze, so dispatch requires no locking.
//!
//! Built-in event shapes, builder extensions and testing utilities live in
//! `portico-std`; this crate is kept lean so extensions can depend on it
//! directly.
//!
//! # Error Types
//!
//! - [`ConfigError`] - Setup-time registration errors
//! - [`InvokeError`] - Per-invocation pipeline errors

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod body;
mod context;
mod dispatcher;
mod error;
mod handler;
mod matcher;
mod scope;

// Re-exports
pub use body::{Body, BodyError, IntoBody, InvocationStream, Json, OutputStream};
pub use context::{InvocationContext, InvocationRequest, InvocationResponse};
pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use error::{BoxError, ConfigError, InvokeError};
pub use handler::{DynHandler, Handler};
pub use matcher::{EventMatcher, MatcherSet, ShapePredicate, ShapedEvent};
pub use scope::{Invocation, InvocationMeta, Scope};
