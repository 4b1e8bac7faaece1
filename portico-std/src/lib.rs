//! # portico-std
//!
//! Standard implementations for the Portico function-invocation host.
//!
//! This crate provides:
//! - **Built-in event shapes** ([`events`]): the wire formats Portico can
//!   recognize out of the box, with their shape predicates
//! - **Builder extensions** ([`builtin`]): registering built-in matchers in
//!   their fixed precedence order, or a selected subset
//! - **Testing utilities** ([`testing`]): a test host and decoded responses
//!   for exercising a dispatcher without an invocation loop

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core types
pub use portico_core;

// Modules
pub mod builtin;
pub mod events;
pub mod testing;
