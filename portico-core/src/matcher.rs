//! Event matchers and shape resolution.
//!
//! Incoming payloads carry no discriminator field; the only way to tell a
//! bucket notification from a topic notification is to probe the document's
//! shape. A matcher pairs an event tag with such a probe. Matchers are kept
//! in registration order and evaluated front to back; the first predicate
//! that fires wins, and no attempt is made to detect ambiguous matches.
//! Precedence is the caller's to control.
//!
//! Probes are cheap structural checks (existence/kind of a few JSON paths),
//! not full deserialization: a mismatched shape is rejected without paying
//! decode cost. The typed decode runs later, only for the winning tag.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

/// A cheap structural test guessing the semantic type of a parsed document.
pub type ShapePredicate = Box<dyn Fn(&Value) -> bool + Send + Sync>;

/// An event tag paired with its shape predicate.
pub struct EventMatcher {
    tag: Box<str>,
    predicate: ShapePredicate,
}

impl EventMatcher {
    /// Create a matcher for the given tag.
    pub fn new(
        tag: impl Into<Box<str>>,
        predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            tag: tag.into(),
            predicate: Box::new(predicate),
        }
    }

    /// The event tag this matcher resolves to.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Run the shape predicate against a parsed document.
    pub fn probe(&self, document: &Value) -> bool {
        (self.predicate)(document)
    }
}

impl fmt::Debug for EventMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventMatcher").field("tag", &self.tag).finish_non_exhaustive()
    }
}

/// An ordered, append-only set of event matchers.
///
/// Append-only during the builder phase; immutable once the dispatcher is
/// built. Duplicate tags are permitted here; tag uniqueness is enforced at
/// handler registration, where it actually matters.
#[derive(Debug, Default)]
pub struct MatcherSet {
    matchers: Vec<EventMatcher>,
}

impl MatcherSet {
    /// Create an empty matcher set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a matcher. Registration order is preserved, never reordered
    /// or deduplicated.
    pub fn push(&mut self, matcher: EventMatcher) {
        self.matchers.push(matcher);
    }

    /// Number of registered matchers.
    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    /// Whether no matcher is registered.
    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// Resolve a parsed document to an event tag.
    ///
    /// Evaluates predicates in registration order and returns the first
    /// tag whose predicate fires, or `None` when nothing does.
    pub fn resolve(&self, document: &Value) -> Option<&str> {
        self.matchers
            .iter()
            .find(|m| m.probe(document))
            .map(EventMatcher::tag)
    }
}

/// A statically-declared event shape.
///
/// Joins the three facts the dispatcher needs about an event type: a stable
/// tag, a shape predicate, and how to decode it. Implementing this trait is
/// what makes `matcher_for::<E>()` and `handle::<E>(..)` line up on the
/// same tag without any runtime type-name lookups.
pub trait ShapedEvent: DeserializeOwned {
    /// Stable identifier joining this shape's matcher to its handler.
    const TAG: &'static str;

    /// The shape predicate for this event type.
    fn matches(document: &Value) -> bool;
}
