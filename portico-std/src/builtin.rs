//! Built-in matcher registration.
//!
//! The built-in shapes carry a fixed precedence order: bucket-notification
//! is probed before topic-notification because both share the `Records[]`
//! envelope, and only the probe order keeps resolution of that envelope
//! deterministic. Registering all built-ins preserves this order;
//! registering a subset preserves the caller's order instead.

use portico_core::{ConfigError, DispatcherBuilder, ShapedEvent};
use serde_json::Value;

use crate::events::{BucketNotification, LogExport, MailNotification, TopicNotification};

/// The built-in shapes in their fixed precedence order.
static BUILTIN_MATCHERS: &[(&str, fn(&Value) -> bool)] = &[
    (BucketNotification::TAG, BucketNotification::matches),
    (TopicNotification::TAG, TopicNotification::matches),
    (LogExport::TAG, LogExport::matches),
    // Indistinguishable on the wire; the probe never fires.
    (MailNotification::TAG, MailNotification::matches),
];

/// Builder extension registering the built-in event matchers.
pub trait BuiltinEvents {
    /// Register every built-in matcher, in the fixed precedence order.
    fn builtin_matchers(&mut self) -> &mut Self;

    /// Register a subset of the built-in matchers, in the order given.
    ///
    /// An unrecognized tag fails with [`ConfigError::UnknownBuiltin`] and
    /// registers nothing beyond the tags already processed.
    fn select_builtin_matchers(&mut self, tags: &[&str]) -> Result<&mut Self, ConfigError>;
}

impl BuiltinEvents for DispatcherBuilder {
    fn builtin_matchers(&mut self) -> &mut Self {
        for (tag, predicate) in BUILTIN_MATCHERS {
            self.matcher(*tag, *predicate);
        }
        self
    }

    fn select_builtin_matchers(&mut self, tags: &[&str]) -> Result<&mut Self, ConfigError> {
        for requested in tags {
            let Some((tag, predicate)) =
                BUILTIN_MATCHERS.iter().find(|(tag, _)| tag == requested)
            else {
                return Err(ConfigError::UnknownBuiltin((*requested).to_string()));
            };
            self.matcher(*tag, *predicate);
        }
        Ok(self)
    }
}
