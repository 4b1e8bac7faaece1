//! Built-in event shapes.
//!
//! Each shape pairs its wire format (serde types mirroring the real
//! payload casing) with a [`ShapedEvent`](portico_core::ShapedEvent)
//! implementation: a stable tag plus the structural probe that recognizes
//! the shape without decoding it.
//!
//! When registered through [`builtin`](crate::builtin), the probes run in
//! a fixed precedence order; see that module for why the order matters.

mod bucket;
mod logs;
mod mail;
mod topic;

pub use bucket::{BucketEntity, BucketNotification, BucketRecord, ObjectEntity, StorageEntity};
pub use logs::{LogExport, LogPayload};
pub use mail::{MailMessage, MailNotification, MailReceipt, MailRecord};
pub use topic::{TopicMessage, TopicNotification, TopicRecord};
