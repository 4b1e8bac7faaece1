#![allow(dead_code)]

use serde_json::{Value, json};
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::sync::{Arc, Mutex};

// ============================================================================
// Wire Payload Fixtures
// ============================================================================

pub fn bucket_payload() -> Value {
    json!({
        "Records": [{
            "eventSource": "aws:s3",
            "eventName": "ObjectCreated:Put",
            "s3": {
                "bucket": {"name": "b"},
                "object": {"key": "k"}
            }
        }]
    })
}

pub fn topic_payload() -> Value {
    json!({
        "Records": [{
            "EventSource": "aws:sns",
            "Sns": {
                "MessageId": "m-1",
                "Subject": "greeting",
                "Message": "hello"
            }
        }]
    })
}

pub fn logs_payload() -> Value {
    json!({"awslogs": {"data": "H4sIAAAAAAAA"}})
}

pub fn mail_payload() -> Value {
    json!({
        "Records": [{
            "eventSource": "aws:ses",
            "ses": {"mail": {"messageId": "m-9", "source": "a@example.com"}}
        }]
    })
}

pub fn to_bytes(value: &Value) -> Vec<u8> {
    serde_json::to_vec(value).unwrap()
}

// ============================================================================
// Shared Stream
// ============================================================================

/// A stream handle whose underlying buffer outlives any one handle.
///
/// Handlers can hand a clone to the dispatcher while the test keeps its
/// own; dropping the response's handle must leave the buffer intact.
#[derive(Clone)]
pub struct SharedStream {
    inner: Arc<Mutex<Cursor<Vec<u8>>>>,
}

impl SharedStream {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Cursor::new(bytes))),
        }
    }

    /// Number of live handles to the underlying buffer.
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Read the whole buffer from the start, through this handle.
    pub fn snapshot(&self) -> Vec<u8> {
        let cursor = self.inner.lock().unwrap();
        cursor.get_ref().clone()
    }
}

impl Read for SharedStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.lock().unwrap().read(buf)
    }
}

impl Seek for SharedStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.lock().unwrap().seek(pos)
    }
}
