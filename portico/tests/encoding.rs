//! Result coercion, encoding and stream ownership.

use portico::prelude::*;
use portico::testing::TestHost;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::io::Read;

mod common;
use common::{SharedStream, to_bytes};

/// Host routing every input to the given handler.
fn host_with<H>(handler: H) -> TestHost
where
    H: Handler<Value>,
{
    let mut builder = Dispatcher::builder();
    builder
        .matcher("any", |_doc: &Value| true)
        .handle_tag::<Value, _>("any", handler)
        .unwrap();
    TestHost::new(builder.build())
}

#[tokio::test]
async fn string_output_is_utf8_without_json_quoting() {
    let host = host_with(|_inv: Invocation, _doc: Value| async { "text/plain" });

    let response = host.invoke_raw(b"{}".to_vec()).await.unwrap();
    assert_eq!(response.bytes(), b"text/plain");
    assert_eq!(response.bytes().len(), 10);
    assert!(response.owned());
}

#[tokio::test]
async fn structured_output_serializes_with_null_omission() {
    #[derive(Serialize)]
    struct Tally {
        count: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    }

    let host = host_with(|_inv: Invocation, _doc: Value| async {
        Json(Tally {
            count: 3,
            label: None,
        })
    });

    let response = host.invoke_raw(b"{}".to_vec()).await.unwrap();
    assert_eq!(response.text(), r#"{"count":3}"#);
}

#[tokio::test]
async fn structured_round_trip_preserves_the_value() {
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Inventory {
        bucket: String,
        keys: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cursor: Option<String>,
    }

    let original = Inventory {
        bucket: "b".to_string(),
        keys: vec!["k1".to_string(), "k2".to_string()],
        cursor: None,
    };
    let returned = original.clone();
    let host = host_with(move |_inv: Invocation, _doc: Value| {
        let value = returned.clone();
        async move { Json(value) }
    });

    let response = host.invoke_raw(b"{}".to_vec()).await.unwrap();
    assert_eq!(response.json::<Inventory>(), original);
}

#[tokio::test]
async fn unit_output_encodes_to_a_zero_length_stream() {
    let host = host_with(|_inv: Invocation, _doc: Value| async {});

    let response = host.invoke_raw(b"{}".to_vec()).await.unwrap();
    assert!(response.is_empty());
    assert!(response.owned());
}

#[tokio::test]
async fn byte_buffer_output_passes_through_verbatim() {
    let host = host_with(|_inv: Invocation, _doc: Value| async { vec![0xDEu8, 0xAD, 0xBE, 0xEF] });

    let response = host.invoke_raw(b"{}".to_vec()).await.unwrap();
    assert_eq!(response.bytes(), &[0xDE, 0xAD, 0xBE, 0xEF][..]);
    assert!(response.owned());
}

#[tokio::test]
async fn json_value_output_is_structured() {
    let host = host_with(|_inv: Invocation, _doc: Value| async { json!({"ok": true}) });

    let response = host.invoke_raw(b"{}".to_vec()).await.unwrap();
    assert_eq!(response.text(), r#"{"ok":true}"#);
}

#[tokio::test]
async fn unowned_stream_is_never_disposed_by_the_core() {
    let supplier = SharedStream::new(b"streamed".to_vec());
    let handler_stream = supplier.clone();
    let mut builder = Dispatcher::builder();
    builder
        .matcher("any", |_doc: &Value| true)
        .handle_tag::<Value, _>("any", move |_inv: Invocation, _doc: Value| {
            let stream = handler_stream.clone();
            async move { (stream, false) }
        })
        .unwrap();
    let dispatcher = builder.build();

    let mut response = dispatcher
        .invoke(InvocationRequest::new(
            b"{}".to_vec(),
            InvocationMeta::new("own-1"),
        ))
        .await
        .unwrap();

    // The flag is propagated verbatim and the output reads once, rewound.
    assert!(!response.owned());
    let mut read = Vec::new();
    response.read_to_end(&mut read).unwrap();
    assert_eq!(read, b"streamed");

    // Fully read and released by the consumer; the supplier's buffer is
    // still intact and still ours.
    drop(response);
    assert_eq!(supplier.snapshot(), b"streamed");
    assert_eq!(supplier.handle_count(), 2); // test copy + handler's captured copy
}

#[tokio::test]
async fn owned_stream_flag_is_propagated_too() {
    let host = host_with(|_inv: Invocation, _doc: Value| async {
        (std::io::Cursor::new(b"mine".to_vec()), true)
    });

    let response = host.invoke_raw(b"{}".to_vec()).await.unwrap();
    assert!(response.owned());
    assert_eq!(response.bytes(), b"mine");
}

#[tokio::test]
async fn handler_failure_aborts_encoding() {
    let host = host_with(|_inv: Invocation, _doc: Value| async {
        Err::<String, _>(std::io::Error::new(std::io::ErrorKind::Other, "boom"))
    });

    let err = host.invoke_raw(b"{}".to_vec()).await.unwrap_err();
    assert!(matches!(err, InvokeError::Handler(_)));
}

#[tokio::test]
async fn handler_success_value_survives_result_wrapping() {
    let host = host_with(|_inv: Invocation, _doc: Value| async {
        Ok::<_, std::io::Error>("wrapped")
    });

    let response = host.invoke_raw(to_bytes(&json!({}))).await.unwrap();
    assert_eq!(response.text(), "wrapped");
}
