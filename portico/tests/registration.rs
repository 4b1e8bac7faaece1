//! Setup-phase registration rules.

use portico::prelude::*;
use portico::testing::TestHost;
use serde_json::{Value, json};

mod common;
use common::to_bytes;

#[tokio::test]
async fn duplicate_handler_tag_fails_and_keeps_the_first() {
    let mut builder = Dispatcher::builder();
    builder
        .matcher("tag", |_doc: &Value| true)
        .handle_tag::<Value, _>("tag", |_inv: Invocation, _doc: Value| async { "first" })
        .unwrap();

    let err = builder
        .handle_tag::<Value, _>("tag", |_inv: Invocation, _doc: Value| async { "second" })
        .unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateHandler(ref tag) if tag == "tag"));

    let host = TestHost::new(builder.build());
    let response = host.invoke_raw(to_bytes(&json!({}))).await.unwrap();
    assert_eq!(response.text(), "first");
}

#[tokio::test]
async fn second_default_fails_and_the_first_stays_active() {
    let mut builder = Dispatcher::builder();
    builder
        .default_handler(|_inv: Invocation, _doc: Value| async { "first" })
        .unwrap();

    let err = builder
        .default_handler(|_inv: Invocation, _doc: Value| async { "second" })
        .unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateDefault));

    // The first default is still the one invoked for unresolved inputs.
    let host = TestHost::new(builder.build());
    let response = host.invoke_raw(to_bytes(&json!({}))).await.unwrap();
    assert_eq!(response.text(), "first");
}

#[tokio::test]
async fn unknown_builtin_selection_fails_startup_configuration() {
    let mut builder = Dispatcher::builder();
    let err = builder
        .select_builtin_matchers(&["log-export", "stream-shard"])
        .unwrap_err();

    assert!(matches!(err, ConfigError::UnknownBuiltin(ref tag) if tag == "stream-shard"));
}

#[tokio::test]
async fn matcher_tags_need_no_uniqueness() {
    // Duplicate matcher tags are legal; the handler registry is where
    // uniqueness is enforced.
    let mut builder = Dispatcher::builder();
    builder
        .matcher("dup", |doc: &Value| doc.get("a").is_some())
        .matcher("dup", |doc: &Value| doc.get("b").is_some())
        .handle_tag::<Value, _>("dup", |_inv: Invocation, _doc: Value| async { "dup" })
        .unwrap();
    let host = TestHost::new(builder.build());

    assert_eq!(
        host.invoke_raw(to_bytes(&json!({"a": 1}))).await.unwrap().text(),
        "dup"
    );
    assert_eq!(
        host.invoke_raw(to_bytes(&json!({"b": 1}))).await.unwrap().text(),
        "dup"
    );
}
