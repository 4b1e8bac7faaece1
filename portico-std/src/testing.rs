//! Testing utilities for Portico hosts.
//!
//! [`TestHost`] drives a dispatcher the way the external invocation loop
//! would, without standing one up: serialize an event (or hand over raw
//! bytes), synthesize invocation metadata, invoke, and read the output
//! once into a [`TestResponse`].

use portico_core::{
    Dispatcher, InvocationMeta, InvocationRequest, InvocationResponse, InvokeError,
};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A test stand-in for the external invocation loop.
pub struct TestHost {
    dispatcher: Dispatcher,
}

impl TestHost {
    /// Wrap a built dispatcher.
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Invoke with a raw JSON payload and synthesized metadata.
    pub async fn invoke_raw(
        &self,
        payload: impl Into<Vec<u8>>,
    ) -> Result<TestResponse, InvokeError> {
        self.invoke_raw_with(payload, InvocationMeta::new("test-request"))
            .await
    }

    /// Invoke with a raw JSON payload and the given metadata.
    pub async fn invoke_raw_with(
        &self,
        payload: impl Into<Vec<u8>>,
        meta: InvocationMeta,
    ) -> Result<TestResponse, InvokeError> {
        let response = self
            .dispatcher
            .invoke(InvocationRequest::new(payload, meta))
            .await?;
        Ok(TestResponse::read(response))
    }

    /// Serialize an event as the wire payload and invoke with it.
    pub async fn invoke_event<T: Serialize>(&self, event: &T) -> Result<TestResponse, InvokeError> {
        let payload = serde_json::to_vec(event).expect("test event serializes as JSON");
        self.invoke_raw(payload).await
    }

    /// Like [`invoke_event`](Self::invoke_event), with explicit metadata.
    pub async fn invoke_event_with<T: Serialize>(
        &self,
        event: &T,
        meta: InvocationMeta,
    ) -> Result<TestResponse, InvokeError> {
        let payload = serde_json::to_vec(event).expect("test event serializes as JSON");
        self.invoke_raw_with(payload, meta).await
    }
}

/// A fully read invocation output.
#[derive(Debug)]
pub struct TestResponse {
    bytes: Vec<u8>,
    owned: bool,
}

impl TestResponse {
    fn read(response: InvocationResponse) -> Self {
        let owned = response.owned();
        let bytes = response
            .into_bytes()
            .expect("invocation output stream is readable");
        Self { bytes, owned }
    }

    /// The raw output bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Whether the output carried a zero-length body.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The ownership flag the invocation loop would have seen.
    pub fn owned(&self) -> bool {
        self.owned
    }

    /// The output as UTF-8 text.
    pub fn text(&self) -> &str {
        std::str::from_utf8(&self.bytes).expect("invocation output is UTF-8")
    }

    /// The output decoded as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.bytes).expect("invocation output is JSON")
    }
}
