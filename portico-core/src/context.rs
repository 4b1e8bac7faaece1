//! Invocation request, response and the per-invocation context.
//!
//! The context is the mutable record threading one invocation through the
//! pipeline stages: raw input and metadata in, parsed document and resolved
//! tag during resolution, the selected handler and its captured result
//! during execution, the pending response during encoding. It is created at
//! invocation start, consumed by [`finalize`](InvocationContext::finalize),
//! and never reused.

use std::io::{self, Read};
use std::sync::Arc;

use serde_json::Value;

use crate::body::{Body, OutputStream};
use crate::handler::DynHandler;
use crate::scope::InvocationMeta;

/// One invocation as delivered by the external loop: a raw JSON payload
/// plus request-scoped metadata.
#[derive(Debug, Clone)]
pub struct InvocationRequest {
    payload: Arc<[u8]>,
    meta: InvocationMeta,
}

impl InvocationRequest {
    /// Build a request from a raw payload and its metadata.
    pub fn new(payload: impl Into<Vec<u8>>, meta: InvocationMeta) -> Self {
        Self {
            payload: payload.into().into(),
            meta,
        }
    }

    /// The raw payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Request-scoped metadata.
    pub fn meta(&self) -> &InvocationMeta {
        &self.meta
    }

    pub(crate) fn payload_handle(&self) -> Arc<[u8]> {
        Arc::clone(&self.payload)
    }
}

/// The outcome of a successful invocation.
///
/// `owned` reports whether stream responsibility travels with the response
/// (`true`: the consumer releases it when done) or remains with whoever
/// supplied the stream (`false`: the consumer must not dispose of it).
#[derive(Debug)]
pub struct InvocationResponse {
    stream: OutputStream,
    owned: bool,
}

impl InvocationResponse {
    pub(crate) fn new(stream: OutputStream, owned: bool) -> Self {
        Self { stream, owned }
    }

    /// Whether stream responsibility travels with this response.
    pub fn owned(&self) -> bool {
        self.owned
    }

    /// The output stream, positioned at the start.
    pub fn stream_mut(&mut self) -> &mut OutputStream {
        &mut self.stream
    }

    /// Split the response into its stream and ownership flag.
    pub fn into_parts(self) -> (OutputStream, bool) {
        (self.stream, self.owned)
    }

    /// Drain the remaining output into a byte buffer.
    pub fn into_bytes(mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.stream.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

impl Read for InvocationResponse {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

/// Mutable per-invocation state, created fresh for every invocation.
pub struct InvocationContext<'d> {
    request: InvocationRequest,
    document: Option<Value>,
    resolved_tag: Option<Box<str>>,
    handler: Option<&'d dyn DynHandler>,
    result: Option<Body>,
    response: Option<InvocationResponse>,
}

impl<'d> InvocationContext<'d> {
    /// Start a context for the given request.
    pub fn new(request: InvocationRequest) -> Self {
        Self {
            request,
            document: None,
            resolved_tag: None,
            handler: None,
            result: None,
            response: None,
        }
    }

    /// The originating request.
    pub fn request(&self) -> &InvocationRequest {
        &self.request
    }

    /// The parsed input document, once the resolve stage has run.
    pub fn document(&self) -> Option<&Value> {
        self.document.as_ref()
    }

    /// The resolved event tag; `None` before resolution and for
    /// default-handler invocations.
    pub fn resolved_tag(&self) -> Option<&str> {
        self.resolved_tag.as_deref()
    }

    pub(crate) fn set_document(&mut self, document: Value) {
        self.document = Some(document);
    }

    pub(crate) fn take_document(&mut self) -> Option<Value> {
        self.document.take()
    }

    pub(crate) fn select(&mut self, tag: Option<&str>, handler: &'d dyn DynHandler) {
        self.resolved_tag = tag.map(Box::from);
        self.handler = Some(handler);
    }

    pub(crate) fn selected(&self) -> Option<&'d dyn DynHandler> {
        self.handler
    }

    pub(crate) fn set_result(&mut self, body: Body) {
        self.result = Some(body);
    }

    pub(crate) fn take_result(&mut self) -> Option<Body> {
        self.result.take()
    }

    /// Install the encoded output, replacing any previously set response.
    ///
    /// The replaced response's core-owned buffer is released here; a
    /// supplied stream handle is dropped without touching the supplier's
    /// underlying resource.
    pub fn set_response(&mut self, stream: OutputStream, owned: bool) {
        self.response = Some(InvocationResponse::new(stream, owned));
    }

    /// Consume the context, rewinding the output to its start exactly once
    /// so the caller can read it without re-seeking.
    ///
    /// An invocation that produced no response yields an empty core-owned
    /// one.
    pub(crate) fn finalize(mut self) -> io::Result<InvocationResponse> {
        let mut response = self
            .response
            .take()
            .unwrap_or_else(|| InvocationResponse::new(OutputStream::empty(), true));
        response.stream.rewind_to_start()?;
        Ok(response)
    }
}
