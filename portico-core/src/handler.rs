//! Handler traits and the erased registry representation.
//!
//! [`Handler`] is the trait user code implements (or gets for free on
//! closures): native async, typed event in, anything coercible to a result
//! body out. The registry stores handlers behind the object-safe
//! [`DynHandler`] twin, whose erased wrappers fold the per-tag decode and
//! the result coercion into a single call: a statically-declared
//! decode-and-dispatch step with no runtime type lookups.

use std::future::Future;
use std::marker::PhantomData;

use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::body::{Body, IntoBody};
use crate::error::InvokeError;
use crate::scope::Invocation;

/// The terminal endpoint of the dispatch pipeline.
///
/// Handlers receive the invocation handle and a fully owned, decoded event,
/// and return any value the result protocol can coerce ([`IntoBody`]):
/// `()`, strings, byte streams, `Json`-wrapped values, or a `Result` of
/// any of those.
///
/// # Usage
///
/// Closures implement the trait automatically:
///
/// ```rust,ignore
/// builder.handle::<BucketNotification, _>(|_inv: Invocation, ev: BucketNotification| async move {
///     Json(Receipt { records: ev.records.len() })
/// })?
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot handle events of type `{E}`",
    label = "missing `Handler<{E}>` implementation",
    note = "Handlers take `(Invocation, {E})` and return a value convertible into a result body."
)]
pub trait Handler<E>: Send + Sync + 'static {
    /// The handler's return value, coerced into a result body after the call.
    type Output: IntoBody + Send;

    /// Execute the handler logic.
    fn call(&self, inv: Invocation, event: E) -> impl Future<Output = Self::Output> + Send;
}

// Blanket impl for closures
impl<F, E, Fut> Handler<E> for F
where
    F: Fn(Invocation, E) -> Fut + Send + Sync + 'static,
    Fut: Future + Send,
    Fut::Output: IntoBody + Send,
{
    type Output = Fut::Output;

    fn call(&self, inv: Invocation, event: E) -> impl Future<Output = Self::Output> + Send {
        (self)(inv, event)
    }
}

/// Object-safe handler representation used by the registry.
///
/// Implementations decode the payload (when typed), run the handler, and
/// coerce its return value, reporting every failure as the appropriate
/// per-invocation error.
pub trait DynHandler: Send + Sync {
    /// Decode, call and coerce in one erased step.
    fn call_dyn<'a>(
        &'a self,
        inv: Invocation,
        payload: Value,
    ) -> BoxFuture<'a, Result<Body, InvokeError>>;
}

/// Erased wrapper decoding the payload into a concrete event type.
pub(crate) struct TypedHandler<E, H> {
    tag: Box<str>,
    handler: H,
    _event: PhantomData<fn(E)>,
}

impl<E, H> TypedHandler<E, H> {
    pub(crate) fn new(tag: impl Into<Box<str>>, handler: H) -> Self {
        Self {
            tag: tag.into(),
            handler,
            _event: PhantomData,
        }
    }
}

impl<E, H> DynHandler for TypedHandler<E, H>
where
    E: DeserializeOwned + Send + 'static,
    H: Handler<E>,
{
    fn call_dyn<'a>(
        &'a self,
        inv: Invocation,
        payload: Value,
    ) -> BoxFuture<'a, Result<Body, InvokeError>> {
        Box::pin(async move {
            let event: E =
                serde_json::from_value(payload).map_err(|source| InvokeError::Decode {
                    tag: self.tag.to_string(),
                    source,
                })?;
            let output = self.handler.call(inv, event).await;
            output.into_body().map_err(InvokeError::from)
        })
    }
}

/// Erased wrapper passing the parsed document through undecoded.
///
/// This is what backs the default handler: when no shape predicate fires,
/// the handler receives the document itself.
pub(crate) struct DocumentHandler<H> {
    handler: H,
}

impl<H> DocumentHandler<H> {
    pub(crate) fn new(handler: H) -> Self {
        Self { handler }
    }
}

impl<H> DynHandler for DocumentHandler<H>
where
    H: Handler<Value>,
{
    fn call_dyn<'a>(
        &'a self,
        inv: Invocation,
        payload: Value,
    ) -> BoxFuture<'a, Result<Body, InvokeError>> {
        Box::pin(async move {
            let output = self.handler.call(inv, payload).await;
            output.into_body().map_err(InvokeError::from)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{DocumentHandler, DynHandler, TypedHandler};
    use crate::body::Body;
    use crate::error::InvokeError;
    use crate::scope::{Invocation, InvocationMeta, Scope};
    use serde::Deserialize;
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn invocation() -> Invocation {
        Scope::new(InvocationMeta::new("req-1"), Arc::from(b"{}".as_slice())).handle()
    }

    #[derive(Deserialize)]
    struct Ping {
        seq: u64,
    }

    #[tokio::test]
    async fn typed_wrapper_decodes_then_calls() {
        let erased = TypedHandler::<Ping, _>::new("ping", |_inv: Invocation, ev: Ping| async move {
            format!("seq={}", ev.seq)
        });

        let body = erased
            .call_dyn(invocation(), json!({"seq": 7}))
            .await
            .unwrap();
        assert!(matches!(body, Body::Text(ref t) if t == "seq=7"));
    }

    #[tokio::test]
    async fn typed_wrapper_reports_decode_failures_with_the_tag() {
        let erased =
            TypedHandler::<Ping, _>::new("ping", |_inv: Invocation, _ev: Ping| async move {});

        let err = erased
            .call_dyn(invocation(), json!({"seq": "not-a-number"}))
            .await
            .unwrap_err();
        assert!(matches!(err, InvokeError::Decode { ref tag, .. } if tag == "ping"));
    }

    #[tokio::test]
    async fn document_wrapper_passes_the_document_through() {
        let erased = DocumentHandler::new(|_inv: Invocation, doc: Value| async move {
            doc.get("k").and_then(Value::as_str).map(str::to_string)
        });

        let body = erased
            .call_dyn(invocation(), json!({"k": "v"}))
            .await
            .unwrap();
        assert!(matches!(body, Body::Text(ref t) if t == "v"));
    }
}
