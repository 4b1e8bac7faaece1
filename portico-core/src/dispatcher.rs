//! The dispatcher and its builder.
//!
//! Configuration is an explicit two-phase lifecycle: a mutable
//! [`DispatcherBuilder`] collects matchers and handlers (registration
//! errors surface immediately and leave the builder usable), and
//! [`build`](DispatcherBuilder::build) freezes the result into an immutable
//! [`Dispatcher`]. After the freeze no further registration is possible and
//! dispatch needs no locking: the dispatcher is shared by reference across
//! however many concurrent invocations the external loop chooses to run.
//!
//! Per invocation, the pipeline runs strictly
//! resolve → execute → encode → finalize:
//!
//! 1. parse the payload into a JSON document and resolve its shape;
//! 2. run the selected handler inside a fresh scope;
//! 3. coerce and encode the captured result;
//! 4. rewind the output once and hand it back.

use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::body::Body;
use crate::context::{InvocationContext, InvocationRequest, InvocationResponse};
use crate::error::{ConfigError, InvokeError};
use crate::handler::{DocumentHandler, DynHandler, Handler, TypedHandler};
use crate::matcher::{EventMatcher, MatcherSet, ShapedEvent};
use crate::scope::Scope;

/// Mutable setup-phase configuration for a [`Dispatcher`].
#[derive(Default)]
pub struct DispatcherBuilder {
    matchers: MatcherSet,
    handlers: HashMap<Box<str>, Box<dyn DynHandler>>,
    default_handler: Option<Box<dyn DynHandler>>,
}

impl DispatcherBuilder {
    /// Start an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a shape matcher for `tag`.
    ///
    /// Matchers are probed in registration order and the first hit wins, so
    /// the call order here is the precedence order. Duplicate tags are
    /// allowed; uniqueness is enforced at handler registration.
    pub fn matcher(
        &mut self,
        tag: impl Into<Box<str>>,
        predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> &mut Self {
        self.matchers.push(EventMatcher::new(tag, predicate));
        self
    }

    /// Append the matcher declared by a [`ShapedEvent`] type.
    pub fn matcher_for<E: ShapedEvent + 'static>(&mut self) -> &mut Self {
        self.matcher(E::TAG, E::matches)
    }

    /// Register the handler for a [`ShapedEvent`] type under its tag.
    pub fn handle<E, H>(&mut self, handler: H) -> Result<&mut Self, ConfigError>
    where
        E: ShapedEvent + Send + 'static,
        H: Handler<E>,
    {
        self.handle_tag::<E, H>(E::TAG, handler)
    }

    /// Register a handler under an explicit tag, decoding to `E`.
    ///
    /// Fails with [`ConfigError::DuplicateHandler`] if the tag is taken;
    /// the existing registration stays in place.
    pub fn handle_tag<E, H>(
        &mut self,
        tag: impl Into<Box<str>>,
        handler: H,
    ) -> Result<&mut Self, ConfigError>
    where
        E: DeserializeOwned + Send + 'static,
        H: Handler<E>,
    {
        let tag = tag.into();
        if self.handlers.contains_key(&tag) {
            return Err(ConfigError::DuplicateHandler(tag.into()));
        }
        let erased = TypedHandler::<E, H>::new(tag.clone(), handler);
        self.handlers.insert(tag, Box::new(erased));
        Ok(self)
    }

    /// Register the fallback handler for unresolved inputs.
    ///
    /// The default handler receives the parsed document itself. At most one
    /// may be registered; a second attempt fails with
    /// [`ConfigError::DuplicateDefault`] and leaves the first active.
    pub fn default_handler<H>(&mut self, handler: H) -> Result<&mut Self, ConfigError>
    where
        H: Handler<Value>,
    {
        if self.default_handler.is_some() {
            return Err(ConfigError::DuplicateDefault);
        }
        self.default_handler = Some(Box::new(DocumentHandler::new(handler)));
        Ok(self)
    }

    /// Register a fallback handler that decodes unresolved inputs to `E`.
    ///
    /// The decode runs per invocation. Occupies the same single slot as
    /// [`default_handler`](DispatcherBuilder::default_handler).
    pub fn default_event_handler<E, H>(&mut self, handler: H) -> Result<&mut Self, ConfigError>
    where
        E: DeserializeOwned + Send + 'static,
        H: Handler<E>,
    {
        if self.default_handler.is_some() {
            return Err(ConfigError::DuplicateDefault);
        }
        self.default_handler = Some(Box::new(TypedHandler::<E, H>::new("(default)", handler)));
        Ok(self)
    }

    /// Freeze the configuration into an immutable dispatcher.
    pub fn build(self) -> Dispatcher {
        Dispatcher {
            matchers: self.matchers,
            handlers: self.handlers,
            default_handler: self.default_handler,
        }
    }
}

impl fmt::Debug for DispatcherBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatcherBuilder")
            .field("matchers", &self.matchers.len())
            .field("handlers", &self.handlers.len())
            .field("default_handler", &self.default_handler.is_some())
            .finish()
    }
}

/// The frozen dispatch core.
///
/// Immutable once built; every invocation gets its own fresh context and
/// scope, so a single dispatcher serves any number of sequential or
/// concurrent invocations without interior locking.
pub struct Dispatcher {
    matchers: MatcherSet,
    handlers: HashMap<Box<str>, Box<dyn DynHandler>>,
    default_handler: Option<Box<dyn DynHandler>>,
}

impl Dispatcher {
    /// Start building a dispatcher.
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    /// Process one invocation to completion.
    ///
    /// Runs resolve → execute → encode → finalize. Any stage error aborts
    /// the remaining stages and is returned as the invocation's failure; no
    /// partial output is emitted and the dispatcher stays ready for the
    /// next invocation.
    pub async fn invoke(
        &self,
        request: InvocationRequest,
    ) -> Result<InvocationResponse, InvokeError> {
        let request_id = request.meta().request_id().to_string();
        match self.run(request).await {
            Ok(response) => Ok(response),
            Err(err) => {
                tracing::warn!(request_id, error = %err, "invocation aborted");
                Err(err)
            }
        }
    }

    async fn run(&self, request: InvocationRequest) -> Result<InvocationResponse, InvokeError> {
        let mut cx = InvocationContext::new(request);
        self.resolve(&mut cx)?;
        self.execute(&mut cx).await?;
        self.encode(&mut cx)?;
        cx.finalize().map_err(InvokeError::Finalize)
    }

    /// Parse the payload and pick the one handler for this invocation.
    fn resolve<'d>(&'d self, cx: &mut InvocationContext<'d>) -> Result<(), InvokeError> {
        let document: Value =
            serde_json::from_slice(cx.request().payload()).map_err(InvokeError::Parse)?;

        match self.matchers.resolve(&document) {
            Some(tag) => {
                let Some(handler) = self.handlers.get(tag) else {
                    return Err(InvokeError::Unhandled(tag.to_string()));
                };
                tracing::debug!(tag, "event shape resolved");
                cx.select(Some(tag), handler.as_ref());
            }
            None => match self.default_handler.as_deref() {
                Some(handler) => {
                    tracing::debug!("no event matcher fired, using default handler");
                    cx.select(None, handler);
                }
                None => return Err(InvokeError::Unresolved),
            },
        }

        cx.set_document(document);
        Ok(())
    }

    /// Run the selected handler inside a fresh per-invocation scope.
    async fn execute(&self, cx: &mut InvocationContext<'_>) -> Result<(), InvokeError> {
        let Some(handler) = cx.selected() else {
            return Err(InvokeError::Unresolved);
        };
        let Some(document) = cx.take_document() else {
            return Err(InvokeError::Unresolved);
        };

        let scope = Scope::new(cx.request().meta().clone(), cx.request().payload_handle());
        let result = handler.call_dyn(scope.handle(), document).await;
        scope.teardown();

        cx.set_result(result?);
        Ok(())
    }

    /// Encode the captured result into the pending response.
    fn encode(&self, cx: &mut InvocationContext<'_>) -> Result<(), InvokeError> {
        let body = cx.take_result().unwrap_or(Body::Empty);
        let (stream, owned) = body.encode().map_err(InvokeError::Encode)?;
        cx.set_response(stream, owned);
        Ok(())
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("matchers", &self.matchers.len())
            .field("handlers", &self.handlers.len())
            .field("default_handler", &self.default_handler.is_some())
            .finish()
    }
}
