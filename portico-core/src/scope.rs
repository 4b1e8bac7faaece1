//! Per-invocation scope and the handle handlers see.
//!
//! Each invocation allocates a fresh [`Scope`] before its handler runs. The
//! scope exposes request-scoped facts (request id, advisory deadline, raw
//! payload) through an [`Invocation`] handle passed to the handler as an
//! explicit argument, and carries a typed resource store for anything the
//! handler acquires during the call. Teardown clears the store after the
//! handler returns, on the success and failure paths alike, so a warm
//! process reusing the dispatcher never leaks state between calls.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

/// Request-scoped facts supplied by the invocation loop.
#[derive(Debug, Clone, Default)]
pub struct InvocationMeta {
    request_id: String,
    function_name: Option<String>,
    deadline: Option<DateTime<Utc>>,
}

impl InvocationMeta {
    /// Metadata for the given request id.
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            function_name: None,
            deadline: None,
        }
    }

    /// Name of the hosted function, if the loop provides one.
    pub fn with_function_name(mut self, name: impl Into<String>) -> Self {
        self.function_name = Some(name.into());
        self
    }

    /// Advisory deadline for this invocation.
    ///
    /// The core never enforces it; a handler that ignores it runs to
    /// completion or failure on its own schedule.
    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// The invocation's request id.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// The hosted function's name, if known.
    pub fn function_name(&self) -> Option<&str> {
        self.function_name.as_deref()
    }

    /// The advisory deadline, if one was supplied.
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }
}

struct ScopeInner {
    meta: InvocationMeta,
    payload: Arc<[u8]>,
    resources: Mutex<HashMap<TypeId, Box<dyn Any + Send>>>,
}

/// The isolated scope of one invocation.
///
/// Created by the dispatcher immediately before the handler runs and torn
/// down immediately after it returns. Never reused across invocations.
pub struct Scope {
    inner: Arc<ScopeInner>,
}

impl Scope {
    pub(crate) fn new(meta: InvocationMeta, payload: Arc<[u8]>) -> Self {
        Self {
            inner: Arc::new(ScopeInner {
                meta,
                payload,
                resources: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// The handle handed to the handler.
    pub fn handle(&self) -> Invocation {
        Invocation {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Release every per-invocation resource.
    ///
    /// Runs on the success and failure paths. Clearing the store drops the
    /// resources even if the handler leaked an [`Invocation`] clone into a
    /// longer-lived task.
    pub(crate) fn teardown(self) {
        self.inner.resources.lock().unwrap().clear();
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("request_id", &self.inner.meta.request_id())
            .finish_non_exhaustive()
    }
}

/// A handler's view of its invocation scope.
///
/// Cheap to clone; all clones share the same scope. Valid only for the
/// duration of the invocation it was created for: the resource store is
/// emptied at teardown.
#[derive(Clone)]
pub struct Invocation {
    inner: Arc<ScopeInner>,
}

impl Invocation {
    /// Request-scoped facts for this invocation.
    pub fn meta(&self) -> &InvocationMeta {
        &self.inner.meta
    }

    /// The invocation's request id.
    pub fn request_id(&self) -> &str {
        self.inner.meta.request_id()
    }

    /// The advisory deadline, if one was supplied.
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.inner.meta.deadline()
    }

    /// Time left until the advisory deadline.
    ///
    /// Negative once the deadline has passed; `None` when no deadline was
    /// supplied.
    pub fn remaining_time(&self) -> Option<Duration> {
        self.inner.meta.deadline().map(|d| d - Utc::now())
    }

    /// The raw request payload, exactly as the invocation loop delivered it.
    pub fn payload(&self) -> &[u8] {
        &self.inner.payload
    }

    /// Stash a per-invocation resource, keyed by its type.
    ///
    /// A second value of the same type replaces the first. Everything left
    /// in the store is released when the scope is torn down.
    pub fn put_resource<T: Send + 'static>(&self, value: T) {
        self.inner
            .resources
            .lock()
            .unwrap()
            .insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Remove and return a previously stashed resource.
    pub fn take_resource<T: Send + 'static>(&self) -> Option<T> {
        self.inner
            .resources
            .lock()
            .unwrap()
            .remove(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast::<T>().ok())
            .map(|boxed| *boxed)
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("request_id", &self.inner.meta.request_id())
            .finish_non_exhaustive()
    }
}
