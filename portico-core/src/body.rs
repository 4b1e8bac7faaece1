//! Result bodies and output streams.
//!
//! A handler may return almost anything; this module defines the closed set
//! of shapes the invocation loop understands ([`Body`]) and the total
//! coercion from handler return values into it ([`IntoBody`]).
//!
//! # Coercion rules
//!
//! - `()` and `Option::None` → [`Body::Empty`]
//! - strings → [`Body::Text`]
//! - byte buffers and stream handles → [`Body::Bytes`], core-owned
//! - a `(stream, bool)` pair → [`Body::Bytes`] with the given ownership flag
//! - [`Json`]-wrapped values and [`Value`] → [`Body::Structured`]
//! - `Result` propagates its error as the handler's failure
//!
//! The impl set is closed and disjoint by type, so every return value maps
//! to exactly one variant.

use std::borrow::Cow;
use std::fmt;
use std::io::{self, Cursor, Read, Seek, SeekFrom};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::error::BoxError;

/// A byte stream that can be handed back to the invocation loop.
///
/// Anything readable, seekable and sendable qualifies; handlers typically
/// return a `Cursor` over an in-memory buffer or a file handle.
pub trait InvocationStream: Read + Seek + Send {}

impl<T: Read + Seek + Send> InvocationStream for T {}

/// The output stream of one invocation.
pub enum OutputStream {
    /// A core-owned in-memory buffer.
    Buffered(Cursor<Vec<u8>>),
    /// A handler-supplied stream passed through verbatim.
    Supplied(Box<dyn InvocationStream>),
}

impl OutputStream {
    /// A zero-length core-owned stream.
    pub fn empty() -> Self {
        OutputStream::Buffered(Cursor::new(Vec::new()))
    }

    /// A core-owned stream over the given bytes, positioned at the start.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        OutputStream::Buffered(Cursor::new(bytes))
    }

    /// Whether this stream is a core-owned buffer.
    pub fn is_buffered(&self) -> bool {
        matches!(self, OutputStream::Buffered(_))
    }

    pub(crate) fn rewind_to_start(&mut self) -> io::Result<()> {
        self.seek(SeekFrom::Start(0)).map(|_| ())
    }
}

impl Read for OutputStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            OutputStream::Buffered(cursor) => cursor.read(buf),
            OutputStream::Supplied(stream) => stream.read(buf),
        }
    }
}

impl Seek for OutputStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            OutputStream::Buffered(cursor) => cursor.seek(pos),
            OutputStream::Supplied(stream) => stream.seek(pos),
        }
    }
}

impl fmt::Debug for OutputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputStream::Buffered(cursor) => f
                .debug_struct("Buffered")
                .field("len", &cursor.get_ref().len())
                .finish(),
            OutputStream::Supplied(_) => f.debug_struct("Supplied").finish_non_exhaustive(),
        }
    }
}

/// The closed union of handler result shapes.
pub enum Body {
    /// No body; encodes to a zero-length stream.
    Empty,
    /// A raw byte stream.
    Bytes {
        /// The stream to hand back to the invocation loop.
        stream: Box<dyn InvocationStream>,
        /// Whether stream responsibility travels with the response.
        ///
        /// `false` means the stream stays the supplier's to release; the
        /// core and the invocation loop must not dispose of it.
        owned: bool,
    },
    /// A UTF-8 text body.
    Text(String),
    /// An arbitrary value to be serialized as JSON.
    Structured(Value),
}

impl Body {
    /// A byte-stream body with an explicit ownership flag.
    pub fn stream(stream: impl InvocationStream + 'static, owned: bool) -> Self {
        Body::Bytes {
            stream: Box::new(stream),
            owned,
        }
    }

    /// Encode this body into an output stream plus its ownership flag.
    ///
    /// `Empty`, `Text` and `Structured` produce fresh core-owned buffers;
    /// `Bytes` passes the handler's stream and flag through verbatim.
    pub fn encode(self) -> Result<(OutputStream, bool), serde_json::Error> {
        match self {
            Body::Empty => Ok((OutputStream::empty(), true)),
            Body::Text(text) => Ok((OutputStream::from_bytes(text.into_bytes()), true)),
            Body::Bytes { stream, owned } => Ok((OutputStream::Supplied(stream), owned)),
            Body::Structured(value) => {
                let buf = serde_json::to_vec(&value)?;
                Ok((OutputStream::from_bytes(buf), true))
            }
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Empty => f.write_str("Empty"),
            Body::Bytes { owned, .. } => f.debug_struct("Bytes").field("owned", owned).finish(),
            Body::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Body::Structured(value) => f.debug_tuple("Structured").field(value).finish(),
        }
    }
}

/// Errors surfaced while coercing a handler return value into a [`Body`].
#[derive(Error, Debug)]
pub enum BodyError {
    /// The handler returned an error value.
    #[error("handler failed")]
    Handler(#[source] BoxError),

    /// The returned value could not be serialized as JSON.
    #[error("result serialization failed")]
    Encode(#[source] serde_json::Error),
}

/// Conversion of a handler's return value into a [`Body`].
///
/// This is the total coercion rule of the result protocol: every
/// implementing type maps to exactly one variant, and `Result`/`Option`
/// delegate to their payload.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be returned from a Portico handler",
    label = "missing `IntoBody` implementation",
    note = "Return (), a string, bytes, a (stream, bool) pair, or wrap the value in `Json`."
)]
pub trait IntoBody {
    /// Convert the return value into a result body.
    fn into_body(self) -> Result<Body, BodyError>;
}

impl IntoBody for Body {
    fn into_body(self) -> Result<Body, BodyError> {
        Ok(self)
    }
}

impl IntoBody for () {
    fn into_body(self) -> Result<Body, BodyError> {
        Ok(Body::Empty)
    }
}

impl IntoBody for String {
    fn into_body(self) -> Result<Body, BodyError> {
        Ok(Body::Text(self))
    }
}

impl IntoBody for &'static str {
    fn into_body(self) -> Result<Body, BodyError> {
        Ok(Body::Text(self.to_string()))
    }
}

impl IntoBody for Cow<'static, str> {
    fn into_body(self) -> Result<Body, BodyError> {
        Ok(Body::Text(self.into_owned()))
    }
}

impl IntoBody for Vec<u8> {
    fn into_body(self) -> Result<Body, BodyError> {
        Ok(Body::stream(Cursor::new(self), true))
    }
}

impl IntoBody for Box<dyn InvocationStream> {
    fn into_body(self) -> Result<Body, BodyError> {
        Ok(Body::Bytes {
            stream: self,
            owned: true,
        })
    }
}

impl<S> IntoBody for (S, bool)
where
    S: InvocationStream + 'static,
{
    fn into_body(self) -> Result<Body, BodyError> {
        Ok(Body::stream(self.0, self.1))
    }
}

impl IntoBody for Value {
    fn into_body(self) -> Result<Body, BodyError> {
        Ok(Body::Structured(self))
    }
}

/// Wrapper marking a value for JSON serialization.
///
/// ```rust,ignore
/// async fn tally(_inv: Invocation, ev: BucketNotification) -> Json<Summary> {
///     Json(Summary { count: ev.records.len() })
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoBody for Json<T> {
    fn into_body(self) -> Result<Body, BodyError> {
        let value = serde_json::to_value(self.0).map_err(BodyError::Encode)?;
        Ok(Body::Structured(value))
    }
}

impl<T: IntoBody> IntoBody for Option<T> {
    fn into_body(self) -> Result<Body, BodyError> {
        match self {
            Some(inner) => inner.into_body(),
            None => Ok(Body::Empty),
        }
    }
}

impl<T, E> IntoBody for Result<T, E>
where
    T: IntoBody,
    E: Into<BoxError>,
{
    fn into_body(self) -> Result<Body, BodyError> {
        match self {
            Ok(inner) => inner.into_body(),
            Err(err) => Err(BodyError::Handler(err.into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Body, BodyError, IntoBody, Json, OutputStream};
    use serde::Serialize;
    use std::io::{Cursor, Read};

    fn read_all(stream: &mut OutputStream) -> Vec<u8> {
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).unwrap();
        buf
    }

    #[test]
    fn unit_coerces_to_empty() {
        assert!(matches!(().into_body().unwrap(), Body::Empty));
        assert!(matches!(None::<String>.into_body().unwrap(), Body::Empty));
    }

    #[test]
    fn string_coerces_to_text() {
        let body = "text/plain".into_body().unwrap();
        let (mut stream, owned) = body.encode().unwrap();
        assert!(owned);
        assert_eq!(read_all(&mut stream), b"text/plain");
    }

    #[test]
    fn byte_buffer_is_core_owned() {
        let body = vec![1u8, 2, 3].into_body().unwrap();
        assert!(matches!(body, Body::Bytes { owned: true, .. }));
    }

    #[test]
    fn stream_pair_keeps_its_flag() {
        let body = (Cursor::new(vec![9u8]), false).into_body().unwrap();
        let (mut stream, owned) = body.encode().unwrap();
        assert!(!owned);
        assert!(!stream.is_buffered());
        assert_eq!(read_all(&mut stream), vec![9u8]);
    }

    #[test]
    fn structured_omits_none_fields() {
        #[derive(Serialize)]
        struct Record {
            count: u32,
            #[serde(skip_serializing_if = "Option::is_none")]
            note: Option<String>,
        }

        let body = Json(Record {
            count: 3,
            note: None,
        })
        .into_body()
        .unwrap();
        let (mut stream, _) = body.encode().unwrap();
        assert_eq!(read_all(&mut stream), br#"{"count":3}"#);
    }

    #[test]
    fn result_error_becomes_handler_failure() {
        let out: Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        assert!(matches!(out.into_body(), Err(BodyError::Handler(_))));
    }

    #[test]
    fn empty_encodes_to_zero_length_stream() {
        let (mut stream, owned) = Body::Empty.encode().unwrap();
        assert!(owned);
        assert!(read_all(&mut stream).is_empty());
    }
}
