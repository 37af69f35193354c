//! Response envelopes.
//!
//! Every response captures its status line and headers when it is built and
//! leaves the body on the wire until an accessor asks for it. The body stream
//! can be read at most once; decoded bodies (JSON text, binary payloads) are
//! cached so their accessors can be called repeatedly.

use serde::de::DeserializeOwned;
use std::fmt;
use std::io::Read;
use std::str::FromStr;
use std::sync::Arc;

use crate::dispatch::{Headers, RawExchange};
use crate::error::{InfogramError, Result};

const SUCCESSFUL_STATUS_FROM: u16 = 200;
const SUCCESSFUL_STATUS_TO: u16 = 299;

/// Boxed response body stream
pub type BodyStream = Box<dyn Read + Send>;

/// Requested interpretation of a response body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseShape {
    Json,
    Binary,
    Empty,
    GenericStream,
}

impl ResponseShape {
    pub fn name(&self) -> &'static str {
        match self {
            ResponseShape::Json => "json",
            ResponseShape::Binary => "binary",
            ResponseShape::Empty => "empty",
            ResponseShape::GenericStream => "stream",
        }
    }
}

impl FromStr for ResponseShape {
    type Err = InfogramError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ResponseShape::Json),
            "binary" | "png" => Ok(ResponseShape::Binary),
            "empty" => Ok(ResponseShape::Empty),
            "stream" | "pdf" => Ok(ResponseShape::GenericStream),
            _ => Err(InfogramError::UnsupportedShape(s.to_string())),
        }
    }
}

impl fmt::Display for ResponseShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Capabilities shared by every response variant
pub trait HttpResponse {
    /// The HTTP status code, or the connection error if there was no response
    fn status_code(&self) -> Result<u16>;

    /// The HTTP status message, or the connection error if there was no response
    fn status_message(&self) -> Result<&str>;

    /// Response headers; empty when the exchange failed
    fn headers(&self) -> &Headers;

    /// True iff a response was received with a status in 200..=299
    fn is_successful(&self) -> bool {
        matches!(
            self.status_code(),
            Ok(code) if (SUCCESSFUL_STATUS_FROM..=SUCCESSFUL_STATUS_TO).contains(&code)
        )
    }

    /// First value of a header, matching the name case-insensitively
    fn header(&self, name: &str) -> Option<&str> {
        self.headers()
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .and_then(|(_, values)| values.first())
            .map(String::as_str)
    }
}

/// Status, headers and the not-yet-read body of one exchange.
pub struct Envelope {
    status: std::result::Result<(u16, String), Arc<reqwest::Error>>,
    headers: Headers,
    body: Option<BodyStream>,
    consumed: bool,
}

impl Envelope {
    pub fn new(exchange: RawExchange) -> Self {
        Envelope {
            status: exchange.status,
            headers: exchange.headers,
            body: exchange.body,
            consumed: false,
        }
    }

    /// Whether the body stream has been handed out
    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    fn connection_error(&self) -> Option<InfogramError> {
        self.status
            .as_ref()
            .err()
            .map(|e| InfogramError::Connection(Arc::clone(e)))
    }

    /// Hand out the body stream, marking the envelope consumed.
    pub fn take_stream(&mut self) -> Result<BodyStream> {
        if let Some(err) = self.connection_error() {
            return Err(err);
        }
        if self.consumed {
            return Err(InfogramError::StreamConsumed);
        }
        self.consumed = true;
        self.body.take().ok_or(InfogramError::StreamConsumed)
    }

    fn read_all(&mut self) -> Result<Vec<u8>> {
        let mut stream = self.take_stream()?;
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

impl HttpResponse for Envelope {
    fn status_code(&self) -> Result<u16> {
        match &self.status {
            Ok((code, _)) => Ok(*code),
            Err(e) => Err(InfogramError::Connection(Arc::clone(e))),
        }
    }

    fn status_message(&self) -> Result<&str> {
        match &self.status {
            Ok((_, message)) => Ok(message.as_str()),
            Err(e) => Err(InfogramError::Connection(Arc::clone(e))),
        }
    }

    fn headers(&self) -> &Headers {
        &self.headers
    }
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("consumed", &self.consumed)
            .finish()
    }
}

macro_rules! delegate_http_response {
    ($($ty:ty),+) => {
        $(
            impl HttpResponse for $ty {
                fn status_code(&self) -> Result<u16> {
                    self.envelope.status_code()
                }

                fn status_message(&self) -> Result<&str> {
                    self.envelope.status_message()
                }

                fn headers(&self) -> &Headers {
                    self.envelope.headers()
                }
            }
        )+
    };
}

/// Response whose body is handed out as a raw stream
#[derive(Debug)]
pub struct StreamResponse {
    envelope: Envelope,
}

impl StreamResponse {
    pub fn new(exchange: RawExchange) -> Self {
        StreamResponse {
            envelope: Envelope::new(exchange),
        }
    }

    /// Take the body stream. A stream cannot be replayed, so a second call
    /// fails with `StreamConsumed`.
    pub fn body(&mut self) -> Result<BodyStream> {
        self.envelope.take_stream()
    }

    pub fn is_consumed(&self) -> bool {
        self.envelope.is_consumed()
    }
}

/// Response whose body is JSON text
#[derive(Debug)]
pub struct JsonResponse {
    envelope: Envelope,
    text: Option<String>,
}

impl JsonResponse {
    pub fn new(exchange: RawExchange) -> Self {
        JsonResponse {
            envelope: Envelope::new(exchange),
            text: None,
        }
    }

    /// Read the whole body as UTF-8 text.
    ///
    /// The text is cached; later calls return it without touching the stream.
    pub fn body(&mut self) -> Result<&str> {
        if self.text.is_none() {
            let bytes = self.envelope.read_all()?;
            let text = String::from_utf8(bytes)
                .map_err(|e| InfogramError::Encoding(format!("response body is not UTF-8: {}", e)))?;
            self.text = Some(text);
        }
        Ok(self.text.as_deref().unwrap_or_default())
    }

    /// Deserialize the body
    pub fn parse<T: DeserializeOwned>(&mut self) -> Result<T> {
        let text = self.body()?;
        Ok(serde_json::from_str(text)?)
    }

    /// Take the raw stream instead of the decoded text
    pub fn stream(&mut self) -> Result<BodyStream> {
        self.envelope.take_stream()
    }

    pub fn is_consumed(&self) -> bool {
        self.envelope.is_consumed()
    }
}

/// Response whose body is a binary payload such as a PNG image
#[derive(Debug)]
pub struct BinaryResponse {
    envelope: Envelope,
    bytes: Option<Vec<u8>>,
}

impl BinaryResponse {
    pub fn new(exchange: RawExchange) -> Self {
        BinaryResponse {
            envelope: Envelope::new(exchange),
            bytes: None,
        }
    }

    /// Read the whole body as bytes.
    ///
    /// The bytes are cached; later calls return them without touching the stream.
    pub fn graphic(&mut self) -> Result<&[u8]> {
        if self.bytes.is_none() {
            self.bytes = Some(self.envelope.read_all()?);
        }
        Ok(self.bytes.as_deref().unwrap_or_default())
    }

    /// Take the raw stream instead of the buffered bytes
    pub fn stream(&mut self) -> Result<BodyStream> {
        self.envelope.take_stream()
    }

    pub fn is_consumed(&self) -> bool {
        self.envelope.is_consumed()
    }
}

/// Response with no meaningful body
#[derive(Debug)]
pub struct EmptyResponse {
    envelope: Envelope,
}

impl EmptyResponse {
    pub fn new(exchange: RawExchange) -> Self {
        EmptyResponse {
            envelope: Envelope::new(exchange),
        }
    }
}

delegate_http_response!(StreamResponse, JsonResponse, BinaryResponse, EmptyResponse);

/// A response in the shape the caller asked for
#[derive(Debug)]
pub enum Response {
    Json(JsonResponse),
    Binary(BinaryResponse),
    Empty(EmptyResponse),
    Stream(StreamResponse),
}

impl Response {
    /// Wrap an exchange in the variant matching `shape`
    pub fn from_exchange(shape: ResponseShape, exchange: RawExchange) -> Self {
        match shape {
            ResponseShape::Json => Response::Json(JsonResponse::new(exchange)),
            ResponseShape::Binary => Response::Binary(BinaryResponse::new(exchange)),
            ResponseShape::Empty => Response::Empty(EmptyResponse::new(exchange)),
            ResponseShape::GenericStream => Response::Stream(StreamResponse::new(exchange)),
        }
    }

    pub fn shape(&self) -> ResponseShape {
        match self {
            Response::Json(_) => ResponseShape::Json,
            Response::Binary(_) => ResponseShape::Binary,
            Response::Empty(_) => ResponseShape::Empty,
            Response::Stream(_) => ResponseShape::GenericStream,
        }
    }

    fn envelope(&self) -> &Envelope {
        match self {
            Response::Json(r) => &r.envelope,
            Response::Binary(r) => &r.envelope,
            Response::Empty(r) => &r.envelope,
            Response::Stream(r) => &r.envelope,
        }
    }

    fn unexpected(&self, expected: ResponseShape) -> InfogramError {
        InfogramError::UnexpectedShape {
            expected: expected.name(),
            actual: self.shape().name(),
        }
    }

    pub fn into_json(self) -> Result<JsonResponse> {
        match self {
            Response::Json(r) => Ok(r),
            other => Err(other.unexpected(ResponseShape::Json)),
        }
    }

    pub fn into_binary(self) -> Result<BinaryResponse> {
        match self {
            Response::Binary(r) => Ok(r),
            other => Err(other.unexpected(ResponseShape::Binary)),
        }
    }

    pub fn into_empty(self) -> Result<EmptyResponse> {
        match self {
            Response::Empty(r) => Ok(r),
            other => Err(other.unexpected(ResponseShape::Empty)),
        }
    }

    pub fn into_stream(self) -> Result<StreamResponse> {
        match self {
            Response::Stream(r) => Ok(r),
            other => Err(other.unexpected(ResponseShape::GenericStream)),
        }
    }
}

impl HttpResponse for Response {
    fn status_code(&self) -> Result<u16> {
        self.envelope().status_code()
    }

    fn status_message(&self) -> Result<&str> {
        self.envelope().status_message()
    }

    fn headers(&self) -> &Headers {
        self.envelope().headers()
    }
}
