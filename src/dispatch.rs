//! Verb-specific request construction and the single wire exchange.

use reqwest::blocking::{Client, Request};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use url::Url;

use crate::error::{InfogramError, Result};
use crate::params::ParameterSet;

/// Content type of every request that declares a body
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// HTTP verbs supported by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// Whether parameters travel in the request body
    pub fn sends_body(&self) -> bool {
        matches!(self, Method::Post | Method::Put)
    }

    fn to_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

impl FromStr for Method {
    type Err = InfogramError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            other => Err(InfogramError::UnsupportedMethod(other.to_string())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header mapping: name to values in wire order
pub type Headers = HashMap<String, Vec<String>>;

/// The outcome of one exchange: status line and headers read eagerly, body
/// left on the wire.
///
/// A connection-level failure is kept here instead of being raised, so the
/// response layer can surface it lazily.
pub struct RawExchange {
    pub(crate) status: std::result::Result<(u16, String), Arc<reqwest::Error>>,
    pub(crate) headers: Headers,
    pub(crate) body: Option<Box<dyn Read + Send>>,
}

impl RawExchange {
    /// Build an exchange from already received parts
    pub fn new(
        status: u16,
        message: impl Into<String>,
        headers: Headers,
        body: impl Read + Send + 'static,
    ) -> Self {
        RawExchange {
            status: Ok((status, message.into())),
            headers,
            body: Some(Box::new(body)),
        }
    }

    /// An exchange that never produced a response
    pub fn failed(error: reqwest::Error) -> Self {
        RawExchange {
            status: Err(Arc::new(error)),
            headers: Headers::new(),
            body: None,
        }
    }

    fn from_response(response: reqwest::blocking::Response) -> Self {
        let status = response.status();
        let message = status.canonical_reason().unwrap_or_default().to_string();

        let mut headers = Headers::new();
        for (name, value) in response.headers() {
            headers
                .entry(name.as_str().to_string())
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }

        RawExchange {
            status: Ok((status.as_u16(), message)),
            headers,
            body: Some(Box::new(response)),
        }
    }

    /// Whether the exchange produced a response at all
    pub fn is_connected(&self) -> bool {
        self.status.is_ok()
    }
}

impl fmt::Debug for RawExchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawExchange")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body", &self.body.as_ref().map(|_| "<stream>"))
            .finish()
    }
}

/// Performs signed requests, one exchange per call.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: Client,
}

impl Dispatcher {
    pub fn new(client: Client) -> Self {
        Dispatcher { client }
    }

    /// Build the wire request for `method`.
    ///
    /// GET and DELETE carry the parameters in the query string; DELETE also
    /// declares a form content type with an empty body. POST and PUT send the
    /// encoded parameters as the whole body.
    pub fn build_request(
        &self,
        method: Method,
        base_url: &str,
        params: &ParameterSet,
    ) -> Result<Request> {
        let encoded = params.encode();
        let form = HeaderValue::from_static(FORM_CONTENT_TYPE);

        let request = match method {
            Method::Get => {
                let url = Url::parse(&format!("{}?{}", base_url, encoded))?;
                self.client.request(method.to_reqwest(), url)
            }
            Method::Delete => {
                let url = Url::parse(&format!("{}?{}", base_url, encoded))?;
                self.client
                    .request(method.to_reqwest(), url)
                    .header(CONTENT_TYPE, form)
            }
            Method::Post | Method::Put => {
                let url = Url::parse(base_url)?;
                self.client
                    .request(method.to_reqwest(), url)
                    .header(CONTENT_TYPE, form)
                    .body(encoded)
            }
        };

        Ok(request.build()?)
    }

    /// Perform exactly one exchange.
    ///
    /// Errors building the request are returned; errors on the wire are
    /// captured in the returned [`RawExchange`].
    pub fn dispatch(
        &self,
        method: Method,
        base_url: &str,
        params: &ParameterSet,
    ) -> Result<RawExchange> {
        let request = self.build_request(method, base_url, params)?;

        let start = Instant::now();
        let exchange = match self.client.execute(request) {
            Ok(response) => {
                tracing::debug!(
                    method = %method,
                    url = %base_url,
                    status = response.status().as_u16(),
                    elapsed = ?start.elapsed(),
                    "request completed"
                );
                RawExchange::from_response(response)
            }
            Err(err) => {
                tracing::warn!(
                    method = %method,
                    url = %base_url,
                    elapsed = ?start.elapsed(),
                    error = %err,
                    "request failed"
                );
                RawExchange::failed(err)
            }
        };

        Ok(exchange)
    }
}
