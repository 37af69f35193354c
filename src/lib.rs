//! # infogram - signed REST client for the Infogram API
//!
//! A blocking Rust client that authenticates every call with an HMAC
//! signature over the request parameters and hands back responses whose
//! bodies are read lazily, in the shape the caller asks for.
//!
//! ## Features
//!
//! - Canonical parameter encoding (`%20` for spaces, stable key ordering)
//! - HMAC-SHA1 request signing with `api_key`/`api_sig` parameters
//! - Verb-specific placement of parameters (query string or form body)
//! - Typed responses: JSON text, binary payloads, empty, raw stream
//! - Optional deferred-result facade on tokio's blocking pool (`async` feature)
//!
//! ## Basic Usage
//!
//! ```no_run
//! use infogram::{HttpResponse, InfogramApi, Method, ResponseShape};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = InfogramApi::new("api_key", "api_secret")?;
//!
//!     let mut response = api
//!         .send_request(
//!             Method::Post,
//!             "infographics",
//!             [("content", "[]"), ("theme_id", "7")],
//!             ResponseShape::Json,
//!         )?
//!         .into_json()?;
//!
//!     println!("{} {}", response.status_code()?, response.body()?);
//!     Ok(())
//! }
//! ```
//!
//! ## Response bodies
//!
//! Status and headers are captured when the response arrives. The body is
//! read on first access and only once: JSON text and binary payloads are
//! cached after that, a raw stream can only be taken a single time.
//!
//! ```no_run
//! use infogram::{InfogramApi, Method, ResponseShape};
//!
//! let api = InfogramApi::new("api_key", "api_secret")?;
//! let mut png = api
//!     .send_request(
//!         Method::Get,
//!         "infographics/42",
//!         [("format", "png")],
//!         ResponseShape::Binary,
//!     )?
//!     .into_binary()?;
//!
//! std::fs::write("infographic.png", png.graphic()?)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod api;
pub mod apikey;
pub mod client;
pub mod dispatch;
pub mod error;
pub mod params;
pub mod response;
pub mod signature;
#[cfg(feature = "async")]
pub mod task;

// Re-export main types for convenience
pub use api::InfogramApi;
pub use apikey::ApiKey;
pub use client::Config;
pub use dispatch::{Dispatcher, Headers, Method, RawExchange};
pub use error::{InfogramError, Result};
pub use params::{Parameter, ParameterSet};
pub use response::{
    BinaryResponse, EmptyResponse, HttpResponse, JsonResponse, Response, ResponseShape,
    StreamResponse,
};
pub use signature::{SignatureAlgorithm, Signer};
