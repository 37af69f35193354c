//! Deferred-result facade over the blocking client.

use tokio::task::JoinHandle;

use crate::api::InfogramApi;
use crate::dispatch::Method;
use crate::error::{InfogramError, Result};
use crate::response::{Response, ResponseShape};

impl InfogramApi {
    /// Queue a request on tokio's blocking pool and return its handle.
    ///
    /// The call runs exactly as [`send_request`](Self::send_request) would on
    /// the calling thread. Must be called from within a tokio runtime.
    pub fn submit<I, K, V>(
        &self,
        method: Method,
        target: impl Into<String>,
        params: I,
        shape: ResponseShape,
    ) -> JoinHandle<Result<Response>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let api = self.clone();
        let target = target.into();
        let params: Vec<(String, String)> = params
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        tokio::task::spawn_blocking(move || api.send_request(method, &target, params, shape))
    }
}

/// Await a submitted request, folding join failures into the error type
pub async fn join(handle: JoinHandle<Result<Response>>) -> Result<Response> {
    handle
        .await
        .map_err(|e| InfogramError::Task(e.to_string()))?
}
