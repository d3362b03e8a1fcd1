//! JSON REST wrapper: `get`, `post`, `put`, `delete`, `patch`.
//!
//! Combines the stateless `ApiClient` with a `Transport`. Every request runs
//! through the optional request hook before it is sent; every failure is
//! observed (401 and 5xx are logged) and handed back to the caller unchanged.
//! There is no retry and no redirect handling at this layer.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::Transport;

type RequestHook = Box<dyn Fn(&mut HttpRequest) + Send + Sync>;

pub struct RestClient<T> {
    client: ApiClient,
    transport: T,
    request_hook: Option<RequestHook>,
}

impl<T> fmt::Debug for RestClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("client", &self.client)
            .field("request_hook", &self.request_hook.is_some())
            .finish_non_exhaustive()
    }
}

impl<T: Transport> RestClient<T> {
    pub fn new(client: ApiClient, transport: T) -> Self {
        Self {
            client,
            transport,
            request_hook: None,
        }
    }

    /// Install a hook that may rewrite every outgoing request, typically to
    /// attach an `Authorization` header.
    pub fn with_request_hook(
        mut self,
        hook: impl Fn(&mut HttpRequest) + Send + Sync + 'static,
    ) -> Self {
        self.request_hook = Some(Box::new(hook));
        self
    }

    pub fn requests(&self) -> &ApiClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run the request hook and execute the request, returning the raw
    /// response whatever its status.
    pub async fn send(&self, mut request: HttpRequest) -> Result<HttpResponse, ApiError> {
        if let Some(hook) = &self.request_hook {
            hook(&mut request);
        }
        tracing::debug!(method = %request.method, url = %request.path, "sending request");
        self.transport.execute(request).await.inspect_err(observe)
    }

    /// Send `request` and parse a 2xx body into `R`.
    pub async fn execute<R: DeserializeOwned>(&self, request: HttpRequest) -> Result<R, ApiError> {
        let response = self.send(request).await?;
        self.client.parse(response).inspect_err(observe)
    }

    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        self.execute(self.client.build(HttpMethod::Get, path)).await
    }

    pub async fn delete<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        self.execute(self.client.build(HttpMethod::Delete, path)).await
    }

    pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.client.build_with_body(HttpMethod::Post, path, body)?;
        self.execute(request).await
    }

    /// POST without a body.
    pub async fn post_empty<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        self.execute(self.client.build(HttpMethod::Post, path)).await
    }

    pub async fn put<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.client.build_with_body(HttpMethod::Put, path, body)?;
        self.execute(request).await
    }

    pub async fn patch<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.client.build_with_body(HttpMethod::Patch, path, body)?;
        self.execute(request).await
    }
}

fn observe(error: &ApiError) {
    match error.status() {
        Some(401) => tracing::error!("unauthorized request"),
        Some(status) if status >= 500 => {
            tracing::error!(status, detail = ?error.detail(), "server error")
        }
        _ => tracing::debug!(error = %error, "request failed"),
    }
}
