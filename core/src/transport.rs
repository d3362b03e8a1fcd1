//! Executing `HttpRequest`s against the network.
//!
//! `Transport` is the I/O seam: the rest of the crate only builds and parses
//! plain-data requests and responses. `UreqTransport` is the production
//! implementation; tests substitute in-memory fakes.

use std::future::Future;
use std::time::Duration;

use crate::config::DEFAULT_TIMEOUT;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Performs one HTTP round-trip.
///
/// Non-2xx statuses are returned as data, not errors. Only failures where no
/// response arrived (connection errors, timeouts) map to
/// `ApiError::Transport`.
pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest)
        -> impl Future<Output = Result<HttpResponse, ApiError>> + Send;
}

/// Blocking `ureq` agent driven from a tokio blocking thread.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    timeout: Duration,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl Transport for UreqTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let agent = self.agent.clone();
        let timeout = self.timeout;
        tokio::task::spawn_blocking(move || execute_blocking(&agent, request, timeout))
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?
    }
}

fn execute_blocking(
    agent: &ureq::Agent,
    req: HttpRequest,
    timeout: Duration,
) -> Result<HttpResponse, ApiError> {
    let url = req.path.as_str();
    let result = match req.method {
        HttpMethod::Get => with_headers(agent.get(url), &req.headers).call(),
        HttpMethod::Delete => with_headers(agent.delete(url), &req.headers).call(),
        HttpMethod::Head => with_headers(agent.head(url), &req.headers).call(),
        HttpMethod::Options => with_headers(agent.options(url), &req.headers).call(),
        HttpMethod::Post => send(with_headers(agent.post(url), &req.headers), req.body.as_deref()),
        HttpMethod::Put => send(with_headers(agent.put(url), &req.headers), req.body.as_deref()),
        HttpMethod::Patch => send(with_headers(agent.patch(url), &req.headers), req.body.as_deref()),
    };

    let mut response = result.map_err(|e| match e {
        ureq::Error::Timeout(_) => {
            ApiError::Transport(format!("timeout of {}ms exceeded", timeout.as_millis()))
        }
        other => ApiError::Transport(other.to_string()),
    })?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|e| ApiError::Transport(e.to_string()))?;

    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send(
    builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
    body: Option<&str>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}
