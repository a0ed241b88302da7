//! Main client implementation.

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::api::ServersApi;
use crate::context::Context;
use crate::error::{ApiError, Error, ErrorPayload, RateLimitError, Result, TransportError};
use crate::query::has_scheme;
use crate::rate::{Rate, RateCache};

/// Registry used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://registry.modelcontextprotocol.io/";

/// Default timeout for the built-in HTTP transport.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const MEDIA_TYPE_JSON: &str = "application/json";

/// Metadata of a completed HTTP exchange.
#[derive(Debug, Clone, Default)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HeaderMap,
    /// Rate-limit state reported with this response.
    pub rate: Rate,
    /// Cursor of the next page; set by list operations, empty otherwise.
    pub next_cursor: String,
}

/// MCP registry API client.
///
/// Cheap to clone; clones share the HTTP transport and rate-limit state.
///
/// # Example
///
/// ```no_run
/// use mcp_registry::{Client, Context};
///
/// # async fn example() -> mcp_registry::Result<()> {
/// let client = Client::builder()
///     .base_url("https://registry.example.com")
///     .build()?;
///
/// let ctx = Context::background();
/// let (server, _) = client
///     .servers()
///     .get_by_name_latest_active_version(&ctx, "ai.waystation/gmail")
///     .await?;
/// if let Some(server) = server {
///     println!("{} {}", server.name, server.version);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
pub(crate) struct ClientInner {
    /// HTTP transport.
    pub(crate) http: reqwest::Client,
    /// Base URL, always ending in `/`.
    pub(crate) base_url: Url,
    /// Sent with every request when non-empty.
    pub(crate) user_agent: String,
    /// `user_agent` as a header value, validated at build time.
    pub(crate) user_agent_header: Option<HeaderValue>,
    /// Last rate-limit state per request path.
    pub(crate) rates: RateCache,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.base_url.as_str())
            .field("user_agent", &self.inner.user_agent)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client for the public registry with default settings.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Get the user agent sent with each request.
    pub fn user_agent(&self) -> &str {
        &self.inner.user_agent
    }

    /// Access the servers API.
    pub fn servers(&self) -> ServersApi {
        ServersApi::new(self.clone())
    }

    /// Last rate-limit state seen for a request path, e.g. `/v0.1/servers`.
    pub fn rate_limit(&self, path: &str) -> Option<Rate> {
        self.inner.rates.get(path)
    }

    /// Snapshot of every recorded rate-limit state, keyed by request path.
    pub fn rate_limits(&self) -> HashMap<String, Rate> {
        self.inner.rates.snapshot()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transport core
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a request for a path relative to the base URL.
    ///
    /// `path` must not start with `/`. When `body` is given it is sent as
    /// JSON. Every request asks for JSON and carries the user agent.
    pub fn new_request<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<reqwest::Request>
    where
        B: Serialize + ?Sized,
    {
        let base = &self.inner.base_url;
        if !base.path().ends_with('/') {
            return Err(Error::config(format!(
                "BaseURL must have a trailing slash, but {:?} does not",
                base.as_str()
            )));
        }
        if path.starts_with('/') {
            return Err(Error::config(format!(
                "request path must be relative, got {:?}",
                path
            )));
        }
        if has_scheme(path) {
            return Err(Error::config(format!(
                "failed to parse request path {:?}: expected a relative path",
                path
            )));
        }
        let url = base.join(path).map_err(|e| {
            Error::config(format!("failed to parse request path {:?}: {}", path, e))
        })?;

        let mut request = reqwest::Request::new(method, url);
        let headers = request.headers_mut();
        headers.insert(ACCEPT, HeaderValue::from_static(MEDIA_TYPE_JSON));
        if let Some(agent) = &self.inner.user_agent_header {
            headers.insert(USER_AGENT, agent.clone());
        }

        if let Some(body) = body {
            let bytes = serde_json::to_vec(body)
                .map_err(|e| Error::config(format!("failed to encode request body: {}", e)))?;
            request
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static(MEDIA_TYPE_JSON));
            *request.body_mut() = Some(bytes.into());
        }

        Ok(request)
    }

    /// Send a request and decode the JSON body into `T`.
    ///
    /// An empty body decodes to `T::default()`. Non-2xx responses become
    /// [`Error::Api`] or, for 429, [`Error::RateLimit`].
    pub async fn execute<T>(
        &self,
        ctx: Option<&Context>,
        request: reqwest::Request,
    ) -> Result<(T, Response)>
    where
        T: DeserializeOwned + Default,
    {
        let (response, body) = self.send(ctx, request).await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok((T::default(), response));
        }
        let value = serde_json::from_slice(&body)?;
        Ok((value, response))
    }

    /// Send a request and copy the raw body into `sink` without decoding.
    pub async fn execute_raw<W>(
        &self,
        ctx: Option<&Context>,
        request: reqwest::Request,
        sink: &mut W,
    ) -> Result<Response>
    where
        W: Write + ?Sized,
    {
        let (response, body) = self.send(ctx, request).await?;
        sink.write_all(&body).map_err(TransportError::from)?;
        Ok(response)
    }

    /// Perform the exchange: honor the context, record the rate state and
    /// classify failures. Returns the raw body of a 2xx response.
    async fn send(
        &self,
        ctx: Option<&Context>,
        request: reqwest::Request,
    ) -> Result<(Response, Vec<u8>)> {
        let ctx = ctx.ok_or_else(|| Error::config("context must be non-nil"))?;
        if let Some(reason) = ctx.err() {
            return Err(reason.into());
        }

        let path = request.url().path().to_string();
        tracing::debug!(
            method = %request.method(),
            url = %request.url(),
            "sending registry request"
        );

        let http_response = tokio::select! {
            biased;
            reason = ctx.done() => return Err(reason.into()),
            result = self.inner.http.execute(request) => match result {
                Ok(response) => response,
                // A canceled context explains the failure better than the transport does.
                Err(e) => return Err(ctx.err().map_or_else(|| e.into(), Error::from)),
            },
        };

        let status = http_response.status();
        let headers = http_response.headers().clone();
        let rate = Rate::from_headers(&headers);
        self.inner.rates.record(&path, rate);

        let body = tokio::select! {
            biased;
            reason = ctx.done() => return Err(reason.into()),
            result = http_response.bytes() => match result {
                Ok(body) => body.to_vec(),
                Err(e) => return Err(ctx.err().map_or_else(|| e.into(), Error::from)),
            },
        };

        tracing::debug!(
            status = status.as_u16(),
            path = %path,
            remaining = rate.remaining,
            "registry response"
        );

        let response = Response {
            status: status.as_u16(),
            headers,
            rate,
            next_cursor: String::new(),
        };
        check_response(status, response, body)
    }
}

/// Turn a non-2xx response into an error; pass 2xx through with its body.
fn check_response(
    status: StatusCode,
    response: Response,
    body: Vec<u8>,
) -> Result<(Response, Vec<u8>)> {
    if status.is_success() {
        return Ok((response, body));
    }

    let payload: ErrorPayload = serde_json::from_slice(&body).unwrap_or_default();
    let message = if !payload.message.is_empty() {
        payload.message
    } else {
        let text = String::from_utf8_lossy(&body).trim().to_string();
        if !text.is_empty() {
            text
        } else {
            status
                .canonical_reason()
                .map_or_else(|| format!("HTTP {}", status.as_u16()), str::to_string)
        }
    };

    if status == StatusCode::TOO_MANY_REQUESTS {
        tracing::warn!(
            limit = response.rate.limit,
            remaining = response.rate.remaining,
            reset = ?response.rate.reset,
            "registry rate limit exceeded"
        );
        return Err(Error::RateLimit(RateLimitError {
            rate: response.rate,
            response,
            message,
        }));
    }

    Err(Error::Api(ApiError {
        response,
        message,
        errors: payload.errors,
    }))
}

/// Validate and normalize a base URL.
///
/// The URL must be non-empty, parse, and use `http` or `https`. A `/` is
/// appended to its path when missing.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    if raw.is_empty() {
        return Err(Error::config("base URL cannot be empty"));
    }
    let mut url =
        Url::parse(raw).map_err(|e| Error::config(format!("invalid base URL: {}", e)))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(Error::config(format!(
            "base URL must use HTTP or HTTPS scheme, got: {}",
            url.scheme()
        )));
    }
    if !url.path().ends_with('/') {
        url.set_path(&format!("{}/", url.path()));
    }
    Ok(url)
}

/// Builder for creating a [`Client`].
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Option<String>,
    http: Option<reqwest::Client>,
    timeout: Duration,
    user_agent: Option<String>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            http: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
        }
    }

    /// Set the base URL of the registry.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Use a caller-configured HTTP transport instead of the default one.
    ///
    /// The builder's timeout does not apply to a custom transport.
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Set the timeout of the default HTTP transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<Client> {
        let base_url = parse_base_url(self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))?;

        let http = match self.http {
            Some(http) => http,
            None => reqwest::Client::builder()
                .timeout(self.timeout)
                .build()
                .map_err(|e| Error::config(format!("failed to build HTTP client: {}", e)))?,
        };

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("mcp-registry/{}", env!("CARGO_PKG_VERSION")));
        let user_agent_header = user_agent_header(&user_agent)?;

        Ok(Client {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                user_agent,
                user_agent_header,
                rates: RateCache::default(),
            }),
        })
    }
}

fn user_agent_header(agent: &str) -> Result<Option<HeaderValue>> {
    if agent.is_empty() {
        return Ok(None);
    }
    HeaderValue::from_str(agent)
        .map(Some)
        .map_err(|_| Error::config(format!("invalid user agent {:?}", agent)))
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
