//! Low-level HTTP client for the movie catalog API.
//!
//! [`HttpClient`] sends one [`ApiRequest`] and classifies the outcome. It
//! knows nothing about refreshing tokens; see
//! [`AuthenticatedClient`](crate::AuthenticatedClient) for that.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap};
use reqwest::{Method, multipart};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, trace};

use marquee_core::error::{ApiError, DecodeError, Error, InvalidInputError, TransportError};
use marquee_core::{AccessToken, ApiUrl, Result};

/// Header the tunnelling proxy in front of the backend requires on every
/// request. Its value is always `"true"`.
pub const PASSTHROUGH_HEADER: &str = "ngrok-skip-browser-warning";

/// Connection settings for the backend.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: ApiUrl,
    pub user_agent: String,
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: ApiUrl) -> Self {
        Self {
            base_url,
            user_agent: concat!("marquee/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Some(Duration::from_secs(30)),
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// An immutable description of one API call.
///
/// Requests are replayed verbatim after a token refresh, so everything
/// needed to rebuild them lives here.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Option<Value>,
    body: RequestBody,
}

#[derive(Debug, Clone)]
enum RequestBody {
    Empty,
    Json(Value),
    Image(ImageUpload),
}

/// An image file to send as a multipart form.
#[derive(Clone)]
pub struct ImageUpload {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("field", &self.field)
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach query parameters. `T` must serialize to a flat object.
    pub fn query<T: Serialize>(mut self, params: &T) -> Result<Self> {
        self.query = Some(encode(params)?);
        Ok(self)
    }

    /// Attach a JSON body.
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        self.body = RequestBody::Json(encode(body)?);
        Ok(self)
    }

    /// Attach a multipart image upload.
    pub fn image(mut self, upload: ImageUpload) -> Self {
        self.body = RequestBody::Image(upload);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| {
        InvalidInputError::Other {
            message: format!("cannot encode request: {e}"),
        }
        .into()
    })
}

/// A successful (2xx) response with its body read.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Returns a header value, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Parse the body as JSON. An empty body parses as `null`.
    pub fn value(&self) -> Result<Value> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&self.body).map_err(DecodeError::Json)?)
    }

    /// Parse the body into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body).map_err(DecodeError::Json)?)
    }
}

/// HTTP client bound to one backend.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: ApiUrl,
}

impl HttpClient {
    /// Create a new client for the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(transport)?;

        Ok(Self {
            client,
            base_url: config.base_url,
        })
    }

    /// Returns the base URL this client is configured for.
    pub fn base_url(&self) -> &ApiUrl {
        &self.base_url
    }

    /// Send a request, stamped with `token` if one is given.
    ///
    /// Non-2xx responses become [`Error::Auth`] for 401/403 and
    /// [`Error::Server`] otherwise.
    #[instrument(
        skip(self, request, token),
        fields(method = %request.method, path = %request.path)
    )]
    pub async fn execute(
        &self,
        request: &ApiRequest,
        token: Option<&AccessToken>,
    ) -> Result<ApiResponse> {
        let url = self.base_url.endpoint(&request.path);
        debug!(authenticated = token.is_some(), "API request");

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .header(PASSTHROUGH_HEADER, "true");

        if self.base_url.is_tunnel() {
            builder = builder.query(&[(PASSTHROUGH_HEADER, "true")]);
        }
        if let Some(ref query) = request.query {
            trace!(?query, "query parameters");
            builder = builder.query(query);
        }
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, token.bearer());
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(body),
            RequestBody::Image(upload) => builder.multipart(form(upload)?),
        };

        let response = builder.send().await.map_err(transport)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(transport)?.to_vec();
        trace!(status = %status, "API response");

        if status.is_success() {
            Ok(ApiResponse {
                status: status.as_u16(),
                headers,
                body,
            })
        } else {
            Err(Error::from_status(parse_error(status.as_u16(), &body)))
        }
    }
}

fn form(upload: &ImageUpload) -> Result<multipart::Form> {
    let part = multipart::Part::bytes(upload.bytes.clone())
        .file_name(upload.file_name.clone())
        .mime_str(&upload.content_type)
        .map_err(|e| InvalidInputError::Other {
            message: format!("invalid content type '{}': {e}", upload.content_type),
        })?;
    Ok(multipart::Form::new().part(upload.field.clone(), part))
}

/// Pull a message out of an error body, if it has one.
fn parse_error(status: u16, body: &[u8]) -> ApiError {
    let message = serde_json::from_slice::<Value>(body).ok().and_then(|v| {
        ["message", "error"]
            .iter()
            .find_map(|k| v.get(k).and_then(Value::as_str).map(str::to_string))
    });
    ApiError::new(status, message)
}

/// Map a reqwest failure onto the transport taxonomy.
pub(crate) fn transport(err: reqwest::Error) -> Error {
    let err = if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    Error::Transport(err)
}
