pub mod cancel;
pub mod error;
pub mod request;

use std::sync::Arc;

use reqwest::{
    header::{HeaderValue, AUTHORIZATION},
    multipart, Client, StatusCode, Url,
};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::Config;

pub use self::{
    cancel::CancelableRequest,
    error::{ApiError, HttpValidationError, LocItem, ValidationBody, ValidationErrorItem},
    request::{ApiRequest, FilePart, RequestBody},
};

/// Thin REST client: resolves [`ApiRequest`] descriptors against the
/// configured base URL, attaches the bearer token and maps failures to
/// [`ApiError`].
///
/// Cloning is cheap; clones share the connection pool and the token.
#[derive(Debug, Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    http: Client,
    base_url: Url,
    token: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(config.request_timeout()).build()?;
        Self::with_http(http, &config.api_base_url, config.api_token.clone())
    }

    /// Client without a timeout or token, mostly for tests and tooling.
    pub fn from_base_url(base_url: &str) -> Result<Self, ApiError> {
        Self::with_http(Client::new(), base_url, None)
    }

    fn with_http(http: Client, base_url: &str, token: Option<String>) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::InvalidRequest(format!("invalid base URL {base_url:?}: {e}")))?;
        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url,
                token: RwLock::new(token),
            }),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Replace the bearer token used by every subsequent request.
    pub async fn set_token(&self, token: Option<String>) {
        *self.inner.token.write().await = token;
    }

    pub async fn token(&self) -> Option<String> {
        self.inner.token.read().await.clone()
    }

    /// Perform `req` and decode the JSON response body.
    pub async fn request<T: DeserializeOwned>(&self, req: ApiRequest) -> Result<T, ApiError> {
        let (url, bytes) = self.execute(req).await?;
        serde_json::from_slice(&bytes).map_err(|source| {
            warn!(url = %url, error = %source, "Failed to decode response body");
            ApiError::Decode { url, source }
        })
    }

    /// Perform `req` and return the response body as text (HTML endpoints).
    pub async fn request_text(&self, req: ApiRequest) -> Result<String, ApiError> {
        let (_, bytes) = self.execute(req).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Spawn `req` on its own task and return a cancelable handle to it.
    pub fn send<T>(&self, req: ApiRequest) -> CancelableRequest<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let client = self.clone();
        CancelableRequest::spawn(async move { client.request(req).await })
    }

    async fn execute(&self, mut req: ApiRequest) -> Result<(String, Vec<u8>), ApiError> {
        let url = req.resolve_url(&self.inner.base_url)?;
        let url_str = url.to_string();
        debug!(method = %req.method(), url = %url_str, media_type = ?req.media_type(), "Sending request");

        let mut builder = self.inner.http.request(req.method().clone(), url);
        if let Some(token) = self.token().await {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ApiError::InvalidRequest("token is not a valid header value".into()))?;
            builder = builder.header(AUTHORIZATION, value);
        }

        builder = match req.take_body() {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(&body),
            RequestBody::Form(fields) => builder.form(&fields),
            RequestBody::Multipart(parts) => {
                let mut form = multipart::Form::new();
                for part in parts {
                    let file = multipart::Part::bytes(part.bytes)
                        .file_name(part.file_name)
                        .mime_str(&part.content_type)?;
                    form = form.part(part.field, file);
                }
                builder.multipart(form)
            }
        };

        let response = builder.send().await.map_err(|e| {
            warn!(url = %url_str, error = %e, "Request failed");
            ApiError::from(e)
        })?;
        let status = response.status();
        let bytes = response.bytes().await?.to_vec();

        if status.is_success() {
            debug!(url = %url_str, status = status.as_u16(), bytes = bytes.len(), "Request succeeded");
            return Ok((url_str, bytes));
        }

        let body = serde_json::from_slice::<serde_json::Value>(&bytes).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())
        });
        warn!(url = %url_str, status = status.as_u16(), "Backend returned error status");

        if status == StatusCode::UNPROCESSABLE_ENTITY {
            return Err(ApiError::Validation {
                url: url_str,
                body: ValidationBody::from_json(body),
            });
        }

        Err(ApiError::Status {
            status: status.as_u16(),
            description: req
                .description_for(status.as_u16())
                .or_else(|| status.canonical_reason())
                .map(str::to_owned),
            url: url_str,
            body,
        })
    }
}
