//! HTTP core: envelope handling, auth and tenant headers

use erp_common::ApiResponse;
use parking_lot::RwLock;
use reqwest::{header, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ApiError, Result};

/// Tenant header name
pub const TENANT_HEADER: &str = "X-Tenant-Id";

/// OpenERP API client
///
/// Cheap to clone; clones share the HTTP pool and the bearer token.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    base_url: Url,
    tenant_id: Option<String>,
    token: RwLock<Option<String>>,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/'))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Config(format!("not a base URL: {}", config.base_url)));
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(concat!("erp-sdk/", env!("CARGO_PKG_VERSION"))),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                base_url,
                tenant_id: config.tenant_id,
                token: RwLock::new(config.token),
                http,
            }),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    pub fn token(&self) -> Option<String> {
        self.inner.token.read().clone()
    }

    /// Replace the bearer token for this client and its clones
    pub fn set_token(&self, token: Option<String>) {
        *self.inner.token.write() = token;
    }

    fn url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url> {
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        let mut url = Url::parse(&format!("{}{}", base, path))?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }

    fn builder(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        let mut request = self.inner.http.request(method, url);
        if let Some(token) = self.inner.token.read().as_deref() {
            request = request.bearer_auth(token);
        }
        if let Some(tenant) = &self.inner.tenant_id {
            request = request.header(TENANT_HEADER, tenant);
        }
        request
    }

    /// Send a request and decode the `{success, data?, error?}` envelope
    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<ApiResponse<T>> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status == StatusCode::NO_CONTENT {
            return Ok(ApiResponse { success: true, data: None, error: None });
        }

        match serde_json::from_slice::<ApiResponse<T>>(&body) {
            Ok(envelope) if status.is_success() && envelope.success => Ok(envelope),
            Ok(envelope) => {
                let message = envelope
                    .error
                    .map(|e| e.message().to_string())
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("request rejected").to_string());
                Err(ApiError::Rejected { status: status.as_u16(), message })
            }
            Err(_) if !status.is_success() => Err(ApiError::Status {
                status: status.as_u16(),
                message: String::from_utf8_lossy(&body).chars().take(200).collect(),
            }),
            Err(e) => Err(ApiError::Decode(e)),
        }
    }

    pub(crate) async fn request<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<T> {
        let url = self.url(path, params)?;
        debug!(%method, %url, "api request");
        let mut request = self.builder(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        self.send(request).await?.data.ok_or(ApiError::MissingData)
    }

    /// Like [`request`](Self::request) but ignores the payload
    pub(crate) async fn execute<B: Serialize + ?Sized>(&self, method: Method, path: &str, body: Option<&B>) -> Result<()> {
        let url = self.url(path, &[])?;
        debug!(%method, %url, "api request");
        let mut request = self.builder(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        self.send::<serde_json::Value>(request).await.map(|_| ())
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request::<T, ()>(Method::GET, path, &[], None).await
    }

    pub(crate) async fn get_with<T: DeserializeOwned>(&self, path: &str, params: &[(&str, &str)]) -> Result<T> {
        self.request::<T, ()>(Method::GET, path, params, None).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<T> {
        self.request(Method::POST, path, &[], Some(body)).await
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<T> {
        self.request(Method::PUT, path, &[], Some(body)).await
    }

    pub(crate) async fn send_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T> {
        let url = self.url(path, &[])?;
        debug!(%url, "api upload");
        let request = self.builder(Method::POST, url).multipart(form);
        self.send(request).await?.data.ok_or(ApiError::MissingData)
    }
}
