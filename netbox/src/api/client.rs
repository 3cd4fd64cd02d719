use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use super::common::{ApiQueryParams, PaginatedResponse};
use super::error::ApiError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// NetBox REST API client
///
/// Cheap to clone; every clone shares one connection pool.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: String,
    auth_header: String,
}

impl Client {
    /// Create a new API client with the default request timeout
    pub fn new(endpoint: &str, api_token: &str, insecure: bool) -> Result<Self, ApiError> {
        Self::with_timeout(endpoint, api_token, insecure, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        endpoint: &str,
        api_token: &str,
        insecure: bool,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let parsed = url::Url::parse(endpoint)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", endpoint, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl(format!(
                "{}: scheme must be http or https",
                endpoint
            )));
        }

        let http_client = reqwest::Client::builder()
            .danger_accept_invalid_certs(insecure)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url: endpoint.trim_end_matches('/').to_string(),
                auth_header: format!("Token {}", api_token),
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// DCIM API operations
    pub fn dcim(&self) -> crate::api::dcim::DcimApi<'_> {
        crate::api::dcim::DcimApi::new(self)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        let response = self.send(Method::GET, &url, path, None::<&()>).await?;
        Self::parse(response).await
    }

    /// Execute a GET request with query parameters
    pub async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &ApiQueryParams,
    ) -> Result<T, ApiError> {
        let full_path = format!("{}{}", path, params.to_query_string());
        self.get(&full_path).await
    }

    /// Fetch one page of a list endpoint
    pub async fn list_page<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &ApiQueryParams,
    ) -> Result<PaginatedResponse<T>, ApiError> {
        self.get_with_params(path, params).await
    }

    /// Follow `next` links until the listing is exhausted
    ///
    /// `count` is taken from the first page; remote order is preserved.
    /// A `next` link already fetched ends the walk.
    pub async fn list_all<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &ApiQueryParams,
    ) -> Result<PaginatedResponse<T>, ApiError> {
        let base = url::Url::parse(&self.inner.base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", self.inner.base_url, e)))?;
        let first: PaginatedResponse<T> = self.list_page(path, params).await?;
        let count = first.count;
        let mut results = first.results;
        let mut next = first.next;
        let mut seen = HashSet::new();

        while let Some(next_url) = next {
            // relative links already carry any path prefix the endpoint has
            let url = base
                .join(&next_url)
                .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", next_url, e)))?
                .to_string();
            if !seen.insert(url.clone()) {
                tracing::warn!("Pagination link repeated, stopping at {}", url);
                break;
            }
            tracing::debug!("Fetching page: {}", url);

            let response = self.send(Method::GET, &url, path, None::<&()>).await?;
            let page: PaginatedResponse<T> = Self::parse(response).await?;
            results.extend(page.results);
            next = page.next;
        }

        Ok(PaginatedResponse {
            count,
            next: None,
            previous: None,
            results,
        })
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let response = self.send(Method::POST, &url, path, Some(body)).await?;
        Self::parse(response).await
    }

    /// Partial update; only the fields present in `body` change
    pub async fn patch<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let response = self.send(Method::PATCH, &url, path, Some(body)).await?;
        Self::parse(response).await
    }

    /// NetBox answers 204 with no body on success
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = self.url(path);
        self.send(Method::DELETE, &url, path, None::<&()>).await?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.inner.base_url, path)
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        path: &str,
        body: Option<&B>,
    ) -> Result<reqwest::Response, ApiError> {
        tracing::debug!("{} request to: {}", method, url);

        let mut request = self
            .inner
            .http_client
            .request(method, url)
            .header(AUTHORIZATION, &self.inner.auth_header)
            .header(ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("Response status: {}", status);

        if status.is_success() {
            return Ok(response);
        }

        match status {
            StatusCode::NOT_FOUND => Err(ApiError::NotFound {
                path: path.to_string(),
            }),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ApiError::Auth {
                status: status.as_u16(),
            }),
            _ => {
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                tracing::error!("API error response: {}", message);
                Err(ApiError::Api {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let text = response.text().await?;
        tracing::trace!("API response body: {}", text);

        serde_json::from_str::<T>(&text).map_err(|e| {
            tracing::error!("Failed to deserialize response: {}, body: {}", e, text);
            ApiError::Parse(format!(
                "{} - response (first 500 chars): {}",
                e,
                text.chars().take(500).collect::<String>()
            ))
        })
    }
}
