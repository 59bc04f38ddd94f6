//! HTTP client for the SharePoint REST API.
//!
//! [`HttpExecutor`] is the boundary every network-touching operation in
//! this crate is written against; [`SharePointRestClient`] is the
//! `reqwest`-backed implementation with automatic Bearer-token
//! injection, OData headers, and retry logic with exponential back-off
//! for 429 / 503 / 504.

use crate::error::{SharePointError, SharePointErrorCode, SharePointResult};
use crate::types::SharePointConfig;
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use std::future::Future;
use std::time::Duration;

/// Accept header used for all JSON reads; the minimal-metadata shape is
/// what the page document types are written against.
pub const ODATA_ACCEPT: &str = "application/json;odata=minimalmetadata";

/// Content type for request bodies carrying a `__metadata` type stamp.
pub const ODATA_CONTENT_TYPE: &str = "application/json;odata=verbose";

/// The HTTP capability consumed by page and batch operations.
///
/// `path` is either relative to the configured web
/// (e.g. `_api/sitepages/pages(4)`) or a full `https://` URL, which is
/// passed through unchanged.
pub trait HttpExecutor {
    /// GET with optional query parameters.
    fn get(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> impl Future<Output = SharePointResult<serde_json::Value>> + Send;

    /// POST a JSON body.
    fn post(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> impl Future<Output = SharePointResult<serde_json::Value>> + Send;

    /// POST a JSON body with extra request headers (e.g. `IF-MATCH`).
    fn post_with_headers(
        &self,
        path: &str,
        body: &serde_json::Value,
        headers: &[(&str, &str)],
    ) -> impl Future<Output = SharePointResult<serde_json::Value>> + Send;

    /// POST with an empty body (actions).
    fn post_empty(
        &self,
        path: &str,
    ) -> impl Future<Output = SharePointResult<serde_json::Value>> + Send;

    /// POST a raw (non-JSON) body, returning the raw response text.
    /// Used by the `$batch` transport.
    fn post_raw(
        &self,
        path: &str,
        body: String,
        content_type: &str,
    ) -> impl Future<Output = SharePointResult<String>> + Send;

    /// PATCH a JSON body.
    fn patch(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> impl Future<Output = SharePointResult<serde_json::Value>> + Send;

    /// DELETE a resource.
    fn delete(&self, path: &str) -> impl Future<Output = SharePointResult<serde_json::Value>> + Send;

    /// Full URL for a REST endpoint path.
    fn url(&self, path: &str) -> String;
}

/// Low-level SharePoint REST client.
#[derive(Debug, Clone)]
pub struct SharePointRestClient {
    inner: reqwest::Client,
    web_url: String,
    access_token: String,
    max_retries: u32,
}

impl SharePointRestClient {
    /// Create a new REST client bound to the configured web.
    pub fn new(config: &SharePointConfig, access_token: &str) -> SharePointResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ODATA_ACCEPT));

        let inner = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_sec))
            .default_headers(headers)
            .build()
            .map_err(|e| SharePointError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            inner,
            web_url: config.web_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
            max_retries: config.max_retries,
        })
    }

    /// Update the access token (after a refresh).
    pub fn set_access_token(&mut self, token: &str) {
        self.access_token = token.to_string();
    }

    /// The web URL this client is bound to.
    pub fn web_url(&self) -> &str {
        &self.web_url
    }

    // ─── Internal ────────────────────────────────────────────────────

    async fn request_with_retry(
        &self,
        build: impl Fn() -> reqwest::RequestBuilder,
    ) -> SharePointResult<serde_json::Value> {
        let mut last_err = SharePointError::internal("No attempts made");

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_millis(500 * 2u64.pow(attempt - 1));
                warn!("Retry {}/{} after {:?}", attempt, self.max_retries, delay);
                tokio::time::sleep(delay).await;
            }

            match build().send().await {
                Ok(resp) => match self.handle_response(resp).await {
                    Ok(v) => return Ok(v),
                    Err(e) if Self::is_retryable(&e) && attempt < self.max_retries => {
                        last_err = e;
                        continue;
                    }
                    Err(e) => return Err(e),
                },
                Err(e) => {
                    last_err = SharePointError::from(e);
                    if attempt < self.max_retries {
                        continue;
                    }
                }
            }
        }

        Err(last_err)
    }

    async fn handle_response(
        &self,
        resp: reqwest::Response,
    ) -> SharePointResult<serde_json::Value> {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();

        debug!("Response status={} body_len={}", status, body.len());

        if status >= 400 {
            return Err(SharePointError::from_rest_response(status, &body));
        }

        // 204 No Content — return null.
        if body.is_empty() {
            return Ok(serde_json::Value::Null);
        }

        serde_json::from_str(&body).map_err(SharePointError::from)
    }

    fn is_retryable(err: &SharePointError) -> bool {
        matches!(
            err.code,
            SharePointErrorCode::RateLimited
                | SharePointErrorCode::NetworkError
                | SharePointErrorCode::InternalError
        )
    }
}

impl HttpExecutor for SharePointRestClient {
    async fn get(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> SharePointResult<serde_json::Value> {
        let url = self.url(path);
        debug!("GET {}", url);
        self.request_with_retry(|| {
            self.inner
                .get(&url)
                .bearer_auth(&self.access_token)
                .query(query)
        })
        .await
    }

    async fn post(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> SharePointResult<serde_json::Value> {
        self.post_with_headers(path, body, &[]).await
    }

    async fn post_with_headers(
        &self,
        path: &str,
        body: &serde_json::Value,
        headers: &[(&str, &str)],
    ) -> SharePointResult<serde_json::Value> {
        let url = self.url(path);
        debug!("POST {}", url);
        let payload = body.to_string();
        self.request_with_retry(|| {
            let mut req = self
                .inner
                .post(&url)
                .bearer_auth(&self.access_token)
                .header(CONTENT_TYPE, ODATA_CONTENT_TYPE)
                .body(payload.clone());
            for (k, v) in headers {
                req = req.header(*k, *v);
            }
            req
        })
        .await
    }

    async fn post_empty(&self, path: &str) -> SharePointResult<serde_json::Value> {
        let url = self.url(path);
        debug!("POST (empty) {}", url);
        self.request_with_retry(|| {
            self.inner
                .post(&url)
                .bearer_auth(&self.access_token)
                .header(CONTENT_TYPE, ODATA_CONTENT_TYPE)
                .body("")
        })
        .await
    }

    async fn post_raw(
        &self,
        path: &str,
        body: String,
        content_type: &str,
    ) -> SharePointResult<String> {
        let url = self.url(path);
        debug!("POST (raw) {} ({} bytes)", url, body.len());

        let resp = self
            .inner
            .post(&url)
            .bearer_auth(&self.access_token)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await
            .map_err(SharePointError::from)?;

        let status = resp.status().as_u16();
        let text = resp.text().await.unwrap_or_default();
        if status >= 400 {
            return Err(SharePointError::from_rest_response(status, &text));
        }
        Ok(text)
    }

    async fn patch(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> SharePointResult<serde_json::Value> {
        let url = self.url(path);
        debug!("PATCH {}", url);
        let payload = body.to_string();
        self.request_with_retry(|| {
            self.inner
                .patch(&url)
                .bearer_auth(&self.access_token)
                .header(CONTENT_TYPE, ODATA_CONTENT_TYPE)
                .body(payload.clone())
        })
        .await
    }

    async fn delete(&self, path: &str) -> SharePointResult<serde_json::Value> {
        let url = self.url(path);
        debug!("DELETE {}", url);
        self.request_with_retry(|| {
            self.inner
                .delete(&url)
                .bearer_auth(&self.access_token)
                .header("IF-MATCH", "*")
        })
        .await
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.web_url, path.trim_start_matches('/'))
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> SharePointRestClient {
        let config = SharePointConfig::new("https://contoso.sharepoint.com/sites/dev/");
        SharePointRestClient::new(&config, "tok").unwrap()
    }

    #[test]
    fn test_url_building() {
        let client = test_client();
        assert_eq!(
            client.url("/_api/sitepages/pages(4)"),
            "https://contoso.sharepoint.com/sites/dev/_api/sitepages/pages(4)"
        );
        assert_eq!(
            client.url("_api/web"),
            "https://contoso.sharepoint.com/sites/dev/_api/web"
        );
        assert_eq!(
            client.url("https://contoso.sharepoint.com/sites/other/_api/web"),
            "https://contoso.sharepoint.com/sites/other/_api/web"
        );
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = test_client();
        assert_eq!(client.web_url(), "https://contoso.sharepoint.com/sites/dev");
    }

    #[test]
    fn test_is_retryable() {
        assert!(SharePointRestClient::is_retryable(&SharePointError::network("timeout")));
        assert!(SharePointRestClient::is_retryable(&SharePointError::internal("500")));
        assert!(!SharePointRestClient::is_retryable(&SharePointError::not_found("nope")));
        assert!(!SharePointRestClient::is_retryable(&SharePointError::page_not_saved()));
    }

    #[test]
    fn test_set_access_token() {
        let mut client = test_client();
        assert_eq!(client.access_token, "tok");
        client.set_access_token("new");
        assert_eq!(client.access_token, "new");
    }
}
