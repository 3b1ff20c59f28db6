// GitHub HTTP client.
// Handles request building, rate limit tracking, and status checking.

use std::sync::Mutex;
use std::time::Duration;

use reqwest::{
    Client, Response, StatusCode, Url,
    header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT},
};

use crate::error::{DocsError, Result};

use super::types::RateLimit;

const GITHUB_API_VERSION: &str = "2022-11-28";

/// Unauthenticated client for the GitHub contents API and raw-content host.
pub struct GitHubClient {
    client: Client,
    api_base: Url,
    raw_base: Url,
    rate_limit: Mutex<RateLimit>,
}

impl GitHubClient {
    /// Create a client against the given API and raw-content base URLs.
    pub fn new(api_base: &str, raw_base: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("docview-tui"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(DocsError::Network)?;

        Ok(Self {
            client,
            api_base: parse_base(api_base)?,
            raw_base: parse_base(raw_base)?,
            rate_limit: Mutex::new(RateLimit::default()),
        })
    }

    /// Get the most recent rate limit information.
    pub fn rate_limit(&self) -> RateLimit {
        self.rate_limit
            .lock()
            .map(|limit| *limit)
            .unwrap_or_default()
    }

    /// URL under the API base built from path segments (each segment is escaped).
    pub fn api_url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        join_segments(&self.api_base, segments)
    }

    /// URL under the raw-content base built from path segments.
    pub fn raw_url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        join_segments(&self.raw_base, segments)
    }

    /// Make a GET request with query parameters.
    pub async fn get_with_params<T: serde::Serialize + ?Sized>(
        &self,
        url: Url,
        params: &T,
    ) -> Result<Response> {
        tracing::debug!(%url, "GET");
        let response = self.client.get(url).query(params).send().await?;
        self.handle_response(response).await
    }

    /// Make a GET request.
    pub async fn get(&self, url: Url) -> Result<Response> {
        tracing::debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        self.handle_response(response).await
    }

    /// Record rate limit headers, then map the status.
    async fn handle_response(&self, response: Response) -> Result<Response> {
        self.update_rate_limit(&response);
        self.check_response(response).await
    }

    /// Update rate limit from response headers.
    fn update_rate_limit(&self, response: &Response) {
        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
        };

        let Ok(mut rate_limit) = self.rate_limit.lock() else {
            return;
        };
        if let Some(limit) = header("x-ratelimit-limit") {
            rate_limit.limit = limit;
        }
        if let Some(remaining) = header("x-ratelimit-remaining") {
            rate_limit.remaining = remaining;
        }
        if let Some(reset) = header("x-ratelimit-reset") {
            rate_limit.reset = reset;
        }
    }

    /// Check response status and convert errors.
    async fn check_response(&self, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            let rate_limit = self.rate_limit();
            if rate_limit.is_known() && rate_limit.remaining == 0 {
                let reset_at = chrono::DateTime::from_timestamp(rate_limit.reset as i64, 0)
                    .map(|dt| {
                        dt.with_timezone(&chrono::Local)
                            .format("%H:%M:%S")
                            .to_string()
                    })
                    .unwrap_or_else(|| "unknown".to_string());
                tracing::warn!(%url, %reset_at, "rate limited");
                return Err(DocsError::RateLimited { reset_at });
            }
        }

        tracing::warn!(%url, status = status.as_u16(), "request failed");
        Err(DocsError::RemoteUnavailable {
            url,
            status: status.as_u16(),
        })
    }
}

fn parse_base(base: &str) -> Result<Url> {
    Url::parse(base).map_err(|e| DocsError::Config(format!("invalid base URL '{}': {}", base, e)))
}

fn join_segments<'a>(base: &Url, segments: impl IntoIterator<Item = &'a str>) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty();
        path.extend(segments.into_iter().filter(|s| !s.is_empty()));
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GitHubClient {
        GitHubClient::new(
            "https://api.github.com",
            "https://raw.githubusercontent.com/",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_api_url_segments() {
        let client = client();
        let url = client.api_url(["repos", "clovalink", "clovalink", "contents", "docs"]);
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/clovalink/clovalink/contents/docs"
        );
    }

    #[test]
    fn test_raw_url_escapes_segments() {
        let client = client();
        let url = client.raw_url(["o", "r", "main", "docs", "API Reference.md"]);
        assert_eq!(
            url.as_str(),
            "https://raw.githubusercontent.com/o/r/main/docs/API%20Reference.md"
        );
    }

    #[test]
    fn test_empty_segments_skipped() {
        let client = client();
        let url = client.raw_url(["o", "r", "main", "", "Home.md"]);
        assert_eq!(url.as_str(), "https://raw.githubusercontent.com/o/r/main/Home.md");
    }

    #[test]
    fn test_invalid_base_rejected() {
        let result = GitHubClient::new("not a url", "https://raw.githubusercontent.com", Duration::from_secs(5));
        assert!(matches!(result, Err(DocsError::Config(_))));
    }

    #[test]
    fn test_rate_limit_starts_unknown() {
        assert!(!client().rate_limit().is_known());
    }

    fn response(status: u16, headers: &[(&str, &str)]) -> Response {
        let mut builder = http::Response::builder().status(status);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        Response::from(builder.body("").unwrap())
    }

    const EXHAUSTED: [(&str, &str); 3] = [
        ("x-ratelimit-limit", "60"),
        ("x-ratelimit-remaining", "0"),
        ("x-ratelimit-reset", "1700000000"),
    ];

    #[tokio::test]
    async fn test_success_records_rate_limit() {
        let client = client();
        let result = client
            .handle_response(response(
                200,
                &[
                    ("x-ratelimit-limit", "60"),
                    ("x-ratelimit-remaining", "42"),
                    ("x-ratelimit-reset", "1700000000"),
                ],
            ))
            .await;

        assert!(result.is_ok());
        assert_eq!(
            client.rate_limit(),
            RateLimit {
                limit: 60,
                remaining: 42,
                reset: 1_700_000_000,
            }
        );
    }

    #[tokio::test]
    async fn test_server_error_is_remote_unavailable() {
        let client = client();
        let err = client.handle_response(response(500, &[])).await.unwrap_err();

        assert!(matches!(err, DocsError::RemoteUnavailable { status: 500, .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_exhausted_quota_is_rate_limited() {
        for status in [403, 429] {
            let client = client();
            let err = client
                .handle_response(response(status, &EXHAUSTED))
                .await
                .unwrap_err();

            match &err {
                DocsError::RateLimited { reset_at } => assert_eq!(reset_at.len(), 8),
                other => panic!("expected RateLimited for {}, got {:?}", status, other),
            }
            assert!(err.is_retryable());
            assert_eq!(client.rate_limit().remaining, 0);
        }
    }

    #[tokio::test]
    async fn test_forbidden_with_quota_left_is_remote_unavailable() {
        let client = client();
        let err = client
            .handle_response(response(
                403,
                &[("x-ratelimit-limit", "60"), ("x-ratelimit-remaining", "12")],
            ))
            .await
            .unwrap_err();

        assert!(matches!(err, DocsError::RemoteUnavailable { status: 403, .. }));
    }
}
