//! Browser-emulating HTTP fetcher shared by every network-touching component.

use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};

use crate::error::ScraperError;

/// Alternate UA sent on the single retry after a challenge page.
pub(crate) const BROWSER_FALLBACK_UA: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

const CHALLENGE_MARKER: &str = "Just a moment";

/// Status code and body of a completed request.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

impl FetchedPage {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK.as_u16()
    }

    /// Detects a Cloudflare-style interstitial: 403/429, or the
    /// characteristic "Just a moment" body.
    #[must_use]
    pub fn looks_like_challenge(&self) -> bool {
        self.status == StatusCode::FORBIDDEN.as_u16()
            || self.status == StatusCode::TOO_MANY_REQUESTS.as_u16()
            || self.body.contains(CHALLENGE_MARKER)
    }
}

/// Wraps one `reqwest::Client` (reused serially for keep-alive) with the
/// fixed header set and the per-request timeouts.
pub struct Fetcher {
    client: Client,
    request_timeout: Duration,
    probe_timeout: Duration,
    challenge_retry_delay: Duration,
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.5"),
    );
    headers.insert(
        header::ACCEPT_ENCODING,
        HeaderValue::from_static("gzip, deflate, br"),
    );
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(
        header::UPGRADE_INSECURE_REQUESTS,
        HeaderValue::from_static("1"),
    );
    headers
}

impl Fetcher {
    /// Creates a `Fetcher` sending `user_agent` plus the browser header set.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(
        user_agent: &str,
        request_timeout: Duration,
        probe_timeout: Duration,
        challenge_retry_delay: Duration,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .default_headers(browser_headers())
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            request_timeout,
            probe_timeout,
            challenge_retry_delay,
        })
    }

    /// Single GET with the given timeout. Any status is returned as-is.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] on timeout, DNS or connection failure.
    pub async fn get(&self, url: &str, timeout: Duration) -> Result<FetchedPage, ScraperError> {
        self.get_with_user_agent(url, timeout, None).await
    }

    async fn get_with_user_agent(
        &self,
        url: &str,
        timeout: Duration,
        user_agent_override: Option<&str>,
    ) -> Result<FetchedPage, ScraperError> {
        let mut request = self.client.get(url).timeout(timeout);
        if let Some(ua) = user_agent_override {
            request = request.header(header::USER_AGENT, ua);
        }
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(FetchedPage { status, body })
    }

    /// GET using the short probe timeout (sitemaps, category paths).
    ///
    /// # Errors
    ///
    /// See [`Fetcher::get`].
    pub async fn probe(&self, url: &str) -> Result<FetchedPage, ScraperError> {
        self.get(url, self.probe_timeout).await
    }

    /// GET using the page timeout (listing pages).
    ///
    /// # Errors
    ///
    /// See [`Fetcher::get`].
    pub async fn page(&self, url: &str) -> Result<FetchedPage, ScraperError> {
        self.get(url, self.request_timeout).await
    }

    /// Fetches an HTML page, retrying exactly once with the fallback UA when the
    /// first response looks like a challenge page.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::Blocked`] if the retry is still a challenge page.
    /// - [`ScraperError::UnexpectedStatus`] for any other non-200 status.
    /// - [`ScraperError::Http`] on transport failure.
    pub async fn fetch_html(&self, url: &str) -> Result<String, ScraperError> {
        let mut page = self.page(url).await?;

        if page.looks_like_challenge() {
            let delay_ms =
                u64::try_from(self.challenge_retry_delay.as_millis()).unwrap_or(u64::MAX);
            tracing::warn!(
                url,
                status = page.status,
                delay_ms,
                "challenge page detected, retrying once"
            );
            tokio::time::sleep(self.challenge_retry_delay).await;
            page = self
                .get_with_user_agent(url, self.request_timeout, Some(BROWSER_FALLBACK_UA))
                .await?;
            if page.looks_like_challenge() {
                return Err(ScraperError::Blocked {
                    url: url.to_owned(),
                    status: page.status,
                });
            }
        }

        if !page.is_ok() {
            return Err(ScraperError::UnexpectedStatus {
                status: page.status,
                url: url.to_owned(),
            });
        }

        Ok(page.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(status: u16, body: &str) -> FetchedPage {
        FetchedPage {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn challenge_detected_from_status() {
        assert!(page(403, "").looks_like_challenge());
        assert!(page(429, "").looks_like_challenge());
        assert!(!page(404, "").looks_like_challenge());
    }

    #[test]
    fn challenge_detected_from_body() {
        assert!(page(200, "<title>Just a moment...</title>").looks_like_challenge());
        assert!(!page(200, "<title>Shop</title>").looks_like_challenge());
    }

    #[test]
    fn only_200_is_ok() {
        assert!(page(200, "").is_ok());
        assert!(!page(204, "").is_ok());
        assert!(!page(301, "").is_ok());
    }

    #[test]
    fn browser_headers_cover_fixed_set() {
        let headers = browser_headers();
        for name in [
            header::ACCEPT,
            header::ACCEPT_LANGUAGE,
            header::ACCEPT_ENCODING,
            header::CONNECTION,
            header::UPGRADE_INSECURE_REQUESTS,
        ] {
            assert!(headers.contains_key(&name), "missing header {name}");
        }
    }
}
