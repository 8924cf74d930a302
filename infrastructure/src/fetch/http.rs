//! reqwest-backed page fetcher.

use super::html::{html_to_text, page_title};
use async_trait::async_trait;
use chatrelay_application::ports::page_fetcher::{FetchError, PageFetcher};
use chatrelay_domain::FetchedPage;
use std::time::Duration;
use tracing::debug;

/// Maximum response body size (5 MB)
const MAX_BODY_SIZE: usize = 5 * 1024 * 1024;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("chatrelay/", env!("CARGO_PKG_VERSION"), " (page fetcher)");

/// Fetches pages over HTTP(S) and reduces HTML to text.
pub struct HttpPageFetcher {
    client: reqwest::Client,
}

impl Default for HttpPageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpPageFetcher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();
        Self::with_client(client)
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                parsed.scheme()
            )));
        }

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if response.content_length().unwrap_or(0) > MAX_BODY_SIZE as u64 {
            return Err(FetchError::Request(format!(
                "response too large (max: {} bytes)",
                MAX_BODY_SIZE
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Request(format!("failed to read response body: {}", e)))?;
        if body.len() > MAX_BODY_SIZE {
            return Err(FetchError::Request(format!(
                "response too large: {} bytes",
                body.len()
            )));
        }
        let body = String::from_utf8_lossy(&body);
        debug!("Fetched {} ({} bytes, {})", url, body.len(), content_type);

        let page = if content_type.contains("text/html") || content_type.contains("application/xhtml")
        {
            FetchedPage {
                url: url.to_string(),
                title: page_title(&body),
                text: html_to_text(&body),
            }
        } else {
            FetchedPage {
                url: url.to_string(),
                title: None,
                text: body.trim().to_string(),
            }
        };
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn serve_once(status: &str, content_type: &str, body: &str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/page", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            content_type,
            body.len(),
            body
        );
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut scratch = [0u8; 4096];
            let _ = stream.read(&mut scratch).await;
            stream.write_all(response.as_bytes()).await.unwrap();
        });
        url
    }

    fn fetcher() -> HttpPageFetcher {
        HttpPageFetcher::with_client(reqwest::Client::builder().no_proxy().build().unwrap())
    }

    #[tokio::test]
    async fn html_page_is_reduced_to_text() {
        let url = serve_once(
            "200 OK",
            "text/html; charset=utf-8",
            "<html><head><title>Notes</title></head><body><p>Hello <b>there</b></p><script>x()</script></body></html>",
        )
        .await;

        let page = fetcher().fetch(&url).await.unwrap();

        assert_eq!(page.url, url);
        assert_eq!(page.title.as_deref(), Some("Notes"));
        assert_eq!(page.text, "Hello there");
    }

    #[tokio::test]
    async fn plain_text_is_kept_as_is() {
        let url = serve_once("200 OK", "text/plain", "  just text \n").await;
        let page = fetcher().fetch(&url).await.unwrap();
        assert_eq!(page.title, None);
        assert_eq!(page.text, "just text");
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let url = serve_once("404 Not Found", "text/plain", "gone").await;
        let err = fetcher().fetch(&url).await.unwrap_err();
        assert_eq!(err, FetchError::Status { url, status: 404 });
    }

    #[tokio::test]
    async fn non_http_scheme_is_invalid() {
        let err = fetcher().fetch("ftp://example.com/file").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
        let err = fetcher().fetch("not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }
}
