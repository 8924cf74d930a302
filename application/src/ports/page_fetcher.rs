//! Page fetcher port
//!
//! Downloads a web page and reduces it to plain text for extraction.

use async_trait::async_trait;
use chatrelay_domain::FetchedPage;
use thiserror::Error;

/// Errors that can occur while fetching a page
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Page fetching is not available in this build")]
    Unavailable,
}

/// Port for fetching web pages
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// Fetcher used when the HTTP fetcher is compiled out.
pub struct NoPageFetcher;

#[async_trait]
impl PageFetcher for NoPageFetcher {
    async fn fetch(&self, _url: &str) -> Result<FetchedPage, FetchError> {
        Err(FetchError::Unavailable)
    }
}
