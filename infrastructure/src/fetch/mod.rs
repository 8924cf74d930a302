//! Web page fetching
//!
//! With the `web-tools` feature, [`HttpPageFetcher`] downloads pages with
//! reqwest and reduces HTML to text with scraper. Without it,
//! [`default_page_fetcher`] hands out a fetcher that always reports
//! [`FetchError::Unavailable`](chatrelay_application::FetchError::Unavailable).

#[cfg(feature = "web-tools")]
mod html;
#[cfg(feature = "web-tools")]
mod http;

#[cfg(feature = "web-tools")]
pub use html::{html_to_text, page_title};
#[cfg(feature = "web-tools")]
pub use http::HttpPageFetcher;

use chatrelay_application::PageFetcher;
use std::sync::Arc;

/// The best page fetcher this build supports.
pub fn default_page_fetcher() -> Arc<dyn PageFetcher> {
    #[cfg(feature = "web-tools")]
    {
        Arc::new(HttpPageFetcher::new())
    }
    #[cfg(not(feature = "web-tools"))]
    {
        Arc::new(chatrelay_application::NoPageFetcher)
    }
}
