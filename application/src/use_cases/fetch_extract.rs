//! Fetch-and-extract use case.
//!
//! Downloads a page, reduces it to text and asks a provider to pull out the
//! requested fields as JSON.

use crate::error::ErrorKind;
use crate::ports::page_fetcher::{FetchError, PageFetcher};
use crate::use_cases::extract::{ExtractError, StructuredExtractor};
use chatrelay_domain::{FetchRequest, FetchResponse, PromptTemplate};
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Errors that can occur during fetch-extract.
#[derive(Error, Debug)]
pub enum FetchExtractError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

impl FetchExtractError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchExtractError::Validation(_) => ErrorKind::Validation,
            FetchExtractError::Fetch(FetchError::InvalidUrl(_)) => ErrorKind::Validation,
            FetchExtractError::Fetch(_) => ErrorKind::Provider,
            FetchExtractError::Extract(e) => e.kind(),
        }
    }

    pub fn raw_content(&self) -> Option<&str> {
        match self {
            FetchExtractError::Extract(e) => e.raw_content(),
            _ => None,
        }
    }
}

/// Use case for web page extraction
#[derive(Clone)]
pub struct FetchExtractUseCase {
    fetcher: Arc<dyn PageFetcher>,
    extractor: StructuredExtractor,
}

impl FetchExtractUseCase {
    pub fn new(fetcher: Arc<dyn PageFetcher>, extractor: StructuredExtractor) -> Self {
        Self { fetcher, extractor }
    }

    pub async fn execute(&self, request: FetchRequest) -> Result<FetchResponse, FetchExtractError> {
        request
            .validate()
            .map_err(|e| FetchExtractError::Validation(e.to_string()))?;

        let url = request.url.trim();
        info!("Fetching {}", url);
        let page = self.fetcher.fetch(url).await?;
        let fetch_time = chrono::Utc::now();

        let directive = request.directive();
        let prompt = PromptTemplate::extract_page(&page, &directive);
        let shape = PromptTemplate::extraction_shape(&directive);
        let extracted: Map<String, Value> = self.extractor.extract(&prompt, &shape).await?;

        Ok(FetchResponse::assemble(&request, &page, extracted, fetch_time))
    }
}
