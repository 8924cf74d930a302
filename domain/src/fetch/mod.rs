//! Web page fetch-and-extract shapes.

use crate::core::error::DomainError;
use crate::extraction::ExtractionDirective;
use crate::util::truncate_chars;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Status reported on a successful extraction.
pub const STATUS_SUCCESS: &str = "success";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FetchRequest {
    pub url: String,
    /// `news`, `article`, `blog`, or anything else for the generic field set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extract_fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(DomainError::InvalidRequest("url must not be empty".to_string()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(DomainError::InvalidRequest(format!(
                "url must start with http:// or https://: {}",
                url
            )));
        }
        Ok(())
    }

    /// Requested fields, or the defaults for the content type.
    pub fn effective_fields(&self) -> Vec<String> {
        let explicit: Vec<String> = self
            .extract_fields
            .iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect();
        if explicit.is_empty() {
            default_extract_fields(self.content_type.as_deref().unwrap_or_default())
        } else {
            explicit
        }
    }

    pub fn directive(&self) -> ExtractionDirective {
        ExtractionDirective::new(self.effective_fields())
            .with_language(self.language.clone())
            .with_max_length(self.max_length)
    }
}

/// Default fields per content type.
pub fn default_extract_fields(content_type: &str) -> Vec<String> {
    let fields: &[&str] = match content_type.trim().to_lowercase().as_str() {
        "news" => &["title", "content", "summary", "author", "publish_date", "category"],
        "article" => &["title", "content", "summary", "author", "publish_date"],
        "blog" => &["title", "content", "author", "publish_date", "tags"],
        _ => &["title", "content", "summary"],
    };
    fields.iter().map(|f| f.to_string()).collect()
}

/// A downloaded page reduced to plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub url: String,
    pub title: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchResponse {
    pub url: String,
    pub title: String,
    pub content: String,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extracted_data: Map<String, Value>,
    pub language: String,
    pub fetch_time: DateTime<Utc>,
    pub status: String,
}

impl FetchResponse {
    /// Assemble the response from the model's JSON object.
    ///
    /// Top-level `title`, `content`, `summary` and `language` are lifted out
    /// of the object, falling back to the page title, the page text and the
    /// requested language. The whole object is kept as `extracted_data`.
    pub fn assemble(
        request: &FetchRequest,
        page: &FetchedPage,
        extracted: Map<String, Value>,
        fetch_time: DateTime<Utc>,
    ) -> Self {
        let field = |key: &str| -> Option<String> {
            extracted
                .get(key)
                .and_then(|v| match v {
                    Value::String(s) => Some(s.trim().to_string()),
                    Value::Null => None,
                    other => Some(other.to_string()),
                })
                .filter(|s| !s.is_empty())
        };

        let title = field("title")
            .or_else(|| page.title.clone())
            .unwrap_or_default();
        let mut content = field("content").unwrap_or_else(|| page.text.clone());
        if let Some(max) = request.max_length.filter(|n| *n > 0) {
            content = truncate_chars(&content, max).to_string();
        }
        let summary = field("summary").unwrap_or_default();
        let language = field("language")
            .or_else(|| request.language.clone())
            .unwrap_or_default();

        Self {
            url: page.url.clone(),
            title,
            content,
            summary,
            extracted_data: extracted,
            language,
            fetch_time,
            status: STATUS_SUCCESS.to_string(),
        }
    }
}
