//! Prompt templates for titles, translation and page extraction

use crate::extraction::ExtractionDirective;
use crate::fetch::FetchedPage;
use crate::translation::TranslateSegment;
use crate::util::truncate_str;

/// Upper bound on page text embedded in an extraction prompt.
const MAX_PAGE_BYTES: usize = 24_000;

/// Templates for generating prompts for the one-shot completions
pub struct PromptTemplate;

impl PromptTemplate {
    /// User prompt asking for a short conversation title
    pub fn title(first_user: &str, assistant: &str, max_chars: usize) -> String {
        format!(
            r#"Write a short title of at most {} characters for the following conversation.
Reply with the title only, without quotes or punctuation at the end.

User: {}
Assistant: {}"#,
            max_chars, first_user, assistant
        )
    }

    /// Example output shape for translation
    pub fn translate_shape() -> &'static str {
        r#"{
  "target": "<target language>",
  "segments": [
    {"id": "<segment id>", "text": "<translated text>"}
  ]
}"#
    }

    /// User prompt for segment translation (without the JSON directive)
    pub fn translate(target: &str, segments: &[TranslateSegment], requirements: Option<&str>) -> String {
        let mut prompt = format!("Translate the following segments into {}:\n", target);
        for segment in segments {
            prompt.push_str(&format!("Segment ID {}: {}\n", segment.id, segment.text));
        }
        if let Some(requirements) = requirements {
            prompt.push_str(&format!("Translation requirements: {}\n", requirements));
        }
        prompt.push_str("Keep every segment ID unchanged and translate each segment independently.\n");
        prompt
    }

    /// Example output shape for page extraction
    pub fn extraction_shape(directive: &ExtractionDirective) -> String {
        let mut fields: Vec<String> = directive
            .fields
            .iter()
            .map(|f| format!("  \"{}\": \"...\"", f))
            .collect();
        if !directive.fields.iter().any(|f| f == "language") {
            fields.push("  \"language\": \"<detected language code>\"".to_string());
        }
        format!("{{\n{}\n}}", fields.join(",\n"))
    }

    /// User prompt for structured page extraction (without the JSON directive)
    pub fn extract_page(page: &FetchedPage, directive: &ExtractionDirective) -> String {
        let mut prompt = String::from(
            "Extract structured information from the following web page.\n",
        );
        prompt.push_str(&format!("URL: {}\n", page.url));
        if let Some(title) = &page.title {
            prompt.push_str(&format!("Page title: {}\n", title));
        }
        prompt.push_str(&directive.render());
        prompt.push_str("Use an empty string for fields that are not present on the page.\n");
        prompt.push_str("\nPage text:\n");
        prompt.push_str(truncate_str(&page.text, MAX_PAGE_BYTES));
        prompt.push('\n');
        prompt
    }

    /// Instruction appended to every structured prompt
    pub fn json_only(shape: &str) -> String {
        format!(
            "\nReturn the result in exactly this JSON format. Return only the JSON, with no other text:\n{}",
            shape
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_prompt_mentions_limit_and_turn() {
        let prompt = PromptTemplate::title("What is Rust?", "A language.", 25);
        assert!(prompt.contains("at most 25 characters"));
        assert!(prompt.contains("User: What is Rust?"));
        assert!(prompt.contains("Assistant: A language."));
    }

    #[test]
    fn translate_prompt_lists_segments_in_order() {
        let segments = vec![
            TranslateSegment::new("s1", "你好"),
            TranslateSegment::new("s2", "世界"),
        ];
        let prompt = PromptTemplate::translate("English", &segments, Some("Style: formal"));
        let first = prompt.find("Segment ID s1: 你好").unwrap();
        let second = prompt.find("Segment ID s2: 世界").unwrap();
        assert!(first < second);
        assert!(prompt.contains("Translation requirements: Style: formal"));
    }

    #[test]
    fn translate_prompt_without_requirements() {
        let prompt = PromptTemplate::translate("fr", &[TranslateSegment::new("a", "hi")], None);
        assert!(!prompt.contains("requirements"));
    }

    #[test]
    fn extraction_shape_adds_language_key() {
        let directive = ExtractionDirective::new(vec!["title".into(), "tags".into()]);
        let shape = PromptTemplate::extraction_shape(&directive);
        assert!(shape.contains("\"title\""));
        assert!(shape.contains("\"tags\""));
        assert!(shape.contains("\"language\""));
    }

    #[test]
    fn extract_page_caps_page_text() {
        let page = FetchedPage {
            url: "https://example.com".into(),
            title: None,
            text: "x".repeat(MAX_PAGE_BYTES * 2),
        };
        let prompt = PromptTemplate::extract_page(&page, &ExtractionDirective::default());
        assert!(prompt.len() < MAX_PAGE_BYTES + 1_000);
    }

    #[test]
    fn json_only_appends_shape() {
        let directive = PromptTemplate::json_only("{\"a\": 1}");
        assert!(directive.contains("Return only the JSON"));
        assert!(directive.ends_with("{\"a\": 1}"));
    }
}
