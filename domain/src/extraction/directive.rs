//! Extraction directives (prompt-building value objects, never persisted).

/// What to pull out of a page and how to present it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractionDirective {
    pub fields: Vec<String>,
    pub language: Option<String>,
    pub max_length: Option<usize>,
}

impl ExtractionDirective {
    pub fn new(fields: Vec<String>) -> Self {
        Self {
            fields,
            ..Default::default()
        }
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language.filter(|l| !l.trim().is_empty());
        self
    }

    pub fn with_max_length(mut self, max_length: Option<usize>) -> Self {
        self.max_length = max_length.filter(|n| *n > 0);
        self
    }

    /// Render the directive as prompt lines.
    pub fn render(&self) -> String {
        let mut out = format!("Fields to extract: {}\n", self.fields.join(", "));
        if let Some(language) = &self.language {
            out.push_str(&format!("Write all extracted text in: {}\n", language));
        }
        if let Some(max) = self.max_length {
            out.push_str(&format!(
                "Limit the \"content\" field to at most {} characters.\n",
                max
            ));
        }
        out
    }
}
