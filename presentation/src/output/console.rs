//! Console output formatter for command results

use crate::output::error::ErrorPayload;
use chatrelay_application::{ConversationHistory, TurnFinish, TurnReport};
use chatrelay_domain::core::string::preview_line;
use chatrelay_domain::{
    Conversation, FetchResponse, ModelTarget, Provider, ProviderRegistry, Role,
    TranslateResponse,
};
use colored::Colorize;

/// Width of the message preview in turn summaries
const PREVIEW_CHARS: usize = 60;

/// Formats command results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    pub fn conversation(conversation: &Conversation) -> String {
        let title = if conversation.has_title() {
            conversation.title.bold().to_string()
        } else {
            "(untitled)".dimmed().to_string()
        };
        let mut output = String::new();
        output.push_str(&format!("{} {}\n", "Conversation:".cyan().bold(), conversation.id));
        output.push_str(&format!("{} {}\n", "Title:".cyan().bold(), title));
        if let Some(owner) = &conversation.owner {
            output.push_str(&format!("{} {}\n", "Owner:".cyan().bold(), owner));
        }
        output.push_str(&format!(
            "{} {}\n{} {}\n",
            "Created:".cyan().bold(),
            conversation.created_at.to_rfc3339(),
            "Updated:".cyan().bold(),
            conversation.updated_at.to_rfc3339()
        ));
        output
    }

    pub fn history(history: &ConversationHistory) -> String {
        if history.messages.is_empty() {
            return format!("{}\n", "No messages yet.".dimmed());
        }
        let mut output = String::new();
        for message in &history.messages {
            let label = format!("[{}] {}", message.id.0, message.role);
            let label = match message.role {
                Role::User => label.green().bold(),
                Role::Assistant => label.yellow().bold(),
                Role::System => label.dimmed(),
            };
            output.push_str(&format!(
                "{}\n{}\n\n",
                label,
                Self::indent(&message.content, "  ")
            ));
        }
        output
    }

    /// One-line summary printed after a streamed reply.
    pub fn turn_summary(report: &TurnReport) -> String {
        let status = match &report.finish {
            TurnFinish::Completed => "completed".green().to_string(),
            TurnFinish::Interrupted(reason) => {
                format!("interrupted ({})", preview_line(reason, PREVIEW_CHARS))
                    .yellow()
                    .to_string()
            }
            TurnFinish::Disconnected => "disconnected".red().to_string(),
        };
        let mut line = format!(
            "{} {} via {}/{}: {}",
            "conversation".dimmed(),
            report.conversation_id,
            report.provider,
            report.model,
            status
        );
        if !report.assistant_persisted {
            line.push_str(&format!(" {}", "(reply not saved)".red()));
        }
        if report.title_dispatched {
            line.push_str(&format!(" {}", "(titling)".dimmed()));
        }
        line.push('\n');
        line
    }

    pub fn translation(response: &TranslateResponse) -> String {
        let mut output = format!("{} {}\n", "Target:".cyan().bold(), response.target);
        for segment in &response.segments {
            output.push_str(&format!("{} {}\n", format!("{}:", segment.id).yellow(), segment.text));
        }
        output
    }

    pub fn fetch(response: &FetchResponse) -> String {
        let mut output = String::new();
        output.push_str(&format!("{} {}\n", "URL:".cyan().bold(), response.url));
        output.push_str(&format!("{} {}\n", "Title:".cyan().bold(), response.title));
        if !response.language.is_empty() {
            output.push_str(&format!("{} {}\n", "Language:".cyan().bold(), response.language));
        }
        if !response.summary.is_empty() {
            output.push_str(&format!(
                "\n{}\n{}\n",
                "Summary:".cyan().bold(),
                Self::indent(&response.summary, "  ")
            ));
        }
        if !response.content.is_empty() {
            output.push_str(&format!(
                "\n{}\n{}\n",
                "Content:".cyan().bold(),
                Self::indent(&response.content, "  ")
            ));
        }

        let others: Vec<_> = response
            .extracted_data
            .iter()
            .filter(|(key, _)| !matches!(key.as_str(), "title" | "content" | "summary" | "language"))
            .collect();
        if !others.is_empty() {
            output.push_str(&format!("\n{}\n", "Fields:".cyan().bold()));
            for (key, value) in others {
                let value = match value {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                output.push_str(&format!("  {} {}\n", format!("{}:", key).yellow(), value));
            }
        }
        output
    }

    pub fn providers(registry: &ProviderRegistry) -> String {
        let config = registry.config();
        let mut output = format!("{}\n", "Providers:".cyan().bold());
        for provider in Provider::ALL {
            let settings = config.settings(provider);
            let key = if registry.credential_for(provider).is_ok() {
                "key set".green()
            } else {
                "no key".red()
            };
            let marker = if provider == registry.default_provider() {
                "*"
            } else {
                " "
            };
            output.push_str(&format!(
                "{} {:<9} {:<8} {:<22} {}\n",
                marker,
                provider.as_str().bold(),
                key,
                settings.default_model,
                settings.base_url.dimmed()
            ));
        }
        output.push_str(&format!("{}\n", "* default provider".dimmed()));
        output
    }

    pub fn resolved(spec: &str, target: &ModelTarget) -> String {
        format!("{:?} -> {}\n", spec, target.to_string().bold())
    }

    pub fn error(payload: &ErrorPayload) -> String {
        let mut output = format!(
            "{} {}\n",
            format!("Error [{}]:", payload.error).red().bold(),
            payload.message
        );
        if let Some(raw) = &payload.raw_content {
            output.push_str(&format!(
                "{}\n{}\n",
                "Model output:".dimmed(),
                Self::indent(raw, "  ")
            ));
        }
        output
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
