//! Command dispatch.
//!
//! [`App`] holds the wired adapters and runs one [`Command`]. Use-case
//! failures are rendered here, in the selected output format, and surface to
//! `main` as [`Reported`] so only the exit code is left to decide.

use anyhow::Result;
use chatrelay_application::{
    ConversationLogger, ConversationService, FetchExtractUseCase, LlmGateway, PageFetcher,
    StreamTurnInput, StreamTurnUseCase, StructuredExtractor, TitleConfig, TranscriptStore,
    TranslateUseCase, TurnFinish, TurnReport,
};
use chatrelay_domain::{ConversationId, FetchRequest, Provider, ProviderRegistry, TranslateRequest};
use chatrelay_presentation::cli::commands::{parse_segments, translate_extra_args};
use chatrelay_presentation::{
    Command, ConsoleFormatter, ConsoleRelaySink, ErrorPayload, OutputFormat, ReportedError,
    SseRelaySink,
};
use serde::Serialize;
use serde_json::{Value, json};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// A failure that has already been shown to the user.
#[derive(Debug)]
pub struct Reported;

impl fmt::Display for Reported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("error already reported")
    }
}

impl std::error::Error for Reported {}

/// Print an error payload: JSON on stdout, or colored text on stderr.
pub fn print_error(format: OutputFormat, payload: &ErrorPayload) {
    match format {
        OutputFormat::Json => println!("{}", payload.to_json()),
        OutputFormat::Text => eprint!("{}", ConsoleFormatter::error(payload)),
    }
}

pub struct App {
    pub registry: Arc<ProviderRegistry>,
    pub gateway: Arc<dyn LlmGateway>,
    pub store: Arc<dyn TranscriptStore>,
    pub page_fetcher: Arc<dyn PageFetcher>,
    pub conversation_logger: Arc<dyn ConversationLogger>,
    pub title: TitleConfig,
    /// How long `chat` waits for the background title before exiting.
    pub title_grace: Duration,
    pub format: OutputFormat,
}

impl App {
    pub async fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::New { owner } => {
                let conversation = self
                    .conversations()
                    .create(owner)
                    .await
                    .map_err(|e| self.fail(e))?;
                self.render(&conversation, ConsoleFormatter::conversation)
            }
            Command::Show { id } => {
                let conversation = self
                    .conversations()
                    .detail(&ConversationId::new(id))
                    .await
                    .map_err(|e| self.fail(e))?;
                self.render(&conversation, ConsoleFormatter::conversation)
            }
            Command::History { id } => {
                let history = self
                    .conversations()
                    .history(&ConversationId::new(id))
                    .await
                    .map_err(|e| self.fail(e))?;
                self.render(&history, ConsoleFormatter::history)
            }
            Command::Rename { id, title } => {
                let conversation = self
                    .conversations()
                    .rename(&ConversationId::new(id), &title)
                    .await
                    .map_err(|e| self.fail(e))?;
                self.render(&conversation, ConsoleFormatter::conversation)
            }
            Command::Chat {
                conversation,
                model,
                sse,
                owner,
                message,
            } => {
                self.chat(conversation, model, sse, owner, message.join(" "))
                    .await
            }
            Command::Translate {
                target,
                model,
                style,
                extra,
                segments,
            } => {
                let mut request = TranslateRequest::new(target, parse_segments(&segments));
                request.extra_args = translate_extra_args(style.as_deref(), extra.as_deref());
                request.model = model;

                let response = TranslateUseCase::new(self.extractor())
                    .execute(request)
                    .await
                    .map_err(|e| self.fail(e))?;
                self.render(&response, ConsoleFormatter::translation)
            }
            Command::Fetch {
                url,
                content_type,
                fields,
                language,
                max_length,
            } => {
                let request = FetchRequest {
                    url,
                    content_type,
                    extract_fields: fields,
                    language,
                    max_length,
                };
                let response = FetchExtractUseCase::new(self.page_fetcher.clone(), self.extractor())
                    .execute(request)
                    .await
                    .map_err(|e| self.fail(e))?;
                self.render(&response, ConsoleFormatter::fetch)
            }
            Command::Providers { resolve: Some(spec) } => {
                let target = self.registry.resolve(&spec);
                match self.format {
                    OutputFormat::Json => {
                        let value = json!({
                            "spec": spec,
                            "provider": target.provider.as_str(),
                            "model": target.model,
                            "credential": self.registry.credential_for(target.provider).is_ok(),
                        });
                        println!("{}", serde_json::to_string_pretty(&value)?);
                    }
                    OutputFormat::Text => print!("{}", ConsoleFormatter::resolved(&spec, &target)),
                }
                Ok(())
            }
            Command::Providers { resolve: None } => {
                match self.format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&self.providers_json())?)
                    }
                    OutputFormat::Text => print!("{}", ConsoleFormatter::providers(&self.registry)),
                }
                Ok(())
            }
            // Handled before the adapters are built.
            Command::Config { .. } => Ok(()),
        }
    }

    async fn chat(
        &self,
        conversation: Option<String>,
        model: Option<String>,
        sse: bool,
        owner: Option<String>,
        text: String,
    ) -> Result<()> {
        let service = self.conversations();
        let id = match conversation {
            Some(id) => ConversationId::new(id),
            None => {
                let created = service.create(owner).await.map_err(|e| self.fail(e))?;
                eprintln!("conversation: {}", created.id);
                created.id
            }
        };

        let mut input = StreamTurnInput::new(id.clone(), text);
        if let Some(model) = model {
            input = input.with_model(model);
        }

        let use_case = StreamTurnUseCase::new(
            self.gateway.clone(),
            self.store.clone(),
            self.registry.clone(),
        )
        .with_conversation_logger(self.conversation_logger.clone())
        .with_title_config(self.title.clone());

        let result = if sse {
            use_case
                .execute(input, &SseRelaySink::new(std::io::stdout()))
                .await
        } else {
            use_case
                .execute(input, &ConsoleRelaySink::new(std::io::stdout()))
                .await
        };
        let report = result.map_err(|e| self.fail(e))?;

        match self.format {
            OutputFormat::Json => eprintln!("{}", serde_json::to_string_pretty(&turn_json(&report))?),
            OutputFormat::Text => eprint!("{}", ConsoleFormatter::turn_summary(&report)),
        }

        if !use_case.shutdown(self.title_grace).await {
            warn!(
                "Title generation for {} did not finish within {:?}",
                id, self.title_grace
            );
        } else if report.title_dispatched
            && let Ok(conversation) = service.detail(&id).await
            && !conversation.title.is_empty()
        {
            info!("Conversation {} titled '{}'", id, conversation.title);
            if self.format == OutputFormat::Text {
                eprintln!("title: {}", conversation.title);
            }
        }

        match report.finish {
            TurnFinish::Interrupted(_) => Err(anyhow::Error::new(Reported)),
            TurnFinish::Completed | TurnFinish::Disconnected => Ok(()),
        }
    }

    fn conversations(&self) -> ConversationService {
        ConversationService::new(self.store.clone())
    }

    fn extractor(&self) -> StructuredExtractor {
        StructuredExtractor::new(self.gateway.clone(), self.registry.clone())
    }

    fn fail<E: ReportedError>(&self, err: E) -> anyhow::Error {
        print_error(self.format, &ErrorPayload::from_error(&err));
        anyhow::Error::new(Reported)
    }

    fn render<T: Serialize>(&self, value: &T, text: impl FnOnce(&T) -> String) -> Result<()> {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
            OutputFormat::Text => print!("{}", text(value)),
        }
        Ok(())
    }

    fn providers_json(&self) -> Value {
        let config = self.registry.config();
        let providers: Vec<Value> = Provider::ALL
            .into_iter()
            .map(|provider| {
                let settings = config.settings(provider);
                json!({
                    "provider": provider.as_str(),
                    "base_url": settings.base_url,
                    "default_model": settings.default_model,
                    "credential": settings.credential.is_some(),
                    "default": provider == self.registry.default_provider(),
                })
            })
            .collect();
        Value::Array(providers)
    }
}

fn turn_json(report: &TurnReport) -> Value {
    let (finish, reason) = match &report.finish {
        TurnFinish::Completed => ("completed", None),
        TurnFinish::Interrupted(reason) => ("interrupted", Some(reason.as_str())),
        TurnFinish::Disconnected => ("disconnected", None),
    };
    json!({
        "conversation_id": report.conversation_id,
        "response_id": report.response_id,
        "provider": report.provider.as_str(),
        "model": report.model,
        "finish": finish,
        "reason": reason,
        "assistant_persisted": report.assistant_persisted,
        "title_dispatched": report.title_dispatched,
    })
}
