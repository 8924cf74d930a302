//! CLI entrypoint for chatrelay
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod app;
mod logging;

use anyhow::{Context, Result, anyhow};
use app::{App, Reported, print_error};
use chatrelay_application::{
    ConversationLogger, ErrorKind, LlmGateway, NoConversationLogger, StoreError, TranscriptStore,
};
use chatrelay_domain::{Provider, ProviderRegistry};
use chatrelay_infrastructure::{
    ConfigLoader, FileConfig, InMemoryTranscriptStore, JsonlConversationLogger,
    OpenAiCompatGateway, SqliteTranscriptStore, StoreBackend, default_page_fetcher,
};
use chatrelay_presentation::{Cli, Command, ErrorPayload, StoreChoice};
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Title wait when no request timeout is configured.
const DEFAULT_TITLE_GRACE: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("failed to load configuration: {}", e))?
    };

    let _log_guard = logging::init(cli.verbose, file_config.logging.dir.as_deref());
    info!("Starting chatrelay");

    file_config.validate().context("invalid configuration")?;

    if let Command::Config { sources } = &cli.command {
        if *sources {
            ConfigLoader::print_config_sources(cli.config.as_ref());
        } else {
            print!("{}", file_config.to_redacted_toml()?);
        }
        return Ok(ExitCode::SUCCESS);
    }

    // === Dependency Injection ===
    let provider_config = file_config
        .providers
        .to_provider_config(&|key| std::env::var(key).ok())?;
    if cli.command.reaches_provider() && !provider_config.has_any_credential() {
        let payload = ErrorPayload::new(
            ErrorKind::MissingCredential,
            format!(
                "no provider credentials configured; set one of {}",
                credential_env_names(&file_config)
            ),
        );
        print_error(cli.output, &payload);
        return Ok(ExitCode::FAILURE);
    }
    let registry = Arc::new(ProviderRegistry::new(provider_config));
    info!("Configured providers: {:?}", registry.configured_providers());

    let behavior = file_config.behavior.to_behavior_config();
    let title_grace = behavior.timeout.unwrap_or(DEFAULT_TITLE_GRACE);
    let gateway: Arc<dyn LlmGateway> =
        Arc::new(OpenAiCompatGateway::new(registry.clone(), behavior));

    let store: Arc<dyn TranscriptStore> = if cli.command.uses_store() {
        match open_store(&cli, &file_config) {
            Ok(store) => store,
            Err(e) => {
                print_error(cli.output, &ErrorPayload::new(e.kind(), e.to_string()));
                return Ok(ExitCode::FAILURE);
            }
        }
    } else {
        Arc::new(InMemoryTranscriptStore::new())
    };

    let conversation_logger: Arc<dyn ConversationLogger> = file_config
        .logging
        .conversation_log
        .as_ref()
        .and_then(JsonlConversationLogger::new)
        .map(|logger| Arc::new(logger) as Arc<dyn ConversationLogger>)
        .unwrap_or_else(|| Arc::new(NoConversationLogger));

    let app = App {
        registry,
        gateway,
        store,
        page_fetcher: default_page_fetcher(),
        conversation_logger,
        title: file_config.title.to_title_config(),
        title_grace,
        format: cli.output,
    };

    match app.run(cli.command).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) if e.is::<Reported>() => Ok(ExitCode::FAILURE),
        Err(e) => Err(e),
    }
}

/// Open the transcript store; `--store` overrides the configured backend.
fn open_store(cli: &Cli, config: &FileConfig) -> Result<Arc<dyn TranscriptStore>, StoreError> {
    let backend = match cli.store {
        Some(StoreChoice::Sqlite) => StoreBackend::Sqlite,
        Some(StoreChoice::Memory) => StoreBackend::Memory,
        None => config.store.backend,
    };
    let store: Arc<dyn TranscriptStore> = match backend {
        StoreBackend::Sqlite => Arc::new(SqliteTranscriptStore::open(
            &config.store.database_path(),
        )?),
        StoreBackend::Memory => Arc::new(InMemoryTranscriptStore::new()),
    };
    Ok(store)
}

fn credential_env_names(config: &FileConfig) -> String {
    Provider::ALL
        .into_iter()
        .map(|provider| config.providers.entry(provider).api_key_env.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
