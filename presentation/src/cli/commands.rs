//! CLI command definitions

use chatrelay_domain::TranslateSegment;
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Output format for command results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable, colored text
    #[default]
    Text,
    /// JSON (one document per command)
    Json,
}

/// Transcript store override
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreChoice {
    Sqlite,
    Memory,
}

/// CLI arguments for chatrelay
#[derive(Parser, Debug)]
#[command(name = "chatrelay")]
#[command(author, version, about = "Streaming chat gateway for OpenAI-compatible LLM providers")]
#[command(long_about = r#"
chatrelay streams chat completions from Qwen, DeepSeek, OpenAI or Kimi,
persists every conversation, and titles new conversations in the background.
It can also translate batches of text segments and extract structured fields
from web pages.

Configuration files are loaded from (in priority order):
1. CHATRELAY_* environment variables (e.g. CHATRELAY_TITLE__ENABLED=false)
2. --config <path>       Explicit config file
3. ./chatrelay.toml      Project-level config
4. ~/.config/chatrelay/config.toml   Global config

Example:
  chatrelay chat "Explain ownership in Rust"
  chatrelay chat -c 6f1c... -m deepseek/deepseek-reasoner "And borrowing?"
  chatrelay translate -t en s1=你好 s2=世界
  chatrelay fetch https://example.com/post --type blog
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Override the transcript store backend
    #[arg(long, value_enum, global = true)]
    pub store: Option<StoreChoice>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub output: OutputFormat,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create an empty conversation
    New {
        /// Owner recorded on the conversation
        #[arg(long)]
        owner: Option<String>,
    },

    /// Show a conversation
    Show {
        /// Conversation id
        id: String,
    },

    /// Print the messages of a conversation in order
    History {
        /// Conversation id
        id: String,
    },

    /// Set a conversation's title
    Rename {
        /// Conversation id
        id: String,
        /// New title
        title: String,
    },

    /// Send one message and stream the reply
    Chat {
        /// Continue this conversation (a new one is created otherwise)
        #[arg(short, long, value_name = "ID")]
        conversation: Option<String>,

        /// Model specifier, e.g. "deepseek/deepseek-chat" or "gpt-4o-mini"
        #[arg(short, long, value_name = "SPEC")]
        model: Option<String>,

        /// Print raw SSE frames instead of text
        #[arg(long)]
        sse: bool,

        /// Owner for a newly created conversation
        #[arg(long)]
        owner: Option<String>,

        /// Message text (joined with spaces)
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },

    /// Translate text segments
    Translate {
        /// Target language
        #[arg(short, long)]
        target: String,

        /// Model specifier
        #[arg(short, long, value_name = "SPEC")]
        model: Option<String>,

        /// Translation style (e.g. "formal")
        #[arg(long)]
        style: Option<String>,

        /// Extra requirements as JSON, or free text
        #[arg(long, value_name = "JSON")]
        extra: Option<String>,

        /// Segments as ID=TEXT (plain TEXT gets an id like s1)
        #[arg(required = true, value_name = "ID=TEXT")]
        segments: Vec<String>,
    },

    /// Fetch a web page and extract structured fields
    Fetch {
        /// Page URL (http or https)
        url: String,

        /// Content type: news, article, blog, or anything else
        #[arg(long = "type", value_name = "TYPE")]
        content_type: Option<String>,

        /// Field to extract (repeatable; overrides the content type defaults)
        #[arg(long = "field", value_name = "NAME")]
        fields: Vec<String>,

        /// Language for the extracted text
        #[arg(long)]
        language: Option<String>,

        /// Maximum length of the extracted content, in characters
        #[arg(long, value_name = "CHARS")]
        max_length: Option<usize>,
    },

    /// List providers and their credential status
    Providers {
        /// Show how a model specifier resolves
        #[arg(long, value_name = "SPEC")]
        resolve: Option<String>,
    },

    /// Show configuration sources and the effective configuration
    Config {
        /// Only list the configuration sources
        #[arg(long)]
        sources: bool,
    },
}

impl Command {
    /// True for commands that call a provider and need a credential.
    pub fn reaches_provider(&self) -> bool {
        matches!(
            self,
            Command::Chat { .. } | Command::Translate { .. } | Command::Fetch { .. }
        )
    }

    /// True for commands that read or write the transcript store.
    pub fn uses_store(&self) -> bool {
        matches!(
            self,
            Command::New { .. }
                | Command::Show { .. }
                | Command::History { .. }
                | Command::Rename { .. }
                | Command::Chat { .. }
        )
    }
}

/// Parse `ID=TEXT` arguments. Arguments without `=` get `s<position>`.
pub fn parse_segments(args: &[String]) -> Vec<TranslateSegment> {
    args.iter()
        .enumerate()
        .map(|(i, arg)| match arg.split_once('=') {
            Some((id, text)) if !id.trim().is_empty() => {
                TranslateSegment::new(id.trim(), text)
            }
            _ => TranslateSegment::new(format!("s{}", i + 1), arg.as_str()),
        })
        .collect()
}

/// Combine `--style` and `--extra` into translation extra args.
///
/// `--extra` is parsed as JSON when possible and kept as a string otherwise.
/// A style is merged into an object `--extra`; otherwise it replaces it.
pub fn translate_extra_args(style: Option<&str>, extra: Option<&str>) -> Option<Value> {
    let extra = extra.map(|raw| {
        serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
    });
    match (style, extra) {
        (None, extra) => extra,
        (Some(style), Some(Value::Object(mut map))) => {
            map.insert("style".to_string(), Value::String(style.to_string()));
            Some(Value::Object(map))
        }
        (Some(style), _) => {
            let mut map = Map::new();
            map.insert("style".to_string(), Value::String(style.to_string()));
            Some(Value::Object(map))
        }
    }
}
