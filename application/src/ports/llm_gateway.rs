//! LLM Gateway port
//!
//! Defines the interface for communicating with LLM providers.

use async_trait::async_trait;
use chatrelay_domain::{ChatMessage, MissingCredential, ModelTarget, Provider, StreamEvent};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Errors that can occur while opening or running a completion
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("No API credential configured for provider '{0}'")]
    MissingCredential(Provider),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Timeout")]
    Timeout,
}

impl From<MissingCredential> for GatewayError {
    fn from(e: MissingCredential) -> Self {
        GatewayError::MissingCredential(e.0)
    }
}

/// Gateway for LLM communication
///
/// This port defines how the application layer communicates with LLM providers.
/// Implementations (adapters) live in the infrastructure layer. Credentials are
/// bound at call time, so a missing key surfaces here and not at startup.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Open a streaming completion.
    ///
    /// Setup failures (missing credential, connection refused, non-2xx status)
    /// are returned synchronously. Failures after the stream is open arrive as
    /// [`StreamEvent::Error`] and are never retried.
    async fn stream_complete(
        &self,
        target: &ModelTarget,
        history: &[ChatMessage],
    ) -> Result<StreamHandle, GatewayError>;

    /// Run a completion to the end and return the assistant text.
    ///
    /// Default implementation drains [`stream_complete`](Self::stream_complete).
    async fn complete(
        &self,
        target: &ModelTarget,
        history: &[ChatMessage],
    ) -> Result<String, GatewayError> {
        self.stream_complete(target, history)
            .await?
            .collect_text()
            .await
    }
}

/// Handle for receiving streaming events from a completion.
///
/// Wraps an `mpsc::Receiver<StreamEvent>` together with the cancellation token
/// of the producing task. Cancelling (or dropping the handle) tells the
/// producer to stop reading and release the upstream connection.
pub struct StreamHandle {
    receiver: mpsc::Receiver<StreamEvent>,
    cancel: CancellationToken,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>, cancel: CancellationToken) -> Self {
        Self { receiver, cancel }
    }

    /// Handle for a producer that does not observe cancellation.
    pub fn from_receiver(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self::new(receiver, CancellationToken::new())
    }

    /// Next event, or `None` once the producer is gone.
    pub async fn next(&mut self) -> Option<StreamEvent> {
        self.receiver.recv().await
    }

    /// Stop the stream and release the upstream connection.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Consume the stream and collect all text into a single string.
    pub async fn collect_text(mut self) -> Result<String, GatewayError> {
        let mut full_text = String::new();
        while let Some(event) = self.receiver.recv().await {
            match event {
                StreamEvent::Delta { content, .. } => full_text.push_str(&content),
                StreamEvent::Completed { .. } => break,
                StreamEvent::Error(e) => return Err(GatewayError::Provider(e)),
            }
        }
        // Channel closed without Completed; return what we have
        Ok(full_text)
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
