//! OpenAI-compatible LLM Gateway implementation
//!
//! Every supported provider speaks the same `/chat/completions` dialect, so a
//! single adapter serves all of them. Credentials and endpoints are bound per
//! call through the [`ProviderRegistry`].

use super::protocol::{
    CompletionRequest, CompletionResponse, ErrorEnvelope, StreamChunk, error_message,
};
use super::sse::{DONE_SENTINEL, SseDecoder};
use async_trait::async_trait;
use chatrelay_application::BehaviorConfig;
use chatrelay_application::ports::llm_gateway::{GatewayError, LlmGateway, StreamHandle};
use chatrelay_domain::{ChatMessage, ModelTarget, ProviderBinding, ProviderRegistry, StreamEvent};
use futures::StreamExt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const USER_AGENT: &str = concat!("chatrelay/", env!("CARGO_PKG_VERSION"));

const STALL_MESSAGE: &str = "provider stream timed out";

/// LLM Gateway for OpenAI-compatible chat completion APIs
pub struct OpenAiCompatGateway {
    client: reqwest::Client,
    registry: Arc<ProviderRegistry>,
    behavior: BehaviorConfig,
}

impl OpenAiCompatGateway {
    pub fn new(registry: Arc<ProviderRegistry>, behavior: BehaviorConfig) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();
        Self::with_client(client, registry, behavior)
    }

    /// Create a gateway around an existing client (for testing)
    pub fn with_client(
        client: reqwest::Client,
        registry: Arc<ProviderRegistry>,
        behavior: BehaviorConfig,
    ) -> Self {
        Self {
            client,
            registry,
            behavior,
        }
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    /// POST the completion request and fail on any non-2xx status.
    async fn send(
        &self,
        binding: &ProviderBinding,
        history: &[ChatMessage],
        stream: bool,
    ) -> Result<reqwest::Response, GatewayError> {
        let url = endpoint(&binding.base_url);
        debug!(
            "POST {} (provider={}, model={}, messages={}, stream={})",
            url,
            binding.provider,
            binding.model,
            history.len(),
            stream
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(binding.credential.expose())
            .json(&CompletionRequest {
                model: &binding.model,
                messages: history,
                stream,
            })
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Provider(format!(
                "{} returned HTTP {}: {}",
                binding.provider,
                status.as_u16(),
                error_message(&body)
            )));
        }
        Ok(response)
    }

    /// Apply the configured timeout, if any.
    async fn within<T>(
        &self,
        fut: impl Future<Output = Result<T, GatewayError>>,
    ) -> Result<T, GatewayError> {
        match self.behavior.timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| GatewayError::Timeout)?,
            None => fut.await,
        }
    }
}

#[async_trait]
impl LlmGateway for OpenAiCompatGateway {
    async fn stream_complete(
        &self,
        target: &ModelTarget,
        history: &[ChatMessage],
    ) -> Result<StreamHandle, GatewayError> {
        let binding = self.registry.bind(target)?;
        let response = self.within(self.send(&binding, history, true)).await?;
        info!("Stream opened: {}/{}", binding.provider, binding.model);

        let (tx, rx) = mpsc::channel(self.behavior.relay_buffer.max(1));
        let cancel = CancellationToken::new();
        tokio::spawn(pump(response, tx, cancel.clone(), self.behavior.timeout));

        Ok(StreamHandle::new(rx, cancel))
    }

    async fn complete(
        &self,
        target: &ModelTarget,
        history: &[ChatMessage],
    ) -> Result<String, GatewayError> {
        let binding = self.registry.bind(target)?;
        self.within(async {
            let response = self.send(&binding, history, false).await?;
            let body: CompletionResponse = response.json().await.map_err(request_error)?;
            Ok(body
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .unwrap_or_default())
        })
        .await
    }
}

fn endpoint(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

fn request_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::Provider(e.to_string())
    }
}

/// What one SSE payload means for the stream.
#[derive(Debug, PartialEq)]
enum Decoded {
    Events(Vec<StreamEvent>),
    Done,
    Failed(String),
}

fn decode_payload(payload: &str, finish_reason: &mut Option<String>) -> Decoded {
    if payload.trim() == DONE_SENTINEL {
        return Decoded::Done;
    }
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(payload) {
        return Decoded::Failed(envelope.error.message);
    }
    let chunk: StreamChunk = match serde_json::from_str(payload) {
        Ok(chunk) => chunk,
        Err(e) => {
            warn!("Skipping undecodable stream chunk: {}", e);
            return Decoded::Events(Vec::new());
        }
    };

    let mut events = Vec::new();
    if let Some(choice) = chunk.choices.into_iter().next() {
        let role = choice.delta.role();
        let content = choice.delta.content.unwrap_or_default();
        if role.is_some() || !content.is_empty() {
            events.push(StreamEvent::Delta { role, content });
        }
        if choice.finish_reason.is_some() {
            *finish_reason = choice.finish_reason;
        }
    }
    Decoded::Events(events)
}

/// Send unless the consumer cancelled; false means stop reading.
async fn emit(tx: &mpsc::Sender<StreamEvent>, cancel: &CancellationToken, event: StreamEvent) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        sent = tx.send(event) => sent.is_ok(),
    }
}

/// Wait for the next body chunk; `None` from the outer option means `idle`
/// elapsed first.
async fn next_chunk<S>(body: &mut S, idle: Option<Duration>) -> Option<Option<S::Item>>
where
    S: futures::Stream + Unpin,
{
    match idle {
        Some(limit) => tokio::time::timeout(limit, body.next()).await.ok(),
        None => Some(body.next().await),
    }
}

/// Reader task: owns the response body until the stream ends or is cancelled.
///
/// With `idle` set, a gap longer than that between body chunks ends the
/// stream with [`StreamEvent::Error`].
async fn pump(
    response: reqwest::Response,
    tx: mpsc::Sender<StreamEvent>,
    cancel: CancellationToken,
    idle: Option<Duration>,
) {
    let mut body = response.bytes_stream();
    let mut decoder = SseDecoder::new();
    let mut finish_reason = None;

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Stream cancelled by consumer");
                return;
            }
            next = next_chunk(&mut body, idle) => match next {
                Some(next) => next,
                None => {
                    warn!("Provider sent nothing for {:?}; giving up", idle.unwrap_or_default());
                    emit(&tx, &cancel, StreamEvent::Error(STALL_MESSAGE.to_string())).await;
                    return;
                }
            },
        };

        let ended = next.is_none();
        let payloads = match next {
            Some(Ok(bytes)) => decoder.feed(&bytes),
            Some(Err(e)) => {
                warn!("Stream read failed: {}", e);
                emit(&tx, &cancel, StreamEvent::Error(e.to_string())).await;
                return;
            }
            None => decoder.finish().into_iter().collect(),
        };

        for payload in payloads {
            match decode_payload(&payload, &mut finish_reason) {
                Decoded::Events(events) => {
                    for event in events {
                        if !emit(&tx, &cancel, event).await {
                            return;
                        }
                    }
                }
                Decoded::Done => {
                    emit(&tx, &cancel, StreamEvent::Completed { finish_reason }).await;
                    return;
                }
                Decoded::Failed(message) => {
                    warn!("Provider reported a mid-stream error: {}", message);
                    emit(&tx, &cancel, StreamEvent::Error(message)).await;
                    return;
                }
            }
        }

        if ended {
            debug!("Stream ended without [DONE]");
            emit(&tx, &cancel, StreamEvent::Completed { finish_reason }).await;
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatrelay_domain::{Provider, ProviderConfig, ProviderSettings, Role};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    const SSE_HEAD: &str = "HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nConnection: close\r\n\r\n";

    fn chunk(content: &str) -> String {
        format!(
            "data: {}\n\n",
            serde_json::json!({"choices": [{"index": 0, "delta": {"content": content}}]})
        )
    }

    async fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut scratch = [0u8; 4096];
        loop {
            let n = stream.read(&mut scratch).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&scratch[..n]);
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let length = head
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    /// Accept one connection, reply with `response`, then optionally hold it open.
    async fn serve_once(response: String, hold: Option<Duration>) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}/v1", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let request = read_request(&mut stream).await;
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.flush().await.unwrap();
            if let Some(hold) = hold {
                tokio::time::sleep(hold).await;
            }
            request
        });
        (base_url, handle)
    }

    fn gateway(base_url: &str, behavior: BehaviorConfig) -> OpenAiCompatGateway {
        let mut config = ProviderConfig::default();
        config.providers.insert(
            Provider::Qwen,
            ProviderSettings {
                credential: Some("sk-test".into()),
                base_url: base_url.to_string(),
                default_model: "qwen-turbo-latest".into(),
            },
        );
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        OpenAiCompatGateway::with_client(client, Arc::new(ProviderRegistry::new(config)), behavior)
    }

    fn target() -> ModelTarget {
        ModelTarget::new(Provider::Qwen, "qwen-plus")
    }

    async fn drain(mut handle: StreamHandle) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        while let Some(event) = handle.next().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn streams_deltas_until_done() {
        let body = format!(
            "data: {}\n\n{}: keep-alive\n\n{}data: {}\n\ndata: [DONE]\n\n",
            serde_json::json!({"choices": [{"delta": {"role": "assistant", "content": ""}}]}),
            chunk("Hel"),
            chunk("lo"),
            serde_json::json!({"choices": [{"delta": {}, "finish_reason": "stop"}]}),
        );
        let (base_url, server) = serve_once(format!("{}{}", SSE_HEAD, body), None).await;

        let handle = gateway(&base_url, BehaviorConfig::default())
            .stream_complete(&target(), &[ChatMessage::user("hi")])
            .await
            .unwrap();
        let events = drain(handle).await;

        assert_eq!(
            events,
            vec![
                StreamEvent::Delta {
                    role: Some(Role::Assistant),
                    content: String::new()
                },
                StreamEvent::delta("Hel"),
                StreamEvent::delta("lo"),
                StreamEvent::Completed {
                    finish_reason: Some("stop".into())
                },
            ]
        );

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /v1/chat/completions"));
        assert!(request.to_lowercase().contains("authorization: bearer sk-test"));
        assert!(request.contains("\"stream\":true"));
        assert!(request.contains("\"model\":\"qwen-plus\""));
    }

    #[tokio::test]
    async fn stream_without_done_still_completes() {
        let (base_url, _server) =
            serve_once(format!("{}{}", SSE_HEAD, chunk("partial")), None).await;

        let handle = gateway(&base_url, BehaviorConfig::default())
            .stream_complete(&target(), &[ChatMessage::user("hi")])
            .await
            .unwrap();

        assert_eq!(
            drain(handle).await,
            vec![
                StreamEvent::delta("partial"),
                StreamEvent::Completed {
                    finish_reason: None
                }
            ]
        );
    }

    #[tokio::test]
    async fn mid_stream_error_is_terminal() {
        let body = format!(
            "{}data: {}\n\n{}",
            chunk("a"),
            serde_json::json!({"error": {"message": "rate limited"}}),
            chunk("never"),
        );
        let (base_url, _server) = serve_once(format!("{}{}", SSE_HEAD, body), None).await;

        let handle = gateway(&base_url, BehaviorConfig::default())
            .stream_complete(&target(), &[ChatMessage::user("hi")])
            .await
            .unwrap();

        assert_eq!(
            drain(handle).await,
            vec![
                StreamEvent::delta("a"),
                StreamEvent::Error("rate limited".into())
            ]
        );
    }

    #[tokio::test]
    async fn non_success_status_fails_at_open() {
        let body = r#"{"error":{"message":"Invalid API key"}}"#;
        let response = format!(
            "HTTP/1.1 401 Unauthorized\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        let (base_url, _server) = serve_once(response, None).await;

        let err = gateway(&base_url, BehaviorConfig::default())
            .stream_complete(&target(), &[ChatMessage::user("hi")])
            .await
            .err()
            .unwrap();

        match err {
            GatewayError::Provider(message) => {
                assert!(message.contains("401"));
                assert!(message.contains("Invalid API key"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_credential_fails_without_a_request() {
        let gateway = OpenAiCompatGateway::new(
            Arc::new(ProviderRegistry::new(ProviderConfig::default())),
            BehaviorConfig::default(),
        );

        let err = gateway
            .stream_complete(&ModelTarget::new(Provider::Kimi, ""), &[])
            .await
            .err()
            .unwrap();

        assert_eq!(err, GatewayError::MissingCredential(Provider::Kimi));
    }

    #[tokio::test]
    async fn connection_refused_is_a_provider_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}/v1", listener.local_addr().unwrap());
        drop(listener);

        let err = gateway(&base_url, BehaviorConfig::default())
            .stream_complete(&target(), &[ChatMessage::user("hi")])
            .await
            .err()
            .unwrap();

        assert!(matches!(err, GatewayError::Provider(_)));
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}/v1", listener.local_addr().unwrap());
        let _server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            read_request(&mut stream).await;
            tokio::time::sleep(Duration::from_secs(10)).await;
        });

        let behavior = BehaviorConfig {
            timeout: Some(Duration::from_millis(200)),
            ..Default::default()
        };
        let err = gateway(&base_url, behavior)
            .stream_complete(&target(), &[ChatMessage::user("hi")])
            .await
            .err()
            .unwrap();

        assert_eq!(err, GatewayError::Timeout);
    }

    #[tokio::test]
    async fn stalled_stream_times_out_after_open() {
        let (base_url, _server) = serve_once(
            format!("{}{}", SSE_HEAD, chunk("first")),
            Some(Duration::from_secs(10)),
        )
        .await;
        let behavior = BehaviorConfig {
            timeout: Some(Duration::from_millis(200)),
            ..Default::default()
        };

        let handle = gateway(&base_url, behavior)
            .stream_complete(&target(), &[ChatMessage::user("hi")])
            .await
            .unwrap();
        let events = tokio::time::timeout(Duration::from_secs(3), drain(handle))
            .await
            .expect("stream should end once the provider goes quiet");

        assert_eq!(
            events,
            vec![
                StreamEvent::delta("first"),
                StreamEvent::Error(STALL_MESSAGE.into())
            ]
        );
    }

    #[tokio::test]
    async fn cancel_releases_an_open_stream() {
        let (base_url, _server) = serve_once(
            format!("{}{}", SSE_HEAD, chunk("first")),
            Some(Duration::from_secs(10)),
        )
        .await;

        let mut handle = gateway(&base_url, BehaviorConfig::default())
            .stream_complete(&target(), &[ChatMessage::user("hi")])
            .await
            .unwrap();

        assert_eq!(handle.next().await, Some(StreamEvent::delta("first")));
        handle.cancel();

        let rest = tokio::time::timeout(Duration::from_secs(2), handle.next())
            .await
            .unwrap();
        assert_eq!(rest, None);
    }

    #[tokio::test]
    async fn complete_uses_a_plain_request() {
        let body = serde_json::json!({
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "{\"a\":1}"}}]
        })
        .to_string();
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        let (base_url, server) = serve_once(response, None).await;

        let text = gateway(&base_url, BehaviorConfig::default())
            .complete(&target(), &[ChatMessage::user("json please")])
            .await
            .unwrap();

        assert_eq!(text, "{\"a\":1}");
        assert!(server.await.unwrap().contains("\"stream\":false"));
    }

    #[test]
    fn decode_payload_tracks_finish_reason() {
        let mut finish = None;
        let decoded = decode_payload(
            r#"{"choices":[{"delta":{"content":"x"},"finish_reason":"length"}]}"#,
            &mut finish,
        );
        assert_eq!(decoded, Decoded::Events(vec![StreamEvent::delta("x")]));
        assert_eq!(finish.as_deref(), Some("length"));
        assert_eq!(decode_payload(" [DONE] ", &mut finish), Decoded::Done);
    }

    #[test]
    fn decode_payload_skips_garbage_and_empty_deltas() {
        let mut finish = None;
        assert_eq!(decode_payload("not json", &mut finish), Decoded::Events(vec![]));
        assert_eq!(
            decode_payload(r#"{"choices":[{"delta":{"content":""}}]}"#, &mut finish),
            Decoded::Events(vec![])
        );
    }

    #[test]
    fn endpoint_joins_base_url() {
        assert_eq!(
            endpoint("https://api.deepseek.com/v1/"),
            "https://api.deepseek.com/v1/chat/completions"
        );
    }
}
