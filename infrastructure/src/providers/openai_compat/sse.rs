//! Incremental decoder for `text/event-stream` bodies.
//!
//! Bytes arrive in arbitrary slices; the decoder buffers partial lines and
//! yields the joined `data:` payload of each complete event. Comments,
//! `event:`/`id:`/`retry:` fields and empty events are dropped.

/// Payload that marks the end of an OpenAI-style stream.
pub const DONE_SENTINEL: &str = "[DONE]";

#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a slice of the body and return the payloads it completed.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);
        let mut payloads = Vec::new();

        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\n', '\r']);
            if let Some(payload) = self.process_line(line) {
                payloads.push(payload);
            }
        }

        payloads
    }

    /// Flush an event left open when the body ended without a blank line.
    pub fn finish(&mut self) -> Option<String> {
        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            let line = String::from_utf8_lossy(&rest).trim_end_matches('\r').to_string();
            if let Some(payload) = self.process_line(&line) {
                return Some(payload);
            }
        }
        self.dispatch()
    }

    fn process_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        if field == "data" {
            self.data.push(value.to_string());
        }
        None
    }

    fn dispatch(&mut self) -> Option<String> {
        if self.data.is_empty() {
            return None;
        }
        let payload = self.data.join("\n");
        self.data.clear();
        Some(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yields_one_payload_per_event() {
        let mut decoder = SseDecoder::new();
        let out = decoder.feed(b"data: {\"a\":1}\n\ndata: [DONE]\n\n");
        assert_eq!(out, vec!["{\"a\":1}".to_string(), DONE_SENTINEL.to_string()]);
    }

    #[test]
    fn reassembles_events_split_across_reads() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"da").is_empty());
        assert!(decoder.feed(b"ta: hel").is_empty());
        assert!(decoder.feed(b"lo\r\n").is_empty());
        assert_eq!(decoder.feed(b"\r\n"), vec!["hello".to_string()]);
    }

    #[test]
    fn keeps_multibyte_characters_split_across_reads() {
        let bytes = "data: 你好\n\n".as_bytes();
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(&bytes[..8]).is_empty());
        assert_eq!(decoder.feed(&bytes[8..]), vec!["你好".to_string()]);
    }

    #[test]
    fn ignores_comments_and_other_fields() {
        let mut decoder = SseDecoder::new();
        let out = decoder.feed(b": keep-alive\n\nevent: message\nid: 7\ndata: x\n\n");
        assert_eq!(out, vec!["x".to_string()]);
    }

    #[test]
    fn joins_multiline_data() {
        let mut decoder = SseDecoder::new();
        let out = decoder.feed(b"data: line one\ndata: line two\n\n");
        assert_eq!(out, vec!["line one\nline two".to_string()]);
    }

    #[test]
    fn finish_flushes_unterminated_event() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"data: tail").is_empty());
        assert_eq!(decoder.finish(), Some("tail".to_string()));
        assert_eq!(decoder.finish(), None);
    }
}
