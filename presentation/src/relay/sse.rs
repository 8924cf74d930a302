//! Server-sent event encoding of relay frames.

use async_trait::async_trait;
use chatrelay_application::ports::relay_sink::{RelayClosed, RelaySink};
use chatrelay_domain::RelayFrame;
use std::io::Write;
use std::sync::Mutex;

/// Encode one frame as an SSE event.
///
/// `start` and `end` carry an empty object; `data` carries the chunk JSON.
pub fn encode_frame(frame: &RelayFrame) -> String {
    let data = match frame {
        RelayFrame::Data(chunk) => {
            serde_json::to_string(chunk).unwrap_or_else(|_| "{}".to_string())
        }
        RelayFrame::Start | RelayFrame::End => "{}".to_string(),
    };
    format!("event: {}\ndata: {}\n\n", frame.event_name(), data)
}

/// Writes SSE-encoded frames to a byte sink, flushing after each frame.
///
/// A write failure (e.g. a closed pipe) is reported as [`RelayClosed`].
pub struct SseRelaySink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> SseRelaySink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl<W: Write + Send> RelaySink for SseRelaySink<W> {
    async fn send(&self, frame: RelayFrame) -> Result<(), RelayClosed> {
        let event = encode_frame(&frame);
        let mut writer = self.writer.lock().map_err(|_| RelayClosed)?;
        writer
            .write_all(event.as_bytes())
            .and_then(|_| writer.flush())
            .map_err(|_| RelayClosed)
    }
}
