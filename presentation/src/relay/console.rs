//! Plain-text relay sink.

use async_trait::async_trait;
use chatrelay_application::ports::relay_sink::{RelayClosed, RelaySink};
use chatrelay_domain::RelayFrame;
use std::io::Write;
use std::sync::Mutex;

/// Prints assistant text as it arrives and a newline at the end.
pub struct ConsoleRelaySink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> ConsoleRelaySink<W> {
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
impl<W: Write + Send> RelaySink for ConsoleRelaySink<W> {
    async fn send(&self, frame: RelayFrame) -> Result<(), RelayClosed> {
        let text = match &frame {
            RelayFrame::Start => return Ok(()),
            RelayFrame::Data(chunk) => match chunk.content() {
                Some(content) => content.to_string(),
                None => return Ok(()),
            },
            RelayFrame::End => "\n".to_string(),
        };
        let mut writer = self.writer.lock().map_err(|_| RelayClosed)?;
        writer
            .write_all(text.as_bytes())
            .and_then(|_| writer.flush())
            .map_err(|_| RelayClosed)
    }
}
