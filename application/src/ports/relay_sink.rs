//! Push transport port
//!
//! A [`RelaySink`] receives the frames of one streamed turn, in order. A send
//! failure means the consumer has gone away; the orchestrator stops relaying
//! and cancels the upstream stream when it sees one.

use async_trait::async_trait;
use chatrelay_domain::RelayFrame;
use thiserror::Error;

/// The consumer of a relay stream disconnected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Relay consumer disconnected")]
pub struct RelayClosed;

/// Port for pushing relay frames to a caller
#[async_trait]
pub trait RelaySink: Send + Sync {
    async fn send(&self, frame: RelayFrame) -> Result<(), RelayClosed>;
}
