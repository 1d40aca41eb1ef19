use anyhow::Result;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// Ordered stream of raw message payloads from the server.
///
/// Dropping the stream closes the connection.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Connection to the competition server.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open the long-lived tick stream
    async fn open(&self) -> Result<EventStream>;

    /// Ask the server to halt the competition; Ok only on acknowledgment
    async fn request_stop(&self) -> Result<()>;
}
