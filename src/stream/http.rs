use super::sse::decode_events;
use super::transport::{EventStream, Transport};
use crate::config::ServerConfig;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

/// Transport over plain HTTP: server-sent events in, stop requests out.
pub struct HttpTransport {
    http_client: Client,
    stream_url: String,
    stop_url: String,
    stop_timeout: Duration,
}

impl HttpTransport {
    pub fn new(server: &ServerConfig) -> Result<Self> {
        let http_client = Client::builder()
            .user_agent(concat!("farm-arena/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http_client,
            stream_url: server.stream_url(),
            stop_url: server.stop_url(),
            stop_timeout: server.stop_timeout(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn open(&self) -> Result<EventStream> {
        info!(url = %self.stream_url, "Opening competition stream");

        let response = self
            .http_client
            .get(&self.stream_url)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await
            .context("Failed to open competition stream")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Competition stream refused ({}): {}", status, body));
        }

        debug!(status = %status, "Competition stream open");
        Ok(Box::pin(decode_events(Box::pin(response.bytes_stream()))))
    }

    async fn request_stop(&self) -> Result<()> {
        let response = self
            .http_client
            .post(&self.stop_url)
            .timeout(self.stop_timeout)
            .send()
            .await
            .context("Failed to send stop request")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("Stop request failed: HTTP error! status: {}", status));
        }
        Ok(())
    }
}
