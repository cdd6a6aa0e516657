use std::collections::HashSet;

use anyhow::{Context, Result};
use async_trait::async_trait;
use client_core::{CanvasBridge, WebhookClient};
use shared::{domain::Capability, protocol::CanvasCommand};
use tokio::sync::mpsc;
use tracing::info;

use crate::intents::resolve_intent;

const SUCCESS: &str = "SUCCESS";

/// Routes the page's text queries back through the webhook, like the real host would.
pub struct WebhookBridge {
    client: WebhookClient,
    capabilities: HashSet<Capability>,
    canvas: mpsc::UnboundedSender<CanvasCommand>,
}

impl WebhookBridge {
    pub fn new(
        client: WebhookClient,
        capabilities: HashSet<Capability>,
        canvas: mpsc::UnboundedSender<CanvasCommand>,
    ) -> Self {
        Self {
            client,
            capabilities,
            canvas,
        }
    }
}

#[async_trait]
impl CanvasBridge for WebhookBridge {
    async fn send_text_query(&self, query: &str) -> Result<String> {
        let mut event = resolve_intent(query);
        event.capabilities = self.capabilities.clone();

        let response = self
            .client
            .send_intent(&event)
            .await
            .with_context(|| format!("text query '{query}' failed"))?;
        for reply in response.replies() {
            info!(%reply, "assistant");
        }
        if let Some(command) = response.canvas_state() {
            self.canvas
                .send(command.clone())
                .context("scene intake closed")?;
        }
        Ok(SUCCESS.to_string())
    }
}
