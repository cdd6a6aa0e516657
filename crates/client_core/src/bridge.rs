use anyhow::Result;
use async_trait::async_trait;

/// The host side of the embedded page's messaging channel.
#[async_trait]
pub trait CanvasBridge: Send + Sync {
    /// Sends `query` as if the user had spoken it. Resolves to the host's status text.
    async fn send_text_query(&self, query: &str) -> Result<String>;
}
