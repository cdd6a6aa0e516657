use reqwest::Client;
use shared::{
    domain::IntentEvent,
    error::ApiError,
    protocol::{WebhookRequest, WebhookResponse},
};
use tracing::debug;
use url::Url;

use crate::error::WebhookClientError;

/// Posts intents to a fulfillment webhook the way the conversational platform would.
#[derive(Clone)]
pub struct WebhookClient {
    http: Client,
    url: Url,
}

impl WebhookClient {
    pub fn new(url: &str) -> Result<Self, WebhookClientError> {
        Ok(Self {
            http: Client::new(),
            url: Url::parse(url)?,
        })
    }

    pub async fn send_intent(
        &self,
        event: &IntentEvent,
    ) -> Result<WebhookResponse, WebhookClientError> {
        debug!(intent = %event.name, url = %self.url, "posting intent");
        let response = self
            .http
            .post(self.url.clone())
            .json(&WebhookRequest::from(event))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error = response.json::<ApiError>().await.ok();
            return Err(WebhookClientError::Rejected {
                status: status.as_u16(),
                error,
            });
        }

        Ok(response.json::<WebhookResponse>().await?)
    }
}

#[cfg(test)]
#[path = "tests/webhook_tests.rs"]
mod tests;
