use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{CanvasResponse, Capability, Fulfillment, IntentEvent, Tint};

/// Commands the scene acts on. Tagged by an upper-case `command` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SceneCommand {
    Tint { tint: Tint },
    Spin { spin: bool },
}

/// Data carried from the fulfillment to the embedded page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CanvasCommand {
    Scene(SceneCommand),
    Timer { timer: u32 },
    Instructions { instructions: bool },
    Query { query: String },
}

impl CanvasCommand {
    pub fn tint(tint: Tint) -> Self {
        Self::Scene(SceneCommand::Tint { tint })
    }

    pub fn spin(spin: bool) -> Self {
        Self::Scene(SceneCommand::Spin { spin })
    }

    pub fn query(query: impl Into<String>) -> Self {
        Self::Query {
            query: query.into(),
        }
    }
}

// Inbound fulfillment request.

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    pub query_result: QueryResult,
    #[serde(default)]
    pub original_detect_intent_request: OriginalDetectIntentRequest,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    #[serde(default)]
    pub query_text: String,
    #[serde(default)]
    pub parameters: HashMap<String, serde_json::Value>,
    pub intent: IntentRef,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentRef {
    pub display_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OriginalDetectIntentRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub payload: PlatformPayload,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformPayload {
    #[serde(default)]
    pub surface: Surface,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Surface {
    #[serde(default)]
    pub capabilities: Vec<CapabilityEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityEntry {
    pub name: String,
}

impl From<&WebhookRequest> for IntentEvent {
    fn from(req: &WebhookRequest) -> Self {
        IntentEvent {
            name: req.query_result.intent.display_name.clone(),
            parameters: req.query_result.parameters.clone(),
            query: req.query_result.query_text.clone(),
            capabilities: req
                .original_detect_intent_request
                .payload
                .surface
                .capabilities
                .iter()
                .map(|entry| Capability::from_name(&entry.name))
                .collect(),
        }
    }
}

impl From<&IntentEvent> for WebhookRequest {
    fn from(event: &IntentEvent) -> Self {
        WebhookRequest {
            response_id: None,
            session: None,
            query_result: QueryResult {
                query_text: event.query.clone(),
                parameters: event.parameters.clone(),
                intent: IntentRef {
                    display_name: event.name.clone(),
                },
            },
            original_detect_intent_request: OriginalDetectIntentRequest {
                source: Some("google".to_string()),
                payload: PlatformPayload {
                    surface: Surface {
                        capabilities: event
                            .capabilities
                            .iter()
                            .map(|capability| CapabilityEntry {
                                name: capability.name().to_string(),
                            })
                            .collect(),
                    },
                },
            },
        }
    }
}

// Outbound fulfillment response.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub payload: ResponsePayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponsePayload {
    pub google: GooglePayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GooglePayload {
    pub expect_user_response: bool,
    pub rich_response: RichResponse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichResponse {
    pub items: Vec<RichItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RichItem {
    SimpleResponse(SimpleResponse),
    HtmlResponse(HtmlResponse),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleResponse {
    pub text_to_speech: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HtmlResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_state: Option<CanvasCommand>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub suppress_mic: bool,
}

impl From<Fulfillment> for WebhookResponse {
    fn from(fulfillment: Fulfillment) -> Self {
        let mut items: Vec<RichItem> = fulfillment
            .replies
            .into_iter()
            .map(|text_to_speech| RichItem::SimpleResponse(SimpleResponse { text_to_speech }))
            .collect();
        if let Some(canvas) = fulfillment.canvas {
            items.push(RichItem::HtmlResponse(HtmlResponse {
                url: canvas.url,
                updated_state: canvas.data,
                suppress_mic: canvas.suppress,
            }));
        }

        WebhookResponse {
            payload: ResponsePayload {
                google: GooglePayload {
                    expect_user_response: fulfillment.expect_user_response,
                    rich_response: RichResponse { items },
                },
            },
        }
    }
}

impl WebhookResponse {
    pub fn expects_user_response(&self) -> bool {
        self.payload.google.expect_user_response
    }

    pub fn replies(&self) -> impl Iterator<Item = &str> {
        self.payload
            .google
            .rich_response
            .items
            .iter()
            .filter_map(|item| match item {
                RichItem::SimpleResponse(simple) => Some(simple.text_to_speech.as_str()),
                RichItem::HtmlResponse(_) => None,
            })
    }

    pub fn html(&self) -> Option<&HtmlResponse> {
        self.payload
            .google
            .rich_response
            .items
            .iter()
            .find_map(|item| match item {
                RichItem::HtmlResponse(html) => Some(html),
                RichItem::SimpleResponse(_) => None,
            })
    }

    pub fn canvas_state(&self) -> Option<&CanvasCommand> {
        self.html().and_then(|html| html.updated_state.as_ref())
    }
}

impl From<HtmlResponse> for CanvasResponse {
    fn from(html: HtmlResponse) -> Self {
        CanvasResponse {
            url: html.url,
            data: html.updated_state,
            suppress: html.suppress_mic,
        }
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
