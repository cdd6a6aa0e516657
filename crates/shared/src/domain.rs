use std::{
    collections::{HashMap, HashSet},
    fmt,
};

use serde::{Deserialize, Serialize};

use crate::protocol::CanvasCommand;

/// Packed `0xRRGGBB` sprite tint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tint(pub u32);

impl Tint {
    pub const RED: Tint = Tint(0xFF0000);
    pub const GREEN: Tint = Tint(0x00FF00);
    pub const BLUE: Tint = Tint(0x0000FF);
}

impl fmt::Display for Tint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.0)
    }
}

pub const INTERACTIVE_CANVAS: &str = "actions.capability.INTERACTIVE_CANVAS";
pub const SCREEN_OUTPUT: &str = "actions.capability.SCREEN_OUTPUT";
pub const AUDIO_OUTPUT: &str = "actions.capability.AUDIO_OUTPUT";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Capability {
    InteractiveCanvas,
    ScreenOutput,
    AudioOutput,
    Other(String),
}

impl Capability {
    pub fn from_name(name: &str) -> Self {
        match name {
            INTERACTIVE_CANVAS => Self::InteractiveCanvas,
            SCREEN_OUTPUT => Self::ScreenOutput,
            AUDIO_OUTPUT => Self::AudioOutput,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::InteractiveCanvas => INTERACTIVE_CANVAS,
            Self::ScreenOutput => SCREEN_OUTPUT,
            Self::AudioOutput => AUDIO_OUTPUT,
            Self::Other(name) => name,
        }
    }
}

/// A recognized utterance as delivered by the conversational platform.
#[derive(Debug, Clone, Default)]
pub struct IntentEvent {
    pub name: String,
    pub parameters: HashMap<String, serde_json::Value>,
    /// Raw text of what the user said.
    pub query: String,
    pub capabilities: HashSet<Capability>,
}

impl IntentEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    pub fn has_capability(&self, capability: &Capability) -> bool {
        self.capabilities.contains(capability)
    }

    /// String slot value, if the platform filled it with a string.
    pub fn parameter_str(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).and_then(serde_json::Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<CanvasCommand>,
    #[serde(default)]
    pub suppress: bool,
}

impl CanvasResponse {
    pub fn embed(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            data: None,
            suppress: false,
        }
    }

    pub fn data(command: CanvasCommand) -> Self {
        Self {
            url: None,
            data: Some(command),
            suppress: false,
        }
    }

    pub fn suppressed(mut self) -> Self {
        self.suppress = true;
        self
    }
}

/// Spoken replies plus the optional canvas item for one intent.
#[derive(Debug, Clone, PartialEq)]
pub struct Fulfillment {
    pub replies: Vec<String>,
    pub canvas: Option<CanvasResponse>,
    pub expect_user_response: bool,
}

impl Fulfillment {
    pub fn ask(reply: impl Into<String>) -> Self {
        Self {
            replies: vec![reply.into()],
            canvas: None,
            expect_user_response: true,
        }
    }

    pub fn close(reply: impl Into<String>) -> Self {
        Self {
            replies: vec![reply.into()],
            canvas: None,
            expect_user_response: false,
        }
    }

    pub fn with_canvas(mut self, canvas: CanvasResponse) -> Self {
        self.canvas = Some(canvas);
        self
    }

    pub fn command(&self) -> Option<&CanvasCommand> {
        self.canvas.as_ref().and_then(|canvas| canvas.data.as_ref())
    }
}
