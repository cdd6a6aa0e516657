//! Intent dispatch for the spinning-triangle canvas action.
//!
//! Every handler is a pure function of the incoming [`IntentEvent`] and the
//! immutable [`DispatchContext`]; nothing is read or written across requests.

use std::collections::HashMap;

use shared::{
    domain::{CanvasResponse, Capability, Fulfillment, IntentEvent, Tint},
    error::ApiError,
    protocol::CanvasCommand,
};
use tracing::debug;

pub const COLOR_PARAMETER: &str = "color";
pub const TIMER_SECONDS: u32 = 5;

const PROMPT: &str =
    "Do you want me to change color or pause spinning? You can also tell me to ask you later.";

/// Spoken color names the scene can be tinted with.
#[derive(Debug, Clone)]
pub struct ColorLexicon {
    tints: HashMap<&'static str, Tint>,
}

impl Default for ColorLexicon {
    fn default() -> Self {
        Self {
            tints: HashMap::from([
                ("red", Tint::RED),
                ("green", Tint::GREEN),
                ("blue", Tint::BLUE),
            ]),
        }
    }
}

impl ColorLexicon {
    pub fn lookup(&self, spoken: &str) -> Option<Tint> {
        let key = spoken.trim().to_ascii_lowercase();
        self.tints.get(key.as_str()).copied()
    }
}

#[derive(Debug, Clone)]
pub struct DispatchContext {
    /// Page the platform embeds on welcome.
    pub canvas_url: String,
    pub lexicon: ColorLexicon,
}

impl DispatchContext {
    pub fn new(canvas_url: impl Into<String>) -> Self {
        Self {
            canvas_url: canvas_url.into(),
            lexicon: ColorLexicon::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Welcome,
    Fallback,
    Color,
    Start,
    Pause,
    Timer,
    Instructions,
}

impl Intent {
    pub const ALL: [Intent; 7] = [
        Intent::Welcome,
        Intent::Fallback,
        Intent::Color,
        Intent::Start,
        Intent::Pause,
        Intent::Timer,
        Intent::Instructions,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|intent| intent.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Intent::Welcome => "welcome",
            Intent::Fallback => "fallback",
            Intent::Color => "color",
            Intent::Start => "start",
            Intent::Pause => "pause",
            Intent::Timer => "timer",
            Intent::Instructions => "instructions",
        }
    }
}

pub fn handle_intent(ctx: &DispatchContext, event: &IntentEvent) -> Result<Fulfillment, ApiError> {
    if event.name.trim().is_empty() {
        return Err(ApiError::missing_intent());
    }
    let intent =
        Intent::from_name(&event.name).ok_or_else(|| ApiError::unknown_intent(&event.name))?;
    debug!(intent = intent.name(), query = %event.query, "dispatching intent");

    let fulfillment = match intent {
        Intent::Welcome => welcome(ctx, event),
        Intent::Fallback => fallback(event),
        Intent::Color => color(ctx, event),
        Intent::Start => Fulfillment::ask("Ok, I'm spinning. What else?")
            .with_canvas(CanvasResponse::data(CanvasCommand::spin(true))),
        Intent::Pause => Fulfillment::ask("Ok, I paused spinning. What else?")
            .with_canvas(CanvasResponse::data(CanvasCommand::spin(false))),
        Intent::Timer => timer(),
        Intent::Instructions => Fulfillment::ask(PROMPT).with_canvas(CanvasResponse::data(
            CanvasCommand::Instructions { instructions: true },
        )),
    };
    Ok(fulfillment)
}

fn welcome(ctx: &DispatchContext, event: &IntentEvent) -> Fulfillment {
    if !event.has_capability(&Capability::InteractiveCanvas) {
        debug!("surface lacks interactive canvas; closing conversation");
        return Fulfillment::close("Sorry, this device does not support Interactive Canvas!");
    }
    Fulfillment::ask(format!("Welcome! {PROMPT}"))
        .with_canvas(CanvasResponse::embed(ctx.canvas_url.clone()))
}

fn fallback(event: &IntentEvent) -> Fulfillment {
    Fulfillment::ask("I don't understand. You can change my color or pause spinning.")
        .with_canvas(CanvasResponse::data(CanvasCommand::query(echo_query(event))))
}

fn color(ctx: &DispatchContext, event: &IntentEvent) -> Fulfillment {
    let spoken = event.parameter_str(COLOR_PARAMETER).unwrap_or_default();
    match ctx.lexicon.lookup(spoken) {
        Some(tint) => Fulfillment::ask(format!(
            "Ok, I changed my color to {}. What else?",
            spoken.trim()
        ))
        .with_canvas(CanvasResponse::data(CanvasCommand::tint(tint))),
        None => {
            debug!(color = spoken, "color not in lexicon");
            Fulfillment::ask(
                "Sorry, I don't know that color. I only know what red, blue, and green are.",
            )
            .with_canvas(CanvasResponse::data(CanvasCommand::query(echo_query(event))))
        }
    }
}

fn timer() -> Fulfillment {
    Fulfillment::ask(format!("Ok, I'll ask you again in {TIMER_SECONDS} seconds")).with_canvas(
        CanvasResponse::data(CanvasCommand::Timer {
            timer: TIMER_SECONDS,
        })
        .suppressed(),
    )
}

/// Raw query text, or the color slot when the platform sent no text.
fn echo_query(event: &IntentEvent) -> String {
    if event.query.is_empty() {
        event
            .parameter_str(COLOR_PARAMETER)
            .unwrap_or_default()
            .to_string()
    } else {
        event.query.clone()
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
