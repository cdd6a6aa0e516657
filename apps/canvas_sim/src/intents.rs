//! Keyword stand-in for the platform's language understanding.

use shared::domain::IntentEvent;

const COLOR_WORDS: &[&str] = &[
    "red", "green", "blue", "purple", "yellow", "orange", "pink", "white", "black", "teal",
];

pub fn resolve_intent(text: &str) -> IntentEvent {
    let lower = text.trim().to_ascii_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect();
    let has = |candidates: &[&str]| words.iter().any(|word| candidates.contains(word));

    let event = if let Some(color) = words.iter().find(|word| COLOR_WORDS.contains(*word)) {
        IntentEvent::new("color").with_parameter("color", *color)
    } else if has(&["color", "colour"]) {
        let slot = words.last().copied().unwrap_or_default();
        IntentEvent::new("color").with_parameter("color", slot)
    } else if has(&["pause", "stop", "freeze"]) {
        IntentEvent::new("pause")
    } else if has(&["start", "spin", "spinning", "resume"]) {
        IntentEvent::new("start")
    } else if has(&["later", "timer"]) {
        IntentEvent::new("timer")
    } else if has(&["help", "instructions"]) {
        IntentEvent::new("instructions")
    } else {
        IntentEvent::new("fallback")
    };
    event.with_query(text.trim())
}

#[cfg(test)]
#[path = "tests/intents_tests.rs"]
mod tests;
