use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::{domain::Tint, protocol::SceneCommand};
use tracing::{debug, info, warn};

use crate::sprite::SpriteState;

/// Text sent to the host when the restart control is pressed.
pub const RESTART_QUERY: &str = "Restart game";

const SUCCESS_STATUS: &str = "SUCCESS";
const MAX_TINT: u64 = 0xFF_FF_FF;

/// How an outstanding restart query ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestartOutcome {
    Replied(String),
    Failed(String),
    TimedOut(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub sprite: SpriteState,
    pub restart_enabled: bool,
    pub frames: u64,
}

/// Sprite plus the restart control. All mutation goes through here.
#[derive(Debug, Clone)]
pub struct Scene {
    sprite: SpriteState,
    restart_enabled: bool,
    frames: u64,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(SpriteState::default())
    }
}

impl Scene {
    pub fn new(sprite: SpriteState) -> Self {
        Self {
            sprite,
            restart_enabled: true,
            frames: 0,
        }
    }

    pub fn sprite(&self) -> &SpriteState {
        &self.sprite
    }

    pub fn restart_enabled(&self) -> bool {
        self.restart_enabled
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            sprite: self.sprite,
            restart_enabled: self.restart_enabled,
            frames: self.frames,
        }
    }

    pub fn frame(&mut self, delta: Duration) {
        self.frames += 1;
        self.sprite.advance(delta);
    }

    pub fn apply_command(&mut self, command: &SceneCommand) {
        match *command {
            SceneCommand::Tint { tint } => self.sprite.tint = tint,
            SceneCommand::Spin { spin } => self.sprite.spin = spin,
        }
    }

    /// Applies a raw host payload. Returns `false` when nothing in it applied.
    pub fn apply_update(&mut self, data: &Value) -> bool {
        let Some(command) = parse_scene_command(data) else {
            debug!(%data, "ignoring canvas update without a scene command");
            return false;
        };
        debug!(?command, "applying scene command");
        self.apply_command(&command);
        true
    }

    pub fn tap_sprite(&mut self) {
        self.sprite.toggle_spin();
    }

    /// Disables the control and pauses the sprite. `None` while a query is already out.
    pub fn press_restart(&mut self) -> Option<&'static str> {
        if !self.restart_enabled {
            debug!("restart pressed while a request is in flight");
            return None;
        }
        info!("restart request in flight");
        self.restart_enabled = false;
        self.sprite.spin = false;
        Some(RESTART_QUERY)
    }

    pub fn restart_resolved(&mut self, outcome: &RestartOutcome) {
        match outcome {
            RestartOutcome::Replied(status) if status.eq_ignore_ascii_case(SUCCESS_STATUS) => {
                info!(%status, "restart request acknowledged");
                self.sprite.spin = false;
            }
            RestartOutcome::Replied(status) => info!(%status, "restart request answered"),
            RestartOutcome::Failed(error) => warn!(%error, "restart request failed"),
            RestartOutcome::TimedOut(after) => warn!(?after, "restart request timed out"),
        }
        self.restart_enabled = true;
    }
}

fn parse_scene_command(data: &Value) -> Option<SceneCommand> {
    let command = data.get("command")?.as_str()?;
    match command.to_ascii_uppercase().as_str() {
        "TINT" => {
            let tint = data.get("tint")?.as_u64().filter(|t| *t <= MAX_TINT)?;
            Some(SceneCommand::Tint {
                tint: Tint(u32::try_from(tint).ok()?),
            })
        }
        "SPIN" => Some(SceneCommand::Spin {
            spin: data.get("spin")?.as_bool()?,
        }),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/scene_tests.rs"]
mod tests;
