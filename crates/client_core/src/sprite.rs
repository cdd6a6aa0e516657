use std::time::Duration;

use serde::{Deserialize, Serialize};
use shared::domain::Tint;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpriteState {
    /// Radians; grows without bound while spinning.
    pub rotation: f64,
    pub tint: Tint,
    pub spin: bool,
}

impl Default for SpriteState {
    fn default() -> Self {
        Self {
            rotation: 0.0,
            tint: Tint::GREEN,
            spin: true,
        }
    }
}

impl SpriteState {
    /// One radian per elapsed second while spinning.
    pub fn advance(&mut self, delta: Duration) {
        if self.spin {
            self.rotation += delta.as_secs_f64();
        }
    }

    pub fn toggle_spin(&mut self) {
        self.spin = !self.spin;
    }
}

#[cfg(test)]
#[path = "tests/sprite_tests.rs"]
mod tests;
