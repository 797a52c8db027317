//! Keyboard sampling for movement intents

use macroquad::prelude::*;
use shared::MOVE_STEP;

/// Samples the movement keys and returns the per-frame delta intent, or
/// None when no direction key is held. Opposite keys cancel out.
/// Supports both WASD and arrow keys.
pub fn sample_move_intent() -> Option<(i32, i32)> {
    let mut dx = 0;
    let mut dy = 0;

    if is_key_down(KeyCode::A) || is_key_down(KeyCode::Left) {
        dx -= MOVE_STEP;
    }
    if is_key_down(KeyCode::D) || is_key_down(KeyCode::Right) {
        dx += MOVE_STEP;
    }
    if is_key_down(KeyCode::W) || is_key_down(KeyCode::Up) {
        dy -= MOVE_STEP;
    }
    if is_key_down(KeyCode::S) || is_key_down(KeyCode::Down) {
        dy += MOVE_STEP;
    }

    if dx == 0 && dy == 0 {
        None
    } else {
        Some((dx, dy))
    }
}
