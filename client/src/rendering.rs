//! macroquad rendering of the mirrored arena

use crate::game::MirrorState;
use macroquad::prelude::*;
use shared::{Collectible, Player, CANVAS_BOUND_X, CANVAS_BOUND_Y, PLAYER_HITBOX};

/// Pixel offset of the play field inside the window; leaves a header strip
/// for the title, controls and rank line.
pub const ARENA_OFFSET_X: f32 = 10.0;
pub const ARENA_OFFSET_Y: f32 = 60.0;

pub const WINDOW_WIDTH: i32 = 640;
pub const WINDOW_HEIGHT: i32 = 480;

pub struct Renderer {
    arena_w: f32,
    arena_h: f32,
}

impl Renderer {
    pub fn new() -> Self {
        // Positions are top-left coordinates bounded by the canvas limits,
        // so the field extends one hitbox past each bound.
        Self {
            arena_w: (CANVAS_BOUND_X + PLAYER_HITBOX) as f32,
            arena_h: (CANVAS_BOUND_Y + PLAYER_HITBOX) as f32,
        }
    }

    pub fn render(&self, state: &MirrorState) {
        clear_background(Color::from_rgba(26, 26, 26, 255));

        self.draw_arena();
        self.draw_header(state);

        for collectible in state.collectibles() {
            self.draw_collectible(collectible);
        }

        for player in state.players() {
            let is_me = Some(player.id) == state.my_id();
            self.draw_player(player, is_me);
        }
    }

    pub fn render_connection_error(&self, message: &str) {
        clear_background(Color::from_rgba(26, 26, 26, 255));
        draw_text(
            message,
            screen_width() / 2.0 - 120.0,
            screen_height() / 2.0,
            30.0,
            RED,
        );
    }

    fn draw_arena(&self) {
        draw_rectangle(
            ARENA_OFFSET_X,
            ARENA_OFFSET_Y,
            self.arena_w,
            self.arena_h,
            Color::from_rgba(68, 68, 68, 255),
        );
    }

    fn draw_header(&self, state: &MirrorState) {
        draw_text("Controls: WASD", 10.0, 40.0, 25.0, WHITE);
        draw_text(
            "Collectible Arena",
            screen_width() / 2.0 - 80.0,
            40.0,
            30.0,
            WHITE,
        );

        let rank_text = match state.rank() {
            Some((rank, total)) => format!("Rank: {}/{}", rank, total),
            None => "Loading".to_string(),
        };
        draw_text(&rank_text, screen_width() - 130.0, 40.0, 25.0, WHITE);
    }

    fn draw_player(&self, player: &Player, is_me: bool) {
        let x = ARENA_OFFSET_X + player.x as f32;
        let y = ARENA_OFFSET_Y + player.y as f32;
        let size = PLAYER_HITBOX as f32;

        let color = if is_me {
            GREEN
        } else {
            Color::from_rgba(255, 68, 68, 255)
        };

        draw_rectangle(x, y, size, size, color);
        draw_rectangle_lines(x, y, size, size, 2.0, WHITE);

        let score_text = format!("{}", player.score);
        draw_text(&score_text, x + size / 2.0 - 4.0, y - 4.0, 16.0, WHITE);
    }

    fn draw_collectible(&self, collectible: &Collectible) {
        let x = ARENA_OFFSET_X + collectible.x as f32;
        let y = ARENA_OFFSET_Y + collectible.y as f32;

        draw_rectangle(x, y, collectible.w as f32, collectible.h as f32, YELLOW);

        let value_text = format!("{}", collectible.value);
        draw_text(&value_text, x, y - 2.0, 15.0, WHITE);
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
