//! Authoritative game state and the atomic operations that mutate it

use log::{debug, info};
use rand::Rng;
use shared::{
    check_pickup_overlap, Collectible, Player, CANVAS_BOUND_X, CANVAS_BOUND_Y, COLLECTIBLE_H,
    COLLECTIBLE_MAX_VALUE, COLLECTIBLE_MIN_VALUE, COLLECTIBLE_W,
};
use std::collections::HashMap;

/// Canonical world state. Only the server event loop mutates this, and only
/// through the operations below; the containers are never handed out mutably.
#[derive(Debug, Clone)]
pub struct GameState {
    players: HashMap<u32, Player>,
    collectibles: Vec<Collectible>,
    next_player_id: u32,
    next_collectible_id: u32,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            players: HashMap::new(),
            collectibles: Vec::new(),
            next_player_id: 0,
            next_collectible_id: 0,
        }
    }

    /// Creates a player at the fixed spawn point under the next id.
    /// Ids are monotonic and never reused for the lifetime of the process.
    pub fn add_player(&mut self) -> Player {
        self.next_player_id += 1;
        let player = Player::new(self.next_player_id);

        info!("Added player {} at ({}, {})", player.id, player.x, player.y);
        self.players.insert(player.id, player.clone());
        player
    }

    /// Removes a player by id. Removing an id that is already gone is a
    /// no-op and returns false.
    pub fn remove_player(&mut self, id: u32) -> bool {
        if self.players.remove(&id).is_some() {
            info!("Removed player {}", id);
            true
        } else {
            false
        }
    }

    /// Applies a movement delta, validating each axis independently: an axis
    /// whose prospective coordinate would reach the canvas bound (or zero)
    /// is rejected outright, while the other axis may still apply.
    ///
    /// Returns the player's resulting absolute position for rebroadcast,
    /// or None when the id is unknown (e.g. the player just disconnected).
    pub fn move_player(&mut self, id: u32, dx: i32, dy: i32) -> Option<(i32, i32)> {
        let player = match self.players.get_mut(&id) {
            Some(player) => player,
            None => {
                debug!("Dropping move intent for unknown player {}", id);
                return None;
            }
        };

        // Deltas come straight off the wire; widen before adding so a huge
        // value is just an out-of-bounds rejection, not an overflow.
        let next_x = player.x as i64 + dx as i64;
        if next_x > 0 && next_x < CANVAS_BOUND_X as i64 {
            player.x = next_x as i32;
        }

        let next_y = player.y as i64 + dy as i64;
        if next_y > 0 && next_y < CANVAS_BOUND_Y as i64 {
            player.y = next_y as i32;
        }

        Some((player.x, player.y))
    }

    /// Spawns one collectible if and only if none is active. Position is
    /// uniform within the canvas minus the hitbox, value uniform in the
    /// configured range.
    pub fn spawn_collectible<R: Rng>(&mut self, rng: &mut R) -> Option<Collectible> {
        if !self.collectibles.is_empty() {
            return None;
        }

        self.next_collectible_id += 1;
        let collectible = Collectible::new(
            self.next_collectible_id,
            rng.gen_range(0..=CANVAS_BOUND_X - COLLECTIBLE_W),
            rng.gen_range(0..=CANVAS_BOUND_Y - COLLECTIBLE_H),
            rng.gen_range(COLLECTIBLE_MIN_VALUE..=COLLECTIBLE_MAX_VALUE),
        );

        info!(
            "Spawned collectible {} at ({}, {}) worth {}",
            collectible.id, collectible.x, collectible.y, collectible.value
        );
        self.collectibles.push(collectible.clone());
        Some(collectible)
    }

    /// Validates a collection claim against server-side positions. On
    /// success the collectible is removed, which makes the resolution
    /// exactly-once even when two clients race for the same id.
    pub fn resolve_collection(&mut self, player_id: u32, collectible_id: u32) -> bool {
        let player = match self.players.get(&player_id) {
            Some(player) => player,
            None => {
                debug!("Dropping collection claim from unknown player {}", player_id);
                return false;
            }
        };

        let index = match self
            .collectibles
            .iter()
            .position(|c| c.id == collectible_id)
        {
            Some(index) => index,
            None => {
                debug!("Dropping stale claim for collectible {}", collectible_id);
                return false;
            }
        };

        if !check_pickup_overlap(player, &self.collectibles[index]) {
            debug!(
                "Rejected claim: player {} does not overlap collectible {}",
                player_id, collectible_id
            );
            return false;
        }

        let collectible = self.collectibles.remove(index);
        info!(
            "Player {} collected {} (value {})",
            player_id, collectible.id, collectible.value
        );
        true
    }

    /// Full state copy for the snapshot sent to a newly joined client.
    pub fn snapshot(&self) -> (Vec<Player>, Vec<Collectible>) {
        (
            self.players.values().cloned().collect(),
            self.collectibles.clone(),
        )
    }

    pub fn player(&self, id: u32) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn collectible_count(&self) -> usize {
        self.collectibles.len()
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
