//! Local mirror of the authoritative game state
//!
//! Every mutation here is driven by a server packet. The client never
//! invents state; at most it re-applies the position the server already
//! confirmed. Scores are accumulated locally from `CollectibleCollected`
//! broadcasts using the value recorded when the collectible was first seen.

use log::debug;
use shared::{Collectible, Packet, Player};
use std::collections::HashMap;

pub struct MirrorState {
    my_id: Option<u32>,
    players: HashMap<u32, Player>,
    collectibles: Vec<Collectible>,
}

impl MirrorState {
    pub fn new() -> Self {
        Self {
            my_id: None,
            players: HashMap::new(),
            collectibles: Vec::new(),
        }
    }

    /// Applies one server packet to the mirror.
    pub fn apply(&mut self, packet: Packet) {
        match packet {
            Packet::Connected {
                you,
                players,
                collectibles,
            } => {
                self.my_id = Some(you);
                self.players = players.into_iter().map(|p| (p.id, p)).collect();
                self.collectibles = collectibles;
            }

            Packet::PlayerNew { id } => {
                // The server announces joins to everyone else; a duplicate
                // for an id we already track is ignored.
                self.players.entry(id).or_insert_with(|| Player::new(id));
            }

            Packet::PlayerMove { id, x, y } => {
                if let Some(player) = self.players.get_mut(&id) {
                    player.x = x;
                    player.y = y;
                }
            }

            Packet::PlayerLeave { id } => {
                self.players.remove(&id);
            }

            Packet::CollectibleSpawn { collectible } => {
                self.collectibles.push(collectible);
            }

            Packet::CollectibleCollected { id, collectible } => {
                let index = self.collectibles.iter().position(|c| c.id == collectible);
                if let (Some(player), Some(index)) = (self.players.get_mut(&id), index) {
                    // Score is settled here, from the value seen at spawn
                    // time; the server only confirms the pickup.
                    player.score += self.collectibles[index].value;
                    self.collectibles.remove(index);
                }
            }

            other => {
                debug!("Ignoring unexpected packet: {:?}", other);
            }
        }
    }

    pub fn my_id(&self) -> Option<u32> {
        self.my_id
    }

    pub fn me(&self) -> Option<&Player> {
        self.my_id.and_then(|id| self.players.get(&id))
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn collectibles(&self) -> &[Collectible] {
        &self.collectibles
    }

    /// Own rank by descending score, as `(rank, total)`. Ties rank equal.
    pub fn rank(&self) -> Option<(usize, usize)> {
        let me = self.me()?;
        let better = self.players.values().filter(|p| p.score > me.score).count();
        Some((better + 1, self.players.len()))
    }
}

impl Default for MirrorState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connected_with(players: Vec<Player>, collectibles: Vec<Collectible>, you: u32) -> Packet {
        Packet::Connected {
            you,
            players,
            collectibles,
        }
    }

    #[test]
    fn test_snapshot_replaces_state() {
        let mut state = MirrorState::new();
        state.apply(Packet::PlayerNew { id: 99 });

        state.apply(connected_with(
            vec![Player::new(1), Player::new(2)],
            vec![Collectible::new(1, 50, 50, 3)],
            2,
        ));

        assert_eq!(state.my_id(), Some(2));
        assert_eq!(state.player_count(), 2);
        assert_eq!(state.collectibles().len(), 1);
        assert!(state.players().all(|p| p.id != 99));
    }

    #[test]
    fn test_player_new_is_idempotent() {
        let mut state = MirrorState::new();
        state.apply(connected_with(vec![Player::new(1)], vec![], 1));

        state.apply(Packet::PlayerNew { id: 2 });
        state.apply(Packet::PlayerNew { id: 2 });

        assert_eq!(state.player_count(), 2);
    }

    #[test]
    fn test_move_overwrites_position_including_own() {
        let mut state = MirrorState::new();
        state.apply(connected_with(vec![Player::new(1)], vec![], 1));

        state.apply(Packet::PlayerMove { id: 1, x: 104, y: 100 });

        let me = state.me().unwrap();
        assert_eq!((me.x, me.y), (104, 100));
    }

    #[test]
    fn test_leave_removes_player() {
        let mut state = MirrorState::new();
        state.apply(connected_with(vec![Player::new(1), Player::new(2)], vec![], 1));

        state.apply(Packet::PlayerLeave { id: 2 });
        assert_eq!(state.player_count(), 1);

        // Leaving twice is harmless.
        state.apply(Packet::PlayerLeave { id: 2 });
        assert_eq!(state.player_count(), 1);
    }

    #[test]
    fn test_collected_broadcast_drives_score() {
        let mut state = MirrorState::new();
        state.apply(connected_with(
            vec![Player::new(1), Player::new(2)],
            vec![Collectible::new(7, 100, 100, 3)],
            1,
        ));

        state.apply(Packet::CollectibleCollected {
            id: 2,
            collectible: 7,
        });

        let collector = state.players().find(|p| p.id == 2).unwrap();
        assert_eq!(collector.score, 3);
        assert!(state.collectibles().is_empty());

        // Replay of the same broadcast finds no collectible: no double count.
        state.apply(Packet::CollectibleCollected {
            id: 2,
            collectible: 7,
        });
        let collector = state.players().find(|p| p.id == 2).unwrap();
        assert_eq!(collector.score, 3);
    }

    #[test]
    fn test_rank_descending_by_score() {
        let mut state = MirrorState::new();
        let mut leader = Player::new(1);
        leader.score = 9;
        state.apply(connected_with(vec![leader, Player::new(2)], vec![], 2));

        assert_eq!(state.rank(), Some((2, 2)));

        // Catch up past the leader.
        state.apply(Packet::CollectibleSpawn {
            collectible: Collectible::new(1, 0, 0, 3),
        });
        state.apply(Packet::CollectibleCollected {
            id: 2,
            collectible: 1,
        });
        state.apply(Packet::CollectibleSpawn {
            collectible: Collectible::new(2, 0, 0, 3),
        });
        state.apply(Packet::CollectibleCollected {
            id: 2,
            collectible: 2,
        });
        state.apply(Packet::CollectibleSpawn {
            collectible: Collectible::new(3, 0, 0, 3),
        });
        state.apply(Packet::CollectibleCollected {
            id: 2,
            collectible: 3,
        });
        state.apply(Packet::CollectibleSpawn {
            collectible: Collectible::new(4, 0, 0, 1),
        });
        state.apply(Packet::CollectibleCollected {
            id: 2,
            collectible: 4,
        });

        assert_eq!(state.rank(), Some((1, 2)));
    }
}
