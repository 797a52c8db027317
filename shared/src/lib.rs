use serde::{Deserialize, Serialize};

pub const CANVAS_BOUND_X: i32 = 588;
pub const CANVAS_BOUND_Y: i32 = 378;
pub const PLAYER_SPAWN_X: i32 = 100;
pub const PLAYER_SPAWN_Y: i32 = 100;
pub const PLAYER_HITBOX: i32 = 32;
pub const COLLECTIBLE_W: i32 = 10;
pub const COLLECTIBLE_H: i32 = 10;
pub const MOVE_STEP: i32 = 4;
pub const COLLECTIBLE_MIN_VALUE: i32 = 1;
pub const COLLECTIBLE_MAX_VALUE: i32 = 3;
pub const SPAWN_CHECK_INTERVAL_MS: u64 = 1000;

/// Frames larger than this are treated as a protocol violation.
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// Wire protocol. Client->server payloads carry intents; everything else is
/// an authoritative broadcast. Field names are part of the wire contract.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum Packet {
    // client -> server
    /// Movement intent: x/y are a signed delta, not a position.
    Move { id: u32, x: i32, y: i32 },
    /// Collection claim from the client's local collision detection.
    Collected { id: u32, collectible: u32 },

    // server -> newly joined client only
    Connected {
        you: u32,
        players: Vec<Player>,
        collectibles: Vec<Collectible>,
    },
    // server -> every other client
    PlayerNew { id: u32 },
    // server -> all clients
    /// Authoritative absolute position after move validation.
    PlayerMove { id: u32, x: i32, y: i32 },
    PlayerLeave { id: u32 },
    CollectibleSpawn { collectible: Collectible },
    CollectibleCollected { id: u32, collectible: u32 },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: u32,
    pub x: i32,
    pub y: i32,
    pub score: i32,
}

impl Player {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            x: PLAYER_SPAWN_X,
            y: PLAYER_SPAWN_Y,
            score: 0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Collectible {
    pub id: u32,
    pub x: i32,
    pub y: i32,
    pub value: i32,
    pub w: i32,
    pub h: i32,
}

impl Collectible {
    pub fn new(id: u32, x: i32, y: i32, value: i32) -> Self {
        Self {
            id,
            x,
            y,
            value,
            w: COLLECTIBLE_W,
            h: COLLECTIBLE_H,
        }
    }
}

/// Axis-aligned overlap between a player's pickup hitbox and a collectible.
/// The hitbox is deliberately larger than the rendered sprite so pickups
/// feel forgiving. Edge contact does not count as overlap.
pub fn check_pickup_overlap(player: &Player, collectible: &Collectible) -> bool {
    player.x < collectible.x + collectible.w
        && player.x + PLAYER_HITBOX > collectible.x
        && player.y < collectible.y + collectible.h
        && player.y + PLAYER_HITBOX > collectible.y
}

/// Encodes a packet as a length-prefixed frame: u32 little-endian payload
/// length followed by the bincode payload.
pub fn encode_frame(packet: &Packet) -> Result<Vec<u8>, bincode::Error> {
    let payload = bincode::serialize(packet)?;
    let mut frame = Vec::with_capacity(4 + payload.len());
    frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Decodes the payload portion of a frame (the bytes after the length prefix).
pub fn decode_payload(payload: &[u8]) -> Result<Packet, bincode::Error> {
    bincode::deserialize(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_spawns_at_fixed_point() {
        let player = Player::new(7);
        assert_eq!(player.id, 7);
        assert_eq!(player.x, PLAYER_SPAWN_X);
        assert_eq!(player.y, PLAYER_SPAWN_Y);
        assert_eq!(player.score, 0);
    }

    #[test]
    fn test_collectible_fixed_hitbox() {
        let collectible = Collectible::new(1, 50, 60, 3);
        assert_eq!(collectible.w, 10);
        assert_eq!(collectible.h, 10);
        assert_eq!(collectible.value, 3);
    }

    #[test]
    fn test_overlap_player_on_top() {
        let mut player = Player::new(1);
        player.x = 100;
        player.y = 100;
        let collectible = Collectible::new(1, 105, 105, 1);
        assert!(check_pickup_overlap(&player, &collectible));
    }

    #[test]
    fn test_overlap_no_contact() {
        let mut player = Player::new(1);
        player.x = 0;
        player.y = 0;
        let collectible = Collectible::new(1, 200, 200, 1);
        assert!(!check_pickup_overlap(&player, &collectible));
    }

    #[test]
    fn test_overlap_edge_touch_is_not_overlap() {
        let mut player = Player::new(1);
        player.x = 0;
        player.y = 0;
        // Collectible starts exactly where the hitbox ends.
        let collectible = Collectible::new(1, PLAYER_HITBOX, 0, 1);
        assert!(!check_pickup_overlap(&player, &collectible));
    }

    #[test]
    fn test_overlap_one_pixel_inside() {
        let mut player = Player::new(1);
        player.x = 0;
        player.y = 0;
        let collectible = Collectible::new(1, PLAYER_HITBOX - 1, 0, 1);
        assert!(check_pickup_overlap(&player, &collectible));
    }

    #[test]
    fn test_packet_serialization_move_intent() {
        let packet = Packet::Move { id: 3, x: -4, y: 4 };
        let serialized = bincode::serialize(&packet).unwrap();
        let deserialized: Packet = bincode::deserialize(&serialized).unwrap();

        match deserialized {
            Packet::Move { id, x, y } => {
                assert_eq!(id, 3);
                assert_eq!(x, -4);
                assert_eq!(y, 4);
            }
            _ => panic!("Wrong packet type after deserialization"),
        }
    }

    #[test]
    fn test_packet_serialization_snapshot() {
        let packet = Packet::Connected {
            you: 2,
            players: vec![Player::new(1), Player::new(2)],
            collectibles: vec![Collectible::new(5, 10, 20, 2)],
        };

        let serialized = bincode::serialize(&packet).unwrap();
        let deserialized: Packet = bincode::deserialize(&serialized).unwrap();

        match deserialized {
            Packet::Connected {
                you,
                players,
                collectibles,
            } => {
                assert_eq!(you, 2);
                assert_eq!(players.len(), 2);
                assert_eq!(collectibles[0].id, 5);
                assert_eq!(collectibles[0].value, 2);
            }
            _ => panic!("Wrong packet type after deserialization"),
        }
    }

    #[test]
    fn test_frame_roundtrip() {
        let packet = Packet::CollectibleCollected {
            id: 1,
            collectible: 9,
        };

        let frame = encode_frame(&packet).unwrap();
        let len = u32::from_le_bytes(frame[0..4].try_into().unwrap()) as usize;
        assert_eq!(len, frame.len() - 4);

        let decoded = decode_payload(&frame[4..]).unwrap();
        assert_eq!(decoded, packet);
    }
}
