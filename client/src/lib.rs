//! # Game Client Library
//!
//! Client-side mirror of the collectible arena. The client holds no
//! authority: it renders whatever the server broadcasts and sends two kinds
//! of intent upstream: movement deltas from held keys, and collection
//! claims when its local copy detects overlap with a collectible. The
//! server validates both against its own state; every visible change,
//! including the local player's position and score, comes back as a
//! broadcast.
//!
//! ## Module Organization
//!
//! - [`game`]: `MirrorState`, the packet-driven local copy of players and
//!   collectibles, including client-side score accumulation.
//! - [`input`]: keyboard sampling into per-frame movement deltas.
//! - [`network`]: TCP connection with reader/writer tasks on a dedicated
//!   runtime, polled non-blockingly from the frame loop.
//! - [`rendering`]: macroquad drawing of the arena, players and pickups.

pub mod game;
pub mod input;
pub mod network;
pub mod rendering;
