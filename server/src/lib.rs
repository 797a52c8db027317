//! # Authoritative Game Server Library
//!
//! Server-side core of the collectible arena: it owns the canonical list of
//! players and collectibles, validates every movement and collection intent
//! against that state, and broadcasts the resulting changes to all
//! connected clients. Clients only ever mirror what this server says.
//!
//! ## Architecture
//!
//! The server runs a single event loop (`network::Server::run`) over three
//! sources: newly accepted TCP connections, decoded packets and disconnects
//! from per-session reader tasks, and the collectible spawn timer. Each
//! event is handled to completion before the next, so all mutation of the
//! shared state is serialized without locks. Outbound delivery is
//! fire-and-forget through per-session channels drained by writer tasks.
//!
//! ## Module Organization
//!
//! - [`game`]: the `GameState` state owner, covering id allocation,
//!   per-axis move validation, empty-set collectible spawning, and
//!   exactly-once collection resolution.
//! - [`network`]: TCP session lifecycle, frame codec plumbing, the select
//!   loop, and the broadcast/send-to-one capabilities.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::Server;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut server = Server::new("127.0.0.1:8080", Duration::from_millis(1000)).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod game;
pub mod network;
