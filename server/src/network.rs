//! Server network layer: TCP session handling and the authoritative event loop

use crate::game::GameState;
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::{decode_payload, encode_frame, Packet, MAX_FRAME_LEN};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::interval;

/// Messages sent from per-session reader tasks to the main event loop
#[derive(Debug)]
pub enum SessionEvent {
    PacketReceived { player_id: u32, packet: Packet },
    Disconnected { player_id: u32 },
}

/// Authoritative server: accepts connections, owns the game state, and
/// fans out state changes to every session.
///
/// All state mutation happens inside `run()`'s select loop, one event at a
/// time. The per-session tasks only move frames between sockets and
/// channels, so no locking is needed around `GameState`.
pub struct Server {
    listener: TcpListener,
    state: GameState,
    /// Outbound packet sender per connected player.
    sessions: HashMap<u32, mpsc::UnboundedSender<Packet>>,
    event_tx: mpsc::UnboundedSender<SessionEvent>,
    event_rx: mpsc::UnboundedReceiver<SessionEvent>,
    spawn_interval: Duration,
    rng: StdRng,
}

impl Server {
    pub async fn new(
        addr: &str,
        spawn_interval: Duration,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let listener = TcpListener::bind(addr).await?;
        info!("Server listening on {}", listener.local_addr()?);

        let (event_tx, event_rx) = mpsc::unbounded_channel();

        Ok(Server {
            listener,
            state: GameState::new(),
            sessions: HashMap::new(),
            event_tx,
            event_rx,
            spawn_interval,
            rng: StdRng::from_entropy(),
        })
    }

    /// The address the listener actually bound to (useful with port 0).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Main server loop: connection accepts, session events and the
    /// collectible spawn timer, processed strictly one at a time.
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let mut spawn_timer = interval(self.spawn_interval);
        // The first tick fires immediately; the spawn check starts one
        // interval after boot, like the original timer.
        spawn_timer.tick().await;

        info!("Server started successfully");

        loop {
            tokio::select! {
                result = self.listener.accept() => {
                    match result {
                        Ok((stream, addr)) => self.handle_connect(stream, addr),
                        Err(e) => error!("Failed to accept connection: {}", e),
                    }
                },

                event = self.event_rx.recv() => {
                    match event {
                        Some(SessionEvent::PacketReceived { player_id, packet }) => {
                            self.handle_packet(player_id, packet);
                        },
                        Some(SessionEvent::Disconnected { player_id }) => {
                            self.handle_disconnect(player_id);
                        },
                        None => {
                            info!("Server shutting down");
                            break;
                        }
                    }
                },

                _ = spawn_timer.tick() => {
                    self.handle_spawn_tick();
                },
            }
        }

        Ok(())
    }

    /// Session lifecycle, connect half: allocate an id, wire up the reader
    /// and writer tasks, announce the player to everyone else, then send the
    /// newcomer a snapshot taken after their own insertion.
    fn handle_connect(&mut self, stream: TcpStream, addr: SocketAddr) {
        if let Err(e) = stream.set_nodelay(true) {
            debug!("Failed to set TCP_NODELAY for {}: {}", addr, e);
        }

        let player = self.state.add_player();
        info!("Player {} connected from {}", player.id, addr);

        let (read_half, write_half) = stream.into_split();
        let (packet_tx, packet_rx) = mpsc::unbounded_channel();

        tokio::spawn(run_session_writer(player.id, write_half, packet_rx));
        tokio::spawn(run_session_reader(
            player.id,
            read_half,
            self.event_tx.clone(),
        ));

        self.sessions.insert(player.id, packet_tx);
        self.broadcast_except(player.id, &Packet::PlayerNew { id: player.id });

        let (players, collectibles) = self.state.snapshot();
        self.send_to(
            player.id,
            &Packet::Connected {
                you: player.id,
                players,
                collectibles,
            },
        );
    }

    /// Session lifecycle, disconnect half. Transport failures land here on
    /// the same path as a clean close. A second event for the same id is a
    /// no-op.
    fn handle_disconnect(&mut self, player_id: u32) {
        if self.sessions.remove(&player_id).is_none() {
            return;
        }

        self.state.remove_player(player_id);
        self.broadcast(&Packet::PlayerLeave { id: player_id });
    }

    fn handle_packet(&mut self, player_id: u32, packet: Packet) {
        match packet {
            Packet::Move { id, x, y } => {
                // The broadcast carries the absolute position so the
                // sender's local prediction snaps to the authoritative one.
                if let Some((abs_x, abs_y)) = self.state.move_player(id, x, y) {
                    self.broadcast(&Packet::PlayerMove {
                        id,
                        x: abs_x,
                        y: abs_y,
                    });
                }
            }

            Packet::Collected { id, collectible } => {
                if self.state.resolve_collection(id, collectible) {
                    self.broadcast(&Packet::CollectibleCollected { id, collectible });
                }
            }

            other => {
                warn!("Unexpected packet from player {}: {:?}", player_id, other);
            }
        }
    }

    fn handle_spawn_tick(&mut self) {
        if let Some(collectible) = self.state.spawn_collectible(&mut self.rng) {
            self.broadcast(&Packet::CollectibleSpawn { collectible });
        }
    }

    /// Fire-and-forget send to one session. A dead session is logged and
    /// skipped; its reader task will deliver the disconnect shortly.
    fn send_to(&self, player_id: u32, packet: &Packet) {
        if let Some(sender) = self.sessions.get(&player_id) {
            if sender.send(packet.clone()).is_err() {
                debug!("Session {} is gone, dropping outbound packet", player_id);
            }
        }
    }

    fn broadcast(&self, packet: &Packet) {
        for (player_id, sender) in &self.sessions {
            if sender.send(packet.clone()).is_err() {
                debug!("Session {} is gone, skipping broadcast", player_id);
            }
        }
    }

    fn broadcast_except(&self, exclude: u32, packet: &Packet) {
        for (player_id, sender) in &self.sessions {
            if *player_id == exclude {
                continue;
            }
            if sender.send(packet.clone()).is_err() {
                debug!("Session {} is gone, skipping broadcast", player_id);
            }
        }
    }
}

/// Reads length-prefixed frames off the socket and forwards decoded packets
/// to the event loop. Any read or decode failure ends the session; the
/// final `Disconnected` event is the only teardown signal the loop needs.
async fn run_session_reader(
    player_id: u32,
    mut read_half: OwnedReadHalf,
    event_tx: mpsc::UnboundedSender<SessionEvent>,
) {
    loop {
        let mut len_buf = [0u8; 4];
        if read_half.read_exact(&mut len_buf).await.is_err() {
            break;
        }

        let len = u32::from_le_bytes(len_buf) as usize;
        if len > MAX_FRAME_LEN {
            warn!("Player {} sent an oversized frame ({} bytes)", player_id, len);
            break;
        }

        let mut payload = vec![0u8; len];
        if read_half.read_exact(&mut payload).await.is_err() {
            break;
        }

        match decode_payload(&payload) {
            Ok(packet) => {
                if event_tx
                    .send(SessionEvent::PacketReceived { player_id, packet })
                    .is_err()
                {
                    break;
                }
            }
            Err(e) => {
                warn!("Failed to decode frame from player {}: {}", player_id, e);
                break;
            }
        }
    }

    let _ = event_tx.send(SessionEvent::Disconnected { player_id });
}

/// Drains the session's outbound queue onto the socket. Exits when the
/// event loop drops the sender or the peer stops accepting writes.
async fn run_session_writer(
    player_id: u32,
    mut write_half: OwnedWriteHalf,
    mut packet_rx: mpsc::UnboundedReceiver<Packet>,
) {
    while let Some(packet) = packet_rx.recv().await {
        let frame = match encode_frame(&packet) {
            Ok(frame) => frame,
            Err(e) => {
                error!("Failed to encode packet for player {}: {}", player_id, e);
                continue;
            }
        };

        if let Err(e) = write_half.write_all(&frame).await {
            debug!("Write to player {} failed: {}", player_id, e);
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_event_creation() {
        let packet = Packet::Move { id: 1, x: 4, y: 0 };
        let msg = SessionEvent::PacketReceived {
            player_id: 1,
            packet: packet.clone(),
        };

        match msg {
            SessionEvent::PacketReceived { player_id, packet: p } => {
                assert_eq!(player_id, 1);
                assert_eq!(p, packet);
            }
            _ => panic!("Unexpected event type"),
        }
    }

    #[tokio::test]
    async fn test_server_binds_ephemeral_port() {
        let server = Server::new("127.0.0.1:0", Duration::from_millis(1000))
            .await
            .unwrap();
        let addr = server.local_addr().unwrap();
        assert_ne!(addr.port(), 0);
    }

    #[test]
    fn test_oversized_frame_length_rejected() {
        let len = (MAX_FRAME_LEN + 1) as u32;
        let len_buf = len.to_le_bytes();
        let decoded = u32::from_le_bytes(len_buf) as usize;
        assert!(decoded > MAX_FRAME_LEN);
    }
}
