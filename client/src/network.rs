//! Client-side connection: bridges the async socket and the render loop
//!
//! The socket lives on a dedicated tokio runtime; reader and writer tasks
//! shuttle packets over unbounded channels so the macroquad frame loop can
//! poll without blocking.

use log::{debug, info, warn};
use shared::{decode_payload, encode_frame, Packet, MAX_FRAME_LEN};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

pub struct Connection {
    incoming: mpsc::UnboundedReceiver<Packet>,
    outgoing: mpsc::UnboundedSender<Packet>,
    closed: bool,
    // Keeps the reader/writer tasks alive for the connection's lifetime.
    _runtime: tokio::runtime::Runtime,
}

impl Connection {
    pub fn connect(server_addr: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()?;

        let stream = runtime.block_on(TcpStream::connect(server_addr))?;
        stream.set_nodelay(true)?;
        info!("Connected to {}", server_addr);

        let (read_half, write_half) = stream.into_split();
        let (incoming_tx, incoming_rx) = mpsc::unbounded_channel();
        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();

        runtime.spawn(run_reader(read_half, incoming_tx));
        runtime.spawn(run_writer(write_half, outgoing_rx));

        Ok(Connection {
            incoming: incoming_rx,
            outgoing: outgoing_tx,
            closed: false,
            _runtime: runtime,
        })
    }

    /// Non-blocking poll for the next server packet.
    pub fn try_recv(&mut self) -> Option<Packet> {
        match self.incoming.try_recv() {
            Ok(packet) => Some(packet),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.closed = true;
                None
            }
        }
    }

    /// Queues a packet for the writer task. Fire-and-forget.
    pub fn send(&self, packet: Packet) {
        if self.outgoing.send(packet).is_err() {
            debug!("Writer task is gone, dropping outbound packet");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed || self.outgoing.is_closed()
    }
}

async fn run_reader(mut read_half: OwnedReadHalf, incoming_tx: mpsc::UnboundedSender<Packet>) {
    loop {
        let mut len_buf = [0u8; 4];
        if read_half.read_exact(&mut len_buf).await.is_err() {
            break;
        }

        let len = u32::from_le_bytes(len_buf) as usize;
        if len > MAX_FRAME_LEN {
            warn!("Server sent an oversized frame ({} bytes)", len);
            break;
        }

        let mut payload = vec![0u8; len];
        if read_half.read_exact(&mut payload).await.is_err() {
            break;
        }

        match decode_payload(&payload) {
            Ok(packet) => {
                if incoming_tx.send(packet).is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!("Failed to decode server frame: {}", e);
                break;
            }
        }
    }

    info!("Server connection closed");
}

async fn run_writer(mut write_half: OwnedWriteHalf, mut outgoing_rx: mpsc::UnboundedReceiver<Packet>) {
    while let Some(packet) = outgoing_rx.recv().await {
        let frame = match encode_frame(&packet) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Failed to encode packet: {}", e);
                continue;
            }
        };

        if write_half.write_all(&frame).await.is_err() {
            break;
        }
    }
}
