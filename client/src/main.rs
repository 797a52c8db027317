use clap::Parser;
use client::game::MirrorState;
use client::input;
use client::network::Connection;
use client::rendering::{Renderer, WINDOW_HEIGHT, WINDOW_WIDTH};
use log::info;
use macroquad::prelude::*;
use shared::{check_pickup_overlap, Packet};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:8080")]
    server: String,
}

fn window_conf() -> Conf {
    Conf {
        window_title: "Collectible Arena".to_owned(),
        window_width: WINDOW_WIDTH,
        window_height: WINDOW_HEIGHT,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();
    info!("Connecting to: {}", args.server);
    info!("Controls: WASD or arrow keys");

    let renderer = Renderer::new();

    let mut connection = match Connection::connect(&args.server) {
        Ok(connection) => connection,
        Err(e) => {
            log::error!("Failed to connect to {}: {}", args.server, e);
            loop {
                renderer.render_connection_error("Failed to connect");
                next_frame().await;
            }
        }
    };

    let mut state = MirrorState::new();

    loop {
        // Drain everything the server sent since the last frame.
        while let Some(packet) = connection.try_recv() {
            state.apply(packet);
        }

        if connection.is_closed() {
            renderer.render_connection_error("Connection lost");
            next_frame().await;
            continue;
        }

        if let Some(my_id) = state.my_id() {
            if let Some((dx, dy)) = input::sample_move_intent() {
                connection.send(Packet::Move {
                    id: my_id,
                    x: dx,
                    y: dy,
                });
            }

            // Claim any collectible our mirrored position overlaps. The
            // server re-checks against its own positions; stale claims are
            // dropped there.
            let claims: Vec<u32> = match state.me() {
                Some(me) => state
                    .collectibles()
                    .iter()
                    .filter(|c| check_pickup_overlap(me, c))
                    .map(|c| c.id)
                    .collect(),
                None => Vec::new(),
            };
            for collectible in claims {
                connection.send(Packet::Collected {
                    id: my_id,
                    collectible,
                });
            }
        }

        renderer.render(&state);
        next_frame().await;
    }
}
