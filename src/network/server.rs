//! WebSocket Server
//!
//! Accept loop and per-connection tasks. Each connection gets a fresh
//! player identity, an outbound channel drained by a writer task, and a
//! read loop that feeds decoded events into the shared [`GameRoom`] under
//! a single write guard per event.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, RwLock};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use crate::game::player::PlayerId;
use crate::game::world::Arena;
use crate::network::protocol::{ClientEvent, ServerEvent};
use crate::network::session::GameRoom;
use crate::RESPAWN_DELAY_MS;

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the WebSocket listener to.
    pub bind_addr: String,
    /// Connections beyond this count are dropped at accept time.
    pub max_connections: usize,
    /// Delay between a death and the automatic respawn.
    pub respawn_delay: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            max_connections: 64,
            respawn_delay: Duration::from_millis(RESPAWN_DELAY_MS),
        }
    }
}

impl ServerConfig {
    /// Build a config from the environment, falling back to defaults.
    ///
    /// `SKIRMISH_ADDR` overrides the bind address.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(addr) = std::env::var("SKIRMISH_ADDR") {
            config.bind_addr = addr;
        }
        config
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Errors that terminate the server.
#[derive(Debug, thiserror::Error)]
pub enum GameServerError {
    /// The listener could not be bound.
    #[error("failed to bind listener: {0}")]
    BindFailed(#[from] std::io::Error),

    /// A fatal WebSocket-level failure.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

// =============================================================================
// SERVER
// =============================================================================

/// The WebSocket game server: one room, many connections.
pub struct GameServer {
    config: ServerConfig,
    room: Arc<RwLock<GameRoom>>,
}

impl GameServer {
    /// Create a server hosting the standard arena.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            room: Arc::new(RwLock::new(GameRoom::new(Arena::standard()))),
        }
    }

    /// Number of players currently connected.
    pub async fn player_count(&self) -> usize {
        self.room.read().await.player_count()
    }

    /// Bind and serve forever. Accept errors are logged and survived;
    /// only a bind failure is fatal.
    pub async fn run(&self) -> Result<(), GameServerError> {
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        info!("listening on ws://{}", self.config.bind_addr);

        loop {
            match listener.accept().await {
                Ok((stream, addr)) => {
                    if self.room.read().await.player_count() >= self.config.max_connections {
                        warn!("at capacity ({}); refusing {}", self.config.max_connections, addr);
                        continue;
                    }
                    self.spawn_connection(stream, addr);
                }
                Err(err) => {
                    error!("accept failed: {err}");
                }
            }
        }
    }

    fn spawn_connection(&self, stream: TcpStream, addr: SocketAddr) {
        let room = Arc::clone(&self.room);
        let respawn_delay = self.config.respawn_delay;

        tokio::spawn(async move {
            let ws_stream = match accept_async(stream).await {
                Ok(ws) => ws,
                Err(err) => {
                    warn!("handshake with {addr} failed: {err}");
                    return;
                }
            };
            debug!("websocket established with {addr}");

            let (mut ws_sender, mut ws_receiver) = ws_stream.split();
            let (event_tx, mut event_rx) = mpsc::channel::<ServerEvent>(64);

            // Writer task: drains the outbound channel onto the socket.
            let writer = tokio::spawn(async move {
                while let Some(event) = event_rx.recv().await {
                    let text = match event.to_json() {
                        Ok(text) => text,
                        Err(err) => {
                            error!("failed to encode event: {err}");
                            continue;
                        }
                    };
                    if ws_sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
            });

            let id = PlayerId::random();
            if let Err(err) = room.write().await.handle_connect(id, event_tx) {
                error!("rejecting {addr}: {err}");
                writer.abort();
                return;
            }

            while let Some(message) = ws_receiver.next().await {
                match message {
                    Ok(Message::Text(text)) => {
                        let event = match ClientEvent::from_json(&text) {
                            Ok(event) => event,
                            Err(err) => {
                                debug!("unparseable event from {}: {err}", id.short());
                                continue;
                            }
                        };

                        let pending = room.write().await.handle_event(id, event);
                        if let Some(victim) = pending {
                            let room = Arc::clone(&room);
                            tokio::spawn(async move {
                                tokio::time::sleep(respawn_delay).await;
                                room.write().await.handle_respawn(victim);
                            });
                        }
                    }
                    Ok(Message::Close(_)) => break,
                    // Pings are answered by tungstenite; binary is not
                    // part of the protocol.
                    Ok(_) => {}
                    Err(err) => {
                        debug!("connection {} errored: {err}", id.short());
                        break;
                    }
                }
            }

            room.write().await.handle_disconnect(id);
            writer.abort();
            debug!("connection from {addr} closed");
        });
    }
}

// =============================================================================
// TESTS
// =============================================================================
