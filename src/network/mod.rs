//! Network Layer
//!
//! WebSocket shell around the authoritative game state. Everything here is
//! driven by client connections; all rules live in `game/`.

pub mod protocol;
pub mod server;
pub mod session;

pub use protocol::{ClientEvent, ServerEvent};
pub use server::{GameServer, GameServerError, ServerConfig};
pub use session::{Broadcaster, Delivery, GameRoom};
