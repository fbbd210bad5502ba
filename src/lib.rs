//! # Skirmish Game Server
//!
//! Authoritative server for Skirmish, a browser-based multiplayer arena
//! shooter. Clients render the scene and send movement and shoot events;
//! this process is the single source of truth for health, kills, deaths
//! and hit detection, and fans state back out to every connected client.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      SKIRMISH SERVER                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/             - Math primitives                         │
//! │  ├── vec3.rs       - 3D vector operations                    │
//! │  └── rng.rs        - Seedable Xorshift128+ PRNG              │
//! │                                                              │
//! │  game/             - Authoritative game state                │
//! │  ├── player.rs     - Player identity and state               │
//! │  ├── registry.rs   - Player roster, damage, respawn          │
//! │  ├── world.rs      - Static obstacles and spawn points       │
//! │  └── ballistics.rs - Stepwise projectile resolution          │
//! │                                                              │
//! │  network/          - Networking (non-authoritative shell)    │
//! │  ├── protocol.rs   - JSON wire events                        │
//! │  ├── session.rs    - Game room, event fan-out                │
//! │  └── server.rs     - WebSocket server                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Consistency Guarantee
//!
//! Every inbound client event and every respawn timer firing mutates the
//! room under a single write guard, with no awaits between a read and its
//! corresponding write. Handlers are therefore atomic with respect to the
//! player roster, which is what makes the health 0 death transition fire
//! exactly once per life.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod network;

// Re-export commonly used types
pub use crate::core::rng::GameRng;
pub use crate::core::vec3::Vec3;
pub use crate::game::ballistics::HitOutcome;
pub use crate::game::player::{PlayerId, PlayerState, MAX_HEALTH};
pub use crate::game::registry::{PlayerRegistry, RegistryError};
pub use crate::game::world::Arena;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Delay between a death and the automatic respawn, in milliseconds.
pub const RESPAWN_DELAY_MS: u64 = 3000;
