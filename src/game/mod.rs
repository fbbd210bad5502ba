//! Game Logic Module
//!
//! The authoritative state and hit resolution engine. Nothing in here
//! touches the network; the `network` layer drives it and fans results out.
//!
//! ## Module Structure
//!
//! - `player`: Player identity and per-player state
//! - `registry`: Roster ownership, damage and respawn sequencing
//! - `world`: Static obstacle geometry and spawn points
//! - `ballistics`: Stepwise projectile resolution

pub mod ballistics;
pub mod player;
pub mod registry;
pub mod world;

// Re-export key types
pub use ballistics::{resolve, HitOutcome};
pub use player::{PlayerId, PlayerState, Rotation, MAX_HEALTH};
pub use registry::{DamageOutcome, PlayerRegistry, RegistryError};
pub use world::{Arena, Obstacle};
