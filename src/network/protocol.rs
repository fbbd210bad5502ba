//! Protocol Messages
//!
//! JSON wire format for client-server communication over WebSocket.
//! Event names and payload shapes match what the browser client emits and
//! listens for (`playerMove`, `bulletShot`, `currentPlayers`, ...).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::vec3::Vec3;
use crate::game::player::{PlayerId, PlayerState, Rotation};

// =============================================================================
// CLIENT -> SERVER EVENTS
// =============================================================================

/// Events sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Periodic position/rotation update.
    PlayerMove(MoveUpdate),

    /// Discrete shot fired from the camera.
    Shoot(ShotInfo),
}

/// Payload of a `playerMove` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveUpdate {
    /// New ground-contact position.
    pub position: Vec3,
    /// New view rotation.
    pub rotation: Rotation,
}

/// Payload of a `shoot` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShotInfo {
    /// Muzzle position (camera).
    pub position: Vec3,
    /// Unit direction of the shot.
    pub direction: Vec3,
    /// Damage per hit.
    pub damage: i32,
    /// Tracer color, for visual replay on other clients.
    pub bullet_color: u32,
}

// =============================================================================
// SERVER -> CLIENT EVENTS
// =============================================================================

/// Events sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Full roster snapshot, sent once to a newly connected player.
    CurrentPlayers(BTreeMap<PlayerId, PlayerState>),

    /// A new player joined; their public record.
    NewPlayer(PlayerState),

    /// Another player moved.
    PlayerMoved {
        /// Who moved.
        id: PlayerId,
        /// New position.
        position: Vec3,
        /// New rotation.
        rotation: Rotation,
    },

    /// A shot was fired, for visual replay. Sent regardless of outcome.
    #[serde(rename_all = "camelCase")]
    BulletShot {
        /// Who fired.
        shooter_id: PlayerId,
        /// Muzzle position.
        position: Vec3,
        /// Shot direction.
        direction: Vec3,
        /// Tracer color.
        bullet_color: u32,
    },

    /// You were hit; your new health. Sent to the target only.
    PlayerHit {
        /// Health after damage.
        health: i32,
    },

    /// A player died.
    #[serde(rename_all = "camelCase")]
    PlayerDied {
        /// The victim.
        player_id: PlayerId,
        /// Who got the kill.
        killer_id: PlayerId,
    },

    /// A player respawned after the death delay.
    #[serde(rename_all = "camelCase")]
    PlayerRespawned {
        /// Who respawned.
        player_id: PlayerId,
        /// Fresh spawn position.
        position: Vec3,
        /// Restored health (always full).
        health: i32,
    },

    /// Scoreboard entry changed; full record of the affected player.
    PlayerScoreUpdated(PlayerState),

    /// A player disconnected.
    PlayerDisconnected {
        /// Who left.
        id: PlayerId,
    },
}

// =============================================================================
// SERIALIZATION HELPERS
// =============================================================================

impl ClientEvent {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerEvent {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

// =============================================================================
// TESTS
// =============================================================================
