//! Player Identity and State
//!
//! A player exists for the lifetime of one connection. Position is the
//! ground-contact point; the hitbox sphere is offset up to torso height.

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::vec3::Vec3;

/// Health assigned on spawn and respawn. Health is clamped to [0, 100].
pub const MAX_HEALTH: i32 = 100;

/// Radius of the spherical player hitbox, in world units.
pub const HITBOX_RADIUS: f32 = 0.5;

/// Vertical offset from the ground-contact position to the hitbox center.
pub const HITBOX_VERTICAL_OFFSET: f32 = 0.9;

// =============================================================================
// PLAYER ID
// =============================================================================

/// Opaque per-connection player identifier (UUID as bytes).
///
/// Stable for the lifetime of the connection. Implements `Ord` for
/// deterministic map ordering; serializes as a UUID string on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PlayerId(pub [u8; 16]);

impl PlayerId {
    /// Create from raw bytes.
    pub const fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Create a fresh random id for a new connection.
    pub fn random() -> Self {
        Self(*uuid::Uuid::new_v4().as_bytes())
    }

    /// Create from UUID string.
    pub fn from_uuid_str(s: &str) -> Option<Self> {
        uuid::Uuid::parse_str(s).ok().map(|u| Self(*u.as_bytes()))
    }

    /// Convert to UUID string.
    pub fn to_uuid_string(&self) -> String {
        uuid::Uuid::from_bytes(self.0).to_string()
    }

    /// Short hex prefix for log lines.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uuid_string())
    }
}

impl Serialize for PlayerId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_uuid_string())
    }
}

impl<'de> Deserialize<'de> for PlayerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_uuid_str(&s)
            .ok_or_else(|| D::Error::custom(format!("invalid player id: {s}")))
    }
}

// =============================================================================
// PLAYER STATE
// =============================================================================

/// View rotation as sent by the client camera.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotation {
    /// Pitch component
    pub x: f32,
    /// Yaw component
    pub y: f32,
}

/// State of a single connected player.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerState {
    /// Connection identity
    pub id: PlayerId,

    /// Ground-contact position
    pub position: Vec3,

    /// View rotation
    pub rotation: Rotation,

    /// Current health, clamped to [0, MAX_HEALTH]. 0 means dead.
    pub health: i32,

    /// Confirmed kills
    pub kills: u32,

    /// Deaths
    pub deaths: u32,
}

impl PlayerState {
    /// Create a new player at a spawn position with full health.
    pub fn new(id: PlayerId, spawn: Vec3) -> Self {
        Self {
            id,
            position: spawn,
            rotation: Rotation::default(),
            health: MAX_HEALTH,
            kills: 0,
            deaths: 0,
        }
    }

    /// A dead player cannot move, shoot, or be damaged until respawned.
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Center of the hitbox sphere (torso height above the feet).
    #[inline]
    pub fn hitbox_center(&self) -> Vec3 {
        self.position.add(Vec3::UP.scale(HITBOX_VERTICAL_OFFSET))
    }
}

// =============================================================================
// TESTS
// =============================================================================
