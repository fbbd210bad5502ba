//! Arena Geometry
//!
//! Static obstacle boxes and the spawn point pool. Immutable for the
//! process lifetime and shared read-only by every resolution call.

use crate::core::rng::GameRng;
use crate::core::vec3::Vec3;

/// An axis-aligned obstacle box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Obstacle {
    /// Box center
    pub center: Vec3,
    /// Half-extent along each axis
    pub half_extents: Vec3,
}

impl Obstacle {
    /// Create an obstacle from center and half-extents.
    pub const fn new(center: Vec3, half_extents: Vec3) -> Self {
        Self { center, half_extents }
    }

    /// Point containment test with inclusive bounds on all three axes.
    #[inline]
    pub fn contains(&self, point: Vec3) -> bool {
        (point.x - self.center.x).abs() <= self.half_extents.x
            && (point.y - self.center.y).abs() <= self.half_extents.y
            && (point.z - self.center.z).abs() <= self.half_extents.z
    }
}

/// The static world: obstacle list plus the fixed spawn pool.
///
/// Obstacle and spawn declaration order is part of the contract - the
/// resolver tests obstacles first-to-last, so overlapping boxes resolve
/// to the first declared one.
#[derive(Clone, Debug)]
pub struct Arena {
    obstacles: Vec<Obstacle>,
    spawn_points: Vec<Vec3>,
}

impl Arena {
    /// Build an arena from explicit geometry (used by tests).
    pub fn new(obstacles: Vec<Obstacle>, spawn_points: Vec<Vec3>) -> Self {
        Self { obstacles, spawn_points }
    }

    /// The standard map shipped with the client.
    ///
    /// Spawn points are placed clear of every obstacle; that precondition
    /// is satisfied by placement, not validated at runtime.
    pub fn standard() -> Self {
        let obstacles = vec![
            Obstacle::new(Vec3::new(10.0, 2.5, -10.0), Vec3::new(2.5, 2.5, 2.5)),
            Obstacle::new(Vec3::new(-15.0, 3.0, 5.0), Vec3::new(3.0, 3.0, 3.0)),
            Obstacle::new(Vec3::new(5.0, 2.0, 15.0), Vec3::new(2.0, 2.0, 2.0)),
            Obstacle::new(Vec3::new(-5.0, 1.5, -5.0), Vec3::new(1.5, 1.5, 1.5)),
        ];

        let spawn_points = vec![
            Vec3::new(0.0, 0.9, 0.0),
            Vec3::new(10.0, 0.9, 10.0),
            Vec3::new(-10.0, 0.9, -10.0),
            Vec3::new(10.0, 0.9, -10.0),
            Vec3::new(-10.0, 0.9, 10.0),
        ];

        Self { obstacles, spawn_points }
    }

    /// Obstacles in declaration order.
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// The spawn point pool.
    pub fn spawn_points(&self) -> &[Vec3] {
        &self.spawn_points
    }

    /// Pick a spawn point uniformly at random. No side effects beyond
    /// advancing the RNG.
    pub fn pick_spawn(&self, rng: &mut GameRng) -> Vec3 {
        rng.choose(&self.spawn_points).copied().unwrap_or(Vec3::ZERO)
    }
}

// =============================================================================
// TESTS
// =============================================================================
