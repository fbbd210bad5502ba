//! Ballistics Resolution
//!
//! Steps a fired projectile through the world and resolves the first thing
//! it hits. Obstacles are tested before players at every step, so a box
//! strictly between shooter and target always blocks the shot.
//!
//! The stepwise march is a brute-force discretized raycast kept for
//! bit-for-bit parity with the reference client's bullet flight; exact
//! ray-box/ray-sphere intersection would be equivalent but must preserve
//! the same first-hit ordering.

use crate::core::vec3::Vec3;
use crate::game::player::{PlayerId, HITBOX_RADIUS};
use crate::game::registry::PlayerRegistry;
use crate::game::world::Arena;

/// Reference bullet speed, in world units per client tick.
pub const BULLET_SPEED: f32 = 0.5;

/// Simulation step size (half the bullet speed, for accuracy).
pub const STEP_SIZE: f32 = BULLET_SPEED * 0.5;

/// Number of simulation steps; bounds the bullet range at 50 world units.
pub const MAX_STEPS: usize = 200;

/// What a projectile ended up hitting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitOutcome {
    /// All steps completed without contact.
    NoHit,
    /// The ray entered a static obstacle and stopped.
    ObstacleHit {
        /// Zero-based step index at impact.
        step: usize,
    },
    /// The ray entered a player hitbox; damage has been applied.
    PlayerHit {
        /// The player that was struck.
        target: PlayerId,
        /// Target health after damage.
        resulting_health: i32,
        /// True when this hit was the killing blow.
        killed: bool,
        /// Zero-based step index at impact.
        step: usize,
    },
}

/// Resolve one shot against the world and roster.
///
/// Advances a point from `origin` along the unit `direction` in
/// [`MAX_STEPS`] steps of [`STEP_SIZE`]. Each step tests obstacles in
/// declaration order, then other alive players' hitboxes in join order;
/// the first containment wins and resolution stops.
///
/// A dead or unregistered shooter resolves to `NoHit` without stepping,
/// and the shooter's own hitbox is never tested. On a killing blow the
/// shooter's kill and the target's death counters are recorded here, so
/// the outcome and the scoreboard can never disagree.
pub fn resolve(
    registry: &mut PlayerRegistry,
    arena: &Arena,
    shooter: PlayerId,
    origin: Vec3,
    direction: Vec3,
    damage: i32,
) -> HitOutcome {
    match registry.get(&shooter) {
        Some(player) if player.is_alive() => {}
        _ => return HitOutcome::NoHit,
    }

    let radius_sq = HITBOX_RADIUS * HITBOX_RADIUS;
    let mut point = origin;

    for step in 0..MAX_STEPS {
        point = point.add(direction.scale(STEP_SIZE));

        for obstacle in arena.obstacles() {
            if obstacle.contains(point) {
                return HitOutcome::ObstacleHit { step };
            }
        }

        let target = registry
            .iter_join_order()
            .filter(|p| p.id != shooter && p.is_alive())
            .find(|p| point.distance_squared(p.hitbox_center()) < radius_sq)
            .map(|p| p.id);

        if let Some(target) = target {
            let outcome = match registry.apply_damage(target, damage) {
                Ok(outcome) => outcome,
                // Target vanished between the probe and the write; treat
                // the shot as spent.
                Err(_) => return HitOutcome::NoHit,
            };

            if outcome.died {
                registry.record_death(target);
                registry.record_kill(shooter);
            }

            return HitOutcome::PlayerHit {
                target,
                resulting_health: outcome.new_health,
                killed: outcome.died,
                step,
            };
        }
    }

    HitOutcome::NoHit
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::player::Rotation;
    use crate::game::world::Obstacle;

    fn pid(n: u8) -> PlayerId {
        PlayerId::new([n; 16])
    }

    /// Eye-height origin so the ray passes through hitbox centers of
    /// players standing on the ground.
    fn eye(position: Vec3) -> Vec3 {
        Vec3::new(position.x, 0.9, position.z)
    }

    fn open_arena() -> Arena {
        Arena::new(vec![], vec![Vec3::ZERO])
    }

    /// Registry with a shooter at the origin and a target 5 units down +Z.
    fn duel_registry() -> PlayerRegistry {
        let mut registry = PlayerRegistry::new();
        registry.add(pid(1), Vec3::ZERO).unwrap();
        registry.add(pid(2), Vec3::new(0.0, 0.0, 5.0)).unwrap();
        registry
    }

    const FORWARD: Vec3 = Vec3::new(0.0, 0.0, 1.0);

    #[test]
    fn test_direct_hit_applies_damage() {
        let mut registry = duel_registry();
        let arena = open_arena();

        let outcome = resolve(&mut registry, &arena, pid(1), eye(Vec3::ZERO), FORWARD, 40);
        assert_eq!(
            outcome,
            HitOutcome::PlayerHit {
                target: pid(2),
                resulting_health: 60,
                killed: false,
                step: 18,
            }
        );
        assert_eq!(registry.get(&pid(2)).unwrap().health, 60);
    }

    #[test]
    fn test_third_shot_kills_and_scores() {
        let mut registry = duel_registry();
        let arena = open_arena();

        for expected_health in [60, 20] {
            let outcome = resolve(&mut registry, &arena, pid(1), eye(Vec3::ZERO), FORWARD, 40);
            assert!(matches!(
                outcome,
                HitOutcome::PlayerHit { resulting_health, killed: false, .. }
                    if resulting_health == expected_health
            ));
        }

        let outcome = resolve(&mut registry, &arena, pid(1), eye(Vec3::ZERO), FORWARD, 40);
        assert!(matches!(
            outcome,
            HitOutcome::PlayerHit { target, resulting_health: 0, killed: true, .. }
                if target == pid(2)
        ));

        assert_eq!(registry.get(&pid(1)).unwrap().kills, 1);
        assert_eq!(registry.get(&pid(2)).unwrap().deaths, 1);
    }

    #[test]
    fn test_obstacle_blocks_player_behind_it() {
        let mut registry = PlayerRegistry::new();
        registry.add(pid(1), Vec3::ZERO).unwrap();
        registry.add(pid(2), Vec3::new(0.0, 0.0, 10.0)).unwrap();

        let arena = Arena::new(
            vec![Obstacle::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(2.0, 2.0, 2.0))],
            vec![Vec3::ZERO],
        );

        let outcome = resolve(&mut registry, &arena, pid(1), eye(Vec3::ZERO), FORWARD, 40);
        // Box face at z = 3.0 is reached at step 11 (12 * 0.25)
        assert_eq!(outcome, HitOutcome::ObstacleHit { step: 11 });
        assert_eq!(registry.get(&pid(2)).unwrap().health, 100);
    }

    #[test]
    fn test_dead_shooter_never_hits() {
        let mut registry = duel_registry();
        registry.apply_damage(pid(1), 100).unwrap();
        let arena = open_arena();

        let outcome = resolve(&mut registry, &arena, pid(1), eye(Vec3::ZERO), FORWARD, 40);
        assert_eq!(outcome, HitOutcome::NoHit);
        assert_eq!(registry.get(&pid(2)).unwrap().health, 100);
    }

    #[test]
    fn test_unknown_shooter_never_hits() {
        let mut registry = duel_registry();
        let arena = open_arena();

        let outcome = resolve(&mut registry, &arena, pid(9), eye(Vec3::ZERO), FORWARD, 40);
        assert_eq!(outcome, HitOutcome::NoHit);
    }

    #[test]
    fn test_shooter_own_hitbox_excluded() {
        let mut registry = PlayerRegistry::new();
        registry.add(pid(1), Vec3::ZERO).unwrap();
        let arena = open_arena();

        // Fire straight down through our own hitbox
        let down = Vec3::new(0.0, -1.0, 0.0);
        let outcome = resolve(&mut registry, &arena, pid(1), eye(Vec3::ZERO), down, 40);
        assert_eq!(outcome, HitOutcome::NoHit);
    }

    #[test]
    fn test_dead_target_is_transparent() {
        let mut registry = duel_registry();
        registry.apply_damage(pid(2), 100).unwrap();
        let arena = open_arena();

        let outcome = resolve(&mut registry, &arena, pid(1), eye(Vec3::ZERO), FORWARD, 40);
        assert_eq!(outcome, HitOutcome::NoHit);
        // No further damage, no double death
        assert_eq!(registry.get(&pid(2)).unwrap().health, 0);
        assert_eq!(registry.get(&pid(2)).unwrap().deaths, 0);
    }

    #[test]
    fn test_target_beyond_range_is_missed() {
        let mut registry = PlayerRegistry::new();
        registry.add(pid(1), Vec3::ZERO).unwrap();
        // 200 steps of 0.25 reach 50 units
        registry.add(pid(2), Vec3::new(0.0, 0.0, 60.0)).unwrap();
        let arena = open_arena();

        let outcome = resolve(&mut registry, &arena, pid(1), eye(Vec3::ZERO), FORWARD, 40);
        assert_eq!(outcome, HitOutcome::NoHit);
    }

    #[test]
    fn test_overlapping_targets_resolve_to_first_joined() {
        let mut registry = PlayerRegistry::new();
        registry.add(pid(1), Vec3::ZERO).unwrap();
        // Joined before pid(2) despite the larger id byte
        registry.add(pid(9), Vec3::new(0.0, 0.0, 5.0)).unwrap();
        registry.add(pid(2), Vec3::new(0.0, 0.0, 5.0)).unwrap();
        let arena = open_arena();

        let outcome = resolve(&mut registry, &arena, pid(1), eye(Vec3::ZERO), FORWARD, 10);
        assert!(matches!(
            outcome,
            HitOutcome::PlayerHit { target, .. } if target == pid(9)
        ));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let arena = Arena::new(
            vec![Obstacle::new(Vec3::new(3.0, 1.0, 8.0), Vec3::new(1.0, 1.0, 1.0))],
            vec![Vec3::ZERO],
        );
        let direction = Vec3::new(0.1, 0.0, 1.0).normalize();

        let run = || {
            let mut registry = duel_registry();
            resolve(&mut registry, &arena, pid(1), eye(Vec3::ZERO), direction, 25)
        };

        let first = run();
        for _ in 0..5 {
            assert_eq!(run(), first);
        }
    }

    #[test]
    fn test_moved_target_tracked_through_registry() {
        let mut registry = duel_registry();
        let arena = open_arena();

        // Target sidesteps out of the lane
        registry.update_transform(pid(2), Vec3::new(3.0, 0.0, 5.0), Rotation::default());
        let outcome = resolve(&mut registry, &arena, pid(1), eye(Vec3::ZERO), FORWARD, 40);
        assert_eq!(outcome, HitOutcome::NoHit);
    }
}
