//! Player Registry
//!
//! Exclusive owner of all player records. Every mutation of a player goes
//! through an operation here, invoked by the session controller or the
//! ballistics resolver, never directly.
//!
//! Iteration order matters: the resolver tests hitboxes in join order so
//! overlapping hitboxes resolve deterministically to the first-registered
//! player. The registry maintains that order explicitly.

use std::collections::BTreeMap;

use crate::core::vec3::Vec3;
use crate::game::player::{PlayerId, PlayerState, Rotation, MAX_HEALTH};

/// Registry operation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Connection id collision. Should be unreachable given uuid-per-connection;
    /// treated as fatal for that connection and logged by the caller.
    #[error("player {0} is already registered")]
    DuplicateId(PlayerId),

    /// Expected and recoverable: a late timer or stale reference targeted a
    /// player who already disconnected. Always handled as a silent no-op.
    #[error("player {0} is not registered")]
    NotFound(PlayerId),
}

/// Result of one `apply_damage` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageOutcome {
    /// Health after the damage was applied and clamped.
    pub new_health: i32,
    /// True exactly on the transition from health > 0 to health == 0.
    /// Repeated damage on an already-dead player never re-triggers this.
    pub died: bool,
}

/// Mapping from connection identity to player state.
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    players: BTreeMap<PlayerId, PlayerState>,
    /// Ids in join order, for deterministic hitbox iteration.
    join_order: Vec<PlayerId>,
}

impl PlayerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new player at the given spawn position with full health
    /// and zero score.
    pub fn add(&mut self, id: PlayerId, spawn: Vec3) -> Result<&PlayerState, RegistryError> {
        if self.players.contains_key(&id) {
            return Err(RegistryError::DuplicateId(id));
        }
        self.join_order.push(id);
        Ok(self.players.entry(id).or_insert(PlayerState::new(id, spawn)))
    }

    /// Delete and return a player record.
    pub fn remove(&mut self, id: PlayerId) -> Result<PlayerState, RegistryError> {
        let state = self
            .players
            .remove(&id)
            .ok_or(RegistryError::NotFound(id))?;
        self.join_order.retain(|entry| *entry != id);
        Ok(state)
    }

    /// Look up a player.
    pub fn get(&self, id: &PlayerId) -> Option<&PlayerState> {
        self.players.get(id)
    }

    /// Apply a movement update. Silently ignored (returns `false`) when the
    /// player is absent or dead - movement from the dead must never mutate
    /// state or be rebroadcast.
    pub fn update_transform(&mut self, id: PlayerId, position: Vec3, rotation: Rotation) -> bool {
        match self.players.get_mut(&id) {
            Some(player) if player.is_alive() => {
                player.position = position;
                player.rotation = rotation;
                true
            }
            _ => false,
        }
    }

    /// Subtract `amount` from the player's health, clamping to
    /// [0, MAX_HEALTH].
    ///
    /// `died` fires only on the transition across zero; once dead, further
    /// calls leave health at 0 with `died == false`.
    pub fn apply_damage(
        &mut self,
        id: PlayerId,
        amount: i32,
    ) -> Result<DamageOutcome, RegistryError> {
        let player = self.players.get_mut(&id).ok_or(RegistryError::NotFound(id))?;
        let was_alive = player.is_alive();
        player.health = (player.health - amount).clamp(0, MAX_HEALTH);
        Ok(DamageOutcome {
            new_health: player.health,
            died: was_alive && player.health == 0,
        })
    }

    /// Increment the player's kill counter. Missing players are ignored
    /// (the shooter may have disconnected mid-resolution).
    pub fn record_kill(&mut self, id: PlayerId) {
        if let Some(player) = self.players.get_mut(&id) {
            player.kills += 1;
        }
    }

    /// Increment the player's death counter. Missing players are ignored.
    pub fn record_death(&mut self, id: PlayerId) {
        if let Some(player) = self.players.get_mut(&id) {
            player.deaths += 1;
        }
    }

    /// Reset position to a new spawn point and restore full health.
    ///
    /// Returns `NotFound` when the player disconnected while the respawn
    /// timer was pending; the caller treats that as a no-op.
    pub fn respawn(&mut self, id: PlayerId, spawn: Vec3) -> Result<&PlayerState, RegistryError> {
        let player = self.players.get_mut(&id).ok_or(RegistryError::NotFound(id))?;
        player.position = spawn;
        player.health = MAX_HEALTH;
        Ok(player)
    }

    /// Full read-only copy of the roster, for initial sync.
    pub fn snapshot(&self) -> BTreeMap<PlayerId, PlayerState> {
        self.players.clone()
    }

    /// Iterate players in join order.
    pub fn iter_join_order(&self) -> impl Iterator<Item = &PlayerState> {
        self.join_order.iter().filter_map(|id| self.players.get(id))
    }

    /// Number of registered players.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// True when no players are registered.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pid(n: u8) -> PlayerId {
        PlayerId::new([n; 16])
    }

    #[test]
    fn test_add_and_get() {
        let mut registry = PlayerRegistry::new();
        let spawn = Vec3::new(10.0, 0.9, 10.0);

        let player = registry.add(pid(1), spawn).unwrap();
        assert_eq!(player.health, MAX_HEALTH);
        assert_eq!(player.position, spawn);

        assert!(registry.get(&pid(1)).is_some());
        assert!(registry.get(&pid(2)).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_add_duplicate_fails() {
        let mut registry = PlayerRegistry::new();
        registry.add(pid(1), Vec3::ZERO).unwrap();

        let err = registry.add(pid(1), Vec3::ZERO).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateId(pid(1)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut registry = PlayerRegistry::new();
        registry.add(pid(1), Vec3::ZERO).unwrap();

        let state = registry.remove(pid(1)).unwrap();
        assert_eq!(state.id, pid(1));
        assert!(registry.is_empty());

        assert_eq!(registry.remove(pid(1)).unwrap_err(), RegistryError::NotFound(pid(1)));
    }

    #[test]
    fn test_update_transform_alive() {
        let mut registry = PlayerRegistry::new();
        registry.add(pid(1), Vec3::ZERO).unwrap();

        let pos = Vec3::new(1.0, 0.0, 2.0);
        let rot = Rotation { x: 0.1, y: 1.5 };
        assert!(registry.update_transform(pid(1), pos, rot));

        let player = registry.get(&pid(1)).unwrap();
        assert_eq!(player.position, pos);
        assert_eq!(player.rotation, rot);
    }

    #[test]
    fn test_update_transform_dead_or_absent_is_noop() {
        let mut registry = PlayerRegistry::new();
        registry.add(pid(1), Vec3::ZERO).unwrap();
        registry.apply_damage(pid(1), MAX_HEALTH).unwrap();

        // Dead: no mutation
        assert!(!registry.update_transform(pid(1), Vec3::new(5.0, 0.0, 5.0), Rotation::default()));
        assert_eq!(registry.get(&pid(1)).unwrap().position, Vec3::ZERO);

        // Absent: no error either
        assert!(!registry.update_transform(pid(9), Vec3::ZERO, Rotation::default()));
    }

    #[test]
    fn test_apply_damage_death_transition_fires_once() {
        let mut registry = PlayerRegistry::new();
        registry.add(pid(1), Vec3::ZERO).unwrap();

        let hit = registry.apply_damage(pid(1), 40).unwrap();
        assert_eq!(hit, DamageOutcome { new_health: 60, died: false });

        let hit = registry.apply_damage(pid(1), 40).unwrap();
        assert_eq!(hit, DamageOutcome { new_health: 20, died: false });

        // Transition across zero: clamped, died fires
        let hit = registry.apply_damage(pid(1), 40).unwrap();
        assert_eq!(hit, DamageOutcome { new_health: 0, died: true });

        // Already dead: stays at zero, died never fires again
        let hit = registry.apply_damage(pid(1), 40).unwrap();
        assert_eq!(hit, DamageOutcome { new_health: 0, died: false });
    }

    #[test]
    fn test_apply_damage_missing_player() {
        let mut registry = PlayerRegistry::new();
        assert_eq!(
            registry.apply_damage(pid(3), 10).unwrap_err(),
            RegistryError::NotFound(pid(3))
        );
    }

    #[test]
    fn test_score_counters() {
        let mut registry = PlayerRegistry::new();
        registry.add(pid(1), Vec3::ZERO).unwrap();

        registry.record_kill(pid(1));
        registry.record_kill(pid(1));
        registry.record_death(pid(1));

        let player = registry.get(&pid(1)).unwrap();
        assert_eq!(player.kills, 2);
        assert_eq!(player.deaths, 1);

        // Counters for missing players are dropped silently
        registry.record_kill(pid(9));
        registry.record_death(pid(9));
    }

    #[test]
    fn test_respawn_restores_health_and_moves() {
        let mut registry = PlayerRegistry::new();
        registry.add(pid(1), Vec3::ZERO).unwrap();
        registry.apply_damage(pid(1), MAX_HEALTH).unwrap();

        let spawn = Vec3::new(-10.0, 0.9, 10.0);
        let player = registry.respawn(pid(1), spawn).unwrap();
        assert_eq!(player.health, MAX_HEALTH);
        assert_eq!(player.position, spawn);
    }

    #[test]
    fn test_respawn_after_disconnect_is_not_found() {
        let mut registry = PlayerRegistry::new();
        registry.add(pid(1), Vec3::ZERO).unwrap();
        registry.remove(pid(1)).unwrap();

        assert_eq!(
            registry.respawn(pid(1), Vec3::ZERO).unwrap_err(),
            RegistryError::NotFound(pid(1))
        );
    }

    #[test]
    fn test_snapshot_tracks_removal() {
        let mut registry = PlayerRegistry::new();
        registry.add(pid(1), Vec3::ZERO).unwrap();
        registry.add(pid(2), Vec3::ZERO).unwrap();

        assert_eq!(registry.snapshot().len(), 2);

        registry.remove(pid(1)).unwrap();
        let snap = registry.snapshot();
        assert_eq!(snap.len(), 1);
        assert!(!snap.contains_key(&pid(1)));
    }

    #[test]
    fn test_join_order_is_insertion_order() {
        let mut registry = PlayerRegistry::new();
        // Insert out of id order on purpose
        registry.add(pid(5), Vec3::ZERO).unwrap();
        registry.add(pid(1), Vec3::ZERO).unwrap();
        registry.add(pid(9), Vec3::ZERO).unwrap();

        let order: Vec<PlayerId> = registry.iter_join_order().map(|p| p.id).collect();
        assert_eq!(order, vec![pid(5), pid(1), pid(9)]);

        registry.remove(pid(1)).unwrap();
        let order: Vec<PlayerId> = registry.iter_join_order().map(|p| p.id).collect();
        assert_eq!(order, vec![pid(5), pid(9)]);
    }

    proptest! {
        #[test]
        fn prop_health_always_clamped(amounts in prop::collection::vec(0i32..=500, 0..50)) {
            let mut registry = PlayerRegistry::new();
            registry.add(pid(1), Vec3::ZERO).unwrap();

            let mut deaths = 0;
            for amount in amounts {
                let outcome = registry.apply_damage(pid(1), amount).unwrap();
                prop_assert!((0..=MAX_HEALTH).contains(&outcome.new_health));
                if outcome.died {
                    deaths += 1;
                }
            }

            // The death transition can fire at most once without a respawn
            prop_assert!(deaths <= 1);
        }
    }
}
