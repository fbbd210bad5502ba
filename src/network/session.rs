//! Game Room and Event Fan-Out
//!
//! One room holds the whole match: the player registry, the static arena
//! and the per-client outbound channels. The server calls into it with one
//! write guard held per inbound event, so every handler body here is atomic
//! with respect to the roster - no awaits, no partial mutations visible to
//! other handlers.

use std::collections::BTreeMap;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::core::rng::GameRng;
use crate::core::vec3::Vec3;
use crate::game::ballistics::{self, HitOutcome};
use crate::game::player::PlayerId;
use crate::game::registry::{PlayerRegistry, RegistryError};
use crate::game::world::Arena;
use crate::network::protocol::{ClientEvent, MoveUpdate, ServerEvent, ShotInfo};

// =============================================================================
// DELIVERY / BROADCASTER
// =============================================================================

/// Which connections an outbound event goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// One specific player only.
    To(PlayerId),
    /// Every player except the given one (typically the sender).
    AllExcept(PlayerId),
    /// Every connected player.
    Everyone,
}

/// Fans outbound events out to per-client channels.
///
/// Sends never block: a client whose channel is full has its event dropped
/// with a warning rather than stalling the handler that produced it.
#[derive(Debug, Default)]
pub struct Broadcaster {
    senders: BTreeMap<PlayerId, mpsc::Sender<ServerEvent>>,
}

impl Broadcaster {
    /// Create an empty broadcaster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a client's outbound channel.
    pub fn register(&mut self, id: PlayerId, sender: mpsc::Sender<ServerEvent>) {
        self.senders.insert(id, sender);
    }

    /// Detach a client's outbound channel.
    pub fn unregister(&mut self, id: &PlayerId) {
        self.senders.remove(id);
    }

    /// Deliver an event to the given target set.
    pub fn send(&self, delivery: Delivery, event: ServerEvent) {
        match delivery {
            Delivery::To(id) => {
                if let Some(sender) = self.senders.get(&id) {
                    Self::deliver(id, sender, event);
                }
            }
            Delivery::AllExcept(skip) => {
                for (id, sender) in &self.senders {
                    if *id != skip {
                        Self::deliver(*id, sender, event.clone());
                    }
                }
            }
            Delivery::Everyone => {
                for (id, sender) in &self.senders {
                    Self::deliver(*id, sender, event.clone());
                }
            }
        }
    }

    fn deliver(id: PlayerId, sender: &mpsc::Sender<ServerEvent>, event: ServerEvent) {
        if sender.try_send(event).is_err() {
            warn!("dropping event for lagging client {}", id.short());
        }
    }
}

// =============================================================================
// GAME ROOM
// =============================================================================

/// The single match room: session lifecycle controller plus broadcaster.
pub struct GameRoom {
    arena: Arena,
    registry: PlayerRegistry,
    rng: GameRng,
    broadcaster: Broadcaster,
}

impl GameRoom {
    /// Create a room for the given arena, seeded from the clock.
    pub fn new(arena: Arena) -> Self {
        Self::with_rng(arena, GameRng::from_entropy())
    }

    /// Create a room with a fixed RNG, for deterministic tests.
    pub fn with_rng(arena: Arena, rng: GameRng) -> Self {
        Self {
            arena,
            registry: PlayerRegistry::new(),
            rng,
            broadcaster: Broadcaster::new(),
        }
    }

    /// Number of players currently in the room.
    pub fn player_count(&self) -> usize {
        self.registry.len()
    }

    /// Read access to the roster, for inspection and tests.
    pub fn registry(&self) -> &PlayerRegistry {
        &self.registry
    }

    /// A connection became active: spawn the player and run the join
    /// broadcast sequence (snapshot to self, public record to the others,
    /// score entry to everyone).
    ///
    /// A duplicate id means the transport handed out a colliding identity;
    /// the caller logs it and drops the connection.
    pub fn handle_connect(
        &mut self,
        id: PlayerId,
        sender: mpsc::Sender<ServerEvent>,
    ) -> Result<(), RegistryError> {
        let spawn = self.arena.pick_spawn(&mut self.rng);
        let state = self.registry.add(id, spawn)?.clone();
        self.broadcaster.register(id, sender);

        info!("player {} joined ({} online)", id.short(), self.registry.len());

        self.broadcaster
            .send(Delivery::To(id), ServerEvent::CurrentPlayers(self.registry.snapshot()));
        self.broadcaster
            .send(Delivery::AllExcept(id), ServerEvent::NewPlayer(state.clone()));
        self.broadcaster
            .send(Delivery::Everyone, ServerEvent::PlayerScoreUpdated(state));
        Ok(())
    }

    /// Dispatch one inbound client event.
    ///
    /// Returns the id of a player whose respawn must be scheduled, if this
    /// event produced a kill. The caller owns the timer so this handler
    /// stays non-suspending.
    pub fn handle_event(&mut self, id: PlayerId, event: ClientEvent) -> Option<PlayerId> {
        match event {
            ClientEvent::PlayerMove(update) => {
                self.handle_move(id, update);
                None
            }
            ClientEvent::Shoot(shot) => self.handle_shoot(id, shot),
        }
    }

    fn handle_move(&mut self, id: PlayerId, update: MoveUpdate) {
        if !update.position.is_finite() {
            debug!("dropping move with non-finite position from {}", id.short());
            return;
        }

        // Dead or unknown players fail the update silently; nothing is
        // rebroadcast for them.
        if self.registry.update_transform(id, update.position, update.rotation) {
            self.broadcaster.send(
                Delivery::AllExcept(id),
                ServerEvent::PlayerMoved {
                    id,
                    position: update.position,
                    rotation: update.rotation,
                },
            );
        }
    }

    fn handle_shoot(&mut self, id: PlayerId, shot: ShotInfo) -> Option<PlayerId> {
        if shot.damage < 0 || !shot.position.is_finite() || !shot.direction.is_finite() {
            debug!("dropping malformed shot from {}", id.short());
            return None;
        }
        let direction = shot.direction.normalize();
        if direction == Vec3::ZERO {
            debug!("dropping zero-direction shot from {}", id.short());
            return None;
        }

        // The dead don't shoot, and their shots are not replayed.
        match self.registry.get(&id) {
            Some(player) if player.is_alive() => {}
            _ => return None,
        }

        // Visual replay for everyone else, regardless of what the shot hits.
        self.broadcaster.send(
            Delivery::AllExcept(id),
            ServerEvent::BulletShot {
                shooter_id: id,
                position: shot.position,
                direction,
                bullet_color: shot.bullet_color,
            },
        );

        let outcome = ballistics::resolve(
            &mut self.registry,
            &self.arena,
            id,
            shot.position,
            direction,
            shot.damage,
        );

        let HitOutcome::PlayerHit { target, resulting_health, killed, .. } = outcome else {
            return None;
        };

        self.broadcaster
            .send(Delivery::To(target), ServerEvent::PlayerHit { health: resulting_health });

        if !killed {
            return None;
        }

        info!("player {} killed {}", id.short(), target.short());

        // Score updates go out before the death announcement.
        if let Some(shooter) = self.registry.get(&id) {
            self.broadcaster
                .send(Delivery::Everyone, ServerEvent::PlayerScoreUpdated(shooter.clone()));
        }
        if let Some(victim) = self.registry.get(&target) {
            self.broadcaster
                .send(Delivery::Everyone, ServerEvent::PlayerScoreUpdated(victim.clone()));
        }
        self.broadcaster.send(
            Delivery::Everyone,
            ServerEvent::PlayerDied { player_id: target, killer_id: id },
        );

        Some(target)
    }

    /// A respawn timer fired. The player may have disconnected while the
    /// timer was pending; that case is a silent no-op, never an error.
    pub fn handle_respawn(&mut self, id: PlayerId) {
        let spawn = self.arena.pick_spawn(&mut self.rng);
        match self.registry.respawn(id, spawn) {
            Ok(player) => {
                let (position, health) = (player.position, player.health);
                self.broadcaster.send(
                    Delivery::Everyone,
                    ServerEvent::PlayerRespawned { player_id: id, position, health },
                );
            }
            Err(_) => {
                debug!("respawn for {} skipped; player already left", id.short());
            }
        }
    }

    /// A connection closed: drop the player and tell everyone who's left.
    pub fn handle_disconnect(&mut self, id: PlayerId) {
        self.broadcaster.unregister(&id);
        match self.registry.remove(id) {
            Ok(_) => {
                info!("player {} left ({} online)", id.short(), self.registry.len());
                self.broadcaster
                    .send(Delivery::Everyone, ServerEvent::PlayerDisconnected { id });
            }
            Err(_) => {
                debug!("disconnect for unknown player {}", id.short());
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
