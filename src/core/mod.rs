//! Core math primitives.
//!
//! Shared by the game layer for positions, projectile stepping and spawn
//! selection. The PRNG is seedable so tests can pin spawn choices.

pub mod rng;
pub mod vec3;

// Re-export core types
pub use rng::GameRng;
pub use vec3::Vec3;
