//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One frame clock value per tick, passed in by the caller
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod boss;
pub mod collision;
pub mod effects;
pub mod enemy;
pub mod particle;
pub mod player;
pub mod powerup;
pub mod projectile;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod weapon;

pub use boss::{AttackPattern, BOSS_PHASES, BossPhase, BossState, select_phase};
pub use collision::{KillCause, circles_overlap, resolve_collisions};
pub use effects::{EffectKind, EffectSchedule, ScheduledEffect};
pub use enemy::{Enemy, EnemyKind, MovementPattern};
pub use particle::{Particle, Rgb};
pub use player::{BeamState, MoveInput, PlayerShip, ShipArchetype};
pub use powerup::{PowerUp, PowerUpKind};
pub use projectile::{Projectile, ProjectileKind};
pub use snapshot::{Snapshot, build_snapshot};
pub use state::{
    AudioEvent, EnemyId, GameConfig, GamePhase, GameState, MusicTrack, ShipId, boss_threshold,
};
pub use tick::{TickInput, tick};
pub use weapon::{Armory, WeaponKind, WeaponStats};
