//! Game state and core simulation types
//!
//! Everything the session owns lives in [`GameState`]: entity collections,
//! round bookkeeping, the effect schedule and the one seeded RNG.

use glam::Vec2;
use log::info;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::effects::EffectSchedule;
use super::enemy::{Enemy, EnemyKind};
use super::particle::{self, Particle};
use super::player::{PlayerShip, ShipArchetype, formation_archetypes, wing_offset};
use super::powerup::PowerUp;
use super::projectile::Projectile;
use super::weapon::WeaponKind;
use crate::consts::*;

/// Stable handle to an enemy; resolves to nothing once it leaves the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(pub u32);

/// Stable handle to a player ship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShipId(pub u32);

/// Sim-level phase. Menus and pause live in the session above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    /// Lives ran out; nothing advances until a new game starts
    GameOver,
}

/// Background track requested from the audio service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MusicTrack {
    Menu,
    Game,
}

/// Sound cues emitted by the sim, drained by the session each frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AudioEvent {
    WeaponFired { weapon: WeaponKind },
    Music { track: MusicTrack },
}

/// Gameplay tuning copied from settings at game start
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub initial_lives: u32,
    pub round_multiplier: f64,
    pub power_up_chance: f64,
    pub base_boss_score: f64,
    pub screen_shake: bool,
    /// Session particle pool cap (0 disables cosmetic particles)
    pub max_particles: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            initial_lives: 5,
            round_multiplier: 1.5,
            power_up_chance: 0.2,
            base_boss_score: 1000.0,
            screen_shake: true,
            max_particles: 500,
        }
    }
}

/// Round score needed to call in the boss
pub fn boss_threshold(base: f64, multiplier: f64, round: u32) -> f64 {
    base * multiplier.powi(round.saturating_sub(1) as i32)
}

/// Decaying random camera offset
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenShake {
    pub intensity: f32,
    pub duration_ms: u64,
    pub started_ms: u64,
    pub offset: Vec2,
}

impl ScreenShake {
    pub fn start(&mut self, intensity: f32, duration_ms: u64, now_ms: u64) {
        self.intensity = intensity;
        self.duration_ms = duration_ms;
        self.started_ms = now_ms;
    }

    pub fn update(&mut self, now_ms: u64, rng: &mut impl Rng) {
        if self.intensity <= 0.0 {
            return;
        }
        let elapsed = now_ms.saturating_sub(self.started_ms);
        if elapsed < self.duration_ms {
            let current = self.intensity * (1.0 - elapsed as f32 / self.duration_ms as f32);
            self.offset = Vec2::new(
                rng.random_range(-current..=current),
                rng.random_range(-current..=current),
            );
        } else {
            self.intensity = 0.0;
            self.offset = Vec2::ZERO;
        }
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub config: GameConfig,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Current round (1-based, never decreases)
    pub round: u32,
    pub score: u64,
    pub round_score: u64,
    pub score_for_boss: f64,
    pub lives: u32,
    pub boss_spawned: bool,
    pub boss: Option<EnemyId>,
    /// Boss confirmed dead; the next tick starts a new round
    pub round_transition: bool,
    /// Formation size, 1..=3
    pub formation: usize,
    pub selected: ShipArchetype,
    /// Formation members; index 0 anchors the others
    pub ships: Vec<PlayerShip>,
    pub enemies: Vec<Enemy>,
    /// Bullets of destroyed enemies, still harmful until they leave the screen
    pub stray_bullets: Vec<Projectile>,
    /// Explosions and other free-floating particles
    pub particles: Vec<Particle>,
    pub power_ups: Vec<PowerUp>,
    pub effects: EffectSchedule,
    pub shake: ScreenShake,
    /// Gameplay frozen behind the round banner until this time
    pub announcement_until_ms: Option<u64>,
    /// Lead ship health percentage at the last redcross check
    pub last_health_check: f32,
    /// Sound cues since the last drain
    pub audio_events: Vec<AudioEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Fresh game: single-ship formation, opening wave, round banner up
    pub fn new(seed: u64, selected: ShipArchetype, config: GameConfig, now_ms: u64) -> Self {
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            config,
            phase: GamePhase::Playing,
            time_ticks: 0,
            round: 1,
            score: 0,
            round_score: 0,
            score_for_boss: boss_threshold(config.base_boss_score, config.round_multiplier, 1),
            lives: config.initial_lives,
            boss_spawned: false,
            boss: None,
            round_transition: false,
            formation: 1,
            selected,
            ships: Vec::new(),
            enemies: Vec::new(),
            stray_bullets: Vec::new(),
            particles: Vec::new(),
            power_ups: Vec::new(),
            effects: EffectSchedule::default(),
            shake: ScreenShake::default(),
            announcement_until_ms: Some(now_ms + ROUND_ANNOUNCE_MS),
            last_health_check: 100.0,
            audio_events: Vec::new(),
            next_id: 1,
        };

        state.set_formation(1);
        for _ in 0..WAVE_SIZE {
            state.spawn_regular(now_ms);
        }
        info!("Game started (seed {seed}, ship {})", selected.name());
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn enemy(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id && e.is_alive())
    }

    pub fn ship(&self, id: ShipId) -> Option<&PlayerShip> {
        self.ships.iter().find(|s| s.id == id)
    }

    pub fn boss_alive(&self) -> bool {
        self.boss.and_then(|id| self.enemy(id)).is_some()
    }

    pub fn live_enemy_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.is_alive()).count()
    }

    /// Lead ship health as a percentage of its maximum
    pub fn lead_health_percent(&self) -> f32 {
        self.ships
            .first()
            .map(|s| s.health as f32 * 100.0 / s.max_health as f32)
            .unwrap_or(100.0)
    }

    pub fn spawn_enemy(&mut self, kind: EnemyKind, now_ms: u64) -> EnemyId {
        let id = EnemyId(self.next_entity_id());
        let enemy = Enemy::spawn(id, kind, self.round, now_ms, &mut self.rng);
        self.enemies.push(enemy);
        id
    }

    /// Spawn one regular enemy from the weighted table
    pub fn spawn_regular(&mut self, now_ms: u64) -> EnemyId {
        let kind = EnemyKind::random_regular(&mut self.rng);
        self.spawn_enemy(kind, now_ms)
    }

    pub fn spawn_boss(&mut self, now_ms: u64) {
        let id = self.spawn_enemy(EnemyKind::Boss, now_ms);
        self.boss = Some(id);
        self.boss_spawned = true;
        info!("Boss incoming! (round {})", self.round);
    }

    /// Rebuild the formation with `size` ships at the start position.
    /// The selected hull leads; wings get distinct random hulls.
    pub fn set_formation(&mut self, size: usize) {
        let size = size.clamp(1, 3);
        for ship in &self.ships {
            self.effects.forget_ship(ship.id);
        }
        self.ships.clear();

        let archetypes = formation_archetypes(self.selected, size, &mut self.rng);
        for (i, archetype) in archetypes.into_iter().enumerate() {
            let id = ShipId(self.next_entity_id());
            let pos = Vec2::new(SHIP_START_X + wing_offset(i), SHIP_START_Y);
            self.ships.push(PlayerShip::new(id, archetype, pos));
        }
        self.formation = size;
        self.last_health_check = self.lead_health_percent();
        info!("Formation updated: {} ships", self.ships.len());
    }

    /// Snap wings to the anchor ship
    pub fn sync_formation(&mut self) {
        let Some(anchor) = self.ships.first().map(|s| s.pos) else {
            return;
        };
        for (i, ship) in self.ships.iter_mut().enumerate().skip(1) {
            ship.pos = Vec2::new(anchor.x + wing_offset(i), anchor.y);
        }
    }

    /// Move the whole formation back to the start position
    pub fn reset_formation_position(&mut self) {
        if let Some(anchor) = self.ships.first_mut() {
            anchor.pos = Vec2::new(SHIP_START_X, SHIP_START_Y);
        }
        self.sync_formation();
    }

    pub fn explode(&mut self, pos: Vec2, size: f32) {
        if self.config.max_particles == 0 {
            return;
        }
        particle::explosion(&mut self.particles, &mut self.rng, pos, size);
    }

    pub fn start_shake(&mut self, intensity: f32, duration_ms: u64, now_ms: u64) {
        if self.config.screen_shake {
            self.shake.start(intensity, duration_ms, now_ms);
        }
    }

    /// Take the pending sound cues
    pub fn drain_audio_events(&mut self) -> Vec<AudioEvent> {
        std::mem::take(&mut self.audio_events)
    }
}
