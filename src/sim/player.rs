//! Player ships and formation layout

use glam::Vec2;
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::effects::{EffectKind, EffectSchedule};
use super::enemy::Enemy;
use super::particle::{self, MAX_OWNED_PARTICLES, Particle, Rgb};
use super::projectile::Projectile;
use super::state::ShipId;
use super::weapon::{Armory, WeaponKind};
use crate::consts::*;

/// Speed multiplier granted by a speed pickup
pub const SPEED_BOOST_MULTIPLIER: f32 = 1.5;

/// Selectable hull. Purely cosmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ShipArchetype {
    #[default]
    Interceptor,
    Striker,
    Phantom,
    Guardian,
    Avenger,
    Stealth,
}

impl ShipArchetype {
    pub const ALL: [ShipArchetype; 6] = [
        ShipArchetype::Interceptor,
        ShipArchetype::Striker,
        ShipArchetype::Phantom,
        ShipArchetype::Guardian,
        ShipArchetype::Avenger,
        ShipArchetype::Stealth,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ShipArchetype::Interceptor => "interceptor",
            ShipArchetype::Striker => "striker",
            ShipArchetype::Phantom => "phantom",
            ShipArchetype::Guardian => "guardian",
            ShipArchetype::Avenger => "avenger",
            ShipArchetype::Stealth => "stealth",
        }
    }

    pub fn color(self) -> Rgb {
        match self {
            ShipArchetype::Interceptor => [30, 144, 255],
            ShipArchetype::Striker => [50, 205, 50],
            ShipArchetype::Phantom => [147, 112, 219],
            ShipArchetype::Guardian => [255, 165, 0],
            ShipArchetype::Avenger => [220, 20, 60],
            ShipArchetype::Stealth => [75, 0, 130],
        }
    }
}

/// Archetypes for a formation of `size` ships: the selection leads, wings are
/// drawn from the remaining hulls without repeats.
pub fn formation_archetypes(
    selected: ShipArchetype,
    size: usize,
    rng: &mut impl Rng,
) -> Vec<ShipArchetype> {
    let mut pool: Vec<ShipArchetype> = ShipArchetype::ALL
        .iter()
        .copied()
        .filter(|a| *a != selected)
        .collect();
    let mut out = vec![selected];
    while out.len() < size.clamp(1, 3) && !pool.is_empty() {
        let pick = pool.swap_remove(rng.random_range(0..pool.len()));
        out.push(pick);
    }
    out
}

/// Horizontal offset of formation slot `index` from the anchor ship
pub fn wing_offset(index: usize) -> f32 {
    match index {
        1 => -SHIP_SPACING,
        2 => SHIP_SPACING,
        _ => 0.0,
    }
}

/// Directional input held this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl MoveInput {
    pub fn direction(self) -> Vec2 {
        let axis = |neg: bool, pos: bool| (pos as i32 - neg as i32) as f32;
        Vec2::new(axis(self.left, self.right), axis(self.up, self.down))
    }
}

/// Continuous beam stream state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BeamState {
    #[default]
    Idle,
    Firing,
    /// Cut off after the maximum burst; re-armed when the trigger is released
    Locked,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerShip {
    pub id: ShipId,
    pub archetype: ShipArchetype,
    pub pos: Vec2,
    pub health: i32,
    pub max_health: i32,
    pub shield: i32,
    pub invulnerable: bool,
    pub radius: f32,
    pub speed_multiplier: f32,
    pub weapon: WeaponKind,
    pub armory: Armory,
    pub beam: BeamState,
    pub bullets: Vec<Projectile>,
    pub particles: Vec<Particle>,
}

impl PlayerShip {
    pub fn new(id: ShipId, archetype: ShipArchetype, pos: Vec2) -> Self {
        Self {
            id,
            archetype,
            pos,
            health: SHIP_MAX_HEALTH,
            max_health: SHIP_MAX_HEALTH,
            shield: 0,
            invulnerable: false,
            radius: SHIP_RADIUS,
            speed_multiplier: 1.0,
            weapon: WeaponKind::default(),
            armory: Armory::default(),
            beam: BeamState::Idle,
            bullets: Vec::new(),
            particles: Vec::new(),
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// Move by the held direction and clamp to the playfield
    pub fn steer(&mut self, input: MoveInput) {
        let step = input.direction() * SHIP_SPEED * self.speed_multiplier;
        self.pos = clamp_to_screen(self.pos + step);
    }

    /// Advance owned bullets and particles. `particle_cap` 0 turns the engine trail off.
    pub fn update(&mut self, enemies: &[Enemy], particle_cap: usize, rng: &mut impl Rng) {
        for bullet in &mut self.bullets {
            bullet.advance(enemies);
        }
        self.bullets.retain(|b| !b.is_offscreen());

        if particle_cap > 0 && rng.random_bool(0.3) {
            let vel = Vec2::new(rng.random_range(-1.0..1.0), rng.random_range(1.0..3.0));
            let exhaust = self.pos + Vec2::new(0.0, SHIP_HALF_EXTENT);
            self.particles
                .push(Particle::new(exhaust, vel, [100, 100, 255], 3.0, rng));
        }
        particle::update_particles(&mut self.particles, particle_cap.min(MAX_OWNED_PARTICLES));
    }

    /// Fire the equipped weapon if its cooldown allows. Returns the weapon that fired.
    pub fn shoot(
        &mut self,
        now_ms: u64,
        enemies: &[Enemy],
        effects: &mut EffectSchedule,
        rng: &mut impl Rng,
    ) -> Option<WeaponKind> {
        let kind = self.weapon;
        if !self.armory.ready(kind, now_ms) {
            return None;
        }

        if kind == WeaponKind::Beam {
            match self.beam {
                BeamState::Locked => return None,
                BeamState::Idle => {
                    self.beam = BeamState::Firing;
                    effects.schedule(self.id, EffectKind::BeamCutoff, now_ms + BEAM_MAX_MS);
                }
                BeamState::Firing => {}
            }
        }

        self.armory.mark_fired(kind, now_ms);
        let stats = self.armory.stats(kind);
        let muzzle = self.pos - Vec2::new(0.0, SHIP_HALF_EXTENT);
        let bullet = |offset_x: f32, angle: f32| {
            Projectile::player(
                kind,
                muzzle + Vec2::new(offset_x, 0.0),
                angle,
                stats.damage,
                stats.bullet_radius,
                stats.speed,
                stats.spread,
            )
        };

        match kind {
            WeaponKind::MachineGun => {
                self.bullets.push(bullet(-10.0, -5.0));
                self.bullets.push(bullet(10.0, 5.0));
            }
            WeaponKind::Shotgun => {
                for angle in [-30.0, -15.0, 0.0, 15.0, 30.0] {
                    self.bullets.push(bullet(0.0, angle));
                }
            }
            WeaponKind::Beam => {
                for angle in [-5.0, 0.0, 5.0] {
                    self.bullets.push(bullet(0.0, angle));
                }
            }
            WeaponKind::Laser | WeaponKind::Cannon => {
                self.bullets.push(bullet(0.0, 0.0));
            }
            WeaponKind::Missile => {
                let targets = nearest_targets(enemies, self.pos, 6);
                for i in 0..6 {
                    let pos = muzzle + Vec2::new((i as f32 - 2.5) * 8.0, 0.0);
                    self.bullets.push(Projectile::missile(
                        pos,
                        stats.damage,
                        stats.bullet_radius,
                        stats.speed,
                        targets.get(i).copied(),
                    ));
                }
            }
        }

        for _ in 0..5 {
            let vel = Vec2::new(rng.random_range(-2.0..2.0), rng.random_range(-2.0..0.0));
            self.particles
                .push(Particle::new(muzzle, vel, kind.flash_color(), 3.0, rng));
        }
        debug!("Ship {} fired {}", self.id.0, kind.name());
        Some(kind)
    }

    /// Apply a hit through the shield. No-op while invulnerable.
    pub fn take_damage(
        &mut self,
        amount: i32,
        now_ms: u64,
        effects: &mut EffectSchedule,
        rng: &mut impl Rng,
    ) {
        if self.invulnerable {
            return;
        }
        let mut amount = amount.max(0);

        if self.shield > 0 {
            let absorbed = amount * 3 / 4;
            let remainder = amount - absorbed;
            if absorbed >= self.shield {
                amount = remainder + (absorbed - self.shield);
                self.shield = 0;
                particle::burst(
                    &mut self.particles,
                    rng,
                    self.pos,
                    20,
                    [0, 255, 255],
                    (3.0, 7.0),
                    3.0,
                );
            } else {
                self.shield -= absorbed;
                amount = remainder;
            }
        }

        self.health = (self.health - amount).clamp(0, self.max_health);
        self.invulnerable = true;
        effects.schedule(self.id, EffectKind::Invulnerable, now_ms + INVULNERABLE_MS);
        self.emit_damage_particles(rng);
    }

    fn emit_damage_particles(&mut self, rng: &mut impl Rng) {
        const FLECKS: [Rgb; 3] = [[255, 0, 0], [255, 100, 0], [255, 50, 50]];
        for _ in 0..15 {
            let color = FLECKS[rng.random_range(0..FLECKS.len())];
            let size = rng.random_range(2..=4) as f32;
            particle::burst(&mut self.particles, rng, self.pos, 1, color, (4.0, 8.0), size);
        }
        let start = self.particles.len();
        particle::burst(&mut self.particles, rng, self.pos, 8, [255, 255, 0], (2.0, 5.0), 2.0);
        for p in &mut self.particles[start..] {
            p.gravity = 0.2;
        }
        let start = self.particles.len();
        particle::burst(&mut self.particles, rng, self.pos, 5, [100, 100, 100], (1.0, 3.0), 5.0);
        for p in &mut self.particles[start..] {
            p.gravity = -0.1;
        }
    }

    pub fn heal(&mut self, amount: i32) {
        self.health = (self.health + amount.max(0)).min(self.max_health);
    }

    /// Next weapon in order; any beam stream stops
    pub fn switch_weapon(&mut self, effects: &mut EffectSchedule) {
        self.release_trigger(effects);
        self.weapon = self.weapon.next();
        debug!("Ship {} switched to {}", self.id.0, self.weapon.name());
    }

    /// Fire released: ends the beam stream and re-arms a locked beam
    pub fn release_trigger(&mut self, effects: &mut EffectSchedule) {
        if self.beam != BeamState::Idle {
            self.beam = BeamState::Idle;
            effects.cancel(self.id, EffectKind::BeamCutoff);
        }
    }

    pub fn apply_shield(&mut self) {
        self.shield = SHIELD_PICKUP;
    }

    pub fn apply_speed_boost(
        &mut self,
        now_ms: u64,
        duration_ms: u64,
        effects: &mut EffectSchedule,
    ) {
        self.speed_multiplier = SPEED_BOOST_MULTIPLIER;
        effects.schedule(self.id, EffectKind::SpeedBoost, now_ms + duration_ms);
    }

    /// Boost the equipped weapon; the reversion stays keyed to that weapon
    pub fn apply_weapon_boost(
        &mut self,
        now_ms: u64,
        duration_ms: u64,
        effects: &mut EffectSchedule,
    ) {
        let kind = self.weapon;
        self.armory.boost(kind);
        effects.schedule(self.id, EffectKind::WeaponBoost(kind), now_ms + duration_ms);
    }

    /// Undo an effect whose timer ran out
    pub fn expire(&mut self, kind: EffectKind) {
        match kind {
            EffectKind::Invulnerable => self.invulnerable = false,
            EffectKind::SpeedBoost => self.speed_multiplier = 1.0,
            EffectKind::WeaponBoost(weapon) => {
                self.armory.unboost(weapon);
            }
            EffectKind::BeamCutoff => {
                if self.beam == BeamState::Firing {
                    self.beam = BeamState::Locked;
                    debug!("Ship {} beam cut off", self.id.0);
                }
            }
        }
    }

    /// Back to full health at `pos` with a short invulnerability window
    pub fn respawn(&mut self, pos: Vec2, now_ms: u64, effects: &mut EffectSchedule) {
        self.health = self.max_health;
        self.pos = pos;
        self.invulnerable = true;
        effects.schedule(self.id, EffectKind::Invulnerable, now_ms + INVULNERABLE_MS);
    }
}

/// Ids of up to `count` distinct live enemies, nearest first
fn nearest_targets(enemies: &[Enemy], from: Vec2, count: usize) -> Vec<super::state::EnemyId> {
    let mut live: Vec<&Enemy> = enemies.iter().filter(|e| e.is_alive()).collect();
    live.sort_by(|a, b| {
        a.pos
            .distance_squared(from)
            .partial_cmp(&b.pos.distance_squared(from))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    live.into_iter().take(count).map(|e| e.id).collect()
}

pub fn clamp_to_screen(pos: Vec2) -> Vec2 {
    Vec2::new(
        pos.x.clamp(SHIP_HALF_EXTENT, SCREEN_WIDTH - SHIP_HALF_EXTENT),
        pos.y.clamp(SHIP_HALF_EXTENT, SCREEN_HEIGHT - SHIP_HALF_EXTENT),
    )
}
