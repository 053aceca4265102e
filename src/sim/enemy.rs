//! Enemy kinds, the design table, movement and regular shots
//!
//! Kinds form a closed set. Per-kind numbers come from [`EnemyKind::design`];
//! per-kind behavior is a `match` on the kind or its movement pattern.

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;
use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::boss::{self, BOSS_PHASES, BossState, Volley};
use super::particle::{self, MAX_OWNED_PARTICLES, Particle, Rgb};
use super::projectile::{Projectile, ProjectileKind};
use super::state::EnemyId;
use crate::consts::*;
use crate::fan_down;

/// Depth the boss descends to before it starts strafing
pub const BOSS_CRUISE_Y: f32 = 100.0;
/// Regular fire delay never scales below this
pub const MIN_FIRE_DELAY_MS: u64 = 1500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Scout,
    Fighter,
    Striker,
    Bomber,
    Elite,
    Redcross,
    Boss,
}

/// Regular (non-boss) shot types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShotKind {
    SmallLaser,
    DualShot,
    Plasma,
    Spread,
}

/// Static numbers for one enemy kind at round 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyDesign {
    pub size: Vec2,
    pub health: i32,
    pub speed: f32,
    pub points: i32,
    /// `None` for kinds that never fire on a fixed delay
    pub fire_delay_ms: Option<u64>,
    pub shot: Option<ShotKind>,
    pub bullet_damage: i32,
    pub collision_damage: i32,
    pub heal_amount: i32,
    pub color: Rgb,
}

impl EnemyKind {
    /// Regular spawn table: kind and relative weight
    pub const SPAWN_WEIGHTS: [(EnemyKind, f32); 5] = [
        (EnemyKind::Scout, 0.30),
        (EnemyKind::Fighter, 0.20),
        (EnemyKind::Striker, 0.20),
        (EnemyKind::Elite, 0.15),
        (EnemyKind::Bomber, 0.15),
    ];

    pub fn design(self) -> EnemyDesign {
        use EnemyKind::*;
        let (w, h, health, speed, points) = match self {
            Scout => (40.0, 40.0, 30, 3.0, 100),
            Striker => (45.0, 45.0, 45, 2.5, 150),
            Fighter => (50.0, 50.0, 50, 2.0, 150),
            Bomber => (60.0, 60.0, 80, 1.0, 200),
            Elite => (55.0, 55.0, 100, 2.5, 300),
            Redcross => (45.0, 45.0, 40, 2.0, 0),
            Boss => (150.0, 120.0, 2000, 1.0, 1000),
        };
        // Bosses fire through their phase table
        let (delay, shot) = match self {
            Scout => (Some(4000), Some(ShotKind::SmallLaser)),
            Striker => (Some(3000), Some(ShotKind::Plasma)),
            Fighter => (Some(3500), Some(ShotKind::DualShot)),
            Bomber => (Some(5000), Some(ShotKind::Plasma)),
            Elite => (Some(3000), Some(ShotKind::Spread)),
            Redcross | Boss => (None, None),
        };
        // bullet, collision, heal
        let (bullet, collide, heal) = match self {
            Scout => (5, 10, 0),
            Striker => (10, 15, 0),
            Fighter => (8, 20, 0),
            Bomber => (15, 30, 0),
            Elite => (10, 25, 0),
            Redcross => (0, 5, 25),
            Boss => (35, 80, 0),
        };
        let color = match self {
            Scout => [255, 0, 0],
            Striker => [50, 205, 50],
            Fighter => [148, 0, 211],
            Bomber => [0, 100, 0],
            Elite => [25, 25, 112],
            Redcross => [255, 255, 255],
            Boss => [128, 0, 0],
        };
        EnemyDesign {
            size: Vec2::new(w, h),
            health,
            speed,
            points,
            fire_delay_ms: delay,
            shot,
            bullet_damage: bullet,
            collision_damage: collide,
            heal_amount: heal,
            color,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EnemyKind::Scout => "scout",
            EnemyKind::Fighter => "fighter",
            EnemyKind::Striker => "striker",
            EnemyKind::Bomber => "bomber",
            EnemyKind::Elite => "elite",
            EnemyKind::Redcross => "redcross",
            EnemyKind::Boss => "boss",
        }
    }

    /// Explosion tier used when this kind dies
    pub fn explosion_size(self) -> f32 {
        match self {
            EnemyKind::Boss => 60.0,
            EnemyKind::Elite => 40.0,
            EnemyKind::Bomber => 30.0,
            _ => 20.0,
        }
    }

    fn engine_color(self) -> Rgb {
        match self {
            EnemyKind::Scout => [255, 100, 100],
            EnemyKind::Fighter => [200, 100, 255],
            EnemyKind::Bomber => [100, 255, 100],
            EnemyKind::Elite => [100, 100, 255],
            EnemyKind::Striker => [50, 255, 150],
            EnemyKind::Boss => [255, 50, 50],
            EnemyKind::Redcross => [255, 255, 255],
        }
    }

    /// Weighted pick from [`Self::SPAWN_WEIGHTS`]
    pub fn random_regular(rng: &mut impl Rng) -> Self {
        let total: f32 = Self::SPAWN_WEIGHTS.iter().map(|(_, w)| w).sum();
        let mut roll = rng.random_range(0.0..total);
        for (kind, weight) in Self::SPAWN_WEIGHTS {
            if roll < weight {
                return kind;
            }
            roll -= weight;
        }
        EnemyKind::Scout
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementPattern {
    Straight,
    Zigzag,
    Sine,
    BossPattern,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EnemyId,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub size: Vec2,
    pub radius: f32,
    pub health: i32,
    pub max_health: i32,
    pub points: i32,
    pub speed: f32,
    pub collision_damage: i32,
    pub bullet_damage: i32,
    pub heal_amount: i32,
    pub movement: MovementPattern,
    /// Direction of the last movement step, radians (0 = +x)
    pub heading: f32,
    /// Phase offset for zigzag/sine strafing
    pub pattern_offset: f32,
    pub fire_delay_ms: Option<u64>,
    pub spawned_at_ms: u64,
    pub last_shot_ms: u64,
    pub boss: Option<BossState>,
    pub bullets: Vec<Projectile>,
    pub particles: Vec<Particle>,
}

impl Enemy {
    /// Build an enemy for `round` at a random position above the screen
    pub fn spawn(
        id: EnemyId,
        kind: EnemyKind,
        round: u32,
        now_ms: u64,
        rng: &mut impl Rng,
    ) -> Self {
        let design = kind.design();
        let exp = round.saturating_sub(1) as i32;

        let (health, points, speed) = if kind == EnemyKind::Redcross {
            (design.health, design.points, design.speed)
        } else {
            let mut health = design.health as f32 * 1.2f32.powi(exp);
            if kind == EnemyKind::Boss {
                health *= 1.5f32.powi(exp);
            }
            (
                (health as i32).max(1),
                (design.points as f32 * 1.2f32.powi(exp)) as i32,
                design.speed * 1.1f32.powi(exp),
            )
        };

        let fire_delay_ms = design
            .fire_delay_ms
            .map(|d| ((d as f32 * 0.9f32.powi(exp)) as u64).max(MIN_FIRE_DELAY_MS));

        let half_w = design.size.x / 2.0;
        let (pos, movement, boss) = if kind == EnemyKind::Boss {
            (
                Vec2::new(SCREEN_WIDTH / 2.0, -100.0),
                MovementPattern::BossPattern,
                Some(BossState::new(1.0)),
            )
        } else {
            let x = rng.random_range(half_w..SCREEN_WIDTH - half_w);
            let y = rng.random_range(-100.0..-40.0);
            let movement = match rng.random_range(0..3) {
                0 => MovementPattern::Straight,
                1 => MovementPattern::Zigzag,
                _ => MovementPattern::Sine,
            };
            (Vec2::new(x, y), movement, None)
        };

        Self {
            id,
            kind,
            pos,
            size: design.size,
            radius: design.size.x.min(design.size.y) / 2.0,
            health,
            max_health: health,
            points,
            speed,
            collision_damage: design.collision_damage,
            bullet_damage: design.bullet_damage,
            heal_amount: design.heal_amount,
            movement,
            heading: FRAC_PI_2,
            pattern_offset: rng.random_range(0..=360) as f32,
            fire_delay_ms,
            spawned_at_ms: now_ms,
            last_shot_ms: now_ms,
            boss,
            bullets: Vec::new(),
            particles: Vec::new(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn is_boss(&self) -> bool {
        self.kind == EnemyKind::Boss
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0 {
            return 0.0;
        }
        self.health as f32 / self.max_health as f32
    }

    /// Tint for the renderer: boss phase color or the hull color
    pub fn tint(&self) -> Rgb {
        match self.boss {
            Some(state) => state.current().color,
            None => self.kind.design().color,
        }
    }

    fn speed_multiplier(&self) -> f32 {
        self.boss.map_or(1.0, |b| b.current().speed_multiplier)
    }

    /// Move, fire when due, and advance owned bullets and particles.
    /// `aim` is the nearest player ship, used by aimed boss patterns.
    /// `particle_cap` bounds the exhaust trail; 0 turns it off.
    pub fn update(
        &mut self,
        now_ms: u64,
        aim: Option<Vec2>,
        particle_cap: usize,
        rng: &mut impl Rng,
    ) {
        let t = now_ms as f32;
        let start = self.pos;
        match self.movement {
            MovementPattern::Straight => self.pos.y += self.speed,
            MovementPattern::Zigzag => {
                self.pos.x += (t * 0.003 + self.pattern_offset).sin() * 3.0;
                self.pos.y += self.speed;
            }
            MovementPattern::Sine => {
                self.pos.x += (t * 0.002 + self.pattern_offset).cos() * 2.0;
                self.pos.y += self.speed;
            }
            MovementPattern::BossPattern => {
                let mult = self.speed_multiplier();
                if self.pos.y < BOSS_CRUISE_Y {
                    self.pos.y += self.speed * mult;
                } else {
                    self.pos.x += (t * 0.001).cos() * 2.0 * mult;
                }
            }
        }
        let half_w = self.size.x / 2.0;
        self.pos.x = self.pos.x.clamp(half_w, SCREEN_WIDTH - half_w);
        let step = self.pos - start;
        if step.length_squared() > f32::EPSILON {
            self.heading = step.y.atan2(step.x);
        }

        if !self.is_boss() && self.pos.y - self.size.y / 2.0 > SCREEN_HEIGHT + OFFSCREEN_MARGIN {
            self.pos.x = rng.random_range(half_w..SCREEN_WIDTH - half_w);
            self.pos.y = rng.random_range(-100.0..-40.0);
        }

        if self.is_boss() {
            self.boss_fire(now_ms, aim, rng);
        } else if let Some(delay) = self.fire_delay_ms {
            let grace_over = now_ms.saturating_sub(self.spawned_at_ms) >= ENEMY_FIRE_GRACE_MS;
            if grace_over && now_ms.saturating_sub(self.last_shot_ms) >= delay {
                self.shoot(rng);
                self.last_shot_ms = now_ms;
            }
        }

        for bullet in &mut self.bullets {
            bullet.advance(&[]);
        }
        self.bullets.retain(|b| !b.is_offscreen());

        if particle_cap > 0 && rng.random_bool(0.2) {
            let vel = Vec2::new(rng.random_range(-1.0..1.0), rng.random_range(-3.0..-1.0));
            let exhaust = self.pos - Vec2::new(0.0, self.size.y / 2.0 - 5.0);
            self.particles
                .push(Particle::new(exhaust, vel, self.kind.engine_color(), 3.0, rng));
        }
        particle::update_particles(&mut self.particles, particle_cap.min(MAX_OWNED_PARTICLES));
    }

    fn muzzle(&self) -> Vec2 {
        self.pos + Vec2::new(0.0, self.size.y / 2.0)
    }

    /// Fire this kind's regular shot
    pub fn shoot(&mut self, rng: &mut impl Rng) {
        let Some(shot) = self.kind.design().shot else {
            return;
        };
        let muzzle = self.muzzle();
        let damage = self.bullet_damage as f32;

        for _ in 0..3 {
            self.particles
                .push(Particle::new(muzzle, Vec2::new(0.0, 1.0), [255, 200, 0], 3.0, rng));
        }

        match shot {
            ShotKind::SmallLaser => {
                self.bullets.push(Projectile::enemy(
                    ProjectileKind::SmallLaser,
                    muzzle,
                    Vec2::new(0.0, 4.0),
                    damage,
                    3.0,
                    [255, 0, 0],
                ));
            }
            ShotKind::DualShot => {
                for side in [-1.0, 1.0] {
                    self.bullets.push(Projectile::enemy(
                        ProjectileKind::DualShot,
                        muzzle + Vec2::new(side * 10.0, 0.0),
                        Vec2::new(side * 0.5, 4.0),
                        damage,
                        4.0,
                        [148, 0, 211],
                    ));
                }
            }
            ShotKind::Plasma => {
                self.bullets.push(Projectile::enemy(
                    ProjectileKind::Plasma,
                    muzzle,
                    Vec2::new(0.0, 3.0),
                    damage,
                    8.0,
                    [0, 255, 0],
                ));
            }
            ShotKind::Spread => {
                for angle in [-30.0, 0.0, 30.0] {
                    self.bullets.push(Projectile::enemy(
                        ProjectileKind::Spread,
                        muzzle,
                        fan_down(angle, 3.0),
                        damage,
                        5.0,
                        [0, 0, 255],
                    ));
                }
            }
        }
        debug!("{} {} fired", self.kind.name(), self.id.0);
    }

    fn boss_fire(&mut self, now_ms: u64, aim: Option<Vec2>, rng: &mut impl Rng) {
        let Some(state) = self.boss else {
            return;
        };
        let phase = state.current();
        if now_ms.saturating_sub(self.last_shot_ms) < phase.fire_delay_ms {
            return;
        }
        let pattern = phase.patterns[rng.random_range(0..phase.patterns.len())];
        let volley = Volley {
            center: self.pos,
            muzzle: self.muzzle(),
            width: self.size.x,
            now_ms,
            aim,
            damage: self.bullet_damage as f32,
            phase_color: phase.color,
            hull_color: self.kind.design().color,
        };
        boss::fire_pattern(pattern, &volley, &mut self.bullets, rng);
        self.last_shot_ms = now_ms;
        debug!("Boss attack: {}", pattern.name());
    }

    /// Apply damage, re-evaluate the boss phase, and report whether it died
    pub fn take_damage(&mut self, amount: i32, rng: &mut impl Rng) -> bool {
        self.health = (self.health - amount.max(0)).max(0);

        let (color, count) = if self.is_boss() {
            self.update_phase(rng);
            (self.tint(), 10)
        } else {
            ([255, 100, 100], 5)
        };
        for _ in 0..count {
            let size = rng.random_range(2..=4) as f32;
            particle::scatter(&mut self.particles, rng, self.pos, 1, color, 3.0, size);
        }

        !self.is_alive()
    }

    fn update_phase(&mut self, rng: &mut impl Rng) {
        let fraction = self.health_fraction();
        let Some(state) = self.boss.as_mut() else {
            return;
        };
        let next = boss::select_phase(fraction);
        if next == state.phase {
            return;
        }
        let old = BOSS_PHASES[state.phase].color;
        state.phase = next;
        state.visual_revision += 1;
        let phase = state.current();
        info!(
            "Boss entered phase {} at {:.0}% ({}x speed, {}ms delay)",
            phase.name,
            fraction * 100.0,
            phase.speed_multiplier,
            phase.fire_delay_ms
        );

        for _ in 0..30 {
            let color = if rng.random_bool(0.5) { old } else { phase.color };
            let size = rng.random_range(3..=6) as f32;
            particle::burst(&mut self.particles, rng, self.pos, 1, color, (3.0, 7.0), size);
        }
    }

    #[cfg(test)]
    pub(crate) fn test_dummy(id: EnemyId, kind: EnemyKind, pos: Vec2) -> Self {
        use rand::SeedableRng;
        let mut rng = rand_pcg::Pcg32::seed_from_u64(0);
        let mut enemy = Self::spawn(id, kind, 1, 0, &mut rng);
        enemy.pos = pos;
        enemy.movement = MovementPattern::Straight;
        enemy
    }
}
