//! Bullets for both sides, including homing missiles

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::enemy::Enemy;
use super::particle::Rgb;
use super::state::EnemyId;
use super::weapon::WeaponKind;
use crate::angle_delta;
use crate::consts::*;

/// Missile trail length kept for rendering
pub const MISSILE_TRAIL_LENGTH: usize = 8;
/// Fraction of the heading error corrected per tick
pub const MISSILE_TURN_SPEED: f32 = 0.15;
pub const MISSILE_CURVE_FACTOR: f32 = 0.8;
pub const MISSILE_ACCELERATION: f32 = 0.3;
pub const MISSILE_MAX_SPEED: f32 = 12.0;
/// Missiles only accelerate once this close to their target
pub const MISSILE_BOOST_RANGE: f32 = 100.0;
/// Enemy bullets travel at this fraction of their nominal pattern speed
pub const ENEMY_BULLET_SPEED_SCALE: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileKind {
    // Player weapons
    MachineGun,
    Laser,
    Beam,
    Cannon,
    Shotgun,
    Missile,
    // Enemy shots
    SmallLaser,
    Plasma,
    Spread,
    DualShot,
    BossPattern,
}

impl From<WeaponKind> for ProjectileKind {
    fn from(kind: WeaponKind) -> Self {
        match kind {
            WeaponKind::MachineGun => ProjectileKind::MachineGun,
            WeaponKind::Laser => ProjectileKind::Laser,
            WeaponKind::Cannon => ProjectileKind::Cannon,
            WeaponKind::Beam => ProjectileKind::Beam,
            WeaponKind::Shotgun => ProjectileKind::Shotgun,
            WeaponKind::Missile => ProjectileKind::Missile,
        }
    }
}

/// Steering state of a homing missile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Homing {
    pub target: Option<EnemyId>,
    pub speed: f32,
    /// Recent positions, oldest first
    pub trail: VecDeque<Vec2>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: i32,
    pub kind: ProjectileKind,
    pub radius: f32,
    pub color: Rgb,
    pub homing: Option<Homing>,
    /// Hit something this tick; removed after the collision passes
    #[serde(default)]
    pub spent: bool,
}

impl Projectile {
    /// Player bullet fired `angle_deg` off straight up
    pub fn player(
        kind: WeaponKind,
        pos: Vec2,
        angle_deg: f32,
        damage: i32,
        radius: f32,
        speed: f32,
        spread: f32,
    ) -> Self {
        let vx = angle_deg.to_radians().sin() * spread;
        Self {
            pos,
            vel: Vec2::new(vx, -speed),
            damage: damage.max(0),
            kind: kind.into(),
            radius,
            color: kind.flash_color(),
            homing: None,
            spent: false,
        }
    }

    /// Homing missile launched straight up with an optional pre-assigned target
    pub fn missile(
        pos: Vec2,
        damage: i32,
        radius: f32,
        speed: f32,
        target: Option<EnemyId>,
    ) -> Self {
        Self {
            pos,
            vel: Vec2::new(0.0, -speed),
            damage: damage.max(0),
            kind: ProjectileKind::Missile,
            radius,
            color: WeaponKind::Missile.flash_color(),
            homing: Some(Homing {
                target,
                speed,
                trail: VecDeque::with_capacity(MISSILE_TRAIL_LENGTH),
            }),
            spent: false,
        }
    }

    /// Enemy bullet; `nominal_vel` is the pattern velocity before the enemy speed scale
    pub fn enemy(
        kind: ProjectileKind,
        pos: Vec2,
        nominal_vel: Vec2,
        damage: f32,
        size: f32,
        color: Rgb,
    ) -> Self {
        Self {
            pos,
            vel: nominal_vel * ENEMY_BULLET_SPEED_SCALE,
            damage: (damage as i32).max(0),
            kind,
            radius: size,
            color,
            homing: None,
            spent: false,
        }
    }

    /// Lasers keep flying through everything they hit
    pub fn pierces(&self) -> bool {
        self.kind == ProjectileKind::Laser
    }

    /// Move one tick. Missiles steer toward their target first, re-acquiring the
    /// nearest live enemy when it is gone; with no enemies they fly straight.
    pub fn advance(&mut self, enemies: &[Enemy]) {
        if let Some(homing) = self.homing.as_mut() {
            let live = |id: EnemyId| enemies.iter().find(|e| e.id == id && e.is_alive());
            let pos = self.pos;
            let target = homing
                .target
                .and_then(live)
                .or_else(|| nearest_live(enemies, pos));
            homing.target = target.map(|e| e.id);

            if let Some(enemy) = target {
                let to_target = enemy.pos - self.pos;
                let distance = to_target.length();
                if distance > 0.0 {
                    let bearing = to_target.y.atan2(to_target.x);
                    let heading = self.vel.y.atan2(self.vel.x);
                    let heading = heading
                        + angle_delta(heading, bearing) * MISSILE_TURN_SPEED * MISSILE_CURVE_FACTOR;
                    if distance < MISSILE_BOOST_RANGE {
                        homing.speed = (homing.speed + MISSILE_ACCELERATION).min(MISSILE_MAX_SPEED);
                    }
                    self.vel = Vec2::new(heading.cos(), heading.sin()) * homing.speed;
                }
            }

            homing.trail.push_back(self.pos);
            if homing.trail.len() > MISSILE_TRAIL_LENGTH {
                homing.trail.pop_front();
            }
        }
        self.pos += self.vel;
    }

    /// Outside the playfield plus margin on any side
    pub fn is_offscreen(&self) -> bool {
        self.pos.x < -OFFSCREEN_MARGIN
            || self.pos.x > SCREEN_WIDTH + OFFSCREEN_MARGIN
            || self.pos.y < -OFFSCREEN_MARGIN
            || self.pos.y > SCREEN_HEIGHT + OFFSCREEN_MARGIN
    }

    /// Heading in radians for sprite rotation
    pub fn rotation(&self) -> f32 {
        self.vel.y.atan2(self.vel.x)
    }
}

fn nearest_live(enemies: &[Enemy], from: Vec2) -> Option<&Enemy> {
    enemies
        .iter()
        .filter(|e| e.is_alive())
        .min_by(|a, b| {
            a.pos
                .distance_squared(from)
                .partial_cmp(&b.pos.distance_squared(from))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::EnemyKind;

    #[test]
    fn test_missile_without_enemies_flies_straight() {
        let launch = Vec2::new(100.0, 500.0);
        let mut missile = Projectile::missile(launch, 30, 5.0, 8.0, Some(EnemyId(42)));
        for _ in 0..10 {
            missile.advance(&[]);
        }
        assert_eq!(missile.vel, Vec2::new(0.0, -8.0));
        assert!((missile.pos.y - 420.0).abs() < 1e-3);
        assert!(missile.homing.as_ref().is_some_and(|h| h.target.is_none()));
        assert!(missile.homing.as_ref().is_some_and(|h| h.trail.len() == MISSILE_TRAIL_LENGTH));
    }

    #[test]
    fn test_missile_reacquires_when_target_is_gone() {
        let enemy = Enemy::test_dummy(EnemyId(7), EnemyKind::Scout, Vec2::new(300.0, 100.0));
        let launch = Vec2::new(100.0, 500.0);
        let mut missile = Projectile::missile(launch, 30, 5.0, 8.0, Some(EnemyId(1)));
        missile.advance(std::slice::from_ref(&enemy));
        assert_eq!(missile.homing.as_ref().and_then(|h| h.target), Some(EnemyId(7)));
        // Turned toward +x
        assert!(missile.vel.x > 0.0);
        assert!((missile.vel.length() - 8.0).abs() < 1e-3);
    }

    #[test]
    fn test_missile_accelerates_near_target() {
        let enemy = Enemy::test_dummy(EnemyId(3), EnemyKind::Scout, Vec2::new(100.0, 450.0));
        let launch = Vec2::new(100.0, 500.0);
        let mut missile = Projectile::missile(launch, 30, 5.0, 8.0, Some(EnemyId(3)));
        missile.advance(std::slice::from_ref(&enemy));
        assert!((missile.vel.length() - 8.3).abs() < 1e-3);
    }

    #[test]
    fn test_enemy_bullet_speed_scaled() {
        let nominal = Vec2::new(0.0, 4.0);
        let kind = ProjectileKind::SmallLaser;
        let b = Projectile::enemy(kind, Vec2::ZERO, nominal, 5.0, 3.0, [255, 0, 0]);
        assert!((b.vel.y - 2.8).abs() < 1e-6);
        assert_eq!(b.damage, 5);
    }

    #[test]
    fn test_offscreen_margin() {
        let start = Vec2::new(10.0, -49.0);
        let mut b = Projectile::player(WeaponKind::Laser, start, 0.0, 15, 3.0, 15.0, 0.0);
        assert!(!b.is_offscreen());
        b.pos.y = -51.0;
        assert!(b.is_offscreen());
        assert!(b.pierces());
    }
}
