//! Boss phase table and attack patterns
//!
//! The boss walks down a fixed ladder of phases as its health drops. Each phase
//! picks one of its attack patterns at random whenever the fire delay elapses.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::particle::Rgb;
use super::projectile::{Projectile, ProjectileKind};
use crate::{fan_down, polar_deg};

/// Default enemy bullet radius
const BULLET_SIZE: f32 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackPattern {
    Umbrella,
    Spread,
    LaserBarrage,
    CrossFire,
    Spiral,
    DeathSpiral,
    BulletHell,
}

impl AttackPattern {
    pub fn name(self) -> &'static str {
        match self {
            AttackPattern::Umbrella => "umbrella",
            AttackPattern::Spread => "spread",
            AttackPattern::LaserBarrage => "laser_barrage",
            AttackPattern::CrossFire => "cross_fire",
            AttackPattern::Spiral => "spiral",
            AttackPattern::DeathSpiral => "death_spiral",
            AttackPattern::BulletHell => "bullet_hell",
        }
    }
}

/// One rung of the boss ladder
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BossPhase {
    pub name: &'static str,
    /// Active while `health / max_health >= threshold`
    pub threshold: f32,
    pub color: Rgb,
    pub patterns: &'static [AttackPattern],
    pub fire_delay_ms: u64,
    pub speed_multiplier: f32,
}

/// Phases ordered by descending threshold; the last one always matches
pub static BOSS_PHASES: [BossPhase; 5] = [
    BossPhase {
        name: "Suppression",
        threshold: 0.8,
        color: [255, 50, 50],
        patterns: &[AttackPattern::Umbrella, AttackPattern::Spread],
        fire_delay_ms: 2500,
        speed_multiplier: 1.0,
    },
    BossPhase {
        name: "Berserk",
        threshold: 0.6,
        color: [0, 255, 255],
        patterns: &[AttackPattern::LaserBarrage, AttackPattern::CrossFire],
        fire_delay_ms: 2000,
        speed_multiplier: 1.2,
    },
    BossPhase {
        name: "Overheat",
        threshold: 0.4,
        color: [255, 165, 0],
        patterns: &[AttackPattern::Spiral, AttackPattern::Spread],
        fire_delay_ms: 1600,
        speed_multiplier: 1.4,
    },
    BossPhase {
        name: "Energy Burst",
        threshold: 0.2,
        color: [255, 0, 255],
        patterns: &[AttackPattern::DeathSpiral, AttackPattern::CrossFire],
        fire_delay_ms: 1200,
        speed_multiplier: 1.6,
    },
    BossPhase {
        name: "Annihilation",
        threshold: 0.0,
        color: [255, 255, 255],
        patterns: &[AttackPattern::BulletHell, AttackPattern::Umbrella],
        fire_delay_ms: 800,
        speed_multiplier: 2.0,
    },
];

/// Index of the first phase whose threshold the health fraction reaches
pub fn select_phase(health_fraction: f32) -> usize {
    BOSS_PHASES
        .iter()
        .position(|p| health_fraction >= p.threshold)
        .unwrap_or(BOSS_PHASES.len() - 1)
}

/// Boss-only state carried by the enemy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BossState {
    pub phase: usize,
    /// Bumped on every phase change so renderers can rebuild the sprite
    pub visual_revision: u32,
}

impl BossState {
    pub fn new(health_fraction: f32) -> Self {
        Self {
            phase: select_phase(health_fraction),
            visual_revision: 0,
        }
    }

    pub fn current(&self) -> &'static BossPhase {
        &BOSS_PHASES[self.phase.min(BOSS_PHASES.len() - 1)]
    }
}

/// Geometry and damage inputs for one volley
#[derive(Debug, Clone, Copy)]
pub struct Volley {
    pub center: Vec2,
    /// Bottom edge of the hull, where forward shots leave
    pub muzzle: Vec2,
    pub width: f32,
    pub now_ms: u64,
    /// Nearest player ship, if any
    pub aim: Option<Vec2>,
    pub damage: f32,
    pub phase_color: Rgb,
    pub hull_color: Rgb,
}

impl Volley {
    /// Continuous rotation in degrees, one degree per `ms_per_deg` of play
    fn turn_deg(&self, ms_per_deg: f64) -> f32 {
        ((self.now_ms as f64 / ms_per_deg) % 360.0) as f32
    }

    fn bullet(&self, pos: Vec2, vel: Vec2, scale: f32, size: f32, color: Rgb) -> Projectile {
        Projectile::enemy(ProjectileKind::BossPattern, pos, vel, self.damage * scale, size, color)
    }
}

/// Emit the bullets of `pattern` into `out`
pub fn fire_pattern(
    pattern: AttackPattern,
    v: &Volley,
    out: &mut Vec<Projectile>,
    rng: &mut impl Rng,
) {
    match pattern {
        AttackPattern::Umbrella => {
            for i in 0..12 {
                let angle = 360.0 * i as f32 / 12.0;
                let vel = polar_deg(angle, 4.0);
                out.push(v.bullet(v.center, vel, 1.0, BULLET_SIZE, v.phase_color));
            }
        }
        AttackPattern::Spread => match v.aim {
            Some(target) => {
                let to = target - v.center;
                let base = to.y.atan2(to.x).to_degrees();
                for i in 0..5 {
                    let angle = base - 30.0 + 60.0 * i as f32 / 4.0;
                    let vel = polar_deg(angle, 5.0);
                    out.push(v.bullet(v.muzzle, vel, 0.8, BULLET_SIZE, v.phase_color));
                }
            }
            None => {
                for i in 0..7 {
                    let angle = -45.0 + 15.0 * i as f32;
                    let vel = fan_down(angle, 5.0);
                    out.push(v.bullet(v.muzzle, vel, 1.0, BULLET_SIZE, v.hull_color));
                }
            }
        },
        AttackPattern::LaserBarrage => {
            if rng.random_bool(0.5) {
                let left = v.center.x - v.width / 2.0 + 10.0;
                let right = v.center.x + v.width / 2.0 - 10.0;
                let mut x = left;
                while x < right {
                    let pos = Vec2::new(x, v.muzzle.y);
                    out.push(v.bullet(pos, Vec2::new(0.0, 6.0), 1.2, 4.0, v.phase_color));
                    x += 20.0;
                }
            } else {
                for _ in 0..5 {
                    let offset = rng.random_range(-30..=30) as f32;
                    out.push(v.bullet(v.muzzle, fan_down(offset, 6.0), 1.0, 3.0, v.hull_color));
                }
            }
        }
        AttackPattern::CrossFire => {
            if rng.random_bool(0.5) {
                for angle in [0.0, 90.0, 180.0, 270.0] {
                    let vel = polar_deg(angle, 4.0);
                    out.push(v.bullet(v.center, vel, 1.0, BULLET_SIZE, v.hull_color));
                }
            } else {
                for (dx, dy) in [(1.0, 1.0), (1.0, -1.0), (-1.0, 1.0), (-1.0, -1.0)] {
                    let dir = Vec2::new(dx, dy);
                    for offset in [0.0, 20.0] {
                        let pos = v.center + dir * offset;
                        out.push(v.bullet(pos, dir * 4.0, 1.0, BULLET_SIZE, v.phase_color));
                    }
                }
            }
        }
        AttackPattern::Spiral => {
            let base = v.turn_deg(100.0);
            for i in 0..3 {
                let angle = base + i as f32 * 120.0;
                out.push(v.bullet(v.center, polar_deg(angle, 5.0), 1.0, BULLET_SIZE, v.hull_color));
            }
        }
        AttackPattern::DeathSpiral => {
            let base = v.turn_deg(50.0);
            let per_arm = if rng.random_bool(0.5) { 6 } else { 8 };
            let step = 360.0 / per_arm as f32;
            for arm in 0..2 {
                for j in 0..per_arm {
                    let angle = base + arm as f32 * 180.0 + j as f32 * step;
                    let speed = 3.0 + (j % 2) as f32;
                    let vel = polar_deg(angle, speed);
                    out.push(v.bullet(v.center, vel, 1.2, BULLET_SIZE, v.phase_color));
                }
            }
        }
        AttackPattern::BulletHell => {
            if rng.random_bool(0.5) {
                let base = v.turn_deg(200.0);
                for i in 0..16 {
                    let angle = base + 360.0 * i as f32 / 16.0;
                    let ring = if i % 2 == 0 { 30.0 } else { 60.0 };
                    let pos = v.center + polar_deg(angle, ring);
                    out.push(v.bullet(pos, polar_deg(angle, 4.0), 1.0, BULLET_SIZE, v.phase_color));
                }
            } else {
                for _ in 0..12 {
                    let angle = rng.random_range(0.0..360.0);
                    let speed = rng.random_range(3.0..6.0);
                    let color = [
                        rng.random_range(200..=255),
                        rng.random_range(0..=100),
                        rng.random_range(0..=255),
                    ];
                    out.push(v.bullet(v.center, polar_deg(angle, speed), 1.0, BULLET_SIZE, color));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn volley(aim: Option<Vec2>) -> Volley {
        Volley {
            center: Vec2::new(512.0, 160.0),
            muzzle: Vec2::new(512.0, 220.0),
            width: 150.0,
            now_ms: 12_345,
            aim,
            damage: 35.0,
            phase_color: [255, 50, 50],
            hull_color: [128, 0, 0],
        }
    }

    #[test]
    fn test_phase_boundaries_are_inclusive_on_the_high_side() {
        assert_eq!(select_phase(1.0), 0);
        assert_eq!(select_phase(0.8), 0);
        assert_eq!(select_phase(0.79), 1);
        assert_eq!(select_phase(0.6), 1);
        assert_eq!(select_phase(0.4), 2);
        assert_eq!(select_phase(0.2), 3);
        assert_eq!(select_phase(0.19), 4);
        assert_eq!(select_phase(0.0), 4);
    }

    #[test]
    fn test_selection_is_monotonic() {
        let mut last = 0;
        for step in (0..=100).rev() {
            let phase = select_phase(step as f32 / 100.0);
            assert!(phase >= last);
            last = phase;
        }
    }

    #[test]
    fn test_umbrella_covers_full_circle() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut out = Vec::new();
        fire_pattern(AttackPattern::Umbrella, &volley(None), &mut out, &mut rng);
        assert_eq!(out.len(), 12);
        assert!(out.iter().all(|b| (b.vel.length() - 4.0 * 0.7).abs() < 1e-3));
        assert!(out.iter().all(|b| b.damage == 35));
    }

    #[test]
    fn test_spread_aims_at_target_with_reduced_damage() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut out = Vec::new();
        let aimed = volley(Some(Vec2::new(512.0, 700.0)));
        fire_pattern(AttackPattern::Spread, &aimed, &mut out, &mut rng);
        assert_eq!(out.len(), 5);
        assert!(out.iter().all(|b| b.damage == 28));
        // Middle bullet heads straight down at the ship
        assert!(out[2].vel.x.abs() < 1e-3);
        assert!(out[2].vel.y > 0.0);

        out.clear();
        fire_pattern(AttackPattern::Spread, &volley(None), &mut out, &mut rng);
        assert_eq!(out.len(), 7);
    }

    #[test]
    fn test_spiral_turns_smoothly_between_volleys() {
        let mut rng = Pcg32::seed_from_u64(4);
        let heading = |now_ms: u64, rng: &mut Pcg32| {
            let mut out = Vec::new();
            let v = Volley { now_ms, ..volley(None) };
            fire_pattern(AttackPattern::Spiral, &v, &mut out, rng);
            out[0].vel.y.atan2(out[0].vel.x).to_degrees()
        };
        let a = heading(12_345, &mut rng);
        let b = heading(12_395, &mut rng);
        assert!((a - 123.45).abs() < 1e-2);
        assert!((b - a - 0.5).abs() < 1e-2);
    }

    #[test]
    fn test_variant_patterns_have_documented_counts() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..20 {
            let mut out = Vec::new();
            fire_pattern(AttackPattern::CrossFire, &volley(None), &mut out, &mut rng);
            assert!(out.len() == 4 || out.len() == 8);

            out.clear();
            fire_pattern(AttackPattern::DeathSpiral, &volley(None), &mut out, &mut rng);
            assert!(out.len() == 12 || out.len() == 16);
            assert!(out.iter().all(|b| b.damage == 42));

            out.clear();
            fire_pattern(AttackPattern::BulletHell, &volley(None), &mut out, &mut rng);
            assert!(out.len() == 16 || out.len() == 12);

            out.clear();
            fire_pattern(AttackPattern::Spiral, &volley(None), &mut out, &mut rng);
            assert_eq!(out.len(), 3);
        }
    }
}
