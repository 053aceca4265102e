//! Cosmetic particles
//!
//! Particles never feed back into gameplay. Every emitter takes the sim RNG so a
//! replay with the same seed produces the same sparks.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// RGB color
pub type Rgb = [u8; 3];

/// Starting opacity of every particle
pub const PARTICLE_ALPHA: i32 = 255;

/// Per-entity cap for particles an enemy or ship carries around
pub const MAX_OWNED_PARTICLES: usize = 128;

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: Rgb,
    pub size: f32,
    /// Added to vertical velocity every tick (negative floats upward)
    pub gravity: f32,
    /// 0-255, decreases by `fade` every tick
    pub alpha: i32,
    pub fade: i32,
}

impl Particle {
    pub fn new(pos: Vec2, vel: Vec2, color: Rgb, size: f32, rng: &mut impl Rng) -> Self {
        Self {
            pos,
            vel,
            color,
            size,
            gravity: 0.0,
            alpha: PARTICLE_ALPHA,
            fade: rng.random_range(5..=10),
        }
    }

    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn update(&mut self) {
        self.vel.y += self.gravity;
        self.pos += self.vel;
        self.alpha -= self.fade;
    }

    pub fn is_alive(&self) -> bool {
        self.alpha > 0
    }
}

/// Advance every particle one tick, drop faded ones, and trim the oldest past `cap`
pub fn update_particles(particles: &mut Vec<Particle>, cap: usize) {
    for p in particles.iter_mut() {
        p.update();
    }
    particles.retain(Particle::is_alive);
    trim_oldest(particles, cap);
}

/// Drop the oldest particles beyond `cap`
pub fn trim_oldest(particles: &mut Vec<Particle>, cap: usize) {
    if particles.len() > cap {
        let excess = particles.len() - cap;
        particles.drain(..excess);
    }
}

/// Random direction scaled into `[min_speed, max_speed)`
fn random_velocity(rng: &mut impl Rng, min_speed: f32, max_speed: f32) -> Vec2 {
    let angle = rng.random_range(0.0..TAU);
    let speed = rng.random_range(min_speed..max_speed);
    Vec2::new(angle.cos(), angle.sin()) * speed
}

/// Radial burst of same-colored particles
pub fn burst(
    out: &mut Vec<Particle>,
    rng: &mut impl Rng,
    center: Vec2,
    count: usize,
    color: Rgb,
    speed: (f32, f32),
    size: f32,
) {
    for _ in 0..count {
        let vel = random_velocity(rng, speed.0, speed.1);
        out.push(Particle::new(center, vel, color, size, rng));
    }
}

/// Square scatter used for pickups and damage flecks (`±spread` on each axis)
pub fn scatter(
    out: &mut Vec<Particle>,
    rng: &mut impl Rng,
    center: Vec2,
    count: usize,
    color: Rgb,
    spread: f32,
    size: f32,
) {
    for _ in 0..count {
        let vel = Vec2::new(
            rng.random_range(-spread..spread),
            rng.random_range(-spread..spread),
        );
        out.push(Particle::new(center, vel, color, size, rng));
    }
}

/// Three-layer explosion: fire ring, sparks, and rising smoke.
///
/// `size` is the explosion tier (10 for bullet impacts, 20-60 for kills);
/// particle counts and speeds scale with it.
pub fn explosion(out: &mut Vec<Particle>, rng: &mut impl Rng, center: Vec2, size: f32) {
    let scale = size / 20.0;

    let ring_count = ((size * 1.5) as usize).max(1);
    let step = (360 / ring_count).max(1);
    for deg in (0..360).step_by(step) {
        let rad = (deg as f32).to_radians();
        let speed = rng.random_range(2.0..5.0) * scale;
        let color = [rng.random_range(200..=255), rng.random_range(50..=150), 0];
        let psize = rng.random_range(2..=4) as f32 * scale;
        let vel = Vec2::new(rad.cos(), rad.sin()) * speed;
        out.push(Particle::new(center, vel, color, psize, rng).with_gravity(0.1));
    }

    let sparks = (size * 0.8) as usize;
    for _ in 0..sparks {
        let vel = random_velocity(rng, 3.0 * scale, 8.0 * scale);
        let color = [255, rng.random_range(200..=255), 0];
        let psize = rng.random_range(1..=3) as f32 * scale;
        out.push(Particle::new(center, vel, color, psize, rng).with_gravity(0.2));
    }

    let smoke = (size * 0.6) as usize;
    for _ in 0..smoke {
        let vel = random_velocity(rng, scale, 3.0 * scale) - Vec2::new(0.0, 1.0);
        let gray = rng.random_range(60..=120);
        let psize = rng.random_range(3..=6) as f32 * scale;
        out.push(Particle::new(center, vel, [gray, gray, gray], psize, rng).with_gravity(0.05));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_particle_fades_out() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut particles = vec![Particle::new(Vec2::ZERO, Vec2::X, [255, 0, 0], 3.0, &mut rng)];
        // Slowest fade is 5/tick, so 255/5 = 51 ticks is the upper bound
        for _ in 0..52 {
            update_particles(&mut particles, 100);
        }
        assert!(particles.is_empty());
    }

    #[test]
    fn test_gravity_accumulates() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut p =
            Particle::new(Vec2::ZERO, Vec2::ZERO, [0, 0, 0], 2.0, &mut rng).with_gravity(0.5);
        p.update();
        p.update();
        assert!((p.vel.y - 1.0).abs() < 1e-6);
        assert!((p.pos.y - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_cap_drops_oldest() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut particles = Vec::new();
        for i in 0..10 {
            let pos = Vec2::new(i as f32, 0.0);
            particles.push(Particle::new(pos, Vec2::ZERO, [0, 0, 0], 1.0, &mut rng));
        }
        update_particles(&mut particles, 4);
        assert_eq!(particles.len(), 4);
        assert_eq!(particles[0].pos.x, 6.0);
    }

    #[test]
    fn test_explosion_scales_with_size() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut small = Vec::new();
        let mut big = Vec::new();
        explosion(&mut small, &mut rng, Vec2::ZERO, 10.0);
        explosion(&mut big, &mut rng, Vec2::ZERO, 60.0);
        assert!(big.len() > small.len());
        assert!(!small.is_empty());
    }
}
