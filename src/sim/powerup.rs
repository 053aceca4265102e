//! Power-up pickups dropped by destroyed enemies

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::particle::Rgb;
use crate::consts::*;

pub const POWER_UP_RADIUS: f32 = 10.0;
const FALL_SPEED: f32 = 2.0;
const SPIN_DEG_PER_TICK: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    Shield,
    Speed,
    Weapon,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] =
        [PowerUpKind::Shield, PowerUpKind::Speed, PowerUpKind::Weapon];

    pub fn duration_ms(self) -> u64 {
        match self {
            PowerUpKind::Shield => 10_000,
            PowerUpKind::Speed => 8_000,
            PowerUpKind::Weapon => 15_000,
        }
    }

    pub fn color(self) -> Rgb {
        match self {
            PowerUpKind::Shield => [0, 255, 255],
            PowerUpKind::Speed => [255, 255, 0],
            PowerUpKind::Weapon => [255, 0, 255],
        }
    }

    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    pub pos: Vec2,
    /// Sprite spin in degrees
    pub angle: f32,
    pub radius: f32,
}

impl PowerUp {
    pub fn new(kind: PowerUpKind, pos: Vec2) -> Self {
        Self {
            kind,
            pos,
            angle: 0.0,
            radius: POWER_UP_RADIUS,
        }
    }

    /// Fall with a lateral drift keyed to the frame clock
    pub fn update(&mut self, now_ms: u64) {
        self.angle = (self.angle + SPIN_DEG_PER_TICK) % 360.0;
        self.pos.y += FALL_SPEED;
        self.pos.x += (now_ms as f32 * 0.002).sin() * 2.0;
    }

    pub fn is_offscreen(&self) -> bool {
        self.pos.y - self.radius > SCREEN_HEIGHT
    }
}
