//! Player weapon catalog
//!
//! Base stats are immutable; a power-up only flips a per-weapon boost flag on
//! the [`Armory`], so expiring it restores the exact base values.

use serde::{Deserialize, Serialize};

use super::particle::Rgb;

/// Weapons in switch order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WeaponKind {
    #[default]
    MachineGun,
    Laser,
    Cannon,
    Beam,
    Shotgun,
    Missile,
}

/// Stats of one weapon (base or boosted)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponStats {
    pub damage: i32,
    /// Projectile speed in px/tick
    pub speed: f32,
    /// Minimum time between shots
    pub delay_ms: u64,
    /// Lateral velocity per unit of `sin(angle)` for fanned shots
    pub spread: f32,
    pub bullet_radius: f32,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 6] = [
        WeaponKind::MachineGun,
        WeaponKind::Laser,
        WeaponKind::Cannon,
        WeaponKind::Beam,
        WeaponKind::Shotgun,
        WeaponKind::Missile,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Next weapon in switch order, wrapping around
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn name(self) -> &'static str {
        match self {
            WeaponKind::MachineGun => "machine_gun",
            WeaponKind::Laser => "laser",
            WeaponKind::Cannon => "cannon",
            WeaponKind::Beam => "beam",
            WeaponKind::Shotgun => "shotgun",
            WeaponKind::Missile => "missile",
        }
    }

    pub fn base_stats(self) -> WeaponStats {
        let (damage, speed, delay_ms, spread, bullet_radius) = match self {
            WeaponKind::MachineGun => (8, 8.0, 150, 2.0, 3.0),
            WeaponKind::Laser => (15, 15.0, 200, 0.0, 3.0),
            WeaponKind::Cannon => (40, 6.0, 500, 0.0, 7.0),
            WeaponKind::Beam => (12, 25.0, 50, 1.5, 2.0),
            WeaponKind::Shotgun => (25, 7.0, 400, 3.0, 4.0),
            WeaponKind::Missile => (30, 8.0, 600, 0.0, 5.0),
        };
        WeaponStats {
            damage,
            speed,
            delay_ms,
            spread,
            bullet_radius,
        }
    }

    /// Stats while a weapon power-up is active
    pub fn boosted_stats(self) -> WeaponStats {
        let base = self.base_stats();
        match self {
            WeaponKind::MachineGun => WeaponStats {
                damage: base.damage * 2,
                delay_ms: base.delay_ms / 2,
                ..base
            },
            _ => WeaponStats {
                damage: (base.damage as f32 * 1.5) as i32,
                ..base
            },
        }
    }

    /// Muzzle flash color
    pub fn flash_color(self) -> Rgb {
        match self {
            WeaponKind::MachineGun => [255, 255, 0],
            WeaponKind::Laser => [0, 255, 255],
            WeaponKind::Cannon => [255, 100, 0],
            WeaponKind::Beam => [255, 0, 255],
            WeaponKind::Shotgun => [255, 50, 50],
            WeaponKind::Missile => [255, 0, 0],
        }
    }
}

/// Per-ship weapon bookkeeping: cooldown stamps and boost flags for every weapon
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Armory {
    last_shot_ms: [Option<u64>; 6],
    boosted: [bool; 6],
}

impl Armory {
    /// Effective stats for `kind`
    pub fn stats(&self, kind: WeaponKind) -> WeaponStats {
        if self.boosted[kind.index()] {
            kind.boosted_stats()
        } else {
            kind.base_stats()
        }
    }

    pub fn is_boosted(&self, kind: WeaponKind) -> bool {
        self.boosted[kind.index()]
    }

    /// Returns false if the weapon was already boosted
    pub fn boost(&mut self, kind: WeaponKind) -> bool {
        !std::mem::replace(&mut self.boosted[kind.index()], true)
    }

    /// Returns false if the weapon was not boosted
    pub fn unboost(&mut self, kind: WeaponKind) -> bool {
        std::mem::replace(&mut self.boosted[kind.index()], false)
    }

    /// Cooldown gate: a weapon that has never fired is always ready
    pub fn ready(&self, kind: WeaponKind, now_ms: u64) -> bool {
        match self.last_shot_ms[kind.index()] {
            Some(last) => now_ms.saturating_sub(last) >= self.stats(kind).delay_ms,
            None => true,
        }
    }

    pub fn mark_fired(&mut self, kind: WeaponKind, now_ms: u64) {
        self.last_shot_ms[kind.index()] = Some(now_ms);
    }
}
