//! Timed one-shot effects
//!
//! Every expiring effect (invulnerability, power-ups, beam cutoff) is a single
//! entry in one schedule, polled once per tick against the frame clock.

use serde::{Deserialize, Serialize};

use super::state::ShipId;
use super::weapon::WeaponKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    Invulnerable,
    SpeedBoost,
    /// Keyed by the boosted weapon, not the equipped one
    WeaponBoost(WeaponKind),
    BeamCutoff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledEffect {
    pub ship: ShipId,
    pub kind: EffectKind,
    pub expires_at_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EffectSchedule {
    entries: Vec<ScheduledEffect>,
}

impl EffectSchedule {
    /// Schedule an expiry, replacing any pending entry for the same ship and kind
    pub fn schedule(&mut self, ship: ShipId, kind: EffectKind, expires_at_ms: u64) {
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.ship == ship && e.kind == kind)
        {
            entry.expires_at_ms = expires_at_ms;
        } else {
            self.entries.push(ScheduledEffect {
                ship,
                kind,
                expires_at_ms,
            });
        }
    }

    pub fn cancel(&mut self, ship: ShipId, kind: EffectKind) {
        self.entries.retain(|e| !(e.ship == ship && e.kind == kind));
    }

    /// Drop everything pending for a ship that no longer exists
    pub fn forget_ship(&mut self, ship: ShipId) {
        self.entries.retain(|e| e.ship != ship);
    }

    pub fn is_pending(&self, ship: ShipId, kind: EffectKind) -> bool {
        self.entries.iter().any(|e| e.ship == ship && e.kind == kind)
    }

    /// Remove and return every entry due at `now_ms`, in scheduling order
    pub fn take_expired(&mut self, now_ms: u64) -> Vec<ScheduledEffect> {
        let (due, pending): (Vec<_>, Vec<_>) = self
            .entries
            .drain(..)
            .partition(|e| e.expires_at_ms <= now_ms);
        self.entries = pending;
        due
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reschedule_refreshes_instead_of_duplicating() {
        let mut schedule = EffectSchedule::default();
        schedule.schedule(ShipId(1), EffectKind::SpeedBoost, 1000);
        schedule.schedule(ShipId(1), EffectKind::SpeedBoost, 5000);
        assert_eq!(schedule.len(), 1);
        assert!(schedule.take_expired(1000).is_empty());
        assert_eq!(schedule.take_expired(5000).len(), 1);
        assert!(schedule.is_empty());
    }

    #[test]
    fn test_take_expired_keeps_future_entries() {
        let mut schedule = EffectSchedule::default();
        schedule.schedule(ShipId(1), EffectKind::Invulnerable, 100);
        schedule.schedule(ShipId(2), EffectKind::WeaponBoost(WeaponKind::Laser), 200);
        schedule.schedule(ShipId(1), EffectKind::BeamCutoff, 300);

        let due = schedule.take_expired(250);
        assert_eq!(due.len(), 2);
        assert_eq!(due[0].kind, EffectKind::Invulnerable);
        assert!(schedule.is_pending(ShipId(1), EffectKind::BeamCutoff));
    }

    #[test]
    fn test_weapon_boosts_are_keyed_per_weapon() {
        let mut schedule = EffectSchedule::default();
        schedule.schedule(ShipId(1), EffectKind::WeaponBoost(WeaponKind::Laser), 100);
        schedule.schedule(ShipId(1), EffectKind::WeaponBoost(WeaponKind::Cannon), 100);
        assert_eq!(schedule.len(), 2);
        schedule.forget_ship(ShipId(1));
        assert!(schedule.is_empty());
    }
}
