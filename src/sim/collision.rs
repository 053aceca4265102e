//! Collision passes and their side effects
//!
//! Passes run in a fixed order every tick: player bullets against enemies,
//! ships against enemies, enemy bullets against ships, ships against power-ups.
//! Later passes only see enemies that survived the earlier ones.

use glam::Vec2;
use log::{debug, info};
use rand::Rng;

use super::enemy::{Enemy, EnemyKind};
use super::particle;
use super::powerup::{PowerUp, PowerUpKind};
use super::state::{EnemyId, GameState, ShipId};
use crate::consts::*;

/// Explosion tier for a bullet impact
const IMPACT_EXPLOSION: f32 = 10.0;
const SHAKE_MS: u64 = 250;

/// Circle-circle overlap test
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let reach = ra + rb;
    a.distance_squared(b) < reach * reach
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillCause {
    /// Destroyed by a player bullet: scores, heals, may drop a power-up
    Shot,
    /// Destroyed by ramming a ship: no score and no heal
    Rammed,
}

/// Run all collision passes, purge dead enemies, and report the first ship
/// whose health reached zero.
pub fn resolve_collisions(state: &mut GameState, now_ms: u64) -> Option<ShipId> {
    bullets_vs_enemies(state, now_ms);
    ships_vs_enemies(state, now_ms);
    enemy_bullets_vs_ships(state, now_ms);
    ships_vs_power_ups(state, now_ms);
    purge_dead_enemies(state);
    state.ships.iter().find(|s| s.is_dead()).map(|s| s.id)
}

fn bullets_vs_enemies(state: &mut GameState, now_ms: u64) {
    let mut kills = Vec::new();
    let mut impacts = Vec::new();

    for ship in state.ships.iter_mut() {
        for bullet in ship.bullets.iter_mut() {
            for enemy in state.enemies.iter_mut() {
                if bullet.spent {
                    break;
                }
                if !enemy.is_alive()
                    || !circles_overlap(bullet.pos, bullet.radius, enemy.pos, enemy.radius)
                {
                    continue;
                }
                if enemy.take_damage(bullet.damage, &mut state.rng) {
                    kills.push(enemy.id);
                }
                if !bullet.pierces() {
                    bullet.spent = true;
                    impacts.push(bullet.pos);
                }
            }
        }
        ship.bullets.retain(|b| !b.spent);
    }

    for pos in impacts {
        state.explode(pos, IMPACT_EXPLOSION);
    }
    for id in kills {
        on_enemy_destroyed(state, id, KillCause::Shot, now_ms);
    }
}

fn ships_vs_enemies(state: &mut GameState, now_ms: u64) {
    let mut kills = Vec::new();
    let mut rammed = false;

    for ship in state.ships.iter_mut() {
        for enemy in state.enemies.iter_mut() {
            let touching = circles_overlap(ship.pos, ship.radius, enemy.pos, enemy.radius);
            if !enemy.is_alive() || !touching {
                continue;
            }
            rammed = true;
            ship.take_damage(enemy.collision_damage, now_ms, &mut state.effects, &mut state.rng);
            if enemy.take_damage(SHIP_RAM_DAMAGE, &mut state.rng) {
                kills.push(enemy.id);
            }
        }
    }

    if rammed {
        state.start_shake(10.0, SHAKE_MS, now_ms);
    }
    for id in kills {
        on_enemy_destroyed(state, id, KillCause::Rammed, now_ms);
    }
}

fn enemy_bullets_vs_ships(state: &mut GameState, now_ms: u64) {
    let mut impacts = Vec::new();

    for ship in state.ships.iter_mut() {
        let bullets = state
            .enemies
            .iter_mut()
            .flat_map(|e| e.bullets.iter_mut())
            .chain(state.stray_bullets.iter_mut());
        for bullet in bullets {
            if bullet.spent || !circles_overlap(bullet.pos, bullet.radius, ship.pos, ship.radius) {
                continue;
            }
            ship.take_damage(bullet.damage, now_ms, &mut state.effects, &mut state.rng);
            bullet.spent = true;
            impacts.push(bullet.pos);
        }
    }

    for enemy in state.enemies.iter_mut() {
        enemy.bullets.retain(|b| !b.spent);
    }
    state.stray_bullets.retain(|b| !b.spent);
    for pos in impacts {
        state.explode(pos, IMPACT_EXPLOSION);
    }
}

fn ships_vs_power_ups(state: &mut GameState, now_ms: u64) {
    let mut i = 0;
    while i < state.power_ups.len() {
        let p = &state.power_ups[i];
        let hit = state
            .ships
            .iter()
            .position(|s| circles_overlap(s.pos, s.radius, p.pos, p.radius));
        match hit {
            Some(ship_index) => {
                let p = state.power_ups.remove(i);
                apply_power_up(state, ship_index, p.kind, now_ms);
                if state.config.max_particles > 0 {
                    let color = p.kind.color();
                    let pool = &mut state.particles;
                    particle::scatter(pool, &mut state.rng, p.pos, 10, color, 2.0, 3.0);
                }
            }
            None => i += 1,
        }
    }
}

/// Apply a collected power-up to the ship at `ship_index`
pub fn apply_power_up(state: &mut GameState, ship_index: usize, kind: PowerUpKind, now_ms: u64) {
    let Some(ship) = state.ships.get_mut(ship_index) else {
        return;
    };
    match kind {
        PowerUpKind::Shield => ship.apply_shield(),
        PowerUpKind::Speed => {
            ship.apply_speed_boost(now_ms, kind.duration_ms(), &mut state.effects);
        }
        PowerUpKind::Weapon => {
            ship.apply_weapon_boost(now_ms, kind.duration_ms(), &mut state.effects);
        }
    }
    info!("{kind:?} power-up activated on ship {}", ship.id.0);
}

/// Scoring, healing, drops, and respawns for an enemy that just died
fn on_enemy_destroyed(state: &mut GameState, id: EnemyId, cause: KillCause, now_ms: u64) {
    let Some(enemy) = state.enemies.iter().find(|e| e.id == id) else {
        return;
    };
    let (kind, pos, points, heal) = (enemy.kind, enemy.pos, enemy.points, enemy.heal_amount);

    if cause == KillCause::Shot {
        let chance = state.config.power_up_chance.clamp(0.0, 1.0);
        if state.rng.random_bool(chance) {
            let drop = PowerUpKind::random(&mut state.rng);
            state.power_ups.push(PowerUp::new(drop, pos));
            debug!("{drop:?} power-up dropped");
        }

        let intensity = if kind == EnemyKind::Boss { 10.0 } else { 5.0 };
        state.start_shake(intensity, SHAKE_MS, now_ms);

        if kind == EnemyKind::Redcross {
            for ship in state.ships.iter_mut() {
                ship.heal(heal);
            }
            state.last_health_check = state.lead_health_percent();
            info!("Redcross destroyed: formation healed by {heal}");
        } else {
            let points = points.max(0) as u64;
            state.score += points;
            state.round_score += points;
        }
    }

    if kind == EnemyKind::Boss {
        state.round_transition = true;
        state.boss = None;
        info!("Boss destroyed! Round {} complete", state.round);
    }

    state.explode(pos, kind.explosion_size());
    if !matches!(kind, EnemyKind::Boss | EnemyKind::Redcross) {
        state.spawn_regular(now_ms);
    }
    debug!("{} {} destroyed ({cause:?})", kind.name(), id.0);
}

/// Drop dead enemies; their bullets keep flying and their particles keep fading
fn purge_dead_enemies(state: &mut GameState) {
    let (dead, alive): (Vec<Enemy>, Vec<Enemy>) = std::mem::take(&mut state.enemies)
        .into_iter()
        .partition(|e| !e.is_alive());
    state.enemies = alive;
    for mut enemy in dead {
        state.stray_bullets.append(&mut enemy.bullets);
        if state.config.max_particles > 0 {
            state.particles.append(&mut enemy.particles);
        }
    }
}
