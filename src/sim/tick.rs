//! Fixed timestep simulation tick
//!
//! Core game loop that advances the simulation deterministically. One clock
//! value (`now_ms`) is sampled by the caller per frame; every timer reads it.

use glam::Vec2;
use log::info;

use super::collision::resolve_collisions;
use super::enemy::EnemyKind;
use super::particle::{self, MAX_OWNED_PARTICLES};
use super::player::{MoveInput, wing_offset};
use super::state::{AudioEvent, GamePhase, GameState, MusicTrack, ShipId, boss_threshold};
use crate::consts::*;

/// Explosion tier for a destroyed player ship
const SHIP_EXPLOSION: f32 = 40.0;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Directional keys held this tick
    pub movement: MoveInput,
    /// Fire held (beam streams and auto-fire while held)
    pub fire: bool,
    /// Cycle to the next weapon
    pub switch_weapon: bool,
    /// Requested formation size
    pub formation: Option<usize>,
    /// Idle/demo mode - autopilot plays the game
    pub idle_mode: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, now_ms: u64) {
    if state.phase == GamePhase::GameOver {
        return;
    }
    state.time_ticks += 1;

    // Round banner freezes gameplay
    if let Some(until) = state.announcement_until_ms {
        if now_ms < until {
            state.sync_formation();
            return;
        }
        state.announcement_until_ms = None;
    }

    if state.round_transition {
        start_new_round(state, now_ms);
        return;
    }

    let mut input = input.clone();
    if input.idle_mode {
        autopilot(state, &mut input);
    }
    let input = &input;

    if let Some(size) = input.formation {
        if size.clamp(1, 3) != state.formation {
            state.set_formation(size);
        }
    }
    if input.switch_weapon {
        for ship in state.ships.iter_mut() {
            ship.switch_weapon(&mut state.effects);
        }
    }

    if let Some(anchor) = state.ships.first_mut() {
        anchor.steer(input.movement);
    }
    state.sync_formation();

    if input.fire {
        for ship in state.ships.iter_mut() {
            let fired = ship.shoot(now_ms, &state.enemies, &mut state.effects, &mut state.rng);
            if let Some(weapon) = fired {
                let cue = AudioEvent::WeaponFired { weapon };
                if !state.audio_events.contains(&cue) {
                    state.audio_events.push(cue);
                }
            }
        }
    } else {
        for ship in state.ships.iter_mut() {
            ship.release_trigger(&mut state.effects);
        }
    }

    advance_entities(state, now_ms);

    let dead_ship = resolve_collisions(state, now_ms);

    maintain_spawns(state, now_ms);

    if let Some(id) = dead_ship {
        handle_ship_death(state, id, now_ms);
    }
    cap_owned_particles(state);
}

/// Sparks emitted outside `update` (hits, muzzle flashes) obey the pool setting too
fn cap_owned_particles(state: &mut GameState) {
    let cap = state.config.max_particles.min(MAX_OWNED_PARTICLES);
    for ship in state.ships.iter_mut() {
        particle::trim_oldest(&mut ship.particles, cap);
    }
    for enemy in state.enemies.iter_mut() {
        particle::trim_oldest(&mut enemy.particles, cap);
    }
}

fn advance_entities(state: &mut GameState, now_ms: u64) {
    for ship in state.ships.iter_mut() {
        ship.update(&state.enemies, state.config.max_particles, &mut state.rng);
    }

    let ship_positions: Vec<Vec2> = state.ships.iter().map(|s| s.pos).collect();
    for enemy in state.enemies.iter_mut() {
        let aim = nearest(&ship_positions, enemy.pos);
        enemy.update(now_ms, aim, state.config.max_particles, &mut state.rng);
    }

    for bullet in state.stray_bullets.iter_mut() {
        bullet.advance(&[]);
    }
    state.stray_bullets.retain(|b| !b.is_offscreen());

    for power_up in state.power_ups.iter_mut() {
        power_up.update(now_ms);
    }
    state.power_ups.retain(|p| !p.is_offscreen());

    particle::update_particles(&mut state.particles, state.config.max_particles);
    state.shake.update(now_ms, &mut state.rng);

    for due in state.effects.take_expired(now_ms) {
        if let Some(ship) = state.ships.iter_mut().find(|s| s.id == due.ship) {
            ship.expire(due.kind);
        }
    }
}

fn nearest(points: &[Vec2], from: Vec2) -> Option<Vec2> {
    points.iter().copied().min_by(|a, b| {
        a.distance_squared(from)
            .partial_cmp(&b.distance_squared(from))
            .unwrap_or(std::cmp::Ordering::Equal)
    })
}

/// Keep the enemy floor topped up, call in the boss, and send a redcross when
/// the lead ship has lost enough health since the last check.
fn maintain_spawns(state: &mut GameState, now_ms: u64) {
    if !state.boss_spawned {
        if state.live_enemy_count() < MIN_ENEMIES_BASE + state.round as usize {
            state.spawn_regular(now_ms);
        }
        if state.round_score as f64 >= state.score_for_boss {
            state.spawn_boss(now_ms);
        }
    }

    let current = state.lead_health_percent();
    if state.last_health_check - current >= REDCROSS_HEALTH_DROP {
        state.spawn_enemy(EnemyKind::Redcross, now_ms);
        state.last_health_check = current;
        info!("Redcross dispatched (lead ship at {current:.0}%)");
    } else if current > state.last_health_check {
        state.last_health_check = current;
    }
}

fn start_new_round(state: &mut GameState, now_ms: u64) {
    state.round += 1;
    state.round_score = 0;
    state.boss_spawned = false;
    state.boss = None;
    state.round_transition = false;
    state.score_for_boss = boss_threshold(
        state.config.base_boss_score,
        state.config.round_multiplier,
        state.round,
    );

    state.reset_formation_position();
    state.enemies.clear();
    state.stray_bullets.clear();
    for _ in 0..WAVE_SIZE {
        state.spawn_regular(now_ms);
    }
    state.announcement_until_ms = Some(now_ms + ROUND_ANNOUNCE_MS);
    info!(
        "Round {} begins (boss at {:.0} points)",
        state.round, state.score_for_boss
    );
}

/// Lose a life: respawn the formation and restock a small wave, or end the game
fn handle_ship_death(state: &mut GameState, id: ShipId, now_ms: u64) {
    let Some(index) = state.ships.iter().position(|s| s.id == id) else {
        return;
    };
    let pos = state.ships[index].pos;
    state.explode(pos, SHIP_EXPLOSION);
    state.lives = state.lives.saturating_sub(1);

    if state.lives == 0 {
        state.phase = GamePhase::GameOver;
        state.audio_events.push(AudioEvent::Music {
            track: MusicTrack::Menu,
        });
        info!("Game over! Final score {} (round {})", state.score, state.round);
        return;
    }

    let start = Vec2::new(SHIP_START_X + wing_offset(index), SHIP_START_Y);
    state.ships[index].respawn(start, now_ms, &mut state.effects);
    state.reset_formation_position();

    state.enemies.clear();
    state.stray_bullets.clear();
    state.boss_spawned = false;
    state.boss = None;
    for _ in 0..RESPAWN_RESTOCK {
        state.spawn_regular(now_ms);
    }
    state.last_health_check = 100.0;
    info!("Ship lost, {} lives left", state.lives);
}

/// Demo input: chase the nearest enemy's column, sidestep incoming fire,
/// keep the trigger down and rotate through the arsenal.
fn autopilot(state: &GameState, input: &mut TickInput) {
    let Some(anchor) = state.ships.first() else {
        return;
    };
    input.fire = true;
    input.switch_weapon = state.time_ticks % (TICK_RATE as u64 * 10) == 0;

    let threat = state
        .enemies
        .iter()
        .flat_map(|e| e.bullets.iter())
        .chain(state.stray_bullets.iter())
        .filter(|b| b.pos.y < anchor.pos.y && b.pos.distance(anchor.pos) < 120.0)
        .min_by(|a, b| {
            a.pos
                .distance_squared(anchor.pos)
                .partial_cmp(&b.pos.distance_squared(anchor.pos))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    let target_x = match threat {
        // Step away from the bullet's side
        Some(bullet) if bullet.pos.x >= anchor.pos.x => Some(anchor.pos.x - SHIP_SPACING),
        Some(_) => Some(anchor.pos.x + SHIP_SPACING),
        None => state
            .power_ups
            .first()
            .map(|p| p.pos.x)
            .or_else(|| {
                state
                    .enemies
                    .iter()
                    .filter(|e| e.is_alive() && e.pos.y > 0.0)
                    .min_by(|a, b| {
                        (a.pos.x - anchor.pos.x)
                            .abs()
                            .partial_cmp(&(b.pos.x - anchor.pos.x).abs())
                            .unwrap_or(std::cmp::Ordering::Equal)
                    })
                    .map(|e| e.pos.x)
            }),
    };

    input.movement = MoveInput::default();
    if let Some(x) = target_x {
        let dx = x - anchor.pos.x;
        input.movement.left = dx < -SHIP_SPEED;
        input.movement.right = dx > SHIP_SPEED;
    }
    // Drift back down to the home row
    input.movement.down = anchor.pos.y < SHIP_START_Y - SHIP_SPEED;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::effects::EffectKind;
    use crate::sim::player::ShipArchetype;
    use crate::sim::state::GameConfig;
    use crate::sim::weapon::WeaponKind;

    /// First frame after the opening banner
    const PLAY_START: u64 = ROUND_ANNOUNCE_MS;

    fn new_game(seed: u64) -> GameState {
        GameState::new(seed, ShipArchetype::Interceptor, GameConfig::default(), 0)
    }

    fn fire() -> TickInput {
        TickInput {
            fire: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_announcement_freezes_gameplay() {
        let mut state = new_game(1);
        let before: Vec<Vec2> = state.enemies.iter().map(|e| e.pos).collect();

        tick(&mut state, &fire(), 1000);

        let after: Vec<Vec2> = state.enemies.iter().map(|e| e.pos).collect();
        assert_eq!(before, after);
        assert!(state.ships[0].bullets.is_empty());
        assert_eq!(state.announcement_until_ms, Some(ROUND_ANNOUNCE_MS));
    }

    #[test]
    fn test_first_machine_gun_volley() {
        let mut state = new_game(2);
        assert_eq!(state.enemies.len(), WAVE_SIZE);

        tick(&mut state, &fire(), PLAY_START);

        assert_eq!(state.announcement_until_ms, None);
        let bullets = &state.ships[0].bullets;
        assert_eq!(bullets.len(), 2);
        let vx = 5f32.to_radians().sin() * 2.0;
        assert!((bullets[0].vel.x + vx).abs() < 1e-5);
        assert!((bullets[1].vel.x - vx).abs() < 1e-5);
        assert!(bullets.iter().all(|b| b.damage == 8));
        assert!(state.audio_events.contains(&AudioEvent::WeaponFired {
            weapon: WeaponKind::MachineGun
        }));
    }

    #[test]
    fn test_determinism() {
        // Same seed, inputs and clock produce identical runs
        let mut state1 = new_game(99_999);
        let mut state2 = new_game(99_999);
        let inputs = [
            fire(),
            TickInput {
                movement: MoveInput {
                    left: true,
                    ..Default::default()
                },
                fire: true,
                ..Default::default()
            },
            TickInput {
                switch_weapon: true,
                ..Default::default()
            },
            TickInput {
                idle_mode: true,
                ..Default::default()
            },
        ];

        for step in 0..240u64 {
            let input = &inputs[(step / 60) as usize];
            let now = PLAY_START + step * TICK_MS;
            tick(&mut state1, input, now);
            tick(&mut state2, input, now);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.score, state2.score);
        assert_eq!(state1.ships[0].pos, state2.ships[0].pos);
        let pos1: Vec<Vec2> = state1.enemies.iter().map(|e| e.pos).collect();
        let pos2: Vec<Vec2> = state2.enemies.iter().map(|e| e.pos).collect();
        assert_eq!(pos1, pos2);
        assert_eq!(state1.particles.len(), state2.particles.len());
    }

    #[test]
    fn test_enemy_floor_is_topped_up_one_per_tick() {
        let mut state = new_game(3);
        state.enemies.clear();

        tick(&mut state, &TickInput::default(), PLAY_START);
        assert_eq!(state.live_enemy_count(), 1);
        tick(&mut state, &TickInput::default(), PLAY_START + TICK_MS);
        assert_eq!(state.live_enemy_count(), 2);
    }

    #[test]
    fn test_boss_spawns_at_threshold() {
        let mut state = new_game(4);
        state.round_score = 1000;

        tick(&mut state, &TickInput::default(), PLAY_START);

        assert!(state.boss_spawned);
        assert!(state.boss_alive());
        let boss_count = state.enemies.iter().filter(|e| e.is_boss()).count();
        assert_eq!(boss_count, 1);
    }

    #[test]
    fn test_boss_kill_starts_next_round() {
        let mut state = new_game(5);
        state.boss_spawned = true;
        state.round_transition = true;
        state.round_score = 1200;

        let now = PLAY_START + 500;
        tick(&mut state, &TickInput::default(), now);

        assert_eq!(state.round, 2);
        assert_eq!(state.round_score, 0);
        assert!(!state.boss_spawned);
        assert!(!state.round_transition);
        assert!((state.score_for_boss - 1500.0).abs() < 1e-9);
        assert_eq!(state.enemies.len(), WAVE_SIZE);
        assert_eq!(state.announcement_until_ms, Some(now + ROUND_ANNOUNCE_MS));
    }

    #[test]
    fn test_health_drop_calls_in_redcross() {
        let mut state = new_game(6);
        state.ships[0].health = 70;

        tick(&mut state, &TickInput::default(), PLAY_START);

        assert!(state.enemies.iter().any(|e| e.kind == EnemyKind::Redcross));
        assert_eq!(state.last_health_check, 70.0);

        // No second redcross until another 25-point drop
        tick(&mut state, &TickInput::default(), PLAY_START + TICK_MS);
        let medics = state.enemies.iter().filter(|e| e.kind == EnemyKind::Redcross).count();
        assert_eq!(medics, 1);
    }

    #[test]
    fn test_ship_death_costs_a_life_and_restocks() {
        let mut state = new_game(7);
        state.ships[0].health = 0;
        state.ships[0].pos = Vec2::new(100.0, 400.0);

        tick(&mut state, &TickInput::default(), PLAY_START);

        assert_eq!(state.lives, 4);
        assert_eq!(state.phase, GamePhase::Playing);
        let ship = &state.ships[0];
        assert_eq!(ship.health, ship.max_health);
        assert!(ship.invulnerable);
        assert_eq!(ship.pos, Vec2::new(SHIP_START_X, SHIP_START_Y));
        assert_eq!(state.enemies.len(), RESPAWN_RESTOCK);
        assert!(state.effects.is_pending(ship.id, EffectKind::Invulnerable));
    }

    #[test]
    fn test_last_life_ends_the_game() {
        let mut state = new_game(8);
        state.lives = 1;
        state.ships[0].health = 0;

        tick(&mut state, &TickInput::default(), PLAY_START);

        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.lives, 0);
        assert!(state.audio_events.contains(&AudioEvent::Music {
            track: MusicTrack::Menu
        }));

        // Nothing advances after game over
        let ticks = state.time_ticks;
        let enemies: Vec<Vec2> = state.enemies.iter().map(|e| e.pos).collect();
        tick(&mut state, &fire(), PLAY_START + TICK_MS);
        assert_eq!(state.time_ticks, ticks);
        let after: Vec<Vec2> = state.enemies.iter().map(|e| e.pos).collect();
        assert_eq!(enemies, after);
    }

    #[test]
    fn test_speed_boost_expires_on_schedule() {
        let mut state = new_game(9);
        let boost = 8_000;
        let ship_id = state.ships[0].id;
        state.ships[0].apply_speed_boost(PLAY_START, boost, &mut state.effects);

        tick(&mut state, &TickInput::default(), PLAY_START + boost - 1);
        assert_eq!(state.ship(ship_id).map(|s| s.speed_multiplier), Some(1.5));

        tick(&mut state, &TickInput::default(), PLAY_START + boost);
        assert_eq!(state.ship(ship_id).map(|s| s.speed_multiplier), Some(1.0));
    }

    #[test]
    fn test_formation_change_rebuilds_wings() {
        let mut state = new_game(10);
        let input = TickInput {
            formation: Some(3),
            ..Default::default()
        };

        tick(&mut state, &input, PLAY_START);

        assert_eq!(state.formation, 3);
        assert_eq!(state.ships.len(), 3);
        let anchor = state.ships[0].pos;
        assert_eq!(state.ships[1].pos.x, anchor.x - SHIP_SPACING);
        assert_eq!(state.ships[2].pos.x, anchor.x + SHIP_SPACING);
    }

    #[test]
    fn test_autopilot_keeps_firing() {
        let mut state = new_game(11);
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        tick(&mut state, &input, PLAY_START);
        assert!(!state.ships[0].bullets.is_empty());
    }

    #[test]
    fn test_particles_off_silences_every_emitter() {
        let config = GameConfig {
            max_particles: 0,
            ..GameConfig::default()
        };
        let mut state = GameState::new(12, ShipArchetype::Interceptor, config, 0);
        for i in 0..120 {
            tick(&mut state, &fire(), PLAY_START + i * TICK_MS);
        }
        assert!(state.particles.is_empty());
        assert!(state.ships.iter().all(|s| s.particles.is_empty()));
        assert!(state.enemies.iter().all(|e| e.particles.is_empty()));
    }
}
