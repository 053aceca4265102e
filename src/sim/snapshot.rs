//! Render snapshot: a read-only, serializable view of the game for an
//! external renderer and HUD.
//!
//! Building a snapshot never modifies the state.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::enemy::{Enemy, EnemyKind};
use super::particle::{Particle, Rgb};
use super::player::{BeamState, PlayerShip, ShipArchetype};
use super::powerup::PowerUpKind;
use super::projectile::{Projectile, ProjectileKind};
use super::state::{GamePhase, GameState};
use super::weapon::WeaponKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipView {
    pub id: u32,
    pub archetype: ShipArchetype,
    pub pos: Vec2,
    pub health: i32,
    pub max_health: i32,
    pub shield: i32,
    pub invulnerable: bool,
    pub weapon: WeaponKind,
    pub weapon_boosted: bool,
    pub beam: BeamState,
    pub color: Rgb,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyView {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub size: Vec2,
    pub health_fraction: f32,
    pub tint: Rgb,
    /// Direction of travel, radians
    pub rotation: f32,
    /// Boss phase name and visual revision
    pub boss_phase: Option<(String, u32)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileView {
    pub kind: ProjectileKind,
    pub pos: Vec2,
    pub radius: f32,
    pub color: Rgb,
    pub rotation: f32,
    pub hostile: bool,
    /// Missile trail, oldest first
    pub trail: Vec<Vec2>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticleView {
    pub pos: Vec2,
    pub color: Rgb,
    pub size: f32,
    pub alpha: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUpView {
    pub kind: PowerUpKind,
    pub pos: Vec2,
    pub angle: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HudView {
    pub round: u32,
    pub score: u64,
    pub lives: u32,
    /// `round_score / score_for_boss`, capped at 1
    pub boss_progress: f32,
    pub weapon: Option<WeaponKind>,
    pub formation: usize,
    /// Round number while the banner is up
    pub announcement: Option<u32>,
    pub volume: f32,
    pub show_info: bool,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub phase: GamePhase,
    pub ships: Vec<ShipView>,
    pub enemies: Vec<EnemyView>,
    pub projectiles: Vec<ProjectileView>,
    pub particles: Vec<ParticleView>,
    pub power_ups: Vec<PowerUpView>,
    pub shake_offset: Vec2,
    pub hud: HudView,
}

/// Build a complete snapshot; `volume` and `show_info` come from the session
pub fn build_snapshot(state: &GameState, volume: f32, show_info: bool) -> Snapshot {
    let mut ships: Vec<ShipView> = state.ships.iter().map(ship_view).collect();
    ships.sort_by_key(|s| s.id);
    let mut enemies: Vec<EnemyView> = state
        .enemies
        .iter()
        .filter(|e| e.is_alive())
        .map(enemy_view)
        .collect();
    enemies.sort_by_key(|e| e.id);

    Snapshot {
        tick: state.time_ticks,
        phase: state.phase,
        ships,
        enemies,
        projectiles: build_projectiles(state),
        particles: build_particles(state),
        power_ups: state
            .power_ups
            .iter()
            .map(|p| PowerUpView {
                kind: p.kind,
                pos: p.pos,
                angle: p.angle,
            })
            .collect(),
        shake_offset: state.shake.offset,
        hud: HudView {
            round: state.round,
            score: state.score,
            lives: state.lives,
            boss_progress: boss_progress(state),
            weapon: state.ships.first().map(|s| s.weapon),
            formation: state.formation,
            announcement: state.announcement_until_ms.map(|_| state.round),
            volume,
            show_info,
        },
    }
}

pub fn boss_progress(state: &GameState) -> f32 {
    if state.score_for_boss <= 0.0 {
        return 1.0;
    }
    (state.round_score as f64 / state.score_for_boss).min(1.0) as f32
}

fn ship_view(ship: &PlayerShip) -> ShipView {
    ShipView {
        id: ship.id.0,
        archetype: ship.archetype,
        pos: ship.pos,
        health: ship.health,
        max_health: ship.max_health,
        shield: ship.shield,
        invulnerable: ship.invulnerable,
        weapon: ship.weapon,
        weapon_boosted: ship.armory.is_boosted(ship.weapon),
        beam: ship.beam,
        color: ship.archetype.color(),
    }
}

fn enemy_view(enemy: &Enemy) -> EnemyView {
    EnemyView {
        id: enemy.id.0,
        kind: enemy.kind,
        pos: enemy.pos,
        size: enemy.size,
        health_fraction: enemy.health_fraction(),
        tint: enemy.tint(),
        rotation: enemy.heading,
        boss_phase: enemy
            .boss
            .map(|b| (b.current().name.to_string(), b.visual_revision)),
    }
}

fn projectile_view(bullet: &Projectile, hostile: bool) -> ProjectileView {
    ProjectileView {
        kind: bullet.kind,
        pos: bullet.pos,
        radius: bullet.radius,
        color: bullet.color,
        rotation: bullet.rotation(),
        hostile,
        trail: bullet
            .homing
            .as_ref()
            .map(|h| h.trail.iter().copied().collect())
            .unwrap_or_default(),
    }
}

/// Player bullets first, then enemy-owned, then strays
fn build_projectiles(state: &GameState) -> Vec<ProjectileView> {
    let friendly = state
        .ships
        .iter()
        .flat_map(|s| s.bullets.iter())
        .map(|b| projectile_view(b, false));
    let hostile = state
        .enemies
        .iter()
        .flat_map(|e| e.bullets.iter())
        .chain(state.stray_bullets.iter())
        .map(|b| projectile_view(b, true));
    friendly.chain(hostile).collect()
}

fn build_particles(state: &GameState) -> Vec<ParticleView> {
    let owned = state
        .ships
        .iter()
        .flat_map(|s| s.particles.iter())
        .chain(state.enemies.iter().flat_map(|e| e.particles.iter()));
    owned.chain(state.particles.iter()).map(particle_view).collect()
}

fn particle_view(p: &Particle) -> ParticleView {
    ParticleView {
        pos: p.pos,
        color: p.color,
        size: p.size,
        alpha: p.alpha.clamp(0, 255) as u8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::GameConfig;

    fn new_game() -> GameState {
        GameState::new(21, ShipArchetype::Avenger, GameConfig::default(), 0)
    }

    #[test]
    fn test_snapshot_mirrors_state() {
        let mut state = new_game();
        state.score = 450;
        state.round_score = 250;

        let snap = build_snapshot(&state, 0.7, true);

        assert_eq!(snap.ships.len(), 1);
        assert_eq!(snap.ships[0].color, ShipArchetype::Avenger.color());
        assert_eq!(snap.enemies.len(), state.enemies.len());
        assert_eq!(snap.hud.score, 450);
        assert_eq!(snap.hud.lives, 5);
        assert_eq!(snap.hud.announcement, Some(1));
        assert_eq!(snap.hud.weapon, Some(WeaponKind::MachineGun));
        assert!((snap.hud.boss_progress - 0.25).abs() < 1e-6);
        assert!(snap.hud.show_info);
    }

    #[test]
    fn test_enemy_rotation_follows_heading() {
        let mut state = new_game();
        let snap = build_snapshot(&state, 1.0, false);
        assert!((snap.enemies[0].rotation - std::f32::consts::FRAC_PI_2).abs() < 1e-6);

        state.enemies[0].heading = 0.25;
        let snap = build_snapshot(&state, 1.0, false);
        assert_eq!(snap.enemies[0].rotation, 0.25);
    }

    #[test]
    fn test_boss_progress_caps_at_one() {
        let mut state = new_game();
        state.round_score = 5000;
        assert_eq!(boss_progress(&state), 1.0);
    }

    #[test]
    fn test_stray_bullets_are_hostile() {
        let mut state = new_game();
        state.stray_bullets.push(Projectile::enemy(
            ProjectileKind::Plasma,
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 3.0),
            10.0,
            8.0,
            [0, 255, 0],
        ));
        let snap = build_snapshot(&state, 1.0, false);
        assert_eq!(snap.projectiles.len(), 1);
        assert!(snap.projectiles[0].hostile);
    }

    #[test]
    fn test_snapshot_serializes_to_json() {
        let state = new_game();
        let snap = build_snapshot(&state, 0.5, false);
        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("\"hud\""));
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.enemies.len(), snap.enemies.len());
    }
}
