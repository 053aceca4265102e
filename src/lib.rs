//! Nova Formation - a formation space shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, rounds, boss phases)
//! - `session`: Menu/playing/paused/game-over state machine around the sim
//! - `audio`: Narrow contract to the external sound service
//! - `settings`: Player preferences and gameplay tuning

pub mod audio;
pub mod session;
pub mod settings;
pub mod sim;

pub use audio::{AudioError, AudioService, LogAudio};
pub use session::{InputEvent, Session, SessionPhase};
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation rate
    pub const TICK_RATE: u32 = 60;
    /// Milliseconds per simulation tick
    pub const TICK_MS: u64 = 1000 / TICK_RATE as u64;

    /// Playfield dimensions (pixels)
    pub const SCREEN_WIDTH: f32 = 1024.0;
    pub const SCREEN_HEIGHT: f32 = 768.0;
    /// Slack around the playfield before off-screen entities are culled
    pub const OFFSCREEN_MARGIN: f32 = 50.0;

    /// Formation anchor at the start of a life or round
    pub const SHIP_START_X: f32 = SCREEN_WIDTH / 2.0;
    pub const SHIP_START_Y: f32 = SCREEN_HEIGHT - 20.0 - SHIP_HALF_EXTENT;
    /// Half of the 64px ship sprite
    pub const SHIP_HALF_EXTENT: f32 = 32.0;
    pub const SHIP_RADIUS: f32 = 20.0;
    pub const SHIP_SPEED: f32 = 8.0;
    pub const SHIP_MAX_HEALTH: i32 = 100;
    /// Horizontal spacing between formation members
    pub const SHIP_SPACING: f32 = 80.0;
    /// Damage a ship deals to an enemy it rams
    pub const SHIP_RAM_DAMAGE: i32 = 20;

    /// Invulnerability window after any hit
    pub const INVULNERABLE_MS: u64 = 1000;
    /// Longest continuous beam burst
    pub const BEAM_MAX_MS: u64 = 3000;
    /// Round announcement overlay (gameplay frozen)
    pub const ROUND_ANNOUNCE_MS: u64 = 3000;
    /// Regular enemies hold fire this long after spawning
    pub const ENEMY_FIRE_GRACE_MS: u64 = 1000;

    /// Enemies in a fresh wave
    pub const WAVE_SIZE: usize = 8;
    /// Enemies restocked after losing a life
    pub const RESPAWN_RESTOCK: usize = 4;
    /// Base live-enemy floor (plus the round number)
    pub const MIN_ENEMIES_BASE: usize = 5;
    /// Lead ship health drop (percentage points) that calls in a redcross
    pub const REDCROSS_HEALTH_DROP: f32 = 25.0;
    /// Shield granted by a shield pickup
    pub const SHIELD_PICKUP: i32 = 50;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Shortest signed rotation from `from` to `to`, in [-π, π)
#[inline]
pub fn angle_delta(from: f32, to: f32) -> f32 {
    normalize_angle(to - from)
}

/// Unit vector for a heading in radians (0 = +x, screen y grows downward)
#[inline]
pub fn heading_to_vec(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}

/// Velocity for a shot fanned `deg` degrees off straight down
#[inline]
pub fn fan_down(deg: f32, speed: f32) -> Vec2 {
    let rad = deg.to_radians();
    Vec2::new(rad.sin() * speed, rad.cos() * speed)
}

/// Velocity along a screen-space angle in degrees
#[inline]
pub fn polar_deg(deg: f32, speed: f32) -> Vec2 {
    heading_to_vec(deg.to_radians()) * speed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle_wraps() {
        assert!((normalize_angle(2.5 * PI) - PI / 2.0).abs() < 1e-4);
        assert!((normalize_angle(-2.5 * PI) + PI / 2.0).abs() < 1e-4);
        let wrapped = normalize_angle(3.0 * PI);
        assert!((wrapped.abs() - PI).abs() < 1e-4);
        assert!((-PI..PI).contains(&wrapped));
        assert!((normalize_angle(-3.0 * PI / 2.0) - PI / 2.0).abs() < 1e-4);
        assert_eq!(normalize_angle(0.5), 0.5);
    }

    #[test]
    fn test_angle_delta_takes_short_way() {
        let d = angle_delta(PI - 0.1, -PI + 0.1);
        assert!((d - 0.2).abs() < 1e-4);
        let d = angle_delta(-PI + 0.1, PI - 0.1);
        assert!((d + 0.2).abs() < 1e-4);
    }

    #[test]
    fn test_fan_down_zero_is_straight_down() {
        let v = fan_down(0.0, 3.0);
        assert!(v.x.abs() < 1e-6);
        assert!((v.y - 3.0).abs() < 1e-6);
    }
}
