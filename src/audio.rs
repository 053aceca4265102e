//! Audio service contract
//!
//! Playback and synthesis live outside the crate. The session forwards sim
//! sound cues through [`AudioService`]; failures are logged and play continues.

use std::fmt;

use crate::sim::{MusicTrack, WeaponKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// No output device or audio context
    Unavailable,
    /// A sound or track failed to load
    MissingAsset { name: String },
    /// The backend rejected a playback request
    Playback { reason: String },
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "audio output unavailable"),
            Self::MissingAsset { name } => write!(f, "missing audio asset: {name}"),
            Self::Playback { reason } => write!(f, "playback failed: {reason}"),
        }
    }
}

impl std::error::Error for AudioError {}

/// External sound service
pub trait AudioService {
    fn play_weapon_sound(&mut self, weapon: WeaponKind) -> Result<(), AudioError>;
    fn play_background_music(&mut self, track: MusicTrack) -> Result<(), AudioError>;
    /// Master volume, 0.0 - 1.0
    fn set_volume(&mut self, volume: f32) -> Result<(), AudioError>;
}

/// Asset name of the sound for a weapon
pub fn weapon_sound_name(weapon: WeaponKind) -> &'static str {
    match weapon {
        WeaponKind::MachineGun => "machine_gun",
        WeaponKind::Laser => "laser",
        WeaponKind::Cannon => "cannon",
        WeaponKind::Beam => "beam",
        WeaponKind::Shotgun => "shotgun",
        WeaponKind::Missile => "missile",
    }
}

pub fn track_name(track: MusicTrack) -> &'static str {
    match track {
        MusicTrack::Menu => "menu",
        MusicTrack::Game => "game",
    }
}

/// Audio backend for headless runs: tracks volumes and logs every request
#[derive(Debug, Clone)]
pub struct LogAudio {
    master_volume: f32,
    sfx_volume: f32,
    music_volume: f32,
    muted: bool,
    current_track: Option<MusicTrack>,
    /// Number of weapon sounds requested, for diagnostics
    pub sounds_played: u64,
}

impl Default for LogAudio {
    fn default() -> Self {
        Self::new(0.8, 1.0, 0.7)
    }
}

impl LogAudio {
    pub fn new(master_volume: f32, sfx_volume: f32, music_volume: f32) -> Self {
        Self {
            master_volume: master_volume.clamp(0.0, 1.0),
            sfx_volume: sfx_volume.clamp(0.0, 1.0),
            music_volume: music_volume.clamp(0.0, 1.0),
            muted: false,
            current_track: None,
            sounds_played: 0,
        }
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn master_volume(&self) -> f32 {
        self.master_volume
    }

    pub fn current_track(&self) -> Option<MusicTrack> {
        self.current_track
    }

    fn effective_volume(&self, channel: f32) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * channel
        }
    }
}

impl AudioService for LogAudio {
    fn play_weapon_sound(&mut self, weapon: WeaponKind) -> Result<(), AudioError> {
        self.sounds_played += 1;
        log::trace!(
            "sfx {} at volume {:.2}",
            weapon_sound_name(weapon),
            self.effective_volume(self.sfx_volume)
        );
        Ok(())
    }

    fn play_background_music(&mut self, track: MusicTrack) -> Result<(), AudioError> {
        if self.current_track == Some(track) {
            return Ok(());
        }
        self.current_track = Some(track);
        log::info!(
            "Music: {} at volume {:.2}",
            track_name(track),
            self.effective_volume(self.music_volume)
        );
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) -> Result<(), AudioError> {
        self.master_volume = volume.clamp(0.0, 1.0);
        log::debug!("Master volume {:.1}", self.master_volume);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_is_clamped() {
        let mut audio = LogAudio::default();
        audio.set_volume(1.7).unwrap();
        assert_eq!(audio.master_volume(), 1.0);
        audio.set_volume(-0.2).unwrap();
        assert_eq!(audio.master_volume(), 0.0);
    }

    #[test]
    fn test_mute_silences_effective_volume() {
        let mut audio = LogAudio::new(0.5, 1.0, 1.0);
        assert_eq!(audio.effective_volume(1.0), 0.5);
        audio.set_muted(true);
        assert_eq!(audio.effective_volume(1.0), 0.0);
    }

    #[test]
    fn test_music_switch_is_tracked() {
        let mut audio = LogAudio::default();
        audio.play_background_music(MusicTrack::Game).unwrap();
        assert_eq!(audio.current_track(), Some(MusicTrack::Game));
        audio.play_background_music(MusicTrack::Menu).unwrap();
        assert_eq!(audio.current_track(), Some(MusicTrack::Menu));
    }

    #[test]
    fn test_error_display() {
        let err = AudioError::MissingAsset {
            name: "beam".to_string(),
        };
        assert_eq!(err.to_string(), "missing audio asset: beam");
    }
}
