//! Session controller
//!
//! Owns the running game (if any), the player's settings and the audio
//! service. Front ends feed it semantic input events plus the held movement
//! keys once per frame, and read back a [`Snapshot`] to draw.

use log::{info, warn};

use crate::audio::{AudioError, AudioService};
use crate::settings::Settings;
use crate::sim::{
    AudioEvent, GamePhase, GameState, MoveInput, MusicTrack, ShipArchetype, Snapshot, TickInput,
    build_snapshot, tick,
};

/// Volume change per key press
const VOLUME_STEP: f32 = 0.1;

/// Top-level screen state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Menu,
    Playing,
    Paused,
    GameOver,
}

/// Semantic input, already decoded from keys or buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Quit,
    /// Start a game with the chosen hull
    Start(ShipArchetype),
    Fire,
    SwitchWeapon,
    /// Formation size 1..=3
    Formation(usize),
    Pause,
    QuitToMenu,
    VolumeUp,
    VolumeDown,
    ToggleInfo,
    AnyKey,
}

pub struct Session<A: AudioService> {
    phase: SessionPhase,
    game: Option<GameState>,
    settings: Settings,
    audio: A,
    /// One-shot inputs waiting for the next tick
    pending: TickInput,
    volume: f32,
    show_info: bool,
    running: bool,
    next_seed: u64,
}

impl<A: AudioService> Session<A> {
    pub fn new(settings: Settings, audio: A, seed: u64) -> Self {
        let volume = settings.master_volume.clamp(0.0, 1.0);
        let mut session = Self {
            phase: SessionPhase::Menu,
            game: None,
            settings,
            audio,
            pending: TickInput::default(),
            volume,
            show_info: false,
            running: true,
            next_seed: seed,
        };
        let result = session.audio.set_volume(volume);
        session.report(result);
        session.play_music(MusicTrack::Menu);
        session
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn game(&self) -> Option<&GameState> {
        self.game.as_ref()
    }

    pub fn game_mut(&mut self) -> Option<&mut GameState> {
        self.game.as_mut()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn show_info(&self) -> bool {
        self.show_info
    }

    /// Let the autopilot drive the formation
    pub fn set_idle_mode(&mut self, idle: bool) {
        self.pending.idle_mode = idle;
    }

    pub fn handle_event(&mut self, event: InputEvent, now_ms: u64) {
        match (self.phase, event) {
            (_, InputEvent::Quit) => {
                info!("Quit requested");
                self.running = false;
            }
            (_, InputEvent::VolumeUp) => self.change_volume(VOLUME_STEP),
            (_, InputEvent::VolumeDown) => self.change_volume(-VOLUME_STEP),
            (_, InputEvent::ToggleInfo) => self.show_info = !self.show_info,

            (SessionPhase::Menu, InputEvent::Start(archetype)) => {
                self.start_game(archetype, now_ms);
            }

            (SessionPhase::Playing, InputEvent::Fire) => self.pending.fire = true,
            (SessionPhase::Playing, InputEvent::SwitchWeapon) => self.pending.switch_weapon = true,
            (SessionPhase::Playing, InputEvent::Formation(size)) => {
                self.pending.formation = Some(size.clamp(1, 3));
            }
            (SessionPhase::Playing, InputEvent::Pause) => {
                self.phase = SessionPhase::Paused;
                info!("Paused");
            }

            (SessionPhase::Paused, InputEvent::Pause) => {
                self.phase = SessionPhase::Playing;
                info!("Resumed");
            }
            (SessionPhase::Paused, InputEvent::QuitToMenu) => self.return_to_menu(),

            (SessionPhase::GameOver, InputEvent::AnyKey) => self.return_to_menu(),

            _ => {}
        }
    }

    /// Advance one frame. `movement` and `fire_held` are sampled once per frame.
    pub fn frame(&mut self, movement: MoveInput, fire_held: bool, now_ms: u64) {
        if self.phase != SessionPhase::Playing {
            return;
        }
        let Some(game) = self.game.as_mut() else {
            return;
        };

        let input = TickInput {
            movement,
            fire: fire_held || self.pending.fire,
            switch_weapon: self.pending.switch_weapon,
            formation: self.pending.formation,
            idle_mode: self.pending.idle_mode,
        };
        tick(game, &input, now_ms);

        // Clear one-shot inputs after processing; commands wait out the round banner
        self.pending.fire = false;
        if game.announcement_until_ms.is_none() {
            self.pending.switch_weapon = false;
            self.pending.formation = None;
        }

        let events = game.drain_audio_events();
        let over = game.phase == GamePhase::GameOver;
        self.forward_audio(events);

        if over {
            self.phase = SessionPhase::GameOver;
        }
    }

    /// Render view of the current game
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.game
            .as_ref()
            .map(|g| build_snapshot(g, self.volume, self.show_info))
    }

    fn start_game(&mut self, archetype: ShipArchetype, now_ms: u64) {
        let seed = self.next_seed;
        self.next_seed = self.next_seed.wrapping_add(1);
        self.game = Some(GameState::new(seed, archetype, self.settings.to_game_config(), now_ms));
        let idle = self.pending.idle_mode;
        self.pending = TickInput {
            idle_mode: idle,
            ..Default::default()
        };
        self.phase = SessionPhase::Playing;
        self.play_music(MusicTrack::Game);
    }

    fn return_to_menu(&mut self) {
        if let Some(game) = self.game.take() {
            info!(
                "Left game with score {} (round {}, seed {})",
                game.score, game.round, game.seed
            );
        }
        self.phase = SessionPhase::Menu;
        self.play_music(MusicTrack::Menu);
    }

    fn change_volume(&mut self, delta: f32) {
        self.volume = ((self.volume + delta) * 10.0).round().clamp(0.0, 10.0) / 10.0;
        self.settings.master_volume = self.volume;
        let result = self.audio.set_volume(self.volume);
        self.report(result);
    }

    fn play_music(&mut self, track: MusicTrack) {
        let result = self.audio.play_background_music(track);
        self.report(result);
    }

    fn forward_audio(&mut self, events: Vec<AudioEvent>) {
        for event in events {
            let result = match event {
                AudioEvent::WeaponFired { weapon } => self.audio.play_weapon_sound(weapon),
                AudioEvent::Music { track } => self.audio.play_background_music(track),
            };
            self.report(result);
        }
    }

    fn report(&self, result: Result<(), AudioError>) {
        if let Err(e) = result {
            warn!("Audio: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::WeaponKind;

    /// Records every request; optionally fails all of them
    #[derive(Default)]
    struct RecordingAudio {
        fail: bool,
        weapons: Vec<WeaponKind>,
        tracks: Vec<MusicTrack>,
        volumes: Vec<f32>,
    }

    impl RecordingAudio {
        fn outcome(&self) -> Result<(), AudioError> {
            if self.fail { Err(AudioError::Unavailable) } else { Ok(()) }
        }
    }

    impl AudioService for RecordingAudio {
        fn play_weapon_sound(&mut self, weapon: WeaponKind) -> Result<(), AudioError> {
            self.weapons.push(weapon);
            self.outcome()
        }

        fn play_background_music(&mut self, track: MusicTrack) -> Result<(), AudioError> {
            self.tracks.push(track);
            self.outcome()
        }

        fn set_volume(&mut self, volume: f32) -> Result<(), AudioError> {
            self.volumes.push(volume);
            self.outcome()
        }
    }

    fn session() -> Session<RecordingAudio> {
        Session::new(Settings::default(), RecordingAudio::default(), 7)
    }

    #[test]
    fn test_start_pause_resume_quit_to_menu() {
        let mut s = session();
        assert_eq!(s.phase(), SessionPhase::Menu);
        assert_eq!(s.audio().tracks, vec![MusicTrack::Menu]);

        s.handle_event(InputEvent::Start(ShipArchetype::Phantom), 0);
        assert_eq!(s.phase(), SessionPhase::Playing);
        assert_eq!(s.audio().tracks.last(), Some(&MusicTrack::Game));

        s.handle_event(InputEvent::Pause, 10);
        assert_eq!(s.phase(), SessionPhase::Paused);
        s.handle_event(InputEvent::Pause, 20);
        assert_eq!(s.phase(), SessionPhase::Playing);

        // Quit-to-menu only works from pause
        s.handle_event(InputEvent::QuitToMenu, 30);
        assert_eq!(s.phase(), SessionPhase::Playing);
        s.handle_event(InputEvent::Pause, 40);
        s.handle_event(InputEvent::QuitToMenu, 50);
        assert_eq!(s.phase(), SessionPhase::Menu);
        assert!(s.game().is_none());
        assert_eq!(s.audio().tracks.last(), Some(&MusicTrack::Menu));
    }

    #[test]
    fn test_pause_freezes_simulation() {
        let mut s = session();
        s.handle_event(InputEvent::Start(ShipArchetype::Interceptor), 0);
        s.frame(MoveInput::default(), false, ROUND_ANNOUNCE_MS);
        let ticks = s.game().map(|g| g.time_ticks);

        s.handle_event(InputEvent::Pause, ROUND_ANNOUNCE_MS);
        s.frame(MoveInput::default(), true, ROUND_ANNOUNCE_MS + TICK_MS);
        assert_eq!(s.game().map(|g| g.time_ticks), ticks);
    }

    #[test]
    fn test_fire_is_forwarded_to_audio() {
        let mut s = session();
        s.handle_event(InputEvent::Start(ShipArchetype::Interceptor), 0);
        s.handle_event(InputEvent::Fire, ROUND_ANNOUNCE_MS);
        s.frame(MoveInput::default(), false, ROUND_ANNOUNCE_MS);
        assert_eq!(s.audio().weapons, vec![WeaponKind::MachineGun]);
        // One-shot fire does not repeat
        s.frame(MoveInput::default(), false, ROUND_ANNOUNCE_MS + 1000);
        assert_eq!(s.audio().weapons.len(), 1);
    }

    #[test]
    fn test_each_game_gets_a_fresh_seed() {
        let mut s = session();
        s.handle_event(InputEvent::Start(ShipArchetype::Interceptor), 0);
        assert_eq!(s.game().map(|g| g.seed), Some(7));
        s.handle_event(InputEvent::Pause, 10);
        s.handle_event(InputEvent::QuitToMenu, 20);
        s.handle_event(InputEvent::Start(ShipArchetype::Interceptor), 30);
        assert_eq!(s.game().map(|g| g.seed), Some(8));
    }

    #[test]
    fn test_commands_during_banner_apply_after_it() {
        let mut s = session();
        s.handle_event(InputEvent::Start(ShipArchetype::Interceptor), 0);
        s.handle_event(InputEvent::Formation(3), 100);
        s.handle_event(InputEvent::SwitchWeapon, 100);
        s.frame(MoveInput::default(), false, 116);
        assert_eq!(s.game().map(|g| g.formation), Some(1));

        s.frame(MoveInput::default(), false, ROUND_ANNOUNCE_MS + 200);
        s.frame(MoveInput::default(), false, ROUND_ANNOUNCE_MS + 216);
        let game = s.game().unwrap();
        assert_eq!(game.formation, 3);
        assert_eq!(game.ships.len(), 3);
        assert!(game.ships.iter().all(|ship| ship.weapon == WeaponKind::Laser));
    }

    #[test]
    fn test_audio_failures_do_not_stop_play() {
        let audio = RecordingAudio {
            fail: true,
            ..Default::default()
        };
        let mut s = Session::new(Settings::default(), audio, 1);
        s.handle_event(InputEvent::Start(ShipArchetype::Interceptor), 0);
        s.frame(MoveInput::default(), true, ROUND_ANNOUNCE_MS);
        assert_eq!(s.phase(), SessionPhase::Playing);
        assert!(s.game().is_some_and(|g| !g.ships[0].bullets.is_empty()));
    }

    #[test]
    fn test_game_over_then_any_key_returns_to_menu() {
        let mut s = session();
        s.handle_event(InputEvent::Start(ShipArchetype::Interceptor), 0);
        if let Some(game) = s.game_mut() {
            game.lives = 1;
            game.ships[0].health = 0;
        }
        s.frame(MoveInput::default(), false, ROUND_ANNOUNCE_MS);
        assert_eq!(s.phase(), SessionPhase::GameOver);
        assert_eq!(s.audio().tracks.last(), Some(&MusicTrack::Menu));

        s.handle_event(InputEvent::Pause, ROUND_ANNOUNCE_MS + 10);
        assert_eq!(s.phase(), SessionPhase::GameOver);
        s.handle_event(InputEvent::AnyKey, ROUND_ANNOUNCE_MS + 20);
        assert_eq!(s.phase(), SessionPhase::Menu);
    }

    #[test]
    fn test_volume_steps_are_clamped() {
        let mut s = session();
        for _ in 0..5 {
            s.handle_event(InputEvent::VolumeUp, 0);
        }
        assert_eq!(s.volume(), 1.0);
        for _ in 0..15 {
            s.handle_event(InputEvent::VolumeDown, 0);
        }
        assert_eq!(s.volume(), 0.0);
        assert_eq!(s.audio().volumes.last(), Some(&0.0));
    }

    #[test]
    fn test_toggle_info_and_quit() {
        let mut s = session();
        s.handle_event(InputEvent::ToggleInfo, 0);
        assert!(s.show_info());
        s.handle_event(InputEvent::Start(ShipArchetype::Stealth), 0);
        let snap = s.snapshot();
        assert!(snap.is_some_and(|snap| snap.hud.show_info));
        s.handle_event(InputEvent::Quit, 0);
        assert!(!s.is_running());
    }
}
