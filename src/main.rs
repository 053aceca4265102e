//! Headless demo: the autopilot plays one game at 60 Hz and logs the result.
//!
//! Verbosity follows `RUST_LOG` (default `info`).

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use nova_formation::consts::TICK_MS;
use nova_formation::sim::{MoveInput, ShipArchetype};
use nova_formation::{InputEvent, LogAudio, Session, SessionPhase, Settings};

/// Demo length in game time
const DEMO_MS: u64 = 120_000;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    log::info!("Nova Formation (headless) starting, seed {seed}");

    let settings = Settings::default();
    let audio = LogAudio::new(settings.master_volume, settings.sfx_volume, settings.music_volume);
    let mut session = Session::new(settings, audio, seed);
    session.set_idle_mode(true);

    let start = Instant::now();
    let frame = Duration::from_millis(TICK_MS);
    session.handle_event(InputEvent::Start(ShipArchetype::Interceptor), 0);

    let mut next_frame = start;
    while session.is_running() {
        let now_ms = start.elapsed().as_millis() as u64;
        session.frame(MoveInput::default(), true, now_ms);

        if session.phase() == SessionPhase::GameOver || now_ms >= DEMO_MS {
            session.handle_event(InputEvent::Quit, now_ms);
        }

        // Frame limiter: the only place that sleeps
        next_frame += frame;
        let now = Instant::now();
        if next_frame > now {
            std::thread::sleep(next_frame - now);
        } else {
            next_frame = now;
        }
    }

    match session.game() {
        Some(game) => log::info!(
            "Final score {} (round {}, {} lives left, {} sounds, seed {})",
            game.score,
            game.round,
            game.lives,
            session.audio().sounds_played,
            game.seed
        ),
        None => log::info!("No game played"),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The headless demo is native only
}
