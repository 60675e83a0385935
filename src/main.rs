/// Entry point and game loop.

mod config;
mod domain;
mod error;
mod logging;
mod sim;
mod ui;

use std::process::ExitCode;
use std::time::Duration;

use tracing::{error, info};

use config::GameConfig;
use error::AppError;
use sim::clock::{Clock, SystemClock};
use sim::event::GameEvent;
use sim::game::{Game, GameEnding, GameState};
use ui::host::Host;
use ui::input::{is_skip_key, InputState};
use ui::intro::IntroPlayer;
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

/// Countdown values at which the alarm beeps.
const ALARM_FROM_SECS: u32 = 10;

fn main() -> ExitCode {
    let _log_guard = logging::init();
    info!(
        version = env!("CARGO_PKG_VERSION"),
        log = %logging::log_path().display(),
        "starting"
    );

    let config = GameConfig::load();

    let mut host = match Host::acquire() {
        Ok(host) => host,
        Err(e) => {
            let e = AppError::from(e);
            error!(error = %e, "startup failed");
            eprintln!("Terminal init failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    let sound = if config.general.sound { SoundEngine::new() } else { None };
    let mut game = Game::new(&config, SystemClock::new());
    let mut intro = IntroPlayer::new(&config.intro);

    let result = game_loop(&mut game, &mut intro, &mut host, sound.as_ref(), &config);

    if let Err(e) = host.release() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        error!(error = %e, "game loop aborted");
        eprintln!("Game error: {e}");
        return ExitCode::FAILURE;
    }

    info!(ending = ?game.ending(), attempts = game.attempts(), "exiting");
    ExitCode::SUCCESS
}

fn game_loop<C: Clock>(
    game: &mut Game<C>,
    intro: &mut IntroPlayer,
    host: &mut Host,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), AppError> {
    let mut kb = InputState::new();
    let mut renderer = Renderer::new();
    renderer.init()?;
    intro.start(game.now());

    loop {
        kb.drain_events();
        if config.general.ctrl_c_exits && kb.ctrl_c_pressed() {
            info!("ctrl+c exit");
            break;
        }
        let keys = kb.take_events();

        if game.state() == GameState::Intro {
            let skipped = keys.iter().any(is_skip_key) && intro.skip();
            if skipped || intro.advance(game.now()) {
                let events = game.intro_finished();
                process_events(&events, host, sound);
            }
        } else {
            for key in &keys {
                let events = game.on_key(key);
                process_events(&events, host, sound);
                if host.quit_requested() {
                    break;
                }
            }
        }

        let events = game.advance();
        process_events(&events, host, sound);

        if host.quit_requested() {
            break;
        }

        renderer.render(game, intro, game.now())?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn process_events(events: &[GameEvent], host: &mut Host, sound: Option<&SoundEngine>) {
    for event in events {
        if *event == GameEvent::QuitRequested {
            host.request_quit();
        }

        let Some(sfx) = sound else { continue };
        match event {
            GameEvent::CharEchoed(_) | GameEvent::CharRemoved => sfx.play_key(),
            GameEvent::HelpShown { .. } => sfx.play_help(),
            GameEvent::CommandNotFound(_) => sfx.play_error(),
            GameEvent::WrongCode { attempts_remaining } if *attempts_remaining > 0 => sfx.play_error(),
            GameEvent::TimerTick(n) if (1..=ALARM_FROM_SECS).contains(n) => sfx.play_alarm(),
            GameEvent::Ended(GameEnding::Success) => sfx.play_success(),
            GameEvent::Ended(GameEnding::Fail) => sfx.play_fail(),
            _ => {}
        }
    }
}
