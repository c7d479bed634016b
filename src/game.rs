use std::io::{self, Write};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::config::Config;
use crate::error::GameError;
use crate::snake::{grid_to_string, Direction, GameState, MoveResult::*};
use crate::term::TermManager;
use crate::TermInt;

pub const GAME_OVER_MESSAGE: &str = "Game over!";
const GAME_OVER_LINGER_MS: u64 = 5000;

/// Where finished frames go. Frames are the grid rows joined by newlines.
pub trait Screen {
    fn draw_frame(&mut self, frame: &str) -> io::Result<()>;
    fn show_game_over(&mut self, message: &str) -> io::Result<()>;
}

/// Entering and leaving the game's terminal mode.
pub trait Terminal {
    fn setup(&mut self) -> io::Result<()>;
    fn restore(&mut self) -> io::Result<()>;
}

#[derive(Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Running,
    /// The session is over; keep the message up for `linger` before leaving.
    GameOver { linger: Duration },
}

#[derive(Debug, PartialEq, Eq)]
pub enum KeyAction {
    Steer(KeyCode),
    Quit,
    Ignore,
}

pub fn classify_key(ev: &KeyEvent) -> KeyAction {
    if is_ctrl_c(ev) {
        return KeyAction::Quit;
    }

    match ev.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => KeyAction::Quit,
        code if Direction::from_key(code).is_some() => KeyAction::Steer(code),
        _ => KeyAction::Ignore,
    }
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    ev.code == KeyCode::Char('c') && ev.modifiers.contains(KeyModifiers::CONTROL)
}

/// One game session: the state, its tick rate, and the last direction key
/// seen. The key is not consumed by a tick, so it keeps applying until a
/// newer one replaces it.
pub struct GameLoop {
    state: GameState,
    tick_interval: Duration,
    keypress: Option<KeyCode>,
    finished: bool,
}

impl GameLoop {
    pub fn new(height: TermInt, width: TermInt, tick_interval: Duration) -> Result<Self, GameError> {
        Ok(GameLoop {
            state: GameState::new(height, width)?,
            tick_interval,
            keypress: None,
            finished: false,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Keypress sink. Anything that isn't a direction is dropped here.
    pub fn on_keypress(&mut self, key: KeyCode) {
        if Direction::from_key(key).is_some() {
            self.keypress = Some(key);
        }
    }

    pub fn render<S: Screen + ?Sized>(&self, screen: &mut S) -> io::Result<()> {
        screen.draw_frame(&grid_to_string(&self.state.grid()))
    }

    pub fn tick<S: Screen + ?Sized>(&mut self, screen: &mut S) -> io::Result<TickOutcome> {
        let game_over = TickOutcome::GameOver { linger: Duration::from_millis(GAME_OVER_LINGER_MS) };

        if self.finished {
            return Ok(game_over);
        }

        self.state.set_direction(self.keypress);

        match self.state.step() {
            Crashed(collision) => {
                log::info!(
                    "{:?} at {:?} heading {:?}, length {}",
                    collision, self.state.head(), self.state.direction(), self.state.body().len()
                );
                self.finished = true;
                screen.show_game_over(GAME_OVER_MESSAGE)?;
                Ok(game_over)
            },
            Moved { .. } => {
                self.render(screen)?;
                Ok(TickOutcome::Running)
            },
        }
    }
}

///////////////////////////////////////////////////////////////////////////////

pub fn play(config: &Config) -> Result<()> {
    let mut game = GameLoop::new(config.height, config.width, config.tick_interval())?;

    let state = game.state();
    let viewport = (state.width().saturating_add(2), state.height().saturating_add(2));
    let mut term = TermManager::new(viewport);

    let needed = required_terminal_size(state);
    let available = term.get_terminal_size().context("Error reading terminal size")?;
    if available.0 < needed.0 || available.1 < needed.1 {
        return Err(GameError::TerminalTooSmall { needed, available }.into());
    }

    log::info!(
        "starting a {}x{} game, one step every {:?}",
        state.width(), state.height(), game.tick_interval()
    );

    with_terminal(&mut term, |term| run_session(&mut game, term))
}

/// The bordered field plus one row below it, wide enough for the game over
/// message.
fn required_terminal_size(state: &GameState) -> (TermInt, TermInt) {
    let message_width = GAME_OVER_MESSAGE.chars().count() as TermInt;
    let width = state.width().saturating_add(2).max(message_width);
    let height = state.height().saturating_add(3);

    (width, height)
}

/// Runs `session` with the terminal set up, restoring it afterwards whether
/// setup, the session, or neither failed. The first error wins.
fn with_terminal<T, R>(term: &mut T, session: impl FnOnce(&mut T) -> Result<R>) -> Result<R>
where
    T: Terminal,
{
    if let Err(e) = term.setup() {
        // Setup may have switched screens before failing
        if let Err(restore_err) = term.restore() {
            log::error!("could not restore the terminal: {}", restore_err);
        }
        return Err(anyhow::Error::new(e).context("Error setting up the terminal"));
    }

    let res = session(term);
    let restored = term.restore().context("Error restoring the terminal");
    let value = res?;
    restored?;
    Ok(value)
}

fn run_session(game: &mut GameLoop, term: &mut TermManager) -> Result<()> {
    term.draw_borders().context("Error drawing borders")?;
    game.render(term).context("Error drawing the grid")?;

    let mut next_tick = Instant::now() + game.tick_interval();

    loop {
        if wait_for_keys(term, next_tick, |key| game.on_keypress(key))? {
            log::info!("quit requested");
            return Ok(());
        }
        next_tick = next_deadline(next_tick, game.tick_interval(), Instant::now());

        match game.tick(term).context("Error drawing the grid")? {
            TickOutcome::Running => {},
            TickOutcome::GameOver { linger } => {
                // Only quitting matters from here on
                if wait_for_keys(term, Instant::now() + linger, |_| {})? {
                    log::info!("quit requested after game over");
                }
                return Ok(());
            },
        }
    }
}

/// Next tick time. After a stall the schedule restarts from `now` instead of
/// firing the missed ticks back to back.
fn next_deadline(prev: Instant, interval: Duration, now: Instant) -> Instant {
    (prev + interval).max(now)
}

/// Feeds direction keys to `on_steer` until `deadline`. Returns true as soon
/// as a quit key shows up.
fn wait_for_keys(term: &TermManager, deadline: Instant, mut on_steer: impl FnMut(KeyCode)) -> Result<bool> {
    loop {
        let now = Instant::now();
        if now >= deadline {
            return Ok(false);
        }

        let ev = term.poll_key(deadline - now).context("Error reading key events")?;
        match ev.as_ref().map(classify_key) {
            Some(KeyAction::Quit) => return Ok(true),
            Some(KeyAction::Steer(key)) => on_steer(key),
            Some(KeyAction::Ignore) | None => {},
        }
    }
}

/// Prints the starting grid, a blank line, and the grid after one step.
pub fn preview<W: Write>(config: &Config, out: &mut W) -> Result<()> {
    let mut state = GameState::new(config.height, config.width)?;

    writeln!(out, "{}", grid_to_string(&state.grid()))?;
    writeln!(out)?;
    if !state.step().is_moved() {
        log::warn!("preview step did not move the snake");
    }
    writeln!(out, "{}", grid_to_string(&state.grid()))?;

    Ok(())
}
