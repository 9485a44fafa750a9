use std::collections::HashMap;
use std::io::{self, Write};
use std::time::Duration;
use crossterm::{
    cursor::{Hide, Show},
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{error, info};

use crate::constants::KEY_HOLD_GRACE_FRAMES;
use crate::entities::Controls;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Thrust,
    Fire,
    Other,
}

impl Key {
    fn from_code(code: KeyCode) -> Key {
        match code {
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Up => Key::Thrust,
            KeyCode::Char(' ') => Key::Fire,
            _ => Key::Other,
        }
    }
}

/// Discrete input delivered once per occurrence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Quit,
    KeyDown(Key),
    Resize { columns: u16, rows: u16 },
}

/// Where the game loop reads its input from.
pub trait InputSource {
    /// Drains every event that arrived since the previous call. Called once per tick.
    fn poll_events(&mut self) -> io::Result<Vec<InputEvent>>;

    /// Movement keys currently held down.
    fn held(&self) -> Controls;
}

fn is_quit(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Esc)
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

fn controls_from(held: impl Fn(Key) -> bool) -> Controls {
    Controls {
        left: held(Key::Left),
        right: held(Key::Right),
        thrust: held(Key::Thrust),
    }
}

// --- Live terminal input ---
pub struct TerminalInput {
    /// Terminal reports key releases, so held keys are tracked exactly.
    release_events: bool,
    /// Remaining ticks each key counts as held.
    held: HashMap<Key, u32>,
}

impl TerminalInput {
    pub fn new(release_events: bool) -> Self {
        info!("Terminal input ready (release events: {}).", release_events);
        TerminalInput { release_events, held: HashMap::new() }
    }

    fn press(&mut self, key: Key) {
        let ticks = if self.release_events { u32::MAX } else { KEY_HOLD_GRACE_FRAMES };
        self.held.insert(key, ticks);
    }

    fn age_held_keys(&mut self) {
        if self.release_events {
            return;
        }
        self.held.retain(|_, ticks| {
            *ticks = ticks.saturating_sub(1);
            *ticks > 0
        });
    }
}

impl InputSource for TerminalInput {
    fn poll_events(&mut self) -> io::Result<Vec<InputEvent>> {
        self.age_held_keys();
        let mut events = Vec::new();
        while event::poll(Duration::ZERO).map_err(|e| { error!("Failed to poll event: {}", e); e })? {
            match event::read().map_err(|e| { error!("Failed to read event: {}", e); e })? {
                Event::Key(key_event) => {
                    let key = Key::from_code(key_event.code);
                    match key_event.kind {
                        KeyEventKind::Press => {
                            if is_quit(&key_event) {
                                info!("Quit key pressed.");
                                events.push(InputEvent::Quit);
                            } else {
                                events.push(InputEvent::KeyDown(key));
                                self.press(key);
                            }
                        }
                        KeyEventKind::Repeat => self.press(key),
                        KeyEventKind::Release => {
                            self.held.remove(&key);
                        }
                    }
                }
                Event::Resize(columns, rows) => events.push(InputEvent::Resize { columns, rows }),
                _ => {}
            }
        }
        Ok(events)
    }

    fn held(&self) -> Controls {
        controls_from(|key| self.held.contains_key(&key))
    }
}

// --- SimulatedInput for debugging ---
pub struct SimulatedInput {
    events: HashMap<u64, Vec<Event>>,
    current_frame: Option<u64>,
    held: Vec<Key>,
}

impl SimulatedInput {
    pub fn new(events: HashMap<u64, Vec<Event>>) -> Self {
        SimulatedInput { events, current_frame: None, held: Vec::new() }
    }

    pub fn press(mut self, frame: u64, code: KeyCode) -> Self {
        self.events.entry(frame).or_default().push(Event::Key(code.into()));
        self
    }

    /// Presses `code` on every frame in `frames`, so it reads as held throughout.
    pub fn hold(mut self, frames: std::ops::Range<u64>, code: KeyCode) -> Self {
        for frame in frames {
            self = self.press(frame, code);
        }
        self
    }

    /// The script used by `--debug`: start, steer, thrust, fire, then quit.
    pub fn demo_script(quit_frame: u64) -> Self {
        SimulatedInput::new(HashMap::new())
            .press(0, KeyCode::Enter)
            .hold(2..40, KeyCode::Up)
            .hold(10..20, KeyCode::Left)
            .press(12, KeyCode::Char(' '))
            .hold(25..30, KeyCode::Right)
            .press(32, KeyCode::Char(' '))
            .press(quit_frame, KeyCode::Char('q'))
    }
}

impl InputSource for SimulatedInput {
    fn poll_events(&mut self) -> io::Result<Vec<InputEvent>> {
        let frame = self.current_frame.map_or(0, |f| f + 1);
        self.current_frame = Some(frame);
        self.held.clear();

        let mut events = Vec::new();
        for event in self.events.remove(&frame).unwrap_or_default() {
            match event {
                Event::Key(key_event) if is_quit(&key_event) => events.push(InputEvent::Quit),
                Event::Key(key_event) => {
                    let key = Key::from_code(key_event.code);
                    self.held.push(key);
                    events.push(InputEvent::KeyDown(key));
                }
                Event::Resize(columns, rows) => events.push(InputEvent::Resize { columns, rows }),
                _ => {}
            }
        }
        Ok(events)
    }

    fn held(&self) -> Controls {
        controls_from(|key| self.held.contains(&key))
    }
}

// --- Terminal session ---

/// Raw mode, alternate screen and hidden cursor for as long as the guard lives.
pub struct TerminalSession {
    release_events: bool,
}

impl TerminalSession {
    pub fn start() -> io::Result<Self> {
        info!("Attempting to enable raw mode.");
        enable_raw_mode().map_err(|e| { error!("Failed to enable raw mode: {}", e); e })?;
        // From here on every early return drops the guard and restores the terminal.
        let mut session = TerminalSession { release_events: false };
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, Hide)
            .map_err(|e| { error!("Failed to prepare screen: {}", e); e })?;
        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )
            .map_err(|e| { error!("Failed to enable key release events: {}", e); e })?;
            session.release_events = true;
        }
        info!("Raw mode enabled.");
        Ok(session)
    }

    pub fn release_events(&self) -> bool {
        self.release_events
    }

    pub fn size() -> io::Result<(u16, u16)> {
        terminal::size().map_err(|e| { error!("Failed to get terminal size: {}", e); e })
    }
}

/// Undoes the screen changes made by [`TerminalSession::start`]. Keyboard
/// enhancement flags are only popped when they were pushed.
fn restore_screen(out: &mut impl Write, release_events: bool) {
    if release_events {
        if let Err(e) = execute!(out, PopKeyboardEnhancementFlags) {
            error!("Failed to disable key release events: {}", e);
        }
    }
    if let Err(e) = execute!(out, Show, LeaveAlternateScreen) {
        error!("Failed to restore screen: {}", e);
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        restore_screen(&mut io::stdout(), self.release_events);
        if let Err(e) = disable_raw_mode() {
            error!("Failed to disable raw mode on exit: {}", e);
        }
        info!("Terminal restored.");
    }
}
