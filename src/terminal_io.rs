use std::collections::{HashMap, VecDeque};
use std::io;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::constants::HOLD_WINDOW_FRAMES;

// --- SimulatedInput for debugging ---
pub struct SimulatedInput {
    events: HashMap<u64, VecDeque<Event>>,
    current_frame: u64,
}

impl SimulatedInput {
    pub fn new(events: HashMap<u64, Vec<Event>>) -> Self {
        let events = events.into_iter().map(|(frame, list)| (frame, list.into())).collect();
        SimulatedInput { events, current_frame: 0 }
    }

    pub fn poll(&mut self, frame_count: u64) -> io::Result<bool> {
        self.current_frame = frame_count;
        Ok(self.events.get(&frame_count).is_some_and(|queue| !queue.is_empty()))
    }

    pub fn read(&mut self) -> io::Result<Event> {
        match self.events.get_mut(&self.current_frame).and_then(|queue| queue.pop_front()) {
            Some(event) => Ok(event),
            None => Ok(Event::Key(KeyCode::Null.into())),
        }
    }
}

/// Builds a key event of the given kind, for scripted input.
pub fn key(code: KeyCode, kind: KeyEventKind) -> Event {
    Event::Key(KeyEvent::new_with_kind(code, KeyModifiers::NONE, kind))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    fn from_key(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::Up => Some(Direction::Up),
            KeyCode::Down => Some(Direction::Down),
            KeyCode::Left => Some(Direction::Left),
            KeyCode::Right => Some(Direction::Right),
            _ => None,
        }
    }
}

/// One-shot actions that leave the input handler.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    Quit,
    Restart,
    Resize(u16, u16),
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Flags {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

/// Directional flags. Each held key maps to the frame it was last pressed or repeated.
/// Terminals that report releases clear a flag on release; the rest let it lapse after
/// `HOLD_WINDOW_FRAMES` frames of silence.
pub struct InputState {
    held: HashMap<Direction, u64>,
    reports_releases: bool,
}

impl InputState {
    pub fn new(reports_releases: bool) -> Self {
        InputState { held: HashMap::new(), reports_releases }
    }

    pub fn apply(&mut self, event: &Event, frame: u64) -> Option<Command> {
        match event {
            Event::Key(KeyEvent { code, modifiers, kind, .. }) => {
                if let Some(direction) = Direction::from_key(*code) {
                    match kind {
                        KeyEventKind::Press | KeyEventKind::Repeat => {
                            self.held.insert(direction, frame);
                        }
                        KeyEventKind::Release => {
                            self.held.remove(&direction);
                        }
                    }
                    return None;
                }
                if *kind != KeyEventKind::Press {
                    return None;
                }
                match code {
                    KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Command::Quit),
                    KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some(Command::Quit),
                    KeyCode::Enter => Some(Command::Restart),
                    _ => None,
                }
            }
            Event::Resize(width, height) => Some(Command::Resize(*width, *height)),
            _ => None,
        }
    }

    pub fn is_held(&self, direction: Direction, frame: u64) -> bool {
        match self.held.get(&direction) {
            Some(_) if self.reports_releases => true,
            Some(&last) => frame.saturating_sub(last) <= HOLD_WINDOW_FRAMES,
            None => false,
        }
    }

    pub fn flags(&self, frame: u64) -> Flags {
        Flags {
            up: self.is_held(Direction::Up, frame),
            down: self.is_held(Direction::Down, frame),
            left: self.is_held(Direction::Left, frame),
            right: self.is_held(Direction::Right, frame),
        }
    }

    pub fn reset(&mut self) {
        self.held.clear();
    }
}
