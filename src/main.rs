mod constants;
mod entities;
mod game;
mod powerup;
mod rendering;
mod terminal_io;
mod types;

use std::collections::HashMap;
use std::env;
use std::io::{self, Write};
use crossterm::{
    cursor::{Hide, Show},
    event::{KeyCode, KeyEventKind, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    queue,
    terminal::{
        disable_raw_mode, enable_raw_mode, size, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use log::{error, info};

use crate::constants::*;
use crate::game::Game;
use crate::rendering::{OutputTarget, ScreenBuffer};
use crate::terminal_io::{key, SimulatedInput};

/// Scripted session for `--debug`: wander right and down, then quit.
fn debug_script() -> HashMap<u64, Vec<crossterm::event::Event>> {
    let mut sim_events = HashMap::new();
    sim_events.insert(1, vec![key(KeyCode::Right, KeyEventKind::Press)]);
    sim_events.insert(30, vec![key(KeyCode::Down, KeyEventKind::Press)]);
    sim_events.insert(90, vec![key(KeyCode::Right, KeyEventKind::Release), key(KeyCode::Down, KeyEventKind::Release)]);
    sim_events.insert(120, vec![key(KeyCode::Left, KeyEventKind::Press)]);
    sim_events.insert(180, vec![key(KeyCode::Left, KeyEventKind::Release)]);
    sim_events.insert(600, vec![key(KeyCode::Char('q'), KeyEventKind::Press)]); // Quit after 10 simulated seconds
    sim_events
}

fn main() -> io::Result<()> {
    if let Err(e) = simple_logging::log_to_file(LOG_FILE, log::LevelFilter::Info) {
        eprintln!("Could not open {}: {}", LOG_FILE, e);
    }
    info!("Starting green-blob.");

    let args: Vec<String> = env::args().collect();
    let debug_mode_active = args.len() > 1 && args[1] == "--debug";

    if debug_mode_active {
        info!("Debug mode enabled.");
        let mut debug_width = DEBUG_DEFAULT_WIDTH;
        let mut debug_height = DEBUG_DEFAULT_HEIGHT;
        if args.len() >= 4 {
            debug_width = args[2].parse::<u16>().unwrap_or(DEBUG_DEFAULT_WIDTH);
            debug_height = args[3].parse::<u16>().unwrap_or(DEBUG_DEFAULT_HEIGHT);
        }
        let max_frames = args.get(4).and_then(|arg| arg.parse::<u64>().ok());
        info!("Debug resolution set to {}x{}, frame limit {:?}", debug_width, debug_height, max_frames);

        let stdout_target = OutputTarget::ScreenBuffer(ScreenBuffer::new(debug_width, debug_height));
        let simulated_input = SimulatedInput::new(debug_script());
        let mut game = Game::new(debug_width, debug_height, stdout_target, Some(simulated_input), true, max_frames, true);
        let result = game.run();
        info!("Debug session finished. High score: {}", game.high_score());
        return result;
    }

    info!("Attempting to enable raw mode.");
    enable_raw_mode().map_err(|e| { error!("Failed to enable raw mode: {}", e); e })?;
    let mut keyboard_enhanced = false;
    let result = play_in_terminal(&mut keyboard_enhanced);

    // Restore the terminal whatever happened above.
    if let Err(e) = restore_terminal(&mut io::stdout(), keyboard_enhanced) {
        error!("Failed to restore terminal: {}", e);
    }
    let _ = disable_raw_mode();

    match &result {
        Ok(()) => info!("Exiting green-blob."),
        Err(e) => error!("Exiting green-blob after error: {}", e),
    }
    result
}

/// Undoes the setup in `play_in_terminal`. The keyboard flags are popped only if they were pushed.
fn restore_terminal<W: Write>(out: &mut W, keyboard_enhanced: bool) -> io::Result<()> {
    if keyboard_enhanced {
        queue!(out, PopKeyboardEnhancementFlags)?;
    }
    queue!(out, Show, LeaveAlternateScreen)?;
    out.flush()
}

fn play_in_terminal(keyboard_enhanced: &mut bool) -> io::Result<()> {
    let (terminal_width, terminal_height) = size().map_err(|e| { error!("Failed to get terminal size: {}", e); e })?;
    info!("Terminal size: {}x{}", terminal_width, terminal_height);

    let mut stdout_target = OutputTarget::Stdout(io::stdout());
    stdout_target
        .execute_other_command(EnterAlternateScreen)
        .map_err(|e| { error!("Failed to enter alternate screen: {}", e); e })?;
    stdout_target.execute_other_command(Hide).map_err(|e| { error!("Failed to hide cursor: {}", e); e })?;

    // Terminals without the keyboard protocol only send presses; held keys then lapse on a timer.
    let reports_releases = supports_keyboard_enhancement().unwrap_or(false);
    if reports_releases {
        stdout_target
            .execute_other_command(PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES))
            .map_err(|e| { error!("Failed to enable key release events: {}", e); e })?;
        *keyboard_enhanced = true;
    }
    info!("Key release events {}.", if reports_releases { "available" } else { "unavailable" });
    stdout_target.flush()?;

    let mut game = Game::new(terminal_width, terminal_height, stdout_target, None, false, None, reports_releases);
    let result = game.run();
    info!("Session high score: {}", game.high_score());
    result
}
