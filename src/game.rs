use std::io::{self, Write};
use std::time::{Duration, Instant};
use crossterm::{
    cursor::MoveTo,
    event::{self, Event},
    style::Color,
};
use rand::Rng;
use log::{debug, error, info};

use crate::constants::*;
use crate::entities::{Avatar, Bullet};
use crate::powerup::{PowerUp, PowerUpState};
use crate::rendering::{GameGrid, OutputTarget};
use crate::terminal_io::{Command, Flags, InputState, SimulatedInput};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GameStatus {
    Playing,
    GameOver,
}

/// Everything the game loop mutates. Times are milliseconds on the game clock.
pub struct GameState {
    pub avatar: Avatar,
    pub bullets: Vec<Bullet>,
    pub powerup: PowerUp,
    pub powerups: PowerUpState,
    pub speed: f64,
    pub score: u32,
    pub level: u32,
    pub bullet_interval_ms: u64,
    pub start_ms: u64,
    pub last_bullet_ms: u64,
    pub status: GameStatus,
}

impl GameState {
    pub fn new(now_ms: u64, rng: &mut impl Rng) -> Self {
        GameState {
            avatar: Avatar::new(START_X, START_Y),
            bullets: Vec::new(),
            powerup: PowerUp::new(rng),
            powerups: PowerUpState::new(),
            speed: BASE_SPEED,
            score: 0,
            level: 1,
            bullet_interval_ms: INITIAL_BULLET_INTERVAL_MS,
            start_ms: now_ms,
            last_bullet_ms: now_ms,
            status: GameStatus::Playing,
        }
    }

    /// The next run after a game over. Score, level, bullets, the avatar and the pickup square
    /// start over; bullet interval, speed and power-up bookkeeping carry across runs.
    pub fn restart(&self, now_ms: u64, rng: &mut impl Rng) -> Self {
        GameState {
            avatar: Avatar::new(START_X, START_Y),
            bullets: Vec::new(),
            powerup: PowerUp::new(rng),
            powerups: self.powerups.clone(),
            speed: self.speed,
            score: 0,
            level: 1,
            bullet_interval_ms: self.bullet_interval_ms,
            start_ms: now_ms,
            last_bullet_ms: now_ms,
            status: GameStatus::Playing,
        }
    }

    /// Advances the simulation by one frame, up to and including power-up expiry.
    /// Stops at the first bullet that hits the avatar.
    pub fn step(&mut self, flags: Flags, now_ms: u64, rng: &mut impl Rng) -> GameStatus {
        if self.status == GameStatus::GameOver {
            return self.status;
        }

        self.avatar.steer(flags.up, flags.down, flags.left, flags.right, self.speed);

        self.score = (now_ms.saturating_sub(self.start_ms) / MS_PER_POINT) as u32;

        if self.level >= FAST_BULLETS_LEVEL {
            self.bullet_interval_ms = bullet_interval_for(self.level);
        }

        if now_ms.saturating_sub(self.last_bullet_ms) >= self.bullet_interval_ms {
            let bullet = Bullet::new(self.avatar.position, rng);
            debug!(
                "Bullet spawned at ({:.1}, {:.1}) heading ({:.2}, {:.2})",
                bullet.position.x, bullet.position.y, bullet.velocity.x, bullet.velocity.y
            );
            self.bullets.push(bullet);
            self.last_bullet_ms = now_ms;
        }

        // Collision is checked before the bounds test, so a bullet can still hit on the frame it leaves.
        let avatar = &self.avatar;
        let mut hit = false;
        self.bullets.retain_mut(|bullet| {
            if hit {
                return true;
            }
            bullet.update();
            if bullet.check_collision(avatar.position.x, avatar.position.y, avatar.radius) {
                hit = true;
                return true;
            }
            bullet.is_on_screen()
        });
        if hit {
            self.status = GameStatus::GameOver;
            info!("Avatar hit at score {}, level {}.", self.score, self.level);
            return self.status;
        }

        if self.powerup_visible()
            && !self.powerups.active
            && self.powerup.check_collision(self.avatar.position.x, self.avatar.position.y, self.avatar.radius)
        {
            self.powerups.activate(self.level, now_ms);
            self.speed += POWERUP_SPEED_BONUS;
            self.powerup = PowerUp::new(rng);
            info!("Power-up collected at level {}. Speed is now {}.", self.level, self.speed);
        }

        if self.powerups.has_expired(now_ms) {
            self.powerups.active = false;
            self.speed = BASE_SPEED;
            info!("Power-up expired. Speed back to {}.", self.speed);
        }

        self.status
    }

    /// Post-render bookkeeping: power-up eligibility and level progression.
    pub fn end_frame(&mut self, rng: &mut impl Rng) {
        if self.powerups.roll_eligibility(self.level, rng) {
            info!("Power-up available at level {}.", self.level);
        }

        if self.score >= self.level * POINTS_PER_LEVEL {
            self.level += 1;
            info!("Level up: {} (score {}).", self.level, self.score);
        }
    }

    pub fn powerup_visible(&self) -> bool {
        self.powerups.eligible && self.level >= POWERUP_MIN_LEVEL
    }

    pub fn draw(&self, game_grid: &mut GameGrid) {
        for bullet in &self.bullets {
            bullet.draw(game_grid);
        }
        self.avatar.draw(game_grid);
        if self.powerup_visible() {
            self.powerup.draw(game_grid);
        }

        game_grid.put_text(1, 0, &format!("Score: {}", self.score), Color::White);
        game_grid.put_text_right(1, 0, &format!("Level: {}", self.level), Color::White);
    }
}

pub fn bullet_interval_for(level: u32) -> u64 {
    BULLET_INTERVAL_BASE_MS
        .saturating_sub(level as u64 * BULLET_INTERVAL_STEP_MS)
        .max(MIN_BULLET_INTERVAL_MS)
}

/// How a run or the game-over screen was left.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Exit {
    Quit,
    Hit,
    Restart,
}

pub struct Game {
    pub terminal_height: u16,
    pub stdout_target: OutputTarget,
    simulated_input: Option<SimulatedInput>,
    debug_mode_active: bool,
    max_frames: Option<u64>,
    input: InputState,
    game_grid: GameGrid,
    high_score: u32,
    frame_count: u64,
    started: Instant,
}

impl Game {
    pub fn new(
        terminal_width: u16,
        terminal_height: u16,
        stdout_target: OutputTarget,
        simulated_input: Option<SimulatedInput>,
        debug_mode_active: bool,
        max_frames: Option<u64>,
        reports_releases: bool,
    ) -> Self {
        Game {
            terminal_height,
            stdout_target,
            simulated_input,
            debug_mode_active,
            max_frames,
            input: InputState::new(reports_releases),
            game_grid: GameGrid::new(terminal_width, terminal_height),
            high_score: 0,
            frame_count: 0,
            started: Instant::now(),
        }
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn run(&mut self) -> io::Result<()> {
        let mut rng = rand::thread_rng();

        let mut state = GameState::new(self.now_ms(), &mut rng);
        loop {
            self.input.reset();
            info!("New run started. High score: {}.", self.high_score);

            if self.play(&mut state, &mut rng)? == Exit::Quit {
                break;
            }

            self.record_score(state.score);
            if self.show_game_over_screen(state.score)? == Exit::Quit {
                break;
            }
            info!("Restart requested.");
            state = state.restart(self.now_ms(), &mut rng);
        }

        info!("Leaving game loop after {} frames.", self.frame_count);
        Ok(())
    }

    fn play(&mut self, state: &mut GameState, rng: &mut impl Rng) -> io::Result<Exit> {
        loop {
            if self.frame_limit_reached() {
                return Ok(Exit::Quit);
            }
            let frame_start = Instant::now();
            let now = self.now_ms();

            for event in self.poll_events(Duration::ZERO)? {
                match self.input.apply(&event, self.frame_count) {
                    Some(Command::Quit) => {
                        info!("Quit requested during play.");
                        return Ok(Exit::Quit);
                    }
                    Some(Command::Resize(width, height)) => self.resize(width, height),
                    Some(Command::Restart) | None => {}
                }
            }

            let flags = self.input.flags(self.frame_count);
            if state.step(flags, now, rng) == GameStatus::GameOver {
                self.frame_count += 1;
                return Ok(Exit::Hit);
            }

            self.game_grid.clear();
            state.draw(&mut self.game_grid);
            self.render()?;

            state.end_frame(rng);

            self.frame_count += 1;
            self.pace(frame_start);
        }
    }

    fn record_score(&mut self, score: u32) {
        if score > self.high_score {
            info!("New high score: {} (was {}).", score, self.high_score);
            self.high_score = score;
        }
    }

    fn show_game_over_screen(&mut self, score: u32) -> io::Result<Exit> {
        info!("Game over. Score: {}, high score: {}.", score, self.high_score);

        let center_y = self.terminal_height / 2;
        self.game_grid.clear();
        self.game_grid.put_text_centered(center_y.saturating_sub(2), "Game Over", Color::Red);
        self.game_grid.put_text_centered(center_y.saturating_add(2), &format!("Score: {}", score), Color::White);
        self.game_grid.put_text_centered(
            center_y.saturating_add(4),
            &format!("High Score: {}", self.high_score),
            Color::White,
        );
        self.render()?;

        loop {
            if self.frame_limit_reached() {
                return Ok(Exit::Quit);
            }
            for event in self.poll_events(FRAME)? {
                match self.input.apply(&event, self.frame_count) {
                    Some(Command::Quit) => {
                        info!("Quit requested on game over screen.");
                        return Ok(Exit::Quit);
                    }
                    Some(Command::Restart) => return Ok(Exit::Restart),
                    Some(Command::Resize(width, height)) => self.resize(width, height),
                    None => {}
                }
            }
            self.frame_count += 1;
        }
    }

    fn poll_events(&mut self, timeout: Duration) -> io::Result<Vec<Event>> {
        let mut events = Vec::new();
        if let Some(sim_input) = &mut self.simulated_input {
            while sim_input.poll(self.frame_count)? {
                events.push(sim_input.read()?);
            }
            return Ok(events);
        }

        let mut wait = timeout;
        while event::poll(wait).map_err(|e| { error!("Failed to poll event: {}", e); e })? {
            events.push(event::read().map_err(|e| { error!("Failed to read event: {}", e); e })?);
            wait = Duration::ZERO;
        }
        Ok(events)
    }

    fn render(&mut self) -> io::Result<()> {
        self.game_grid
            .render(&mut self.stdout_target)
            .map_err(|e| { error!("Failed to render game grid: {}", e); e })?;
        self.stdout_target.execute_move_to(MoveTo(0, 0))?;
        self.stdout_target
            .flush()
            .map_err(|e| { error!("Failed to flush stdout after rendering: {}", e); e })?;

        if self.debug_mode_active {
            if let OutputTarget::ScreenBuffer(ref sb) = self.stdout_target {
                sb.print_to_log();
            }
        }
        Ok(())
    }

    fn resize(&mut self, width: u16, height: u16) {
        if self.stdout_target.is_simulated() {
            return;
        }
        self.terminal_height = height;
        self.game_grid.resize(width, height);
        info!("Terminal resized to {}x{}", width, height);
    }

    fn now_ms(&self) -> u64 {
        if self.debug_mode_active {
            self.frame_count * SIMULATED_FRAME_MS
        } else {
            self.started.elapsed().as_millis() as u64
        }
    }

    fn pace(&self, frame_start: Instant) {
        if self.debug_mode_active {
            return;
        }
        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }

    fn frame_limit_reached(&self) -> bool {
        self.max_frames.is_some_and(|max| self.frame_count >= max)
    }
}
