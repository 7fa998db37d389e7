use crate::constants::*;
use crate::types::Vector2D;
use crate::rendering::GameGrid;
use crossterm::style::Color;
use rand::Rng;

/// Speed-boost pickup. `position` is the top-left corner of the square.
pub struct PowerUp {
    pub position: Vector2D,
    pub width: f64,
    pub height: f64,
    pub color: Color,
}

impl PowerUp {
    pub fn new(rng: &mut impl Rng) -> Self {
        let x = rng.gen_range(POWERUP_EDGE_MARGIN..=WIDTH as i32 - POWERUP_EDGE_MARGIN);
        let y = rng.gen_range(POWERUP_EDGE_MARGIN..=HEIGHT as i32 - POWERUP_EDGE_MARGIN);
        PowerUp::at(x as f64, y as f64)
    }

    pub fn at(x: f64, y: f64) -> Self {
        PowerUp {
            position: Vector2D::new(x, y),
            width: POWERUP_SIZE,
            height: POWERUP_SIZE,
            color: Color::Blue,
        }
    }

    pub fn center(&self) -> Vector2D {
        self.position.add(Vector2D::new(self.width / 2.0, self.height / 2.0))
    }

    /// The square collides as if it were a circle of radius `width / 2`.
    pub fn check_collision(&self, target_x: f64, target_y: f64, target_radius: f64) -> bool {
        self.center().distance(Vector2D::new(target_x, target_y)) < self.width / 2.0 + target_radius
    }

    pub fn draw(&self, game_grid: &mut GameGrid) {
        game_grid.fill_rect(self.position, self.width, self.height, '#', self.color);
    }
}

/// Power-up bookkeeping that outlives a run: spawn eligibility and the active speed boost.
#[derive(Clone, Debug)]
pub struct PowerUpState {
    pub eligible: bool,
    pub active: bool,
    pub activated_at_ms: u64,
    pub last_pickup_level: u32,
}

impl PowerUpState {
    pub fn new() -> Self {
        PowerUpState {
            eligible: false,
            active: false,
            activated_at_ms: 0,
            last_pickup_level: 0,
        }
    }

    pub fn activate(&mut self, level: u32, now_ms: u64) {
        self.active = true;
        self.eligible = false;
        self.last_pickup_level = level;
        self.activated_at_ms = now_ms;
    }

    pub fn has_expired(&self, now_ms: u64) -> bool {
        self.active && now_ms.saturating_sub(self.activated_at_ms) >= POWERUP_DURATION_MS
    }

    /// Rolls for eligibility; the last pickup must be `POWERUP_LEVEL_GAP` levels behind.
    /// Returns true when this roll made the power-up eligible.
    pub fn roll_eligibility(&mut self, level: u32, rng: &mut impl Rng) -> bool {
        if self.eligible || level.saturating_sub(self.last_pickup_level) < POWERUP_LEVEL_GAP {
            return false;
        }
        let chance = (POWERUP_CHANCE_PER_LEVEL * level as f64).min(1.0);
        if rng.gen_bool(chance) {
            self.eligible = true;
        }
        self.eligible
    }
}
