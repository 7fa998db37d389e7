use std::time::Duration;

// --- Playfield ---
pub const WIDTH: f64 = 800.0;
pub const HEIGHT: f64 = 600.0;

// --- Avatar ---
pub const RADIUS: f64 = 10.0;
pub const BASE_SPEED: f64 = 5.0; // Units per frame
pub const START_X: f64 = 100.0;
pub const START_Y: f64 = 100.0;

// --- Bullets ---
pub const BULLET_RADIUS: f64 = 5.0;
pub const BULLET_SPEED: f64 = 7.0;
pub const INITIAL_BULLET_INTERVAL_MS: u64 = 1000;
pub const FAST_BULLETS_LEVEL: u32 = 3; // Interval starts shrinking here
pub const BULLET_INTERVAL_BASE_MS: u64 = 500;
pub const BULLET_INTERVAL_STEP_MS: u64 = 30; // Per level
pub const MIN_BULLET_INTERVAL_MS: u64 = 100;

// --- Power-up ---
pub const POWERUP_SIZE: f64 = 30.0;
pub const POWERUP_EDGE_MARGIN: i32 = 50;
pub const POWERUP_MIN_LEVEL: u32 = 3;
pub const POWERUP_SPEED_BONUS: f64 = 5.0;
pub const POWERUP_DURATION_MS: u64 = 5000;
pub const POWERUP_LEVEL_GAP: u32 = 2; // Levels between pickups
pub const POWERUP_CHANCE_PER_LEVEL: f64 = 0.01; // Per frame

// --- Scoring ---
pub const MS_PER_POINT: u64 = 1000;
pub const POINTS_PER_LEVEL: u32 = 10;

// --- Loop ---
pub const TARGET_FPS: u64 = 60;
pub const FRAME: Duration = Duration::from_micros(1_000_000 / TARGET_FPS);
pub const SIMULATED_FRAME_MS: u64 = 1000 / TARGET_FPS;
pub const HOLD_WINDOW_FRAMES: u64 = 8; // ~133 ms; spans the key-repeat gap but not the initial repeat delay

// --- Terminal / debug ---
pub const LOG_FILE: &str = "green-blob.log";
pub const DEBUG_DEFAULT_WIDTH: u16 = 80;
pub const DEBUG_DEFAULT_HEIGHT: u16 = 24;
