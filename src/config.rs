//! Playfield dimensions and gameplay tuning, plus the command line that
//! builds them.
//!
//! [`GameConfig`] is created once in `main` and handed by reference to the
//! round, the entity constructors and the front end. Nothing reads tuning
//! values from globals; `constants.rs` only supplies the defaults.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::{LevelFilter, warn};

use crate::constants::*;

/// Immutable gameplay configuration for one run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GameConfig {
    pub width: f64,
    pub height: f64,
    pub fps: u32,

    pub ship_acceleration: f64,
    pub ship_deceleration: f64,
    pub max_ship_speed: f64,
    pub ship_rotation_step: f64,
    pub gun_offset: f64,
    /// Side of the ship's square collision box.
    pub ship_hitbox: f64,

    pub bullet_speed: f64,
    pub bullet_width: f64,
    pub bullet_height: f64,

    pub initial_asteroid_count: usize,
    pub largest_size: u32,
    pub smallest_size: u32,
    pub fragment_lifetime: u32,
    pub split_child_count: usize,
    pub explosion_fragment_count: usize,
    /// Inclusive integer ranges drawn for every new asteroid.
    pub asteroid_speed_range: (u32, u32),
    pub asteroid_vertex_range: (u8, u8),
    pub explosion_speed_range: (u32, u32),
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::with_playfield(
            DEBUG_COLUMNS as f64 * CELL_WIDTH,
            DEBUG_ROWS as f64 * CELL_HEIGHT,
        )
    }
}

impl GameConfig {
    pub fn with_playfield(width: f64, height: f64) -> Self {
        GameConfig {
            width,
            height,
            fps: FPS,
            ship_acceleration: SHIP_ACCELERATION,
            ship_deceleration: SHIP_DECELERATION,
            max_ship_speed: MAX_SHIP_SPEED,
            ship_rotation_step: SHIP_ROTATION_STEP,
            gun_offset: GUN_OFFSET,
            ship_hitbox: SHIP_HITBOX,
            bullet_speed: BULLET_SPEED,
            bullet_width: BULLET_WIDTH,
            bullet_height: BULLET_HEIGHT,
            initial_asteroid_count: INITIAL_ASTEROID_COUNT,
            largest_size: LARGEST_SIZE,
            smallest_size: SMALLEST_SIZE,
            fragment_lifetime: FRAGMENT_LIFETIME,
            split_child_count: SPLIT_CHILD_COUNT,
            explosion_fragment_count: EXPLOSION_FRAGMENT_COUNT,
            asteroid_speed_range: ASTEROID_SPEED_RANGE,
            asteroid_vertex_range: ASTEROID_VERTEX_RANGE,
            explosion_speed_range: EXPLOSION_SPEED_RANGE,
        }
    }

    /// Playfield sized so every terminal cell covers `CELL_WIDTH x CELL_HEIGHT` units.
    pub fn for_terminal(columns: u16, rows: u16) -> Self {
        let (columns, rows) = usable_terminal_size(columns, rows);
        GameConfig::with_playfield(columns as f64 * CELL_WIDTH, rows as f64 * CELL_HEIGHT)
    }

    pub fn center(&self) -> crate::types::Vector2D {
        crate::types::Vector2D::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Some ptys report a 0x0 size; fall back to the debug grid so the playfield is never empty.
pub fn usable_terminal_size(columns: u16, rows: u16) -> (u16, u16) {
    if columns == 0 || rows == 0 {
        warn!("Terminal reported {}x{}, using {}x{}", columns, rows, DEBUG_COLUMNS, DEBUG_ROWS);
        (DEBUG_COLUMNS, DEBUG_ROWS)
    } else {
        (columns, rows)
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "vibe-asteroid", about = "Vector asteroids in the terminal")]
pub struct Cli {
    /// Run headless with scripted input, logging every frame instead of drawing it.
    #[arg(long)]
    pub debug: bool,

    /// Playfield width in game units (defaults to the terminal width times the cell scale).
    #[arg(long)]
    pub width: Option<f64>,

    /// Playfield height in game units.
    #[arg(long)]
    pub height: Option<f64>,

    /// Stop after this many ticks.
    #[arg(long)]
    pub frames: Option<u64>,

    /// Seed for the random source; omit for a fresh game every run.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Disable sound output.
    #[arg(long)]
    pub mute: bool,

    #[arg(long, default_value = "vibe-asteroid.log")]
    pub log_file: PathBuf,

    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

impl Cli {
    /// Builds the gameplay configuration for a terminal of `columns x rows`.
    /// Explicit `--width`/`--height` override the derived playfield.
    pub fn game_config(&self, columns: u16, rows: u16) -> GameConfig {
        let derived = GameConfig::for_terminal(columns, rows);
        let width = self.width.filter(|w| *w > 0.0).unwrap_or(derived.width);
        let height = self.height.filter(|h| *h > 0.0).unwrap_or(derived.height);
        GameConfig::with_playfield(width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_playfield_scales_by_cell_size() {
        let config = GameConfig::for_terminal(100, 40);
        assert_eq!(config.width, 800.0);
        assert_eq!(config.height, 640.0);
        assert_eq!(config.initial_asteroid_count, 5);
    }

    #[test]
    fn explicit_dimensions_override_terminal() {
        let cli = Cli::parse_from(["vibe-asteroid", "--width", "1024", "--seed", "7"]);
        let config = cli.game_config(80, 24);
        assert_eq!(config.width, 1024.0);
        assert_eq!(config.height, 384.0);
        assert_eq!(cli.seed, Some(7));
        assert_eq!(LevelFilter::from(cli.log_level), LevelFilter::Info);
    }

    #[test]
    fn zero_sized_terminal_falls_back_to_debug_grid() {
        let cli = Cli::parse_from(["vibe-asteroid"]);
        let config = cli.game_config(0, 0);
        assert_eq!((config.width, config.height), (640.0, 384.0));
        assert_eq!(cli.game_config(120, 0).height, 384.0);
        assert_eq!(usable_terminal_size(0, 30), (DEBUG_COLUMNS, DEBUG_ROWS));
        assert_eq!(usable_terminal_size(100, 30), (100, 30));
    }

    #[test]
    fn non_positive_dimensions_are_ignored() {
        let cli = Cli::parse_from(["vibe-asteroid", "--height", "0"]);
        assert_eq!(cli.game_config(80, 24).height, 384.0);
    }
}
