// --- Timing ---
pub const FPS: u32 = 60;

// --- Ship ---
pub const SHIP_ACCELERATION: f64 = 0.1;
pub const SHIP_DECELERATION: f64 = 0.05;
pub const MAX_SHIP_SPEED: f64 = 5.0;
pub const SHIP_ROTATION_STEP: f64 = 5.0; // Degrees per tick
pub const SHIP_SIZE: f64 = 30.0; // Length of the hull triangle
pub const SHIP_HITBOX: f64 = 40.0;
pub const GUN_OFFSET: f64 = 30.0; // Bullets leave the wing tips, perpendicular to the heading
pub const GUN_MARKER_RADIUS: f64 = 3.0;

// --- Bullets ---
pub const BULLET_SPEED: f64 = 10.0;
pub const BULLET_WIDTH: f64 = 4.0;
pub const BULLET_HEIGHT: f64 = 10.0;

// --- Asteroids ---
pub const INITIAL_ASTEROID_COUNT: usize = 5;
pub const LARGEST_SIZE: u32 = 40;
pub const SMALLEST_SIZE: u32 = 10;
pub const FRAGMENT_LIFETIME: u32 = 30; // Frames
pub const EXPLOSION_FRAGMENT_COUNT: usize = 10;
pub const SPLIT_CHILD_COUNT: usize = 2;
pub const ASTEROID_SPEED_RANGE: (u32, u32) = (1, 3);
pub const EXPLOSION_SPEED_RANGE: (u32, u32) = (2, 5);
pub const ASTEROID_VERTEX_RANGE: (u8, u8) = (5, 8);

// --- Audio ---
pub const SAMPLE_RATE: u32 = 22_050;
pub const DEFAULT_MODULATION_HZ: f64 = 2.0;
pub const MOVE_TONE_HZ: f64 = 100.0;
pub const SHOOT_TONE_HZ: f64 = 880.0; // A5
pub const TONE_DURATION: f64 = 0.1;
pub const HIT_NOISE_DURATION: f64 = 0.3;
pub const HIT_NOISE_DEPTH: f64 = 0.2;

// --- Terminal front end ---
pub const CELL_WIDTH: f64 = 8.0; // Playfield units per terminal column
pub const CELL_HEIGHT: f64 = 16.0; // Playfield units per terminal row
pub const DEBUG_COLUMNS: u16 = 80;
pub const DEBUG_ROWS: u16 = 24;
// Without release events a key counts as held this long after each press or repeat.
// Covers a 25 Hz key-repeat interval at 60 fps.
pub const KEY_HOLD_GRACE_FRAMES: u32 = 4;
