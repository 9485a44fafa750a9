use std::io::{self, Write};
use log::info;
use crossterm::{
    cursor::MoveTo,
    execute,
};

use crate::types::Vector2D;

/// Render sink for vector primitives in playfield coordinates.
pub trait Canvas {
    fn clear(&mut self);
    fn polygon(&mut self, points: &[Vector2D]);
    /// Outline of an axis-aligned rectangle centred on `center`.
    fn rect(&mut self, center: Vector2D, width: f64, height: f64);
    fn circle(&mut self, center: Vector2D, radius: f64);
    /// Text whose first character lands at `position`.
    fn text(&mut self, position: Vector2D, text: &str);
    /// Playfield size covered by the canvas.
    fn size(&self) -> (f64, f64);
    fn present(&mut self) -> io::Result<()>;

    /// Called when the output surface changes size. Playfield units are unaffected.
    fn resize(&mut self, _columns: u16, _rows: u16) {}

    /// Horizontal extent of `text` in playfield units.
    fn text_width(&self, text: &str) -> f64;

    /// Vertical distance between consecutive text lines.
    fn line_height(&self) -> f64;

    fn text_centered(&mut self, y: f64, text: &str) {
        let (width, _) = self.size();
        let x = (width - self.text_width(text)) / 2.0;
        self.text(Vector2D::new(x.max(0.0), y), text);
    }
}

// --- ScreenBuffer for simulated rendering ---
pub struct ScreenBuffer {
    pub buffer: Vec<Vec<char>>,
    pub width: u16,
    pub height: u16,
    pub cursor_x: u16,
    pub cursor_y: u16,
}

impl ScreenBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        ScreenBuffer {
            buffer: vec![vec![' '; width as usize]; height as usize],
            width,
            height,
            cursor_x: 0,
            cursor_y: 0,
        }
    }

    pub fn move_to(&mut self, x: u16, y: u16) {
        self.cursor_x = x;
        self.cursor_y = y;
    }

    pub fn write_char(&mut self, c: char) {
        if self.cursor_y < self.height && self.cursor_x < self.width {
            self.buffer[self.cursor_y as usize][self.cursor_x as usize] = c;
        }
    }

    pub fn write_str(&mut self, s: &str) {
        for c in s.chars() {
            self.write_char(c);
            self.cursor_x = self.cursor_x.saturating_add(1);
        }
    }

    pub fn clear(&mut self) {
        self.buffer = vec![vec![' '; self.width as usize]; self.height as usize];
        self.cursor_x = 0;
        self.cursor_y = 0;
    }

    pub fn row(&self, y: u16) -> String {
        self.buffer.get(y as usize).map(|row| row.iter().collect()).unwrap_or_default()
    }

    pub fn contains(&self, needle: &str) -> bool {
        (0..self.height).any(|y| self.row(y).contains(needle))
    }

    pub fn print_to_log(&self) {
        info!("--- Screen Buffer ---");
        for row in &self.buffer {
            info!("{}", row.iter().collect::<String>());
        }
        info!("---------------------");
    }
}

// --- OutputTarget enum to handle stdout or ScreenBuffer ---
pub enum OutputTarget {
    Stdout(io::Stdout),
    ScreenBuffer(ScreenBuffer),
}

impl OutputTarget {
    pub fn execute_move_to(&mut self, command: MoveTo) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => execute!(s, command),
            OutputTarget::ScreenBuffer(sb) => {
                sb.move_to(command.0, command.1);
                Ok(())
            },
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputTarget::Stdout(s) => s.write(buf),
            OutputTarget::ScreenBuffer(sb) => {
                let s = String::from_utf8_lossy(buf);
                sb.write_str(&s);
                Ok(buf.len())
            },
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => s.flush(),
            OutputTarget::ScreenBuffer(_) => Ok(()),
        }
    }
}

// --- GameGrid for geometric rendering ---
pub struct GameGrid {
    pub grid: Vec<Vec<char>>,
    pub width: u16,
    pub height: u16,
}

impl GameGrid {
    pub fn new(width: u16, height: u16) -> Self {
        GameGrid {
            grid: vec![vec![' '; width as usize]; height as usize],
            width,
            height,
        }
    }

    /// Out-of-range cells, including negative ones, are ignored.
    pub fn set_char(&mut self, x: i64, y: i64, c: char) {
        if (0..self.width as i64).contains(&x) && (0..self.height as i64).contains(&y) {
            self.grid[y as usize][x as usize] = c;
        }
    }

    pub fn put_str(&mut self, x: i64, y: i64, s: &str) {
        for (i, c) in s.chars().enumerate() {
            self.set_char(x + i as i64, y, c);
        }
    }

    pub fn char_at(&self, x: u16, y: u16) -> Option<char> {
        self.grid.get(y as usize).and_then(|row| row.get(x as usize)).copied()
    }

    pub fn clear(&mut self) {
        for row in &mut self.grid {
            row.fill(' ');
        }
    }

    /// Plots a segment between two cell positions, picking a glyph from its slope.
    pub fn line(&mut self, from: (f64, f64), to: (f64, f64)) {
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let glyph = line_glyph(dx, dy);
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as i64;
        for step in 0..=steps {
            let t = step as f64 / steps as f64;
            let x = (from.0 + dx * t).floor() as i64;
            let y = (from.1 + dy * t).floor() as i64;
            self.set_char(x, y, glyph);
        }
    }

    pub fn render(&self, stdout: &mut OutputTarget) -> io::Result<()> {
        for y in 0..self.height {
            stdout.execute_move_to(MoveTo(0, y))?;
            write!(stdout, "{}", self.grid[y as usize].iter().collect::<String>())?;
        }
        Ok(())
    }
}

fn line_glyph(dx: f64, dy: f64) -> char {
    // Cells are twice as tall as they are wide, so compare in visual units.
    let (ax, ay) = (dx.abs(), dy.abs() * 2.0);
    if ay < ax * 0.4 {
        '-'
    } else if ax < ay * 0.4 {
        '|'
    } else if (dx > 0.0) == (dy > 0.0) {
        '\\'
    } else {
        '/'
    }
}

/// Terminal-backed canvas: rasterises playfield geometry onto a character grid.
pub struct TerminalCanvas {
    pub grid: GameGrid,
    pub target: OutputTarget,
    playfield: (f64, f64),
}

impl TerminalCanvas {
    pub fn new(columns: u16, rows: u16, playfield: (f64, f64), target: OutputTarget) -> Self {
        TerminalCanvas {
            grid: GameGrid::new(columns, rows),
            target,
            playfield,
        }
    }

    fn units_per_cell(&self) -> (f64, f64) {
        (
            self.playfield.0 / self.grid.width.max(1) as f64,
            self.playfield.1 / self.grid.height.max(1) as f64,
        )
    }

    fn to_cell(&self, point: Vector2D) -> (f64, f64) {
        let (sx, sy) = self.units_per_cell();
        (point.x / sx, point.y / sy)
    }

    pub fn screen_buffer(&self) -> Option<&ScreenBuffer> {
        match &self.target {
            OutputTarget::ScreenBuffer(sb) => Some(sb),
            OutputTarget::Stdout(_) => None,
        }
    }
}

impl Canvas for TerminalCanvas {
    fn clear(&mut self) {
        self.grid.clear();
    }

    fn polygon(&mut self, points: &[Vector2D]) {
        let cells: Vec<(f64, f64)> = points.iter().map(|&p| self.to_cell(p)).collect();
        for (i, &from) in cells.iter().enumerate() {
            let to = cells[(i + 1) % cells.len()];
            self.grid.line(from, to);
        }
    }

    fn rect(&mut self, center: Vector2D, width: f64, height: f64) {
        let (sx, sy) = self.units_per_cell();
        if width < sx && height < sy {
            let (x, y) = self.to_cell(center);
            self.grid.set_char(x.floor() as i64, y.floor() as i64, '*');
            return;
        }
        let (hw, hh) = (width / 2.0, height / 2.0);
        self.polygon(&[
            Vector2D::new(center.x - hw, center.y - hh),
            Vector2D::new(center.x + hw, center.y - hh),
            Vector2D::new(center.x + hw, center.y + hh),
            Vector2D::new(center.x - hw, center.y + hh),
        ]);
    }

    fn circle(&mut self, center: Vector2D, radius: f64) {
        let (sx, sy) = self.units_per_cell();
        let (cx, cy) = self.to_cell(center);
        if radius * 2.0 < sx.min(sy) {
            self.grid.set_char(cx.floor() as i64, cy.floor() as i64, 'o');
            return;
        }
        let segments = 16;
        for i in 0..segments {
            let radians = (i as f64 / segments as f64) * std::f64::consts::TAU;
            let x = cx + radius * radians.cos() / sx;
            let y = cy + radius * radians.sin() / sy;
            self.grid.set_char(x.floor() as i64, y.floor() as i64, 'o');
        }
    }

    fn text(&mut self, position: Vector2D, text: &str) {
        let (x, y) = self.to_cell(position);
        self.grid.put_str(x.floor() as i64, y.floor() as i64, text);
    }

    fn size(&self) -> (f64, f64) {
        self.playfield
    }

    fn text_width(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.units_per_cell().0
    }

    fn line_height(&self) -> f64 {
        self.units_per_cell().1
    }

    fn resize(&mut self, columns: u16, rows: u16) {
        if columns == 0 || rows == 0 {
            return;
        }
        info!("Terminal resized to {}x{}", columns, rows);
        self.grid = GameGrid::new(columns, rows);
    }

    fn present(&mut self) -> io::Result<()> {
        match &mut self.target {
            OutputTarget::ScreenBuffer(sb) => {
                // Copy GameGrid to ScreenBuffer for logging
                sb.clear();
                for (y, row) in self.grid.grid.iter().enumerate() {
                    sb.move_to(0, y as u16);
                    sb.write_str(&row.iter().collect::<String>());
                }
                sb.print_to_log();
                Ok(())
            }
            OutputTarget::Stdout(_) => {
                self.grid.render(&mut self.target)?;
                self.target.flush()
            }
        }
    }
}

// --- Modal screens and HUD ---
const TITLE_ART: [&str; 5] = [
    r"    _   ___ _____ ___ ___  ___ ___ ___  ___ ",
    r"   /_\ / __|_   _| __| _ \/ _ \_ _|   \/ __|",
    r"  / _ \\__ \ | | | _||   / (_) | || |) \__ \",
    r" /_/ \_\___/ |_| |___|_|_\\___/___|___/|___/",
    r"",
];

const CONTROLS_TEXT: [&str; 5] = [
    "Up Arrow    : Thrust",
    "Left Arrow  : Rotate Left",
    "Right Arrow : Rotate Right",
    "Spacebar    : Fire",
    "q / Esc     : Quit",
];

pub fn draw_title_screen(canvas: &mut impl Canvas) -> io::Result<()> {
    canvas.clear();
    let (_, height) = canvas.size();
    let step = canvas.line_height();
    let mut y = height / 2.0 - step * (TITLE_ART.len() as f64 + 2.0);
    for line in TITLE_ART {
        canvas.text_centered(y, line);
        y += step;
    }
    canvas.text_centered(y, "Press any key to start");
    y += step * 2.0;
    for line in CONTROLS_TEXT {
        canvas.text_centered(y, line);
        y += step;
    }
    canvas.present()
}

pub fn draw_game_over_screen(canvas: &mut impl Canvas, score: u32) -> io::Result<()> {
    canvas.clear();
    let (_, height) = canvas.size();
    let step = canvas.line_height();
    canvas.text_centered(height / 2.0 - step * 2.0, "GAME OVER");
    canvas.text_centered(height / 2.0, &format!("Score: {}", score));
    canvas.text_centered(height / 2.0 + step * 2.0, "Press any key to restart");
    canvas.present()
}

pub fn draw_hud(canvas: &mut impl Canvas, score: u32) {
    canvas.text(Vector2D::new(0.0, 0.0), &format!("Score: {}", score));
}
