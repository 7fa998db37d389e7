use std::io::{self, Write};
use log::info;
use crossterm::{
    cursor::MoveTo,
    execute, queue,
    style::{Color, ResetColor, SetForegroundColor},
};

use crate::constants::{HEIGHT, WIDTH};
use crate::types::Vector2D;

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

    pub fn row(&self, y: u16) -> String {
        self.buffer
            .get(y as usize)
            .map(|row| row.iter().collect())
            .unwrap_or_default()
    }

    pub fn print_to_log(&self) {
        info!("--- Screen Buffer ---");
        for y in 0..self.height {
            info!("{}", self.row(y));
        }
        info!("---------------------");
    }
}

impl Write for ScreenBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = String::from_utf8_lossy(buf);
        self.write_str(&s);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
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
            OutputTarget::Stdout(s) => queue!(s, command),
            OutputTarget::ScreenBuffer(sb) => {
                sb.move_to(command.0, command.1);
                Ok(())
            }
        }
    }

    pub fn set_color(&mut self, color: Option<Color>) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => match color {
                Some(color) => queue!(s, SetForegroundColor(color)),
                None => queue!(s, ResetColor),
            },
            OutputTarget::ScreenBuffer(_) => Ok(()), // Colourless in debug mode
        }
    }

    pub fn execute_other_command(&mut self, command: impl crossterm::Command) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => execute!(s, command),
            OutputTarget::ScreenBuffer(_) => Ok(()), // Ignore in debug mode
        }
    }

    pub fn is_simulated(&self) -> bool {
        matches!(self, OutputTarget::ScreenBuffer(_))
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
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => s.flush(),
            OutputTarget::ScreenBuffer(sb) => sb.flush(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub color: Option<Color>,
}

impl Cell {
    pub const BLANK: Cell = Cell { ch: ' ', color: None };
}

// --- GameGrid: the 800x600 playfield projected onto terminal cells ---
pub struct GameGrid {
    pub grid: Vec<Vec<Cell>>,
    pub width: u16,
    pub height: u16,
}

impl GameGrid {
    pub fn new(width: u16, height: u16) -> Self {
        GameGrid {
            grid: vec![vec![Cell::BLANK; width as usize]; height as usize],
            width,
            height,
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.clear();
    }

    pub fn set_cell(&mut self, x: u16, y: u16, c: char, color: Color) {
        if y < self.height && x < self.width {
            self.grid[y as usize][x as usize] = Cell { ch: c, color: Some(color) };
        }
    }

    pub fn clear(&mut self) {
        self.grid = vec![vec![Cell::BLANK; self.width as usize]; self.height as usize];
    }

    fn column_of(&self, x: f64) -> i64 {
        (x * self.width as f64 / WIDTH).floor() as i64
    }

    fn row_of(&self, y: f64) -> i64 {
        (y * self.height as f64 / HEIGHT).floor() as i64
    }

    fn cell_center(&self, col: i64, row: i64) -> Vector2D {
        Vector2D::new(
            (col as f64 + 0.5) * WIDTH / self.width as f64,
            (row as f64 + 0.5) * HEIGHT / self.height as f64,
        )
    }

    fn in_bounds(&self, col: i64, row: i64) -> bool {
        col >= 0 && row >= 0 && col < self.width as i64 && row < self.height as i64
    }

    /// Fills every cell whose center lies within the circle, and always the cell under its center.
    pub fn fill_circle(&mut self, center: Vector2D, radius: f64, c: char, color: Color) {
        let (first_col, last_col) = (self.column_of(center.x - radius), self.column_of(center.x + radius));
        let (first_row, last_row) = (self.row_of(center.y - radius), self.row_of(center.y + radius));
        for row in first_row..=last_row {
            for col in first_col..=last_col {
                if self.in_bounds(col, row) && self.cell_center(col, row).distance(center) <= radius {
                    self.set_cell(col as u16, row as u16, c, color);
                }
            }
        }

        let (col, row) = (
            self.column_of(center.x).min(self.width as i64 - 1),
            self.row_of(center.y).min(self.height as i64 - 1),
        );
        if self.in_bounds(col, row) {
            self.set_cell(col as u16, row as u16, c, color);
        }
    }

    /// Fills every cell the rectangle overlaps. `top_left` is in playfield units.
    pub fn fill_rect(&mut self, top_left: Vector2D, width: f64, height: f64, c: char, color: Color) {
        let first_col = self.column_of(top_left.x);
        let first_row = self.row_of(top_left.y);
        let last_col = ((top_left.x + width) * self.width as f64 / WIDTH).ceil() as i64 - 1;
        let last_row = ((top_left.y + height) * self.height as f64 / HEIGHT).ceil() as i64 - 1;
        for row in first_row..=last_row.max(first_row) {
            for col in first_col..=last_col.max(first_col) {
                if self.in_bounds(col, row) {
                    self.set_cell(col as u16, row as u16, c, color);
                }
            }
        }
    }

    pub fn put_text(&mut self, x: u16, y: u16, text: &str, color: Color) {
        for (i, c) in text.chars().enumerate() {
            self.set_cell(x.saturating_add(i as u16), y, c, color);
        }
    }

    pub fn put_text_right(&mut self, margin: u16, y: u16, text: &str, color: Color) {
        let len = text.chars().count() as u16;
        let x = self.width.saturating_sub(len.saturating_add(margin));
        self.put_text(x, y, text, color);
    }

    pub fn put_text_centered(&mut self, y: u16, text: &str, color: Color) {
        let len = text.chars().count() as u16;
        let x = (self.width / 2).saturating_sub(len / 2);
        self.put_text(x, y, text, color);
    }

    pub fn render(&self, stdout: &mut OutputTarget) -> io::Result<()> {
        for y in 0..self.height {
            stdout.execute_move_to(MoveTo(0, y))?;
            let mut current: Option<Color> = None;
            stdout.set_color(None)?;
            let mut run = String::new();
            for cell in &self.grid[y as usize] {
                if cell.color != current && cell.ch != ' ' {
                    write!(stdout, "{}", run)?;
                    run.clear();
                    stdout.set_color(cell.color)?;
                    current = cell.color;
                }
                run.push(cell.ch);
            }
            write!(stdout, "{}", run)?;
        }
        stdout.set_color(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars_of(grid: &GameGrid, row: u16) -> String {
        grid.grid[row as usize].iter().map(|cell| cell.ch).collect()
    }

    #[test]
    fn tiny_circle_still_marks_its_cell() {
        let mut grid = GameGrid::new(80, 24);
        grid.fill_circle(Vector2D::new(405.0, 300.0), 1.0, '*', Color::Red);
        assert_eq!(grid.grid[12][40].ch, '*');
        let marked: usize = grid.grid.iter().flatten().filter(|cell| cell.ch == '*').count();
        assert_eq!(marked, 1);
    }

    #[test]
    fn circle_on_far_edge_is_clamped_into_grid() {
        let mut grid = GameGrid::new(80, 24);
        grid.fill_circle(Vector2D::new(WIDTH, HEIGHT), 5.0, '*', Color::Red);
        assert_eq!(grid.grid[23][79].ch, '*');
    }

    #[test]
    fn rect_covers_overlapped_cells() {
        // 10x25 playfield units per cell at 80x24.
        let mut grid = GameGrid::new(80, 24);
        grid.fill_rect(Vector2D::new(100.0, 100.0), 30.0, 30.0, '#', Color::Blue);
        assert_eq!(&chars_of(&grid, 4)[10..13], "###");
        assert_eq!(&chars_of(&grid, 5)[10..13], "###");
        assert_eq!(grid.grid[4][13].ch, ' ');
        assert_eq!(grid.grid[6][10].ch, ' ');
    }

    #[test]
    fn text_placement() {
        let mut grid = GameGrid::new(40, 10);
        grid.put_text(1, 0, "Score: 3", Color::White);
        grid.put_text_right(1, 0, "Level: 2", Color::White);
        grid.put_text_centered(5, "Game Over", Color::Red);
        assert!(chars_of(&grid, 0).starts_with(" Score: 3"));
        assert!(chars_of(&grid, 0).ends_with("Level: 2 "));
        assert_eq!(chars_of(&grid, 5).trim(), "Game Over");
        assert_eq!(chars_of(&grid, 5).find('G'), Some(16));
    }

    #[test]
    fn renders_into_screen_buffer() {
        let mut grid = GameGrid::new(20, 3);
        grid.put_text(0, 1, "hello", Color::White);
        let mut target = OutputTarget::ScreenBuffer(ScreenBuffer::new(20, 3));
        grid.render(&mut target).unwrap();
        match target {
            OutputTarget::ScreenBuffer(sb) => assert_eq!(sb.row(1).trim_end(), "hello"),
            OutputTarget::Stdout(_) => unreachable!(),
        }
    }
}
