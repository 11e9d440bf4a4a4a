//! Keyboard cursor over the board.

use crate::types::GameAction;

/// A cell selection clamped to a `rows x cols` board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    row: i32,
    col: i32,
    rows: i32,
    cols: i32,
}

impl Cursor {
    /// Start in the middle of the board.
    pub fn new(rows: usize, cols: usize) -> Self {
        let rows = rows.max(1) as i32;
        let cols = cols.max(1) as i32;
        Self {
            row: rows / 2,
            col: cols / 2,
            rows,
            cols,
        }
    }

    pub fn row(&self) -> i32 {
        self.row
    }

    pub fn col(&self) -> i32 {
        self.col
    }

    pub fn pos(&self) -> (i32, i32) {
        (self.row, self.col)
    }

    /// Move by (dr, dc), stopping at the edges.
    pub fn shift(&mut self, dr: i32, dc: i32) {
        self.row = self.row.saturating_add(dr).clamp(0, self.rows - 1);
        self.col = self.col.saturating_add(dc).clamp(0, self.cols - 1);
    }

    /// Jump to a cell. Out-of-board positions are ignored.
    pub fn set(&mut self, row: i32, col: i32) -> bool {
        if row < 0 || col < 0 || row >= self.rows || col >= self.cols {
            return false;
        }
        self.row = row;
        self.col = col;
        true
    }

    /// Click action for the current cell.
    pub fn click(&self) -> GameAction {
        GameAction::Click {
            row: self.row,
            col: self.col,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_centered() {
        let c = Cursor::new(8, 8);
        assert_eq!(c.pos(), (4, 4));
    }

    #[test]
    fn test_shift_clamps_to_edges() {
        let mut c = Cursor::new(3, 5);
        c.shift(-10, -10);
        assert_eq!(c.pos(), (0, 0));
        c.shift(10, 10);
        assert_eq!(c.pos(), (2, 4));
        c.shift(0, -1);
        assert_eq!(c.pos(), (2, 3));
    }

    #[test]
    fn test_set_rejects_outside() {
        let mut c = Cursor::new(4, 4);
        assert!(!c.set(4, 0));
        assert!(!c.set(0, -1));
        assert!(c.set(3, 1));
        assert_eq!(c.click(), GameAction::Click { row: 3, col: 1 });
    }
}
