//! Board module - manages the tile grid
//!
//! The board is a `rows x cols` grid where each cell holds a tile or is empty.
//! Cells are only empty in the middle of a removal/collapse cycle; outside of
//! that every cell is occupied.
//! Uses a flat row-major vector for cache locality.
//! Coordinates: (row, col) where row 0 is the top; gravity pulls toward higher rows.

use arrayvec::ArrayVec;

use crate::rng::TileFactory;
use crate::types::{SpecialKind, Tile, TileColor, DEFAULT_PALETTE_SIZE};

/// A board cell (None = empty, pending refill)
pub type Cell = Option<Tile>;

/// 4-directional neighborhood used by grouping.
const DIRECTIONS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Generation parameters, injected at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardParams {
    pub rows: usize,
    pub cols: usize,
    pub palette_size: u8,
    /// Percent chance (0..=100) that a generated tile is special.
    pub special_tile_chance: u8,
}

impl Default for BoardParams {
    fn default() -> Self {
        Self {
            rows: crate::types::DEFAULT_ROWS as usize,
            cols: crate::types::DEFAULT_COLS as usize,
            palette_size: DEFAULT_PALETTE_SIZE,
            special_tile_chance: crate::types::DEFAULT_SPECIAL_TILE_CHANCE,
        }
    }
}

/// The game board
#[derive(Debug, Clone)]
pub struct Board {
    rows: usize,
    cols: usize,
    /// Flat array of cells, row-major order (row * cols + col)
    cells: Vec<Cell>,
    factory: TileFactory,
    revision: u64,
}

impl Board {
    /// Create a board and fill every cell.
    pub fn new(params: BoardParams, seed: u32) -> Self {
        let rows = params.rows.max(1);
        let cols = params.cols.max(1);
        let mut board = Self {
            rows,
            cols,
            cells: vec![None; rows * cols],
            factory: TileFactory::new(seed, params.palette_size, params.special_tile_chance),
            revision: 0,
        };
        board.generate();
        board
    }

    /// Build a board from a text layout, one string per row.
    ///
    /// `R B G Y P` are plain colors, `-` a row clear, `|` a column clear,
    /// `*` a radius clear and `.` an empty cell. Refills drawn later follow
    /// `palette_size` / `special_tile_chance`. Returns `None` for ragged rows
    /// or unknown characters.
    pub fn from_layout(
        layout: &[&str],
        palette_size: u8,
        special_tile_chance: u8,
        seed: u32,
    ) -> Option<Self> {
        let rows = layout.len();
        let cols = layout.first().map(|r| r.chars().count())?;
        if cols == 0 || layout.iter().any(|r| r.chars().count() != cols) {
            return None;
        }

        let mut factory = TileFactory::new(seed, palette_size, special_tile_chance);
        let mut cells = Vec::with_capacity(rows * cols);
        for (row, line) in layout.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                let (row, col) = (row as i32, col as i32);
                let cell = match ch {
                    '.' => None,
                    '-' => Some(Tile::special(
                        factory.allocate_id(),
                        row,
                        col,
                        SpecialKind::ClearRow,
                    )),
                    '|' => Some(Tile::special(
                        factory.allocate_id(),
                        row,
                        col,
                        SpecialKind::ClearColumn,
                    )),
                    '*' => Some(Tile::special(
                        factory.allocate_id(),
                        row,
                        col,
                        SpecialKind::ClearRadius,
                    )),
                    other => {
                        let color = color_from_char(other)?;
                        Some(Tile::new(factory.allocate_id(), row, col, color))
                    }
                };
                cells.push(cell);
            }
        }

        Some(Self {
            rows,
            cols,
            cells,
            factory,
            revision: 0,
        })
    }

    /// Calculate flat index from (row, col) coordinates
    #[inline(always)]
    fn index(&self, row: i32, col: i32) -> Option<usize> {
        if !self.is_inside(row, col) {
            return None;
        }
        Some(row as usize * self.cols + col as usize)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Check if (row, col) lies on the board
    pub fn is_inside(&self, row: i32, col: i32) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.rows && (col as usize) < self.cols
    }

    /// Tile at (row, col).
    /// Returns None if out of bounds or empty
    pub fn tile(&self, row: i32, col: i32) -> Option<&Tile> {
        self.index(row, col).and_then(|idx| self.cells[idx].as_ref())
    }

    /// Fill every cell with a freshly drawn tile, discarding what was there.
    pub fn generate(&mut self) {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let tile = self.factory.draw(row as i32, col as i32);
                self.cells[row * self.cols + col] = Some(tile);
            }
        }
        self.revision += 1;
    }

    /// In-bounds 4-directional neighbors of (row, col)
    pub fn neighbors(&self, row: i32, col: i32) -> ArrayVec<(i32, i32), 4> {
        let mut out = ArrayVec::new();
        for (dr, dc) in DIRECTIONS {
            let (r, c) = (row + dr, col + dc);
            if self.is_inside(r, c) {
                out.push((r, c));
            }
        }
        out
    }

    /// Connected same-color component containing (row, col).
    ///
    /// Returns an empty vector when the seed cell is empty or out of bounds.
    /// Order is traversal order and carries no meaning.
    pub fn find_group(&self, row: i32, col: i32) -> Vec<Tile> {
        let mut visited = vec![false; self.cells.len()];
        let mut stack = Vec::new();
        let mut group = Vec::new();
        self.flood(row, col, &mut visited, &mut stack, |tile| group.push(tile));
        group
    }

    /// Walk the same-color component at (row, col), marking `visited` and
    /// calling `visit` once per member. `visited` may carry marks from earlier
    /// walks; marked cells are skipped.
    fn flood(
        &self,
        row: i32,
        col: i32,
        visited: &mut [bool],
        stack: &mut Vec<(i32, i32)>,
        mut visit: impl FnMut(Tile),
    ) {
        let Some(start) = self.tile(row, col).copied() else {
            return;
        };

        stack.clear();
        stack.push((row, col));
        while let Some((r, c)) = stack.pop() {
            let Some(idx) = self.index(r, c) else {
                continue;
            };
            if visited[idx] {
                continue;
            }

            let Some(tile) = self.cells[idx] else {
                continue;
            };
            if tile.color != start.color {
                continue;
            }
            visited[idx] = true;
            visit(tile);

            for (nr, nc) in self.neighbors(r, c) {
                if let Some(nidx) = self.index(nr, nc) {
                    if !visited[nidx] {
                        stack.push((nr, nc));
                    }
                }
            }
        }
    }

    /// Empty the cells of the given tiles.
    ///
    /// A tile only clears its cell if it is still the occupant (matched by id),
    /// so stale or foreign tiles are ignored. Returns how many cells were emptied.
    pub fn remove_tiles(&mut self, tiles: &[Tile]) -> usize {
        let mut removed = 0;
        for tile in tiles {
            let Some(idx) = self.index(tile.row, tile.col) else {
                continue;
            };
            if self.cells[idx].map(|t| t.id) == Some(tile.id) {
                self.cells[idx] = None;
                removed += 1;
            }
        }
        if removed > 0 {
            self.revision += 1;
        }
        removed
    }

    /// Apply gravity per column and refill the gaps from the top.
    ///
    /// Surviving tiles keep their top-to-bottom order. New tiles are marked
    /// `is_new`. Returns every tile that moved or was spawned, column by column,
    /// bottom to top.
    pub fn collapse_and_fill(&mut self) -> Vec<Tile> {
        let mut changed = Vec::new();

        for col in 0..self.cols {
            // Two-pointer compaction from the bottom up.
            let mut write_row = self.rows;
            for read_row in (0..self.rows).rev() {
                let idx = read_row * self.cols + col;
                let Some(mut tile) = self.cells[idx] else {
                    continue;
                };
                write_row -= 1;
                if write_row != read_row {
                    self.cells[idx] = None;
                    tile.row = write_row as i32;
                    tile.col = col as i32;
                    self.cells[write_row * self.cols + col] = Some(tile);
                    changed.push(tile);
                }
            }

            // Remaining rows at the top get fresh tiles.
            for row in (0..write_row).rev() {
                let mut tile = self.factory.draw(row as i32, col as i32);
                tile.is_new = true;
                self.cells[row * self.cols + col] = Some(tile);
                changed.push(tile);
            }
        }

        if !changed.is_empty() {
            self.revision += 1;
        }
        changed
    }

    /// Clear the newly-spawned flag on every tile.
    pub fn settle_spawned(&mut self) {
        for tile in self.cells.iter_mut().flatten() {
            tile.is_new = false;
        }
    }

    /// Occupied tiles in row-major order
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.cells.iter().flatten()
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Number of empty cells
    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_none()).count()
    }

    pub fn is_full(&self) -> bool {
        self.empty_count() == 0
    }

    /// Whether a click can clear anything: any special tile, or any color group
    /// of at least `min_group` tiles.
    pub fn has_available_move(&self, min_group: usize) -> bool {
        if self.tiles().any(|t| t.is_special()) {
            return true;
        }
        let mut visited = vec![false; self.cells.len()];
        let mut stack = Vec::new();
        for idx in 0..self.cells.len() {
            if visited[idx] || self.cells[idx].is_none() {
                continue;
            }
            let (row, col) = ((idx / self.cols) as i32, (idx % self.cols) as i32);
            let mut size = 0;
            self.flood(row, col, &mut visited, &mut stack, |_| size += 1);
            if size >= min_group {
                return true;
            }
        }
        false
    }

    /// Bumped whenever tiles are generated, removed or relocated.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Write the grid as color codes (0 = empty, see [`TileColor::code`]).
    pub fn write_color_grid(&self, out: &mut Vec<u8>) {
        out.clear();
        out.extend(self.cells.iter().map(|c| c.map(|t| t.color.code()).unwrap_or(0)));
    }

    /// Get the current RNG state (for restarting game with same sequence)
    pub fn seed(&self) -> u32 {
        self.factory.seed()
    }

    /// Check that every occupied cell's tile records its own coordinates.
    pub fn positions_consistent(&self) -> bool {
        self.cells.iter().enumerate().all(|(idx, cell)| match cell {
            Some(t) => t.row as usize == idx / self.cols && t.col as usize == idx % self.cols,
            None => true,
        })
    }
}

fn color_from_char(ch: char) -> Option<TileColor> {
    match ch.to_ascii_uppercase() {
        'R' => Some(TileColor::Red),
        'B' => Some(TileColor::Blue),
        'G' => Some(TileColor::Green),
        'Y' => Some(TileColor::Yellow),
        'P' => Some(TileColor::Purple),
        _ => None,
    }
}
