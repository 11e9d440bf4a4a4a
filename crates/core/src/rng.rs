//! RNG module - deterministic tile generation
//!
//! The board never touches a global random source. Every tile is drawn from a
//! [`TileFactory`] seeded at session start, so the same seed reproduces the same
//! board and the same refills (useful for tests and for replaying an AI session).
//!
//! Tile rule:
//! - color is uniform over the first `palette_size` palette colors
//! - independently, with `special_chance` percent the tile becomes special;
//!   its kind is uniform over row/column/radius and its color becomes `Other`

use crate::types::{SpecialKind, Tile, TileColor};

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    ///
    /// Maps through the high bits; the low bits of a power-of-two LCG cycle
    /// with short periods.
    pub fn next_range(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }

    /// True with `percent` percent probability (values >= 100 always hit).
    pub fn chance(&mut self, percent: u8) -> bool {
        self.next_range(100) < percent as u32
    }

    /// Current internal state (restarting from it continues the sequence).
    pub fn state(&self) -> u32 {
        self.state
    }
}

/// Draws fresh tiles and hands out board-unique ids.
#[derive(Debug, Clone)]
pub struct TileFactory {
    rng: SimpleRng,
    palette_size: u8,
    special_chance: u8,
    next_id: u32,
}

impl TileFactory {
    pub fn new(seed: u32, palette_size: u8, special_chance: u8) -> Self {
        Self {
            rng: SimpleRng::new(seed),
            palette_size: palette_size.clamp(1, TileColor::PALETTE.len() as u8),
            special_chance: special_chance.min(100),
            next_id: 1,
        }
    }

    /// Draw a new tile for (row, col)
    pub fn draw(&mut self, row: i32, col: i32) -> Tile {
        let id = self.allocate_id();
        let color_index = self.rng.next_range(self.palette_size as u32) as usize;
        let color = TileColor::from_index(color_index).unwrap_or(TileColor::Red);

        if self.rng.chance(self.special_chance) {
            let kinds = SpecialKind::SPAWNABLE;
            let kind = kinds[self.rng.next_range(kinds.len() as u32) as usize];
            return Tile::special(id, row, col, kind);
        }

        Tile::new(id, row, col, color)
    }

    /// Reserve an id without drawing (used when tiles are placed explicitly).
    pub fn allocate_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        id
    }

    pub fn palette_size(&self) -> u8 {
        self.palette_size
    }

    pub fn special_chance(&self) -> u8 {
        self.special_chance
    }

    /// Get the current RNG state (for restarting game with same sequence)
    pub fn seed(&self) -> u32 {
        self.rng.state()
    }
}

impl Default for TileFactory {
    fn default() -> Self {
        Self::new(
            1,
            crate::types::DEFAULT_PALETTE_SIZE,
            crate::types::DEFAULT_SPECIAL_TILE_CHANCE,
        )
    }
}
