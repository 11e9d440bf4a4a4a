//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the application.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (core logic, terminal rendering, AI protocol).
//!
//! # Board Coordinates
//!
//! - **Row 0** is the top row, rows grow downward
//! - **Column 0** is the leftmost column
//! - Gravity moves tiles toward higher row indices
//!
//! Coordinates are signed so that neighborhood scans (radius clears, flood fill
//! neighbors) can step outside the board and be rejected by a bounds check
//! instead of wrapping.
//!
//! # Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Fixed timestep interval (~60 FPS) |
//! | `REMOVE_ANIM_MS` | 200 | Removal (shrink) animation per tile |
//! | `FALL_MS` | 250 | Time relocated tiles take to fall |
//! | `SPAWN_DELAY_MS` | 150 | Pause after the fall before spawning refills |
//! | `SETTLE_DELAY_MS` | 400 | `FALL_MS + SPAWN_DELAY_MS` |
//! | `REMOVAL_TIMEOUT_MS` | 2000 | Fallback when completion signals never arrive |
//!
//! # Examples
//!
//! ```
//! use tui_match3_types::{GameAction, SpecialKind, Tile, TileColor};
//!
//! let tile = Tile::new(7, 2, 3, TileColor::Green);
//! assert!(!tile.is_special());
//!
//! // Special identity overrides color matching.
//! let bomb = Tile::special(8, 0, 0, SpecialKind::ClearRadius);
//! assert_eq!(bomb.color, TileColor::Other);
//!
//! let action = GameAction::from_str("bomb").unwrap();
//! assert_eq!(action, GameAction::UseBomb);
//! ```

/// Default board rows.
pub const DEFAULT_ROWS: u16 = 8;

/// Default board columns.
pub const DEFAULT_COLS: u16 = 8;

/// Default move allotment per session.
pub const DEFAULT_MOVES: u32 = 20;

/// Default score needed to win.
pub const DEFAULT_TARGET_SCORE: u32 = 500;

/// Default number of plain colors in play.
pub const DEFAULT_PALETTE_SIZE: u8 = 5;

/// Default chance (percent) that a generated tile is special.
pub const DEFAULT_SPECIAL_TILE_CHANCE: u8 = 5;

/// Default Chebyshev radius of a `ClearRadius` special tile.
pub const DEFAULT_RADIUS_POWER: u32 = 1;

/// Default Chebyshev radius of the bomb booster.
pub const DEFAULT_RADIUS_BOOSTER_POWER: u32 = 5;

/// Default points per cleared tile (before the multiplier).
pub const DEFAULT_SCORE_BY_TILE: u32 = 5;

/// Default multiplier applied to per-tile points.
pub const DEFAULT_SCORE_MULTIPLIER: f64 = 1.5;

/// Default starting rerolls.
pub const DEFAULT_REROLL_COUNT: u32 = 3;

/// Default starting bombs.
pub const DEFAULT_BOMB_COUNT: u32 = 3;

/// Smallest plain group that can be cleared by a click.
pub const MIN_GROUP_SIZE: usize = 3;

/// Fixed timestep interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Removal animation length per tile.
pub const REMOVE_ANIM_MS: u32 = 200;

/// Fall animation length for relocated tiles.
pub const FALL_MS: u32 = 250;

/// Pause between the fall and the refill spawn.
pub const SPAWN_DELAY_MS: u32 = 150;

/// Delay between dispatching relocations and dispatching spawns.
pub const SETTLE_DELAY_MS: u32 = FALL_MS + SPAWN_DELAY_MS;

/// Upper bound on waiting for removal completion signals.
pub const REMOVAL_TIMEOUT_MS: u32 = 2000;

/// Tile colors.
///
/// `Other` is never drawn by the generator for plain tiles; it is the color
/// every special tile carries so specials never join a color group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileColor {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Other,
}

impl TileColor {
    /// Plain colors in palette order. A palette of size `n` uses the first `n`.
    pub const PALETTE: [TileColor; 5] = [
        TileColor::Red,
        TileColor::Blue,
        TileColor::Green,
        TileColor::Yellow,
        TileColor::Purple,
    ];

    /// Palette color by index, `None` past the end of the palette.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::PALETTE.get(index).copied()
    }

    /// Parse color from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "red" => Some(TileColor::Red),
            "blue" => Some(TileColor::Blue),
            "green" => Some(TileColor::Green),
            "yellow" => Some(TileColor::Yellow),
            "purple" => Some(TileColor::Purple),
            "other" => Some(TileColor::Other),
            _ => None,
        }
    }

    /// Convert to lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            TileColor::Red => "red",
            TileColor::Blue => "blue",
            TileColor::Green => "green",
            TileColor::Yellow => "yellow",
            TileColor::Purple => "purple",
            TileColor::Other => "other",
        }
    }

    /// Compact grid encoding used by snapshots: 1..=5 for the palette, 6 for `Other`.
    pub fn code(&self) -> u8 {
        match self {
            TileColor::Red => 1,
            TileColor::Blue => 2,
            TileColor::Green => 3,
            TileColor::Yellow => 4,
            TileColor::Purple => 5,
            TileColor::Other => 6,
        }
    }
}

/// Special tile kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SpecialKind {
    #[default]
    None,
    ClearRow,
    ClearColumn,
    ClearRadius,
}

impl SpecialKind {
    /// Kinds the generator draws from when a tile rolls special.
    pub const SPAWNABLE: [SpecialKind; 3] = [
        SpecialKind::ClearRow,
        SpecialKind::ClearColumn,
        SpecialKind::ClearRadius,
    ];

    pub fn is_special(&self) -> bool {
        !matches!(self, SpecialKind::None)
    }

    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" => Some(SpecialKind::None),
            "row" | "clearrow" => Some(SpecialKind::ClearRow),
            "column" | "clearcolumn" => Some(SpecialKind::ClearColumn),
            "radius" | "clearradius" => Some(SpecialKind::ClearRadius),
            _ => None,
        }
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            SpecialKind::None => "none",
            SpecialKind::ClearRow => "row",
            SpecialKind::ClearColumn => "column",
            SpecialKind::ClearRadius => "radius",
        }
    }
}

/// A tile occupying one board cell.
///
/// Tiles are plain values. `id` is unique per board and stays with the tile
/// while it falls, which is what the presentation layer keys animations on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    pub id: u32,
    pub row: i32,
    pub col: i32,
    pub color: TileColor,
    pub special: SpecialKind,
    /// Set on refill, cleared once the spawn has been handed to presentation.
    pub is_new: bool,
}

impl Tile {
    /// Create a plain tile
    pub fn new(id: u32, row: i32, col: i32, color: TileColor) -> Self {
        Self {
            id,
            row,
            col,
            color,
            special: SpecialKind::None,
            is_new: false,
        }
    }

    /// Create a special tile. Its color is always `Other`.
    pub fn special(id: u32, row: i32, col: i32, kind: SpecialKind) -> Self {
        Self {
            id,
            row,
            col,
            color: TileColor::Other,
            special: kind,
            is_new: false,
        }
    }

    pub fn is_special(&self) -> bool {
        self.special.is_special()
    }

    pub fn pos(&self) -> (i32, i32) {
        (self.row, self.col)
    }
}

/// Game actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameAction {
    /// Click the tile at (row, col).
    Click { row: i32, col: i32 },
    UseBomb,
    UseReroll,
    Restart,
    /// Close a win prompt and keep playing.
    Dismiss,
}

impl GameAction {
    /// Parse a payload-free action from string (for AI protocol).
    ///
    /// `click` carries coordinates and is built directly instead.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "bomb" | "usebomb" => Some(GameAction::UseBomb),
            "reroll" | "usereroll" => Some(GameAction::UseReroll),
            "restart" => Some(GameAction::Restart),
            "dismiss" => Some(GameAction::Dismiss),
            _ => None,
        }
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::Click { .. } => "click",
            GameAction::UseBomb => "bomb",
            GameAction::UseReroll => "reroll",
            GameAction::Restart => "restart",
            GameAction::Dismiss => "dismiss",
        }
    }
}

/// Session status as seen by the prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameStatus {
    #[default]
    Playing,
    Won,
    Lost,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Playing => "playing",
            GameStatus::Won => "won",
            GameStatus::Lost => "lost",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_special_tile_forces_other_color() {
        for kind in SpecialKind::SPAWNABLE {
            let tile = Tile::special(1, 0, 0, kind);
            assert_eq!(tile.color, TileColor::Other);
            assert!(tile.is_special());
        }
    }

    #[test]
    fn test_palette_indexing() {
        assert_eq!(TileColor::from_index(0), Some(TileColor::Red));
        assert_eq!(TileColor::from_index(4), Some(TileColor::Purple));
        assert_eq!(TileColor::from_index(5), None);
    }

    #[test]
    fn test_color_codes_are_distinct_and_nonzero() {
        let mut codes: Vec<u8> = TileColor::PALETTE.iter().map(|c| c.code()).collect();
        codes.push(TileColor::Other.code());
        assert!(codes.iter().all(|&c| c != 0));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 6);
    }

    #[test]
    fn test_action_parsing() {
        assert_eq!(GameAction::from_str("Bomb"), Some(GameAction::UseBomb));
        assert_eq!(GameAction::from_str("reroll"), Some(GameAction::UseReroll));
        assert_eq!(GameAction::from_str("restart"), Some(GameAction::Restart));
        assert_eq!(GameAction::from_str("click"), None);
        assert_eq!(GameAction::Click { row: 1, col: 2 }.as_str(), "click");
    }

    #[test]
    fn test_settle_delay_is_fall_plus_spawn() {
        assert_eq!(SETTLE_DELAY_MS, 400);
    }
}
