//! Animated terminal presenter.
//!
//! Keeps a sprite per tile id and animates removals and falls on the host's
//! clock. Removals answer [`RemovalAck::Pending`]; the ids whose fade has
//! finished are reported by [`TerminalPresenter::tick`] and must be forwarded
//! to the game as removal completion signals.

use std::collections::BTreeMap;

use crate::core::{Presenter, RemovalAck};
use crate::types::{Tile, FALL_MS, REMOVE_ANIM_MS, SPAWN_DELAY_MS};

/// Animation durations in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimTimings {
    pub remove_ms: u32,
    pub fall_ms: u32,
    /// Extra wait before a refill starts falling.
    pub spawn_delay_ms: u32,
}

impl Default for AnimTimings {
    fn default() -> Self {
        Self {
            remove_ms: REMOVE_ANIM_MS,
            fall_ms: FALL_MS,
            spawn_delay_ms: SPAWN_DELAY_MS,
        }
    }
}

impl AnimTimings {
    /// No animation at all; removals complete synchronously.
    pub const fn instant() -> Self {
        Self {
            remove_ms: 0,
            fall_ms: 0,
            spawn_delay_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Still,
    Falling { from_row: i32, elapsed: u32, delay: u32 },
    Removing { elapsed: u32 },
}

/// A tile as currently drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sprite {
    pub tile: Tile,
    pub motion: Motion,
}

#[derive(Debug, Clone, Default)]
pub struct TerminalPresenter {
    timings: AnimTimings,
    sprites: BTreeMap<u32, Sprite>,
}

impl TerminalPresenter {
    pub fn new(timings: AnimTimings) -> Self {
        Self {
            timings,
            sprites: BTreeMap::new(),
        }
    }

    pub fn timings(&self) -> AnimTimings {
        self.timings
    }

    pub fn sprites(&self) -> impl Iterator<Item = &Sprite> + '_ {
        self.sprites.values()
    }

    pub fn sprite(&self, id: u32) -> Option<&Sprite> {
        self.sprites.get(&id)
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    /// Any sprite still moving or fading.
    pub fn is_animating(&self) -> bool {
        self.sprites.values().any(|s| s.motion != Motion::Still)
    }

    /// Advance animations. Ids whose removal finished are appended to
    /// `completed` in ascending order.
    pub fn tick(&mut self, elapsed_ms: u32, completed: &mut Vec<u32>) {
        let timings = self.timings;
        let start = completed.len();
        for (id, sprite) in self.sprites.iter_mut() {
            let landed = match &mut sprite.motion {
                Motion::Still => false,
                Motion::Falling { elapsed, delay, .. } => {
                    *elapsed = elapsed.saturating_add(elapsed_ms);
                    *elapsed >= delay.saturating_add(timings.fall_ms)
                }
                Motion::Removing { elapsed } => {
                    *elapsed = elapsed.saturating_add(elapsed_ms);
                    if *elapsed >= timings.remove_ms {
                        completed.push(*id);
                    }
                    false
                }
            };
            if landed {
                sprite.motion = Motion::Still;
            }
        }
        for id in &completed[start..] {
            self.sprites.remove(id);
        }
    }

    /// Fractional row a sprite is drawn at.
    pub fn draw_row(&self, sprite: &Sprite) -> f32 {
        match sprite.motion {
            Motion::Falling {
                from_row,
                elapsed,
                delay,
            } => {
                if self.timings.fall_ms == 0 {
                    return sprite.tile.row as f32;
                }
                let t = elapsed.saturating_sub(delay) as f32 / self.timings.fall_ms as f32;
                let t = t.clamp(0.0, 1.0);
                from_row as f32 + (sprite.tile.row - from_row) as f32 * t
            }
            _ => sprite.tile.row as f32,
        }
    }

    /// Remaining opacity of a fading sprite, 1.0 for everything else.
    pub fn fade(&self, sprite: &Sprite) -> f32 {
        match sprite.motion {
            Motion::Removing { elapsed } if self.timings.remove_ms > 0 => {
                1.0 - (elapsed as f32 / self.timings.remove_ms as f32).clamp(0.0, 1.0)
            }
            _ => 1.0,
        }
    }

    fn place(&mut self, tile: &Tile, from_row: i32, delay: u32) {
        let motion = if from_row == tile.row || self.timings.fall_ms == 0 {
            Motion::Still
        } else {
            Motion::Falling {
                from_row,
                elapsed: 0,
                delay,
            }
        };
        let mut tile = *tile;
        tile.is_new = false;
        self.sprites.insert(tile.id, Sprite { tile, motion });
    }
}

impl Presenter for TerminalPresenter {
    fn create_tile(&mut self, tile: &Tile) {
        self.place(tile, tile.row, 0);
    }

    fn remove_tile(&mut self, tile: &Tile) -> RemovalAck {
        if self.timings.remove_ms == 0 {
            self.sprites.remove(&tile.id);
            return RemovalAck::Done;
        }
        self.sprites.insert(
            tile.id,
            Sprite {
                tile: *tile,
                motion: Motion::Removing { elapsed: 0 },
            },
        );
        RemovalAck::Pending
    }

    fn move_tile(&mut self, tile: &Tile) {
        let from_row = self
            .sprites
            .get(&tile.id)
            .map(|s| s.tile.row)
            .unwrap_or(tile.row);
        self.place(tile, from_row, 0);
    }

    fn spawn_new_tile(&mut self, tile: &Tile) {
        self.place(tile, -1, self.timings.spawn_delay_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TileColor;

    fn tile(id: u32, row: i32) -> Tile {
        Tile::new(id, row, 0, TileColor::Red)
    }

    #[test]
    fn test_removal_completes_after_fade() {
        let mut p = TerminalPresenter::new(AnimTimings::default());
        p.create_tile(&tile(1, 0));
        p.create_tile(&tile(2, 1));
        assert_eq!(p.remove_tile(&tile(2, 1)), RemovalAck::Pending);
        assert!(p.is_animating());

        let mut done = Vec::new();
        p.tick(REMOVE_ANIM_MS - 1, &mut done);
        assert!(done.is_empty());
        p.tick(1, &mut done);
        assert_eq!(done, vec![2]);
        assert!(p.sprite(2).is_none());
        assert_eq!(p.len(), 1);
    }

    #[test]
    fn test_instant_removal_is_synchronous() {
        let mut p = TerminalPresenter::new(AnimTimings::instant());
        p.create_tile(&tile(1, 0));
        assert_eq!(p.remove_tile(&tile(1, 0)), RemovalAck::Done);
        assert!(p.is_empty());
    }

    #[test]
    fn test_move_interpolates_from_previous_row() {
        let mut p = TerminalPresenter::new(AnimTimings {
            fall_ms: 100,
            ..AnimTimings::default()
        });
        p.create_tile(&tile(7, 1));
        p.move_tile(&tile(7, 3));
        let s = *p.sprite(7).unwrap();
        assert_eq!(p.draw_row(&s), 1.0);

        let mut done = Vec::new();
        p.tick(50, &mut done);
        let s = *p.sprite(7).unwrap();
        assert!((p.draw_row(&s) - 2.0).abs() < 1e-4);

        p.tick(50, &mut done);
        assert_eq!(p.sprite(7).unwrap().motion, Motion::Still);
    }

    #[test]
    fn test_spawn_waits_then_falls_from_above() {
        let mut p = TerminalPresenter::new(AnimTimings {
            remove_ms: 10,
            fall_ms: 100,
            spawn_delay_ms: 50,
        });
        let mut t = tile(9, 2);
        t.is_new = true;
        p.spawn_new_tile(&t);
        let s = *p.sprite(9).unwrap();
        assert!(!s.tile.is_new);
        assert_eq!(p.draw_row(&s), -1.0);

        let mut done = Vec::new();
        p.tick(50, &mut done);
        let s = *p.sprite(9).unwrap();
        assert_eq!(p.draw_row(&s), -1.0);
        p.tick(100, &mut done);
        assert!(!p.is_animating());
    }
}
