//! GameView: maps a [`GameSnapshot`] (and optionally the animated scene)
//! into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::GameSnapshot;
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::presenter::{Motion, TerminalPresenter};
use crate::types::{GameStatus, SpecialKind, Tile, TileColor};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterStatusView {
    pub enabled: bool,
    pub port: u16,
    /// Commands applied from the adapter this session.
    pub commands: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorY {
    Center,
    Top,
}

/// Optional per-frame inputs beyond the snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameExtras<'a> {
    /// Draw tiles from the animated scene instead of the snapshot cells.
    pub scene: Option<&'a TerminalPresenter>,
    /// Keyboard cursor cell.
    pub cursor: Option<(i32, i32)>,
    pub adapter: Option<&'a AdapterStatusView>,
}

/// Screen placement of the board frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Layout {
    start_x: u16,
    start_y: u16,
    frame_w: u16,
    frame_h: u16,
}

const BOARD_BG: Rgb = Rgb::new(30, 30, 40);
const PANEL_BG: Rgb = Rgb::new(0, 0, 0);

/// A lightweight terminal renderer for the board.
pub struct GameView {
    /// Board cell width in terminal columns.
    cell_w: u16,
    /// Board cell height in terminal rows.
    cell_h: u16,
    anchor_y: AnchorY,
}

impl Default for GameView {
    fn default() -> Self {
        // 2x1 helps compensate for typical terminal glyph aspect ratio.
        Self {
            cell_w: 2,
            cell_h: 1,
            anchor_y: AnchorY::Center,
        }
    }
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
            anchor_y: AnchorY::Center,
        }
    }

    pub fn with_anchor_y(mut self, anchor_y: AnchorY) -> Self {
        self.anchor_y = anchor_y;
        self
    }

    fn layout(&self, rows: usize, cols: usize, viewport: Viewport) -> Layout {
        let frame_w = (cols as u16).saturating_mul(self.cell_w).saturating_add(2);
        let frame_h = (rows as u16).saturating_mul(self.cell_h).saturating_add(2);
        Layout {
            start_x: viewport.width.saturating_sub(frame_w) / 2,
            start_y: match self.anchor_y {
                AnchorY::Center => viewport.height.saturating_sub(frame_h) / 2,
                AnchorY::Top => 0,
            },
            frame_w,
            frame_h,
        }
    }

    /// Board cell under terminal position (x, y), if any.
    pub fn cell_at(
        &self,
        rows: usize,
        cols: usize,
        viewport: Viewport,
        x: u16,
        y: u16,
    ) -> Option<(i32, i32)> {
        let l = self.layout(rows, cols, viewport);
        let bx = x.checked_sub(l.start_x + 1)?;
        let by = y.checked_sub(l.start_y + 1)?;
        let col = (bx / self.cell_w) as usize;
        let row = (by / self.cell_h) as usize;
        (row < rows && col < cols).then_some((row as i32, col as i32))
    }

    /// Render the snapshot cells into an existing framebuffer.
    pub fn render_into(&self, snap: &GameSnapshot, viewport: Viewport, fb: &mut FrameBuffer) {
        self.render_frame_into(snap, FrameExtras::default(), viewport, fb);
    }

    /// Full frame: board, tiles (scene or snapshot), cursor, panel and prompts.
    ///
    /// Callers can reuse a framebuffer across frames and only resize when the
    /// terminal size changes.
    pub fn render_frame_into(
        &self,
        snap: &GameSnapshot,
        extras: FrameExtras<'_>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().cell(' '));

        let l = self.layout(snap.rows, snap.cols, viewport);
        let bg = CellStyle::new(Rgb::new(80, 80, 90), BOARD_BG);
        let border = CellStyle::new(Rgb::new(200, 200, 200), PANEL_BG);

        fb.fill_rect(
            l.start_x + 1,
            l.start_y + 1,
            l.frame_w.saturating_sub(2),
            l.frame_h.saturating_sub(2),
            ' ',
            bg,
        );
        let border_style = if snap.booster_active {
            CellStyle::new(Rgb::new(255, 140, 60), PANEL_BG).bold()
        } else {
            border
        };
        self.draw_border(fb, l, border_style);

        match extras.scene {
            Some(scene) => self.draw_scene(fb, l, snap, scene),
            None => {
                for tile in snap.cells.iter().flatten().filter(|t| !t.is_new) {
                    self.draw_tile(fb, l, tile.row, tile.col, tile, 1.0);
                }
            }
        }

        if let Some((row, col)) = extras.cursor {
            if row >= 0 && col >= 0 && (row as usize) < snap.rows && (col as usize) < snap.cols {
                self.draw_cursor(fb, l, row as u16, col as u16, snap.playable());
            }
        }

        self.draw_side_panel(fb, snap, extras.adapter, viewport, l);

        match snap.status {
            GameStatus::Won if snap.moves_remaining > 0 => {
                self.draw_overlay(fb, l, "YOU WIN!", "ESC play on  R restart")
            }
            GameStatus::Won => self.draw_overlay(fb, l, "YOU WIN!", "R restart"),
            GameStatus::Lost => self.draw_overlay(fb, l, "OUT OF MOVES", "R restart"),
            GameStatus::Playing => {}
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &GameSnapshot, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, viewport, &mut fb);
        fb
    }

    pub fn render_frame(
        &self,
        snap: &GameSnapshot,
        extras: FrameExtras<'_>,
        viewport: Viewport,
    ) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_frame_into(snap, extras, viewport, &mut fb);
        fb
    }

    fn draw_border(&self, fb: &mut FrameBuffer, l: Layout, style: CellStyle) {
        let (x, y, w, h) = (l.start_x, l.start_y, l.frame_w, l.frame_h);
        if w < 2 || h < 2 {
            return;
        }

        fb.put_char(x, y, '┌', style);
        fb.put_char(x + w - 1, y, '┐', style);
        fb.put_char(x, y + h - 1, '└', style);
        fb.put_char(x + w - 1, y + h - 1, '┘', style);

        for dx in 1..w - 1 {
            fb.put_char(x + dx, y, '─', style);
            fb.put_char(x + dx, y + h - 1, '─', style);
        }
        for dy in 1..h - 1 {
            fb.put_char(x, y + dy, '│', style);
            fb.put_char(x + w - 1, y + dy, '│', style);
        }
    }

    fn draw_scene(&self, fb: &mut FrameBuffer, l: Layout, snap: &GameSnapshot, scene: &TerminalPresenter) {
        // Fading tiles first so anything falling into their cell draws on top.
        for fading in [true, false] {
            for sprite in scene.sprites() {
                if matches!(sprite.motion, Motion::Removing { .. }) != fading {
                    continue;
                }
                let row = scene.draw_row(sprite).floor() as i32;
                if row < 0 || row as usize >= snap.rows {
                    continue;
                }
                self.draw_tile(fb, l, row, sprite.tile.col, &sprite.tile, scene.fade(sprite));
            }
        }
    }

    fn draw_tile(&self, fb: &mut FrameBuffer, l: Layout, row: i32, col: i32, tile: &Tile, fade: f32) {
        if row < 0 || col < 0 {
            return;
        }
        let (ch, mut style) = tile_glyph(tile);
        if fade < 1.0 {
            style.fg = style.fg.dimmed((fade * 100.0) as u16, 100);
            let ch = if fade > 0.5 { '▓' } else { '░' };
            self.fill_cell_rect(fb, l, col as u16, row as u16, ch, style);
            return;
        }
        self.fill_cell_rect(fb, l, col as u16, row as u16, ch, style);
    }

    fn draw_cursor(&self, fb: &mut FrameBuffer, l: Layout, row: u16, col: u16, active: bool) {
        let px = l.start_x + 1 + col * self.cell_w;
        let py = l.start_y + 1 + row * self.cell_h;
        let fg = if active {
            Rgb::new(255, 255, 255)
        } else {
            Rgb::new(120, 120, 120)
        };
        let bg = fb.get(px, py).map(|c| c.style.bg).unwrap_or(BOARD_BG);
        let style = CellStyle::new(fg, bg).bold();
        if self.cell_w >= 2 {
            fb.put_char(px, py, '[', style);
            fb.put_char(px + self.cell_w - 1, py, ']', style);
        } else {
            fb.put_char(px, py, '+', style);
        }
    }

    fn fill_cell_rect(&self, fb: &mut FrameBuffer, l: Layout, col: u16, row: u16, ch: char, style: CellStyle) {
        let px = l.start_x + 1 + col * self.cell_w;
        let py = l.start_y + 1 + row * self.cell_h;
        fb.fill_rect(px, py, self.cell_w, self.cell_h, ch, style);
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        adapter: Option<&AdapterStatusView>,
        viewport: Viewport,
        l: Layout,
    ) {
        let panel_x = l.start_x.saturating_add(l.frame_w).saturating_add(2);
        if panel_x >= viewport.width || viewport.width - panel_x < 12 {
            return;
        }

        let label = CellStyle::new(Rgb::new(220, 220, 220), PANEL_BG).bold();
        let value = CellStyle::new(Rgb::new(200, 200, 200), PANEL_BG);
        let dim = value.dim();

        let mut y = l.start_y;
        fb.put_str(panel_x, y, "MOVES", label);
        y += 1;
        let x = fb.put_u32(panel_x, y, snap.moves_remaining, value);
        let x = fb.put_str(x, y, "/", dim);
        fb.put_u32(x, y, snap.moves_total, dim);
        y += 2;

        fb.put_str(panel_x, y, "SCORE", label);
        y += 1;
        let x = fb.put_u32(panel_x, y, snap.score, value);
        let x = fb.put_str(x, y, "/", dim);
        fb.put_u32(x, y, snap.target_score, dim);
        y += 2;

        fb.put_str(panel_x, y, "BOMBS", label);
        let x = fb.put_u32(panel_x + 8, y, snap.bombs, value);
        fb.put_str(x + 1, y, "[B]", dim);
        y += 1;
        fb.put_str(panel_x, y, "REROLLS", label);
        let x = fb.put_u32(panel_x + 8, y, snap.rerolls, value);
        fb.put_str(x + 1, y, "[X]", dim);
        y += 1;
        if snap.booster_active {
            let armed = CellStyle::new(Rgb::new(255, 140, 60), PANEL_BG).bold();
            fb.put_str(panel_x, y, "BOMB ARMED", armed);
        }
        y += 1;
        if !snap.has_available_move && !snap.input_locked && snap.status == GameStatus::Playing {
            let warn = CellStyle::new(Rgb::new(240, 200, 80), PANEL_BG);
            fb.put_str(panel_x, y, "NO GROUPS", warn);
        }
        y += 2;

        fb.put_str(panel_x, y, "AI", label);
        y += 1;
        match adapter {
            Some(st) if st.enabled => {
                let x = fb.put_str(panel_x, y, "ON :", value);
                fb.put_u32(x, y, st.port as u32, value);
                y += 1;
                let x = fb.put_str(panel_x, y, "CMDS ", dim);
                fb.put_u32(x, y, st.commands, dim);
            }
            _ => {
                fb.put_str(panel_x, y, "OFF", value);
            }
        }
    }

    fn draw_overlay(&self, fb: &mut FrameBuffer, l: Layout, title: &str, hint: &str) {
        let mid_y = l.start_y.saturating_add(l.frame_h / 2);
        let style = CellStyle::new(Rgb::new(255, 255, 255), PANEL_BG).bold();
        let hint_style = CellStyle::new(Rgb::new(180, 180, 180), PANEL_BG);

        let center = |text: &str| {
            let w = text.chars().count() as u16;
            l.start_x.saturating_add(l.frame_w.saturating_sub(w) / 2)
        };
        fb.put_str(center(title), mid_y.saturating_sub(1), title, style);
        fb.put_str(center(hint), mid_y, hint, hint_style);
    }
}

/// Glyph and style for a tile at rest.
pub fn tile_glyph(tile: &Tile) -> (char, CellStyle) {
    if tile.is_special() {
        let ch = match tile.special {
            SpecialKind::ClearRow => '═',
            SpecialKind::ClearColumn => '║',
            SpecialKind::ClearRadius => '✦',
            SpecialKind::None => '?',
        };
        return (ch, CellStyle::new(Rgb::new(255, 255, 255), Rgb::new(90, 40, 110)).bold());
    }
    ('█', CellStyle::new(tile_rgb(tile.color), BOARD_BG))
}

pub fn tile_rgb(color: TileColor) -> Rgb {
    match color {
        TileColor::Red => Rgb::new(220, 80, 80),
        TileColor::Blue => Rgb::new(80, 120, 220),
        TileColor::Green => Rgb::new(100, 220, 120),
        TileColor::Yellow => Rgb::new(240, 220, 80),
        TileColor::Purple => Rgb::new(200, 120, 220),
        TileColor::Other => Rgb::new(230, 230, 230),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_at_maps_two_wide_cells() {
        let view = GameView::default();
        // 8x8 board -> 18x10 frame, centered in 18x10.
        let vp = Viewport::new(18, 10);
        assert_eq!(view.cell_at(8, 8, vp, 0, 0), None);
        assert_eq!(view.cell_at(8, 8, vp, 1, 1), Some((0, 0)));
        assert_eq!(view.cell_at(8, 8, vp, 2, 1), Some((0, 0)));
        assert_eq!(view.cell_at(8, 8, vp, 3, 1), Some((0, 1)));
        assert_eq!(view.cell_at(8, 8, vp, 16, 8), Some((7, 7)));
        assert_eq!(view.cell_at(8, 8, vp, 17, 8), None);
    }

    #[test]
    fn test_special_glyphs() {
        let row = Tile::special(1, 0, 0, SpecialKind::ClearRow);
        assert_eq!(tile_glyph(&row).0, '═');
        let plain = Tile::new(2, 0, 0, TileColor::Green);
        let (ch, style) = tile_glyph(&plain);
        assert_eq!(ch, '█');
        assert_eq!(style.fg, tile_rgb(TileColor::Green));
    }
}
