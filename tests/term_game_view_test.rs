//! GameView rendering tests

use tui_match3::core::{Board, Game, GameConfig, NullPresenter};
use tui_match3::term::{
    AdapterStatusView, AnimTimings, FrameBuffer, FrameExtras, GameView, TerminalPresenter,
    Viewport,
};
use tui_match3::types::GameStatus;

fn small_game() -> Game {
    let board = Board::from_layout(&["RRR", "GBY", "P-*"], 5, 0, 9).unwrap();
    Game::with_board(GameConfig::default(), board).unwrap()
}

fn screen(fb: &FrameBuffer) -> String {
    (0..fb.height())
        .map(|y| fb.row_text(y))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn test_border_wraps_board() {
    let snap = small_game().snapshot();
    // 3x3 board with 2-wide cells -> 8x5 frame.
    let fb = GameView::default().render(&snap, Viewport::new(8, 5));
    assert_eq!(fb.get(0, 0).unwrap().ch, '┌');
    assert_eq!(fb.get(7, 0).unwrap().ch, '┐');
    assert_eq!(fb.get(0, 4).unwrap().ch, '└');
    assert_eq!(fb.get(7, 4).unwrap().ch, '┘');
}

#[test]
fn test_tiles_are_two_columns_wide() {
    let snap = small_game().snapshot();
    let fb = GameView::default().render(&snap, Viewport::new(8, 5));
    assert_eq!(fb.get(1, 1).unwrap().ch, '█');
    assert_eq!(fb.get(2, 1).unwrap().ch, '█');
    // Specials on the bottom row.
    assert_eq!(fb.get(3, 3).unwrap().ch, '═');
    assert_eq!(fb.get(4, 3).unwrap().ch, '═');
    assert_eq!(fb.get(5, 3).unwrap().ch, '✦');
}

#[test]
fn test_side_panel_shows_counters_and_adapter() {
    let snap = small_game().snapshot();
    let adapter = AdapterStatusView {
        enabled: true,
        port: 7788,
        commands: 4,
    };
    let extras = FrameExtras {
        adapter: Some(&adapter),
        ..FrameExtras::default()
    };
    let fb = GameView::default().render_frame(&snap, extras, Viewport::new(40, 24));
    let text = screen(&fb);
    assert!(text.contains("MOVES"));
    assert!(text.contains("20/20"));
    assert!(text.contains("0/500"));
    assert!(text.contains("BOMBS"));
    assert!(text.contains("[X]"));
    assert!(text.contains("ON :7788"));
    assert!(text.contains("CMDS 4"));
}

#[test]
fn test_adapter_off_label() {
    let snap = small_game().snapshot();
    let fb = GameView::default().render(&snap, Viewport::new(40, 24));
    assert!(screen(&fb).contains("OFF"));
}

#[test]
fn test_win_and_lose_overlays() {
    let mut snap = small_game().snapshot();
    let view = GameView::default();
    let vp = Viewport::new(40, 24);

    snap.status = GameStatus::Won;
    let text = screen(&view.render(&snap, vp));
    assert!(text.contains("YOU WIN!"));
    assert!(text.contains("ESC"));

    snap.moves_remaining = 0;
    let text = screen(&view.render(&snap, vp));
    assert!(text.contains("YOU WIN!"));
    assert!(!text.contains("ESC"));

    snap.status = GameStatus::Lost;
    let text = screen(&view.render(&snap, vp));
    assert!(text.contains("OUT OF MOVES"));
}

#[test]
fn test_bomb_armed_label() {
    let mut game = small_game();
    game.use_bomb();
    let fb = GameView::default().render(&game.snapshot(), Viewport::new(40, 24));
    assert!(screen(&fb).contains("BOMB ARMED"));
}

#[test]
fn test_cursor_brackets() {
    let snap = small_game().snapshot();
    let extras = FrameExtras {
        cursor: Some((1, 1)),
        ..FrameExtras::default()
    };
    let fb = GameView::default().render_frame(&snap, extras, Viewport::new(8, 5));
    assert_eq!(fb.get(3, 2).unwrap().ch, '[');
    assert_eq!(fb.get(4, 2).unwrap().ch, ']');
}

#[test]
fn test_scene_hides_pending_spawns() {
    let mut game = small_game();
    let mut scene = TerminalPresenter::new(AnimTimings::instant());
    game.start(&mut scene);
    game.click(0, 0, &mut scene);
    let mut done = Vec::new();
    scene.tick(0, &mut done);
    for id in done.drain(..) {
        game.removal_complete(id, &mut scene);
    }

    // Top row is cleared and the refills have not been handed over yet.
    let snap = game.snapshot();
    let extras = FrameExtras {
        scene: Some(&scene),
        ..FrameExtras::default()
    };
    let fb = GameView::default().render_frame(&snap, extras, Viewport::new(8, 5));
    assert_eq!(fb.get(1, 1).unwrap().ch, ' ');

    game.settle(&mut NullPresenter);
    assert!(!game.input_locked());
}

#[test]
fn test_cell_at_matches_render_layout() {
    let view = GameView::default();
    let vp = Viewport::new(30, 9);
    // 3x3 board: 8x5 frame at x = 11, y = 2.
    assert_eq!(view.cell_at(3, 3, vp, 11, 2), None);
    assert_eq!(view.cell_at(3, 3, vp, 12, 3), Some((0, 0)));
    assert_eq!(view.cell_at(3, 3, vp, 17, 5), Some((2, 2)));
    assert_eq!(view.cell_at(3, 3, vp, 18, 5), None);
}
