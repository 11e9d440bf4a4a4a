use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tui_match3::core::{Board, BoardParams, Game, GameConfig, NullPresenter};
use tui_match3::types::{GameAction, MIN_GROUP_SIZE};

fn bench_find_group(c: &mut Criterion) {
    let params = BoardParams {
        palette_size: 2,
        special_tile_chance: 0,
        ..BoardParams::default()
    };
    let board = Board::new(params, 12345);

    c.bench_function("find_group_8x8", |b| {
        b.iter(|| board.find_group(black_box(4), black_box(4)))
    });
}

fn bench_has_available_move(c: &mut Criterion) {
    let board = Board::new(BoardParams::default(), 12345);

    c.bench_function("has_available_move", |b| {
        b.iter(|| board.has_available_move(black_box(MIN_GROUP_SIZE)))
    });
}

fn bench_collapse_and_fill(c: &mut Criterion) {
    let template = Board::new(BoardParams::default(), 12345);

    c.bench_function("clear_column_and_refill", |b| {
        b.iter(|| {
            let mut board = template.clone();
            let column: Vec<_> = (0..8).filter_map(|r| board.tile(r, 3).copied()).collect();
            board.remove_tiles(&column);
            board.collapse_and_fill()
        })
    });
}

fn bench_bomb_click(c: &mut Criterion) {
    let mut presenter = NullPresenter;
    let mut game = Game::new(GameConfig::default(), 12345).unwrap();
    game.start(&mut presenter);

    c.bench_function("bomb_click_settle", |b| {
        b.iter(|| {
            // Keep the bomb supply topped up between iterations.
            if game.player().bombs() == 0 {
                game.restart(&mut presenter);
                game.settle(&mut presenter);
            }
            game.apply_action(GameAction::UseBomb, &mut presenter);
            game.apply_action(GameAction::Click { row: 4, col: 4 }, &mut presenter);
            game.settle(&mut presenter);
        })
    });
}

criterion_group!(
    benches,
    bench_find_group,
    bench_has_available_move,
    bench_collapse_and_fill,
    bench_bomb_click
);
criterion_main!(benches);
