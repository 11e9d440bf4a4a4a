//! Terminal match-3 runner (default binary).
//!
//! Uses crossterm for input and the framebuffer renderer from `term`.
//! The loop runs at a fixed tick: render, poll input, apply adapter commands,
//! advance animations, forward finished removals, advance the resolver.

use std::fs::OpenOptions;
use std::sync::Mutex;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use crossterm::event::{self, Event};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tui_match3::adapter::{
    build_observation, create_ack, Adapter, AckStatus, InboundPayload, OutboundMessage, StateHash,
};
use tui_match3::core::{Game, GameConfig, GameSnapshot};
use tui_match3::input::{handle_key_event, handle_mouse_event, should_quit, Cursor, InputCommand};
use tui_match3::term::{
    AdapterStatusView, AnimTimings, FrameBuffer, FrameExtras, GameView, TerminalPresenter,
    TerminalRenderer, Viewport,
};
use tui_match3::types::{GameAction, TICK_MS};

const LOG_PATH_ENV: &str = "MATCH3_LOG_PATH";
const SEED_ENV: &str = "MATCH3_SEED";

fn main() -> Result<()> {
    init_logging()?;

    let config = GameConfig::load().context("invalid game configuration")?;
    let seed = seed_from_env()?;
    info!(seed, ?config, "starting");

    let adapter = match Adapter::start_from_env() {
        Ok(a) => a,
        Err(e) => {
            warn!(error = %e, "AI adapter unavailable");
            None
        }
    };

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, config, seed, adapter);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

/// Log to the file named by `MATCH3_LOG_PATH`; the terminal is in raw mode.
fn init_logging() -> Result<()> {
    let Some(path) = std::env::var(LOG_PATH_ENV).ok().filter(|p| !p.trim().is_empty()) else {
        return Ok(());
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path.trim())
        .with_context(|| format!("failed to open log file {path}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn seed_from_env() -> Result<u32> {
    match std::env::var(SEED_ENV) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid {SEED_ENV} {raw:?}")),
        _ => Ok(SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
            .unwrap_or(1)),
    }
}

fn run(
    term: &mut TerminalRenderer,
    config: GameConfig,
    seed: u32,
    mut adapter: Option<Adapter>,
) -> Result<()> {
    let mut game = Game::new(config, seed)?;
    let mut presenter = TerminalPresenter::new(AnimTimings::default());
    game.start(&mut presenter);

    let view = GameView::default();
    let mut cursor = Cursor::new(game.board().rows(), game.board().cols());
    let mut adapter_status = adapter.as_ref().map(|a| AdapterStatusView {
        enabled: true,
        port: a.local_addr().port(),
        commands: 0,
    });

    let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
    let mut fb = FrameBuffer::new(w, h);
    let mut snap = GameSnapshot::default();
    let mut completed: Vec<u32> = Vec::new();
    let mut obs_seq: u64 = 0;
    let mut last_hash: Option<StateHash> = None;

    let tick_duration = Duration::from_millis(TICK_MS as u64);
    let mut last_tick = Instant::now();

    loop {
        // Render.
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        let viewport = Viewport::new(w, h);
        game.snapshot_into(&mut snap);
        let extras = FrameExtras {
            scene: Some(&presenter),
            cursor: Some(cursor.pos()),
            adapter: adapter_status.as_ref(),
        };
        view.render_frame_into(&snap, extras, viewport, &mut fb);
        term.draw_swap(&mut fb)?;

        // Input with timeout until next tick.
        let timeout = tick_duration.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            let command = match event::read()? {
                Event::Key(key) => {
                    if should_quit(key) {
                        return Ok(());
                    }
                    handle_key_event(key)
                }
                Event::Mouse(mouse) => handle_mouse_event(mouse),
                Event::Resize(_, _) => {
                    term.invalidate();
                    None
                }
                _ => None,
            };

            match command {
                Some(InputCommand::MoveCursor { dr, dc }) => cursor.shift(dr, dc),
                Some(InputCommand::Activate) => {
                    game.apply_action(cursor.click(), &mut presenter);
                }
                Some(InputCommand::Pointer { x, y }) => {
                    if let Some((row, col)) =
                        view.cell_at(snap.rows, snap.cols, viewport, x, y)
                    {
                        cursor.set(row, col);
                        game.apply_action(GameAction::Click { row, col }, &mut presenter);
                    }
                }
                Some(InputCommand::Game(action)) => {
                    game.apply_action(action, &mut presenter);
                }
                None => {}
            }
        }

        // Adapter commands.
        if let Some(adapter) = adapter.as_mut() {
            while let Some(cmd) = adapter.try_recv() {
                match cmd.payload {
                    InboundPayload::Action(action) => {
                        let applied = game.apply_action(action, &mut presenter);
                        if let Some(st) = adapter_status.as_mut() {
                            st.commands = st.commands.saturating_add(1);
                        }
                        let status = if applied {
                            AckStatus::Ok
                        } else {
                            AckStatus::Ignored
                        };
                        adapter.send(OutboundMessage::ToClientAck {
                            client_id: cmd.client_id,
                            ack: create_ack(cmd.seq, status),
                        });
                    }
                    InboundPayload::SnapshotRequest => {
                        obs_seq += 1;
                        adapter.send(OutboundMessage::ToClientObservation {
                            client_id: cmd.client_id,
                            obs: build_observation(&game.snapshot(), obs_seq),
                        });
                    }
                }
            }
        }

        // Fixed-step simulation.
        let elapsed = last_tick.elapsed();
        if elapsed >= tick_duration {
            let ms = elapsed.as_millis().min(u32::MAX as u128) as u32;
            presenter.tick(ms, &mut completed);
            for id in completed.drain(..) {
                game.removal_complete(id, &mut presenter);
            }
            game.tick(ms, &mut presenter);
            last_tick = Instant::now();

            // Stream observations on change.
            if let Some(adapter) = adapter.as_ref() {
                let obs = build_observation(&game.snapshot(), obs_seq + 1);
                if last_hash != Some(obs.state_hash) {
                    obs_seq += 1;
                    last_hash = Some(obs.state_hash);
                    adapter.send(OutboundMessage::BroadcastObservation { obs });
                }
            }
        }
    }
}
