//! TCP server for the AI adapter
//!
//! Handles incoming connections and manages client lifecycle.
//! Uses tokio for async networking.

use std::hash::{Hash, Hasher};
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::{debug, info, warn};

use crate::core::GameSnapshot;
use crate::protocol::*;
use crate::runtime::{InboundCommand, InboundPayload, OutboundMessage};

/// Stable 64-bit FNV-1a hasher for `state_hash`.
///
/// `DefaultHasher` output is not guaranteed stable across Rust versions.
#[derive(Debug, Clone)]
struct Fnv1aHasher {
    state: u64,
}

impl Fnv1aHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= b as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_pending_commands: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7788,
            max_pending_commands: 10,
        }
    }
}

impl ServerConfig {
    /// Create from `MATCH3_AI_HOST`, `MATCH3_AI_PORT` and `MATCH3_AI_MAX_PENDING`.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();
        let host = lookup("MATCH3_AI_HOST")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.host);
        let port = match lookup("MATCH3_AI_PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("invalid MATCH3_AI_PORT {raw:?}"))?,
            None => defaults.port,
        };
        let max_pending_commands = match lookup("MATCH3_AI_MAX_PENDING") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("invalid MATCH3_AI_MAX_PENDING {raw:?}"))?,
            None => defaults.max_pending_commands,
        };
        Ok(Self {
            host,
            port,
            max_pending_commands,
        })
    }

    /// `MATCH3_AI_DISABLED` set to `1` or `true`.
    pub fn is_disabled() -> bool {
        std::env::var("MATCH3_AI_DISABLED")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid adapter address {}:{}", self.host, self.port))
    }
}

/// Handle to a connected client
struct ClientHandle {
    id: u64,
    stream_observations: bool,
    handshaken: bool,
    last_seq: Option<u64>,
    tx: mpsc::UnboundedSender<ClientOutbound>,
}

#[derive(Debug, Clone)]
enum ClientOutbound {
    Welcome(WelcomeMessage),
    Ack(AckMessage),
    Error(ErrorMessage),
    Observation(ObservationMessage),
}

/// Shared server state
#[derive(Default)]
struct ServerState {
    clients: RwLock<Vec<ClientHandle>>,
    controller: RwLock<Option<u64>>,
}

impl ServerState {
    async fn send_to(&self, client_id: u64, msg: ClientOutbound) {
        let clients = self.clients.read().await;
        if let Some(c) = clients.iter().find(|c| c.id == client_id) {
            let _ = c.tx.send(msg);
        }
    }

    async fn is_handshaken(&self, client_id: u64) -> bool {
        let clients = self.clients.read().await;
        clients
            .iter()
            .find(|c| c.id == client_id)
            .map(|c| c.handshaken)
            .unwrap_or(false)
    }

    /// Enforce strictly increasing `seq` per client.
    async fn check_and_update_seq(&self, client_id: u64, seq: u64) -> bool {
        let mut clients = self.clients.write().await;
        let Some(client) = clients.iter_mut().find(|c| c.id == client_id) else {
            return true;
        };
        match client.last_seq {
            Some(prev) if seq <= prev => false,
            _ => {
                client.last_seq = Some(seq);
                true
            }
        }
    }

    async fn controller(&self) -> Option<u64> {
        *self.controller.read().await
    }
}

/// Start the TCP server.
///
/// The bound address is reported on `ready_tx` once listening.
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let bound = listener.local_addr()?;
    info!(%bound, "adapter listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState::default());

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                match msg {
                    OutboundMessage::ToClientAck { client_id, ack } => {
                        state.send_to(client_id, ClientOutbound::Ack(ack)).await
                    }
                    OutboundMessage::ToClientError { client_id, err } => {
                        state.send_to(client_id, ClientOutbound::Error(err)).await
                    }
                    OutboundMessage::ToClientObservation { client_id, obs } => {
                        state
                            .send_to(client_id, ClientOutbound::Observation(obs))
                            .await
                    }
                    OutboundMessage::BroadcastObservation { obs } => {
                        let clients = state.clients.read().await;
                        for c in clients.iter().filter(|c| c.stream_observations) {
                            let _ = c.tx.send(ClientOutbound::Observation(obs.clone()));
                        }
                    }
                }
            }
        });
    }

    let mut next_client_id = 0u64;
    loop {
        let (socket, peer) = listener.accept().await?;
        next_client_id += 1;
        let client_id = next_client_id;
        info!(client_id, %peer, "client connected");

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, client_id, state, command_tx).await {
                warn!(client_id, error = %e, "client error");
            }
            info!(client_id, "client disconnected");
        });
    }
}

async fn write_json<T: Serialize>(
    writer: &mut (impl AsyncWriteExt + Unpin),
    buf: &mut Vec<u8>,
    value: &T,
) -> std::io::Result<()> {
    buf.clear();
    serde_json::to_writer(&mut *buf, value)?;
    buf.push(b'\n');
    writer.write_all(buf).await?;
    writer.flush().await
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    client_id: u64,
    state: Arc<ServerState>,
    command_tx: mpsc::Sender<InboundCommand>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);

    let (tx, mut rx) = mpsc::unbounded_channel::<ClientOutbound>();
    state.clients.write().await.push(ClientHandle {
        id: client_id,
        stream_observations: false,
        handshaken: false,
        last_seq: None,
        tx: tx.clone(),
    });

    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(4096);
        while let Some(msg) = rx.recv().await {
            let res = match &msg {
                ClientOutbound::Welcome(m) => write_json(&mut writer, &mut buf, m).await,
                ClientOutbound::Ack(m) => write_json(&mut writer, &mut buf, m).await,
                ClientOutbound::Error(m) => write_json(&mut writer, &mut buf, m).await,
                ClientOutbound::Observation(m) => write_json(&mut writer, &mut buf, m).await,
            };
            if res.is_err() {
                break;
            }
        }
    });

    let reply_error = |seq: u64, code: ErrorCode, message: &str| {
        let _ = tx.send(ClientOutbound::Error(create_error(seq, code, message)));
    };

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let msg = match parse_message(trimmed) {
            Ok(msg) => msg,
            Err(e) => {
                let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                debug!(client_id, error = %e, "unparseable message");
                reply_error(seq, ErrorCode::InvalidCommand, &format!("invalid message: {e}"));
                continue;
            }
        };

        let seq = msg.seq();
        let handshaken = state.is_handshaken(client_id).await;
        if !handshaken && !matches!(msg, ClientMessage::Hello(_)) {
            reply_error(seq, ErrorCode::HandshakeRequired, "Send hello first");
            continue;
        }
        if handshaken && !state.check_and_update_seq(client_id, seq).await {
            reply_error(seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
            continue;
        }

        match msg {
            ClientMessage::Hello(hello) => {
                if !hello.protocol_version.starts_with("1.") {
                    reply_error(
                        seq,
                        ErrorCode::ProtocolMismatch,
                        &format!("Protocol version {} not supported", hello.protocol_version),
                    );
                    break;
                }

                // First client to hello becomes controller.
                let role = {
                    let mut controller = state.controller.write().await;
                    let mut clients = state.clients.write().await;
                    if let Some(c) = clients.iter_mut().find(|c| c.id == client_id) {
                        c.handshaken = true;
                        c.last_seq = Some(seq);
                        c.stream_observations = hello.requested.stream_observations;
                    }
                    match *controller {
                        None => {
                            *controller = Some(client_id);
                            AssignedRole::Controller
                        }
                        Some(id) if id == client_id => AssignedRole::Controller,
                        Some(_) => AssignedRole::Observer,
                    }
                };
                info!(client_id, name = %hello.client.name, ?role, "handshake complete");
                let _ = tx.send(ClientOutbound::Welcome(create_welcome(seq, client_id, role)));

                let _ = command_tx.try_send(InboundCommand {
                    client_id,
                    seq,
                    payload: InboundPayload::SnapshotRequest,
                });
            }

            ClientMessage::Command(cmd) => {
                if state.controller().await != Some(client_id) {
                    reply_error(seq, ErrorCode::NotController, "Only controller may send commands");
                    continue;
                }
                let action = match cmd.to_action() {
                    Ok(a) => a,
                    Err((code, message)) => {
                        reply_error(seq, code, &message);
                        continue;
                    }
                };
                // Ack is sent by the game loop once the action is applied.
                if command_tx
                    .try_send(InboundCommand {
                        client_id,
                        seq,
                        payload: InboundPayload::Action(action),
                    })
                    .is_err()
                {
                    reply_error(seq, ErrorCode::Backpressure, "Command queue is full");
                }
            }

            ClientMessage::Control(ctrl) => {
                let mut controller = state.controller.write().await;
                match ctrl.action {
                    ControlAction::Claim => match *controller {
                        None => {
                            *controller = Some(client_id);
                            let _ = tx.send(ClientOutbound::Ack(create_ack(seq, AckStatus::Ok)));
                        }
                        Some(id) if id == client_id => {
                            let _ = tx.send(ClientOutbound::Ack(create_ack(seq, AckStatus::Ignored)));
                        }
                        Some(_) => {
                            reply_error(seq, ErrorCode::ControllerActive, "Controller already assigned")
                        }
                    },
                    ControlAction::Release => {
                        if *controller == Some(client_id) {
                            *controller = None;
                            let _ = tx.send(ClientOutbound::Ack(create_ack(seq, AckStatus::Ok)));
                        } else {
                            reply_error(seq, ErrorCode::NotController, "Only controller may release");
                        }
                    }
                }
            }
        }
    }

    // Remove the client; hand control to the lowest remaining handshaken id.
    {
        let mut controller = state.controller.write().await;
        let mut clients = state.clients.write().await;
        clients.retain(|c| c.id != client_id);
        if *controller == Some(client_id) {
            *controller = clients.iter().filter(|c| c.handshaken).map(|c| c.id).min();
            match *controller {
                Some(new_id) => info!(new_id, "controller promoted"),
                None => info!(client_id, "controller released"),
            }
        }
    }

    drop(tx);
    let _ = write_task.await;
    Ok(())
}

/// Build an observation from a game snapshot.
pub fn build_observation(snap: &GameSnapshot, seq: u64) -> ObservationMessage {
    let mut colors = vec![vec![0u8; snap.cols]; snap.rows];
    let mut specials = vec![vec![0u8; snap.cols]; snap.rows];
    for tile in snap.cells.iter().flatten() {
        let (r, c) = (tile.row as usize, tile.col as usize);
        if r < snap.rows && c < snap.cols {
            colors[r][c] = tile.color.code();
            specials[r][c] = special_code(tile.special);
        }
    }

    let mut hasher = Fnv1aHasher::new();
    snap.rows.hash(&mut hasher);
    snap.cols.hash(&mut hasher);
    colors.hash(&mut hasher);
    specials.hash(&mut hasher);
    snap.progress_key().hash(&mut hasher);
    snap.input_locked.hash(&mut hasher);
    snap.episode_id.hash(&mut hasher);
    snap.seed.hash(&mut hasher);

    ObservationMessage {
        msg_type: ObservationType::Observation,
        seq,
        ts: current_timestamp_ms(),
        playable: snap.playable(),
        status: snap.status.into(),
        episode_id: snap.episode_id,
        seed: snap.seed,
        board: BoardSnapshot {
            rows: snap.rows as u16,
            cols: snap.cols as u16,
            colors,
            specials,
        },
        moves_remaining: snap.moves_remaining,
        moves_total: snap.moves_total,
        score: snap.score,
        target_score: snap.target_score,
        rerolls: snap.rerolls,
        bombs: snap.bombs,
        booster_active: snap.booster_active,
        input_locked: snap.input_locked,
        has_available_move: snap.has_available_move,
        state_hash: StateHash(hasher.finish()),
    }
}

fn special_code(kind: crate::types::SpecialKind) -> u8 {
    use crate::types::SpecialKind;
    match kind {
        SpecialKind::None => 0,
        SpecialKind::ClearRow => 1,
        SpecialKind::ClearColumn => 2,
        SpecialKind::ClearRadius => 3,
    }
}
