//! End-to-end adapter tests over a real TCP socket

use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;

use tui_match3::adapter::{
    build_observation, create_ack, run_server, AckStatus, InboundCommand, InboundPayload,
    OutboundMessage, ServerConfig,
};
use tui_match3::core::{Game, GameConfig};
use tui_match3::types::GameAction;

const WAIT: Duration = Duration::from_secs(5);

struct Harness {
    addr: std::net::SocketAddr,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
}

async fn start_server() -> Harness {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        max_pending_commands: 8,
    };
    let (cmd_tx, cmd_rx) = mpsc::channel(8);
    let (out_tx, out_rx) = mpsc::unbounded_channel();
    let (ready_tx, ready_rx) = oneshot::channel();
    tokio::spawn(run_server(config, cmd_tx, out_rx, Some(ready_tx)));
    let addr = timeout(WAIT, ready_rx).await.unwrap().unwrap();
    Harness {
        addr,
        cmd_rx,
        out_tx,
    }
}

struct Client {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: std::net::SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read, writer) = stream.into_split();
        Self {
            lines: BufReader::new(read).lines(),
            writer,
        }
    }

    async fn send(&mut self, value: Value) {
        let mut line = value.to_string();
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await.unwrap();
    }

    async fn recv(&mut self) -> Value {
        let line = timeout(WAIT, self.lines.next_line())
            .await
            .expect("timed out waiting for server")
            .unwrap()
            .expect("connection closed");
        serde_json::from_str(&line).unwrap()
    }

    async fn hello(&mut self, seq: u64, stream: bool) -> Value {
        self.send(json!({
            "type": "hello",
            "seq": seq,
            "ts": 0,
            "client": {"name": "test-bot", "version": "0.1"},
            "protocol_version": "1.0.0",
            "requested": {"stream_observations": stream},
        }))
        .await;
        self.recv().await
    }
}

async fn next_command(rx: &mut mpsc::Receiver<InboundCommand>) -> InboundCommand {
    timeout(WAIT, rx.recv()).await.unwrap().unwrap()
}

#[tokio::test]
async fn test_hello_command_ack_flow() {
    let mut h = start_server().await;
    let mut client = Client::connect(h.addr).await;

    let welcome = client.hello(1, true).await;
    assert_eq!(welcome["type"], "welcome");
    assert_eq!(welcome["role"], "controller");
    assert_eq!(welcome["protocol_version"], "1.0.0");
    let client_id = welcome["client_id"].as_u64().unwrap();

    let first = next_command(&mut h.cmd_rx).await;
    assert_eq!(first.client_id, client_id);
    assert_eq!(first.payload, InboundPayload::SnapshotRequest);

    client
        .send(json!({"type": "command", "seq": 2, "ts": 0, "action": "click", "row": 2, "col": 3}))
        .await;
    let cmd = next_command(&mut h.cmd_rx).await;
    assert_eq!(cmd.seq, 2);
    assert_eq!(
        cmd.payload,
        InboundPayload::Action(GameAction::Click { row: 2, col: 3 })
    );

    h.out_tx
        .send(OutboundMessage::ToClientAck {
            client_id,
            ack: create_ack(2, AckStatus::Ok),
        })
        .unwrap();
    let ack = client.recv().await;
    assert_eq!(ack["type"], "ack");
    assert_eq!(ack["seq"], 2);
    assert_eq!(ack["status"], "ok");

    let game = Game::new(GameConfig::default(), 77).unwrap();
    h.out_tx
        .send(OutboundMessage::BroadcastObservation {
            obs: build_observation(&game.snapshot(), 3),
        })
        .unwrap();
    let obs = client.recv().await;
    assert_eq!(obs["type"], "observation");
    assert_eq!(obs["status"], "playing");
    assert_eq!(obs["board"]["rows"], 8);
    assert_eq!(obs["state_hash"].as_str().unwrap().len(), 16);
}

#[tokio::test]
async fn test_command_before_hello_is_rejected() {
    let h = start_server().await;
    let mut client = Client::connect(h.addr).await;

    client
        .send(json!({"type": "command", "seq": 1, "ts": 0, "action": "bomb"}))
        .await;
    let err = client.recv().await;
    assert_eq!(err["type"], "error");
    assert_eq!(err["code"], "handshake_required");
}

#[tokio::test]
async fn test_observer_cannot_command_until_promoted() {
    let mut h = start_server().await;
    let mut controller = Client::connect(h.addr).await;
    let welcome = controller.hello(1, false).await;
    assert_eq!(welcome["role"], "controller");
    next_command(&mut h.cmd_rx).await;

    let mut observer = Client::connect(h.addr).await;
    let welcome = observer.hello(1, false).await;
    assert_eq!(welcome["role"], "observer");
    let observer_id = welcome["client_id"].as_u64().unwrap();
    next_command(&mut h.cmd_rx).await;

    observer
        .send(json!({"type": "command", "seq": 2, "ts": 0, "action": "reroll"}))
        .await;
    let err = observer.recv().await;
    assert_eq!(err["code"], "not_controller");

    observer
        .send(json!({"type": "control", "seq": 3, "ts": 0, "action": "claim"}))
        .await;
    let err = observer.recv().await;
    assert_eq!(err["code"], "controller_active");

    // Controller leaves; the observer is promoted.
    drop(controller);
    let mut seq = 4;
    let cmd = loop {
        observer
            .send(json!({"type": "command", "seq": seq, "ts": 0, "action": "reroll"}))
            .await;
        seq += 1;
        match timeout(Duration::from_millis(200), h.cmd_rx.recv()).await {
            Ok(Some(cmd)) => break cmd,
            _ => {
                let err = observer.recv().await;
                assert_eq!(err["code"], "not_controller");
                assert!(seq < 30, "observer was never promoted");
            }
        }
    };
    assert_eq!(cmd.client_id, observer_id);
    assert_eq!(cmd.payload, InboundPayload::Action(GameAction::UseReroll));
}

#[tokio::test]
async fn test_invalid_lines_and_stale_seq() {
    let mut h = start_server().await;
    let mut client = Client::connect(h.addr).await;
    client.hello(5, false).await;
    next_command(&mut h.cmd_rx).await;

    client.writer.write_all(b"{not json\n").await.unwrap();
    let err = client.recv().await;
    assert_eq!(err["code"], "invalid_command");

    client
        .send(json!({"type": "command", "seq": 6, "ts": 0, "action": "explode"}))
        .await;
    let err = client.recv().await;
    assert_eq!(err["code"], "invalid_command");
    assert_eq!(err["seq"], 6);

    client
        .send(json!({"type": "command", "seq": 6, "ts": 0, "action": "bomb"}))
        .await;
    let err = client.recv().await;
    assert_eq!(err["code"], "invalid_command");
}

#[tokio::test]
async fn test_protocol_mismatch_closes_connection() {
    let h = start_server().await;
    let mut client = Client::connect(h.addr).await;
    client
        .send(json!({
            "type": "hello",
            "seq": 1,
            "client": {"name": "old"},
            "protocol_version": "2.0.0",
        }))
        .await;
    let err = client.recv().await;
    assert_eq!(err["code"], "protocol_mismatch");
    let next = timeout(WAIT, client.lines.next_line()).await.unwrap().unwrap();
    assert!(next.is_none());
}
