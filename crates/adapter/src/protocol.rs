//! Protocol module - JSON message types for the AI adapter
//!
//! Line-delimited JSON. Every message carries `type`, `seq` (sender sequence
//! number) and `ts` (milliseconds since the Unix epoch).

use serde::{Deserialize, Serialize};

use crate::types::{GameAction, GameStatus};

pub const PROTOCOL_VERSION: &str = "1.0.0";
pub const GAME_ID: &str = "tui-match3";

// ============== Client -> Game Messages ==============

/// Any message a client may send.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Hello(HelloMessage),
    Command(CommandMessage),
    Control(ControlMessage),
}

impl ClientMessage {
    pub fn seq(&self) -> u64 {
        match self {
            ClientMessage::Hello(m) => m.seq,
            ClientMessage::Command(m) => m.seq,
            ClientMessage::Control(m) => m.seq,
        }
    }
}

/// Client hello message (first message on a connection)
#[derive(Debug, Clone, Deserialize)]
pub struct HelloMessage {
    pub seq: u64,
    #[serde(default)]
    pub ts: u64,
    pub client: ClientInfo,
    pub protocol_version: String,
    #[serde(default)]
    pub requested: RequestedCapabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestedCapabilities {
    #[serde(default)]
    pub stream_observations: bool,
}

/// Command message (controller only).
///
/// `action` is one of `click`, `bomb`, `reroll`, `restart`, `dismiss`;
/// `click` also needs `row` and `col`.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandMessage {
    pub seq: u64,
    #[serde(default)]
    pub ts: u64,
    pub action: String,
    #[serde(default)]
    pub row: Option<i32>,
    #[serde(default)]
    pub col: Option<i32>,
}

impl CommandMessage {
    /// Map the wire command to a game action.
    pub fn to_action(&self) -> Result<GameAction, (ErrorCode, String)> {
        if self.action.eq_ignore_ascii_case("click") {
            return match (self.row, self.col) {
                (Some(row), Some(col)) => Ok(GameAction::Click { row, col }),
                _ => Err((
                    ErrorCode::InvalidCommand,
                    "click needs row and col".to_string(),
                )),
            };
        }
        GameAction::from_str(&self.action).ok_or_else(|| {
            (
                ErrorCode::InvalidCommand,
                format!("Unknown action: {}", self.action),
            )
        })
    }
}

/// Control message (claim/release controller status)
#[derive(Debug, Clone, Deserialize)]
pub struct ControlMessage {
    pub seq: u64,
    #[serde(default)]
    pub ts: u64,
    pub action: ControlAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlAction {
    Claim,
    Release,
}

pub fn parse_message(line: &str) -> Result<ClientMessage, serde_json::Error> {
    serde_json::from_str(line)
}

// ============== Game -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WelcomeType {
    #[serde(rename = "welcome")]
    Welcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckType {
    #[serde(rename = "ack")]
    Ack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckStatus {
    /// The command changed the game.
    #[serde(rename = "ok")]
    Ok,
    /// The command was valid but had no effect (locked, guard failed, ...).
    #[serde(rename = "ignored")]
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    HandshakeRequired,
    ProtocolMismatch,
    NotController,
    ControllerActive,
    InvalidCommand,
    Backpressure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignedRole {
    Controller,
    Observer,
}

/// Welcome message (response to hello)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub msg_type: WelcomeType,
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    pub client_id: u64,
    pub role: AssignedRole,
    pub game_id: String,
    /// Command actions this server accepts.
    pub actions: Vec<String>,
}

/// Acknowledgment for an applied command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckMessage {
    #[serde(rename = "type")]
    pub msg_type: AckType,
    pub seq: u64,
    pub ts: u64,
    pub status: AckStatus,
}

/// Error message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: ErrorType,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObservationType {
    #[serde(rename = "observation")]
    Observation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusLower {
    Playing,
    Won,
    Lost,
}

impl From<GameStatus> for StatusLower {
    fn from(value: GameStatus) -> Self {
        match value {
            GameStatus::Playing => Self::Playing,
            GameStatus::Won => Self::Won,
            GameStatus::Lost => Self::Lost,
        }
    }
}

/// Game state observation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationMessage {
    #[serde(rename = "type")]
    pub msg_type: ObservationType,
    pub seq: u64,
    pub ts: u64,
    /// Clicks would be accepted right now.
    pub playable: bool,
    pub status: StatusLower,
    pub episode_id: u32,
    pub seed: u32,
    pub board: BoardSnapshot,
    pub moves_remaining: u32,
    pub moves_total: u32,
    pub score: u32,
    pub target_score: u32,
    pub rerolls: u32,
    pub bombs: u32,
    pub booster_active: bool,
    pub input_locked: bool,
    pub has_available_move: bool,
    pub state_hash: StateHash,
}

/// Row-major grids. `colors`: 0 empty, 1-5 palette, 6 special.
/// `specials`: 0 none, 1 row, 2 column, 3 radius.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub rows: u16,
    pub cols: u16,
    pub colors: Vec<Vec<u8>>,
    pub specials: Vec<Vec<u8>>,
}

/// 64-bit state hash, serialized as 16 lowercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateHash(pub u64);

impl Serialize for StateHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&format!("{:016x}", self.0))
    }
}

impl<'de> Deserialize<'de> for StateHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <String>::deserialize(deserializer)?;
        u64::from_str_radix(&s, 16)
            .map(StateHash)
            .map_err(|_| serde::de::Error::custom("invalid state hash"))
    }
}

pub fn create_welcome(seq: u64, client_id: u64, role: AssignedRole) -> WelcomeMessage {
    WelcomeMessage {
        msg_type: WelcomeType::Welcome,
        seq,
        ts: current_timestamp_ms(),
        protocol_version: PROTOCOL_VERSION.to_string(),
        client_id,
        role,
        game_id: GAME_ID.to_string(),
        actions: ["click", "bomb", "reroll", "restart", "dismiss"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    }
}

pub fn create_ack(seq: u64, status: AckStatus) -> AckMessage {
    AckMessage {
        msg_type: AckType::Ack,
        seq,
        ts: current_timestamp_ms(),
        status,
    }
}

pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: ErrorType::Error,
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    }
}

/// Current timestamp in milliseconds
pub fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Best-effort `seq` for replying to a line that failed to parse.
pub fn extract_seq_best_effort(line: &str) -> Option<u64> {
    let value: serde_json::Value = serde_json::from_str(line).ok()?;
    value.get("seq")?.as_u64()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hello() {
        let line = r#"{"type":"hello","seq":1,"ts":5,"client":{"name":"bot","version":"0.1"},"protocol_version":"1.0.0","requested":{"stream_observations":true}}"#;
        match parse_message(line).unwrap() {
            ClientMessage::Hello(h) => {
                assert_eq!(h.seq, 1);
                assert_eq!(h.client.name, "bot");
                assert!(h.requested.stream_observations);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_parse_click_command() {
        let line = r#"{"type":"command","seq":2,"action":"click","row":3,"col":4}"#;
        let ClientMessage::Command(cmd) = parse_message(line).unwrap() else {
            panic!("expected command");
        };
        assert_eq!(cmd.to_action(), Ok(GameAction::Click { row: 3, col: 4 }));
    }

    #[test]
    fn test_command_mapping_errors() {
        let line = r#"{"type":"command","seq":2,"action":"click","row":3}"#;
        let ClientMessage::Command(cmd) = parse_message(line).unwrap() else {
            panic!("expected command");
        };
        assert_eq!(cmd.to_action().unwrap_err().0, ErrorCode::InvalidCommand);

        let line = r#"{"type":"command","seq":3,"action":"hardDrop"}"#;
        let ClientMessage::Command(cmd) = parse_message(line).unwrap() else {
            panic!("expected command");
        };
        assert!(cmd.to_action().is_err());

        let line = r#"{"type":"command","seq":4,"action":"Bomb"}"#;
        let ClientMessage::Command(cmd) = parse_message(line).unwrap() else {
            panic!("expected command");
        };
        assert_eq!(cmd.to_action(), Ok(GameAction::UseBomb));
    }

    #[test]
    fn test_parse_control_and_unknown() {
        let line = r#"{"type":"control","seq":9,"action":"release"}"#;
        let msg = parse_message(line).unwrap();
        assert_eq!(msg.seq(), 9);
        assert!(matches!(
            msg,
            ClientMessage::Control(ControlMessage {
                action: ControlAction::Release,
                ..
            })
        ));

        assert!(parse_message(r#"{"type":"nope","seq":1}"#).is_err());
        assert_eq!(extract_seq_best_effort(r#"{"type":"nope","seq":7}"#), Some(7));
        assert_eq!(extract_seq_best_effort("garbage"), None);
    }

    #[test]
    fn test_error_serializes_snake_case_code() {
        let err = create_error(4, ErrorCode::NotController, "nope");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains(r#""type":"error""#));
        assert!(json.contains(r#""code":"not_controller""#));
    }

    #[test]
    fn test_state_hash_hex_roundtrip() {
        let json = serde_json::to_string(&StateHash(0xab)).unwrap();
        assert_eq!(json, r#""00000000000000ab""#);
        let back: StateHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, StateHash(0xab));
    }
}
