//! Adapter module - AI control via TCP socket with JSON protocol
//!
//! Lets an external agent play the board over a line-delimited JSON protocol.
//!
//! # Protocol Overview
//!
//! 1. **Connection**: Client connects to the TCP socket (default: 127.0.0.1:7788)
//! 2. **Handshake**: Client sends `hello`, server responds with `welcome`
//! 3. **Controller Assignment**: First client to hello becomes the controller
//! 4. **Observations**: Clients that asked for them get a snapshot after every change
//! 5. **Commanding**: Controller sends commands; each is acked once applied
//!
//! ## Client → Server
//!
//! - **hello**: handshake with client info and `stream_observations`
//! - **command**: `click` (with `row`/`col`), `bomb`, `reroll`, `restart`, `dismiss`
//! - **control**: `claim` or `release` the controller role
//!
//! ## Server → Client
//!
//! - **welcome**: assigned role and accepted actions
//! - **observation**: board grids, moves, score, boosters, status, state hash
//! - **ack**: `ok` if the command changed the game, `ignored` otherwise
//! - **error**: code and message
//!
//! # Environment Variables
//!
//! - `MATCH3_AI_HOST`: bind address (default: "127.0.0.1")
//! - `MATCH3_AI_PORT`: port (default: 7788, 0 picks a free port)
//! - `MATCH3_AI_MAX_PENDING`: bounded command queue length (default: 10)
//! - `MATCH3_AI_DISABLED`: "1" or "true" disables the adapter
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"ts":0,"client":{"name":"bot","version":"0.1"},"protocol_version":"1.0.0","requested":{"stream_observations":true}}
//! Server -> Client: {"type":"welcome","seq":1,"ts":...,"protocol_version":"1.0.0","client_id":1,"role":"controller",...}
//! Server -> Client: {"type":"observation","seq":1,...,"board":{"rows":8,"cols":8,"colors":[[...]],"specials":[[...]]},...}
//! Client -> Server: {"type":"command","seq":2,"ts":0,"action":"click","row":3,"col":4}
//! Server -> Client: {"type":"ack","seq":2,"ts":...,"status":"ok"}
//! ```

pub mod protocol;
pub mod runtime;
pub mod server;

pub use tui_match3_core as core;
pub use tui_match3_types as types;

pub use protocol::*;
pub use runtime::{Adapter, InboundCommand, InboundPayload, OutboundMessage};
pub use server::{build_observation, run_server, ServerConfig};
