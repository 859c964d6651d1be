//! Session Host Heartbeat Wire Protocol
//!
//! This crate defines the Protobuf messages a session host sends to the fleet
//! control plane each heartbeat, and the conversions to and from the
//! `sessionhost-model` values. Senders and receivers are versioned
//! independently, so the contract is additive only:
//!
//! - Every field keeps its tag forever (see [`schema`]). New fields take the
//!   next free tag and are optional.
//! - Unknown tags are skipped on decode; absent optional tags decode to `None`.
//! - Scalars use explicit presence, so a zero value is never confused with
//!   "not set".
//! - Timestamps are `google.protobuf.Timestamp` (Unix epoch, nanosecond
//!   resolution, UTC).
//! - Enums travel as int32 ordinals. An ordinal this build does not know
//!   decodes to `Unrecognized(n)` and re-encodes unchanged.
//!
//! # Message Categories
//!
//! - **Heartbeat**: [`HeartbeatInfoProto`]
//! - **Nested**: [`ConnectedPlayerProto`], [`PortMappingProto`],
//!   [`PortProto`], [`SessionConfigProto`]

#![deny(unsafe_code)]

use std::collections::BTreeMap;

use prost::Message;

mod codec;
mod convert;
mod error;
pub mod schema;

pub use codec::{
    CodecConfig, HeartbeatCodec, MAX_HEARTBEAT_MESSAGE_LEN, decode_heartbeat, encode_heartbeat,
};
pub use error::WireError;

// ============================================================================
// Heartbeat
// ============================================================================

/// Heartbeat payload, host to control plane.
///
/// Tags 1-13 are assigned; the next field added must use tag 14.
#[derive(Clone, PartialEq, Message)]
pub struct HeartbeatInfoProto {
    /// `SessionHostStatus` ordinal. Required.
    #[prost(int32, optional, tag = "1")]
    pub current_game_state: Option<i32>,

    /// Set by the control plane: wait this long before the next heartbeat.
    #[prost(int32, optional, tag = "2")]
    pub next_heartbeat_interval_ms: Option<i32>,

    /// `Operation` ordinal, set by the control plane.
    #[prost(int32, optional, tag = "3")]
    pub operation: Option<i32>,

    /// `SessionHostHealth` ordinal. Required.
    #[prost(int32, optional, tag = "4")]
    pub current_game_health: Option<i32>,

    #[prost(message, repeated, tag = "5")]
    pub current_players: Vec<ConnectedPlayerProto>,

    #[prost(message, optional, tag = "6")]
    pub last_state_transition_time_utc: Option<prost_types::Timestamp>,

    #[prost(message, optional, tag = "7")]
    pub session_config: Option<SessionConfigProto>,

    #[prost(message, repeated, tag = "8")]
    pub port_mappings: Vec<PortMappingProto>,

    /// Set by the control plane.
    #[prost(message, optional, tag = "9")]
    pub next_scheduled_maintenance_utc: Option<prost_types::Timestamp>,

    #[prost(string, optional, tag = "10")]
    pub secure_device_address: Option<String>,

    /// Required.
    #[prost(string, optional, tag = "11")]
    pub assignment_id: Option<String>,

    /// `CrashDumpState` ordinal. Required.
    #[prost(int32, optional, tag = "12")]
    pub crash_dump_state: Option<i32>,

    /// Required.
    #[prost(bool, optional, tag = "13")]
    pub contains_profiling_output: Option<bool>,
}

// ============================================================================
// Nested Messages
// ============================================================================

#[derive(Clone, PartialEq, Message)]
pub struct ConnectedPlayerProto {
    #[prost(string, tag = "1")]
    pub player_id: String,
}

/// All three fields required.
#[derive(Clone, PartialEq, Message)]
pub struct PortMappingProto {
    #[prost(int32, optional, tag = "1")]
    pub public_port: Option<i32>,

    #[prost(int32, optional, tag = "2")]
    pub node_port: Option<i32>,

    #[prost(message, optional, tag = "3")]
    pub game_port: Option<PortProto>,
}

/// All three fields required.
#[derive(Clone, PartialEq, Message)]
pub struct PortProto {
    #[prost(string, optional, tag = "1")]
    pub name: Option<String>,

    #[prost(int32, optional, tag = "2")]
    pub number: Option<i32>,

    #[prost(string, optional, tag = "3")]
    pub protocol: Option<String>,
}

/// Control-plane session configuration, carried through untouched.
#[derive(Clone, PartialEq, Message)]
pub struct SessionConfigProto {
    #[prost(string, optional, tag = "1")]
    pub session_id: Option<String>,

    #[prost(string, optional, tag = "2")]
    pub session_cookie: Option<String>,

    #[prost(string, repeated, tag = "3")]
    pub initial_players: Vec<String>,

    #[prost(btree_map = "string, string", tag = "4")]
    pub metadata: BTreeMap<String, String>,
}

// ============================================================================
// Tests
// ============================================================================
