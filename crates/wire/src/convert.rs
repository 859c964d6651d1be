//! Conversions between the wire messages and the model values.
//!
//! Encoding always writes required fields, zero values included, so an
//! absent required tag on decode means the sender did not set it.

use chrono::{DateTime, Utc};
use prost_types::Timestamp;
use sessionhost_model::{
    ClosedEnum, ConnectedPlayer, CrashDumpState, HeartbeatInfo, Operation, Port, PortMapping,
    SessionConfig, SessionHostHealth, SessionHostStatus,
};
use tracing::warn;

use crate::schema::{HEARTBEAT_INFO, PORT, PORT_MAPPING};
use crate::{
    ConnectedPlayerProto, HeartbeatInfoProto, PortMappingProto, PortProto, SessionConfigProto,
    WireError,
};

const NANOS_PER_SECOND: u32 = 1_000_000_000;

// ============================================================================
// Field helpers
// ============================================================================

/// Map an ordinal, logging ones this build does not know.
fn decode_enum<E: ClosedEnum>(field: &'static str, ordinal: i32) -> E {
    let value = E::from_ordinal(ordinal);
    if !value.is_recognized() {
        warn!(
            field,
            ordinal,
            enum_type = E::TYPE_NAME,
            "unrecognized enum ordinal in heartbeat"
        );
    }
    value
}

/// `google.protobuf.Timestamp` has no leap seconds, so a chrono leap-second
/// instant (subsecond nanos >= 1e9) is clamped to `.999999999` of the same
/// second. Such a value does not survive a round trip unchanged.
fn to_timestamp(at: DateTime<Utc>) -> Timestamp {
    let nanos = at.timestamp_subsec_nanos().min(NANOS_PER_SECOND - 1);
    Timestamp {
        seconds: at.timestamp(),
        nanos: nanos as i32,
    }
}

fn from_timestamp(field: &'static str, ts: Timestamp) -> Result<DateTime<Utc>, WireError> {
    let nanos = u32::try_from(ts.nanos)
        .ok()
        .filter(|n| *n < NANOS_PER_SECOND)
        .ok_or_else(|| WireError::malformed(format!("{field}: nanos {} out of range", ts.nanos)))?;
    DateTime::from_timestamp(ts.seconds, nanos).ok_or_else(|| {
        WireError::malformed(format!("{field}: seconds {} out of range", ts.seconds))
    })
}

fn from_optional_timestamp(
    field: &'static str,
    ts: Option<Timestamp>,
) -> Result<Option<DateTime<Utc>>, WireError> {
    ts.map(|ts| from_timestamp(field, ts)).transpose()
}

// ============================================================================
// Players and Session Config
// ============================================================================

impl From<&ConnectedPlayer> for ConnectedPlayerProto {
    fn from(p: &ConnectedPlayer) -> Self {
        Self {
            player_id: p.player_id.clone(),
        }
    }
}

impl From<ConnectedPlayerProto> for ConnectedPlayer {
    fn from(p: ConnectedPlayerProto) -> Self {
        Self {
            player_id: p.player_id,
        }
    }
}

impl From<&SessionConfig> for SessionConfigProto {
    fn from(c: &SessionConfig) -> Self {
        Self {
            session_id: c.session_id.clone(),
            session_cookie: c.session_cookie.clone(),
            initial_players: c.initial_players.clone(),
            metadata: c.metadata.clone(),
        }
    }
}

impl From<SessionConfigProto> for SessionConfig {
    fn from(c: SessionConfigProto) -> Self {
        Self {
            session_id: c.session_id,
            session_cookie: c.session_cookie,
            initial_players: c.initial_players,
            metadata: c.metadata,
        }
    }
}

// ============================================================================
// Ports
// ============================================================================

impl From<&Port> for PortProto {
    fn from(p: &Port) -> Self {
        Self {
            name: Some(p.name.clone()),
            number: Some(p.number),
            protocol: Some(p.protocol.clone()),
        }
    }
}

fn check_port_name(name: &str) -> Result<(), WireError> {
    if name.is_empty() {
        return Err(WireError::malformed("Port.name must not be empty"));
    }
    Ok(())
}

/// Checks the invariants the decoder enforces, so a sender never emits a
/// payload its peer will drop.
pub(crate) fn validate_outgoing(hb: &HeartbeatInfo) -> Result<(), WireError> {
    hb.port_mappings
        .iter()
        .try_for_each(|m| check_port_name(&m.game_port.name))
}

impl TryFrom<PortProto> for Port {
    type Error = WireError;

    fn try_from(p: PortProto) -> Result<Self, Self::Error> {
        let name = PORT.require("name", p.name)?;
        check_port_name(&name)?;
        Ok(Self {
            name,
            number: PORT.require("number", p.number)?,
            protocol: PORT.require("protocol", p.protocol)?,
        })
    }
}

impl From<&PortMapping> for PortMappingProto {
    fn from(m: &PortMapping) -> Self {
        Self {
            public_port: Some(m.public_port),
            node_port: Some(m.node_port),
            game_port: Some((&m.game_port).into()),
        }
    }
}

impl TryFrom<PortMappingProto> for PortMapping {
    type Error = WireError;

    fn try_from(m: PortMappingProto) -> Result<Self, Self::Error> {
        Ok(Self {
            public_port: PORT_MAPPING.require("public_port", m.public_port)?,
            node_port: PORT_MAPPING.require("node_port", m.node_port)?,
            game_port: PORT_MAPPING.require("game_port", m.game_port)?.try_into()?,
        })
    }
}

// ============================================================================
// HeartbeatInfo
// ============================================================================

impl From<&HeartbeatInfo> for HeartbeatInfoProto {
    fn from(hb: &HeartbeatInfo) -> Self {
        Self {
            current_game_state: Some(hb.current_game_state.ordinal()),
            next_heartbeat_interval_ms: hb.next_heartbeat_interval_ms,
            operation: hb.operation.map(Operation::ordinal),
            current_game_health: Some(hb.current_game_health.ordinal()),
            current_players: hb.current_players.iter().map(Into::into).collect(),
            last_state_transition_time_utc: hb.last_state_transition_time_utc.map(to_timestamp),
            session_config: hb.session_config.as_ref().map(Into::into),
            port_mappings: hb.port_mappings.iter().map(Into::into).collect(),
            next_scheduled_maintenance_utc: hb.next_scheduled_maintenance_utc.map(to_timestamp),
            secure_device_address: hb.secure_device_address.clone(),
            assignment_id: Some(hb.assignment_id.clone()),
            crash_dump_state: Some(hb.crash_dump_state.ordinal()),
            contains_profiling_output: Some(hb.contains_profiling_output),
        }
    }
}

impl TryFrom<HeartbeatInfoProto> for HeartbeatInfo {
    type Error = WireError;

    fn try_from(p: HeartbeatInfoProto) -> Result<Self, Self::Error> {
        let current_game_state: SessionHostStatus = decode_enum(
            "current_game_state",
            HEARTBEAT_INFO.require("current_game_state", p.current_game_state)?,
        );
        let current_game_health: SessionHostHealth = decode_enum(
            "current_game_health",
            HEARTBEAT_INFO.require("current_game_health", p.current_game_health)?,
        );
        let assignment_id = HEARTBEAT_INFO.require("assignment_id", p.assignment_id)?;
        let crash_dump_state: CrashDumpState = decode_enum(
            "crash_dump_state",
            HEARTBEAT_INFO.require("crash_dump_state", p.crash_dump_state)?,
        );
        let contains_profiling_output =
            HEARTBEAT_INFO.require("contains_profiling_output", p.contains_profiling_output)?;

        let port_mappings = p
            .port_mappings
            .into_iter()
            .map(PortMapping::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            current_game_state,
            next_heartbeat_interval_ms: p.next_heartbeat_interval_ms,
            operation: p
                .operation
                .map(|ordinal| decode_enum::<Operation>("operation", ordinal)),
            current_game_health,
            current_players: p.current_players.into_iter().map(Into::into).collect(),
            last_state_transition_time_utc: from_optional_timestamp(
                "last_state_transition_time_utc",
                p.last_state_transition_time_utc,
            )?,
            session_config: p.session_config.map(Into::into),
            port_mappings,
            next_scheduled_maintenance_utc: from_optional_timestamp(
                "next_scheduled_maintenance_utc",
                p.next_scheduled_maintenance_utc,
            )?,
            secure_device_address: p.secure_device_address,
            assignment_id,
            crash_dump_state,
            contains_profiling_output,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
