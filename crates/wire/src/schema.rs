//! Field tables for the heartbeat messages.
//!
//! Each row is permanent: a tag, once assigned, keeps its name, type and
//! presence forever. New fields take the next free tag and are optional.
//! The prost structs in this crate must agree with these tables; the tests
//! below walk encoded bytes to check that they do.

use prost::encoding::WireType;

use crate::WireError;

/// Value type carried by a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Int32,
    Bool,
    String,
    /// Closed enumeration, carried as an int32 ordinal.
    Enum(&'static str),
    /// `google.protobuf.Timestamp`.
    Timestamp,
    Message(&'static str),
    /// `map<string, string>`.
    StringMap,
}

impl FieldKind {
    /// Wire type of a single encoded element of this kind.
    pub fn wire_type(self) -> WireType {
        match self {
            Self::Int32 | Self::Bool | Self::Enum(_) => WireType::Varint,
            Self::String | Self::Timestamp | Self::Message(_) | Self::StringMap => {
                WireType::LengthDelimited
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Decode fails with `RequiredFieldMissing` when absent.
    Required,
    /// Absence is a meaningful state.
    Optional,
    /// Zero or more; absence decodes to an empty list.
    Repeated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub tag: u32,
    pub kind: FieldKind,
    pub presence: Presence,
}

const fn field(name: &'static str, tag: u32, kind: FieldKind, presence: Presence) -> FieldSpec {
    FieldSpec {
        name,
        tag,
        kind,
        presence,
    }
}

/// Schema of one message type.
#[derive(Debug, Clone, Copy)]
pub struct MessageSchema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl MessageSchema {
    pub fn field(&self, tag: u32) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.tag == tag)
    }

    pub fn field_named(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn required(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields
            .iter()
            .filter(|f| f.presence == Presence::Required)
    }

    /// Tag the next added field must use.
    pub fn next_free_tag(&self) -> u32 {
        self.fields.iter().map(|f| f.tag).max().unwrap_or(0) + 1
    }

    /// Unwrap a required field, naming it from the table when absent.
    ///
    /// `name` must be a row of this table.
    pub(crate) fn require<T>(&self, name: &'static str, value: Option<T>) -> Result<T, WireError> {
        let entry = self.field_named(name);
        debug_assert!(
            entry.is_some_and(|f| f.presence == Presence::Required),
            "{}.{name} is not a required field of the table",
            self.name
        );
        value.ok_or_else(|| WireError::RequiredFieldMissing {
            message: self.name,
            field: name,
            tag: entry.map_or(0, |f| f.tag),
        })
    }
}

// ============================================================================
// Tables
// ============================================================================

pub const HEARTBEAT_INFO: MessageSchema = MessageSchema {
    name: "HeartbeatInfo",
    fields: &[
        field("current_game_state", 1, FieldKind::Enum("SessionHostStatus"), Presence::Required),
        field("next_heartbeat_interval_ms", 2, FieldKind::Int32, Presence::Optional),
        field("operation", 3, FieldKind::Enum("Operation"), Presence::Optional),
        field("current_game_health", 4, FieldKind::Enum("SessionHostHealth"), Presence::Required),
        field("current_players", 5, FieldKind::Message("ConnectedPlayer"), Presence::Repeated),
        field("last_state_transition_time_utc", 6, FieldKind::Timestamp, Presence::Optional),
        field("session_config", 7, FieldKind::Message("SessionConfig"), Presence::Optional),
        field("port_mappings", 8, FieldKind::Message("PortMapping"), Presence::Repeated),
        field("next_scheduled_maintenance_utc", 9, FieldKind::Timestamp, Presence::Optional),
        field("secure_device_address", 10, FieldKind::String, Presence::Optional),
        field("assignment_id", 11, FieldKind::String, Presence::Required),
        field("crash_dump_state", 12, FieldKind::Enum("CrashDumpState"), Presence::Required),
        field("contains_profiling_output", 13, FieldKind::Bool, Presence::Required),
    ],
};

pub const PORT_MAPPING: MessageSchema = MessageSchema {
    name: "PortMapping",
    fields: &[
        field("public_port", 1, FieldKind::Int32, Presence::Required),
        field("node_port", 2, FieldKind::Int32, Presence::Required),
        field("game_port", 3, FieldKind::Message("Port"), Presence::Required),
    ],
};

pub const PORT: MessageSchema = MessageSchema {
    name: "Port",
    fields: &[
        field("name", 1, FieldKind::String, Presence::Required),
        field("number", 2, FieldKind::Int32, Presence::Required),
        field("protocol", 3, FieldKind::String, Presence::Required),
    ],
};

pub const CONNECTED_PLAYER: MessageSchema = MessageSchema {
    name: "ConnectedPlayer",
    fields: &[field("player_id", 1, FieldKind::String, Presence::Optional)],
};

pub const SESSION_CONFIG: MessageSchema = MessageSchema {
    name: "SessionConfig",
    fields: &[
        field("session_id", 1, FieldKind::String, Presence::Optional),
        field("session_cookie", 2, FieldKind::String, Presence::Optional),
        field("initial_players", 3, FieldKind::String, Presence::Repeated),
        field("metadata", 4, FieldKind::StringMap, Presence::Repeated),
    ],
};

/// First tag available to a new `HeartbeatInfo` field.
pub const NEXT_FREE_HEARTBEAT_TAG: u32 = 14;

// ============================================================================
// Tests
// ============================================================================
