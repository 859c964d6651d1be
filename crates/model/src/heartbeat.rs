//! The heartbeat payload sent by a session host each tick.
//!
//! `HeartbeatInfo` is a value: the host builds a fresh one per tick and the
//! control plane discards it after processing. Derived values are produced
//! with the `with_*` constructors, which consume `self` and return the new
//! value. `Clone` copies the player and port lists, so two heartbeats never
//! share one list.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CrashDumpState, Operation, PortMapping, SessionHostHealth, SessionHostStatus};

// ============================================================================
// Players and Session Config
// ============================================================================

/// A player connected to the game host.
///
/// Not deduplicated here; the control plane may deduplicate by `player_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedPlayer {
    /// Opaque external player identifier (gamer tag).
    pub player_id: String,
}

impl ConnectedPlayer {
    pub fn new(player_id: impl Into<String>) -> Self {
        Self {
            player_id: player_id.into(),
        }
    }
}

/// Configuration sent down to the game host from the control plane.
///
/// Carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_cookie: Option<String>,
    #[serde(default)]
    pub initial_players: Vec<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

// ============================================================================
// HeartbeatInfo
// ============================================================================

/// Payload sent host to control plane each heartbeat.
///
/// `next_heartbeat_interval_ms`, `operation` and
/// `next_scheduled_maintenance_utc` are assigned by the control plane;
/// `None` means "no directive", which is distinct from a zero value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatInfo {
    pub current_game_state: SessionHostStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_heartbeat_interval_ms: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<Operation>,

    pub current_game_health: SessionHostHealth,

    /// Order carries no meaning.
    #[serde(default)]
    pub current_players: Vec<ConnectedPlayer>,

    /// When `current_game_state` last changed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_state_transition_time_utc: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_config: Option<SessionConfig>,

    /// All currently bound ports. Empty for a host exposing none.
    #[serde(default)]
    pub port_mappings: Vec<PortMapping>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_scheduled_maintenance_utc: Option<DateTime<Utc>>,

    /// Legacy security handshake value used by some older titles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secure_device_address: Option<String>,

    /// Identifies title, deployment and region for this host instance.
    pub assignment_id: String,

    #[serde(default)]
    pub crash_dump_state: CrashDumpState,

    #[serde(default)]
    pub contains_profiling_output: bool,
}

impl HeartbeatInfo {
    /// Create a heartbeat with every optional field absent and empty lists.
    pub fn new(
        assignment_id: impl Into<String>,
        current_game_state: SessionHostStatus,
        current_game_health: SessionHostHealth,
    ) -> Self {
        Self {
            current_game_state,
            next_heartbeat_interval_ms: None,
            operation: None,
            current_game_health,
            current_players: Vec::new(),
            last_state_transition_time_utc: None,
            session_config: None,
            port_mappings: Vec::new(),
            next_scheduled_maintenance_utc: None,
            secure_device_address: None,
            assignment_id: assignment_id.into(),
            crash_dump_state: CrashDumpState::None,
            contains_profiling_output: false,
        }
    }

    /// Whether `other` describes a materially unchanged state.
    ///
    /// True iff health, game state and the number of connected players all
    /// match. Player identities are not compared: one player leaving and
    /// another joining within the same tick reads as "same". This keeps the
    /// check O(1). Returns false when `other` is `None`.
    pub fn is_state_same(&self, other: Option<&HeartbeatInfo>) -> bool {
        other.is_some_and(|other| {
            self.current_game_health == other.current_game_health
                && self.current_game_state == other.current_game_state
                && self.current_players.len() == other.current_players.len()
        })
    }

    pub fn player_count(&self) -> usize {
        self.current_players.len()
    }

    /// Move to `state`, stamping `at` as the transition time when the state
    /// actually changes. Re-entering the current state keeps the old stamp.
    pub fn transition_to(mut self, state: SessionHostStatus, at: DateTime<Utc>) -> Self {
        if self.current_game_state != state {
            self.current_game_state = state;
            self.last_state_transition_time_utc = Some(at);
        }
        self
    }

    // ------------------------------------------------------------------------
    // with-field constructors
    // ------------------------------------------------------------------------

    pub fn with_game_state(mut self, state: SessionHostStatus) -> Self {
        self.current_game_state = state;
        self
    }

    pub fn with_next_heartbeat_interval_ms(mut self, interval_ms: Option<i32>) -> Self {
        self.next_heartbeat_interval_ms = interval_ms;
        self
    }

    pub fn with_operation(mut self, operation: Option<Operation>) -> Self {
        self.operation = operation;
        self
    }

    pub fn with_game_health(mut self, health: SessionHostHealth) -> Self {
        self.current_game_health = health;
        self
    }

    pub fn with_players(mut self, players: Vec<ConnectedPlayer>) -> Self {
        self.current_players = players;
        self
    }

    pub fn with_last_state_transition_time_utc(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.last_state_transition_time_utc = at;
        self
    }

    pub fn with_session_config(mut self, config: Option<SessionConfig>) -> Self {
        self.session_config = config;
        self
    }

    pub fn with_port_mappings(mut self, mappings: Vec<PortMapping>) -> Self {
        self.port_mappings = mappings;
        self
    }

    pub fn with_next_scheduled_maintenance_utc(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.next_scheduled_maintenance_utc = at;
        self
    }

    pub fn with_secure_device_address(mut self, address: Option<String>) -> Self {
        self.secure_device_address = address;
        self
    }

    pub fn with_assignment_id(mut self, assignment_id: impl Into<String>) -> Self {
        self.assignment_id = assignment_id.into();
        self
    }

    pub fn with_crash_dump_state(mut self, state: CrashDumpState) -> Self {
        self.crash_dump_state = state;
        self
    }

    pub fn with_profiling_output(mut self, contains_profiling_output: bool) -> Self {
        self.contains_profiling_output = contains_profiling_output;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::Port;

    fn players(ids: &[&str]) -> Vec<ConnectedPlayer> {
        ids.iter().map(|id| ConnectedPlayer::new(*id)).collect()
    }

    fn fully_populated() -> HeartbeatInfo {
        HeartbeatInfo::new(
            "title1:deployment1:westus",
            SessionHostStatus::Active,
            SessionHostHealth::Healthy,
        )
        .with_next_heartbeat_interval_ms(Some(1000))
        .with_operation(Some(Operation::Continue))
        .with_players(players(&["p1", "p2"]))
        .with_last_state_transition_time_utc(Some(
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        ))
        .with_session_config(Some(SessionConfig {
            session_id: Some("4f1e7d9c-0000-0000-0000-000000000001".to_string()),
            ..Default::default()
        }))
        .with_port_mappings(vec![PortMapping::new(
            30000,
            56100,
            Port::new("game_port", 7777, "UDP"),
        )])
        .with_next_scheduled_maintenance_utc(Some(
            Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap(),
        ))
        .with_secure_device_address(Some("sda".to_string()))
        .with_crash_dump_state(CrashDumpState::Present)
        .with_profiling_output(true)
    }

    #[test]
    fn test_new_leaves_optional_fields_absent() {
        let hb = HeartbeatInfo::new("a", SessionHostStatus::StandingBy, SessionHostHealth::Healthy);
        assert_eq!(hb.next_heartbeat_interval_ms, None);
        assert_eq!(hb.operation, None);
        assert_eq!(hb.last_state_transition_time_utc, None);
        assert_eq!(hb.next_scheduled_maintenance_utc, None);
        assert!(hb.current_players.is_empty());
        assert!(hb.port_mappings.is_empty());
        assert_eq!(hb.crash_dump_state, CrashDumpState::None);
        assert!(!hb.contains_profiling_output);
    }

    #[test]
    fn test_state_same_with_itself() {
        let a = fully_populated();
        assert!(a.is_state_same(Some(&a)));
    }

    #[test]
    fn test_state_same_against_none_is_false() {
        let a = fully_populated();
        assert!(!a.is_state_same(None));
    }

    #[test]
    fn test_state_same_ignores_player_identity() {
        let a = HeartbeatInfo::new("a", SessionHostStatus::Active, SessionHostHealth::Healthy)
            .with_players(players(&["p1", "p2"]));
        let b = HeartbeatInfo::new("a", SessionHostStatus::Active, SessionHostHealth::Healthy)
            .with_players(players(&["p3", "p4"]));
        assert!(a.is_state_same(Some(&b)));
        assert!(b.is_state_same(Some(&a)));
    }

    #[test]
    fn test_state_differs_on_health_state_or_count() {
        let base = HeartbeatInfo::new("a", SessionHostStatus::Active, SessionHostHealth::Healthy)
            .with_players(players(&["p1"]));

        let unhealthy = base.clone().with_game_health(SessionHostHealth::Unhealthy);
        assert!(!base.is_state_same(Some(&unhealthy)));

        let terminating = base.clone().with_game_state(SessionHostStatus::Terminating);
        assert!(!base.is_state_same(Some(&terminating)));

        let more_players = base.clone().with_players(players(&["p1", "p2"]));
        assert!(!base.is_state_same(Some(&more_players)));
    }

    #[test]
    fn test_state_same_ignores_directives_and_other_fields() {
        let a = fully_populated();
        let b = a
            .clone()
            .with_operation(None)
            .with_next_heartbeat_interval_ms(Some(0))
            .with_crash_dump_state(CrashDumpState::Throttled)
            .with_port_mappings(Vec::new());
        assert!(a.is_state_same(Some(&b)));
    }

    #[test]
    fn test_with_field_does_not_alias_lists() {
        let original = fully_populated();
        let mut copy = original.clone().with_game_health(SessionHostHealth::Unhealthy);
        copy.current_players.push(ConnectedPlayer::new("p9"));

        assert_eq!(original.player_count(), 2);
        assert_eq!(copy.player_count(), 3);
        assert_eq!(original.current_game_health, SessionHostHealth::Healthy);
    }

    #[test]
    fn test_zero_interval_is_distinct_from_absent() {
        let hb = HeartbeatInfo::new("a", SessionHostStatus::Active, SessionHostHealth::Healthy);
        let zero = hb.clone().with_next_heartbeat_interval_ms(Some(0));
        assert_ne!(hb, zero);
    }

    #[test]
    fn test_transition_stamps_only_on_change() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 5, 0).unwrap();

        let hb = HeartbeatInfo::new("a", SessionHostStatus::StandingBy, SessionHostHealth::Healthy)
            .transition_to(SessionHostStatus::Active, t0);
        assert_eq!(hb.current_game_state, SessionHostStatus::Active);
        assert_eq!(hb.last_state_transition_time_utc, Some(t0));

        let hb = hb.transition_to(SessionHostStatus::Active, t1);
        assert_eq!(hb.last_state_transition_time_utc, Some(t0));
    }

    #[test]
    fn test_json_textual_encoding() {
        let hb = HeartbeatInfo::new("a", SessionHostStatus::StandingBy, SessionHostHealth::Healthy)
            .with_players(players(&["p1"]));
        let json = serde_json::to_value(&hb).unwrap();

        assert_eq!(json["currentGameState"], "StandingBy");
        assert_eq!(json["currentGameHealth"], "Healthy");
        assert_eq!(json["crashDumpState"], "None");
        assert_eq!(json["assignmentId"], "a");
        assert_eq!(json["currentPlayers"][0]["playerId"], "p1");
        assert!(json.get("operation").is_none());
        assert!(json.get("nextHeartbeatIntervalMs").is_none());
    }

    #[test]
    fn test_json_roundtrip_fully_populated() {
        let hb = fully_populated();
        let text = serde_json::to_string(&hb).unwrap();
        let parsed: HeartbeatInfo = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, hb);
    }

    #[test]
    fn test_json_missing_assignment_id_is_rejected() {
        let text = r#"{"currentGameState":"Active","currentGameHealth":"Healthy"}"#;
        assert!(serde_json::from_str::<HeartbeatInfo>(text).is_err());
    }
}
