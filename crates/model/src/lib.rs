//! Session Host Heartbeat Model
//!
//! Value types a session host uses to report liveness and state to the
//! fleet control plane, and that the control plane uses to push directives
//! back. Pure data: no I/O, no clocks, no wire concerns. The binary
//! contract lives in `sessionhost-wire`.
//!
//! # Contents
//!
//! - [`HeartbeatInfo`]: the per-tick payload and its change-detection
//!   predicate [`HeartbeatInfo::is_state_same`]
//! - [`PortMapping`] / [`Port`]: public port to node port to game port
//! - [`ConnectedPlayer`], [`SessionConfig`]
//! - Closed enumerations with an explicit `Unrecognized` member

#![deny(unsafe_code)]

mod enums;
mod heartbeat;
mod ports;

pub use enums::{
    ClosedEnum, CrashDumpState, Operation, ParseEnumError, SessionHostHealth, SessionHostStatus,
};
pub use heartbeat::{ConnectedPlayer, HeartbeatInfo, SessionConfig};
pub use ports::{Port, PortMapping};
