//! Closed symbol sets embedded in the heartbeat payload.
//!
//! Ordinals are permanent. An ordinal outside the known set decodes to
//! `Unrecognized(n)` and keeps `n`, so a payload from a newer sender survives
//! a decode/encode pass unchanged.
//!
//! The textual form (Display, FromStr, serde) uses the symbolic name, never
//! the ordinal.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// A symbolic name that does not belong to the target enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} name: {value:?}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Shared surface of the closed enumerations, for code generic over them.
pub trait ClosedEnum: Copy + fmt::Display + 'static {
    /// Type name used in logs and errors.
    const TYPE_NAME: &'static str;

    fn from_ordinal(ordinal: i32) -> Self;
    fn ordinal(self) -> i32;
    fn is_recognized(self) -> bool;
}

/// Parses the `Unrecognized(n)` form written by Display.
fn parse_unrecognized(s: &str) -> Option<i32> {
    s.strip_prefix("Unrecognized(")?
        .strip_suffix(')')?
        .parse()
        .ok()
}

macro_rules! closed_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $ordinal:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// Ordinal unknown to this build.
            Unrecognized(i32),
        }

        impl $name {
            /// Recognized members in ordinal order.
            pub const KNOWN: &'static [$name] = &[$($name::$variant),+];

            /// Map a wire ordinal. Never fails.
            pub fn from_ordinal(ordinal: i32) -> Self {
                match ordinal {
                    $( $ordinal => Self::$variant, )+
                    other => Self::Unrecognized(other),
                }
            }

            pub fn ordinal(self) -> i32 {
                match self {
                    $( Self::$variant => $ordinal, )+
                    Self::Unrecognized(other) => other,
                }
            }

            pub fn is_recognized(self) -> bool {
                !matches!(self, Self::Unrecognized(_))
            }

            /// Symbolic name, `None` for unrecognized ordinals.
            pub fn as_str(self) -> Option<&'static str> {
                match self {
                    $( Self::$variant => Some(stringify!($variant)), )+
                    Self::Unrecognized(_) => None,
                }
            }
        }

        impl ClosedEnum for $name {
            const TYPE_NAME: &'static str = stringify!($name);

            fn from_ordinal(ordinal: i32) -> Self {
                $name::from_ordinal(ordinal)
            }

            fn ordinal(self) -> i32 {
                $name::ordinal(self)
            }

            fn is_recognized(self) -> bool {
                $name::is_recognized(self)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::from_ordinal(0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.as_str() {
                    Some(name) => f.write_str(name),
                    None => write!(f, "Unrecognized({})", self.ordinal()),
                }
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s == stringify!($variant) {
                        return Ok(Self::$variant);
                    }
                )+
                parse_unrecognized(s)
                    .map(Self::from_ordinal)
                    .ok_or_else(|| ParseEnumError {
                        kind: stringify!($name),
                        value: s.to_string(),
                    })
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let name = String::deserialize(deserializer)?;
                name.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

closed_enum! {
    /// Lifecycle phase of a session host.
    SessionHostStatus {
        Invalid = 0,
        PendingHeartbeat = 1,
        Initializing = 2,
        StandingBy = 3,
        Active = 4,
        Terminating = 5,
        Terminated = 6,
        Quarantined = 7,
    }
}

closed_enum! {
    /// Health as reported by the game host.
    SessionHostHealth {
        Healthy = 0,
        Unhealthy = 1,
    }
}

closed_enum! {
    /// Directive pushed back by the control plane.
    Operation {
        Invalid = 0,
        Continue = 1,
        GetManifest = 2,
        Quarantine = 3,
        Active = 4,
        Terminate = 5,
    }
}

closed_enum! {
    /// State of the crash dump (if any) on the session host.
    CrashDumpState {
        None = 0,
        Present = 1,
        Throttled = 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinals_are_stable() {
        assert_eq!(SessionHostStatus::StandingBy.ordinal(), 3);
        assert_eq!(SessionHostStatus::Active.ordinal(), 4);
        assert_eq!(SessionHostHealth::Unhealthy.ordinal(), 1);
        assert_eq!(Operation::Terminate.ordinal(), 5);
        assert_eq!(CrashDumpState::Throttled.ordinal(), 2);
    }

    #[test]
    fn test_known_members_map_both_ways() {
        for &status in SessionHostStatus::KNOWN {
            assert_eq!(SessionHostStatus::from_ordinal(status.ordinal()), status);
            assert!(status.is_recognized());
        }
        for &op in Operation::KNOWN {
            assert_eq!(Operation::from_ordinal(op.ordinal()), op);
        }
    }

    #[test]
    fn test_unknown_ordinal_is_unrecognized_not_error() {
        let status = SessionHostStatus::from_ordinal(42);
        assert_eq!(status, SessionHostStatus::Unrecognized(42));
        assert!(!status.is_recognized());
        assert_eq!(status.ordinal(), 42);
        assert_eq!(status.as_str(), None);

        assert_eq!(CrashDumpState::from_ordinal(-1), CrashDumpState::Unrecognized(-1));
    }

    #[test]
    fn test_crash_dump_state_defaults_to_none() {
        assert_eq!(CrashDumpState::default(), CrashDumpState::None);
        assert_eq!(SessionHostHealth::default(), SessionHostHealth::Healthy);
    }

    #[test]
    fn test_display_uses_symbolic_name() {
        assert_eq!(SessionHostStatus::StandingBy.to_string(), "StandingBy");
        assert_eq!(Operation::GetManifest.to_string(), "GetManifest");
        assert_eq!(Operation::Unrecognized(9).to_string(), "Unrecognized(9)");
    }

    #[test]
    fn test_parse_symbolic_name() {
        assert_eq!("Active".parse::<SessionHostStatus>(), Ok(SessionHostStatus::Active));
        assert_eq!("Throttled".parse::<CrashDumpState>(), Ok(CrashDumpState::Throttled));
        assert_eq!(
            "Unrecognized(12)".parse::<Operation>(),
            Ok(Operation::Unrecognized(12))
        );
    }

    #[test]
    fn test_parse_rejects_unknown_name() {
        let err = "Sleeping".parse::<SessionHostStatus>().unwrap_err();
        assert_eq!(err.kind, "SessionHostStatus");
        assert_eq!(err.value, "Sleeping");

        // Names are case-sensitive, matching the symbolic form exactly.
        assert!("active".parse::<SessionHostStatus>().is_err());
    }

    #[test]
    fn test_json_uses_symbolic_name() {
        let json = serde_json::to_string(&SessionHostHealth::Unhealthy).unwrap();
        assert_eq!(json, "\"Unhealthy\"");

        let parsed: Operation = serde_json::from_str("\"Quarantine\"").unwrap();
        assert_eq!(parsed, Operation::Quarantine);

        assert!(serde_json::from_str::<Operation>("\"Explode\"").is_err());
    }
}
