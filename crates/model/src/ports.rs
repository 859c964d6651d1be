//! Port translation for hosts behind NAT or a node-level proxy.
//!
//! A mapping has three independent tiers: the externally routable public
//! port, the port on the host node, and the port the game process binds.
//! None of them is derived from another.

use serde::{Deserialize, Serialize};

/// The game's internal listener.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Port {
    /// Port name, non-empty.
    pub name: String,
    /// Port number the game process binds to.
    pub number: i32,
    /// Transport protocol, e.g. "UDP" or "TCP".
    pub protocol: String,
}

impl Port {
    pub fn new(name: impl Into<String>, number: i32, protocol: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            number,
            protocol: protocol.into(),
        }
    }
}

/// One bound port on the host, public port down to game port.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortMapping {
    /// Externally routable port.
    pub public_port: i32,
    /// Port on the host node.
    pub node_port: i32,
    pub game_port: Port,
}

impl PortMapping {
    pub fn new(public_port: i32, node_port: i32, game_port: Port) -> Self {
        Self {
            public_port,
            node_port,
            game_port,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers_are_independent() {
        let mapping = PortMapping::new(30000, 56100, Port::new("game_port", 7777, "UDP"));
        assert_eq!(mapping.public_port, 30000);
        assert_eq!(mapping.node_port, 56100);
        assert_eq!(mapping.game_port.number, 7777);
        assert_eq!(mapping.game_port.protocol, "UDP");
    }

    #[test]
    fn test_json_property_names() {
        let mapping = PortMapping::new(30000, 56100, Port::new("game_port", 7777, "TCP"));
        let json = serde_json::to_value(&mapping).unwrap();
        assert_eq!(json["publicPort"], 30000);
        assert_eq!(json["nodePort"], 56100);
        assert_eq!(json["gamePort"]["name"], "game_port");
        assert_eq!(json["gamePort"]["number"], 7777);
        assert_eq!(json["gamePort"]["protocol"], "TCP");
    }
}
