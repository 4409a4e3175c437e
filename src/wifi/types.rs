use std::fmt;

/// Link state derived from a single interface query; produced fresh on every
/// poll, never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Connected(String),
    Disconnected,
    Unknown(String),
}

impl ConnectionState {
    /// Whether the interface is associated with exactly `target`.
    pub fn is_connected_to(&self, target: &str) -> bool {
        matches!(self, ConnectionState::Connected(ssid) if ssid == target)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Connected(ssid) => write!(f, "connected to {ssid}"),
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Unknown(reason) => write!(f, "unknown ({reason})"),
        }
    }
}
