//! Wireless stack integration for wifiguard
//!
//! This module wraps the OS network-configuration command: it reads the
//! connected SSID out of interface listings and drives the profile
//! registration sequence that a connect attempt needs.

mod command;
mod connection;
mod profile;
mod types;

// Re-export public API
pub use command::{CommandRunner, NetshRunner, decode_output};
pub use connection::{NetworkAdapter, NetworkControl, parse_connected_ssid};
pub use profile::{TempProfile, create_profile_xml, sanitize_ssid};
pub use types::ConnectionState;
