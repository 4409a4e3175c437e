/// Typed errors for wifiguard operations
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for wifiguard operations
pub type WifiResult<T> = Result<T, WifiError>;

/// Errors that can occur while managing profiles and connections
#[derive(Error, Debug)]
pub enum WifiError {
    #[error("failed to invoke `{command}`: {source}")]
    CommandFailed {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("command output is not decodable by any candidate encoding")]
    UndecodableOutput,

    #[error("failed to write profile descriptor {}: {source}", path.display())]
    ProfileWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("network name must not be empty")]
    EmptyName,

    #[error("password must not be empty")]
    EmptySecret,

    #[error("\"default\" is reserved and cannot name a network")]
    ReservedName,

    #[error("no stored network named {0}")]
    UnknownProfile(String),

    #[error("no default network is configured")]
    NoDefaultProfile,

    #[error("failed to encode {}: {source}", path.display())]
    StoreEncode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to save {}: {source}", path.display())]
    StoreSave {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
