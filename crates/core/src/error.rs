//! Error of chord_core

use crate::dht::Address;
use crate::dht::Did;

/// A wrap `Result` contains custom errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors collections in chord-core.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("Can not connect to node {0}")]
    Unreachable(Address),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected response to {command}: {reason}")]
    UnexpectedResponse {
        command: &'static str,
        reason: String,
    },

    #[error("Node has not joined the ring yet")]
    NotJoined,

    #[error("Failed to join the ring via {bootstrap}: {source}")]
    JoinFailed {
        bootstrap: Address,
        #[source]
        source: Box<Error>,
    },

    #[error("No successor available")]
    NoLiveSuccessor,

    #[error("Identifier {did} of {address} is already taken by {other}")]
    IdentifierCollision {
        did: Did,
        address: Address,
        other: Address,
    },

    #[error("Lookup of identifier {0} exceeded {1} hops")]
    LookupExhausted(Did, usize),

    #[error("Failed on lock DHT state")]
    DHTSyncLockError,

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("JSON serialization error")]
    Serialize(#[source] serde_json::Error),

    #[error("JSON deserialization error")]
    Deserialize(#[source] serde_json::Error),
}

impl Error {
    /// A fatal error means the node lost the ring or never reached it.
    /// The process hosting the node is expected to terminate.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::JoinFailed { .. } | Error::IdentifierCollision { .. } | Error::NoLiveSuccessor
        )
    }

    /// Network level failures that go away by themselves once the peer is back
    /// or the ring has repaired around it.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Unreachable(_) | Error::Transport(_))
    }
}
