#![warn(missing_docs)]
//! This module defines the command table spoken between chord peers.
//! Every command is a request with an optional payload, answered by a [Response]
//! carrying an optional [Payload].

use serde::Deserialize;
use serde::Serialize;

use crate::dht::Address;
use crate::dht::Did;

/// Payload of commands that are parameterized by a ring position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierPayload {
    /// Target position on the ring.
    pub identifier: Did,
}

/// A command sent to a peer, `{"cmd": "..", "data": ..}` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    /// Ask for the first live successor.
    GetSuccessor,
    /// Ask for the current predecessor, may be absent.
    GetPredecessor,
    /// Resolve the peer responsible for an identifier.
    FindSuccessor(IdentifierPayload),
    /// Ask for the closest live finger preceding an identifier.
    ClosestPrecedingFinger(IdentifierPayload),
    /// Tell the peer that the given address might be its predecessor.
    Notify(Address),
    /// Ask for the successor list.
    GetSuccessors,
    /// Liveness check.
    Ping,
}

impl Command {
    /// Wire name of the command.
    pub fn name(&self) -> &'static str {
        match self {
            Command::GetSuccessor => "GET_SUCCESSOR",
            Command::GetPredecessor => "GET_PREDECESSOR",
            Command::FindSuccessor(_) => "FIND_SUCCESSOR",
            Command::ClosestPrecedingFinger(_) => "CLOSEST_PRECEDING_FINGER",
            Command::Notify(_) => "NOTIFY",
            Command::GetSuccessors => "GET_SUCCESSORS",
            Command::Ping => "PING",
        }
    }
}

/// Response payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    /// Answer of `PING`.
    Flag(bool),
    /// A single peer.
    Address(Address),
    /// An ordered list of peers.
    Addresses(Vec<Address>),
}

/// Answer to a [Command], `{"data": ..}` on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Absent when the command has nothing to report.
    #[serde(default)]
    pub data: Option<Payload>,
}

impl Response {
    /// A response carrying `payload`.
    pub fn with(payload: Payload) -> Self {
        Self {
            data: Some(payload),
        }
    }

    /// A response carrying nothing.
    pub fn empty() -> Self {
        Self::default()
    }
}
