//! Addresses and peers of the ring.
use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use super::did::Did;
use crate::error::Error;
use crate::error::Result;

/// Network address of a peer, `{ip, port}` on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    /// Host the peer listens on.
    pub ip: String,
    /// Port the peer listens on.
    pub port: u16,
}

impl Address {
    /// Build an address.
    pub fn new(ip: impl Into<String>, port: u16) -> Self {
        Self {
            ip: ip.into(),
            port,
        }
    }

    /// Bytes fed into the identifier hash.
    pub(crate) fn key(&self) -> String {
        format!("{}{}", self.ip, self.port)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (ip, port) = s
            .rsplit_once(':')
            .ok_or_else(|| Error::InvalidAddress(s.to_string()))?;
        if ip.is_empty() {
            return Err(Error::InvalidAddress(s.to_string()));
        }
        let port = port
            .parse::<u16>()
            .map_err(|_| Error::InvalidAddress(s.to_string()))?;
        Ok(Self::new(ip, port))
    }
}

/// A peer is an address placed on the ring.
///
/// Two peers are the same ring position iff their dids are equal, so
/// equality, hashing and ordering only look at the did.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Peer {
    /// Position on the ring.
    pub did: Did,
    /// Where to reach it.
    pub address: Address,
}

impl Peer {
    /// Build a peer from a precomputed did.
    pub fn new(did: Did, address: Address) -> Self {
        Self { did, address }
    }
}

impl PartialEq for Peer {
    fn eq(&self, other: &Self) -> bool {
        self.did == other.did
    }
}

impl Eq for Peer {}

impl Hash for Peer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.did.hash(state)
    }
}

impl PartialOrd for Peer {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Peer {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.did.cmp(&other.did)
    }
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.address, self.did)
    }
}
