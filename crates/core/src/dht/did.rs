#![warn(missing_docs)]

//! Identifiers of the chord ring.
//!
//! The ring is the cyclic group of integers modulo `N = 2^m`, where `m` is the
//! configured log size. Every peer address is mapped onto the ring with SHA-256,
//! so independent processes always agree on the position of an address.
//!
//! All interval tests of the protocol go through [IdentifierSpace::in_range],
//! which works on half-open intervals `[a, b)` walking clockwise and treats
//! `a == b` as the whole ring.

use num_bigint::BigUint;
use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;

use super::peer::Address;
use super::peer::Peer;
use crate::consts::MAX_LOG_SIZE;
use crate::error::Error;
use crate::error::Result;

/// Did is a position on the ring, always inside `[0, 2^m)` of the space that produced it.
#[derive(Copy, Clone, Eq, Ord, PartialEq, PartialOrd, Debug, Serialize, Deserialize, Hash)]
#[serde(transparent)]
pub struct Did(u64);

impl std::fmt::Display for Did {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Did {
    fn from(id: u64) -> Did {
        Did(id)
    }
}

impl From<Did> for u64 {
    fn from(did: Did) -> u64 {
        did.0
    }
}

/// The fixed-size modular ring that peers and keys are placed on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierSpace {
    log_size: u8,
}

impl IdentifierSpace {
    /// Create a ring of `2^log_size` positions.
    pub fn new(log_size: u8) -> Result<Self> {
        if log_size == 0 || log_size > MAX_LOG_SIZE {
            return Err(Error::InvalidConfig(format!(
                "log size must be in 1..={MAX_LOG_SIZE}, got {log_size}"
            )));
        }
        Ok(Self { log_size })
    }

    /// The `m` of `N = 2^m`, also the length of a finger table.
    pub fn log_size(&self) -> u8 {
        self.log_size
    }

    /// Number of positions on the ring.
    pub fn size(&self) -> u64 {
        1u64 << self.log_size
    }

    fn mask(&self) -> u64 {
        self.size() - 1
    }

    /// Reduce any integer onto the ring.
    pub fn did(&self, value: u64) -> Did {
        Did(value & self.mask())
    }

    /// `did + offset (mod N)`.
    pub fn offset(&self, did: Did, offset: u64) -> Did {
        // N divides 2^64, so wrapping then masking is exact.
        self.did(did.0.wrapping_add(offset))
    }

    /// Start of the `i`-th finger interval of `did`, that is `did + 2^i (mod N)`.
    pub fn finger_start(&self, did: Did, index: usize) -> Did {
        self.offset(did, 1u64 << index)
    }

    /// Stable identifier of an address plus `offset`, modulo `N`.
    ///
    /// The digest input is the ip immediately followed by the decimal port.
    pub fn identifier(&self, address: &Address, offset: u64) -> Did {
        let digest = Sha256::new()
            .chain_update(address.key().as_bytes())
            .finalize();
        let reduced = BigUint::from_bytes_be(&digest) % BigUint::from(self.size());
        let value = reduced.to_u64_digits().first().copied().unwrap_or(0);
        self.offset(Did(value), offset)
    }

    /// Place an address on the ring.
    pub fn peer(&self, address: Address) -> Peer {
        let did = self.identifier(&address, 0);
        Peer::new(did, address)
    }

    /// Test `c <- [a, b)` walking clockwise. When `a == b` the interval is the full ring.
    pub fn in_range(&self, c: Did, a: Did, b: Did) -> bool {
        let (a, b, c) = (self.did(a.0), self.did(b.0), self.did(c.0));
        if a < b {
            return a <= c && c < b;
        }
        a <= c || c < b
    }
}
