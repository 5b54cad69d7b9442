//! Chord: a peer of a Chord structured overlay.
//! --------------
//! - [PeerRing](crate::dht::PeerRing) owns the ring state of one node (finger table, successor list,
//!   predecessor) and implements join, the routing algorithms and the repair rounds.
//! - [Chord](crate::dht::Chord) is what one peer can ask of another. It is implemented by the local
//!   engine and by [RemotePeer](crate::transport::RemotePeer), so routing is oblivious to locality.
//! - [Transport](crate::transport::Transport) is the request/response seam to other processes.
//!   The crate ships no network stack, see `chord-node` for HTTP.
//! - [Stabilizer](crate::dht::Stabilizer) runs `stabilize`, `fix_fingers` and `update_successors`
//!   forever, each on its own interval.
//!
//! # Join
//!
//! The first node of a ring is its own successor. Any other node asks a bootstrap peer for the
//! successor of its own identifier, then the repair rounds pull it into place:
//!
//! 1. `stabilize` asks the successor for its predecessor and adopts it when it sits between,
//!    then notifies the successor.
//! 2. `notify` lets the successor take the node as predecessor.
//! 3. `fix_fingers` and `update_successors` fill the finger table and the fallback list.
//!
//! # Identifiers
//!
//! Identifiers are SHA-256 digests of `ip` followed by `port`, reduced modulo `2^m`, so every
//! process agrees on where an address sits.
#![warn(missing_docs)]
pub mod config;
pub mod consts;
pub mod dht;
pub mod error;
pub mod message;
pub mod prelude;
pub mod transport;
#[cfg(test)]
mod tests;
