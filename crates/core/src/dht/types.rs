//! The capability set shared by every peer of the ring.
#![warn(missing_docs)]
use async_trait::async_trait;

use super::did::Did;
use super::peer::Peer;
use crate::error::Result;

/// Chord is a distributed hash table (DHT) algorithm that places peers on a ring of
/// identifiers and lets any of them find the peer responsible for an identifier in
/// O(log n) hops. You may want to browse its
/// [wiki](https://en.wikipedia.org/wiki/Chord_(peer-to-peer)) before you read this.
///
/// This trait is what one peer can ask of another. It is implemented by the local
/// engine [PeerRing](super::PeerRing), which answers from its own state, and by
/// [RemotePeer](crate::transport::RemotePeer), which asks over the network. Routing
/// is written once against this trait and never cares where the peer lives.
#[async_trait]
pub trait Chord: Send + Sync {
    /// The peer answering these calls.
    fn peer(&self) -> Peer;

    /// First live entry among the immediate successor and the successor list.
    async fn get_successor(&self) -> Result<Peer>;

    /// Current predecessor, absent until some peer notified us.
    async fn get_predecessor(&self) -> Result<Option<Peer>>;

    /// Peer responsible for `did`.
    async fn find_successor(&self, did: Did) -> Result<Peer>;

    /// Farthest known live peer strictly between the answering peer and `did`,
    /// the answering peer itself when there is none.
    async fn closest_preceding_finger(&self, did: Did) -> Result<Peer>;

    /// `candidate` believes it may be our predecessor.
    async fn notify(&self, candidate: &Peer) -> Result<()>;

    /// Liveness check, failures read as `false`.
    async fn ping(&self) -> bool;

    /// The successor list as handed out to predecessors.
    async fn get_successors(&self) -> Result<Vec<Peer>>;
}
