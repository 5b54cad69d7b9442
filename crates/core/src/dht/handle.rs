//! Dispatch between the local engine and a remote proxy.
use async_trait::async_trait;

use super::chord::PeerRing;
use super::did::Did;
use super::peer::Peer;
use super::types::Chord;
use crate::error::Result;
use crate::transport::RemotePeer;

/// Some peer on the ring, either this process's own engine or a proxy of another one.
#[derive(Debug)]
pub enum PeerHandle<'a> {
    /// Calls go straight into the local state.
    Local(&'a PeerRing),
    /// Calls go over the transport.
    Remote(RemotePeer),
}

#[async_trait]
impl Chord for PeerHandle<'_> {
    fn peer(&self) -> Peer {
        match self {
            PeerHandle::Local(dht) => dht.peer(),
            PeerHandle::Remote(remote) => remote.peer(),
        }
    }

    async fn get_successor(&self) -> Result<Peer> {
        match self {
            PeerHandle::Local(dht) => dht.get_successor().await,
            PeerHandle::Remote(remote) => remote.get_successor().await,
        }
    }

    async fn get_predecessor(&self) -> Result<Option<Peer>> {
        match self {
            PeerHandle::Local(dht) => dht.get_predecessor().await,
            PeerHandle::Remote(remote) => remote.get_predecessor().await,
        }
    }

    async fn find_successor(&self, did: Did) -> Result<Peer> {
        match self {
            PeerHandle::Local(dht) => dht.find_successor(did).await,
            PeerHandle::Remote(remote) => remote.find_successor(did).await,
        }
    }

    async fn closest_preceding_finger(&self, did: Did) -> Result<Peer> {
        match self {
            PeerHandle::Local(dht) => dht.closest_preceding_finger(did).await,
            PeerHandle::Remote(remote) => remote.closest_preceding_finger(did).await,
        }
    }

    async fn notify(&self, candidate: &Peer) -> Result<()> {
        match self {
            PeerHandle::Local(dht) => dht.notify(candidate).await,
            PeerHandle::Remote(remote) => remote.notify(candidate).await,
        }
    }

    async fn ping(&self) -> bool {
        match self {
            PeerHandle::Local(_) => true,
            PeerHandle::Remote(remote) => remote.ping().await,
        }
    }

    async fn get_successors(&self) -> Result<Vec<Peer>> {
        match self {
            PeerHandle::Local(dht) => dht.get_successors().await,
            PeerHandle::Remote(remote) => remote.get_successors().await,
        }
    }
}
