//! Chord algorithm implement.
#![warn(missing_docs)]
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use async_trait::async_trait;
use rand::Rng;
use serde::Deserialize;
use serde::Serialize;

use super::did::IdentifierSpace;
use super::handle::PeerHandle;
use super::peer::Address;
use super::peer::Peer;
use super::successor::SuccessorSeq;
use super::types::Chord;
use super::FingerTable;
use crate::config::ChordConfig;
use crate::consts::MAX_LOOKUP_HOPS;
use crate::dht::Did;
use crate::dht::SuccessorReader;
use crate::dht::SuccessorWriter;
use crate::error::Error;
use crate::error::Result;
use crate::message::Command;
use crate::message::Payload;
use crate::message::Response;
use crate::transport::RemotePeer;
use crate::transport::Transport;

/// Join progress of a node. There is no way back, a node that loses the ring exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeState {
    /// Built, join not called yet.
    Uninitialized,
    /// Waiting for the bootstrap peer to place us.
    Joining,
    /// Member of the ring, serving every command.
    Active,
}

impl std::fmt::Display for NodeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NodeState::Uninitialized => "uninitialized",
            NodeState::Joining => "joining",
            NodeState::Active => "active",
        };
        write!(f, "{}", s)
    }
}

/// PeerRing is the local engine of a chord peer.
/// It owns the ring state of this node: the finger table, the successor list and
/// the predecessor. Each of them sits behind its own lock, and no lock is ever
/// held across a network call.
pub struct PeerRing {
    /// The did of current node.
    pub did: Did,
    /// Where other peers reach this node.
    pub address: Address,
    /// The ring this node lives on.
    pub space: IdentifierSpace,
    /// [FingerTable] help node to find successor quickly.
    /// `finger[0]` is the next node on the ring.
    pub finger: Arc<Mutex<FingerTable>>,
    /// The nodes after `finger[0]`, used when it stops answering.
    pub successor_seq: SuccessorSeq,
    /// The previous node on the ring.
    pub predecessor: Arc<Mutex<Option<Peer>>>,
    state: Mutex<NodeState>,
    config: ChordConfig,
    bootstrap: Option<Address>,
    transport: Arc<dyn Transport>,
}

/// Information about a node and its view of the ring.
#[derive(Debug, PartialEq, Eq, Deserialize, Serialize, Clone)]
pub struct TopoInfo {
    /// Did of the node.
    pub did: Did,
    /// Address of the node.
    pub address: Address,
    /// Join progress.
    pub state: NodeState,
    /// `finger[0]`
    pub successor: Option<Peer>,
    /// Predecessor
    pub predecessor: Option<Peer>,
    /// Successor list
    pub successors: Vec<Peer>,
    /// Whole finger table, holes included.
    pub finger: Vec<Option<Peer>>,
}

impl TryFrom<&PeerRing> for TopoInfo {
    type Error = Error;
    fn try_from(dht: &PeerRing) -> Result<TopoInfo> {
        let finger = dht.lock_finger()?.list().clone();
        let predecessor = dht.lock_predecessor()?.clone();
        Ok(TopoInfo {
            did: dht.did,
            address: dht.address.clone(),
            state: dht.state()?,
            successor: finger.first().cloned().flatten(),
            predecessor,
            successors: dht.successors().list()?,
            finger,
        })
    }
}

impl std::fmt::Debug for PeerRing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeerRing")
            .field("did", &self.did)
            .field("address", &self.address)
            .field("bootstrap", &self.bootstrap)
            .finish()
    }
}

impl PeerRing {
    /// Build the engine of the node listening on `address`.
    /// Without `bootstrap` the node starts a new ring on join.
    pub fn new(
        address: Address,
        bootstrap: Option<Address>,
        config: ChordConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        let space = config.validate()?;
        let did = space.identifier(&address, 0);
        Ok(Self {
            did,
            address,
            space,
            finger: Arc::new(Mutex::new(FingerTable::new(space.log_size() as usize))),
            successor_seq: SuccessorSeq::new(config.successors),
            predecessor: Arc::new(Mutex::new(None)),
            state: Mutex::new(NodeState::Uninitialized),
            config,
            bootstrap,
            transport,
        })
    }

    /// Configuration snapshot the node was built with.
    pub fn config(&self) -> &ChordConfig {
        &self.config
    }

    /// Peer used to enter the ring, `None` for the node that starts it.
    pub fn bootstrap(&self) -> Option<&Address> {
        self.bootstrap
            .as_ref()
            .filter(|bootstrap| **bootstrap != self.address)
    }

    /// Return successor sequence. The sequence shares its state with the node.
    pub fn successors(&self) -> SuccessorSeq {
        self.successor_seq.clone()
    }

    /// Lock and return MutexGuard of finger table.
    pub fn lock_finger(&self) -> Result<MutexGuard<FingerTable>> {
        self.finger.lock().map_err(|_| Error::DHTSyncLockError)
    }

    /// Lock and return MutexGuard of predecessor.
    pub fn lock_predecessor(&self) -> Result<MutexGuard<Option<Peer>>> {
        self.predecessor.lock().map_err(|_| Error::DHTSyncLockError)
    }

    /// Current join progress.
    pub fn state(&self) -> Result<NodeState> {
        self.state
            .lock()
            .map(|s| *s)
            .map_err(|_| Error::DHTSyncLockError)
    }

    fn set_state(&self, state: NodeState) -> Result<()> {
        let mut current = self.state.lock().map_err(|_| Error::DHTSyncLockError)?;
        tracing::debug!("node {} state {} -> {}", self.did, *current, state);
        *current = state;
        Ok(())
    }

    /// This node as a ring member.
    pub fn local_peer(&self) -> Peer {
        Peer::new(self.did, self.address.clone())
    }

    /// Proxy of the peer listening on `address`.
    pub fn remote(&self, address: Address) -> RemotePeer {
        RemotePeer::new(
            self.space.peer(address),
            self.space,
            self.transport.clone(),
            self.config.retry,
        )
    }

    /// Handle to talk to `peer`: local calls for this node, the transport otherwise.
    pub fn handle(&self, peer: &Peer) -> PeerHandle<'_> {
        if peer.address == self.address {
            PeerHandle::Local(self)
        } else {
            PeerHandle::Remote(RemotePeer::new(
                peer.clone(),
                self.space,
                self.transport.clone(),
                self.config.retry,
            ))
        }
    }

    /// Enter the ring.
    ///
    /// The node starting a ring is its own successor. Any other node asks its bootstrap
    /// peer for the successor of its own did. Failing to reach the bootstrap peer, or
    /// finding our identifier already taken, is a fatal [Error::JoinFailed] or
    /// [Error::IdentifierCollision].
    #[tracing::instrument(level = "trace", skip(self), err)]
    pub async fn join(&self) -> Result<()> {
        self.set_state(NodeState::Joining)?;
        let successor = match self.bootstrap() {
            None => self.local_peer(),
            Some(bootstrap) => {
                let successor = self
                    .remote(bootstrap.clone())
                    .find_successor(self.did)
                    .await
                    .map_err(|e| Error::JoinFailed {
                        bootstrap: bootstrap.clone(),
                        source: Box::new(e),
                    })?;
                if successor.did == self.did && successor.address != self.address {
                    return Err(Error::IdentifierCollision {
                        did: self.did,
                        address: self.address.clone(),
                        other: successor.address,
                    });
                }
                successor
            }
        };
        self.lock_finger()?.set(0, successor);
        self.set_state(NodeState::Active)?;
        tracing::info!("{} with id ({}) joined.", self.address, self.did);
        Ok(())
    }

    /// Walk the fingers towards `did` and return the node whose successor is responsible for it.
    #[tracing::instrument(level = "trace", skip(self), ret, err)]
    pub async fn find_predecessor(&self, did: Did) -> Result<Peer> {
        let did = self.space.did(did.into());
        let mut node = self.local_peer();
        let mut successor = self.get_successor().await?;
        if successor.did == self.did {
            return Ok(node);
        }

        let mut hops = 0;
        while !self.space.in_range(
            did,
            self.space.offset(node.did, 1),
            self.space.offset(successor.did, 1),
        ) {
            if hops >= MAX_LOOKUP_HOPS {
                return Err(Error::LookupExhausted(did, hops));
            }
            hops += 1;

            let next = self.handle(&node).closest_preceding_finger(did).await?;
            if next == node {
                // Nothing closer is known yet, fingers will catch up.
                tracing::debug!("lookup of {} stalled at {}", did, node);
                break;
            }
            successor = self.handle(&next).get_successor().await?;
            node = next;
        }
        Ok(node)
    }

    /// Periodic repair of `finger[0]` and of the successor's predecessor.
    #[tracing::instrument(level = "trace", skip(self), err)]
    pub async fn stabilize(&self) -> Result<()> {
        let previous = self.lock_finger()?.successor();
        let successor = self.get_successor().await?;
        if previous.as_ref() != Some(&successor) {
            tracing::info!(
                "successor of {} switched from {:?} to {}",
                self.did,
                previous.map(|p| p.to_string()),
                successor
            );
        }

        let lower = self.space.offset(self.did, 1);
        let candidate = self.handle(&successor).get_predecessor().await?;
        if let Some(x) = candidate {
            if lower != successor.did
                && self.space.in_range(x.did, lower, successor.did)
                && self.handle(&x).ping().await
            {
                self.lock_finger()?.set(0, x);
            }
        }

        let successor = self.get_successor().await?;
        tracing::debug!("new successor is -> {}", successor);
        self.handle(&successor).notify(&self.local_peer()).await
    }

    /// Refresh one finger picked at random. `finger[0]` belongs to [PeerRing::stabilize].
    #[tracing::instrument(level = "trace", skip(self), err)]
    pub async fn fix_fingers(&self) -> Result<()> {
        let m = self.space.log_size() as usize;
        if m < 2 {
            return Ok(());
        }
        let index = {
            let mut rng = rand::thread_rng();
            rng.gen_range(1..m)
        };
        self.fix_finger(index).await
    }

    /// Set `finger[index]` to the successor of `did + 2^index`.
    #[tracing::instrument(level = "trace", skip(self), err)]
    pub async fn fix_finger(&self, index: usize) -> Result<()> {
        let start = self.space.finger_start(self.did, index);
        let peer = self.find_successor(start).await?;
        let mut finger = self.lock_finger()?;
        finger.set(index, peer);
        tracing::debug!(
            "finger table for node {} is -> [{}]",
            self.did,
            finger.describe()
        );
        Ok(())
    }

    /// Rebuild the successor list from the successor's own list.
    #[tracing::instrument(level = "trace", skip(self), err)]
    pub async fn update_successors(&self) -> Result<()> {
        let successor = self.get_successor().await?;
        if successor.did == self.did {
            return self.successor_seq.clear();
        }
        let mut list = vec![successor.clone()];
        list.extend(self.handle(&successor).get_successors().await?);
        tracing::debug!(
            "successor list for node {} is -> [{}]",
            self.did,
            list.iter()
                .map(|p| p.did.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
        self.successor_seq.replace(list)
    }

    /// Adopt `candidate` as predecessor if it is closer than the current one.
    /// Returns whether the predecessor changed.
    pub fn rectify(&self, candidate: &Peer) -> Result<bool> {
        if candidate.did == self.did && candidate.address != self.address {
            tracing::warn!(
                "ignore notify from {}, its identifier {} collides with {}",
                candidate.address,
                candidate.did,
                self.address
            );
            return Ok(false);
        }
        let mut predecessor = self.lock_predecessor()?;
        let adopt = match predecessor.as_ref() {
            None => true,
            Some(pred) => {
                pred.address != candidate.address
                    && self.space.in_range(
                        candidate.did,
                        self.space.offset(pred.did, 1),
                        self.did,
                    )
            }
        };
        if adopt {
            tracing::debug!("predecessor of {} is -> {}", self.did, candidate);
            *predecessor = Some(candidate.clone());
        }
        Ok(adopt)
    }

    /// Answer an inbound command. Only `PING` is served before the node joined.
    #[tracing::instrument(level = "trace", skip(self), fields(node = %self.did), ret, err)]
    pub async fn handle_command(&self, command: Command) -> Result<Response> {
        if !matches!(command, Command::Ping) && self.state()? != NodeState::Active {
            return Err(Error::NotJoined);
        }
        let resp = match command {
            Command::Ping => Response::with(Payload::Flag(self.ping().await)),
            Command::GetSuccessor => {
                Response::with(Payload::Address(self.get_successor().await?.address))
            }
            Command::GetPredecessor => Response {
                data: self
                    .get_predecessor()
                    .await?
                    .map(|p| Payload::Address(p.address)),
            },
            Command::FindSuccessor(payload) => Response::with(Payload::Address(
                self.find_successor(payload.identifier).await?.address,
            )),
            Command::ClosestPrecedingFinger(payload) => Response::with(Payload::Address(
                self.closest_preceding_finger(payload.identifier)
                    .await?
                    .address,
            )),
            Command::Notify(address) => {
                self.notify(&self.space.peer(address)).await?;
                Response::empty()
            }
            Command::GetSuccessors => Response::with(Payload::Addresses(
                self.get_successors()
                    .await?
                    .into_iter()
                    .map(|p| p.address)
                    .collect(),
            )),
        };
        Ok(resp)
    }

    /// A helper function to get the topological info about the node.
    pub fn topo_info(&self) -> Result<TopoInfo> {
        TopoInfo::try_from(self)
    }
}

#[async_trait]
impl Chord for PeerRing {
    fn peer(&self) -> Peer {
        self.local_peer()
    }

    /// Ping `[finger[0]] ++ successors` in order and make the first live one `finger[0]`.
    #[tracing::instrument(level = "trace", skip(self), ret, err)]
    async fn get_successor(&self) -> Result<Peer> {
        let candidates = {
            let finger = self.lock_finger()?;
            finger
                .successor()
                .into_iter()
                .chain(self.successor_seq.list()?)
                .collect::<Vec<_>>()
        };
        let current = match candidates.first() {
            Some(peer) => peer.clone(),
            None => return Err(Error::NotJoined),
        };

        let mut tried: Vec<Did> = vec![];
        for candidate in candidates {
            if tried.contains(&candidate.did) {
                continue;
            }
            tried.push(candidate.did);
            if self.handle(&candidate).ping().await {
                if candidate.address != current.address {
                    tracing::info!(
                        "successor {} of {} is down, fall back to {}",
                        current,
                        self.did,
                        candidate
                    );
                    self.lock_finger()?.set(0, candidate.clone());
                }
                return Ok(candidate);
            }
            tracing::debug!("successor candidate {} is not responding", candidate);
        }
        Err(Error::NoLiveSuccessor)
    }

    #[tracing::instrument(level = "trace", skip(self), ret, err)]
    async fn get_predecessor(&self) -> Result<Option<Peer>> {
        Ok(self.lock_predecessor()?.clone())
    }

    #[tracing::instrument(level = "trace", skip(self), ret, err)]
    async fn find_successor(&self, did: Did) -> Result<Peer> {
        let did = self.space.did(did.into());
        let predecessor = self.lock_predecessor()?.clone();
        if let Some(pred) = predecessor {
            if self.space.in_range(
                did,
                self.space.offset(pred.did, 1),
                self.space.offset(self.did, 1),
            ) {
                return Ok(self.local_peer());
            }
        }
        let node = self.find_predecessor(did).await?;
        self.handle(&node).get_successor().await
    }

    /// Scan `successors ++ finger` from the far end for a live peer in `[did + 1, target)`.
    #[tracing::instrument(level = "trace", skip(self), ret, err)]
    async fn closest_preceding_finger(&self, did: Did) -> Result<Peer> {
        let did = self.space.did(did.into());
        let candidates = {
            let finger = self.lock_finger()?;
            self.successor_seq
                .list()?
                .into_iter()
                .chain(finger.list().iter().flatten().cloned())
                .collect::<Vec<_>>()
        };

        let lower = self.space.offset(self.did, 1);
        let mut tried: Vec<Did> = vec![];
        for candidate in candidates.into_iter().rev() {
            if !self.space.in_range(candidate.did, lower, did) || tried.contains(&candidate.did) {
                continue;
            }
            tried.push(candidate.did);
            if self.handle(&candidate).ping().await {
                return Ok(candidate);
            }
        }
        Ok(self.local_peer())
    }

    #[tracing::instrument(level = "trace", skip(self), ret, err)]
    async fn notify(&self, candidate: &Peer) -> Result<()> {
        self.rectify(candidate).map(|_| ())
    }

    #[tracing::instrument(level = "trace", skip(self), ret)]
    async fn ping(&self) -> bool {
        true
    }

    #[tracing::instrument(level = "trace", skip(self), ret, err)]
    async fn get_successors(&self) -> Result<Vec<Peer>> {
        self.successor_seq.shareable()
    }
}
