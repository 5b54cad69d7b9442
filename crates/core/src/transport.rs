//! Outbound side of the protocol: the [Transport] seam, its retry policy and the
//! [RemotePeer] proxy that speaks the command table through it.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_timer::Delay;
use serde::Deserialize;
use serde::Serialize;

use crate::consts::DEFAULT_RETRY_BASE_MS;
use crate::consts::DEFAULT_RETRY_LIMIT;
use crate::dht::Address;
use crate::dht::Chord;
use crate::dht::Did;
use crate::dht::IdentifierSpace;
use crate::dht::Peer;
use crate::error::Error;
use crate::error::Result;
use crate::message::Command;
use crate::message::IdentifierPayload;
use crate::message::Payload;
use crate::message::Response;

/// A request/response channel to other peers.
/// One call is one attempt, retries are applied by [RemotePeer].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver `command` to the peer listening on `to` and wait for its answer.
    async fn send(&self, to: &Address, command: &Command) -> Result<Response>;
}

/// Exponential backoff of outbound calls.
///
/// Attempt `k` (starting at 0) that fails is followed by a pause of `base * 2^k`,
/// there is no pause after the last attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Number of attempts.
    pub limit: u32,
    /// Backoff unit.
    pub base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            limit: DEFAULT_RETRY_LIMIT,
            base: Duration::from_millis(DEFAULT_RETRY_BASE_MS),
        }
    }
}

impl RetryPolicy {
    /// Build a policy.
    pub fn new(limit: u32, base: Duration) -> Self {
        Self { limit, base }
    }

    /// Pause after the failed attempt `attempt`, none after the last one.
    pub fn backoff(&self, attempt: u32) -> Option<Duration> {
        if attempt + 1 >= self.limit {
            return None;
        }
        Some(self.base.saturating_mul(1u32.checked_shl(attempt).unwrap_or(u32::MAX)))
    }
}

/// Proxy of a peer living in another process.
#[derive(Clone)]
pub struct RemotePeer {
    peer: Peer,
    space: IdentifierSpace,
    transport: Arc<dyn Transport>,
    retry: RetryPolicy,
}

impl std::fmt::Debug for RemotePeer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemotePeer")
            .field("peer", &self.peer)
            .field("retry", &self.retry)
            .finish()
    }
}

impl RemotePeer {
    /// Wrap `peer` so that calls go through `transport`.
    pub fn new(
        peer: Peer,
        space: IdentifierSpace,
        transport: Arc<dyn Transport>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            peer,
            space,
            transport,
            retry,
        }
    }

    /// Send `command`, retrying with backoff until it succeeds or the policy is exhausted.
    pub async fn call(&self, command: &Command) -> Result<Response> {
        let address = &self.peer.address;
        for attempt in 0..self.retry.limit {
            match self.transport.send(address, command).await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    tracing::trace!(
                        "{} to {} failed at attempt {}: {}",
                        command.name(),
                        address,
                        attempt,
                        e
                    );
                    if let Some(pause) = self.retry.backoff(attempt) {
                        Delay::new(pause).await;
                    }
                }
            }
        }
        Err(Error::Unreachable(address.clone()))
    }

    async fn call_for_peer(&self, command: Command) -> Result<Peer> {
        match self.call(&command).await?.data {
            Some(Payload::Address(address)) => Ok(self.space.peer(address)),
            other => Err(Error::UnexpectedResponse {
                command: command.name(),
                reason: format!("expected an address, got {:?}", other),
            }),
        }
    }
}

#[async_trait]
impl Chord for RemotePeer {
    fn peer(&self) -> Peer {
        self.peer.clone()
    }

    #[tracing::instrument(level = "trace", skip(self), fields(peer = %self.peer.address), ret, err)]
    async fn get_successor(&self) -> Result<Peer> {
        self.call_for_peer(Command::GetSuccessor).await
    }

    #[tracing::instrument(level = "trace", skip(self), fields(peer = %self.peer.address), ret, err)]
    async fn get_predecessor(&self) -> Result<Option<Peer>> {
        let command = Command::GetPredecessor;
        match self.call(&command).await?.data {
            Some(Payload::Address(address)) => Ok(Some(self.space.peer(address))),
            None => Ok(None),
            other => Err(Error::UnexpectedResponse {
                command: command.name(),
                reason: format!("expected an optional address, got {:?}", other),
            }),
        }
    }

    #[tracing::instrument(level = "trace", skip(self), fields(peer = %self.peer.address), ret, err)]
    async fn find_successor(&self, did: Did) -> Result<Peer> {
        self.call_for_peer(Command::FindSuccessor(IdentifierPayload { identifier: did }))
            .await
    }

    #[tracing::instrument(level = "trace", skip(self), fields(peer = %self.peer.address), ret, err)]
    async fn closest_preceding_finger(&self, did: Did) -> Result<Peer> {
        self.call_for_peer(Command::ClosestPrecedingFinger(IdentifierPayload {
            identifier: did,
        }))
        .await
    }

    #[tracing::instrument(level = "trace", skip(self), fields(peer = %self.peer.address), ret, err)]
    async fn notify(&self, candidate: &Peer) -> Result<()> {
        self.call(&Command::Notify(candidate.address.clone()))
            .await
            .map(|_| ())
    }

    #[tracing::instrument(level = "trace", skip(self), fields(peer = %self.peer.address), ret)]
    async fn ping(&self) -> bool {
        matches!(
            self.call(&Command::Ping).await,
            Ok(Response {
                data: Some(Payload::Flag(true))
            })
        )
    }

    #[tracing::instrument(level = "trace", skip(self), fields(peer = %self.peer.address), ret, err)]
    async fn get_successors(&self) -> Result<Vec<Peer>> {
        let command = Command::GetSuccessors;
        match self.call(&command).await?.data {
            Some(Payload::Addresses(list)) => {
                Ok(list.into_iter().map(|a| self.space.peer(a)).collect())
            }
            other => Err(Error::UnexpectedResponse {
                command: command.name(),
                reason: format!("expected a list of addresses, got {:?}", other),
            }),
        }
    }
}
