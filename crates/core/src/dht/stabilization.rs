//! Stabilization run daemons to maintain dht.

use std::sync::Arc;

use futures_timer::Delay;

use crate::dht::PeerRing;
use crate::error::Error;
use crate::error::Result;

/// The stabilization runner.
/// It drives the three repair loops of a joined node, each on its own interval.
#[derive(Clone)]
pub struct Stabilizer {
    dht: Arc<PeerRing>,
}

impl Stabilizer {
    /// Create a new stabilization runner.
    pub fn new(dht: Arc<PeerRing>) -> Self {
        Self { dht }
    }

    /// Run the loops until one of them hits a fatal error, which is returned.
    /// Any other failure is logged and the loop carries on at its next tick.
    pub async fn run(&self) -> Result<()> {
        futures::try_join!(
            self.wait_stabilize(),
            self.wait_fix_fingers(),
            self.wait_update_successors()
        )
        .map(|_| ())
    }

    /// Same as [Stabilizer::run] on the tokio runtime.
    pub fn spawn(self) -> tokio::task::JoinHandle<Result<()>> {
        tokio::spawn(async move { self.run().await })
    }

    async fn wait_stabilize(&self) -> Result<()> {
        let interval = self.dht.config().stabilize_interval;
        loop {
            absorb("stabilize", self.dht.stabilize().await)?;
            Delay::new(interval).await;
        }
    }

    async fn wait_fix_fingers(&self) -> Result<()> {
        let interval = self.dht.config().fix_fingers_interval;
        loop {
            absorb("fix_fingers", self.dht.fix_fingers().await)?;
            Delay::new(interval).await;
        }
    }

    async fn wait_update_successors(&self) -> Result<()> {
        let interval = self.dht.config().update_successors_interval;
        loop {
            absorb("update_successors", self.dht.update_successors().await)?;
            Delay::new(interval).await;
        }
    }
}

/// Keep fatal errors, log and drop the rest.
fn absorb(task: &str, result: Result<()>) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.is_fatal() => {
            tracing::error!("[{}] fatal: {}", task, e);
            Err(e)
        }
        Err(e) if e.is_transient() => {
            tracing::debug!("[{}] {}", task, e);
            Ok(())
        }
        Err(Error::NotJoined) => Ok(()),
        Err(e) => {
            tracing::error!("[{}] Failed: {:?}", task, e);
            Ok(())
        }
    }
}
