//! Successor for PeerRing
use std::sync::Arc;
use std::sync::RwLock;
use std::sync::RwLockReadGuard;

use super::peer::Peer;
use crate::error::Error;
use crate::error::Result;

/// A sequence of successors for a node on the ring.
/// It's necessary to have multiple successors to prevent a single point of failure.
/// The list is the ring walk starting at the current successor, so it is ordered
/// by clockwise distance from the node.
#[derive(Debug, Clone)]
pub struct SuccessorSeq {
    /// Max successor num
    max: usize,
    /// Successors
    successors: Arc<RwLock<Vec<Peer>>>,
}

/// Read access of a [SuccessorSeq].
pub trait SuccessorReader {
    /// No fallback known.
    fn is_empty(&self) -> Result<bool>;
    /// Number of entries.
    fn len(&self) -> Result<usize>;
    /// Entry at `index`, if any.
    fn get(&self, index: usize) -> Result<Option<Peer>>;
    /// Snapshot of all entries.
    fn list(&self) -> Result<Vec<Peer>>;
    /// Snapshot capped to what is handed out to predecessors, `max - 1` entries.
    fn shareable(&self) -> Result<Vec<Peer>>;
}

/// Write access of a [SuccessorSeq].
pub trait SuccessorWriter {
    /// Replace the whole list.
    fn replace(&self, successors: Vec<Peer>) -> Result<()>;
    /// Drop every entry.
    fn clear(&self) -> Result<()>;
}

impl SuccessorSeq {
    /// Create an empty sequence holding up to `max` successors.
    pub fn new(max: usize) -> Self {
        Self {
            max,
            successors: Arc::new(RwLock::new(vec![])),
        }
    }

    /// Max successor num
    pub fn max(&self) -> usize {
        self.max
    }

    fn successors(&self) -> Result<RwLockReadGuard<Vec<Peer>>> {
        self.successors
            .read()
            .map_err(|_| Error::DHTSyncLockError)
    }
}

impl SuccessorReader for SuccessorSeq {
    fn is_empty(&self) -> Result<bool> {
        Ok(self.successors()?.is_empty())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.successors()?.len())
    }

    fn get(&self, index: usize) -> Result<Option<Peer>> {
        Ok(self.successors()?.get(index).cloned())
    }

    fn list(&self) -> Result<Vec<Peer>> {
        Ok(self.successors()?.clone())
    }

    fn shareable(&self) -> Result<Vec<Peer>> {
        let succs = self.successors()?;
        Ok(succs
            .iter()
            .take(self.max.saturating_sub(1))
            .cloned()
            .collect())
    }
}

impl SuccessorWriter for SuccessorSeq {
    fn replace(&self, successors: Vec<Peer>) -> Result<()> {
        let mut succs = self
            .successors
            .write()
            .map_err(|_| Error::DHTSyncLockError)?;
        *succs = successors;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.replace(vec![])
    }
}
