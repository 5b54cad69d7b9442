#![warn(missing_docs)]
use std::ops::Index;

use serde::Deserialize;
use serde::Serialize;

use super::peer::Peer;

/// Finger table of Chord DHT.
/// Entry `i` approximates the successor of `did + 2^i`, entry 0 is the immediate successor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FingerTable {
    finger: Vec<Option<Peer>>,
}

impl FingerTable {
    /// A table of `size` holes, `m` of the ring.
    pub fn new(size: usize) -> Self {
        Self {
            finger: vec![None; size],
        }
    }

    /// The immediate successor, `finger[0]`.
    pub fn successor(&self) -> Option<Peer> {
        self.get(0)
    }

    /// getter
    pub fn get(&self, index: usize) -> Option<Peer> {
        if index >= self.finger.len() {
            return None;
        }
        self.finger[index].clone()
    }

    /// ref getter
    pub fn get_ref(&self, index: usize) -> &Option<Peer> {
        if index >= self.finger.len() {
            return &None;
        }
        &self.finger[index]
    }

    /// setter
    /// The owning node may appear in its own table, a solo ring is its own successor.
    pub fn set(&mut self, index: usize, peer: Peer) {
        tracing::trace!("set finger table index: {} peer: {}", index, peer);
        if index >= self.finger.len() {
            tracing::error!("set finger index out of range, index: {}", index);
            return;
        }
        self.finger[index] = Some(peer);
    }

    /// get finger list
    pub fn list(&self) -> &Vec<Option<Peer>> {
        &self.finger
    }

    /// Dids of the table, `-` for holes. Used for logging.
    pub fn describe(&self) -> String {
        self.finger
            .iter()
            .map(|x| match x {
                Some(p) => p.did.to_string(),
                None => "-".to_string(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Index<usize> for FingerTable {
    type Output = Option<Peer>;
    fn index(&self, index: usize) -> &Self::Output {
        self.get_ref(index)
    }
}
