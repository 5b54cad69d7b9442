//! Configuration snapshot consumed by [PeerRing](crate::dht::PeerRing) at construction.
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::consts::DEFAULT_FIX_FINGERS_INTERVAL_MS;
use crate::consts::DEFAULT_LOG_SIZE;
use crate::consts::DEFAULT_STABILIZE_INTERVAL_MS;
use crate::consts::DEFAULT_SUCCESSORS;
use crate::consts::DEFAULT_UPDATE_SUCCESSORS_INTERVAL_MS;
use crate::dht::IdentifierSpace;
use crate::error::Error;
use crate::error::Result;
use crate::transport::RetryPolicy;

/// Ring parameters and timing of the background loops.
/// It is never reloaded once a node is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordConfig {
    /// `m`, the ring holds `2^m` identifiers.
    pub log_size: u8,
    /// `r`, length of the successor list.
    pub successors: usize,
    /// Pause between two stabilize rounds.
    pub stabilize_interval: Duration,
    /// Pause between two finger repairs.
    pub fix_fingers_interval: Duration,
    /// Pause between two successor list refreshes.
    pub update_successors_interval: Duration,
    /// Retry and backoff of outbound calls.
    pub retry: RetryPolicy,
}

impl Default for ChordConfig {
    fn default() -> Self {
        Self {
            log_size: DEFAULT_LOG_SIZE,
            successors: DEFAULT_SUCCESSORS,
            stabilize_interval: Duration::from_millis(DEFAULT_STABILIZE_INTERVAL_MS),
            fix_fingers_interval: Duration::from_millis(DEFAULT_FIX_FINGERS_INTERVAL_MS),
            update_successors_interval: Duration::from_millis(
                DEFAULT_UPDATE_SUCCESSORS_INTERVAL_MS,
            ),
            retry: RetryPolicy::default(),
        }
    }
}

impl ChordConfig {
    /// Check every field, then return the identifier space it describes.
    pub fn validate(&self) -> Result<IdentifierSpace> {
        if self.successors == 0 {
            return Err(Error::InvalidConfig(
                "successor list size must be at least 1".to_string(),
            ));
        }
        if self.retry.limit == 0 {
            return Err(Error::InvalidConfig(
                "retry limit must be at least 1".to_string(),
            ));
        }
        IdentifierSpace::new(self.log_size)
    }
}
