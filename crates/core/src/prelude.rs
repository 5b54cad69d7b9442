//! prelude

pub use async_trait;
pub use futures;

pub use crate::config::ChordConfig;
pub use crate::dht::Address;
pub use crate::dht::Chord;
pub use crate::dht::Did;
pub use crate::dht::IdentifierSpace;
pub use crate::dht::NodeState;
pub use crate::dht::Peer;
pub use crate::dht::PeerRing;
pub use crate::dht::Stabilizer;
pub use crate::dht::TopoInfo;
pub use crate::message::Command;
pub use crate::message::Response;
pub use crate::transport::RetryPolicy;
pub use crate::transport::Transport;
