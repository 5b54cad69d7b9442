#![warn(missing_docs)]
//! Implementation of the Chord DHT,
//! ref: <https://pdos.csail.mit.edu/papers/ton:chord/paper-ton.pdf>
//! With high probability, the number of nodes that must be contacted to find a successor in an N-node network is O(log N).

mod chord;
pub mod did;
/// Finger table of a node.
pub mod finger;
mod handle;
pub mod peer;
mod stabilization;
pub mod successor;
pub mod types;

pub use chord::NodeState;
pub use chord::PeerRing;
pub use chord::TopoInfo;
pub use did::Did;
pub use did::IdentifierSpace;
pub use finger::FingerTable;
pub use handle::PeerHandle;
pub use peer::Address;
pub use peer::Peer;
pub use stabilization::Stabilizer;
pub use successor::SuccessorReader;
pub use successor::SuccessorWriter;
pub use types::Chord;
