//! A prelude is provided which imports all the important data types and traits of chord-node.
/// Use this when you want to quickly bootstrap a new project.
pub use async_trait::async_trait;
pub use chord_core;
pub use http;
pub use reqwest;

pub use self::chord_core::dht::Address;
pub use self::chord_core::dht::Chord;
pub use self::chord_core::dht::Did;
pub use self::chord_core::dht::PeerRing;
pub use self::chord_core::dht::Stabilizer;
pub use self::chord_core::dht::TopoInfo;
pub use self::chord_core::message::Command;
pub use self::chord_core::message::Response;
pub use self::chord_core::transport::Transport;
