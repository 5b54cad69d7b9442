//! Commands exchanged between chord peers.
pub mod types;
pub use types::Command;
pub use types::IdentifierPayload;
pub use types::Payload;
pub use types::Response;
