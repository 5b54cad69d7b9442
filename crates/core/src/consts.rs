//! Constant variables.

/// Default log2 of the identifier ring size, the ring holds `2^3 = 8` positions.
pub const DEFAULT_LOG_SIZE: u8 = 3;
/// Largest supported log2 ring size, identifiers are kept in a `u64`.
pub const MAX_LOG_SIZE: u8 = 63;
/// Default length of the successor list.
pub const DEFAULT_SUCCESSORS: usize = 4;
/// in ms
pub const DEFAULT_STABILIZE_INTERVAL_MS: u64 = 1000;
/// in ms
pub const DEFAULT_FIX_FINGERS_INTERVAL_MS: u64 = 4000;
/// in ms
pub const DEFAULT_UPDATE_SUCCESSORS_INTERVAL_MS: u64 = 1000;
/// Attempts made for one outbound call before the peer is reported unreachable.
pub const DEFAULT_RETRY_LIMIT: u32 = 4;
/// Backoff unit in ms, attempt `k` waits `2^k` units.
pub const DEFAULT_RETRY_BASE_MS: u64 = 1000;
/// Upper bound of finger-walk hops for one lookup.
pub const MAX_LOOKUP_HOPS: usize = 256;
