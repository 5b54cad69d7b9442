#![doc = include_str!("../README.md")]
pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod logging;
pub mod prelude;
pub mod util;
