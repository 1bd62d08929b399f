//! Transliteration gateway: an axum HTTP surface over the Sangam engine.

pub mod cli;
pub mod network;
pub mod service;

pub use network::{NetworkConfig, NetworkModule};
pub use service::{HttpUpstream, RequestDispatcher, UpstreamConfig};

#[cfg(test)]
mod test_support;
