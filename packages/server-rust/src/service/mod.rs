//! Request dispatch and the upstream adapter.
//!
//! 1. **Dispatch** (`dispatcher`): resolve the operation, call upstream, normalize failures
//! 2. **Upstream** (`upstream`): one HTTP call to the engine, envelope unwrapping
//! 3. **Failures** (`failure`): the client-facing error taxonomy
//! 4. **Config** (`config`): upstream address, timeout, retry, pooling

pub mod config;
pub mod dispatcher;
pub mod failure;
pub mod upstream;

pub use config::{ConfigError, UpstreamConfig, DEFAULT_UPSTREAM_URL};
pub use dispatcher::RequestDispatcher;
pub use failure::{ErrorKind, FailureRecord};
pub use upstream::{HttpUpstream, UpstreamFailure, UpstreamPort};
