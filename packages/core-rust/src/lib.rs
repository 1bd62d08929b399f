//! Transliteration gateway core: the operation table, discovery, and wire types.

pub mod discovery;
pub mod messages;
pub mod operation;

pub use discovery::{available_operations, route_for, DiscoveryResponse, RouteInfo, ROUTE_PREFIX};
pub use messages::{
    ErrorBody, TransliterationRequest, TransliterationResult, UpstreamEnvelope, UpstreamRequest,
};
pub use operation::{
    OperationDescriptor, OperationId, OperationRegistry, ParseOperationError, OPERATIONS,
};
