//! Read-only listing of the operations the gateway serves.

use serde::{Deserialize, Serialize};

use crate::operation::{OperationDescriptor, OperationRegistry};

/// Prefix shared by every dedicated transliteration route.
pub const ROUTE_PREFIX: &str = "/transliterate";

/// One entry of the discovery listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RouteInfo {
    /// Public route, e.g. `/transliterate/HindiToUrdu`.
    pub route: String,
    pub description: String,
}

/// Body of `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DiscoveryResponse {
    pub available_routes: Vec<RouteInfo>,
}

/// Public route of a single operation.
#[must_use]
pub fn route_for(descriptor: &OperationDescriptor) -> String {
    format!("{ROUTE_PREFIX}/{}", descriptor.route_name)
}

/// Maps every registered operation to its route, in registry order.
#[must_use]
pub fn available_operations(registry: &OperationRegistry) -> Vec<RouteInfo> {
    registry
        .list()
        .iter()
        .map(|descriptor| RouteInfo {
            route: route_for(descriptor),
            description: descriptor.description.to_string(),
        })
        .collect()
}

impl DiscoveryResponse {
    #[must_use]
    pub fn from_registry(registry: &OperationRegistry) -> Self {
        Self {
            available_routes: available_operations(registry),
        }
    }
}
