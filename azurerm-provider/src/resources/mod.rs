//! Resource type definitions and per-kind adapters
//!
//! This module defines:
//! - Resource type definitions (implementing the ResourceType trait)
//! - The [`ResourceAdapter`] trait the generic CRUD engine drives
//! - Shared helpers for reading configuration attributes

pub mod replication_fabric;
pub mod windows_performance_counter;

use std::collections::HashMap;

use azurerm_core::identifier::ResourceIdentifier;
use azurerm_core::provider::{ProviderError, ProviderResult, ResourceContext, ResourceType};
use azurerm_core::resource::{Resource, Value};
use azurerm_core::schema::ResourceSchema;

use crate::client::RemoteResource;
use crate::codec::CodecError;
use crate::schemas::AzurermSchemaConfig;
use crate::schemas::log_analytics_datasource_windows_performance_counter::windows_performance_counter_config;
use crate::schemas::recovery_services_replication_fabric::replication_fabric_config;

pub use replication_fabric::{ReplicationFabricAdapter, ReplicationFabricId};
pub use windows_performance_counter::{DataSourceId, WindowsPerformanceCounterAdapter};

// =============================================================================
// Resource Type Definitions
// =============================================================================

macro_rules! define_resource_type {
    ($name:ident, $config:path) => {
        pub struct $name;
        impl ResourceType for $name {
            fn name(&self) -> &'static str {
                $config().resource_type_name
            }
            fn schema(&self) -> ResourceSchema {
                $config().schema
            }
        }
    };
}

define_resource_type!(ReplicationFabricType, replication_fabric_config);
define_resource_type!(WindowsPerformanceCounterType, windows_performance_counter_config);

/// Returns all resource types supported by this provider
pub fn resource_types() -> Vec<Box<dyn ResourceType>> {
    vec![
        Box::new(ReplicationFabricType),
        Box::new(WindowsPerformanceCounterType),
    ]
}

// =============================================================================
// Resource Adapters
// =============================================================================

/// Translation between configuration records and ARM documents for one kind
pub trait ResourceAdapter: Send + Sync {
    /// Schema and ARM metadata for this kind
    fn config(&self) -> &AzurermSchemaConfig;

    /// Build the resource ID from configuration
    fn identifier(
        &self,
        subscription_id: &str,
        resource: &Resource,
    ) -> ProviderResult<ResourceIdentifier>;

    /// Parse a stored ID, checking that it addresses this kind
    fn parse_identifier(&self, id: &str) -> ProviderResult<ResourceIdentifier>;

    /// Error context derived from the resource ID
    fn context(&self, id: &ResourceIdentifier) -> ResourceContext;

    /// Request body for PUT
    fn expand(&self, resource: &Resource) -> ProviderResult<RemoteResource>;

    /// Configuration attributes from an ARM document
    fn flatten(
        &self,
        id: &ResourceIdentifier,
        remote: &RemoteResource,
    ) -> ProviderResult<HashMap<String, Value>>;
}

/// Returns adapters for every supported kind
pub fn adapters() -> Vec<Box<dyn ResourceAdapter>> {
    vec![
        Box::new(ReplicationFabricAdapter::new()),
        Box::new(WindowsPerformanceCounterAdapter::new()),
    ]
}

// =============================================================================
// Helpers
// =============================================================================

/// A required string attribute, already checked by schema validation
pub(crate) fn required_str<'a>(resource: &'a Resource, key: &str) -> ProviderResult<&'a str> {
    resource.get_str(key).ok_or_else(|| {
        ProviderError::validation(vec![azurerm_core::schema::TypeError::MissingRequired {
            name: key.to_string(),
        }])
    })
}

/// A required integer attribute, already checked by schema validation
pub(crate) fn required_int(resource: &Resource, key: &str) -> ProviderResult<i64> {
    resource.get_int(key).ok_or_else(|| {
        ProviderError::validation(vec![azurerm_core::schema::TypeError::MissingRequired {
            name: key.to_string(),
        }])
    })
}

impl From<CodecError> for ProviderError {
    fn from(err: CodecError) -> Self {
        ProviderError::decode(err.to_string()).with_cause(err)
    }
}
