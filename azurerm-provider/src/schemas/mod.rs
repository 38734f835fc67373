//! Azure resource schema definitions

pub mod log_analytics_datasource_windows_performance_counter;
pub mod recovery_services_replication_fabric;
pub mod types;

use azurerm_core::schema::ResourceSchema;

/// Azure schema configuration
///
/// Combines the ResourceSchema with ARM-specific metadata.
pub struct AzurermSchemaConfig {
    /// ARM resource type (e.g., "Microsoft.RecoveryServices/vaults/replicationFabrics")
    pub arm_type_name: &'static str,
    /// Resource type name used by the host (e.g., "recovery_services_replication_fabric")
    pub resource_type_name: &'static str,
    /// Human readable name used in messages
    pub display_name: &'static str,
    /// `api-version` query parameter for this resource type
    pub api_version: &'static str,
    /// The resource schema with attribute definitions
    pub schema: ResourceSchema,
}

/// Returns all schema configs
pub fn configs() -> Vec<AzurermSchemaConfig> {
    vec![
        recovery_services_replication_fabric::replication_fabric_config(),
        log_analytics_datasource_windows_performance_counter::windows_performance_counter_config(),
    ]
}

/// Returns all schemas
pub fn all_schemas() -> Vec<ResourceSchema> {
    configs().into_iter().map(|c| c.schema).collect()
}
