//! recovery_services_replication_fabric schema definition
//!
//! ARM type: Microsoft.RecoveryServices/vaults/replicationFabrics

use super::AzurermSchemaConfig;
use super::types::{fabric_name, location, resource_group_name, vault_name};
use crate::utils::normalize_location_value;
use azurerm_core::schema::{AttributeSchema, AttributeType, ResourceSchema};

pub const RESOURCE_TYPE: &str = "recovery_services_replication_fabric";

/// Returns the schema config for recovery_services_replication_fabric
pub fn replication_fabric_config() -> AzurermSchemaConfig {
    AzurermSchemaConfig {
        arm_type_name: "Microsoft.RecoveryServices/vaults/replicationFabrics",
        resource_type_name: RESOURCE_TYPE,
        display_name: "Recovery Services Replication Fabric",
        api_version: "2018-01-10",
        schema: ResourceSchema::new(RESOURCE_TYPE)
            .with_description("An Azure-to-Azure replication fabric inside a Recovery Services vault.")
            .attribute(
                AttributeSchema::new("name", fabric_name())
                    .required()
                    .force_new()
                    .with_description("Name of the replication fabric."),
            )
            .attribute(
                AttributeSchema::new("resource_group_name", resource_group_name())
                    .required()
                    .force_new()
                    .with_description("Resource group of the Recovery Services vault."),
            )
            .attribute(
                AttributeSchema::new("vault_name", vault_name())
                    .required()
                    .force_new()
                    .with_description("Name of the Recovery Services vault."),
            )
            .attribute(
                AttributeSchema::new("location", location())
                    .required()
                    .force_new()
                    .with_normalizer(normalize_location_value)
                    .with_description("Azure region the fabric represents."),
            )
            .attribute(
                AttributeSchema::new("id", AttributeType::String)
                    .computed()
                    .with_description("ARM resource ID (read-only)"),
            ),
    }
}
