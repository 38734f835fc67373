//! log_analytics_datasource_windows_performance_counter schema definition
//!
//! ARM type: Microsoft.OperationalInsights/workspaces/dataSources
//! (kind WindowsPerformanceCounter)

use super::AzurermSchemaConfig;
use super::types::{data_source_name, interval_seconds, resource_group_name, workspace_name};
use crate::utils::normalize_case_insensitive;
use azurerm_core::schema::types::string_not_empty;
use azurerm_core::schema::{AttributeSchema, AttributeType, ResourceSchema};

pub const RESOURCE_TYPE: &str = "log_analytics_datasource_windows_performance_counter";

/// Returns the schema config for log_analytics_datasource_windows_performance_counter
pub fn windows_performance_counter_config() -> AzurermSchemaConfig {
    AzurermSchemaConfig {
        arm_type_name: "Microsoft.OperationalInsights/workspaces/dataSources",
        resource_type_name: RESOURCE_TYPE,
        display_name: "Log Analytics DataSource Windows Performance Counter",
        api_version: "2015-11-01-preview",
        schema: ResourceSchema::new(RESOURCE_TYPE)
            .with_description("A Windows performance counter collected by a Log Analytics workspace.")
            .attribute(
                AttributeSchema::new("name", data_source_name())
                    .required()
                    .force_new()
                    .with_description("Name of the data source."),
            )
            .attribute(
                AttributeSchema::new("resource_group_name", resource_group_name())
                    .required()
                    .force_new()
                    .with_description("Resource group of the workspace."),
            )
            .attribute(
                AttributeSchema::new("workspace_name", workspace_name())
                    .required()
                    .force_new()
                    .with_normalizer(normalize_case_insensitive)
                    .with_description("Name of the Log Analytics workspace."),
            )
            .attribute(
                AttributeSchema::new("counter_name", string_not_empty())
                    .required()
                    .with_description("Performance counter, e.g. \"% Processor Time\"."),
            )
            .attribute(
                AttributeSchema::new("instance_name", string_not_empty())
                    .required()
                    .with_description("Counter instance, e.g. \"_Total\" or \"*\"."),
            )
            .attribute(
                AttributeSchema::new("interval_seconds", interval_seconds())
                    .required()
                    .with_description("Sampling interval, at least 10 seconds."),
            )
            .attribute(
                AttributeSchema::new("object_name", string_not_empty())
                    .required()
                    .with_description("Performance object, e.g. \"Processor\"."),
            )
            .attribute(
                AttributeSchema::new("id", AttributeType::String)
                    .computed()
                    .with_description("ARM resource ID (read-only)"),
            ),
    }
}
