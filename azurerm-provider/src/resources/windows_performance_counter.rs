//! log_analytics_datasource_windows_performance_counter adapter

use std::collections::HashMap;
use std::fmt;

use azurerm_core::identifier::{IdentifierError, ResourceIdentifier};
use azurerm_core::provider::{ProviderError, ProviderResult, ResourceContext};
use azurerm_core::resource::{Resource, Value};
use serde_json::json;

use super::{ResourceAdapter, required_int, required_str};
use crate::client::RemoteResource;
use crate::codec::{decode, encode};
use crate::properties::{DataSourceProperties, WINDOWS_PERFORMANCE_COUNTER, WindowsPerformanceCounter};
use crate::schemas::AzurermSchemaConfig;
use crate::schemas::log_analytics_datasource_windows_performance_counter::windows_performance_counter_config;

const NAMESPACE: &str = "Microsoft.OperationalInsights";
const WORKSPACES: &str = "workspaces";
const DATA_SOURCES: &str = "dataSources";

/// `/subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.OperationalInsights/workspaces/{workspace}/dataSources/{name}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSourceId {
    pub subscription_id: String,
    pub resource_group: String,
    pub workspace_name: String,
    pub name: String,
}

impl DataSourceId {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        workspace_name: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            workspace_name: workspace_name.into(),
            name: name.into(),
        }
    }

    pub fn parse(id: &str) -> Result<Self, IdentifierError> {
        Self::from_identifier(&ResourceIdentifier::parse(id)?)
    }

    pub fn from_identifier(id: &ResourceIdentifier) -> Result<Self, IdentifierError> {
        id.expect_layout(NAMESPACE, &[WORKSPACES, DATA_SOURCES])?;
        Ok(Self {
            subscription_id: id.subscription_id.clone(),
            resource_group: id.resource_group.clone(),
            workspace_name: id.path[0].1.clone(),
            name: id.path[1].1.clone(),
        })
    }

    pub fn to_identifier(&self) -> ResourceIdentifier {
        ResourceIdentifier::new(&self.subscription_id, &self.resource_group, NAMESPACE)
            .child(WORKSPACES, &self.workspace_name)
            .child(DATA_SOURCES, &self.name)
    }
}

impl fmt::Display for DataSourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_identifier())
    }
}

pub struct WindowsPerformanceCounterAdapter {
    config: AzurermSchemaConfig,
}

impl WindowsPerformanceCounterAdapter {
    pub fn new() -> Self {
        Self {
            config: windows_performance_counter_config(),
        }
    }
}

impl Default for WindowsPerformanceCounterAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceAdapter for WindowsPerformanceCounterAdapter {
    fn config(&self) -> &AzurermSchemaConfig {
        &self.config
    }

    fn identifier(
        &self,
        subscription_id: &str,
        resource: &Resource,
    ) -> ProviderResult<ResourceIdentifier> {
        Ok(DataSourceId::new(
            subscription_id,
            required_str(resource, "resource_group_name")?,
            required_str(resource, "workspace_name")?,
            required_str(resource, "name")?,
        )
        .to_identifier())
    }

    fn parse_identifier(&self, id: &str) -> ProviderResult<ResourceIdentifier> {
        Ok(DataSourceId::parse(id)?.to_identifier())
    }

    fn context(&self, id: &ResourceIdentifier) -> ResourceContext {
        let context = ResourceContext::new(self.config.display_name, id.name(), &id.resource_group);
        match id.segment(WORKSPACES) {
            Some(workspace) => context.with_parent("Workspace", workspace),
            None => context,
        }
    }

    fn expand(&self, resource: &Resource) -> ProviderResult<RemoteResource> {
        let interval = required_int(resource, "interval_seconds")?;
        let interval_seconds = i32::try_from(interval).map_err(|_| {
            ProviderError::validation(vec![azurerm_core::schema::TypeError::ValidationFailed {
                message: format!("interval_seconds {} does not fit in 32 bits", interval),
            }])
        })?;
        let properties = DataSourceProperties::WindowsPerformanceCounter(WindowsPerformanceCounter {
            counter_name: required_str(resource, "counter_name")?.to_string(),
            instance_name: required_str(resource, "instance_name")?.to_string(),
            interval_seconds,
            object_name: required_str(resource, "object_name")?.to_string(),
        });

        let mut document = encode(&properties)?;
        Ok(RemoteResource {
            kind: document["kind"].as_str().map(str::to_string),
            properties: document["properties"].take(),
            ..Default::default()
        })
    }

    fn flatten(
        &self,
        id: &ResourceIdentifier,
        remote: &RemoteResource,
    ) -> ProviderResult<HashMap<String, Value>> {
        let mut attributes = HashMap::new();
        attributes.insert("id".to_string(), Value::String(id.to_string()));
        attributes.insert(
            "name".to_string(),
            Value::String(remote.name.clone().unwrap_or_else(|| id.name().to_string())),
        );
        attributes.insert(
            "resource_group_name".to_string(),
            Value::String(id.resource_group.clone()),
        );
        if let Some(workspace) = id.segment(WORKSPACES) {
            attributes.insert(
                "workspace_name".to_string(),
                Value::String(workspace.to_string()),
            );
        }

        // Some responses omit `kind` on the data source itself
        let document = json!({
            "kind": remote.kind.as_deref().unwrap_or(WINDOWS_PERFORMANCE_COUNTER),
            "properties": remote.properties,
        });
        let decoded: Option<DataSourceProperties> =
            decode(&document, Some(WINDOWS_PERFORMANCE_COUNTER))?;
        if let Some(DataSourceProperties::WindowsPerformanceCounter(counter)) = decoded {
            attributes.insert("counter_name".to_string(), Value::String(counter.counter_name));
            attributes.insert("instance_name".to_string(), Value::String(counter.instance_name));
            attributes.insert(
                "interval_seconds".to_string(),
                Value::Int(i64::from(counter.interval_seconds)),
            );
            attributes.insert("object_name".to_string(), Value::String(counter.object_name));
        }

        Ok(attributes)
    }
}
