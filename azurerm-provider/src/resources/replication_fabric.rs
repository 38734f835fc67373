//! recovery_services_replication_fabric adapter
//!
//! Fabrics are immutable: every attribute forces a new resource, so the
//! adapter only translates for Create and Read.

use std::collections::HashMap;
use std::fmt;

use azurerm_core::identifier::{IdentifierError, ResourceIdentifier};
use azurerm_core::provider::{ProviderResult, ResourceContext};
use azurerm_core::resource::{Resource, Value};
use serde_json::json;

use super::{ResourceAdapter, required_str};
use crate::client::RemoteResource;
use crate::codec::{decode, encode};
use crate::properties::{AzureFabricDetails, FabricSpecificDetails};
use crate::schemas::AzurermSchemaConfig;
use crate::schemas::recovery_services_replication_fabric::replication_fabric_config;
use crate::utils::normalize_location;

const NAMESPACE: &str = "Microsoft.RecoveryServices";
const VAULTS: &str = "vaults";
const REPLICATION_FABRICS: &str = "replicationFabrics";

/// `/subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.RecoveryServices/vaults/{vault}/replicationFabrics/{name}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicationFabricId {
    pub subscription_id: String,
    pub resource_group: String,
    pub vault_name: String,
    pub name: String,
}

impl ReplicationFabricId {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        vault_name: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            vault_name: vault_name.into(),
            name: name.into(),
        }
    }

    pub fn parse(id: &str) -> Result<Self, IdentifierError> {
        Self::from_identifier(&ResourceIdentifier::parse(id)?)
    }

    pub fn from_identifier(id: &ResourceIdentifier) -> Result<Self, IdentifierError> {
        id.expect_layout(NAMESPACE, &[VAULTS, REPLICATION_FABRICS])?;
        Ok(Self {
            subscription_id: id.subscription_id.clone(),
            resource_group: id.resource_group.clone(),
            vault_name: id.path[0].1.clone(),
            name: id.path[1].1.clone(),
        })
    }

    pub fn to_identifier(&self) -> ResourceIdentifier {
        ResourceIdentifier::new(&self.subscription_id, &self.resource_group, NAMESPACE)
            .child(VAULTS, &self.vault_name)
            .child(REPLICATION_FABRICS, &self.name)
    }
}

impl fmt::Display for ReplicationFabricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_identifier())
    }
}

pub struct ReplicationFabricAdapter {
    config: AzurermSchemaConfig,
}

impl ReplicationFabricAdapter {
    pub fn new() -> Self {
        Self {
            config: replication_fabric_config(),
        }
    }
}

impl Default for ReplicationFabricAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceAdapter for ReplicationFabricAdapter {
    fn config(&self) -> &AzurermSchemaConfig {
        &self.config
    }

    fn identifier(
        &self,
        subscription_id: &str,
        resource: &Resource,
    ) -> ProviderResult<ResourceIdentifier> {
        Ok(ReplicationFabricId::new(
            subscription_id,
            required_str(resource, "resource_group_name")?,
            required_str(resource, "vault_name")?,
            required_str(resource, "name")?,
        )
        .to_identifier())
    }

    fn parse_identifier(&self, id: &str) -> ProviderResult<ResourceIdentifier> {
        Ok(ReplicationFabricId::parse(id)?.to_identifier())
    }

    fn context(&self, id: &ResourceIdentifier) -> ResourceContext {
        let context = ResourceContext::new(self.config.display_name, id.name(), &id.resource_group);
        match id.segment(VAULTS) {
            Some(vault) => context.with_parent("Vault", vault),
            None => context,
        }
    }

    fn expand(&self, resource: &Resource) -> ProviderResult<RemoteResource> {
        let location = normalize_location(required_str(resource, "location")?);
        let details = FabricSpecificDetails::Azure(AzureFabricDetails {
            location: Some(location),
            container_ids: Vec::new(),
        });
        Ok(RemoteResource {
            properties: json!({ "customDetails": encode(&details)? }),
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
        if let Some(vault) = id.segment(VAULTS) {
            attributes.insert("vault_name".to_string(), Value::String(vault.to_string()));
        }

        let custom_details = remote
            .properties
            .get("customDetails")
            .unwrap_or(&serde_json::Value::Null);
        let details: Option<FabricSpecificDetails> = decode(custom_details, None)?;
        if let Some(location) = details
            .as_ref()
            .and_then(FabricSpecificDetails::as_azure)
            .and_then(|azure| azure.location.as_deref())
        {
            attributes.insert(
                "location".to_string(),
                Value::String(normalize_location(location)),
            );
        }

        Ok(attributes)
    }
}
