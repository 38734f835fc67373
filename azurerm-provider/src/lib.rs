//! Azure Resource Manager Provider
//!
//! CRUD adapters for Azure resources behind the `azurerm-core` Provider trait.
//!
//! ## Module Structure
//!
//! - `client` - Remote client contract (`ArmClient`) and ARM documents
//! - `http` - reqwest implementation of `ArmClient`
//! - `lro` - Long-running operation polling
//! - `codec` - Kind-discriminated property documents
//! - `properties` - Typed property records per resource kind
//! - `resources` - Resource type definitions and per-kind adapters
//! - `schemas` - Resource schemas and Azure attribute types
//! - `provider` - AzurermProvider implementation
//! - `config` - Provider configuration
//! - `utils` - Helper functions for value normalization

pub mod client;
pub mod codec;
pub mod config;
pub mod http;
pub mod lro;
pub mod properties;
pub mod provider;
pub mod resources;
pub mod schemas;
pub mod utils;

#[cfg(test)]
mod testing;

// Re-export main types
pub use client::{ArmClient, RemoteError, RemoteResource};
pub use config::{ConfigError, ProviderConfig};
pub use http::ArmHttpClient;
pub use provider::AzurermProvider;
pub use utils::normalize_location;

use azurerm_core::provider::{
    BoxFuture, OperationContext, Provider, ProviderResult, ResourceType,
};
use azurerm_core::resource::{Resource, ResourceAddress, State};

use resources::resource_types;

// =============================================================================
// Provider Trait Implementation
// =============================================================================

impl Provider for AzurermProvider {
    fn name(&self) -> &'static str {
        "azurerm"
    }

    fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
        resource_types()
    }

    fn import(&self, resource_type: &str, identifier: &str) -> ProviderResult<()> {
        self.import_resource(resource_type, identifier)
    }

    fn read<'a>(
        &'a self,
        address: &'a ResourceAddress,
        identifier: Option<&'a str>,
        ctx: &'a OperationContext,
    ) -> BoxFuture<'a, ProviderResult<State>> {
        Box::pin(self.read_resource(address, identifier, ctx))
    }

    fn create<'a>(
        &'a self,
        resource: &'a Resource,
        ctx: &'a OperationContext,
    ) -> BoxFuture<'a, ProviderResult<State>> {
        Box::pin(self.create_resource(resource, ctx))
    }

    fn update<'a>(
        &'a self,
        identifier: &'a str,
        from: &'a State,
        to: &'a Resource,
        ctx: &'a OperationContext,
    ) -> BoxFuture<'a, ProviderResult<State>> {
        Box::pin(self.update_resource(identifier, from, to, ctx))
    }

    fn delete<'a>(
        &'a self,
        address: &'a ResourceAddress,
        identifier: &'a str,
        ctx: &'a OperationContext,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(self.delete_resource(address, identifier, ctx))
    }
}
