//! Azure Resource Manager provider implementation
//!
//! A generic CRUD engine: per-kind translation lives in the
//! [`ResourceAdapter`]s, everything else (import-safety, long-running
//! operations, deadlines, error context) is shared.

use std::future::Future;
use std::sync::Arc;

use azurerm_core::identifier::ResourceIdentifier;
use azurerm_core::provider::{
    OperationContext, OperationKind, ProviderError, ProviderResult, ResourceContext,
};
use azurerm_core::resource::{Resource, ResourceAddress, State};

use crate::client::{ArmClient, RemoteError, RemoteResource, Submitted};
use crate::config::ProviderConfig;
use crate::http::ArmHttpClient;
use crate::lro::{LroError, LroPoller};
use crate::resources::{ResourceAdapter, adapters};

/// Azure Resource Manager Provider
pub struct AzurermProvider {
    client: Arc<dyn ArmClient>,
    config: ProviderConfig,
    poller: LroPoller,
    adapters: Vec<Box<dyn ResourceAdapter>>,
}

impl AzurermProvider {
    pub fn new(client: Arc<dyn ArmClient>, config: ProviderConfig) -> Self {
        let poller = LroPoller::new(config.poll_interval, config.max_transient_failures);
        Self {
            client,
            config,
            poller,
            adapters: adapters(),
        }
    }

    /// Create a provider talking to the management endpoint over HTTPS
    pub fn connect(config: ProviderConfig) -> ProviderResult<Self> {
        let client = ArmHttpClient::new(&config).map_err(|e| {
            ProviderError::remote(format!("failed to build HTTP client: {}", e)).with_cause(e)
        })?;
        Ok(Self::new(Arc::new(client), config))
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn adapter(&self, resource_type: &str) -> ProviderResult<&dyn ResourceAdapter> {
        self.adapters
            .iter()
            .find(|a| a.config().resource_type_name == resource_type)
            .map(|a| a.as_ref())
            .ok_or_else(|| ProviderError::unknown_resource_type(resource_type))
    }

    // =========================================================================
    // Resource Operations
    // =========================================================================

    /// Check that `identifier` addresses a resource of `resource_type`
    pub fn import_resource(&self, resource_type: &str, identifier: &str) -> ProviderResult<()> {
        let adapter = self.adapter(resource_type)?;
        adapter.parse_identifier(identifier).map(|_| ())
    }

    /// Read a resource by its stored identifier
    pub async fn read_resource(
        &self,
        address: &ResourceAddress,
        identifier: Option<&str>,
        ctx: &OperationContext,
    ) -> ProviderResult<State> {
        let adapter = self.adapter(&address.resource_type)?;
        let Some(identifier) = identifier else {
            return Ok(State::not_found(address.clone()));
        };
        let id = adapter.parse_identifier(identifier)?;
        let context = adapter.context(&id);

        let remote = with_deadline(
            OperationKind::Read,
            ctx.deadline(&self.config.timeouts, OperationKind::Read),
            self.fetch(adapter, &id),
        )
        .await
        .map_err(|e| e.for_resource(context.clone()))?;

        match remote {
            Some(remote) => {
                let attributes = adapter
                    .flatten(&id, &remote)
                    .map_err(|e| e.for_resource(context))?;
                Ok(State::existing(address.clone(), attributes).with_identifier(identifier))
            }
            None => {
                log::debug!("{} was not found - removing from state", context);
                Ok(State::not_found(address.clone()))
            }
        }
    }

    /// Create a resource: existence check, submit, poll, read
    pub async fn create_resource(
        &self,
        resource: &Resource,
        ctx: &OperationContext,
    ) -> ProviderResult<State> {
        let adapter = self.adapter(&resource.address.resource_type)?;
        adapter
            .config()
            .schema
            .validate(&resource.attributes)
            .map_err(|e| ProviderError::validation(e).for_resource(config_context(adapter, resource)))?;
        let id = adapter.identifier(&self.config.subscription_id, resource)?;
        let context = adapter.context(&id);

        log::info!("Creating {}", context);
        let state = with_deadline(
            OperationKind::Create,
            ctx.deadline(&self.config.timeouts, OperationKind::Create),
            self.create_inner(adapter, resource, &id),
        )
        .await
        .map_err(|e| e.for_resource(context.clone()))?;
        log::info!("Created {}", context);
        Ok(state)
    }

    async fn create_inner(
        &self,
        adapter: &dyn ResourceAdapter,
        resource: &Resource,
        id: &ResourceIdentifier,
    ) -> ProviderResult<State> {
        let config = adapter.config();

        if self.config.require_import {
            match self.client.get(id, config.api_version).await {
                Ok(existing) => {
                    let remote_id = existing.id.unwrap_or_else(|| id.to_string());
                    return Err(ProviderError::already_exists(
                        config.resource_type_name,
                        &remote_id,
                    ));
                }
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(remote_failure("check for presence of existing", e)),
            }
        }

        let body = adapter.expand(resource)?;
        let submitted = self
            .client
            .put(id, config.api_version, &body)
            .await
            .map_err(|e| remote_failure("create", e))?;
        self.wait(submitted)
            .await
            .map_err(|e| lro_failure("wait for creation of", e))?;

        let remote = self.fetch(adapter, id).await?.ok_or_else(|| {
            ProviderError::remote("resource was not found after creation")
        })?;
        let remote_id = remote
            .id
            .clone()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ProviderError::remote("cannot read ID of the created resource"))?;
        let attributes = adapter.flatten(&adapter.parse_identifier(&remote_id)?, &remote)?;

        Ok(State::existing(resource.address.clone(), attributes).with_identifier(remote_id))
    }

    /// Update a resource in place
    ///
    /// Changing a force-new attribute is refused before anything is sent.
    pub async fn update_resource(
        &self,
        identifier: &str,
        from: &State,
        to: &Resource,
        ctx: &OperationContext,
    ) -> ProviderResult<State> {
        let adapter = self.adapter(&to.address.resource_type)?;
        let id = adapter.parse_identifier(identifier)?;
        let context = adapter.context(&id);
        let schema = &adapter.config().schema;

        schema
            .validate(&to.attributes)
            .map_err(|e| ProviderError::validation(e).for_resource(context.clone()))?;
        let replaced = schema.force_new_changes(&from.attributes, &to.attributes);
        if !replaced.is_empty() {
            return Err(ProviderError::requires_replacement(&replaced).for_resource(context));
        }

        log::info!("Updating {}", context);
        with_deadline(
            OperationKind::Update,
            ctx.deadline(&self.config.timeouts, OperationKind::Update),
            self.update_inner(adapter, identifier, &id, to),
        )
        .await
        .map_err(|e| e.for_resource(context))
    }

    async fn update_inner(
        &self,
        adapter: &dyn ResourceAdapter,
        identifier: &str,
        id: &ResourceIdentifier,
        to: &Resource,
    ) -> ProviderResult<State> {
        let config = adapter.config();

        if config.schema.has_updatable_attributes() {
            let body = adapter.expand(to)?;
            let submitted = self
                .client
                .put(id, config.api_version, &body)
                .await
                .map_err(|e| remote_failure("update", e))?;
            self.wait(submitted)
                .await
                .map_err(|e| lro_failure("wait for update of", e))?;
        } else {
            log::debug!("{} has no in-place attributes, refreshing", config.resource_type_name);
        }

        let remote = self
            .fetch(adapter, id)
            .await?
            .ok_or_else(ProviderError::not_found)?;
        let attributes = adapter.flatten(id, &remote)?;
        Ok(State::existing(to.address.clone(), attributes).with_identifier(identifier))
    }

    /// Delete a resource; a resource that is already gone counts as deleted
    pub async fn delete_resource(
        &self,
        address: &ResourceAddress,
        identifier: &str,
        ctx: &OperationContext,
    ) -> ProviderResult<()> {
        let adapter = self.adapter(&address.resource_type)?;
        let id = adapter.parse_identifier(identifier)?;
        let context = adapter.context(&id);

        log::info!("Deleting {}", context);
        with_deadline(
            OperationKind::Delete,
            ctx.deadline(&self.config.timeouts, OperationKind::Delete),
            self.delete_inner(adapter, &id),
        )
        .await
        .map_err(|e| e.for_resource(context.clone()))?;
        log::info!("Deleted {}", context);
        Ok(())
    }

    async fn delete_inner(
        &self,
        adapter: &dyn ResourceAdapter,
        id: &ResourceIdentifier,
    ) -> ProviderResult<()> {
        let submitted = match self.client.delete(id, adapter.config().api_version).await {
            Ok(submitted) => submitted,
            Err(e) if e.is_not_found() => {
                log::debug!("{} is already gone", id);
                return Ok(());
            }
            Err(e) => return Err(remote_failure("delete", e)),
        };

        match self.wait(submitted).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(lro_failure("wait for deletion of", e)),
        }
    }

    // =========================================================================
    // Remote Helpers
    // =========================================================================

    /// GET the resource; `None` when it does not exist
    async fn fetch(
        &self,
        adapter: &dyn ResourceAdapter,
        id: &ResourceIdentifier,
    ) -> ProviderResult<Option<RemoteResource>> {
        let config = adapter.config();
        match self.client.get(id, config.api_version).await {
            Ok(remote) => {
                if let Some(actual) = remote.resource_type.as_deref()
                    && !actual.eq_ignore_ascii_case(config.arm_type_name)
                {
                    return Err(ProviderError::decode(format!(
                        "expected a {} resource, got {}",
                        config.arm_type_name, actual
                    )));
                }
                Ok(Some(remote))
            }
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(remote_failure("retrieve", e)),
        }
    }

    async fn wait(&self, submitted: Submitted) -> Result<(), LroError> {
        match submitted {
            Submitted::Done(_) => Ok(()),
            Submitted::Accepted(handle) => {
                log::debug!("Waiting for operation {}", handle.url);
                self.poller.wait(self.client.as_ref(), &handle).await
            }
        }
    }
}

/// Run `operation` to completion or until `deadline` elapses
///
/// On expiry the future is dropped; the remote side may still finish.
async fn with_deadline<T>(
    kind: OperationKind,
    deadline: std::time::Duration,
    operation: impl Future<Output = ProviderResult<T>>,
) -> ProviderResult<T> {
    match tokio::time::timeout(deadline, operation).await {
        Ok(result) => result,
        Err(_) => {
            log::warn!("{} abandoned after {:?}", kind, deadline);
            Err(ProviderError::timeout(kind, deadline))
        }
    }
}

fn remote_failure(action: &str, err: RemoteError) -> ProviderError {
    ProviderError::remote(format!("failed to {}: {}", action, err)).with_cause(err)
}

fn lro_failure(action: &str, err: LroError) -> ProviderError {
    ProviderError::remote(format!("failed to {}: {}", action, err)).with_cause(err)
}

/// Context for errors raised before an identifier can be built
fn config_context(adapter: &dyn ResourceAdapter, resource: &Resource) -> ResourceContext {
    ResourceContext::new(
        adapter.config().display_name,
        resource.get_str("name").unwrap_or(&resource.address.name),
        resource.get_str("resource_group_name").unwrap_or_default(),
    )
}
