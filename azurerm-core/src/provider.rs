//! Provider - Trait abstracting resource operations
//!
//! A Provider maps configuration records onto a remote management API.
//! The host calls it once per lifecycle step and owns everything else
//! (planning, state storage, dependency ordering).

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::identifier::IdentifierError;
use crate::resource::{Resource, ResourceAddress, State};
use crate::schema::{ResourceSchema, TypeError};

/// Category of a provider failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The resource ID could not be parsed
    MalformedId,
    /// Create found a resource that is not yet tracked by the host
    AlreadyExists,
    /// The API rejected the request or the operation finished unsuccessfully
    RemoteOperationFailed,
    /// The resource does not exist; Read and Delete turn this into a non-error
    NotFound,
    /// A property document did not have the expected shape
    DecodeFailed,
    /// The operation deadline elapsed
    Timeout,
    /// Configuration failed schema validation
    Validation,
    /// An Update tried to change force-new attributes
    RequiresReplacement,
    UnknownResourceType,
}

/// Identifies the remote resource an error is about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceContext {
    /// Human readable kind (e.g., "Recovery Services Replication Fabric")
    pub display_name: String,
    pub name: String,
    pub resource_group: String,
    /// Parent label and name (e.g., ("Vault", "vault1"))
    pub parent: Option<(String, String)>,
}

impl ResourceContext {
    pub fn new(
        display_name: impl Into<String>,
        name: impl Into<String>,
        resource_group: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            name: name.into(),
            resource_group: resource_group.into(),
            parent: None,
        }
    }

    pub fn with_parent(mut self, label: impl Into<String>, name: impl Into<String>) -> Self {
        self.parent = Some((label.into(), name.into()));
        self
    }
}

impl std::fmt::Display for ResourceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {:?} (Resource Group {:?}",
            self.display_name, self.name, self.resource_group
        )?;
        if let Some((label, name)) = &self.parent {
            write!(f, " / {} {:?}", label, name)?;
        }
        write!(f, ")")
    }
}

/// Error type for Provider operations
#[derive(Debug)]
pub struct ProviderError {
    pub kind: ErrorKind,
    pub message: String,
    pub context: Option<ResourceContext>,
    pub cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref context) = self.context {
            write!(f, "{}: {}", context, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|e| e.as_ref() as &dyn std::error::Error)
    }
}

impl ProviderError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: None,
            cause: None,
        }
    }

    pub fn already_exists(resource_type: &str, remote_id: &str) -> Self {
        Self::new(
            ErrorKind::AlreadyExists,
            format!(
                "a resource with the ID {:?} already exists - to be managed via this tool it needs to be imported into state as {}",
                remote_id, resource_type
            ),
        )
    }

    pub fn remote(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RemoteOperationFailed, message)
    }

    pub fn not_found() -> Self {
        Self::new(ErrorKind::NotFound, "resource was not found")
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DecodeFailed, message)
    }

    pub fn timeout(operation: OperationKind, after: Duration) -> Self {
        Self::new(
            ErrorKind::Timeout,
            format!("{} did not complete within {:?}", operation, after),
        )
    }

    pub fn validation(errors: Vec<TypeError>) -> Self {
        let message = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        Self::new(ErrorKind::Validation, message)
    }

    pub fn requires_replacement(attributes: &[String]) -> Self {
        Self::new(
            ErrorKind::RequiresReplacement,
            format!(
                "cannot update {} in place, the resource must be replaced",
                attributes.join(", ")
            ),
        )
    }

    pub fn unknown_resource_type(resource_type: &str) -> Self {
        Self::new(
            ErrorKind::UnknownResourceType,
            format!("Unknown resource type: {}", resource_type),
        )
    }

    pub fn for_resource(mut self, context: ResourceContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }
}

impl From<IdentifierError> for ProviderError {
    fn from(err: IdentifierError) -> Self {
        ProviderError::new(ErrorKind::MalformedId, err.to_string()).with_cause(err)
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Return type for async operations
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Lifecycle step, used to pick a deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Create,
    Read,
    Update,
    Delete,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OperationKind::Create => "create",
            OperationKind::Read => "read",
            OperationKind::Update => "update",
            OperationKind::Delete => "delete",
        };
        write!(f, "{}", name)
    }
}

/// Default deadline per lifecycle step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub create: Duration,
    pub read: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            create: Duration::from_secs(30 * 60),
            read: Duration::from_secs(5 * 60),
            update: Duration::from_secs(30 * 60),
            delete: Duration::from_secs(30 * 60),
        }
    }
}

impl Timeouts {
    pub fn for_operation(&self, kind: OperationKind) -> Duration {
        match kind {
            OperationKind::Create => self.create,
            OperationKind::Read => self.read,
            OperationKind::Update => self.update,
            OperationKind::Delete => self.delete,
        }
    }
}

/// Per-call context handed in by the host
#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    /// Overrides the provider's default deadline for this call
    pub timeout: Option<Duration>,
}

impl OperationContext {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }

    /// Deadline for `kind`, falling back to `defaults`
    pub fn deadline(&self, defaults: &Timeouts, kind: OperationKind) -> Duration {
        self.timeout
            .unwrap_or_else(|| defaults.for_operation(kind))
    }
}

/// Definition of resource types that a Provider can handle
pub trait ResourceType: Send + Sync {
    /// Resource type name (e.g., "recovery_services_replication_fabric")
    fn name(&self) -> &'static str;

    /// Attribute schema for this resource type
    fn schema(&self) -> ResourceSchema;
}

/// Main Provider trait
///
/// All operations are async and involve side effects. Each call is bounded
/// by the deadline in its [`OperationContext`].
pub trait Provider: Send + Sync {
    /// Name of this Provider (e.g., "azurerm")
    fn name(&self) -> &'static str;

    /// List of resource types this Provider can handle
    fn resource_types(&self) -> Vec<Box<dyn ResourceType>>;

    /// Validate a configuration record without calling the remote API
    fn validate(&self, resource: &Resource) -> ProviderResult<()> {
        let resource_type = self
            .resource_types()
            .into_iter()
            .find(|t| t.name() == resource.address.resource_type)
            .ok_or_else(|| ProviderError::unknown_resource_type(&resource.address.resource_type))?;
        resource_type
            .schema()
            .validate(&resource.attributes)
            .map_err(ProviderError::validation)
    }

    /// Check that `identifier` is a well-formed ID for `resource_type` before import
    fn import(&self, resource_type: &str, identifier: &str) -> ProviderResult<()>;

    /// Get the current state of a resource
    ///
    /// Returns `State::not_found()` if the resource does not exist or no
    /// identifier is known yet.
    fn read<'a>(
        &'a self,
        address: &'a ResourceAddress,
        identifier: Option<&'a str>,
        ctx: &'a OperationContext,
    ) -> BoxFuture<'a, ProviderResult<State>>;

    /// Create a resource
    ///
    /// Returns State with identifier set to the ARM resource ID
    fn create<'a>(
        &'a self,
        resource: &'a Resource,
        ctx: &'a OperationContext,
    ) -> BoxFuture<'a, ProviderResult<State>>;

    /// Update a resource in place
    fn update<'a>(
        &'a self,
        identifier: &'a str,
        from: &'a State,
        to: &'a Resource,
        ctx: &'a OperationContext,
    ) -> BoxFuture<'a, ProviderResult<State>>;

    /// Delete a resource; deleting a resource that is already gone succeeds
    fn delete<'a>(
        &'a self,
        address: &'a ResourceAddress,
        identifier: &'a str,
        ctx: &'a OperationContext,
    ) -> BoxFuture<'a, ProviderResult<()>>;
}

/// Provider implementation for Box<dyn Provider>
/// This enables dynamic dispatch for Providers
impl Provider for Box<dyn Provider> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
        (**self).resource_types()
    }

    fn validate(&self, resource: &Resource) -> ProviderResult<()> {
        (**self).validate(resource)
    }

    fn import(&self, resource_type: &str, identifier: &str) -> ProviderResult<()> {
        (**self).import(resource_type, identifier)
    }

    fn read<'a>(
        &'a self,
        address: &'a ResourceAddress,
        identifier: Option<&'a str>,
        ctx: &'a OperationContext,
    ) -> BoxFuture<'a, ProviderResult<State>> {
        (**self).read(address, identifier, ctx)
    }

    fn create<'a>(
        &'a self,
        resource: &'a Resource,
        ctx: &'a OperationContext,
    ) -> BoxFuture<'a, ProviderResult<State>> {
        (**self).create(resource, ctx)
    }

    fn update<'a>(
        &'a self,
        identifier: &'a str,
        from: &'a State,
        to: &'a Resource,
        ctx: &'a OperationContext,
    ) -> BoxFuture<'a, ProviderResult<State>> {
        (**self).update(identifier, from, to, ctx)
    }

    fn delete<'a>(
        &'a self,
        address: &'a ResourceAddress,
        identifier: &'a str,
        ctx: &'a OperationContext,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        (**self).delete(address, identifier, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttributeSchema, AttributeType};

    struct MockType;

    impl ResourceType for MockType {
        fn name(&self) -> &'static str {
            "mock"
        }

        fn schema(&self) -> ResourceSchema {
            ResourceSchema::new("mock")
                .attribute(AttributeSchema::new("name", AttributeType::String).required())
        }
    }

    // Mock Provider for testing
    struct MockProvider;

    impl Provider for MockProvider {
        fn name(&self) -> &'static str {
            "mock"
        }

        fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
            vec![Box::new(MockType)]
        }

        fn import(&self, _resource_type: &str, _identifier: &str) -> ProviderResult<()> {
            Ok(())
        }

        fn read<'a>(
            &'a self,
            address: &'a ResourceAddress,
            _identifier: Option<&'a str>,
            _ctx: &'a OperationContext,
        ) -> BoxFuture<'a, ProviderResult<State>> {
            let address = address.clone();
            Box::pin(async move { Ok(State::not_found(address)) })
        }

        fn create<'a>(
            &'a self,
            resource: &'a Resource,
            _ctx: &'a OperationContext,
        ) -> BoxFuture<'a, ProviderResult<State>> {
            let address = resource.address.clone();
            let attrs = resource.attributes.clone();
            Box::pin(async move {
                Ok(State::existing(address, attrs).with_identifier("mock-id-123"))
            })
        }

        fn update<'a>(
            &'a self,
            _identifier: &'a str,
            _from: &'a State,
            to: &'a Resource,
            _ctx: &'a OperationContext,
        ) -> BoxFuture<'a, ProviderResult<State>> {
            let address = to.address.clone();
            let attrs = to.attributes.clone();
            Box::pin(async move { Ok(State::existing(address, attrs)) })
        }

        fn delete<'a>(
            &'a self,
            _address: &'a ResourceAddress,
            _identifier: &'a str,
            _ctx: &'a OperationContext,
        ) -> BoxFuture<'a, ProviderResult<()>> {
            Box::pin(async { Ok(()) })
        }
    }

    #[tokio::test]
    async fn mock_provider_read_returns_not_found() {
        let provider = MockProvider;
        let address = ResourceAddress::new("mock", "example");
        let state = provider
            .read(&address, None, &OperationContext::default())
            .await
            .unwrap();
        assert!(!state.exists);
    }

    #[tokio::test]
    async fn boxed_provider_dispatches_create() {
        let provider: Box<dyn Provider> = Box::new(MockProvider);
        let resource = Resource::new("mock", "example");
        let state = provider
            .create(&resource, &OperationContext::default())
            .await
            .unwrap();
        assert!(state.exists);
        assert_eq!(state.identifier, Some("mock-id-123".to_string()));
    }

    #[test]
    fn default_validate_uses_schema() {
        let provider = MockProvider;
        let err = provider.validate(&Resource::new("mock", "a")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(err.message.contains("'name' is missing"));

        let err = provider.validate(&Resource::new("other", "a")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownResourceType);
    }

    #[test]
    fn error_display_includes_context() {
        let err = ProviderError::remote("quota exceeded").for_resource(
            ResourceContext::new("Recovery Services Replication Fabric", "fabric1", "rg1")
                .with_parent("Vault", "vault1"),
        );
        assert_eq!(
            err.to_string(),
            r#"Recovery Services Replication Fabric "fabric1" (Resource Group "rg1" / Vault "vault1"): quota exceeded"#
        );
    }

    #[test]
    fn identifier_errors_become_malformed_id() {
        let err: ProviderError = crate::identifier::ResourceIdentifier::parse("nope")
            .unwrap_err()
            .into();
        assert_eq!(err.kind, ErrorKind::MalformedId);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn deadline_falls_back_to_defaults() {
        let defaults = Timeouts::default();
        let ctx = OperationContext::default();
        assert_eq!(
            ctx.deadline(&defaults, OperationKind::Read),
            Duration::from_secs(300)
        );
        assert_eq!(
            ctx.deadline(&defaults, OperationKind::Create),
            Duration::from_secs(1800)
        );

        let ctx = OperationContext::with_timeout(Duration::from_secs(5));
        assert_eq!(
            ctx.deadline(&defaults, OperationKind::Delete),
            Duration::from_secs(5)
        );
    }
}
