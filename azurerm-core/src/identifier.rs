//! Identifier - Azure Resource Manager resource IDs
//!
//! ARM addresses every resource by a slash-delimited path of key/value
//! segments:
//!
//! ```text
//! /subscriptions/{sub}/resourceGroups/{rg}/providers/{namespace}/{parent_type}/{parent}/{type}/{name}
//! ```
//!
//! [`ResourceIdentifier`] parses that path into its named parts and formats
//! it back without loss.

use std::fmt;
use std::str::FromStr;

const SUBSCRIPTIONS: &str = "subscriptions";
const RESOURCE_GROUPS: &str = "resourceGroups";
const PROVIDERS: &str = "providers";

/// A resource ID that could not be parsed or did not have the expected shape
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed resource ID {id:?}: {reason}")]
pub struct IdentifierError {
    pub id: String,
    pub reason: String,
}

impl IdentifierError {
    fn new(id: &str, reason: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}

/// Structured form of an ARM resource ID
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceIdentifier {
    pub subscription_id: String,
    pub resource_group: String,
    /// Resource provider namespace (e.g., "Microsoft.RecoveryServices")
    pub provider: String,
    /// `(type, name)` pairs after the namespace; the last one is the resource itself
    pub path: Vec<(String, String)>,
    /// Spelling of the resource group key as received; some APIs return `resourcegroups`
    resource_group_key: String,
}

impl ResourceIdentifier {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            provider: provider.into(),
            path: Vec::new(),
            resource_group_key: RESOURCE_GROUPS.to_string(),
        }
    }

    /// Append a `(type, name)` segment
    pub fn child(mut self, segment_type: impl Into<String>, name: impl Into<String>) -> Self {
        self.path.push((segment_type.into(), name.into()));
        self
    }

    pub fn parse(id: &str) -> Result<Self, IdentifierError> {
        let rest = id
            .strip_prefix('/')
            .ok_or_else(|| IdentifierError::new(id, "expected a leading '/'"))?;
        let segments: Vec<&str> = rest.split('/').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(IdentifierError::new(id, "contains an empty segment"));
        }
        if segments.len() % 2 != 0 {
            return Err(IdentifierError::new(
                id,
                "expected key/value pairs but found an odd number of segments",
            ));
        }

        let mut pairs = segments.chunks(2).map(|pair| (pair[0], pair[1]));

        let subscription_id = match pairs.next() {
            Some((SUBSCRIPTIONS, value)) => value,
            _ => return Err(IdentifierError::new(id, "missing subscriptions segment")),
        };
        let (resource_group_key, resource_group) = match pairs.next() {
            Some((key, value)) if key.eq_ignore_ascii_case(RESOURCE_GROUPS) => (key, value),
            _ => return Err(IdentifierError::new(id, "missing resourceGroups segment")),
        };
        let provider = match pairs.next() {
            Some((PROVIDERS, value)) => value,
            _ => return Err(IdentifierError::new(id, "missing providers segment")),
        };

        let path: Vec<(String, String)> = pairs
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        if path.len() < 2 {
            return Err(IdentifierError::new(
                id,
                "expected a parent resource and a resource name after the provider namespace",
            ));
        }

        Ok(Self {
            subscription_id: subscription_id.to_string(),
            resource_group: resource_group.to_string(),
            provider: provider.to_string(),
            path,
            resource_group_key: resource_group_key.to_string(),
        })
    }

    /// Name of the addressed resource (last path segment)
    pub fn name(&self) -> &str {
        self.path.last().map(|(_, name)| name.as_str()).unwrap_or("")
    }

    /// Type of the addressed resource (e.g., "replicationFabrics")
    pub fn resource_type(&self) -> &str {
        self.path.last().map(|(t, _)| t.as_str()).unwrap_or("")
    }

    /// The immediate parent segment, e.g. `("vaults", "vault1")`
    pub fn parent(&self) -> Option<(&str, &str)> {
        let len = self.path.len();
        if len < 2 {
            return None;
        }
        let (t, n) = &self.path[len - 2];
        Some((t.as_str(), n.as_str()))
    }

    /// Raw path segments in order, keys and names alternating
    ///
    /// Names are not escaped; callers building URLs must encode each one.
    pub fn segments(&self) -> Vec<&str> {
        let mut segments = vec![
            SUBSCRIPTIONS,
            self.subscription_id.as_str(),
            self.resource_group_key.as_str(),
            self.resource_group.as_str(),
            PROVIDERS,
            self.provider.as_str(),
        ];
        for (segment_type, name) in &self.path {
            segments.push(segment_type);
            segments.push(name);
        }
        segments
    }

    /// Look up a path segment by type
    pub fn segment(&self, segment_type: &str) -> Option<&str> {
        self.path
            .iter()
            .find(|(t, _)| t == segment_type)
            .map(|(_, n)| n.as_str())
    }

    /// Check that this ID belongs to `provider` and has exactly the given segment types
    ///
    /// Both comparisons ignore ASCII case, as ARM does.
    pub fn expect_layout(&self, provider: &str, types: &[&str]) -> Result<(), IdentifierError> {
        if !self.provider.eq_ignore_ascii_case(provider) {
            return Err(IdentifierError::new(
                &self.to_string(),
                format!("expected provider {}, got {}", provider, self.provider),
            ));
        }
        let actual: Vec<&str> = self.path.iter().map(|(t, _)| t.as_str()).collect();
        let matches = actual.len() == types.len()
            && actual
                .iter()
                .zip(types)
                .all(|(a, e)| a.eq_ignore_ascii_case(e));
        if !matches {
            return Err(IdentifierError::new(
                &self.to_string(),
                format!(
                    "expected segments {}, got {}",
                    types.join("/"),
                    actual.join("/")
                ),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for ResourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/{}/{}/{}/{}/{}/{}",
            SUBSCRIPTIONS,
            self.subscription_id,
            self.resource_group_key,
            self.resource_group,
            PROVIDERS,
            self.provider
        )?;
        for (segment_type, name) in &self.path {
            write!(f, "/{}/{}", segment_type, name)?;
        }
        Ok(())
    }
}

impl FromStr for ResourceIdentifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
