//! Resource - Configuration records and the state read back from Azure

use std::collections::HashMap;

/// Address of a resource inside the host's configuration
/// (e.g. `recovery_services_replication_fabric.primary`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceAddress {
    /// Resource type (e.g., "recovery_services_replication_fabric")
    pub resource_type: String,
    /// Name of the block in configuration
    pub name: String,
}

impl ResourceAddress {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for ResourceAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.resource_type, self.name)
    }
}

/// Attribute value of a resource
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
}

/// A JSON value with no attribute counterpart
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValueError {
    #[error("expected an integer, got {0}")]
    NotAnInteger(String),

    #[error("unsupported {0} value")]
    Unsupported(&'static str),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Convert a JSON value into an attribute value
    ///
    /// Returns `Ok(None)` for `null`. Fractional numbers are rejected rather
    /// than rounded.
    pub fn from_json(json: &serde_json::Value) -> Result<Option<Value>, ValueError> {
        match json {
            serde_json::Value::Null => Ok(None),
            serde_json::Value::String(s) => Ok(Some(Value::String(s.clone()))),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(|n| Some(Value::Int(n)))
                .ok_or_else(|| ValueError::NotAnInteger(n.to_string())),
            serde_json::Value::Bool(_) => Err(ValueError::Unsupported("boolean")),
            serde_json::Value::Array(_) => Err(ValueError::Unsupported("array")),
            serde_json::Value::Object(_) => Err(ValueError::Unsupported("object")),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Int(n) => serde_json::Value::Number((*n).into()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

/// Desired configuration for one resource, as supplied by the host
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub address: ResourceAddress,
    pub attributes: HashMap<String, Value>,
}

impl Resource {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            address: ResourceAddress::new(resource_type, name),
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.attributes.get(key).and_then(Value::as_int)
    }
}

/// Current state fetched from Azure
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    pub address: ResourceAddress,
    /// ARM resource ID (e.g., /subscriptions/.../replicationFabrics/fabric1)
    pub identifier: Option<String>,
    pub attributes: HashMap<String, Value>,
    /// False means the resource is gone and the host should drop it from state
    pub exists: bool,
}

impl State {
    pub fn not_found(address: ResourceAddress) -> Self {
        Self {
            address,
            identifier: None,
            attributes: HashMap::new(),
            exists: false,
        }
    }

    pub fn existing(address: ResourceAddress, attributes: HashMap<String, Value>) -> Self {
        Self {
            address,
            identifier: None,
            attributes,
            exists: true,
        }
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.attributes.get(key).and_then(Value::as_int)
    }
}
