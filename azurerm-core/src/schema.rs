//! Schema - Define type schemas for resources
//!
//! Providers define schemas for each resource type, so configuration can be
//! validated before any remote call is made.

use std::collections::HashMap;
use std::fmt;

use crate::resource::Value;

/// Attribute type
#[derive(Debug, Clone)]
pub enum AttributeType {
    /// String
    String,
    /// Integer
    Int,
    /// Custom type (with validation function)
    Custom {
        name: String,
        base: Box<AttributeType>,
        validate: fn(&Value) -> Result<(), String>,
    },
}

impl AttributeType {
    /// Check if a value conforms to this type
    pub fn validate(&self, value: &Value) -> Result<(), TypeError> {
        match (self, value) {
            (AttributeType::String, Value::String(_)) => Ok(()),
            (AttributeType::Int, Value::Int(_)) => Ok(()),

            (AttributeType::Custom { base, validate, .. }, v) => {
                base.validate(v)?;
                validate(v).map_err(|msg| TypeError::ValidationFailed { message: msg })
            }

            _ => Err(TypeError::TypeMismatch {
                expected: self.type_name(),
                got: value.type_name(),
            }),
        }
    }

    fn type_name(&self) -> String {
        match self {
            AttributeType::String => "String".to_string(),
            AttributeType::Int => "Int".to_string(),
            AttributeType::Custom { name, .. } => name.clone(),
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// Type error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TypeError {
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Required attribute '{name}' is missing")]
    MissingRequired { name: String },

    #[error("Attribute '{name}' is computed and cannot be set")]
    ComputedAttribute { name: String },

    #[error("Attribute '{name}': {inner}")]
    Attribute { name: String, inner: Box<TypeError> },
}

impl Value {
    fn type_name(&self) -> String {
        match self {
            Value::String(_) => "String".to_string(),
            Value::Int(_) => "Int".to_string(),
        }
    }
}

/// Attribute schema
#[derive(Debug, Clone)]
pub struct AttributeSchema {
    pub name: String,
    pub attr_type: AttributeType,
    pub required: bool,
    /// Changing this attribute means destroying and recreating the resource
    pub force_new: bool,
    /// Set by Azure only; never sent
    pub computed: bool,
    pub description: Option<String>,
    /// Canonical form applied before sending and comparing (e.g., location casing)
    pub normalize: Option<fn(&Value) -> Value>,
}

impl AttributeSchema {
    pub fn new(name: impl Into<String>, attr_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attr_type,
            required: false,
            force_new: false,
            computed: false,
            description: None,
            normalize: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn with_normalizer(mut self, normalize: fn(&Value) -> Value) -> Self {
        self.normalize = Some(normalize);
        self
    }

    /// Apply the normalizer, if any
    pub fn canonical(&self, value: &Value) -> Value {
        match self.normalize {
            Some(normalize) => normalize(value),
            None => value.clone(),
        }
    }
}

/// Resource schema
#[derive(Debug, Clone)]
pub struct ResourceSchema {
    pub resource_type: String,
    pub attributes: HashMap<String, AttributeSchema>,
    pub description: Option<String>,
}

impl ResourceSchema {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            attributes: HashMap::new(),
            description: None,
        }
    }

    pub fn attribute(mut self, schema: AttributeSchema) -> Self {
        self.attributes.insert(schema.name.clone(), schema);
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Validate resource attributes
    pub fn validate(&self, attributes: &HashMap<String, Value>) -> Result<(), Vec<TypeError>> {
        let mut errors = Vec::new();

        // Check required attributes
        let mut names: Vec<&String> = self.attributes.keys().collect();
        names.sort();
        for name in names {
            let schema = &self.attributes[name];
            if schema.required && !attributes.contains_key(name) {
                errors.push(TypeError::MissingRequired { name: name.clone() });
            }
        }

        // Type check each attribute
        let mut keys: Vec<&String> = attributes.keys().collect();
        keys.sort();
        for name in keys {
            let Some(schema) = self.attributes.get(name) else {
                // Unknown attributes are allowed (for flexibility)
                continue;
            };
            if schema.computed {
                errors.push(TypeError::ComputedAttribute { name: name.clone() });
                continue;
            }
            if let Err(e) = schema.attr_type.validate(&attributes[name]) {
                errors.push(TypeError::Attribute {
                    name: name.clone(),
                    inner: Box::new(e),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Names of force-new attributes whose desired value differs from the prior one
    ///
    /// Values are compared after normalization. An attribute absent from
    /// `prior` is not reported, since there is nothing to compare against.
    pub fn force_new_changes(
        &self,
        prior: &HashMap<String, Value>,
        desired: &HashMap<String, Value>,
    ) -> Vec<String> {
        let mut changed: Vec<String> = self
            .attributes
            .values()
            .filter(|schema| schema.force_new)
            .filter(|schema| match (prior.get(&schema.name), desired.get(&schema.name)) {
                (Some(before), Some(after)) => {
                    schema.canonical(before) != schema.canonical(after)
                }
                (Some(_), None) => true,
                _ => false,
            })
            .map(|schema| schema.name.clone())
            .collect();
        changed.sort();
        changed
    }

    /// True when at least one attribute can change without recreating the resource
    pub fn has_updatable_attributes(&self) -> bool {
        self.attributes
            .values()
            .any(|schema| !schema.force_new && !schema.computed)
    }
}

/// Helper functions for common types
pub mod types {
    use super::*;

    /// Non-empty string type
    pub fn string_not_empty() -> AttributeType {
        AttributeType::Custom {
            name: "NonEmptyString".to_string(),
            base: Box::new(AttributeType::String),
            validate: |value| match value {
                Value::String(s) if s.is_empty() => Err("Value must not be empty".to_string()),
                _ => Ok(()),
            },
        }
    }
}
