//! Azure-specific type definitions

use azurerm_core::resource::Value;
use azurerm_core::schema::AttributeType;
use regex::Regex;

/// Smallest collection interval Log Analytics accepts for performance counters
pub const MIN_INTERVAL_SECONDS: i64 = 10;

fn matches(pattern: &str, s: &str) -> bool {
    Regex::new(pattern).map(|re| re.is_match(s)).unwrap_or(false)
}

/// Azure location; compared and sent in normalized form ("West US" -> "westus")
pub fn location() -> AttributeType {
    AttributeType::Custom {
        name: "Location".to_string(),
        base: Box::new(AttributeType::String),
        validate: |value| match value {
            Value::String(s) if s.trim().is_empty() => {
                Err("location must not be empty".to_string())
            }
            _ => Ok(()),
        },
    }
}

/// Resource group name: up to 90 letters, digits, `-`, `_`, `.`, `(` or `)`,
/// not ending in a period
pub fn resource_group_name() -> AttributeType {
    AttributeType::Custom {
        name: "ResourceGroupName".to_string(),
        base: Box::new(AttributeType::String),
        validate: |value| {
            let Value::String(s) = value else {
                return Err("Expected string".to_string());
            };
            if s.len() > 90 {
                return Err(format!(
                    "resource group name {:?} may not exceed 90 characters in length",
                    s
                ));
            }
            if s.ends_with('.') {
                return Err(format!(
                    "resource group name {:?} may not end with a period",
                    s
                ));
            }
            if !matches(r"^[-a-zA-Z0-9_.()]+$", s) {
                return Err(format!(
                    "resource group name {:?} may only contain alphanumeric characters, dash, underscores, parentheses and periods",
                    s
                ));
            }
            Ok(())
        },
    }
}

/// Recovery Services vault name
pub fn vault_name() -> AttributeType {
    AttributeType::Custom {
        name: "VaultName".to_string(),
        base: Box::new(AttributeType::String),
        validate: |value| match value {
            Value::String(s) if matches(r"^[a-zA-Z][-a-zA-Z0-9]{1,49}$", s) => Ok(()),
            _ => Err("Recovery Service Vault name must be 2 - 50 characters long, start with a letter, contain only letters, numbers and hyphens.".to_string()),
        },
    }
}

/// Replication fabric name
pub fn fabric_name() -> AttributeType {
    AttributeType::Custom {
        name: "FabricName".to_string(),
        base: Box::new(AttributeType::String),
        validate: |value| match value {
            Value::String(s) if matches(r"^[a-zA-Z][-a-zA-Z0-9]{1,49}$", s) => Ok(()),
            _ => Err("Replication Fabric name must be 2 - 50 characters long, start with a letter, contain only letters, numbers and hyphens.".to_string()),
        },
    }
}

/// Log Analytics workspace name
pub fn workspace_name() -> AttributeType {
    AttributeType::Custom {
        name: "WorkspaceName".to_string(),
        base: Box::new(AttributeType::String),
        validate: |value| {
            let Value::String(s) = value else {
                return Err("Expected string".to_string());
            };
            let mut problems = Vec::new();
            if !matches(r"^[A-Za-z0-9][A-Za-z0-9-]+[A-Za-z0-9]$", s) {
                problems.push("Workspace Name can only contain alphabet, number, and '-' character. You can not use '-' as the start and end of the name");
            }
            if s.len() < 4 || s.len() > 63 {
                problems.push("Workspace Name can only be between 4 and 63 letters");
            }
            if problems.is_empty() {
                Ok(())
            } else {
                Err(problems.join("; "))
            }
        },
    }
}

/// Data source name: non-empty, and a single path segment of the resource ID
pub fn data_source_name() -> AttributeType {
    AttributeType::Custom {
        name: "DataSourceName".to_string(),
        base: Box::new(AttributeType::String),
        validate: |value| match value {
            Value::String(s) if s.is_empty() => Err("Value must not be empty".to_string()),
            Value::String(s) if s.contains('/') => {
                Err(format!("data source name {:?} may not contain '/'", s))
            }
            _ => Ok(()),
        },
    }
}

/// Collection interval in seconds, between 10 and `i32::MAX`
pub fn interval_seconds() -> AttributeType {
    AttributeType::Custom {
        name: "IntervalSeconds".to_string(),
        base: Box::new(AttributeType::Int),
        validate: |value| match value {
            Value::Int(n) if (MIN_INTERVAL_SECONDS..=i64::from(i32::MAX)).contains(n) => Ok(()),
            Value::Int(n) => Err(format!(
                "expected interval_seconds to be in the range ({} - {}), got {}",
                MIN_INTERVAL_SECONDS,
                i32::MAX,
                n
            )),
            _ => Err("Expected integer".to_string()),
        },
    }
}
