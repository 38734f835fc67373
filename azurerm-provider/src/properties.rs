//! Typed property records for the supported resource kinds

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::codec::{CanonicalDocument, CodecError, TagLayout, TaggedProperties, from_object, to_object};

pub const WINDOWS_PERFORMANCE_COUNTER: &str = "WindowsPerformanceCounter";
pub const AZURE_FABRIC: &str = "Azure";

/// Settings of a Windows performance counter data source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowsPerformanceCounter {
    pub counter_name: String,
    pub instance_name: String,
    pub interval_seconds: i32,
    pub object_name: String,
}

/// Log Analytics data source properties, keyed by `kind`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSourceProperties {
    WindowsPerformanceCounter(WindowsPerformanceCounter),
}

impl TaggedProperties for DataSourceProperties {
    const LAYOUT: TagLayout = TagLayout::Adjacent {
        tag: "kind",
        content: "properties",
    };

    fn kind(&self) -> &str {
        match self {
            DataSourceProperties::WindowsPerformanceCounter(_) => WINDOWS_PERFORMANCE_COUNTER,
        }
    }

    fn to_properties(&self) -> Result<Map<String, Value>, CodecError> {
        match self {
            DataSourceProperties::WindowsPerformanceCounter(counter) => {
                to_object(self.kind(), counter)
            }
        }
    }

    fn from_canonical(document: CanonicalDocument) -> Result<Self, CodecError> {
        match document.kind.as_str() {
            WINDOWS_PERFORMANCE_COUNTER => from_object(&document.kind, document.properties)
                .map(DataSourceProperties::WindowsPerformanceCounter),
            _ => Err(CodecError::UnsupportedKind(document.kind)),
        }
    }
}

/// Azure-to-Azure fabric details
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureFabricDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub container_ids: Vec<String>,
}

/// Fabric `customDetails`, keyed by `instanceType`
///
/// Only Azure fabrics are managed here; other fabric types (VMware, Hyper-V
/// sites, ...) are kept by tag so a read can tell them apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FabricSpecificDetails {
    Azure(AzureFabricDetails),
    Other(String),
}

impl FabricSpecificDetails {
    pub fn as_azure(&self) -> Option<&AzureFabricDetails> {
        match self {
            FabricSpecificDetails::Azure(details) => Some(details),
            FabricSpecificDetails::Other(_) => None,
        }
    }
}

impl TaggedProperties for FabricSpecificDetails {
    const LAYOUT: TagLayout = TagLayout::Internal {
        tag: "instanceType",
    };

    fn kind(&self) -> &str {
        match self {
            FabricSpecificDetails::Azure(_) => AZURE_FABRIC,
            FabricSpecificDetails::Other(kind) => kind,
        }
    }

    fn to_properties(&self) -> Result<Map<String, Value>, CodecError> {
        match self {
            FabricSpecificDetails::Azure(details) => to_object(AZURE_FABRIC, details),
            FabricSpecificDetails::Other(_) => Ok(Map::new()),
        }
    }

    fn from_canonical(document: CanonicalDocument) -> Result<Self, CodecError> {
        match document.kind.as_str() {
            AZURE_FABRIC => from_object(&document.kind, document.properties)
                .map(FabricSpecificDetails::Azure),
            _ => Ok(FabricSpecificDetails::Other(document.kind)),
        }
    }
}
