//! Azurerm Core
//!
//! Host-facing types shared by Azure Resource Manager resource adapters:
//! configuration records, schemas, resource IDs and the `Provider` trait.

pub mod identifier;
pub mod provider;
pub mod resource;
pub mod schema;
