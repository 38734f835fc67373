use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Deserialize;

use azurerm_core::provider::{OperationContext, Provider};
use azurerm_core::resource::{Resource, ResourceAddress, State, Value};
use azurerm_core::schema::ResourceSchema;
use azurerm_provider::schemas;
use azurerm_provider::{AzurermProvider, ProviderConfig};

#[derive(Parser)]
#[command(name = "azurerm")]
#[command(about = "Manage Azure resources one at a time through the Resource Manager API", long_about = None)]
struct Cli {
    /// Deadline in seconds, overriding the per-operation default
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a resource file without calling Azure
    Validate {
        /// Path to resource JSON file
        file: PathBuf,
    },
    /// Create the resource described in a file
    Create {
        /// Path to resource JSON file
        file: PathBuf,
    },
    /// Read a resource by its ARM ID
    Read {
        /// Resource type (e.g., recovery_services_replication_fabric)
        #[arg(long = "type")]
        resource_type: String,
        /// ARM resource ID
        #[arg(long)]
        id: String,
    },
    /// Check an ARM ID and show the resource it addresses
    Import {
        #[arg(long = "type")]
        resource_type: String,
        #[arg(long)]
        id: String,
    },
    /// Update a resource in place from a file
    Update {
        /// Path to resource JSON file
        file: PathBuf,
        /// ARM resource ID
        #[arg(long)]
        id: String,
    },
    /// Delete a resource by its ARM ID
    Delete {
        #[arg(long = "type")]
        resource_type: String,
        #[arg(long)]
        id: String,
    },
    /// Show resource schemas
    Schema {
        /// Only show this resource type
        resource_type: Option<String>,
    },
}

/// On-disk form of a resource: `{"type": ..., "name": ..., "attributes": {...}}`
#[derive(Debug, Deserialize)]
struct ResourceFile {
    #[serde(rename = "type")]
    resource_type: String,
    #[serde(default = "default_name")]
    name: String,
    #[serde(default)]
    attributes: serde_json::Map<String, serde_json::Value>,
}

fn default_name() -> String {
    "main".to_string()
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let ctx = match cli.timeout {
        Some(secs) => OperationContext::with_timeout(Duration::from_secs(secs)),
        None => OperationContext::default(),
    };

    let result = match cli.command {
        Commands::Validate { file } => run_validate(&file),
        Commands::Create { file } => run_create(&file, &ctx).await,
        Commands::Read { resource_type, id } => run_read(&resource_type, &id, &ctx).await,
        Commands::Import { resource_type, id } => run_import(&resource_type, &id, &ctx).await,
        Commands::Update { file, id } => run_update(&file, &id, &ctx).await,
        Commands::Delete { resource_type, id } => run_delete(&resource_type, &id, &ctx).await,
        Commands::Schema { resource_type } => run_schema(resource_type.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn get_schemas() -> HashMap<String, ResourceSchema> {
    let mut all_schemas = HashMap::new();
    for schema in schemas::all_schemas() {
        all_schemas.insert(schema.resource_type.clone(), schema);
    }
    all_schemas
}

fn connect() -> Result<AzurermProvider, String> {
    let config = ProviderConfig::from_env().map_err(|e| e.to_string())?;
    log::debug!("Using {:?}", config);
    AzurermProvider::connect(config).map_err(|e| e.to_string())
}

fn load_resource(file: &Path) -> Result<Resource, String> {
    let content = fs::read_to_string(file)
        .map_err(|e| format!("Failed to read {}: {}", file.display(), e))?;
    parse_resource(&content).map_err(|e| format!("Failed to parse {}: {}", file.display(), e))
}

fn parse_resource(content: &str) -> Result<Resource, String> {
    let parsed: ResourceFile = serde_json::from_str(content).map_err(|e| e.to_string())?;
    let mut resource = Resource::new(parsed.resource_type, parsed.name);
    for (key, value) in &parsed.attributes {
        let value = Value::from_json(value).map_err(|e| format!("attribute {}: {}", key, e))?;
        if let Some(value) = value {
            resource.attributes.insert(key.clone(), value);
        }
    }
    Ok(resource)
}

fn validate_resource(resource: &Resource) -> Result<(), String> {
    let schemas = get_schemas();
    let schema = schemas
        .get(&resource.address.resource_type)
        .ok_or_else(|| format!("Unknown resource type: {}", resource.address.resource_type))?;

    schema.validate(&resource.attributes).map_err(|errors| {
        errors
            .iter()
            .map(|e| format!("{}: {}", resource.address, e))
            .collect::<Vec<_>>()
            .join("\n")
    })
}

/// JSON form of a state, with attributes in a stable order
fn state_to_json(state: &State) -> serde_json::Value {
    let attributes: BTreeMap<&String, serde_json::Value> = state
        .attributes
        .iter()
        .map(|(k, v)| (k, v.to_json()))
        .collect();
    serde_json::json!({
        "type": state.address.resource_type,
        "name": state.address.name,
        "id": state.identifier,
        "exists": state.exists,
        "attributes": attributes,
    })
}

fn print_state(state: &State) -> Result<(), String> {
    let json = serde_json::to_string_pretty(&state_to_json(state)).map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(())
}

fn run_validate(file: &Path) -> Result<(), String> {
    let resource = load_resource(file)?;

    println!("{}", "Validating...".cyan());
    validate_resource(&resource)?;

    println!("{}", format!("✓ {} is valid.", resource.address).green().bold());
    Ok(())
}

async fn run_create(file: &Path, ctx: &OperationContext) -> Result<(), String> {
    let resource = load_resource(file)?;
    validate_resource(&resource)?;
    let provider = connect()?;

    eprintln!("{} {}", "Creating".cyan().bold(), resource.address);
    let state = provider
        .create(&resource, ctx)
        .await
        .map_err(|e| e.to_string())?;
    eprintln!("  {} {}", "✓".green(), resource.address);
    print_state(&state)
}

async fn run_read(resource_type: &str, id: &str, ctx: &OperationContext) -> Result<(), String> {
    let provider = connect()?;
    let address = ResourceAddress::new(resource_type, "main");

    let state = provider
        .read(&address, Some(id), ctx)
        .await
        .map_err(|e| e.to_string())?;
    if !state.exists {
        eprintln!("{}", "Resource not found; it would be removed from state.".yellow());
    }
    print_state(&state)
}

async fn run_import(resource_type: &str, id: &str, ctx: &OperationContext) -> Result<(), String> {
    let provider = connect()?;
    provider
        .import(resource_type, id)
        .map_err(|e| e.to_string())?;

    let address = ResourceAddress::new(resource_type, "main");
    let state = provider
        .read(&address, Some(id), ctx)
        .await
        .map_err(|e| e.to_string())?;
    if !state.exists {
        return Err(format!("Cannot import non-existent remote object {}", id));
    }
    print_state(&state)
}

async fn run_update(file: &Path, id: &str, ctx: &OperationContext) -> Result<(), String> {
    let resource = load_resource(file)?;
    validate_resource(&resource)?;
    let provider = connect()?;

    let current = provider
        .read(&resource.address, Some(id), ctx)
        .await
        .map_err(|e| e.to_string())?;
    if !current.exists {
        return Err(format!("{} does not exist", id));
    }

    eprintln!("{} {}", "Updating".cyan().bold(), resource.address);
    let state = provider
        .update(id, &current, &resource, ctx)
        .await
        .map_err(|e| e.to_string())?;
    eprintln!("  {} {}", "✓".green(), resource.address);
    print_state(&state)
}

async fn run_delete(resource_type: &str, id: &str, ctx: &OperationContext) -> Result<(), String> {
    let provider = connect()?;
    let address = ResourceAddress::new(resource_type, "main");

    eprintln!("{} {}", "Deleting".red().bold(), id);
    provider
        .delete(&address, id, ctx)
        .await
        .map_err(|e| e.to_string())?;
    eprintln!("  {} deleted", "✓".green());
    Ok(())
}

fn run_schema(resource_type: Option<&str>) -> Result<(), String> {
    let mut schemas: Vec<ResourceSchema> = schemas::all_schemas()
        .into_iter()
        .filter(|s| resource_type.is_none_or(|t| s.resource_type == t))
        .collect();
    if schemas.is_empty() {
        return Err(format!(
            "Unknown resource type: {}",
            resource_type.unwrap_or_default()
        ));
    }
    schemas.sort_by(|a, b| a.resource_type.cmp(&b.resource_type));

    for schema in &schemas {
        println!("{}", schema.resource_type.bold());
        if let Some(description) = &schema.description {
            println!("  {}", description.dimmed());
        }
        let mut attributes: Vec<_> = schema.attributes.values().collect();
        attributes.sort_by(|a, b| a.name.cmp(&b.name));
        for attr in attributes {
            let mut flags = Vec::new();
            if attr.required {
                flags.push("required".yellow().to_string());
            }
            if attr.force_new {
                flags.push("force-new".red().to_string());
            }
            if attr.computed {
                flags.push("computed".cyan().to_string());
            }
            println!("  • {} ({}) {}", attr.name, attr.attr_type, flags.join(", "));
        }
        println!();
    }
    Ok(())
}
