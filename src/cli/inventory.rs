//! Inventory read commands: list, get, nodes

use tabled::Tabled;

use crate::cli::{CommandContext, OutputFormat};
use crate::error::{Error, Result};
use crate::inventory::{Instance, Inventory};
use crate::output::format_table;
use crate::rpc::RpcClient;

/// Instance display row for table output
#[derive(Debug, Tabled)]
struct InstanceRow {
    #[tabled(rename = "INSTANCE ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "STATE")]
    state: String,
    #[tabled(rename = "TYPE")]
    instance_type: String,
    #[tabled(rename = "PRIVATE IP")]
    private_ip: String,
}

impl From<&Instance> for InstanceRow {
    fn from(instance: &Instance) -> Self {
        let state = instance
            .attributes
            .get("State")
            .and_then(|s| s.get("Name"))
            .and_then(|n| n.as_str())
            .unwrap_or("-");

        Self {
            id: instance.instance_id.clone(),
            name: instance.tag("Name").unwrap_or("-").to_string(),
            state: state.to_string(),
            instance_type: instance.attribute("InstanceType").unwrap_or("-").to_string(),
            private_ip: instance
                .attribute("PrivateIpAddress")
                .unwrap_or("-")
                .to_string(),
        }
    }
}

/// List all instances in the local VPC
pub async fn list(ctx: &CommandContext, format: OutputFormat) -> Result<()> {
    let inventory = Inventory::load(&ctx.cache).await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(inventory.snapshot())?);
        }
        OutputFormat::Yaml => {
            print!(
                "{}",
                serde_yaml::to_string(inventory.snapshot())
                    .map_err(|e| Error::Other(e.to_string()))?
            );
        }
        OutputFormat::Table => {
            let rows: Vec<InstanceRow> = inventory.iter().map(|(_, i)| i.into()).collect();
            println!("{}", format_table(&rows));
        }
    }
    Ok(())
}

/// Show one instance by id
pub async fn get(ctx: &CommandContext, format: OutputFormat, instance_id: &str) -> Result<()> {
    let inventory = Inventory::load(&ctx.cache).await?;
    let instance = inventory
        .get(instance_id)
        .ok_or_else(|| Error::NotFound(instance_id.to_string()))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(instance)?),
        // A single record reads best as YAML either way
        OutputFormat::Yaml | OutputFormat::Table => print!(
            "{}",
            serde_yaml::to_string(instance).map_err(|e| Error::Other(e.to_string()))?
        ),
    }
    Ok(())
}

/// List nodes registered with the local inventory RPC service
pub async fn nodes(ctx: &CommandContext, format: OutputFormat) -> Result<()> {
    let client = RpcClient::with_base_url(ctx.config.rpc_url.clone())?;
    let nodes = client.nodes().await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&nodes)?),
        OutputFormat::Yaml => print!(
            "{}",
            serde_yaml::to_string(&nodes).map_err(|e| Error::Other(e.to_string()))?
        ),
        OutputFormat::Table => {
            for name in nodes.keys() {
                println!("{}", name);
            }
        }
    }
    Ok(())
}
