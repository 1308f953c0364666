//! Relationship command

use clap::Args;
use serde_json::json;

use crate::output::{print_json, OutputFormat};
use crate::{AppContext, Cli};
use kindred_core::NodeId;

#[derive(Args)]
pub struct RelationshipArgs {
    /// Reference node id
    pub reference: String,

    /// Destination node id
    pub destination: String,
}

pub async fn run(args: &RelationshipArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let reference = NodeId::from_string(&args.reference)
        .map_err(|e| anyhow::anyhow!("invalid node id '{}': {}", args.reference, e))?;
    let destination = NodeId::from_string(&args.destination)
        .map_err(|e| anyhow::anyhow!("invalid node id '{}': {}", args.destination, e))?;

    let relationship = ctx.engine.get_relationship(reference, destination).await?;
    tracing::info!(label = %relationship, "relationship classified");

    match OutputFormat::from(cli.format.as_str()) {
        OutputFormat::Json => print_json(&json!({ "relationshipLabel": relationship.label() })),
        OutputFormat::Table => println!("{}", relationship.label()),
    }

    Ok(())
}
