//! Attach commands

use chrono::NaiveDate;
use clap::{Args, Subcommand};

use crate::output::{print_json, OutputFormat};
use crate::{AppContext, Cli};
use kindred_core::{NodeId, PersonIdentity, TreeId};
use kindred_engine::AttachOutcome;

#[derive(Args)]
pub struct AttachArgs {
    #[command(subcommand)]
    pub command: AttachCommands,
}

#[derive(Subcommand)]
pub enum AttachCommands {
    /// Attach a child under a parent node
    Child {
        /// Tree id
        #[arg(long)]
        tree: String,
        /// Parent node id
        #[arg(long)]
        parent: String,
        /// First name
        #[arg(long)]
        first: String,
        /// Last name
        #[arg(long)]
        last: String,
        /// Middle name
        #[arg(long)]
        middle: Option<String>,
        /// Birthdate (YYYY-MM-DD)
        #[arg(long)]
        birthdate: Option<NaiveDate>,
    },
    /// Attach a parent above a child node
    Parent {
        /// Tree id
        #[arg(long)]
        tree: String,
        /// Child node id
        #[arg(long)]
        child: String,
        /// First name
        #[arg(long)]
        first: String,
        /// Last name
        #[arg(long)]
        last: String,
        /// Middle name
        #[arg(long)]
        middle: Option<String>,
        /// Birthdate (YYYY-MM-DD)
        #[arg(long)]
        birthdate: Option<NaiveDate>,
    },
}

fn build_identity(
    first: &str,
    last: &str,
    middle: &Option<String>,
    birthdate: &Option<NaiveDate>,
) -> PersonIdentity {
    let mut identity = PersonIdentity::new(first, last);
    if let Some(middle) = middle {
        identity = identity.with_middle_name(middle);
    }
    if let Some(birthdate) = birthdate {
        identity = identity.with_birthdate(*birthdate);
    }
    identity
}

fn parse_tree(s: &str) -> anyhow::Result<TreeId> {
    TreeId::from_string(s).map_err(|e| anyhow::anyhow!("invalid tree id '{}': {}", s, e))
}

fn parse_node(s: &str) -> anyhow::Result<NodeId> {
    NodeId::from_string(s).map_err(|e| anyhow::anyhow!("invalid node id '{}': {}", s, e))
}

fn print_outcome(outcome: &AttachOutcome, cli: &Cli) {
    match OutputFormat::from(cli.format.as_str()) {
        OutputFormat::Json => print_json(outcome),
        OutputFormat::Table => {
            println!("  parent: {}", outcome.parent.id);
            println!("  child:  {}", outcome.child.id);
            if outcome.matches.is_empty() {
                println!("  no potential matches in other trees");
            } else {
                println!("  potential matches:");
                for found in &outcome.matches {
                    println!(
                        "    {} {} in tree {} (common relatives: {})",
                        found.person.first_name,
                        found.person.last_name,
                        found.tree,
                        if found.has_common_relatives { "yes" } else { "no" }
                    );
                }
            }
        }
    }
}

pub async fn run(args: &AttachArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    match &args.command {
        AttachCommands::Child {
            tree,
            parent,
            first,
            last,
            middle,
            birthdate,
        } => {
            let tree_id = parse_tree(tree)?;
            let parent_id = parse_node(parent)?;
            let identity = build_identity(first, last, middle, birthdate);

            let outcome = ctx.engine.attach_child(tree_id, parent_id, identity).await?;
            tracing::info!(child = %outcome.child.id, "child attached");

            if matches!(OutputFormat::from(cli.format.as_str()), OutputFormat::Table) {
                println!("Attached child '{} {}'", first, last);
            }
            print_outcome(&outcome, cli);
        }
        AttachCommands::Parent {
            tree,
            child,
            first,
            last,
            middle,
            birthdate,
        } => {
            let tree_id = parse_tree(tree)?;
            let child_id = parse_node(child)?;
            let identity = build_identity(first, last, middle, birthdate);

            let outcome = ctx.engine.attach_parent(tree_id, child_id, identity).await?;
            tracing::info!(parent = %outcome.parent.id, "parent attached");

            if matches!(OutputFormat::from(cli.format.as_str()), OutputFormat::Table) {
                println!("Attached parent '{} {}'", first, last);
            }
            print_outcome(&outcome, cli);
        }
    }

    Ok(())
}
