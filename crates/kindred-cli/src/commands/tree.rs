//! Tree commands

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use serde_json::json;

use crate::output::{print_json, OutputFormat};
use crate::{AppContext, Cli};
use kindred_core::{PersonIdentity, UserId};
use kindred_storage::StorageBackend;

#[derive(Args)]
pub struct TreeArgs {
    #[command(subcommand)]
    pub command: TreeCommands,
}

#[derive(Subcommand)]
pub enum TreeCommands {
    /// Create a user and their family tree
    Create {
        /// Username for the new account
        #[arg(long)]
        username: String,
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
    /// Show the tree owned by a user
    Show {
        /// Owner user id
        user: String,
    },
}

pub async fn run(args: &TreeArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    match &args.command {
        TreeCommands::Create {
            username,
            first,
            last,
            middle,
            birthdate,
        } => {
            let mut identity = PersonIdentity::new(first, last);
            if let Some(middle) = middle {
                identity = identity.with_middle_name(middle);
            }
            if let Some(birthdate) = birthdate {
                identity = identity.with_birthdate(*birthdate);
            }

            let user = ctx.engine.create_user(username, identity).await?;
            let (tree, root) = ctx.engine.create_tree(user.id).await?;
            tracing::info!(user = %user.id, tree = %tree.id, "tree created");

            match OutputFormat::from(cli.format.as_str()) {
                OutputFormat::Json => print_json(&json!({
                    "userId": user.id.to_string(),
                    "treeId": tree.id.to_string(),
                    "rootNodeId": root.id.to_string(),
                })),
                OutputFormat::Table => {
                    println!("Created tree for '{}'", username);
                    println!("  user: {}", user.id);
                    println!("  tree: {}", tree.id);
                    println!("  root: {}", root.id);
                }
            }
        }
        TreeCommands::Show { user } => {
            let owner = UserId::from_string(user)
                .map_err(|e| anyhow::anyhow!("invalid user id '{}': {}", user, e))?;

            let tree = ctx.engine.get_tree(owner).await?;
            let nodes = ctx.storage.get_nodes_by_tree(tree.id).await?;

            match OutputFormat::from(cli.format.as_str()) {
                OutputFormat::Json => print_json(&json!({
                    "treeId": tree.id.to_string(),
                    "rootNodeId": tree.root.to_string(),
                    "nodeCount": nodes.len(),
                })),
                OutputFormat::Table => {
                    println!("Tree {} ({} nodes)", tree.id, nodes.len());
                    println!("  root: {}", tree.root);
                    for node in &nodes {
                        let name = match ctx.storage.get_person(node.person).await? {
                            Some(person) => person.display_name(),
                            None => "(unknown person)".to_string(),
                        };
                        println!(
                            "  {}  {} (parents: {}, children: {})",
                            node.id,
                            name,
                            node.parents.len(),
                            node.children.len()
                        );
                    }
                }
            }
        }
    }

    Ok(())
}
