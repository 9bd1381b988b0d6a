//! Subcommand handlers: resolve arguments, invoke one client operation,
//! project the result onto a fixed row shape for the output manager.

use anyhow::Result;
use chrono::DateTime;
use serde::Serialize;
use tabled::Tabled;

use crate::api::{
    ClaimCreate, ClaimRenew, ClaimedMessage, Flavor, FlavorCreate, FlavorUpdate, JsonObject, Page,
    Pool, PoolCreate, PoolUpdate,
};
use crate::cli::args::{Cli, ClaimCommands, FlavorCommands, PoolCommands, QueueCommands};
use crate::cli::output::OutputManager;
use crate::client::MessagingApi;
use crate::error::{CliError, ResourceKind};

// Row shapes for output formatting. Column sets are fixed per command.
#[derive(Debug, Serialize, Tabled)]
pub struct QueueRow {
    #[tabled(rename = "Name")]
    pub name: String,
}

#[derive(Debug, Serialize, Tabled)]
pub struct ExistsRow {
    #[tabled(rename = "Exists")]
    pub exists: bool,
}

#[derive(Debug, Serialize, Tabled)]
pub struct MetadataRow {
    #[tabled(rename = "Metadata")]
    pub metadata: String,
}

#[derive(Debug, Serialize, Tabled)]
pub struct StatsRow {
    #[tabled(rename = "Queue")]
    pub queue: String,
    #[tabled(rename = "Claimed")]
    pub claimed: u64,
    #[tabled(rename = "Free")]
    pub free: u64,
    #[tabled(rename = "Total")]
    pub total: u64,
    #[tabled(rename = "Oldest")]
    pub oldest: String,
    #[tabled(rename = "Newest")]
    pub newest: String,
}

#[derive(Debug, Serialize, Tabled)]
pub struct PoolRow {
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Weight")]
    pub weight: i64,
    #[tabled(rename = "URI")]
    pub uri: String,
    #[tabled(rename = "Group", display_with = "display_absent")]
    pub group: Option<String>,
    #[tabled(rename = "Options", display_with = "display_object")]
    pub options: JsonObject,
}

impl From<Pool> for PoolRow {
    fn from(pool: Pool) -> Self {
        Self {
            name: pool.name,
            weight: pool.weight,
            uri: pool.uri,
            group: pool.group,
            options: pool.options,
        }
    }
}

/// Pool listing without the options column; `--detailed` switches to the
/// full [`PoolRow`].
#[derive(Debug, Serialize, Tabled)]
pub struct PoolSummaryRow {
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Weight")]
    pub weight: i64,
    #[tabled(rename = "URI")]
    pub uri: String,
    #[tabled(rename = "Group", display_with = "display_absent")]
    pub group: Option<String>,
}

impl From<Pool> for PoolSummaryRow {
    fn from(pool: Pool) -> Self {
        Self {
            name: pool.name,
            weight: pool.weight,
            uri: pool.uri,
            group: pool.group,
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct FlavorRow {
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Pool")]
    pub pool: String,
    #[tabled(rename = "Capabilities", display_with = "display_object")]
    pub capabilities: JsonObject,
}

impl From<Flavor> for FlavorRow {
    fn from(flavor: Flavor) -> Self {
        Self {
            name: flavor.name,
            pool: flavor.pool,
            capabilities: flavor.capabilities,
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct ClaimedMessageRow {
    #[tabled(rename = "Claim ID")]
    pub claim_id: String,
    #[tabled(rename = "Message ID")]
    pub message_id: String,
    #[tabled(rename = "TTL")]
    pub ttl: u64,
    #[tabled(rename = "Age")]
    pub age: u64,
    #[tabled(rename = "Body")]
    pub body: String,
}

impl ClaimedMessageRow {
    fn new(claim_id: &str, message: ClaimedMessage) -> Self {
        Self {
            claim_id: message
                .claim_id
                .unwrap_or_else(|| claim_id.to_string()),
            message_id: message.id,
            ttl: message.ttl,
            age: message.age,
            body: message.body.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct ClaimMessageRow {
    #[tabled(rename = "Message ID")]
    pub message_id: String,
    #[tabled(rename = "Age")]
    pub age: u64,
    #[tabled(rename = "TTL")]
    pub ttl: u64,
    #[tabled(rename = "Body")]
    pub body: String,
}

impl From<ClaimedMessage> for ClaimMessageRow {
    fn from(message: ClaimedMessage) -> Self {
        Self {
            message_id: message.id,
            age: message.age,
            ttl: message.ttl,
            body: message.body.to_string(),
        }
    }
}

fn display_absent(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "-".to_string())
}

fn display_object(value: &JsonObject) -> String {
    serde_json::Value::Object(value.clone()).to_string()
}

fn format_digest(digest: &Option<crate::api::MessageDigest>) -> String {
    match digest {
        Some(digest) => DateTime::parse_from_rfc3339(&digest.created)
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|_| digest.created.clone()),
        None => "-".to_string(),
    }
}

/// Fail fast before metadata/stats operations on a queue that is not
/// there, instead of surfacing a raw lookup failure.
async fn ensure_queue<C: MessagingApi>(client: &C, name: &str) -> Result<(), CliError> {
    if client.queue_exists(name).await? {
        Ok(())
    } else {
        Err(CliError::NotFound {
            kind: ResourceKind::Queue,
            name: name.to_string(),
        })
    }
}

// Queue command handlers
pub async fn handle_queue_command<C: MessagingApi>(
    client: &C,
    command: &QueueCommands,
    cli: &Cli,
) -> Result<()> {
    let output = OutputManager::new(cli.output.clone(), cli.quiet);

    match command {
        QueueCommands::Create { name } => {
            let queue = client.create_queue(name).await?;
            output.print_record(&QueueRow { name: queue.name })?;
            output.success(&format!("Queue '{}' created", name));
        }

        QueueCommands::Delete { name } => {
            client.delete_queue(name).await?;
            output.success(&format!("Queue '{}' deleted", name));
        }

        QueueCommands::List { marker, limit } => {
            let page = Page {
                marker: marker.clone(),
                limit: *limit,
            };
            let queues = client.list_queues(&page).await?;
            let rows: Vec<QueueRow> = queues
                .into_iter()
                .map(|q| QueueRow { name: q.name })
                .collect();
            output.print_rows(&rows)?;
        }

        QueueCommands::Exists { name } => {
            let exists = client.queue_exists(name).await?;
            output.print_record(&ExistsRow { exists })?;
        }

        QueueCommands::GetMetadata { name } => {
            ensure_queue(client, name).await?;
            let metadata = client.queue_metadata(name).await?;
            output.print_record(&MetadataRow {
                metadata: serde_json::to_string_pretty(&metadata)?,
            })?;
        }

        QueueCommands::SetMetadata { name, metadata } => {
            ensure_queue(client, name).await?;
            let document: serde_json::Value =
                serde_json::from_str(metadata).map_err(|source| CliError::InvalidJson {
                    what: "queue metadata".to_string(),
                    source,
                })?;
            client.set_queue_metadata(name, &document).await?;
            output.success(&format!("Metadata set on queue '{}'", name));
        }

        QueueCommands::Stats { name } => {
            ensure_queue(client, name).await?;
            let stats = client.queue_stats(name).await?;
            output.print_record(&StatsRow {
                queue: name.clone(),
                claimed: stats.claimed,
                free: stats.free,
                total: stats.total,
                oldest: format_digest(&stats.oldest),
                newest: format_digest(&stats.newest),
            })?;
        }
    }

    Ok(())
}

// Pool command handlers
pub async fn handle_pool_command<C: MessagingApi>(
    client: &C,
    command: &PoolCommands,
    cli: &Cli,
) -> Result<()> {
    let output = OutputManager::new(cli.output.clone(), cli.quiet);

    match command {
        PoolCommands::Create {
            name,
            uri,
            weight,
            group,
            options,
        } => {
            let create = PoolCreate {
                uri: uri.clone(),
                weight: *weight,
                group: group.clone(),
                options: options.clone(),
            };
            let pool = client.create_pool(name, &create).await?;
            output.print_record(&PoolRow::from(pool))?;
            output.success(&format!("Pool '{}' registered", name));
        }

        PoolCommands::Show { name } => {
            let pool = client.get_pool(name).await?;
            output.print_record(&PoolRow::from(pool))?;
        }

        PoolCommands::Update {
            name,
            uri,
            weight,
            group,
            options,
        } => {
            let update = PoolUpdate {
                uri: uri.clone(),
                weight: *weight,
                group: group.clone(),
                options: options.clone(),
            };
            let pool = client.update_pool(name, &update).await?;
            output.print_record(&PoolRow::from(pool))?;
        }

        PoolCommands::Delete { name } => {
            client.delete_pool(name).await?;
            output.success(&format!("Pool '{}' deleted", name));
        }

        PoolCommands::List {
            marker,
            limit,
            detailed,
        } => {
            let page = Page {
                marker: marker.clone(),
                limit: *limit,
            };
            let pools = client.list_pools(&page, *detailed).await?;
            if *detailed {
                let rows: Vec<PoolRow> = pools.into_iter().map(PoolRow::from).collect();
                output.print_rows(&rows)?;
            } else {
                let rows: Vec<PoolSummaryRow> =
                    pools.into_iter().map(PoolSummaryRow::from).collect();
                output.print_rows(&rows)?;
            }
        }
    }

    Ok(())
}

// Flavor command handlers
pub async fn handle_flavor_command<C: MessagingApi>(
    client: &C,
    command: &FlavorCommands,
    cli: &Cli,
) -> Result<()> {
    let output = OutputManager::new(cli.output.clone(), cli.quiet);

    match command {
        FlavorCommands::Create {
            name,
            pool_group,
            capabilities,
        } => {
            let create = FlavorCreate {
                pool: pool_group.clone(),
                capabilities: capabilities.clone(),
            };
            let flavor = client.create_flavor(name, &create).await?;
            output.print_record(&FlavorRow::from(flavor))?;
            output.success(&format!("Flavor '{}' created", name));
        }

        FlavorCommands::Show { name } => {
            let flavor = client.get_flavor(name).await?;
            output.print_record(&FlavorRow::from(flavor))?;
        }

        FlavorCommands::Update {
            name,
            pool_group,
            capabilities,
        } => {
            let update = FlavorUpdate {
                pool: pool_group.clone(),
                capabilities: capabilities.clone(),
            };
            let flavor = client.update_flavor(name, &update).await?;
            output.print_record(&FlavorRow::from(flavor))?;
        }

        FlavorCommands::Delete { name } => {
            client.delete_flavor(name).await?;
            output.success(&format!("Flavor '{}' deleted", name));
        }

        FlavorCommands::List {
            marker,
            limit,
            detailed,
        } => {
            let page = Page {
                marker: marker.clone(),
                limit: *limit,
            };
            let flavors = client.list_flavors(&page, *detailed).await?;
            let rows: Vec<FlavorRow> = flavors.into_iter().map(FlavorRow::from).collect();
            output.print_rows(&rows)?;
        }
    }

    Ok(())
}

// Claim command handlers
pub async fn handle_claim_command<C: MessagingApi>(
    client: &C,
    command: &ClaimCommands,
    cli: &Cli,
) -> Result<()> {
    let output = OutputManager::new(cli.output.clone(), cli.quiet);

    match command {
        ClaimCommands::Create {
            queue,
            ttl,
            grace,
            limit,
        } => {
            let claim = ClaimCreate {
                ttl: *ttl,
                grace: *grace,
            };
            let messages = client.claim_messages(queue, &claim, *limit).await?;
            let rows: Vec<ClaimedMessageRow> = messages
                .into_iter()
                .map(|m| ClaimedMessageRow::new("-", m))
                .collect();
            output.print_rows(&rows)?;
        }

        ClaimCommands::Query { queue, claim_id } => {
            let claim = client.get_claim(queue, claim_id).await?;
            let rows: Vec<ClaimMessageRow> = claim
                .messages
                .into_iter()
                .map(ClaimMessageRow::from)
                .collect();
            output.print_rows(&rows)?;
        }

        ClaimCommands::Renew {
            queue,
            claim_id,
            ttl,
            grace,
        } => {
            let renew = ClaimRenew {
                ttl: *ttl,
                grace: *grace,
            };
            let claim = client.renew_claim(queue, claim_id, &renew).await?;
            let rows: Vec<ClaimMessageRow> = claim
                .messages
                .into_iter()
                .map(ClaimMessageRow::from)
                .collect();
            output.print_rows(&rows)?;
        }

        ClaimCommands::Release { queue, claim_id } => {
            client.release_claim(queue, claim_id).await?;
            output.success(&format!(
                "Claim '{}' on queue '{}' released",
                claim_id, queue
            ));
        }
    }

    Ok(())
}
