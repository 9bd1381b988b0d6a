use clap::{Parser, Subcommand};
use clap_complete::Shell;

use crate::api::JsonObject;
use crate::cli::output::OutputFormat;

#[derive(Parser)]
#[command(name = "mqctl")]
#[command(about = "Admin CLI for the mqctl messaging service")]
#[command(version, long_about = None)]
pub struct Cli {
    /// Service endpoint (can also be set via MQCTL_ENDPOINT)
    #[arg(long, env = "MQCTL_ENDPOINT", default_value = "http://127.0.0.1:8888")]
    pub endpoint: String,

    /// API key for authentication (can also be set via MQCTL_API_KEY)
    #[arg(long, env = "MQCTL_API_KEY")]
    pub api_key: Option<String>,

    /// Connection timeout in seconds
    #[arg(long, default_value = "10")]
    pub connect_timeout: u64,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    pub rpc_timeout: u64,

    /// Output format
    #[arg(long, short = 'o', default_value = "table")]
    pub output: OutputFormat,

    /// Suppress output except for errors
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Enable verbose logging
    #[arg(long, short = 'v')]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Queue management commands
    #[command(subcommand)]
    Queue(QueueCommands),

    /// Storage pool management commands
    #[command(subcommand)]
    Pool(PoolCommands),

    /// Flavor management commands
    #[command(subcommand)]
    Flavor(FlavorCommands),

    /// Claim operations
    #[command(subcommand)]
    Claim(ClaimCommands),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum QueueCommands {
    /// Create a queue
    Create {
        /// Queue name
        name: String,
    },
    /// Delete a queue
    Delete {
        /// Queue name
        name: String,
    },
    /// List available queues
    List {
        /// Paging marker
        #[arg(long)]
        marker: Option<String>,
        /// Page size limit
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Check whether a queue exists
    Exists {
        /// Queue name
        name: String,
    },
    /// Get queue metadata
    GetMetadata {
        /// Queue name
        name: String,
    },
    /// Set queue metadata
    SetMetadata {
        /// Queue name
        name: String,
        /// Metadata as a JSON document
        metadata: String,
    },
    /// Get queue statistics
    Stats {
        /// Queue name
        name: String,
    },
}

#[derive(Subcommand)]
pub enum PoolCommands {
    /// Register a storage pool
    Create {
        /// Pool name
        name: String,
        /// Storage engine URI
        uri: String,
        /// Weight of the pool
        weight: i64,
        /// Group of the pool
        #[arg(long)]
        group: Option<String>,
        /// Storage-specific options as a JSON object
        #[arg(long, value_parser = parse_json_object, default_value = "{}")]
        options: JsonObject,
    },
    /// Display pool details
    Show {
        /// Pool name
        name: String,
    },
    /// Update pool attributes
    Update {
        /// Pool name
        name: String,
        /// Storage engine URI
        #[arg(long)]
        uri: Option<String>,
        /// Weight of the pool
        #[arg(long)]
        weight: Option<i64>,
        /// Group of the pool
        #[arg(long)]
        group: Option<String>,
        /// Storage-specific options as a JSON object
        #[arg(long, value_parser = parse_json_object)]
        options: Option<JsonObject>,
    },
    /// Delete a pool
    Delete {
        /// Pool name
        name: String,
    },
    /// List available pools
    List {
        /// Paging marker
        #[arg(long)]
        marker: Option<String>,
        /// Page size limit
        #[arg(long)]
        limit: Option<u32>,
        /// Include storage options in the listing
        #[arg(long)]
        detailed: bool,
    },
}

#[derive(Subcommand)]
pub enum FlavorCommands {
    /// Create a pool flavor
    Create {
        /// Flavor name
        name: String,
        /// Pool group the flavor maps to
        pool_group: String,
        /// Flavor-specific capabilities as a JSON object
        #[arg(long, value_parser = parse_json_object, default_value = "{}")]
        capabilities: JsonObject,
    },
    /// Display flavor details
    Show {
        /// Flavor name
        name: String,
    },
    /// Update flavor attributes
    Update {
        /// Flavor name
        name: String,
        /// Pool group the flavor maps to
        #[arg(long)]
        pool_group: Option<String>,
        /// Flavor-specific capabilities as a JSON object
        #[arg(long, value_parser = parse_json_object)]
        capabilities: Option<JsonObject>,
    },
    /// Delete a flavor
    Delete {
        /// Flavor name
        name: String,
    },
    /// List available flavors
    List {
        /// Paging marker
        #[arg(long)]
        marker: Option<String>,
        /// Page size limit
        #[arg(long)]
        limit: Option<u32>,
        /// Include capabilities in the server response
        #[arg(long)]
        detailed: bool,
    },
}

#[derive(Subcommand)]
pub enum ClaimCommands {
    /// Claim messages and list them
    Create {
        /// Queue to claim from
        queue: String,
        /// Time to live in seconds for the claim
        #[arg(long, default_value = "300")]
        ttl: u64,
        /// Message grace period in seconds
        #[arg(long, default_value = "60")]
        grace: u64,
        /// Claim up to this many messages
        #[arg(long, default_value = "10")]
        limit: u32,
    },
    /// Display claim details
    Query {
        /// Name of the claimed queue
        queue: String,
        /// Claim ID
        claim_id: String,
    },
    /// Renew a claim
    Renew {
        /// Name of the claimed queue
        queue: String,
        /// Claim ID
        claim_id: String,
        /// Time to live in seconds for the claim
        #[arg(long)]
        ttl: Option<u64>,
        /// Message grace period in seconds
        #[arg(long)]
        grace: Option<u64>,
    },
    /// Release a claim
    Release {
        /// Name of the claimed queue
        queue: String,
        /// Claim ID
        claim_id: String,
    },
}

/// clap value parser for JSON-object flags (`--options`, `--capabilities`).
pub fn parse_json_object(raw: &str) -> Result<JsonObject, String> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| format!("not valid JSON: {}", e))?;
    match value {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err("expected a JSON object".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn claim_create_defaults() {
        let cli = Cli::try_parse_from(["mqctl", "claim", "create", "orders"]).unwrap();
        match cli.command {
            Commands::Claim(ClaimCommands::Create {
                queue,
                ttl,
                grace,
                limit,
            }) => {
                assert_eq!(queue, "orders");
                assert_eq!(ttl, 300);
                assert_eq!(grace, 60);
                assert_eq!(limit, 10);
            }
            _ => panic!("expected claim create"),
        }
    }

    #[test]
    fn pool_options_must_be_a_json_object() {
        let result = Cli::try_parse_from([
            "mqctl", "pool", "create", "p1", "sqlite://", "10", "--options", "not-json",
        ]);
        assert!(result.is_err());

        let result = Cli::try_parse_from([
            "mqctl", "pool", "create", "p1", "sqlite://", "10", "--options", "[1,2]",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn pool_options_default_to_empty_object() {
        let cli = Cli::try_parse_from(["mqctl", "pool", "create", "p1", "sqlite://", "10"]).unwrap();
        match cli.command {
            Commands::Pool(PoolCommands::Create {
                group, options, ..
            }) => {
                assert!(group.is_none());
                assert!(options.is_empty());
            }
            _ => panic!("expected pool create"),
        }
    }

    #[test]
    fn pool_update_weight_zero_parses_as_present() {
        let cli =
            Cli::try_parse_from(["mqctl", "pool", "update", "p1", "--weight", "0"]).unwrap();
        match cli.command {
            Commands::Pool(PoolCommands::Update { weight, .. }) => {
                assert_eq!(weight, Some(0));
            }
            _ => panic!("expected pool update"),
        }
    }

    #[test]
    fn list_page_flags_are_optional() {
        let cli = Cli::try_parse_from(["mqctl", "queue", "list"]).unwrap();
        match cli.command {
            Commands::Queue(QueueCommands::List { marker, limit }) => {
                assert!(marker.is_none());
                assert!(limit.is_none());
            }
            _ => panic!("expected queue list"),
        }
    }
}
