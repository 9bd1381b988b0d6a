// Wire types and errors shared between the client and the CLI
pub mod api;
pub mod error;

// Client library module
pub mod client;

// CLI modules (for internal use by the binary)
pub mod cli;

// Re-export commonly used client types for convenience
pub use client::{HttpMessagingClient, MessagingApi, MessagingClientBuilder};
pub use error::{CliError, MessagingError, ResourceKind};

// Re-export commonly used wire types
pub use api::{
    Claim, ClaimCreate, ClaimRenew, ClaimedMessage, Flavor, FlavorCreate, FlavorUpdate,
    JsonObject, MessageDigest, Page, Pool, PoolCreate, PoolUpdate, Queue, QueueStats,
};
