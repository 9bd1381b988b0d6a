pub mod args;
pub mod commands;
pub mod output;

pub use args::{Cli, ClaimCommands, Commands, FlavorCommands, PoolCommands, QueueCommands};
pub use commands::{
    handle_claim_command, handle_flavor_command, handle_pool_command, handle_queue_command,
};
pub use output::{OutputFormat, OutputManager};
