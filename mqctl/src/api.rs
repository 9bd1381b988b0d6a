//! Wire types for the messaging service API.
//!
//! Records returned by the service are read-only from the CLI's point of
//! view and live for a single command invocation. Request bodies carry
//! `skip_serializing_if` on every optional field: a flag the user did not
//! supply must not appear in the request at all.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON object payload for pool options and flavor capabilities.
pub type JsonObject = serde_json::Map<String, Value>;

/// A named message channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Queue {
    pub name: String,
}

/// Message counters for a queue, with digests of the oldest and newest
/// messages when the queue is non-empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueueStats {
    pub claimed: u64,
    pub free: u64,
    pub total: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oldest: Option<MessageDigest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub newest: Option<MessageDigest>,
}

/// Age and creation time of a message, as reported by queue stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDigest {
    pub age: u64,
    /// RFC 3339 timestamp.
    pub created: String,
}

/// A storage backend registered with the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    pub name: String,
    pub uri: String,
    pub weight: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default)]
    pub options: JsonObject,
}

/// Body of a pool registration request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PoolCreate {
    pub uri: String,
    pub weight: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub options: JsonObject,
}

/// Partial update of a pool. A `None` field is left untouched on the
/// server; a `Some` field is sent even when it holds a zero or empty
/// value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PoolUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<JsonObject>,
}

/// A storage-quality profile mapping to a pool group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flavor {
    pub name: String,
    pub pool: String,
    #[serde(default)]
    pub capabilities: JsonObject,
}

/// Body of a flavor registration request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlavorCreate {
    pub pool: String,
    pub capabilities: JsonObject,
}

/// Partial update of a flavor. Same presence rules as [`PoolUpdate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlavorUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<JsonObject>,
}

/// Body of a claim request. The message-count cap travels as a query
/// parameter, not in the body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimCreate {
    pub ttl: u64,
    pub grace: u64,
}

/// Body of a claim renewal. Only supplied fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClaimRenew {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grace: Option<u64>,
}

/// A lease on a batch of messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub id: String,
    pub ttl: u64,
    pub age: u64,
    #[serde(default)]
    pub messages: Vec<ClaimedMessage>,
}

/// A message held under a claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimedMessage {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_id: Option<String>,
    pub ttl: u64,
    pub age: u64,
    pub body: Value,
}

/// Pagination passthrough for list operations. `marker` and `limit` are
/// forwarded to the service only when supplied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub marker: Option<String>,
    pub limit: Option<u32>,
}
