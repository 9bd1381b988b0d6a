use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use mqctl::api::{
    Claim, ClaimCreate, ClaimRenew, ClaimedMessage, Flavor, FlavorCreate, FlavorUpdate, Page,
    Pool, PoolCreate, PoolUpdate, Queue, QueueStats,
};
use mqctl::error::{MessagingError, ResourceKind, Result};
use mqctl::MessagingApi;

/// One recorded invocation of the messaging client.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateQueue { name: String },
    QueueExists { name: String },
    DeleteQueue { name: String },
    ListQueues { page: Page },
    QueueMetadata { name: String },
    SetQueueMetadata { name: String, metadata: Value },
    QueueStats { name: String },
    CreatePool { name: String, create: PoolCreate },
    GetPool { name: String },
    UpdatePool { name: String, update: PoolUpdate },
    DeletePool { name: String },
    ListPools { page: Page, detailed: bool },
    CreateFlavor { name: String, create: FlavorCreate },
    GetFlavor { name: String },
    UpdateFlavor { name: String, update: FlavorUpdate },
    DeleteFlavor { name: String },
    ListFlavors { page: Page, detailed: bool },
    ClaimMessages { queue: String, claim: ClaimCreate, limit: u32 },
    GetClaim { queue: String, claim_id: String },
    RenewClaim { queue: String, claim_id: String, renew: ClaimRenew },
    ReleaseClaim { queue: String, claim_id: String },
}

impl Call {
    /// Whether the call would change service state.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Call::CreateQueue { .. }
                | Call::DeleteQueue { .. }
                | Call::SetQueueMetadata { .. }
                | Call::CreatePool { .. }
                | Call::UpdatePool { .. }
                | Call::DeletePool { .. }
                | Call::CreateFlavor { .. }
                | Call::UpdateFlavor { .. }
                | Call::DeleteFlavor { .. }
                | Call::ClaimMessages { .. }
                | Call::RenewClaim { .. }
                | Call::ReleaseClaim { .. }
        )
    }
}

/// In-memory stand-in for the messaging service. Configure the resources
/// that "exist", then assert on [`MockMessagingClient::calls`] after
/// running a handler against it.
#[derive(Default)]
pub struct MockMessagingClient {
    queues: Vec<String>,
    metadata: HashMap<String, Value>,
    stats: HashMap<String, QueueStats>,
    pools: Vec<Pool>,
    flavors: Vec<Flavor>,
    claims: HashMap<(String, String), Claim>,
    claimed: Vec<ClaimedMessage>,
    calls: Mutex<Vec<Call>>,
}

impl MockMessagingClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_queue<S: Into<String>>(mut self, name: S) -> Self {
        self.queues.push(name.into());
        self
    }

    pub fn with_metadata<S: Into<String>>(mut self, queue: S, metadata: Value) -> Self {
        self.metadata.insert(queue.into(), metadata);
        self
    }

    pub fn with_stats<S: Into<String>>(mut self, queue: S, stats: QueueStats) -> Self {
        self.stats.insert(queue.into(), stats);
        self
    }

    pub fn with_pool(mut self, pool: Pool) -> Self {
        self.pools.push(pool);
        self
    }

    pub fn with_flavor(mut self, flavor: Flavor) -> Self {
        self.flavors.push(flavor);
        self
    }

    pub fn with_claim<Q: Into<String>>(mut self, queue: Q, claim: Claim) -> Self {
        self.claims.insert((queue.into(), claim.id.clone()), claim);
        self
    }

    pub fn with_claimed_messages(mut self, messages: Vec<ClaimedMessage>) -> Self {
        self.claimed = messages;
        self
    }

    /// Everything the client was asked to do, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("call log poisoned").clone()
    }

    /// The subset of recorded calls that would mutate service state.
    pub fn mutating_calls(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutating).collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("call log poisoned").push(call);
    }

    fn not_found(kind: ResourceKind, name: &str) -> MessagingError {
        MessagingError::NotFound {
            kind,
            name: name.to_string(),
        }
    }
}

#[async_trait]
impl MessagingApi for MockMessagingClient {
    async fn create_queue(&self, name: &str) -> Result<Queue> {
        self.record(Call::CreateQueue {
            name: name.to_string(),
        });
        Ok(Queue {
            name: name.to_string(),
        })
    }

    async fn queue_exists(&self, name: &str) -> Result<bool> {
        self.record(Call::QueueExists {
            name: name.to_string(),
        });
        Ok(self.queues.iter().any(|q| q == name))
    }

    async fn delete_queue(&self, name: &str) -> Result<()> {
        self.record(Call::DeleteQueue {
            name: name.to_string(),
        });
        Ok(())
    }

    async fn list_queues(&self, page: &Page) -> Result<Vec<Queue>> {
        self.record(Call::ListQueues { page: page.clone() });
        Ok(self
            .queues
            .iter()
            .map(|name| Queue { name: name.clone() })
            .collect())
    }

    async fn queue_metadata(&self, name: &str) -> Result<Value> {
        self.record(Call::QueueMetadata {
            name: name.to_string(),
        });
        self.metadata
            .get(name)
            .cloned()
            .ok_or_else(|| Self::not_found(ResourceKind::Queue, name))
    }

    async fn set_queue_metadata(&self, name: &str, metadata: &Value) -> Result<()> {
        self.record(Call::SetQueueMetadata {
            name: name.to_string(),
            metadata: metadata.clone(),
        });
        Ok(())
    }

    async fn queue_stats(&self, name: &str) -> Result<QueueStats> {
        self.record(Call::QueueStats {
            name: name.to_string(),
        });
        Ok(self.stats.get(name).cloned().unwrap_or_default())
    }

    async fn create_pool(&self, name: &str, create: &PoolCreate) -> Result<Pool> {
        self.record(Call::CreatePool {
            name: name.to_string(),
            create: create.clone(),
        });
        Ok(Pool {
            name: name.to_string(),
            uri: create.uri.clone(),
            weight: create.weight,
            group: create.group.clone(),
            options: create.options.clone(),
        })
    }

    async fn get_pool(&self, name: &str) -> Result<Pool> {
        self.record(Call::GetPool {
            name: name.to_string(),
        });
        self.pools
            .iter()
            .find(|p| p.name == name)
            .cloned()
            .ok_or_else(|| Self::not_found(ResourceKind::Pool, name))
    }

    async fn update_pool(&self, name: &str, update: &PoolUpdate) -> Result<Pool> {
        self.record(Call::UpdatePool {
            name: name.to_string(),
            update: update.clone(),
        });
        let mut pool = self
            .pools
            .iter()
            .find(|p| p.name == name)
            .cloned()
            .ok_or_else(|| Self::not_found(ResourceKind::Pool, name))?;
        if let Some(uri) = &update.uri {
            pool.uri = uri.clone();
        }
        if let Some(weight) = update.weight {
            pool.weight = weight;
        }
        if let Some(group) = &update.group {
            pool.group = Some(group.clone());
        }
        if let Some(options) = &update.options {
            pool.options = options.clone();
        }
        Ok(pool)
    }

    async fn delete_pool(&self, name: &str) -> Result<()> {
        self.record(Call::DeletePool {
            name: name.to_string(),
        });
        if self.pools.iter().any(|p| p.name == name) {
            Ok(())
        } else {
            Err(Self::not_found(ResourceKind::Pool, name))
        }
    }

    async fn list_pools(&self, page: &Page, detailed: bool) -> Result<Vec<Pool>> {
        self.record(Call::ListPools {
            page: page.clone(),
            detailed,
        });
        Ok(self.pools.clone())
    }

    async fn create_flavor(&self, name: &str, create: &FlavorCreate) -> Result<Flavor> {
        self.record(Call::CreateFlavor {
            name: name.to_string(),
            create: create.clone(),
        });
        Ok(Flavor {
            name: name.to_string(),
            pool: create.pool.clone(),
            capabilities: create.capabilities.clone(),
        })
    }

    async fn get_flavor(&self, name: &str) -> Result<Flavor> {
        self.record(Call::GetFlavor {
            name: name.to_string(),
        });
        self.flavors
            .iter()
            .find(|f| f.name == name)
            .cloned()
            .ok_or_else(|| Self::not_found(ResourceKind::Flavor, name))
    }

    async fn update_flavor(&self, name: &str, update: &FlavorUpdate) -> Result<Flavor> {
        self.record(Call::UpdateFlavor {
            name: name.to_string(),
            update: update.clone(),
        });
        let mut flavor = self
            .flavors
            .iter()
            .find(|f| f.name == name)
            .cloned()
            .ok_or_else(|| Self::not_found(ResourceKind::Flavor, name))?;
        if let Some(pool) = &update.pool {
            flavor.pool = pool.clone();
        }
        if let Some(capabilities) = &update.capabilities {
            flavor.capabilities = capabilities.clone();
        }
        Ok(flavor)
    }

    async fn delete_flavor(&self, name: &str) -> Result<()> {
        self.record(Call::DeleteFlavor {
            name: name.to_string(),
        });
        if self.flavors.iter().any(|f| f.name == name) {
            Ok(())
        } else {
            Err(Self::not_found(ResourceKind::Flavor, name))
        }
    }

    async fn list_flavors(&self, page: &Page, detailed: bool) -> Result<Vec<Flavor>> {
        self.record(Call::ListFlavors {
            page: page.clone(),
            detailed,
        });
        Ok(self.flavors.clone())
    }

    async fn claim_messages(
        &self,
        queue: &str,
        claim: &ClaimCreate,
        limit: u32,
    ) -> Result<Vec<ClaimedMessage>> {
        self.record(Call::ClaimMessages {
            queue: queue.to_string(),
            claim: claim.clone(),
            limit,
        });
        if !self.queues.iter().any(|q| q == queue) {
            return Err(Self::not_found(ResourceKind::Queue, queue));
        }
        Ok(self.claimed.clone())
    }

    async fn get_claim(&self, queue: &str, claim_id: &str) -> Result<Claim> {
        self.record(Call::GetClaim {
            queue: queue.to_string(),
            claim_id: claim_id.to_string(),
        });
        self.claims
            .get(&(queue.to_string(), claim_id.to_string()))
            .cloned()
            .ok_or_else(|| Self::not_found(ResourceKind::Claim, claim_id))
    }

    async fn renew_claim(&self, queue: &str, claim_id: &str, renew: &ClaimRenew) -> Result<Claim> {
        self.record(Call::RenewClaim {
            queue: queue.to_string(),
            claim_id: claim_id.to_string(),
            renew: renew.clone(),
        });
        let mut claim = self
            .claims
            .get(&(queue.to_string(), claim_id.to_string()))
            .cloned()
            .ok_or_else(|| Self::not_found(ResourceKind::Claim, claim_id))?;
        if let Some(ttl) = renew.ttl {
            claim.ttl = ttl;
        }
        Ok(claim)
    }

    async fn release_claim(&self, queue: &str, claim_id: &str) -> Result<()> {
        self.record(Call::ReleaseClaim {
            queue: queue.to_string(),
            claim_id: claim_id.to_string(),
        });
        if self
            .claims
            .contains_key(&(queue.to_string(), claim_id.to_string()))
        {
            Ok(())
        } else {
            Err(Self::not_found(ResourceKind::Claim, claim_id))
        }
    }
}
