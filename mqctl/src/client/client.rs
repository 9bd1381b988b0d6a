use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde_json::Value;
use url::Url;

use crate::api::{
    Claim, ClaimCreate, ClaimRenew, ClaimedMessage, Flavor, FlavorCreate, FlavorUpdate, Page,
    Pool, PoolCreate, PoolUpdate, Queue, QueueStats,
};
use crate::error::{MessagingError, ResourceKind, Result};

/// Capability set of the messaging service: queue/pool/flavor/claim CRUD
/// plus list. Command handlers depend on this trait only, so a test
/// double can stand in for network access.
#[async_trait]
pub trait MessagingApi: Send + Sync {
    // queues
    async fn create_queue(&self, name: &str) -> Result<Queue>;
    async fn queue_exists(&self, name: &str) -> Result<bool>;
    async fn delete_queue(&self, name: &str) -> Result<()>;
    async fn list_queues(&self, page: &Page) -> Result<Vec<Queue>>;
    async fn queue_metadata(&self, name: &str) -> Result<Value>;
    async fn set_queue_metadata(&self, name: &str, metadata: &Value) -> Result<()>;
    async fn queue_stats(&self, name: &str) -> Result<QueueStats>;

    // pools
    async fn create_pool(&self, name: &str, create: &PoolCreate) -> Result<Pool>;
    async fn get_pool(&self, name: &str) -> Result<Pool>;
    async fn update_pool(&self, name: &str, update: &PoolUpdate) -> Result<Pool>;
    async fn delete_pool(&self, name: &str) -> Result<()>;
    async fn list_pools(&self, page: &Page, detailed: bool) -> Result<Vec<Pool>>;

    // flavors
    async fn create_flavor(&self, name: &str, create: &FlavorCreate) -> Result<Flavor>;
    async fn get_flavor(&self, name: &str) -> Result<Flavor>;
    async fn update_flavor(&self, name: &str, update: &FlavorUpdate) -> Result<Flavor>;
    async fn delete_flavor(&self, name: &str) -> Result<()>;
    async fn list_flavors(&self, page: &Page, detailed: bool) -> Result<Vec<Flavor>>;

    // claims
    async fn claim_messages(
        &self,
        queue: &str,
        claim: &ClaimCreate,
        limit: u32,
    ) -> Result<Vec<ClaimedMessage>>;
    async fn get_claim(&self, queue: &str, claim_id: &str) -> Result<Claim>;
    async fn renew_claim(&self, queue: &str, claim_id: &str, renew: &ClaimRenew) -> Result<Claim>;
    async fn release_claim(&self, queue: &str, claim_id: &str) -> Result<()>;
}

/// Client configuration builder
#[derive(Debug, Clone)]
pub struct MessagingClientBuilder {
    endpoint: Option<String>,
    api_key: Option<String>,
    connect_timeout: Duration,
    rpc_timeout: Duration,
}

impl Default for MessagingClientBuilder {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            connect_timeout: Duration::from_secs(10),
            rpc_timeout: Duration::from_secs(30),
        }
    }
}

impl MessagingClientBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the service endpoint
    pub fn endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set API key for authentication
    pub fn api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set connection timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set per-request timeout
    pub fn rpc_timeout(mut self, timeout: Duration) -> Self {
        self.rpc_timeout = timeout;
        self
    }

    /// Build the client
    pub fn build(self) -> Result<HttpMessagingClient> {
        let endpoint = self
            .endpoint
            .ok_or_else(|| MessagingError::InvalidConfig("endpoint is required".to_string()))?;

        let base = Url::parse(&endpoint).map_err(|e| {
            MessagingError::InvalidConfig(format!("invalid endpoint '{}': {}", endpoint, e))
        })?;
        if base.cannot_be_a_base() {
            return Err(MessagingError::InvalidConfig(format!(
                "endpoint '{}' cannot carry API paths",
                endpoint
            )));
        }

        let http = reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.rpc_timeout)
            .build()?;

        Ok(HttpMessagingClient {
            http,
            base,
            api_key: self.api_key,
        })
    }
}

/// HTTP implementation of [`MessagingApi`]. One request per operation;
/// no retry, no pagination loop, no caching.
#[derive(Debug)]
pub struct HttpMessagingClient {
    http: reqwest::Client,
    base: Url,
    api_key: Option<String>,
}

const API_VERSION: &str = "v1";

fn apply_page(url: &mut Url, page: &Page) {
    if page.marker.is_none() && page.limit.is_none() {
        return;
    }
    let mut query = url.query_pairs_mut();
    if let Some(marker) = &page.marker {
        query.append_pair("marker", marker);
    }
    if let Some(limit) = page.limit {
        query.append_pair("limit", &limit.to_string());
    }
}

/// Map a non-success response onto the error taxonomy. 404 becomes a
/// typed not-found for the resource the request addressed.
async fn expect_success(response: Response, kind: ResourceKind, name: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(MessagingError::NotFound {
            kind,
            name: name.to_string(),
        });
    }
    let message = response.text().await.unwrap_or_default();
    Err(MessagingError::Api { status, message })
}

impl HttpMessagingClient {
    /// Create a new client builder
    pub fn builder() -> MessagingClientBuilder {
        MessagingClientBuilder::new()
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // cannot_be_a_base endpoints are rejected at build time
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push(API_VERSION).extend(segments);
        }
        url
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response> {
        let request = match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        };
        Ok(request.send().await?)
    }
}

#[async_trait]
impl MessagingApi for HttpMessagingClient {
    async fn create_queue(&self, name: &str) -> Result<Queue> {
        let response = self.send(self.http.put(self.url(&["queues", name]))).await?;
        expect_success(response, ResourceKind::Queue, name).await?;
        Ok(Queue {
            name: name.to_string(),
        })
    }

    async fn queue_exists(&self, name: &str) -> Result<bool> {
        let response = self
            .send(self.http.head(self.url(&["queues", name])))
            .await?;
        let status = response.status();
        if status.is_success() {
            return Ok(true);
        }
        if status == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        let message = response.text().await.unwrap_or_default();
        Err(MessagingError::Api { status, message })
    }

    async fn delete_queue(&self, name: &str) -> Result<()> {
        let response = self
            .send(self.http.delete(self.url(&["queues", name])))
            .await?;
        expect_success(response, ResourceKind::Queue, name).await?;
        Ok(())
    }

    async fn list_queues(&self, page: &Page) -> Result<Vec<Queue>> {
        let mut url = self.url(&["queues"]);
        apply_page(&mut url, page);
        let response = self.send(self.http.get(url)).await?;
        let response = expect_success(response, ResourceKind::Queue, "").await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }
        let listing: QueueListing = response.json().await?;
        Ok(listing.queues)
    }

    async fn queue_metadata(&self, name: &str) -> Result<Value> {
        let response = self
            .send(self.http.get(self.url(&["queues", name, "metadata"])))
            .await?;
        let response = expect_success(response, ResourceKind::Queue, name).await?;
        Ok(response.json().await?)
    }

    async fn set_queue_metadata(&self, name: &str, metadata: &Value) -> Result<()> {
        let response = self
            .send(
                self.http
                    .put(self.url(&["queues", name, "metadata"]))
                    .json(metadata),
            )
            .await?;
        expect_success(response, ResourceKind::Queue, name).await?;
        Ok(())
    }

    async fn queue_stats(&self, name: &str) -> Result<QueueStats> {
        let response = self
            .send(self.http.get(self.url(&["queues", name, "stats"])))
            .await?;
        let response = expect_success(response, ResourceKind::Queue, name).await?;
        let envelope: StatsEnvelope = response.json().await?;
        Ok(envelope.messages)
    }

    async fn create_pool(&self, name: &str, create: &PoolCreate) -> Result<Pool> {
        let response = self
            .send(self.http.put(self.url(&["pools", name])).json(create))
            .await?;
        expect_success(response, ResourceKind::Pool, name).await?;
        Ok(Pool {
            name: name.to_string(),
            uri: create.uri.clone(),
            weight: create.weight,
            group: create.group.clone(),
            options: create.options.clone(),
        })
    }

    async fn get_pool(&self, name: &str) -> Result<Pool> {
        let response = self.send(self.http.get(self.url(&["pools", name]))).await?;
        let response = expect_success(response, ResourceKind::Pool, name).await?;
        Ok(response.json().await?)
    }

    async fn update_pool(&self, name: &str, update: &PoolUpdate) -> Result<Pool> {
        let response = self
            .send(self.http.patch(self.url(&["pools", name])).json(update))
            .await?;
        expect_success(response, ResourceKind::Pool, name).await?;
        self.get_pool(name).await
    }

    async fn delete_pool(&self, name: &str) -> Result<()> {
        let response = self
            .send(self.http.delete(self.url(&["pools", name])))
            .await?;
        expect_success(response, ResourceKind::Pool, name).await?;
        Ok(())
    }

    async fn list_pools(&self, page: &Page, detailed: bool) -> Result<Vec<Pool>> {
        let mut url = self.url(&["pools"]);
        apply_page(&mut url, page);
        if detailed {
            url.query_pairs_mut().append_pair("detailed", "true");
        }
        let response = self.send(self.http.get(url)).await?;
        let response = expect_success(response, ResourceKind::Pool, "").await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }
        let listing: PoolListing = response.json().await?;
        Ok(listing.pools)
    }

    async fn create_flavor(&self, name: &str, create: &FlavorCreate) -> Result<Flavor> {
        let response = self
            .send(self.http.put(self.url(&["flavors", name])).json(create))
            .await?;
        expect_success(response, ResourceKind::Flavor, name).await?;
        Ok(Flavor {
            name: name.to_string(),
            pool: create.pool.clone(),
            capabilities: create.capabilities.clone(),
        })
    }

    async fn get_flavor(&self, name: &str) -> Result<Flavor> {
        let response = self
            .send(self.http.get(self.url(&["flavors", name])))
            .await?;
        let response = expect_success(response, ResourceKind::Flavor, name).await?;
        Ok(response.json().await?)
    }

    async fn update_flavor(&self, name: &str, update: &FlavorUpdate) -> Result<Flavor> {
        let response = self
            .send(self.http.patch(self.url(&["flavors", name])).json(update))
            .await?;
        expect_success(response, ResourceKind::Flavor, name).await?;
        self.get_flavor(name).await
    }

    async fn delete_flavor(&self, name: &str) -> Result<()> {
        let response = self
            .send(self.http.delete(self.url(&["flavors", name])))
            .await?;
        expect_success(response, ResourceKind::Flavor, name).await?;
        Ok(())
    }

    async fn list_flavors(&self, page: &Page, detailed: bool) -> Result<Vec<Flavor>> {
        let mut url = self.url(&["flavors"]);
        apply_page(&mut url, page);
        if detailed {
            url.query_pairs_mut().append_pair("detailed", "true");
        }
        let response = self.send(self.http.get(url)).await?;
        let response = expect_success(response, ResourceKind::Flavor, "").await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }
        let listing: FlavorListing = response.json().await?;
        Ok(listing.flavors)
    }

    async fn claim_messages(
        &self,
        queue: &str,
        claim: &ClaimCreate,
        limit: u32,
    ) -> Result<Vec<ClaimedMessage>> {
        let mut url = self.url(&["queues", queue, "claims"]);
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());
        let response = self.send(self.http.post(url).json(claim)).await?;
        let response = expect_success(response, ResourceKind::Queue, queue).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }
        Ok(response.json().await?)
    }

    async fn get_claim(&self, queue: &str, claim_id: &str) -> Result<Claim> {
        let response = self
            .send(
                self.http
                    .get(self.url(&["queues", queue, "claims", claim_id])),
            )
            .await?;
        let response = expect_success(response, ResourceKind::Claim, claim_id).await?;
        Ok(response.json().await?)
    }

    async fn renew_claim(&self, queue: &str, claim_id: &str, renew: &ClaimRenew) -> Result<Claim> {
        let response = self
            .send(
                self.http
                    .patch(self.url(&["queues", queue, "claims", claim_id]))
                    .json(renew),
            )
            .await?;
        expect_success(response, ResourceKind::Claim, claim_id).await?;
        self.get_claim(queue, claim_id).await
    }

    async fn release_claim(&self, queue: &str, claim_id: &str) -> Result<()> {
        let response = self
            .send(
                self.http
                    .delete(self.url(&["queues", queue, "claims", claim_id])),
            )
            .await?;
        expect_success(response, ResourceKind::Claim, claim_id).await?;
        Ok(())
    }
}

#[derive(serde::Deserialize)]
struct QueueListing {
    #[serde(default)]
    queues: Vec<Queue>,
}

#[derive(serde::Deserialize)]
struct PoolListing {
    #[serde(default)]
    pools: Vec<Pool>,
}

#[derive(serde::Deserialize)]
struct FlavorListing {
    #[serde(default)]
    flavors: Vec<Flavor>,
}

#[derive(serde::Deserialize)]
struct StatsEnvelope {
    messages: QueueStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(endpoint: &str) -> HttpMessagingClient {
        HttpMessagingClient::builder()
            .endpoint(endpoint)
            .build()
            .expect("client builds")
    }

    #[test]
    fn build_requires_endpoint() {
        let err = MessagingClientBuilder::new().build().unwrap_err();
        assert!(matches!(err, MessagingError::InvalidConfig(_)));
    }

    #[test]
    fn build_rejects_non_base_endpoint() {
        let err = MessagingClientBuilder::new()
            .endpoint("mailto:ops@example.com")
            .build()
            .unwrap_err();
        assert!(matches!(err, MessagingError::InvalidConfig(_)));
    }

    #[test]
    fn urls_are_versioned_and_escaped() {
        let client = client("http://localhost:8888");
        let url = client.url(&["queues", "order events"]);
        assert_eq!(url.as_str(), "http://localhost:8888/v1/queues/order%20events");
    }

    #[test]
    fn trailing_slash_endpoints_do_not_double_up() {
        let client = client("http://localhost:8888/messaging/");
        let url = client.url(&["pools"]);
        assert_eq!(url.as_str(), "http://localhost:8888/messaging/v1/pools");
    }

    #[test]
    fn page_params_are_only_added_when_supplied() {
        let client = client("http://localhost:8888");
        let mut url = client.url(&["queues"]);
        apply_page(&mut url, &Page::default());
        assert_eq!(url.query(), None);

        let mut url = client.url(&["queues"]);
        apply_page(
            &mut url,
            &Page {
                marker: Some("q-17".to_string()),
                limit: Some(5),
            },
        );
        assert_eq!(url.query(), Some("marker=q-17&limit=5"));
    }
}
