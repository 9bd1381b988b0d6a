//! Contract tests for the subcommand handlers, run against a mock
//! messaging client that records every call.

use clap::Parser;
use serde_json::json;
use tabled::Tabled;

use mqctl::api::{Claim, ClaimCreate, ClaimRenew, JsonObject, Page, Pool, PoolCreate, PoolUpdate};
use mqctl::cli::commands::{ClaimedMessageRow, FlavorRow, PoolRow, PoolSummaryRow, StatsRow};
use mqctl::cli::{
    handle_claim_command, handle_flavor_command, handle_pool_command, handle_queue_command, Cli,
    Commands,
};
use mqctl::{CliError, FlavorCreate, MessagingError, ResourceKind};
use mqctl_test_utils::{Call, MockMessagingClient};

async fn run(client: &MockMessagingClient, argv: &[&str]) -> anyhow::Result<()> {
    let cli = Cli::try_parse_from(argv).expect("argv parses");
    match &cli.command {
        Commands::Queue(cmd) => handle_queue_command(client, cmd, &cli).await,
        Commands::Pool(cmd) => handle_pool_command(client, cmd, &cli).await,
        Commands::Flavor(cmd) => handle_flavor_command(client, cmd, &cli).await,
        Commands::Claim(cmd) => handle_claim_command(client, cmd, &cli).await,
        Commands::Completions { .. } => unreachable!("not exercised here"),
    }
}

fn sample_pool(name: &str) -> Pool {
    Pool {
        name: name.to_string(),
        uri: "sqlite://".to_string(),
        weight: 100,
        group: None,
        options: JsonObject::new(),
    }
}

#[tokio::test]
async fn get_metadata_on_missing_queue_fails_before_the_fetch() {
    let mock = MockMessagingClient::new();
    let err = run(&mock, &["mqctl", "-q", "queue", "get-metadata", "orders"])
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<CliError>(),
        Some(CliError::NotFound {
            kind: ResourceKind::Queue,
            ..
        })
    ));
    assert_eq!(
        mock.calls(),
        vec![Call::QueueExists {
            name: "orders".to_string()
        }]
    );
}

#[tokio::test]
async fn stats_on_missing_queue_fails_before_the_fetch() {
    let mock = MockMessagingClient::new();
    let err = run(&mock, &["mqctl", "-q", "queue", "stats", "orders"])
        .await
        .unwrap_err();

    assert!(err.downcast_ref::<CliError>().is_some());
    assert_eq!(
        mock.calls(),
        vec![Call::QueueExists {
            name: "orders".to_string()
        }]
    );
}

#[tokio::test]
async fn set_metadata_on_missing_queue_issues_no_mutating_call() {
    let mock = MockMessagingClient::new();
    let err = run(
        &mock,
        &["mqctl", "-q", "queue", "set-metadata", "orders", "{}"],
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<CliError>(),
        Some(CliError::NotFound { .. })
    ));
    assert!(mock.mutating_calls().is_empty());
}

#[tokio::test]
async fn set_metadata_rejects_malformed_json_without_calling_the_service() {
    let mock = MockMessagingClient::new().with_queue("orders");
    let err = run(
        &mock,
        &["mqctl", "-q", "queue", "set-metadata", "orders", "{not json"],
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<CliError>(),
        Some(CliError::InvalidJson { .. })
    ));
    assert!(mock.mutating_calls().is_empty());
}

#[tokio::test]
async fn set_metadata_forwards_the_parsed_document() {
    let mock = MockMessagingClient::new().with_queue("orders");
    run(
        &mock,
        &[
            "mqctl",
            "-q",
            "queue",
            "set-metadata",
            "orders",
            r#"{"ttl": 60}"#,
        ],
    )
    .await
    .unwrap();

    assert_eq!(
        mock.mutating_calls(),
        vec![Call::SetQueueMetadata {
            name: "orders".to_string(),
            metadata: json!({"ttl": 60}),
        }]
    );
}

#[tokio::test]
async fn queue_list_omits_page_params_when_absent() {
    let mock = MockMessagingClient::new();
    run(&mock, &["mqctl", "-q", "queue", "list"]).await.unwrap();

    assert_eq!(
        mock.calls(),
        vec![Call::ListQueues {
            page: Page::default()
        }]
    );
}

#[tokio::test]
async fn queue_list_forwards_supplied_page_params() {
    let mock = MockMessagingClient::new();
    run(
        &mock,
        &[
            "mqctl", "-q", "queue", "list", "--marker", "q-17", "--limit", "5",
        ],
    )
    .await
    .unwrap();

    assert_eq!(
        mock.calls(),
        vec![Call::ListQueues {
            page: Page {
                marker: Some("q-17".to_string()),
                limit: Some(5),
            }
        }]
    );
}

#[tokio::test]
async fn pool_create_forwards_exactly_the_supplied_fields() {
    let mock = MockMessagingClient::new();
    run(
        &mock,
        &[
            "mqctl", "-q", "pool", "create", "p1", "sqlite://", "10",
        ],
    )
    .await
    .unwrap();

    assert_eq!(
        mock.calls(),
        vec![Call::CreatePool {
            name: "p1".to_string(),
            create: PoolCreate {
                uri: "sqlite://".to_string(),
                weight: 10,
                group: None,
                options: JsonObject::new(),
            },
        }]
    );
}

#[tokio::test]
async fn pool_create_forwards_group_when_supplied() {
    let mock = MockMessagingClient::new();
    run(
        &mock,
        &[
            "mqctl", "-q", "pool", "create", "p1", "sqlite://", "10", "--group", "gold",
        ],
    )
    .await
    .unwrap();

    match mock.calls().as_slice() {
        [Call::CreatePool { create, .. }] => {
            assert_eq!(create.group.as_deref(), Some("gold"));
        }
        other => panic!("unexpected calls: {:?}", other),
    }
}

#[tokio::test]
async fn pool_update_includes_a_zero_weight() {
    let mock = MockMessagingClient::new().with_pool(sample_pool("p1"));
    run(&mock, &["mqctl", "-q", "pool", "update", "p1", "--weight", "0"])
        .await
        .unwrap();

    assert_eq!(
        mock.mutating_calls(),
        vec![Call::UpdatePool {
            name: "p1".to_string(),
            update: PoolUpdate {
                weight: Some(0),
                ..PoolUpdate::default()
            },
        }]
    );
}

#[tokio::test]
async fn pool_show_on_missing_pool_is_a_not_found_error() {
    let mock = MockMessagingClient::new();
    let err = run(&mock, &["mqctl", "-q", "pool", "show", "p1"])
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<MessagingError>(),
        Some(MessagingError::NotFound {
            kind: ResourceKind::Pool,
            ..
        })
    ));
    assert_eq!(
        mock.calls(),
        vec![Call::GetPool {
            name: "p1".to_string()
        }]
    );
}

#[tokio::test]
async fn pool_list_forwards_the_detailed_flag() {
    let mock = MockMessagingClient::new();
    run(&mock, &["mqctl", "-q", "pool", "list", "--detailed"])
        .await
        .unwrap();

    assert_eq!(
        mock.calls(),
        vec![Call::ListPools {
            page: Page::default(),
            detailed: true,
        }]
    );
}

#[tokio::test]
async fn flavor_create_defaults_capabilities_to_an_empty_object() {
    let mock = MockMessagingClient::new();
    run(&mock, &["mqctl", "-q", "flavor", "create", "fast", "gold"])
        .await
        .unwrap();

    assert_eq!(
        mock.calls(),
        vec![Call::CreateFlavor {
            name: "fast".to_string(),
            create: FlavorCreate {
                pool: "gold".to_string(),
                capabilities: JsonObject::new(),
            },
        }]
    );
}

#[tokio::test]
async fn claim_create_uses_the_documented_defaults() {
    let mock = MockMessagingClient::new().with_queue("orders");
    run(&mock, &["mqctl", "-q", "claim", "create", "orders"])
        .await
        .unwrap();

    assert_eq!(
        mock.calls(),
        vec![Call::ClaimMessages {
            queue: "orders".to_string(),
            claim: ClaimCreate { ttl: 300, grace: 60 },
            limit: 10,
        }]
    );
}

#[tokio::test]
async fn claim_renew_sends_only_supplied_fields() {
    let mock = MockMessagingClient::new().with_queue("orders").with_claim(
        "orders",
        Claim {
            id: "c1".to_string(),
            ttl: 300,
            age: 12,
            messages: vec![],
        },
    );
    run(
        &mock,
        &[
            "mqctl", "-q", "claim", "renew", "orders", "c1", "--ttl", "120",
        ],
    )
    .await
    .unwrap();

    assert_eq!(
        mock.mutating_calls(),
        vec![Call::RenewClaim {
            queue: "orders".to_string(),
            claim_id: "c1".to_string(),
            renew: ClaimRenew {
                ttl: Some(120),
                grace: None,
            },
        }]
    );
}

#[test]
fn column_sets_are_fixed_per_command() {
    let headers: Vec<String> = PoolRow::headers().iter().map(|h| h.to_string()).collect();
    assert_eq!(headers, ["Name", "Weight", "URI", "Group", "Options"]);

    let headers: Vec<String> = PoolSummaryRow::headers()
        .iter()
        .map(|h| h.to_string())
        .collect();
    assert_eq!(headers, ["Name", "Weight", "URI", "Group"]);

    let headers: Vec<String> = FlavorRow::headers().iter().map(|h| h.to_string()).collect();
    assert_eq!(headers, ["Name", "Pool", "Capabilities"]);

    let headers: Vec<String> = StatsRow::headers().iter().map(|h| h.to_string()).collect();
    assert_eq!(headers, ["Queue", "Claimed", "Free", "Total", "Oldest", "Newest"]);

    let headers: Vec<String> = ClaimedMessageRow::headers()
        .iter()
        .map(|h| h.to_string())
        .collect();
    assert_eq!(headers, ["Claim ID", "Message ID", "TTL", "Age", "Body"]);
}
