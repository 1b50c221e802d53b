//! Contract tests for `RulehubClient` against wiremock servers: caching,
//! legacy-shape handling, schema diagnostics, error classification and
//! cancellation priority.

use std::time::Duration;

use rulehub_client::RulehubClient;
use rulehub_core::{ErrorCode, Industry, RulehubError};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sample_index() -> serde_json::Value {
    serde_json::json!({
        "packages": [
            {
                "id": "gdpr.data_minimization",
                "name": "Data Minimization",
                "standard": "GDPR",
                "version": "1.2.0",
                "jurisdiction": ["EU", "EEA"],
                "industry": ["fintech", "privacy"],
                "coverage": ["storage", "processing"],
                "severity": "high",
                "paths": [
                    {"path": "policies/gdpr/data_minimization/policy.yaml", "exists": true},
                    {"path": "files/kyverno/gdpr-data_minimization-policy.yaml"}
                ]
            },
            {
                "id": "betting.constraint.placeholder",
                "name": "Betting Constraint"
            }
        ]
    })
}

async fn mount_index(server: &MockServer, route: &str, body: serde_json::Value, expect: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(expect)
        .mount(server)
        .await;
}

// ── Fetch and normalization ──────────────────────────────────────────────

#[tokio::test]
async fn fetches_and_normalizes_index() {
    let server = MockServer::start().await;
    mount_index(&server, "/index.json", sample_index(), 1).await;

    let client = RulehubClient::default();
    let packs = client
        .get_index(&format!("{}/index.json", server.uri()), None)
        .await
        .expect("index");

    assert_eq!(packs.len(), 2);
    assert_eq!(packs[0].id, "gdpr.data_minimization");
    assert_eq!(packs[0].jurisdiction.as_deref(), Some("EU, EEA"));
    assert_eq!(
        packs[0].industry,
        Some(Industry::Many(vec!["fintech".into(), "privacy".into()]))
    );
    let paths = packs[0].paths.as_ref().expect("paths");
    assert!(paths[0].exists);
    assert!(!paths[1].exists);

    // Second entry gets normalization defaults.
    assert_eq!(packs[1].standard, "N/A");
    assert_eq!(packs[1].version, "0.0.0");
    assert!(packs[1].coverage.is_empty());
}

#[tokio::test]
async fn preserves_input_order_without_dedup() {
    let server = MockServer::start().await;
    let body = serde_json::json!({"packages": [
        {"id": "z.last", "name": "Z"},
        {"id": "a.first", "name": "A"},
        {"id": "z.last", "name": "Z again"}
    ]});
    mount_index(&server, "/index.json", body, 1).await;

    let client = RulehubClient::default();
    let packs = client
        .get_index(&format!("{}/index.json", server.uri()), None)
        .await
        .expect("index");

    let ids: Vec<&str> = packs.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["z.last", "a.first", "z.last"]);
}

// ── Caching ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn serves_cache_within_ttl() {
    let server = MockServer::start().await;
    mount_index(&server, "/index.json", sample_index(), 1).await;

    let client = RulehubClient::default();
    let url = format!("{}/index.json", server.uri());
    let first = client.get_index(&url, None).await.expect("first");
    let second = client.get_index(&url, None).await.expect("second");
    assert_eq!(first, second);
}

#[tokio::test]
async fn zero_ttl_fetches_every_time() {
    let server = MockServer::start().await;
    mount_index(&server, "/index.json", sample_index(), 2).await;

    let client = RulehubClient::new(Duration::ZERO);
    let url = format!("{}/index.json", server.uri());
    client.get_index(&url, None).await.expect("first");
    client.get_index(&url, None).await.expect("second");
}

#[tokio::test]
async fn clear_cache_forces_refetch() {
    let server = MockServer::start().await;
    mount_index(&server, "/index.json", sample_index(), 2).await;

    let client = RulehubClient::default();
    let url = format!("{}/index.json", server.uri());
    client.get_index(&url, None).await.expect("first");
    client.clear_cache();
    client.get_index(&url, None).await.expect("second");
}

#[tokio::test]
async fn cache_is_keyed_by_exact_url() {
    let server = MockServer::start().await;
    mount_index(&server, "/a/index.json", sample_index(), 1).await;
    mount_index(&server, "/b/index.json", sample_index(), 1).await;

    let client = RulehubClient::default();
    client
        .get_index(&format!("{}/a/index.json", server.uri()), None)
        .await
        .expect("a");
    client
        .get_index(&format!("{}/b/index.json", server.uri()), None)
        .await
        .expect("b");
}

// ── Legacy shape ─────────────────────────────────────────────────────────

#[tokio::test]
async fn legacy_items_normalize_like_packages() {
    let server = MockServer::start().await;
    let entries = sample_index()["packages"].clone();
    mount_index(
        &server,
        "/current.json",
        serde_json::json!({ "packages": entries }),
        1,
    )
    .await;
    let entries = sample_index()["packages"].clone();
    mount_index(
        &server,
        "/legacy.json",
        serde_json::json!({ "items": entries }),
        1,
    )
    .await;

    let client = RulehubClient::default();
    let current = client
        .get_index(&format!("{}/current.json", server.uri()), None)
        .await
        .expect("current");
    let legacy = client
        .get_index(&format!("{}/legacy.json", server.uri()), None)
        .await
        .expect("legacy");
    assert_eq!(current, legacy);
}

// ── Error classification ─────────────────────────────────────────────────

#[tokio::test]
async fn non_success_status_maps_to_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/index.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = RulehubClient::default();
    let err = client
        .get_index(&format!("{}/index.json", server.uri()), None)
        .await
        .expect_err("http error");

    assert_eq!(err.code(), ErrorCode::IndexHttpError);
    match err {
        RulehubError::Http { status, message, .. } => {
            assert_eq!(status, Some(404));
            assert!(message.contains("404"), "message: {message}");
        }
        other => panic!("expected Http, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_host_maps_to_http_error() {
    // Nothing listens on this port; connection is refused.
    let client = RulehubClient::default();
    let err = client
        .get_index("http://127.0.0.1:9/index.json", None)
        .await
        .expect_err("transport error");
    assert_eq!(err.code(), ErrorCode::IndexHttpError);
    assert!(matches!(err, RulehubError::Http { status: None, .. }));
}

#[tokio::test]
async fn malformed_json_maps_to_unknown() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/index.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    let client = RulehubClient::default();
    let err = client
        .get_index(&format!("{}/index.json", server.uri()), None)
        .await
        .expect_err("parse error");
    assert_eq!(err.code(), ErrorCode::IndexUnknown);
}

#[tokio::test]
async fn missing_both_arrays_is_schema_invalid() {
    let server = MockServer::start().await;
    mount_index(
        &server,
        "/index.json",
        serde_json::json!({"version": 2, "packages": "nope"}),
        1,
    )
    .await;

    let client = RulehubClient::default();
    let err = client
        .get_index(&format!("{}/index.json", server.uri()), None)
        .await
        .expect_err("schema error");
    assert_eq!(err.code(), ErrorCode::IndexSchemaInvalid);
    assert!(err.to_string().contains("missing packages or items array"));
}

#[tokio::test]
async fn schema_diagnostics_are_truncated_to_five() {
    let server = MockServer::start().await;
    // Eight entries with a numeric id: one violation each.
    let packages: Vec<_> = (0..8)
        .map(|i| serde_json::json!({"id": i, "name": format!("Pack {i}")}))
        .collect();
    mount_index(
        &server,
        "/index.json",
        serde_json::json!({ "packages": packages }),
        1,
    )
    .await;

    let client = RulehubClient::default();
    let err = client
        .get_index(&format!("{}/index.json", server.uri()), None)
        .await
        .expect_err("schema error");

    assert_eq!(err.code(), ErrorCode::IndexSchemaInvalid);
    let details = err.details().expect("details").to_owned();
    assert!(details.ends_with("...and 3 more"), "details: {details}");
    let body = details.trim_end_matches("...and 3 more").trim_end_matches("; ");
    assert_eq!(body.split("; ").count(), 5, "details: {details}");
}

// ── Cancellation ─────────────────────────────────────────────────────────

#[tokio::test]
async fn pre_cancelled_token_aborts_without_fetching() {
    let server = MockServer::start().await;
    mount_index(&server, "/index.json", sample_index(), 0).await;

    let client = RulehubClient::default();
    let token = CancellationToken::new();
    token.cancel();

    let err = client
        .get_index(&format!("{}/index.json", server.uri()), Some(&token))
        .await
        .expect_err("aborted");
    assert_eq!(err.code(), ErrorCode::IndexAborted);
}

#[tokio::test]
async fn cancellation_outranks_transport_failure() {
    // The host is unreachable, but a cancelled token must still classify
    // the outcome as aborted rather than an HTTP error.
    let client = RulehubClient::default();
    let token = CancellationToken::new();
    token.cancel();

    let err = client
        .get_index("http://127.0.0.1:9/index.json", Some(&token))
        .await
        .expect_err("aborted");
    assert_eq!(err.code(), ErrorCode::IndexAborted);
}

#[tokio::test]
async fn cancel_during_slow_response_aborts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/index.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(sample_index())
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&server)
        .await;

    let client = RulehubClient::default();
    let token = CancellationToken::new();
    let url = format!("{}/index.json", server.uri());

    let cancel = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
    });

    let err = client
        .get_index(&url, Some(&token))
        .await
        .expect_err("aborted");
    assert_eq!(err.code(), ErrorCode::IndexAborted);
}

#[tokio::test]
async fn cancelled_fetch_does_not_populate_cache() {
    let server = MockServer::start().await;
    mount_index(&server, "/index.json", sample_index(), 1).await;

    let client = RulehubClient::default();
    let url = format!("{}/index.json", server.uri());

    let token = CancellationToken::new();
    token.cancel();
    let _ = client.get_index(&url, Some(&token)).await;

    // The aborted call must not have cached anything; this fetch hits the
    // network (expect(1) above would fail on a second request otherwise).
    client.get_index(&url, None).await.expect("fresh fetch");
}
