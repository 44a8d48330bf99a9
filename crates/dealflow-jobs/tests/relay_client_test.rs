//! RelayClient against a mock relay.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dealflow_db::{Error, LeadRepository, MemoryLeadRepository, SummaryFeed};
use dealflow_jobs::{RelayClient, SummaryImporter};

fn pending_body() -> serde_json::Value {
    json!([{
        "id": 1754550000000i64,
        "timestamp": "2025-08-07T07:00:00Z",
        "meetingTitle": "Security review",
        "summary": "Walked through SOC2 gaps.",
        "actionItems": ["Share audit report"],
        "keyTopics": [],
        "participants": [{"name": "David Park", "email": "david.park@datatech.com"}],
        "duration": 1800,
        "meetingDate": "2025-08-06",
        "leadEmail": null,
        "leadName": null,
        "leadCompany": null,
        "processed": false
    }])
}

#[tokio::test]
async fn test_pending_parses_relay_summaries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/summaries/pending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pending_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = RelayClient::new(server.uri()).unwrap();
    let pending = client.pending().await.unwrap();

    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].meeting_title, "Security review");
    assert_eq!(pending[0].duration, Some(1800.0));
    assert_eq!(pending[0].participants[0].email.as_deref(), Some("david.park@datatech.com"));
}

#[tokio::test]
async fn test_acknowledge_posts_lead_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/summaries/77/processed"))
        .and(body_json(json!({"leadId": 1004})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = RelayClient::new(server.uri()).unwrap();
    client.acknowledge(77, 1004).await.unwrap();
}

#[tokio::test]
async fn test_acknowledge_unknown_summary() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/summaries/5/processed"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Summary not found"})))
        .mount(&server)
        .await;

    let client = RelayClient::new(server.uri()).unwrap();
    let err = client.acknowledge(5, 1004).await.unwrap_err();
    assert!(matches!(err, Error::SummaryNotFound(5)));
}

#[tokio::test]
async fn test_server_error_is_request_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/summaries/pending"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = RelayClient::new(server.uri()).unwrap();
    assert!(matches!(client.pending().await.unwrap_err(), Error::Request(_)));
}

#[tokio::test]
async fn test_import_pass_over_relay() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/summaries/pending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pending_body()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/summaries/1754550000000/processed"))
        .and(body_json(json!({"leadId": 1004})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let leads = Arc::new(MemoryLeadRepository::with_leads(dealflow_db::example_leads().unwrap()));
    let feed = Arc::new(RelayClient::new(server.uri()).unwrap());
    let report = SummaryImporter::new(feed, leads.clone()).run_once().await.unwrap();

    assert_eq!(report.attached.len(), 1);
    let notes = leads.get_by_id(1004).await.unwrap().unwrap().notes;
    assert!(notes.contains("Meeting: Security review\nDate: 8/6/2025\nDuration: 30 minutes\n"));
    assert!(notes.contains("ACTION ITEMS:\n"));
}
