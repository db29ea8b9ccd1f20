mod common;

use axum::http::StatusCode;
use serde_json::json;
use tableau_slack_relay::Config;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{
    TABLEAU_SITE, TABLEAU_TOKEN, app, app_from_env, env, get, post_json, send, sign_in_body,
    site_path, tableau_path,
};

const DESTINATION: &str = "https://relay.example.com/webhook";

async fn mount_sign_in(tableau: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path(tableau_path("auth/signin")))
        .and(body_partial_json(json!({
            "credentials": {
                "personalAccessTokenName": "relay-pat",
                "personalAccessTokenSecret": "pat-secret",
                "site": { "contentUrl": TABLEAU_SITE }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(sign_in_body()))
        .expect(expected_calls)
        .mount(tableau)
        .await;
}

fn webhook_json(id: &str, name: &str, event: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "event": event,
        "isEnabled": true,
        "createdAt": "2026-10-01T08:00:00Z",
        "updatedAt": "2026-10-01T08:00:00Z",
        "webhook-destination": {
            "webhook-destination-http": { "method": "POST", "url": DESTINATION }
        }
    })
}

#[tokio::test]
async fn test_create_signs_in_then_creates() {
    let slack = MockServer::start().await;
    let tableau = MockServer::start().await;
    mount_sign_in(&tableau, 1).await;
    Mock::given(method("POST"))
        .and(path(site_path("webhooks")))
        .and(header("X-Tableau-Auth", TABLEAU_TOKEN))
        .and(body_partial_json(json!({
            "webhook": {
                "name": "refresh-failures",
                "event": "DatasourceRefreshFailed",
                "webhook-destination": {
                    "webhook-destination-http": { "method": "POST", "url": DESTINATION }
                }
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "webhook": webhook_json("wh-1", "refresh-failures", "DatasourceRefreshFailed")
        })))
        .expect(1)
        .mount(&tableau)
        .await;

    let response = send(
        app(&slack.uri(), &tableau.uri()),
        post_json(
            "/create_tableau_webhook",
            &json!({
                "name": "refresh-failures",
                "event": "DatasourceRefreshFailed",
                "destination_url": DESTINATION
            }),
        ),
    )
    .await;

    assert_eq!(response.status, StatusCode::CREATED);
    let body = response.json();
    assert_eq!(body["status"], "success");
    assert_eq!(body["webhook"]["id"], "wh-1");
    assert_eq!(body["webhook"]["event"], "DatasourceRefreshFailed");
    assert_eq!(body["webhook"]["url"], DESTINATION);

    let requests = tableau.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].url.path().ends_with("/auth/signin"));
    assert!(requests[1].url.path().ends_with("/webhooks"));
    assert!(slack.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_conflict_relays_tableau_error() {
    let slack = MockServer::start().await;
    let tableau = MockServer::start().await;
    mount_sign_in(&tableau, 1).await;
    let tableau_error = r#"{"error":{"code":"409004","summary":"Resource Conflict","detail":"A webhook named 'refresh-failures' already exists."}}"#;
    Mock::given(method("POST"))
        .and(path(site_path("webhooks")))
        .respond_with(ResponseTemplate::new(409).set_body_raw(tableau_error, "application/json"))
        .expect(1)
        .mount(&tableau)
        .await;

    let response = send(
        app(&slack.uri(), &tableau.uri()),
        post_json(
            "/create_tableau_webhook",
            &json!({
                "name": "refresh-failures",
                "event": "DatasourceRefreshFailed",
                "destination_url": DESTINATION
            }),
        ),
    )
    .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body, tableau_error);
    assert_eq!(response.content_type.as_deref(), Some("application/json"));
}

#[tokio::test]
async fn test_create_without_destination_makes_no_calls() {
    let slack = MockServer::start().await;
    let tableau = MockServer::start().await;

    let response = send(
        app(&slack.uri(), &tableau.uri()),
        post_json(
            "/create_tableau_webhook",
            &json!({ "name": "refresh-failures", "event": "DatasourceRefreshFailed" }),
        ),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let body = response.json();
    assert_eq!(body["error"]["code"], "VAL_3002");
    assert_eq!(body["error"]["field"], "destination_url");
    assert!(tableau.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_with_unsupported_event() {
    let slack = MockServer::start().await;
    let tableau = MockServer::start().await;

    let response = send(
        app(&slack.uri(), &tableau.uri()),
        post_json(
            "/create_tableau_webhook",
            &json!({
                "name": "tests",
                "event": "SomethingHappened",
                "destination_url": DESTINATION
            }),
        ),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let body = response.json();
    assert_eq!(body["error"]["code"], "VAL_3004");
    assert!(body["error"]["message"].as_str().unwrap().contains("SomethingHappened"));
    assert!(tableau.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_returns_server_webhooks_in_order() {
    let slack = MockServer::start().await;
    let tableau = MockServer::start().await;
    mount_sign_in(&tableau, 1).await;
    Mock::given(method("GET"))
        .and(path(site_path("webhooks")))
        .and(header("X-Tableau-Auth", TABLEAU_TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "webhooks": {
                "webhook": [
                    webhook_json("wh-2", "workbook-created", "WorkbookCreated"),
                    webhook_json("wh-1", "refresh-failures", "DatasourceRefreshFailed"),
                    webhook_json("wh-3", "site-deleted", "SiteDeleted")
                ]
            }
        })))
        .expect(1)
        .mount(&tableau)
        .await;

    let response = send(app(&slack.uri(), &tableau.uri()), get("/list_tableau_webhooks")).await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["status"], "success");
    let ids: Vec<&str> = body["webhooks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["wh-2", "wh-1", "wh-3"]);
    assert_eq!(body["webhooks"][2]["event"], "SiteDeleted");
    assert_eq!(body["webhooks"][2]["url"], DESTINATION);
}

#[tokio::test]
async fn test_list_forbidden_relays_tableau_error() {
    let slack = MockServer::start().await;
    let tableau = MockServer::start().await;
    mount_sign_in(&tableau, 1).await;
    let tableau_error = "<tsResponse><error code=\"403004\"><summary>Forbidden</summary></error></tsResponse>";
    Mock::given(method("GET"))
        .and(path(site_path("webhooks")))
        .respond_with(ResponseTemplate::new(403).set_body_raw(tableau_error, "application/xml"))
        .expect(1)
        .mount(&tableau)
        .await;

    let response = send(app(&slack.uri(), &tableau.uri()), get("/list_tableau_webhooks")).await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body, tableau_error);
    assert_eq!(response.content_type.as_deref(), Some("application/xml"));
}

#[tokio::test]
async fn test_list_with_no_subscriptions() {
    let slack = MockServer::start().await;
    let tableau = MockServer::start().await;
    mount_sign_in(&tableau, 1).await;
    Mock::given(method("GET"))
        .and(path(site_path("webhooks")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "webhooks": {} })))
        .mount(&tableau)
        .await;

    let response = send(app(&slack.uri(), &tableau.uri()), get("/list_tableau_webhooks")).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["webhooks"], json!([]));
}

#[tokio::test]
async fn test_list_without_webhooks_element_is_bad_gateway() {
    let slack = MockServer::start().await;
    let tableau = MockServer::start().await;
    mount_sign_in(&tableau, 1).await;
    Mock::given(method("GET"))
        .and(path(site_path("webhooks")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pagination": { "pageNumber": "1", "totalAvailable": "0" }
        })))
        .mount(&tableau)
        .await;

    let response = send(app(&slack.uri(), &tableau.uri()), get("/list_tableau_webhooks")).await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(response.json()["error"]["code"], "EXT_8005");
}

#[tokio::test]
async fn test_delete_success() {
    let slack = MockServer::start().await;
    let tableau = MockServer::start().await;
    mount_sign_in(&tableau, 1).await;
    Mock::given(method("DELETE"))
        .and(path(site_path("webhooks/wh-1")))
        .and(header("X-Tableau-Auth", TABLEAU_TOKEN))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&tableau)
        .await;

    let response = send(
        app(&slack.uri(), &tableau.uri()),
        post_json("/delete_tableau_webhook", &json!({ "webhook_id": "wh-1" })),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!({ "status": "success", "webhook_id": "wh-1" })
    );
}

#[tokio::test]
async fn test_delete_unknown_webhook_relays_tableau_error() {
    let slack = MockServer::start().await;
    let tableau = MockServer::start().await;
    mount_sign_in(&tableau, 1).await;
    let tableau_error = r#"{"error":{"code":"404031","summary":"Resource Not Found","detail":"Webhook 'missing' could not be found."}}"#;
    Mock::given(method("DELETE"))
        .and(path(site_path("webhooks/missing")))
        .respond_with(ResponseTemplate::new(404).set_body_raw(tableau_error, "application/json"))
        .expect(1)
        .mount(&tableau)
        .await;

    let response = send(
        app(&slack.uri(), &tableau.uri()),
        post_json("/delete_tableau_webhook", &json!({ "webhook_id": "missing" })),
    )
    .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body, tableau_error);
    assert_eq!(response.content_type.as_deref(), Some("application/json"));
}

#[tokio::test]
async fn test_delete_without_id_makes_no_calls() {
    let slack = MockServer::start().await;
    let tableau = MockServer::start().await;

    let response = send(
        app(&slack.uri(), &tableau.uri()),
        post_json("/delete_tableau_webhook", &json!({})),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"]["field"], "webhook_id");
    assert!(tableau.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_rejected_sign_in_stops_the_operation() {
    let slack = MockServer::start().await;
    let tableau = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(tableau_path("auth/signin")))
        .respond_with(ResponseTemplate::new(401).set_body_raw(
            r#"{"error":{"code":"401001","summary":"Signin Error","detail":"Invalid credentials"}}"#,
            "application/json",
        ))
        .expect(1)
        .mount(&tableau)
        .await;
    Mock::given(method("GET"))
        .and(path(site_path("webhooks")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&tableau)
        .await;

    let response = send(app(&slack.uri(), &tableau.uri()), get("/list_tableau_webhooks")).await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    let body = response.json();
    assert_eq!(body["error"]["code"], "EXT_8004");
    assert!(body["error"]["message"].as_str().unwrap().contains("401001"));
}

#[tokio::test]
async fn test_unreachable_tableau_is_service_unavailable() {
    let slack = MockServer::start().await;

    let response = send(app(&slack.uri(), "http://127.0.0.1:9"), get("/list_tableau_webhooks")).await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.json()["error"]["code"], "EXT_8001");
}

#[tokio::test]
async fn test_slow_tableau_is_gateway_timeout_with_error_body() {
    let slack = MockServer::start().await;
    let tableau = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(tableau_path("auth/signin")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(sign_in_body())
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .expect(1)
        .mount(&tableau)
        .await;
    Mock::given(method("GET"))
        .and(path(site_path("webhooks")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&tableau)
        .await;

    let mut vars = env(&slack.uri(), &tableau.uri());
    vars.insert("OUTBOUND_TIMEOUT_SECS".to_string(), "1".to_string());
    let response = send(app_from_env(vars), get("/list_tableau_webhooks")).await;

    assert_eq!(response.status, StatusCode::GATEWAY_TIMEOUT);
    let body = response.json();
    assert_eq!(body["error"]["code"], "EXT_8002");
    assert_eq!(body["request_id"].as_str(), response.request_id.as_deref());
}

#[test]
fn test_outbound_timeout_that_could_outlast_the_request_is_refused() {
    let mut vars = env("http://127.0.0.1:9", "http://127.0.0.1:9");
    vars.insert("OUTBOUND_TIMEOUT_SECS".to_string(), "20".to_string());

    let err = Config::from_lookup(|key| vars.get(key).cloned())
        .expect_err("two sequential calls could exceed the request timeout");
    assert!(err.to_string().contains("OUTBOUND_TIMEOUT_SECS"));
}

#[tokio::test]
async fn test_password_sign_in() {
    let slack = MockServer::start().await;
    let tableau = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(tableau_path("auth/signin")))
        .and(body_partial_json(json!({
            "credentials": { "name": "relay-pat", "password": "pat-secret" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(sign_in_body()))
        .expect(1)
        .mount(&tableau)
        .await;
    Mock::given(method("GET"))
        .and(path(site_path("webhooks")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "webhooks": { "webhook": [] }
        })))
        .expect(1)
        .mount(&tableau)
        .await;

    let mut vars = env(&slack.uri(), &tableau.uri());
    vars.insert("TABLEAU_AUTH_METHOD".to_string(), "password".to_string());
    let response = send(app_from_env(vars), get("/list_tableau_webhooks")).await;

    assert_eq!(response.status, StatusCode::OK);
}
