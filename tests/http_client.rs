use std::sync::Arc;
use std::time::Duration;

use n8n_dashboard::api::http::HttpDashboardClient;
use n8n_dashboard::api::{ new_client, DashboardApi, Operation };
use n8n_dashboard::config::ClientConfig;
use n8n_dashboard::models::api::WebhookRequest;
use n8n_dashboard::models::chat::ChatRequest;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{ body_json, header, header_exists, method, path };
use wiremock::{ Mock, MockServer, ResponseTemplate };

fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::new(&format!("{}/api/n8n", server.uri())).expect("mock server uri is valid")
}

fn client_for(server: &MockServer) -> HttpDashboardClient {
    HttpDashboardClient::new(config_for(server)).expect("client builds")
}

#[tokio::test]
async fn health_decodes_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/n8n/health"))
        .and(header("content-type", "application/json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(
                json!({
                "success": true,
                "message": "N8N integration service is running with chat functionality",
                "data": {"service": "N8N Integration Platform", "status": "running"},
                "timestamp": "2024-05-01T10:00:00.123"
            })
            )
        )
        .expect(1)
        .mount(&server).await;

    let resp = client_for(&server).check_health().await.expect("health succeeds");

    assert!(resp.success);
    assert_eq!(resp.message, "N8N integration service is running with chat functionality");
    assert_eq!(resp.data, Some(json!({"service": "N8N Integration Platform", "status": "running"})));
    assert_eq!(resp.request_id, None);
}

#[tokio::test]
async fn trigger_sends_body_and_api_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/n8n/trigger"))
        .and(header("X-API-Key", "secret"))
        .and(body_json(json!({"name": "A", "email": "a@b.com", "data": {"k": 1}})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(
                json!({
                "success": true,
                "message": "Webhook triggered successfully",
                "requestId": "req-42"
            })
            )
        )
        .expect(1)
        .mount(&server).await;

    let request = WebhookRequest {
        name: "A".to_string(),
        email: "a@b.com".to_string(),
        message: None,
        data: Some(json!({"k": 1})),
    };
    let resp = client_for(&server)
        .trigger_webhook(&request, Some("secret")).await
        .expect("trigger succeeds");

    assert_eq!(resp.request_id.as_deref(), Some("req-42"));
}

#[tokio::test]
async fn trigger_without_key_sends_no_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/n8n/trigger"))
        .and(header_exists("X-API-Key"))
        .respond_with(ResponseTemplate::new(401))
        .expect(0)
        .mount(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/n8n/trigger"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "message": "ok"})))
        .expect(1)
        .mount(&server).await;

    let request = WebhookRequest {
        name: "A".to_string(),
        email: "a@b.com".to_string(),
        message: None,
        data: None,
    };
    client_for(&server).trigger_webhook(&request, None).await.expect("trigger succeeds");
}

#[tokio::test]
async fn server_message_is_surfaced_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/n8n/trigger"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "bad input"})))
        .mount(&server).await;

    let request = WebhookRequest {
        name: "A".to_string(),
        email: "a@b.com".to_string(),
        message: None,
        data: None,
    };
    let err = client_for(&server).trigger_webhook(&request, None).await.unwrap_err();

    assert_eq!(err.operation, Operation::TriggerWebhook);
    assert_eq!(err.message, "bad input");
    assert_eq!(err.status, Some(500));
}

#[tokio::test]
async fn error_without_json_body_uses_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/n8n/chat"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server).await;

    let request = ChatRequest {
        message: "hi".to_string(),
        conversation_id: None,
        user_id: None,
    };
    let err = client_for(&server).send_chat_message(&request).await.unwrap_err();

    assert_eq!(err.message, "Failed to send chat message");
    assert_eq!(err.status, Some(502));
}

#[tokio::test]
async fn timeout_looks_like_any_other_network_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/n8n/test"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "message": "late"}))
                .set_delay(Duration::from_secs(2))
        )
        .mount(&server).await;

    let client = HttpDashboardClient::new(
        config_for(&server).with_timeout(Duration::from_millis(100))
    ).unwrap();
    let err = client.test_connection().await.unwrap_err();

    assert_eq!(err.message, "Failed to test n8n connection");
    assert_eq!(err.status, None);
}

#[tokio::test]
async fn refused_connection_uses_fallback() {
    // Nothing listens on port 1.
    let config = ClientConfig::new("http://127.0.0.1:1/api/n8n").unwrap();
    let api = new_client(&config).unwrap();

    let err = api.check_health().await.unwrap_err();

    assert_eq!(err.operation, Operation::Health);
    assert_eq!(err.message, "Failed to connect to Spring Boot service");
}

#[tokio::test]
async fn undecodable_success_body_uses_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/n8n/chat/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server).await;

    let err = client_for(&server).start_new_conversation().await.unwrap_err();

    assert_eq!(err.message, "Failed to start new conversation");
}

#[tokio::test]
async fn new_conversation_and_history_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/n8n/chat/new"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(
                json!({
                "success": true,
                "message": "New conversation started successfully",
                "data": {"conversationId": "conv 1", "userId": "anonymous", "status": "active"},
                "requestId": "req-1"
            })
            )
        )
        .mount(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/n8n/chat/history/conv%201"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(
                json!({
                "success": true,
                "message": "History retrieved",
                "data": {"messages": []}
            })
            )
        )
        .expect(1)
        .mount(&server).await;

    let client = client_for(&server);
    let started = client.start_new_conversation().await.unwrap();
    let conversation = started.data.expect("conversation payload");
    assert_eq!(conversation.conversation_id, "conv 1");
    assert_eq!(conversation.status.as_deref(), Some("active"));

    let history = client.get_chat_history(&conversation.conversation_id).await.unwrap();
    assert_eq!(history.data, Some(json!({"messages": []})));
}

#[tokio::test]
async fn chat_request_uses_camel_case() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/n8n/chat"))
        .and(
            body_json(json!({"message": "hello", "conversationId": "conv-1", "userId": "user-7"}))
        )
        .respond_with(
            ResponseTemplate::new(200).set_body_json(
                json!({
                "success": true,
                "message": "ok",
                "response": "Hi!",
                "conversationId": "conv-2",
                "timestamp": "2024-05-01T10:00:00"
            })
            )
        )
        .expect(1)
        .mount(&server).await;

    let api: Arc<dyn DashboardApi> = Arc::new(client_for(&server));
    let resp = api
        .send_chat_message(
            &(ChatRequest {
                message: "hello".to_string(),
                conversation_id: Some("conv-1".to_string()),
                user_id: Some("user-7".to_string()),
            })
        ).await
        .unwrap();

    assert_eq!(resp.response.as_deref(), Some("Hi!"));
    assert_eq!(resp.conversation_id.as_deref(), Some("conv-2"));
}
