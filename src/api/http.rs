use async_trait::async_trait;
use log::{ debug, error };
use reqwest::header::{ HeaderMap, HeaderValue, CONTENT_TYPE };
use reqwest::{ Client as HttpClient, RequestBuilder };
use serde::de::DeserializeOwned;

use super::{ ApiError, DashboardApi, Operation };
use crate::config::ClientConfig;
use crate::models::api::{ ApiResponse, ErrorBody, WebhookRequest };
use crate::models::chat::{ ChatRequest, ChatResponse, NewConversation };

pub const API_KEY_HEADER: &str = "X-API-Key";

/// reqwest-backed client bound to one base path and one timeout.
#[derive(Debug, Clone)]
pub struct HttpDashboardClient {
    http: HttpClient,
    config: ClientConfig,
}

impl HttpDashboardClient {
    pub fn new(config: ClientConfig) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = HttpClient::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { http, config })
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        operation: Operation,
        request: RequestBuilder
    ) -> Result<T, ApiError> {
        let resp = request.send().await.map_err(|e| {
            error!("{} failed: {}", operation, e);
            ApiError::fallback(operation)
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json
                ::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message);
            error!("{} failed with HTTP {}: {}", operation, status, body);
            return Err(ApiError::from_server(operation, status.as_u16(), message));
        }

        resp.json::<T>().await.map_err(|e| {
            error!("{} returned an unreadable body: {}", operation, e);
            ApiError::fallback(operation)
        })
    }
}

#[async_trait]
impl DashboardApi for HttpDashboardClient {
    async fn check_health(&self) -> Result<ApiResponse, ApiError> {
        let url = self.config.endpoint(&["health"]);
        self.execute(Operation::Health, self.http.get(url)).await
    }

    async fn test_connection(&self) -> Result<ApiResponse, ApiError> {
        let url = self.config.endpoint(&["test"]);
        self.execute(Operation::ConnectionTest, self.http.get(url)).await
    }

    async fn trigger_webhook(
        &self,
        request: &WebhookRequest,
        api_key: Option<&str>
    ) -> Result<ApiResponse, ApiError> {
        let url = self.config.endpoint(&["trigger"]);
        let mut req = self.http.post(url).json(request);
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            req = req.header(API_KEY_HEADER, key);
        }
        debug!("Triggering webhook for {}", request.email);
        self.execute(Operation::TriggerWebhook, req).await
    }

    async fn send_chat_message(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        let url = self.config.endpoint(&["chat"]);
        debug!("Sending chat message (conversation {:?})", request.conversation_id);
        self.execute(Operation::SendChat, self.http.post(url).json(request)).await
    }

    async fn get_chat_history(&self, conversation_id: &str) -> Result<ApiResponse, ApiError> {
        let url = self.config.endpoint(&["chat", "history", conversation_id]);
        self.execute(Operation::ChatHistory, self.http.get(url)).await
    }

    async fn start_new_conversation(&self) -> Result<ApiResponse<NewConversation>, ApiError> {
        let url = self.config.endpoint(&["chat", "new"]);
        self.execute(Operation::NewConversation, self.http.post(url)).await
    }
}
