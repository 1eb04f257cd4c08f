pub mod http;

use async_trait::async_trait;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::config::ClientConfig;
use crate::models::api::{ ApiResponse, WebhookRequest };
use crate::models::chat::{ ChatRequest, ChatResponse, NewConversation };
use self::http::HttpDashboardClient;

/// The backend calls the dashboard knows how to make.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Health,
    ConnectionTest,
    TriggerWebhook,
    SendChat,
    ChatHistory,
    NewConversation,
}

impl Operation {
    /// Message shown when the backend gave us nothing better.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Operation::Health => "Failed to connect to Spring Boot service",
            Operation::ConnectionTest => "Failed to test n8n connection",
            Operation::TriggerWebhook => "Failed to trigger webhook",
            Operation::SendChat => "Failed to send chat message",
            Operation::ChatHistory => "Failed to retrieve chat history",
            Operation::NewConversation => "Failed to start new conversation",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Health => "health check",
            Operation::ConnectionTest => "n8n connection test",
            Operation::TriggerWebhook => "webhook trigger",
            Operation::SendChat => "chat message",
            Operation::ChatHistory => "chat history",
            Operation::NewConversation => "new conversation",
        };
        write!(f, "{}", name)
    }
}

/// A failed backend call. Transport failures (timeouts, refused connections,
/// DNS) and undecodable bodies all carry the operation's fallback message;
/// HTTP errors carry the server's `message` when the body has one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    pub operation: Operation,
    pub message: String,
    pub status: Option<u16>,
}

impl ApiError {
    pub fn fallback(operation: Operation) -> Self {
        Self {
            operation,
            message: operation.fallback_message().to_string(),
            status: None,
        }
    }

    pub fn from_server(operation: Operation, status: u16, message: Option<String>) -> Self {
        Self {
            operation,
            message: message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| operation.fallback_message().to_string()),
            status: Some(status),
        }
    }

    /// The call went through but the backend answered `success: false`.
    pub fn rejected(operation: Operation, message: &str) -> Self {
        let message = if message.trim().is_empty() {
            operation.fallback_message().to_string()
        } else {
            message.to_string()
        };
        Self { operation, message, status: None }
    }
}

#[async_trait]
pub trait DashboardApi: Send + Sync {
    async fn check_health(&self) -> Result<ApiResponse, ApiError>;

    async fn test_connection(&self) -> Result<ApiResponse, ApiError>;

    async fn trigger_webhook(
        &self,
        request: &WebhookRequest,
        api_key: Option<&str>
    ) -> Result<ApiResponse, ApiError>;

    async fn send_chat_message(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError>;

    async fn get_chat_history(&self, conversation_id: &str) -> Result<ApiResponse, ApiError>;

    async fn start_new_conversation(&self) -> Result<ApiResponse<NewConversation>, ApiError>;
}

pub fn new_client(
    config: &ClientConfig
) -> Result<Arc<dyn DashboardApi>, Box<dyn StdError + Send + Sync>> {
    let client = HttpDashboardClient::new(config.clone())?;
    Ok(Arc::new(client))
}
