use log::{ debug, info, warn };
use std::sync::Arc;
use uuid::Uuid;

use crate::api::{ ApiError, DashboardApi, Operation };
use crate::models::api::ApiResponse;
use crate::models::chat::{ ChatMessage, ChatRequest, ChatResponse, Role };

pub const WELCOME_ID: &str = "welcome";
pub const LOADING_ID: &str = "loading";

pub const WELCOME_TEXT: &str =
    "Hello! I'm your AI assistant. I'm powered by the same n8n and Spring Boot backend that handles your webhooks. How can I help you today?";
pub const LOADING_TEXT: &str = "AI is thinking...";
pub const ERROR_REPLY_TEXT: &str = "Sorry, I encountered an error. Please try again.";
pub const START_FAILED_TEXT: &str = "Failed to start conversation. Please try again.";
const NO_RESPONSE_TEXT: &str = "Failed to get response";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Ready,
    Sending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input, no conversation yet, or a send already in flight.
    Ignored,
    Replied,
    /// The error string is also kept as the session's last error.
    Failed(String),
    /// The session was reset while this message was in flight.
    Discarded,
}

/// A message that has been shown optimistically and still needs its reply.
#[derive(Debug)]
pub struct PendingSend {
    generation: u64,
    request: ChatRequest,
}

pub struct ChatSession {
    api: Arc<dyn DashboardApi>,
    messages: Vec<ChatMessage>,
    conversation_id: Option<String>,
    user_id: String,
    error: Option<String>,
    state: SessionState,
    generation: u64,
}

impl ChatSession {
    pub fn new(api: Arc<dyn DashboardApi>, user_id: Option<String>) -> Self {
        let user_id = user_id.unwrap_or_else(|| format!("user-{}", Uuid::new_v4()));
        Self {
            api,
            messages: Vec::new(),
            conversation_id: None,
            user_id,
            error: None,
            state: SessionState::Uninitialized,
            generation: 0,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn last_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Asks the backend for a conversation id. Does nothing once the session
    /// is active; after a failure the same call is the retry path.
    pub async fn activate(&mut self) -> Result<(), ApiError> {
        if self.state != SessionState::Uninitialized {
            return Ok(());
        }

        let result = match self.api.start_new_conversation().await {
            Ok(resp) if resp.success => {
                match resp.data {
                    Some(data) if !data.conversation_id.is_empty() => Ok(data.conversation_id),
                    _ => Err(ApiError::rejected(Operation::NewConversation, &resp.message)),
                }
            }
            Ok(resp) => Err(ApiError::rejected(Operation::NewConversation, &resp.message)),
            Err(e) => Err(e),
        };

        match result {
            Ok(conversation_id) => {
                info!("Conversation {} started", conversation_id);
                self.conversation_id = Some(conversation_id);
                self.messages = vec![ChatMessage::new(WELCOME_ID, Role::Assistant, WELCOME_TEXT)];
                self.error = None;
                self.state = SessionState::Ready;
                Ok(())
            }
            Err(e) => {
                warn!("Could not start conversation: {}", e);
                self.error = Some(START_FAILED_TEXT.to_string());
                Err(e)
            }
        }
    }

    /// Appends the user's message and the loading placeholder, and moves to
    /// `Sending`. Returns `None` for blank input or when not `Ready`.
    pub fn begin_send(&mut self, text: &str) -> Option<PendingSend> {
        let content = text.trim();
        if content.is_empty() {
            return None;
        }
        if self.state != SessionState::Ready {
            debug!("Ignoring message while session is {:?}", self.state);
            return None;
        }

        self.messages.push(ChatMessage::new(Uuid::new_v4().to_string(), Role::User, content));
        self.messages.push(ChatMessage {
            is_loading: true,
            ..ChatMessage::new(LOADING_ID, Role::Assistant, LOADING_TEXT)
        });
        self.error = None;
        self.state = SessionState::Sending;

        Some(PendingSend {
            generation: self.generation,
            request: ChatRequest {
                message: content.to_string(),
                conversation_id: self.conversation_id.clone(),
                user_id: Some(self.user_id.clone()),
            },
        })
    }

    pub async fn dispatch(&self, pending: &PendingSend) -> Result<ChatResponse, ApiError> {
        self.api.send_chat_message(&pending.request).await
    }

    /// Reconciles a reply with the optimistic state: the loading placeholder
    /// goes away and either the answer or the fixed error reply is appended.
    pub fn complete_send(
        &mut self,
        pending: PendingSend,
        result: Result<ChatResponse, ApiError>
    ) -> SendOutcome {
        if pending.generation != self.generation {
            debug!("Dropping reply for a conversation that was reset");
            return SendOutcome::Discarded;
        }

        self.messages.retain(|m| m.id != LOADING_ID);
        self.state = SessionState::Ready;

        let failure = match result {
            Ok(resp) if resp.success => {
                match resp.response.filter(|r| !r.is_empty()) {
                    Some(answer) => {
                        self.messages.push(
                            ChatMessage::new(Uuid::new_v4().to_string(), Role::Assistant, answer)
                        );
                        if let Some(id) = resp.conversation_id.filter(|id| !id.is_empty()) {
                            self.conversation_id = Some(id);
                        }
                        return SendOutcome::Replied;
                    }
                    None => non_empty_or(resp.message, NO_RESPONSE_TEXT),
                }
            }
            Ok(resp) => non_empty_or(resp.message, NO_RESPONSE_TEXT),
            Err(e) => e.message,
        };

        warn!("Chat message failed: {}", failure);
        self.messages.push(
            ChatMessage::new(format!("error-{}", Uuid::new_v4()), Role::Assistant, ERROR_REPLY_TEXT)
        );
        self.error = Some(failure.clone());
        SendOutcome::Failed(failure)
    }

    pub async fn send(&mut self, text: &str) -> SendOutcome {
        let Some(pending) = self.begin_send(text) else {
            return SendOutcome::Ignored;
        };
        let result = self.dispatch(&pending).await;
        self.complete_send(pending, result)
    }

    /// Forgets the conversation and immediately starts a new one. Replies
    /// still in flight for the old conversation are discarded.
    pub async fn reset(&mut self) -> Result<(), ApiError> {
        self.messages.clear();
        self.conversation_id = None;
        self.error = None;
        self.state = SessionState::Uninitialized;
        self.generation += 1;
        self.activate().await
    }

    pub async fn history(&self) -> Result<ApiResponse, ApiError> {
        match &self.conversation_id {
            Some(id) => self.api.get_chat_history(id).await,
            None => Err(ApiError::rejected(Operation::ChatHistory, "No active conversation")),
        }
    }
}

fn non_empty_or(message: String, fallback: &str) -> String {
    if message.trim().is_empty() { fallback.to_string() } else { message }
}
