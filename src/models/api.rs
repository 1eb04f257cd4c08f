use serde::{ Deserialize, Serialize };
use serde_json::Value as JsonValue;

/// Uniform envelope returned by the health, test, trigger, history and
/// new-conversation endpoints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T = JsonValue> {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    // The backend serializes a LocalDateTime, whose JSON shape depends on its
    // Jackson settings, so it is kept as raw JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<JsonValue>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WebhookRequest {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
}

/// Body of an HTTP error response. Only the message is of interest.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
