//! View-independent controllers for the three dashboard panels.

pub mod chat;
pub mod status;
pub mod webhook;

pub use chat::{ ChatSession, SendOutcome, SessionState };
pub use status::{ StatusBoard, StatusPoller };
pub use webhook::{ FormError, SubmitOutcome, WebhookForm, WebhookFormData };
