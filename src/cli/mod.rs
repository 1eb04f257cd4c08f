use clap::{ Args as ClapArgs, Parser, Subcommand };
use crate::config::{ DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS };

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Backend Args ---
    /// Base path of the integration API (e.g., https://dashboard.example.com/api/n8n)
    #[arg(long, env = "DASHBOARD_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// Timeout in seconds applied to every backend call.
    #[arg(long, env = "DASHBOARD_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    pub timeout_secs: u64,

    /// API key sent as X-API-Key when triggering the webhook. Only the trigger
    /// call carries it; chat calls against a backend that requires the key are rejected.
    #[arg(long, env = "N8N_API_KEY", global = true)]
    pub api_key: Option<String>,

    /// User id attached to chat messages. A random one is generated per session if unset.
    #[arg(long, env = "DASHBOARD_USER_ID", global = true)]
    pub user_id: Option<String>,

    // --- General App Args ---
    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Check the API, the n8n workflow engine and the chatbot once.
    Status,
    /// Send the webhook form to the n8n workflow.
    Trigger(TriggerArgs),
    /// Chat with the AI assistant interactively.
    Chat,
    /// Print the stored history of a conversation.
    History {
        conversation_id: String,
    },
}

#[derive(ClapArgs, Debug, Clone)]
pub struct TriggerArgs {
    /// Full name
    #[arg(long)]
    pub name: String,

    /// Email address
    #[arg(long)]
    pub email: String,

    /// Optional free-text message
    #[arg(long, default_value = "")]
    pub message: String,

    /// Optional additional data, as JSON text (e.g., '{"key": "value"}')
    #[arg(long, default_value = "")]
    pub data: String,
}
