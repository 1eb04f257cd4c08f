use chrono::Local;
use log::{ debug, error };
use std::error::Error;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{ AsyncBufReadExt, BufReader };

use crate::api::DashboardApi;
use crate::cli::TriggerArgs;
use crate::config::ClientConfig;
use crate::dashboard::chat::LOADING_TEXT;
use crate::dashboard::{
    ChatSession,
    SendOutcome,
    SessionState,
    StatusPoller,
    SubmitOutcome,
    WebhookForm,
};
use crate::models::chat::ChatMessage;

const CHAT_HELP: &str =
    "Type a message and press Enter to send. Commands: /new, /history, /retry, /help, /quit";
const NO_CONVERSATION_HINT: &str = "No active conversation, use /retry to start one.";

pub async fn run_status(api: Arc<dyn DashboardApi>) -> Result<(), Box<dyn Error + Send + Sync>> {
    let poller = StatusPoller::new(api);
    let board = poller.refresh().await;
    print!("{}", board);
    Ok(())
}

/// Submits the form once and prints the result view. A failed submit is a
/// normal outcome here, not an `Err`; the caller turns it into the exit status.
pub async fn run_trigger(
    api: Arc<dyn DashboardApi>,
    config: &ClientConfig,
    args: TriggerArgs
) -> Result<SubmitOutcome, Box<dyn Error + Send + Sync>> {
    let form = WebhookForm::new(api, config.api_key.clone());
    form.edit(|data| {
        data.name = args.name;
        data.email = args.email;
        data.message = args.message;
        data.additional_data = args.data;
    });

    let outcome = match form.submit().await {
        Ok(outcome) => outcome,
        Err(e) => SubmitOutcome::Error(e.to_string()),
    };
    println!("{}", outcome);
    Ok(outcome)
}

pub async fn run_history(
    api: Arc<dyn DashboardApi>,
    conversation_id: &str
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let resp = api.get_chat_history(conversation_id).await?;
    println!("{}", serde_json::to_string_pretty(&resp)?);
    Ok(())
}

pub async fn run_chat(
    api: Arc<dyn DashboardApi>,
    config: &ClientConfig
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut session = ChatSession::new(api, config.user_id.clone());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut shown = 0;

    println!("AI Assistant - {}", CHAT_HELP);
    if session.activate().await.is_err() {
        report_error(&session);
    }
    shown = print_new(&session, shown);

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "/quit" | "/exit" => break,
            "/help" => println!("{}", CHAT_HELP),
            "/new" => {
                shown = 0;
                if session.reset().await.is_err() {
                    report_error(&session);
                }
            }
            "/retry" => {
                if session.activate().await.is_err() {
                    report_error(&session);
                }
            }
            "/history" =>
                match session.history().await {
                    Ok(resp) => println!("{}", serde_json::to_string_pretty(&resp)?),
                    Err(e) => println!("! {}", e),
                }
            text => {
                let Some(pending) = session.begin_send(text) else {
                    match refused_send_hint(&session, text) {
                        Some(hint) => println!("! {}", hint),
                        None => debug!("Nothing to send"),
                    }
                    continue;
                };
                // The user's own line is already on screen.
                shown = session.messages().len() - 1;
                println!("  {}", LOADING_TEXT);

                let result = session.dispatch(&pending).await;
                if let SendOutcome::Failed(_) = session.complete_send(pending, result) {
                    shown = print_new(&session, shown);
                    report_error(&session);
                    continue;
                }
            }
        }

        shown = print_new(&session, shown);
    }

    Ok(())
}

/// What to tell the user when `begin_send` turned their input down.
fn refused_send_hint(session: &ChatSession, text: &str) -> Option<&'static str> {
    if text.trim().is_empty() {
        return None;
    }
    match session.state() {
        SessionState::Uninitialized => Some(NO_CONVERSATION_HINT),
        _ => None,
    }
}

fn print_new(session: &ChatSession, shown: usize) -> usize {
    let messages = session.messages();
    for message in messages.iter().skip(shown).filter(|m| !m.is_loading) {
        println!("{}", format_message(message));
    }
    messages.len()
}

fn report_error(session: &ChatSession) {
    if let Some(err) = session.last_error() {
        error!("Chat error: {}", err);
        println!("! {}", err);
    }
}

pub fn format_message(message: &ChatMessage) -> String {
    format!(
        "[{}] {}: {}",
        message.timestamp.with_timezone(&Local).format("%H:%M"),
        message.role,
        message.content
    )
}
