pub mod api;
pub mod cli;
pub mod config;
pub mod console;
pub mod dashboard;
pub mod models;

use api::new_client;
use cli::{ Args, Command };
use config::ClientConfig;
use log::info;
use dashboard::SubmitOutcome;
use std::error::Error;
use std::process::ExitCode;

pub async fn run(args: Args) -> Result<ExitCode, Box<dyn Error + Send + Sync>> {
    let config = ClientConfig::from_args(&args)?;

    info!("--- Dashboard Configuration ---");
    info!("Backend Base URL: {}", config.base_url);
    info!("Request Timeout: {}s", config.timeout.as_secs());
    info!("API Key Configured: {}", config.api_key.is_some());
    info!("-------------------------------");

    let api = new_client(&config)?;

    match args.command {
        Command::Status => console::run_status(api).await?,
        Command::Trigger(trigger) => {
            // The error view is already on screen.
            if let SubmitOutcome::Error(_) = console::run_trigger(api, &config, trigger).await? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Chat => console::run_chat(api, &config).await?,
        Command::History { conversation_id } => console::run_history(api, &conversation_id).await?,
    }
    Ok(ExitCode::SUCCESS)
}
