use chrono::{ DateTime, Local };
use log::debug;
use std::fmt;
use std::sync::{ Arc, Mutex, PoisonError, Weak };
use tokio::task::JoinHandle;

use crate::api::DashboardApi;
use crate::models::status::{ ServiceState, ServiceStatus };

pub const SPRING_BOOT_API: &str = "Spring Boot API";
pub const N8N_WORKFLOW: &str = "N8N Workflow";
pub const AI_CHATBOT: &str = "AI Chatbot";

const CONNECTION_FAILED: &str = "Connection failed";
const CHATBOT_READY: &str = "Chatbot ready";
const CHATBOT_UNAVAILABLE: &str = "Chatbot unavailable";

#[derive(Debug, Clone, PartialEq)]
pub struct StatusBoard {
    pub services: Vec<ServiceStatus>,
    pub last_checked: Option<DateTime<Local>>,
    pub refreshes_in_flight: usize,
}

impl StatusBoard {
    fn initial() -> Self {
        Self {
            services: vec![
                ServiceStatus::checking(SPRING_BOOT_API, "Checking connection..."),
                ServiceStatus::checking(N8N_WORKFLOW, "Checking connection..."),
                ServiceStatus::checking(AI_CHATBOT, "Checking chatbot service...")
            ],
            last_checked: None,
            refreshes_in_flight: 0,
        }
    }

    pub fn service(&self, name: &str) -> Option<&ServiceStatus> {
        self.services.iter().find(|s| s.name == name)
    }

    pub fn all_online(&self) -> bool {
        self.services.iter().all(|s| s.status == ServiceState::Online)
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshes_in_flight > 0
    }

    fn set(&mut self, name: &str, status: ServiceState, message: String) {
        if let Some(service) = self.services.iter_mut().find(|s| s.name == name) {
            service.status = status;
            service.message = message;
        }
    }
}

impl fmt::Display for StatusBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Service Status")?;
        for service in &self.services {
            writeln!(f, "  {}", service)?;
        }
        if let Some(checked) = self.last_checked {
            writeln!(f, "Last checked: {}", checked.format("%H:%M:%S"))?;
        }
        if self.all_online() {
            writeln!(
                f,
                "All services are running! You can send data to n8n workflows and chat with the AI assistant."
            )?;
        }
        Ok(())
    }
}

/// Checks the API, the workflow engine and the chatbot independently. Each
/// check only ever writes its own row, so one slow or failing dependency
/// leaves the others alone.
pub struct StatusPoller {
    api: Arc<dyn DashboardApi>,
    board: Arc<Mutex<StatusBoard>>,
}

impl StatusPoller {
    pub fn new(api: Arc<dyn DashboardApi>) -> Self {
        Self {
            api,
            board: Arc::new(Mutex::new(StatusBoard::initial())),
        }
    }

    pub fn snapshot(&self) -> StatusBoard {
        self.board.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Runs all three checks and returns once every one has resolved.
    pub async fn refresh(&self) -> StatusBoard {
        run_checks(&self.api, &Arc::downgrade(&self.board)).await;
        self.snapshot()
    }

    /// Starts a refresh in the background. Overlapping refreshes are allowed;
    /// the last write for a row wins. Results that arrive after the poller
    /// has been dropped are discarded.
    pub fn spawn_refresh(&self) -> JoinHandle<()> {
        let api = Arc::clone(&self.api);
        let board = Arc::downgrade(&self.board);
        tokio::spawn(async move {
            run_checks(&api, &board).await;
        })
    }
}

async fn run_checks(api: &Arc<dyn DashboardApi>, board: &Weak<Mutex<StatusBoard>>) {
    update(board, |b| {
        b.refreshes_in_flight += 1;
    });

    let api_check = async {
        let (status, message) = match api.check_health().await {
            Ok(resp) => (online_if(resp.success), resp.message),
            Err(_) => (ServiceState::Offline, CONNECTION_FAILED.to_string()),
        };
        update(board, |b| b.set(SPRING_BOOT_API, status, message));
    };

    let workflow_check = async {
        let (status, message) = match api.test_connection().await {
            Ok(resp) => (online_if(resp.success), resp.message),
            Err(_) => (ServiceState::Offline, CONNECTION_FAILED.to_string()),
        };
        update(board, |b| b.set(N8N_WORKFLOW, status, message));
    };

    // The chatbot lives in the same backend, so its health is the API's health.
    let chatbot_check = async {
        let ready = matches!(api.check_health().await, Ok(resp) if resp.success);
        let message = if ready { CHATBOT_READY } else { CHATBOT_UNAVAILABLE };
        update(board, |b| b.set(AI_CHATBOT, online_if(ready), message.to_string()));
    };

    futures::join!(api_check, workflow_check, chatbot_check);

    update(board, |b| {
        b.last_checked = Some(Local::now());
        b.refreshes_in_flight = b.refreshes_in_flight.saturating_sub(1);
    });
}

fn online_if(ok: bool) -> ServiceState {
    if ok { ServiceState::Online } else { ServiceState::Offline }
}

fn update(board: &Weak<Mutex<StatusBoard>>, apply: impl FnOnce(&mut StatusBoard)) {
    match board.upgrade() {
        Some(board) => {
            let mut guard = board.lock().unwrap_or_else(PoisonError::into_inner);
            apply(&mut guard);
        }
        None => debug!("Status board is gone, dropping late check result"),
    }
}
