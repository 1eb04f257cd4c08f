use serde::{ Deserialize, Serialize };
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    Checking,
    Online,
    Offline,
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ServiceState::Checking => "Checking",
            ServiceState::Online => "Online",
            ServiceState::Offline => "Offline",
        };
        f.pad(label)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub name: String,
    pub status: ServiceState,
    pub message: String,
}

impl ServiceStatus {
    pub fn checking(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: ServiceState::Checking,
            message: message.to_string(),
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indicator = match self.status {
            ServiceState::Checking => '◐',
            ServiceState::Online | ServiceState::Offline => '●',
        };
        write!(f, "{} {:<16} {:<9} {}", indicator, self.name, self.status, self.message)
    }
}
