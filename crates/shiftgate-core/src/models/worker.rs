use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Worker identifier as issued by the external identity provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkerId(pub String);

impl WorkerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Role {
    #[default]
    #[serde(rename = "CAREWORKER")]
    CareWorker,
    #[serde(rename = "MANAGER")]
    Manager,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::CareWorker => "CAREWORKER",
            Role::Manager => "MANAGER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "CAREWORKER" => Some(Role::CareWorker),
            "MANAGER" => Some(Role::Manager),
            _ => None,
        }
    }

    /// Map identity-provider role claims onto an application role
    pub fn from_provider_roles<S: AsRef<str>>(roles: &[S]) -> Self {
        if roles.iter().any(|r| r.as_ref().eq_ignore_ascii_case("manager")) {
            Role::Manager
        } else {
            Role::CareWorker
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    pub id: WorkerId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub synced_at: DateTime<Utc>,
}

/// Worker claims received from the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerProfile {
    pub id: WorkerId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl WorkerProfile {
    pub fn matches(&self, worker: &Worker) -> bool {
        self.id == worker.id
            && self.name == worker.name
            && self.email == worker.email
            && self.role == worker.role
    }

    pub fn into_worker(self, synced_at: DateTime<Utc>) -> Worker {
        Worker {
            id: self.id,
            name: self.name,
            email: self.email,
            role: self.role,
            synced_at,
        }
    }
}

/// Result of reconciling a profile with the stored worker record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncOutcome {
    Created,
    Updated,
    Unchanged,
}
