use crate::model::role::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Audience that every user belongs to.
pub const AUDIENCE_ALL: &str = "all";

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    #[schema(example = 12)]
    pub id: u64,
    /// Employee id, role name or `all`
    #[schema(example = "3")]
    pub user_id: String,
    #[schema(example = "Leave request approved by manager")]
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub read: bool,
    #[schema(format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
    pub related_application_id: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: String,
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub related_application_id: Option<u64>,
}

/// Audiences a signed-in user reads from.
pub fn audiences_for(employee_id: u64, role: Role) -> Vec<String> {
    vec![
        employee_id.to_string(),
        role.to_string(),
        AUDIENCE_ALL.to_string(),
    ]
}

impl Notification {
    pub fn is_for(&self, audiences: &[String]) -> bool {
        audiences.iter().any(|a| *a == self.user_id)
    }
}
