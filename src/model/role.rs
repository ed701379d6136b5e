use crate::model::leave_application::ApproverRole;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    Employee,
    Manager,
    HrAdmin,
}

impl Role {
    /// The approval stage this role acts on, if any.
    pub fn approver(&self) -> Option<ApproverRole> {
        match self {
            Role::Employee => None,
            Role::Manager => Some(ApproverRole::Manager),
            Role::HrAdmin => Some(ApproverRole::Hr),
        }
    }
}
