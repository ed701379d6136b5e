use crate::{
    error::AppError,
    model::{
        leave_application::{EmployeeRef, LeaveType},
        role::Role,
    },
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LeaveBalances {
    #[schema(example = 10)]
    pub sick: u32,
    #[schema(example = 20)]
    pub vacation: u32,
    #[schema(example = 5)]
    pub personal: u32,
}

impl LeaveBalances {
    /// Deducts `days` without going below zero and returns what is left.
    pub fn deduct(&mut self, leave_type: LeaveType, days: u32) -> Option<u32> {
        let slot = match leave_type {
            LeaveType::Sick => &mut self.sick,
            LeaveType::Vacation => &mut self.vacation,
            LeaveType::Personal => &mut self.personal,
            LeaveType::Unpaid => return None,
        };
        *slot = slot.saturating_sub(days);
        Some(*slot)
    }
}

/// Stored employee record. Contains the password hash, so it never leaves
/// the service as-is; handlers answer with [`EmployeeResponse`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub department: String,
    pub role: Role,
    pub manager_id: Option<u64>,
    pub password_hash: String,
    pub balances: LeaveBalances,
}

impl Employee {
    pub fn reference(&self) -> EmployeeRef {
        EmployeeRef {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            department: self.department.clone(),
        }
    }
}

/// Onboarding payload, also the shape of each entry in the seed file.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewEmployee {
    #[schema(example = "Jane Doe")]
    pub name: String,
    #[schema(example = "jane.doe@company.com", format = "email", value_type = String)]
    pub email: String,
    #[schema(example = "Engineering")]
    pub department: String,
    pub role: Role,
    #[schema(example = 2)]
    pub manager_id: Option<u64>,
    #[schema(example = "changeme")]
    pub password: String,
    /// Falls back to the configured defaults when omitted
    pub balances: Option<LeaveBalances>,
}

impl NewEmployee {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("name is required".into()));
        }
        if !self.email.contains('@') {
            return Err(AppError::Validation("email is invalid".into()));
        }
        if self.department.trim().is_empty() {
            return Err(AppError::Validation("department is required".into()));
        }
        if self.password.len() < 8 {
            return Err(AppError::Validation(
                "password must be at least 8 characters".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": 3,
    "name": "Jane Doe",
    "email": "jane.doe@company.com",
    "department": "Engineering",
    "role": "employee",
    "manager_id": 2,
    "balances": { "sick": 10, "vacation": 20, "personal": 5 }
}))]
pub struct EmployeeResponse {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub department: String,
    pub role: Role,
    pub manager_id: Option<u64>,
    pub balances: LeaveBalances,
}

impl From<&Employee> for EmployeeResponse {
    fn from(e: &Employee) -> Self {
        EmployeeResponse {
            id: e.id,
            name: e.name.clone(),
            email: e.email.clone(),
            department: e.department.clone(),
            role: e.role,
            manager_id: e.manager_id,
            balances: e.balances,
        }
    }
}
