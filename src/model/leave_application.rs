use crate::error::AppError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveType {
    Sick,
    Vacation,
    Personal,
    Unpaid,
}

/// Approval status of a leave application.
///
/// ```text
/// pending --manager approves--> hr_pending --hr approves--> hr_approved
///    |                               |
///    +--manager rejects--> rejected  +--hr rejects--> hr_rejected
/// ```
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LeaveStatus {
    Pending,
    HrPending,
    HrApproved,
    HrRejected,
    Rejected,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ApproverRole {
    Manager,
    Hr,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Approve,
    Reject,
}

impl LeaveStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            LeaveStatus::Rejected | LeaveStatus::HrApproved | LeaveStatus::HrRejected
        )
    }

    /// Who has to act next. `None` once the application is closed.
    pub fn approver(self) -> Option<ApproverRole> {
        match self {
            LeaveStatus::Pending => Some(ApproverRole::Manager),
            LeaveStatus::HrPending => Some(ApproverRole::Hr),
            _ => None,
        }
    }

    /// The complete transition table. Anything not listed is refused.
    pub fn next(self, actor: ApproverRole, verdict: Verdict) -> Option<LeaveStatus> {
        use ApproverRole::*;
        use LeaveStatus::*;

        match (self, actor, verdict) {
            (Pending, Manager, Verdict::Approve) => Some(HrPending),
            (Pending, Manager, Verdict::Reject) => Some(Rejected),
            (HrPending, Hr, Verdict::Approve) => Some(HrApproved),
            (HrPending, Hr, Verdict::Reject) => Some(HrRejected),
            _ => None,
        }
    }
}

/// Inclusive day count of a date range, clamped at zero for inverted ranges.
pub fn duration_days(start: NaiveDate, end: NaiveDate) -> u32 {
    let days = (end - start).num_days() + 1;
    u32::try_from(days.max(0)).unwrap_or(u32::MAX)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EmployeeRef {
    #[schema(example = 3)]
    pub id: u64,
    #[schema(example = "Jane Doe")]
    pub name: String,
    #[schema(example = "jane.doe@company.com")]
    pub email: String,
    #[schema(example = "Engineering")]
    pub department: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeaveApplication {
    #[schema(example = 1)]
    pub id: u64,
    pub employee: EmployeeRef,
    pub leave_type: LeaveType,
    #[schema(example = "2024-01-10", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2024-01-12", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = 3)]
    pub duration_days: u32,
    #[schema(example = "Family event")]
    pub reason: String,
    pub emergency_contact: Option<String>,
    pub status: LeaveStatus,
    pub current_approver: Option<ApproverRole>,
    pub manager_notes: Option<String>,
    pub manager_name: Option<String>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub manager_decided_at: Option<DateTime<Utc>>,
    pub hr_notes: Option<String>,
    pub hr_name: Option<String>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub hr_decided_at: Option<DateTime<Utc>>,
    #[schema(example = "2024-01-02T09:00:00Z", format = "date-time", value_type = String)]
    pub applied_at: DateTime<Utc>,
}

/// An approve/reject action taken by a manager or HR.
#[derive(Debug, Clone)]
pub struct Decision {
    pub actor: ApproverRole,
    pub verdict: Verdict,
    pub decided_by: String,
    pub notes: Option<String>,
}

impl LeaveApplication {
    /// Most recent decision, HR's if there is one.
    pub fn last_decision_at(&self) -> Option<DateTime<Utc>> {
        self.hr_decided_at.or(self.manager_decided_at)
    }

    /// Notes attached to the decision that produced the current status.
    pub fn decision_notes(&self) -> Option<&str> {
        match self.status {
            LeaveStatus::HrApproved | LeaveStatus::HrRejected => self.hr_notes.as_deref(),
            LeaveStatus::HrPending | LeaveStatus::Rejected => self.manager_notes.as_deref(),
            LeaveStatus::Pending => None,
        }
    }

    /// Applies `decision` and returns the status it replaced.
    pub fn apply(&mut self, decision: &Decision, now: DateTime<Utc>) -> Result<LeaveStatus, AppError> {
        let previous = self.status;
        let next = previous
            .next(decision.actor, decision.verdict)
            .ok_or(AppError::InvalidTransition {
                id: self.id,
                status: previous,
            })?;

        let notes = normalize(decision.notes.clone());
        match decision.actor {
            ApproverRole::Manager => {
                self.manager_notes = notes;
                self.manager_name = Some(decision.decided_by.clone());
                self.manager_decided_at = Some(now);
            }
            ApproverRole::Hr => {
                self.hr_notes = notes;
                self.hr_name = Some(decision.decided_by.clone());
                self.hr_decided_at = Some(now);
            }
        }

        self.status = next;
        self.current_approver = next.approver();
        Ok(previous)
    }
}

#[derive(Debug, Clone)]
pub struct NewLeaveApplication {
    pub employee: EmployeeRef,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub emergency_contact: Option<String>,
}

impl NewLeaveApplication {
    /// Checks the submission and returns its duration.
    pub fn validate(&self) -> Result<u32, AppError> {
        if self.reason.trim().is_empty() {
            return Err(AppError::Validation("reason is required".into()));
        }

        let duration = duration_days(self.start_date, self.end_date);
        if duration == 0 {
            return Err(AppError::Validation(
                "start_date cannot be after end_date".into(),
            ));
        }

        Ok(duration)
    }

    pub fn into_application(self, id: u64, duration_days: u32, now: DateTime<Utc>) -> LeaveApplication {
        let status = LeaveStatus::Pending;
        LeaveApplication {
            id,
            employee: self.employee,
            leave_type: self.leave_type,
            start_date: self.start_date,
            end_date: self.end_date,
            duration_days,
            reason: self.reason.trim().to_string(),
            emergency_contact: normalize(self.emergency_contact),
            status,
            current_approver: status.approver(),
            manager_notes: None,
            manager_name: None,
            manager_decided_at: None,
            hr_notes: None,
            hr_name: None,
            hr_decided_at: None,
            applied_at: now,
        }
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
