use crate::model::leave_application::{LeaveApplication, LeaveStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

#[derive(Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "total": 4,
    "pending": 2,
    "approved": 1,
    "rejected": 1,
    "approved_days": 3,
    "by_department": { "Engineering": 3, "Sales": 1 },
    "by_leave_type": { "sick": 1, "vacation": 3 }
}))]
pub struct LeaveStats {
    pub total: usize,
    /// Waiting on a manager or HR
    pub pending: usize,
    /// Fully approved by HR
    pub approved: usize,
    /// Rejected at either stage
    pub rejected: usize,
    /// Days covered by fully approved applications
    pub approved_days: u64,
    pub by_department: BTreeMap<String, usize>,
    pub by_leave_type: BTreeMap<String, usize>,
}

pub fn compute(applications: &[LeaveApplication]) -> LeaveStats {
    let mut stats = LeaveStats {
        total: applications.len(),
        ..Default::default()
    };

    for application in applications {
        let status = application.status.as_ref();
        if status.contains("pending") {
            stats.pending += 1;
        }
        if status.contains("rejected") {
            stats.rejected += 1;
        }
        if application.status == LeaveStatus::HrApproved {
            stats.approved += 1;
            stats.approved_days += u64::from(application.duration_days);
        }

        *stats
            .by_department
            .entry(application.employee.department.clone())
            .or_default() += 1;
        *stats
            .by_leave_type
            .entry(application.leave_type.to_string())
            .or_default() += 1;
    }

    stats
}
