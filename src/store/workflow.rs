//! Notifications fired by the approval workflow.

use crate::model::{
    leave_application::{LeaveApplication, LeaveStatus},
    notification::{NewNotification, Severity},
    role::Role,
};

/// "New request" message for whoever reviews first.
pub fn submitted(application: &LeaveApplication, manager_audience: String) -> NewNotification {
    NewNotification {
        user_id: manager_audience,
        title: "New leave request".into(),
        message: format!(
            "{} requested {} day(s) of {} leave from {} to {}.",
            application.employee.name,
            application.duration_days,
            application.leave_type,
            application.start_date,
            application.end_date
        ),
        severity: Severity::Info,
        related_application_id: Some(application.id),
    }
}

/// Messages for a status change, derived from the previous and new status.
pub fn transitioned(previous: LeaveStatus, application: &LeaveApplication) -> Vec<NewNotification> {
    let employee = application.employee.id.to_string();
    let reason = application
        .decision_notes()
        .unwrap_or("No reason given");

    let notify = |user_id: String, title: &str, message: String, severity: Severity| NewNotification {
        user_id,
        title: title.to_string(),
        message,
        severity,
        related_application_id: Some(application.id),
    };

    match (previous, application.status) {
        (LeaveStatus::Pending, LeaveStatus::HrPending) => vec![
            notify(
                employee,
                "Leave request approved by manager",
                format!(
                    "Your {} leave from {} to {} was approved by your manager and is awaiting HR review.",
                    application.leave_type, application.start_date, application.end_date
                ),
                Severity::Success,
            ),
            notify(
                Role::HrAdmin.to_string(),
                "Leave request needs HR review",
                format!(
                    "{} ({}) has a {}-day {} leave request approved by their manager.",
                    application.employee.name,
                    application.employee.department,
                    application.duration_days,
                    application.leave_type
                ),
                Severity::Info,
            ),
        ],
        (LeaveStatus::Pending, LeaveStatus::Rejected) => vec![notify(
            employee,
            "Leave request rejected by manager",
            format!("Your leave request was rejected. Reason: {reason}"),
            Severity::Error,
        )],
        (LeaveStatus::HrPending, LeaveStatus::HrApproved) => vec![notify(
            employee,
            "Leave request fully approved",
            format!(
                "Your {} leave from {} to {} ({} day(s)) is fully approved.",
                application.leave_type,
                application.start_date,
                application.end_date,
                application.duration_days
            ),
            Severity::Success,
        )],
        (LeaveStatus::HrPending, LeaveStatus::HrRejected) => vec![notify(
            employee,
            "Leave request rejected by HR",
            format!("Your leave request was rejected by HR. Reason: {reason}"),
            Severity::Error,
        )],
        _ => Vec::new(),
    }
}
