use crate::{
    error::AppError,
    model::leave_application::{LeaveApplication, LeaveStatus},
};
use chrono::{DateTime, Utc};
use std::fmt;

const TERMS: [&str; 4] = [
    "This certificate confirms leave approved through the company leave workflow.",
    "The employee is expected to resume duties on the first working day after the end date.",
    "Any extension requires a new leave application.",
    "Unused approved days are not refunded to the leave balance once the leave has started.",
];

pub struct Certificate {
    pub filename: String,
    pub body: String,
}

/// Printable certificate for a fully approved application.
pub fn render(application: &LeaveApplication, generated_at: DateTime<Utc>) -> Result<Certificate, AppError> {
    if application.status != LeaveStatus::HrApproved {
        return Err(AppError::Conflict(format!(
            "Certificates are only issued for approved leave, request {} is {}",
            application.id, application.status
        )));
    }

    let mut body = String::new();
    write_body(&mut body, application, generated_at)
        .map_err(|e| AppError::Internal(format!("certificate rendering: {e}")))?;

    Ok(Certificate {
        filename: filename(&application.employee.name, generated_at),
        body,
    })
}

fn write_body(
    out: &mut impl fmt::Write,
    application: &LeaveApplication,
    generated_at: DateTime<Utc>,
) -> fmt::Result {
    let rule = "=".repeat(64);
    let decided = |at: Option<DateTime<Utc>>| {
        at.map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".into())
    };

    writeln!(out, "{rule}")?;
    writeln!(out, "{:^64}", "LEAVE APPROVAL CERTIFICATE")?;
    writeln!(out, "{rule}")?;
    writeln!(out, "Certificate no.   : LV-{:06}", application.id)?;
    writeln!(out, "Issued            : {}", generated_at.format("%Y-%m-%d %H:%M UTC"))?;
    writeln!(out)?;
    writeln!(out, "Employee          : {}", application.employee.name)?;
    writeln!(out, "Employee ID       : {}", application.employee.id)?;
    writeln!(out, "Email             : {}", application.employee.email)?;
    writeln!(out, "Department        : {}", application.employee.department)?;
    writeln!(out)?;
    writeln!(out, "Leave type        : {}", application.leave_type)?;
    writeln!(out, "From              : {}", application.start_date)?;
    writeln!(out, "To                : {}", application.end_date)?;
    writeln!(out, "Duration          : {} day(s)", application.duration_days)?;
    writeln!(out, "Reason            : {}", application.reason)?;
    if let Some(contact) = &application.emergency_contact {
        writeln!(out, "Emergency contact : {contact}")?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "Manager approval  : {} ({})",
        application.manager_name.as_deref().unwrap_or("-"),
        decided(application.manager_decided_at)
    )?;
    writeln!(
        out,
        "HR approval       : {} ({})",
        application.hr_name.as_deref().unwrap_or("-"),
        decided(application.hr_decided_at)
    )?;
    writeln!(out)?;
    writeln!(out, "Terms")?;
    for (i, term) in TERMS.iter().enumerate() {
        writeln!(out, "  {}. {term}", i + 1)?;
    }
    writeln!(out, "{rule}")
}

/// `leave_certificate_<name>_<YYYYMMDD_HHMMSS>.txt`, name reduced to `[a-z0-9_]`.
pub fn filename(employee_name: &str, generated_at: DateTime<Utc>) -> String {
    let mut slug = String::new();
    for c in employee_name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('_') && !slug.is_empty() {
            slug.push('_');
        }
    }
    let slug = slug.trim_end_matches('_');
    let slug = if slug.is_empty() { "employee" } else { slug };

    format!(
        "leave_certificate_{}_{}.txt",
        slug,
        generated_at.format("%Y%m%d_%H%M%S")
    )
}
