use crate::model::leave_application::{LeaveApplication, LeaveType};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Month,
    Quarter,
    Year,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Date,
    Employee,
    Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct LeaveFilter {
    #[schema(example = "pending")]
    /// Substring of the status, `pending` also matches `hr_pending`
    pub status: Option<String>,
    #[schema(example = "jane")]
    /// Free text over employee name, department and id
    pub search: Option<String>,
    #[schema(example = "Engineering")]
    /// Exact department
    pub department: Option<String>,
    /// Exact leave type
    pub leave_type: Option<LeaveType>,
    /// Only applications decided in the current month/quarter/year
    pub period: Option<Period>,
    /// Sort by applied date (default), employee name or duration
    pub sort: Option<SortKey>,
    /// Sort direction, newest/largest first by default
    pub order: Option<SortOrder>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    #[schema(example = 10)]
    /// Pagination per page number
    pub per_page: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub page: u64,
    pub per_page: u64,
    pub total: usize,
}

pub fn matches_status(application: &LeaveApplication, needle: &str) -> bool {
    application
        .status
        .as_ref()
        .contains(needle.trim().to_lowercase().as_str())
}

pub fn matches_search(application: &LeaveApplication, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    application.employee.name.to_lowercase().contains(&term)
        || application.employee.department.to_lowercase().contains(&term)
        || application.employee.id.to_string().contains(&term)
}

/// True when the latest decision falls in the same period as `now`.
/// Undecided applications belong to no period.
pub fn in_period(application: &LeaveApplication, period: Period, now: DateTime<Utc>) -> bool {
    let Some(decided) = application.last_decision_at() else {
        return false;
    };
    if decided.year() != now.year() {
        return false;
    }
    match period {
        Period::Year => true,
        Period::Quarter => decided.month0() / 3 == now.month0() / 3,
        Period::Month => decided.month() == now.month(),
    }
}

/// Filters and sorts; pagination is left to [`paginate`].
pub fn apply(
    applications: Vec<LeaveApplication>,
    filter: &LeaveFilter,
    now: DateTime<Utc>,
) -> Vec<LeaveApplication> {
    let mut selected: Vec<LeaveApplication> = applications
        .into_iter()
        .filter(|a| filter.status.as_deref().is_none_or(|s| matches_status(a, s)))
        .filter(|a| filter.search.as_deref().is_none_or(|s| matches_search(a, s)))
        .filter(|a| {
            filter
                .department
                .as_deref()
                .is_none_or(|d| a.employee.department == d)
        })
        .filter(|a| filter.leave_type.is_none_or(|t| a.leave_type == t))
        .filter(|a| filter.period.is_none_or(|p| in_period(a, p, now)))
        .collect();

    sort(
        &mut selected,
        filter.sort.unwrap_or_default(),
        filter.order.unwrap_or_default(),
    );
    selected
}

pub fn sort(applications: &mut [LeaveApplication], key: SortKey, order: SortOrder) {
    applications.sort_by(|a, b| {
        let ordering = match key {
            SortKey::Date => a.applied_at.cmp(&b.applied_at),
            SortKey::Employee => a
                .employee
                .name
                .to_lowercase()
                .cmp(&b.employee.name.to_lowercase()),
            SortKey::Duration => a.duration_days.cmp(&b.duration_days),
        }
        .then(a.id.cmp(&b.id));

        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

pub fn paginate<T>(items: Vec<T>, page: Option<u64>, per_page: Option<u64>) -> Page<T> {
    let per_page = per_page.unwrap_or(10).clamp(1, 100);
    let page = page.unwrap_or(1).max(1);
    let total = items.len();
    let offset = usize::try_from((page - 1).saturating_mul(per_page)).unwrap_or(usize::MAX);

    let data = items
        .into_iter()
        .skip(offset)
        .take(per_page as usize)
        .collect();

    Page {
        data,
        page,
        per_page,
        total,
    }
}

/// Orders by status for views that list open work first.
pub fn open_first(a: &LeaveApplication, b: &LeaveApplication) -> Ordering {
    a.status
        .is_terminal()
        .cmp(&b.status.is_terminal())
        .then(a.applied_at.cmp(&b.applied_at))
}
