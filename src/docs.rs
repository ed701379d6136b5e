use crate::api::leave_request::{CreateLeave, DecisionNotes, LeaveListResponse};
use crate::api::notification::{MarkedRead, NotificationListResponse};
use crate::model::employee::{EmployeeResponse, LeaveBalances, NewEmployee};
use crate::model::leave_application::{
    ApproverRole, EmployeeRef, LeaveApplication, LeaveStatus, LeaveType,
};
use crate::model::notification::{Notification, Severity};
use crate::model::role::Role;
use crate::models::{LoginReqDto, LoginResponse, MessageResponse};
use crate::utils::leave_filter::{Period, SortKey, SortOrder};
use crate::utils::leave_stats::LeaveStats;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leave Desk API",
        version = "1.0.0",
        description = r#"
## Leave Desk

Two-stage leave approval: an employee submits a request, their **manager**
reviews it first and **HR** gives the final decision.

### 🔹 Key Features
- **Leave Requests**
  - Submit, follow your own requests and download approval certificates
- **Approvals**
  - Manager and HR queues, approve/reject with notes
- **Overview**
  - Filter, sort and paginate all requests, dashboard statistics
- **Employees**
  - HR onboarding, leave balances deducted on final approval
- **Notifications**
  - Every workflow step notifies the people involved

### 🔐 Security
All `/api/v1` endpoints require a **JWT Bearer** token from `/auth/login`.

### 📦 Response Format
- JSON bodies, errors as `{ "message": "..." }`
- Certificates as plain-text attachments
"#,
    ),
    paths(
        crate::auth::handlers::login,

        crate::api::leave_request::create_leave,
        crate::api::leave_request::leave_list,
        crate::api::leave_request::my_leaves,
        crate::api::leave_request::pending_leaves,
        crate::api::leave_request::leave_stats,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,
        crate::api::leave_request::leave_certificate,

        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::me,

        crate::api::notification::list_notifications,
        crate::api::notification::mark_read,
        crate::api::notification::mark_all_read
    ),
    components(
        schemas(
            LoginReqDto,
            LoginResponse,
            MessageResponse,
            CreateLeave,
            DecisionNotes,
            LeaveApplication,
            LeaveListResponse,
            EmployeeRef,
            LeaveType,
            LeaveStatus,
            ApproverRole,
            Period,
            SortKey,
            SortOrder,
            LeaveStats,
            NewEmployee,
            EmployeeResponse,
            LeaveBalances,
            Role,
            Notification,
            NotificationListResponse,
            MarkedRead,
            Severity
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login"),
        (name = "Leave", description = "Leave request and approval APIs"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Notification", description = "Workflow notifications"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
