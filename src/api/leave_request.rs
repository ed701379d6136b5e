use crate::{
    auth::auth::AuthUser,
    error::AppError,
    model::leave_application::{
        ApproverRole, Decision, LeaveApplication, LeaveType, NewLeaveApplication, Verdict,
    },
    store::Store,
    utils::{
        certificate,
        leave_filter::{self, LeaveFilter},
        leave_stats,
    },
};
use actix_web::{
    HttpResponse,
    http::header::{ContentDisposition, ContentType, DispositionParam, DispositionType},
    web::{self, Bytes},
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = "vacation")]
    pub leave_type: LeaveType, // enum ensures Swagger dropdown
    #[schema(example = "2024-01-10", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2024-01-12", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "Family event")]
    pub reason: String,
    #[schema(example = "+8801712345678")]
    pub emergency_contact: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct DecisionNotes {
    #[schema(example = "insufficient coverage")]
    pub notes: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveApplication>,
    #[schema(example = 1)]
    pub page: u64,
    #[schema(example = 10)]
    pub per_page: u64,
    #[schema(example = 1)]
    pub total: usize,
}

/* =========================
Submit leave request
========================= */
/// Submit a leave request for the signed-in employee
#[utoipa::path(
    post,
    path = "/api/v1/leave",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request submitted", body = LeaveApplication),
        (status = 400, description = "Invalid date range or missing reason", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = MessageResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    store: web::Data<Store>,
    payload: web::Json<CreateLeave>,
) -> Result<HttpResponse, AppError> {
    let employee = store.get_employee(auth.employee_id).await?;
    let payload = payload.into_inner();

    let application = store
        .create(NewLeaveApplication {
            employee: employee.reference(),
            leave_type: payload.leave_type,
            start_date: payload.start_date,
            end_date: payload.end_date,
            reason: payload.reason,
            emergency_contact: payload.emergency_contact,
        })
        .await?;

    Ok(HttpResponse::Created().json(application))
}

/* =========================
Approve / reject
========================= */
/// Approve the leave request at the caller's stage (manager, then HR)
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/approve",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to approve")
    ),
    request_body(content = DecisionNotes, description = "Optional reviewer notes; an empty body means none", content_type = "application/json"),
    responses(
        (status = 200, description = "Leave approved at this stage", body = LeaveApplication),
        (status = 400, description = "Malformed decision body", body = MessageResponse),
        (status = 403, description = "Caller may not decide on this request", body = MessageResponse),
        (status = 404, description = "Leave request not found", body = MessageResponse),
        (status = 409, description = "Leave request is not waiting on the caller's stage", body = MessageResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    store: web::Data<Store>,
    path: web::Path<u64>,
    body: Bytes,
) -> Result<HttpResponse, AppError> {
    decide(auth, store, path.into_inner(), Verdict::Approve, body).await
}

/// Reject the leave request at the caller's stage
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/reject",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to reject")
    ),
    request_body(content = DecisionNotes, description = "Optional reviewer notes; an empty body means none", content_type = "application/json"),
    responses(
        (status = 200, description = "Leave rejected", body = LeaveApplication),
        (status = 400, description = "Malformed decision body", body = MessageResponse),
        (status = 403, description = "Caller may not decide on this request", body = MessageResponse),
        (status = 404, description = "Leave request not found", body = MessageResponse),
        (status = 409, description = "Leave request is not waiting on the caller's stage", body = MessageResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    store: web::Data<Store>,
    path: web::Path<u64>,
    body: Bytes,
) -> Result<HttpResponse, AppError> {
    decide(auth, store, path.into_inner(), Verdict::Reject, body).await
}

async fn decide(
    auth: AuthUser,
    store: web::Data<Store>,
    leave_id: u64,
    verdict: Verdict,
    body: Bytes,
) -> Result<HttpResponse, AppError> {
    let actor = auth.require_approver()?;
    let notes = decision_notes(&body)?;

    let application = store.get(leave_id).await?;
    if application.employee.id == auth.employee_id {
        return Err(AppError::Forbidden(
            "You cannot decide on your own leave request".into(),
        ));
    }
    // a direct report is decided by their own manager
    if actor == ApproverRole::Manager {
        let employee = store.get_employee(application.employee.id).await?;
        if employee.manager_id.is_some_and(|id| id != auth.employee_id) {
            return Err(AppError::Forbidden(
                "Only the employee's manager can decide at this stage".into(),
            ));
        }
    }

    let decision = Decision {
        actor,
        verdict,
        decided_by: auth.name.clone(),
        notes,
    };

    let application = store.update_status(leave_id, decision).await.map_err(|e| {
        tracing::info!(error = %e, leave_id, employee_id = auth.employee_id, "Decision refused");
        e
    })?;

    Ok(HttpResponse::Ok().json(application))
}

/// An empty body carries no notes; anything else must be a valid `DecisionNotes`.
fn decision_notes(body: &[u8]) -> Result<Option<String>, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let parsed: DecisionNotes = serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("Invalid decision body: {e}")))?;
    Ok(parsed.notes)
}

/* =========================
Reads
========================= */
/// Get one leave request; employees only see their own
#[utoipa::path(
    get,
    path = "/api/v1/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveApplication),
        (status = 403, description = "Forbidden", body = MessageResponse),
        (status = 404, description = "Leave request not found", body = MessageResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    store: web::Data<Store>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let application = store.get(path.into_inner()).await?;
    auth.require_self_or_approver(application.employee.id)?;

    Ok(HttpResponse::Ok().json(application))
}

/// Leave overview for managers and HR: filter, sort and paginate
#[utoipa::path(
    get,
    path = "/api/v1/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 400, description = "Invalid filter", body = MessageResponse),
        (status = 403, description = "Forbidden", body = MessageResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    store: web::Data<Store>,
    query: web::Query<LeaveFilter>,
) -> Result<HttpResponse, AppError> {
    auth.require_approver()?;

    let selected = leave_filter::apply(store.get_all().await?, &query, Utc::now());
    let page = leave_filter::paginate(selected, query.page, query.per_page);

    Ok(HttpResponse::Ok().json(LeaveListResponse {
        data: page.data,
        page: page.page,
        per_page: page.per_page,
        total: page.total,
    }))
}

/// The signed-in employee's own requests, open ones first
#[utoipa::path(
    get,
    path = "/api/v1/leave/mine",
    responses(
        (status = 200, description = "Own leave requests", body = [LeaveApplication]),
        (status = 401, description = "Unauthorized", body = MessageResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn my_leaves(auth: AuthUser, store: web::Data<Store>) -> Result<HttpResponse, AppError> {
    let mut applications = store.get_by_employee(auth.employee_id).await?;
    applications.sort_by(leave_filter::open_first);

    Ok(HttpResponse::Ok().json(applications))
}

/// Requests waiting on the caller's approval stage
#[utoipa::path(
    get,
    path = "/api/v1/leave/pending",
    responses(
        (status = 200, description = "Pending approvals, oldest first", body = [LeaveApplication]),
        (status = 403, description = "Caller does not approve leave", body = MessageResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn pending_leaves(
    auth: AuthUser,
    store: web::Data<Store>,
) -> Result<HttpResponse, AppError> {
    let stage = auth.require_approver()?;
    let mut applications = store.get_pending_for(stage).await?;
    applications.sort_by(|a, b| a.applied_at.cmp(&b.applied_at));

    Ok(HttpResponse::Ok().json(applications))
}

/// Dashboard statistics over the filtered collection (pagination ignored)
#[utoipa::path(
    get,
    path = "/api/v1/leave/stats",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Aggregated statistics", body = LeaveStats),
        (status = 403, description = "Forbidden", body = MessageResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_stats(
    auth: AuthUser,
    store: web::Data<Store>,
    query: web::Query<LeaveFilter>,
) -> Result<HttpResponse, AppError> {
    auth.require_approver()?;

    let selected = leave_filter::apply(store.get_all().await?, &query, Utc::now());
    Ok(HttpResponse::Ok().json(leave_stats::compute(&selected)))
}

/// Download the printable certificate of a fully approved request
#[utoipa::path(
    get,
    path = "/api/v1/leave/{leave_id}/certificate",
    params(
        ("leave_id" = u64, Path, description = "ID of an approved leave request")
    ),
    responses(
        (status = 200, description = "Plain-text certificate attachment", body = String, content_type = "text/plain"),
        (status = 403, description = "Forbidden", body = MessageResponse),
        (status = 404, description = "Leave request not found", body = MessageResponse),
        (status = 409, description = "Leave request is not fully approved", body = MessageResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_certificate(
    auth: AuthUser,
    store: web::Data<Store>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let application = store.get(path.into_inner()).await?;
    auth.require_self_or_approver(application.employee.id)?;

    let certificate = certificate::render(&application, Utc::now())?;
    tracing::debug!(leave_id = application.id, filename = %certificate.filename, "Certificate generated");

    Ok(HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(certificate.filename)],
        })
        .body(certificate.body))
}
