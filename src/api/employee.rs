use crate::{
    auth::auth::AuthUser,
    error::AppError,
    model::employee::{EmployeeResponse, NewEmployee},
    store::Store,
};
use actix_web::{HttpResponse, web};
use tracing::info;

/// Onboard an employee (HR only)
#[utoipa::path(
    post,
    path = "/api/v1/employee",
    request_body = NewEmployee,
    responses(
        (status = 201, description = "Employee created successfully", body = EmployeeResponse),
        (status = 400, description = "Invalid employee data", body = MessageResponse),
        (status = 403, description = "HR only", body = MessageResponse),
        (status = 409, description = "Email already registered", body = MessageResponse)
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_employee(
    auth: AuthUser,
    store: web::Data<Store>,
    payload: web::Json<NewEmployee>,
) -> Result<HttpResponse, AppError> {
    auth.require_hr()?;

    let employee = store.create_employee(payload.into_inner()).await?;
    info!(employee_id = employee.id, onboarded_by = auth.employee_id, "Employee onboarded");

    Ok(HttpResponse::Created().json(EmployeeResponse::from(&employee)))
}

/// List all employees (managers and HR)
#[utoipa::path(
    get,
    path = "/api/v1/employee",
    responses(
        (status = 200, description = "Employees ordered by id", body = [EmployeeResponse]),
        (status = 403, description = "Forbidden", body = MessageResponse)
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_employees(
    auth: AuthUser,
    store: web::Data<Store>,
) -> Result<HttpResponse, AppError> {
    auth.require_approver()?;

    let employees: Vec<EmployeeResponse> = store
        .list_employees()
        .await?
        .iter()
        .map(EmployeeResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(employees))
}

/// Get one employee with their leave balances
#[utoipa::path(
    get,
    path = "/api/v1/employee/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "ID of the employee to fetch")
    ),
    responses(
        (status = 200, description = "Employee found", body = EmployeeResponse),
        (status = 403, description = "Forbidden", body = MessageResponse),
        (status = 404, description = "Employee not found", body = MessageResponse)
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_employee(
    auth: AuthUser,
    store: web::Data<Store>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let employee_id = path.into_inner();
    auth.require_self_or_approver(employee_id)?;

    let employee = store.get_employee(employee_id).await?;
    Ok(HttpResponse::Ok().json(EmployeeResponse::from(&employee)))
}

/// The signed-in employee's profile and balances
#[utoipa::path(
    get,
    path = "/api/v1/employee/me",
    responses(
        (status = 200, description = "Own profile", body = EmployeeResponse),
        (status = 401, description = "Unauthorized", body = MessageResponse)
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn me(auth: AuthUser, store: web::Data<Store>) -> Result<HttpResponse, AppError> {
    let employee = store.get_employee(auth.employee_id).await?;
    Ok(HttpResponse::Ok().json(EmployeeResponse::from(&employee)))
}
