use crate::{
    auth::{jwt::generate_access_token, password::verify_password},
    config::Config,
    error::AppError,
    models::{LoginReqDto, LoginResponse},
    store::Store,
};
use actix_web::{HttpResponse, web};
use tracing::{debug, info, instrument};

/// Exchange email and password for an access token
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Missing credentials", body = MessageResponse),
        (status = 401, description = "Invalid credentials", body = MessageResponse)
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(store, config, user),
    fields(email = %user.email)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    store: web::Data<Store>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    info!("Login request received");

    // 1️⃣ Basic validation
    if user.email.trim().is_empty() || user.password.is_empty() {
        info!("Validation failed: empty email or password");
        return Err(AppError::Validation("Email and password required".into()));
    }

    // 2️⃣ Fetch employee
    let employee = match store.find_employee_by_email(&user.email).await? {
        Some(employee) => {
            debug!(employee_id = employee.id, "Employee found");
            employee
        }
        None => {
            info!("Invalid credentials: unknown email");
            return Err(AppError::Unauthorized("Invalid credentials".into()));
        }
    };

    // 3️⃣ Verify password
    if let Err(e) = verify_password(&user.password, &employee.password_hash) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    // 4️⃣ Issue access token
    let access_token = generate_access_token(
        employee.id,
        employee.email.clone(),
        employee.name.clone(),
        employee.role,
        &config.jwt_secret,
        config.access_token_ttl,
    )?;

    info!(employee_id = employee.id, "Login successful");

    Ok(HttpResponse::Ok().json(LoginResponse {
        access_token,
        expires_in: config.access_token_ttl,
    }))
}
