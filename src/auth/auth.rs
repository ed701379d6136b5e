use crate::{
    error::AppError,
    model::{leave_application::ApproverRole, notification::audiences_for, role::Role},
    models::Claims,
};
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload};
use futures::future::{Ready, ready};

/// The signed-in employee, put into request extensions by `auth_middleware`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub employee_id: u64,
    pub name: String,
    pub role: Role,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        AuthUser {
            employee_id: claims.employee_id,
            name: claims.name,
            role: claims.role,
        }
    }
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let user = req
            .extensions()
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Missing token".into()).into());
        ready(user)
    }
}

impl AuthUser {
    pub fn require_hr(&self) -> Result<(), AppError> {
        if self.role == Role::HrAdmin {
            Ok(())
        } else {
            Err(AppError::Forbidden("HR only".into()))
        }
    }

    /// Managers and HR; returns the approval stage the user acts on.
    pub fn require_approver(&self) -> Result<ApproverRole, AppError> {
        self.role
            .approver()
            .ok_or_else(|| AppError::Forbidden("Manager/HR only".into()))
    }

    /// The employee themself, or anyone who approves leave.
    pub fn require_self_or_approver(&self, employee_id: u64) -> Result<(), AppError> {
        if self.employee_id == employee_id || self.role.approver().is_some() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Not your record".into()))
        }
    }

    pub fn audiences(&self) -> Vec<String> {
        audiences_for(self.employee_id, self.role)
    }
}
