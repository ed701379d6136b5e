//! Fixtures shared by the unit and handler tests.

use crate::{
    auth::jwt::generate_access_token,
    config::{Config, StorageBackend},
    model::{
        employee::{Employee, NewEmployee},
        leave_application::{
            ApproverRole, Decision, EmployeeRef, LeaveApplication, LeaveStatus, LeaveType,
            NewLeaveApplication, Verdict,
        },
        role::Role,
    },
    store::{Store, storage::Storage},
};
use actix_web::{test::TestRequest, web};
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use std::sync::Arc;

pub const PASSWORD: &str = "correct-horse";

/// Builds the routed app around a store and config.
#[macro_export]
macro_rules! test_app {
    ($store:expr, $config:expr) => {{
        let config: $crate::config::Config = $config;
        let routes_config = config.clone();
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new(config))
                .app_data($store)
                .configure(move |cfg| $crate::routes::configure(cfg, routes_config)),
        )
        .await
    }};
}

pub fn test_config() -> Config {
    Config {
        server_addr: "127.0.0.1:0".into(),
        jwt_secret: "test-secret".into(),
        access_token_ttl: 900,
        storage_backend: StorageBackend::Memory,
        data_dir: "data".into(),
        database_url: None,
        seed_file: None,
        default_sick_days: 10,
        default_vacation_days: 20,
        default_personal_days: 5,
        rate_login_per_min: 60,
        rate_protected_per_min: 1000,
        api_prefix: "/api/v1".into(),
        log_dir: "logs".into(),
        log_level: tracing::Level::DEBUG,
    }
}

pub struct Staff {
    pub hr: Employee,
    pub manager: Employee,
    pub employee: Employee,
}

fn new_employee(name: &str, email: &str, role: Role, manager_id: Option<u64>) -> NewEmployee {
    NewEmployee {
        name: name.into(),
        email: email.into(),
        department: "Engineering".into(),
        role,
        manager_id,
        password: PASSWORD.into(),
        balances: None,
    }
}

/// In-memory store with an HR admin, a manager and an employee reporting to
/// that manager.
pub async fn seeded_store() -> (web::Data<Store>, Staff) {
    seeded_store_on(Storage::memory()).await
}

pub async fn seeded_store_on(storage: Storage) -> (web::Data<Store>, Staff) {
    let store = Store::new(Arc::new(storage), test_config().default_balances());

    let hr = store
        .create_employee(new_employee("Hana Haque", "hana@company.com", Role::HrAdmin, None))
        .await
        .unwrap();
    let manager = store
        .create_employee(new_employee("Mark Mills", "mark@company.com", Role::Manager, None))
        .await
        .unwrap();
    let employee = store
        .create_employee(new_employee(
            "Jane Doe",
            "jane@company.com",
            Role::Employee,
            Some(manager.id),
        ))
        .await
        .unwrap();

    (
        web::Data::new(store),
        Staff {
            hr,
            manager,
            employee,
        },
    )
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn submission(employee: &Employee, start: &str, end: &str) -> NewLeaveApplication {
    NewLeaveApplication {
        employee: employee.reference(),
        leave_type: LeaveType::Vacation,
        start_date: date(start),
        end_date: date(end),
        reason: "Family event".into(),
        emergency_contact: None,
    }
}

pub fn manager_decision(manager: &Employee, verdict: Verdict) -> Decision {
    Decision {
        actor: ApproverRole::Manager,
        verdict,
        decided_by: manager.name.clone(),
        notes: None,
    }
}

pub fn hr_decision(hr: &Employee, verdict: Verdict) -> Decision {
    Decision {
        actor: ApproverRole::Hr,
        verdict,
        decided_by: hr.name.clone(),
        notes: None,
    }
}

/// Stored application with the given status; later ids were applied later.
pub fn application(
    id: u64,
    name: &str,
    department: &str,
    status: LeaveStatus,
    duration_days: u32,
) -> LeaveApplication {
    let start = date("2024-01-01") + Duration::days(id as i64 * 7);
    LeaveApplication {
        id,
        employee: EmployeeRef {
            id,
            name: name.into(),
            email: format!("employee{id}@company.com"),
            department: department.into(),
        },
        leave_type: LeaveType::Vacation,
        start_date: start,
        end_date: start + Duration::days(i64::from(duration_days) - 1),
        duration_days,
        reason: "Family event".into(),
        emergency_contact: None,
        status,
        current_approver: status.approver(),
        manager_notes: None,
        manager_name: None,
        manager_decided_at: None,
        hr_notes: None,
        hr_name: None,
        hr_decided_at: None,
        applied_at: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap() + Duration::hours(id as i64),
    }
}

pub fn token(config: &Config, employee: &Employee) -> String {
    generate_access_token(
        employee.id,
        employee.email.clone(),
        employee.name.clone(),
        employee.role,
        &config.jwt_secret,
        config.access_token_ttl,
    )
    .unwrap()
}

/// The governor keys on the peer address, which test requests lack by default.
pub fn public(req: TestRequest) -> TestRequest {
    req.peer_addr("127.0.0.1:40000".parse().unwrap())
}

pub fn authed(req: TestRequest, token: &str) -> TestRequest {
    public(req).insert_header(("Authorization", format!("Bearer {token}")))
}

