pub mod notifications;
pub mod storage;
pub mod workflow;

use crate::{
    auth::password::hash_password,
    error::AppError,
    model::{
        employee::{Employee, LeaveBalances, NewEmployee},
        leave_application::{
            ApproverRole, Decision, LeaveApplication, LeaveStatus, NewLeaveApplication,
        },
        role::Role,
    },
};
use chrono::Utc;
use futures::lock::Mutex;
use notifications::NotificationSink;
use std::sync::Arc;
use storage::Storage;
use tracing::{debug, error, info, warn};

pub const LEAVE_APPLICATIONS: &str = "leave_applications";
pub const EMPLOYEES: &str = "employees";

/// Next id after the largest one in use.
pub(crate) fn next_id(ids: impl Iterator<Item = u64>) -> u64 {
    ids.max().map_or(1, |max| max + 1)
}

/// Leave applications and employee records, plus the notification sink the
/// workflow reports to.
///
/// Built once at startup and shared through `web::Data`. Every mutation
/// reloads the affected collections, changes them and writes them back whole
/// while holding `write_lock`, so two requests in this process cannot both
/// act on the same application. Separate processes sharing a backend are not
/// coordinated: the last write wins.
pub struct Store {
    storage: Arc<Storage>,
    notifications: NotificationSink,
    write_lock: Mutex<()>,
    default_balances: LeaveBalances,
}

impl Store {
    pub fn new(storage: Arc<Storage>, default_balances: LeaveBalances) -> Self {
        Self {
            notifications: NotificationSink::new(storage.clone()),
            storage,
            write_lock: Mutex::new(()),
            default_balances,
        }
    }

    pub fn notifications(&self) -> &NotificationSink {
        &self.notifications
    }

    /* =========================
    Leave applications
    ========================= */

    pub async fn create(&self, new: NewLeaveApplication) -> Result<LeaveApplication, AppError> {
        let duration = new.validate()?;

        let application = {
            let _guard = self.write_lock.lock().await;
            let mut applications: Vec<LeaveApplication> =
                self.storage.load(LEAVE_APPLICATIONS).await?;

            let id = next_id(applications.iter().map(|a| a.id));
            let application = new.into_application(id, duration, Utc::now());
            applications.push(application.clone());
            self.storage.save(LEAVE_APPLICATIONS, &applications).await?;
            application
        };

        info!(
            leave_id = application.id,
            employee_id = application.employee.id,
            duration = application.duration_days,
            "Leave request submitted"
        );

        let notified = match self.manager_audience(application.employee.id).await {
            Ok(audience) => self
                .notifications
                .notify(workflow::submitted(&application, audience))
                .await
                .map(|_| ()),
            Err(e) => Err(e),
        };
        if let Err(e) = notified {
            // the request itself is stored; a lost message is not fatal
            warn!(error = %e, leave_id = application.id, "Failed to notify manager");
        }

        Ok(application)
    }

    pub async fn get_all(&self) -> Result<Vec<LeaveApplication>, AppError> {
        self.storage.load(LEAVE_APPLICATIONS).await
    }

    pub async fn get(&self, id: u64) -> Result<LeaveApplication, AppError> {
        self.get_all()
            .await?
            .into_iter()
            .find(|a| a.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Leave request {id}")))
    }

    pub async fn get_by_employee(&self, employee_id: u64) -> Result<Vec<LeaveApplication>, AppError> {
        let all = self.get_all().await?;
        Ok(all
            .into_iter()
            .filter(|a| a.employee.id == employee_id)
            .collect())
    }

    pub async fn get_pending_for(&self, role: ApproverRole) -> Result<Vec<LeaveApplication>, AppError> {
        let all = self.get_all().await?;
        Ok(all
            .into_iter()
            .filter(|a| a.current_approver == Some(role))
            .collect())
    }

    /// Applies a manager or HR decision and fires the matching notifications.
    /// Final approval also deducts the leave balance, after the new status is
    /// stored.
    pub async fn update_status(&self, id: u64, decision: Decision) -> Result<LeaveApplication, AppError> {
        let (previous, updated) = {
            let _guard = self.write_lock.lock().await;
            let mut applications: Vec<LeaveApplication> =
                self.storage.load(LEAVE_APPLICATIONS).await?;

            let application = applications
                .iter_mut()
                .find(|a| a.id == id)
                .ok_or_else(|| AppError::NotFound(format!("Leave request {id}")))?;

            let previous = application.apply(&decision, Utc::now())?;
            let updated = application.clone();
            self.storage.save(LEAVE_APPLICATIONS, &applications).await?;

            // status is stored before the balance changes
            if updated.status == LeaveStatus::HrApproved {
                if let Err(e) = self.deduct_balance(&updated).await {
                    error!(
                        error = %e,
                        leave_id = id,
                        employee_id = updated.employee.id,
                        days = updated.duration_days,
                        "Leave approved but balance was not deducted"
                    );
                }
            }
            (previous, updated)
        };

        info!(
            leave_id = id,
            from = %previous,
            to = %updated.status,
            by = %decision.decided_by,
            "Leave request status changed"
        );

        if let Err(e) = self
            .notifications
            .notify_all(workflow::transitioned(previous, &updated))
            .await
        {
            warn!(error = %e, leave_id = id, "Failed to send transition notifications");
        }

        Ok(updated)
    }

    // caller holds write_lock
    async fn deduct_balance(&self, application: &LeaveApplication) -> Result<(), AppError> {
        let mut employees: Vec<Employee> = self.storage.load(EMPLOYEES).await?;
        let Some(employee) = employees
            .iter_mut()
            .find(|e| e.id == application.employee.id)
        else {
            warn!(
                leave_id = application.id,
                employee_id = application.employee.id,
                "Approved leave for unknown employee, balance untouched"
            );
            return Ok(());
        };

        if let Some(remaining) = employee
            .balances
            .deduct(application.leave_type, application.duration_days)
        {
            debug!(
                employee_id = employee.id,
                leave_type = %application.leave_type,
                remaining,
                "Leave balance deducted"
            );
            self.storage.save(EMPLOYEES, &employees).await?;
        }
        Ok(())
    }

    async fn manager_audience(&self, employee_id: u64) -> Result<String, AppError> {
        let employees = self.list_employees().await?;
        let manager = employees
            .iter()
            .find(|e| e.id == employee_id)
            .and_then(|e| e.manager_id);
        Ok(manager.map_or_else(|| Role::Manager.to_string(), |id| id.to_string()))
    }

    /* =========================
    Employees
    ========================= */

    pub async fn create_employee(&self, new: NewEmployee) -> Result<Employee, AppError> {
        new.validate()?;

        let _guard = self.write_lock.lock().await;
        let mut employees: Vec<Employee> = self.storage.load(EMPLOYEES).await?;
        let employee = self.onboard(&mut employees, new)?;
        self.storage.save(EMPLOYEES, &employees).await?;

        info!(employee_id = employee.id, role = %employee.role, "Employee onboarded");
        Ok(employee)
    }

    /// Loads the seed employees, but only into an empty collection.
    pub async fn seed_employees(&self, seed: Vec<NewEmployee>) -> Result<usize, AppError> {
        let _guard = self.write_lock.lock().await;
        let mut employees: Vec<Employee> = self.storage.load(EMPLOYEES).await?;
        if !employees.is_empty() {
            debug!(existing = employees.len(), "Employees present, seed skipped");
            return Ok(0);
        }

        for new in seed {
            new.validate()?;
            self.onboard(&mut employees, new)?;
        }
        self.storage.save(EMPLOYEES, &employees).await?;

        info!(count = employees.len(), "Employees seeded");
        Ok(employees.len())
    }

    fn onboard(&self, employees: &mut Vec<Employee>, new: NewEmployee) -> Result<Employee, AppError> {
        let email = new.email.trim().to_lowercase();
        if employees.iter().any(|e| e.email == email) {
            return Err(AppError::Conflict(format!("Email {email} already registered")));
        }
        if let Some(manager_id) = new.manager_id {
            if !employees.iter().any(|e| e.id == manager_id) {
                return Err(AppError::Validation(format!(
                    "manager {manager_id} does not exist"
                )));
            }
        }

        let employee = Employee {
            id: next_id(employees.iter().map(|e| e.id)),
            name: new.name.trim().to_string(),
            email,
            department: new.department.trim().to_string(),
            role: new.role,
            manager_id: new.manager_id,
            password_hash: hash_password(&new.password)?,
            balances: new.balances.unwrap_or(self.default_balances),
        };
        employees.push(employee.clone());
        Ok(employee)
    }

    pub async fn list_employees(&self) -> Result<Vec<Employee>, AppError> {
        self.storage.load(EMPLOYEES).await
    }

    pub async fn get_employee(&self, id: u64) -> Result<Employee, AppError> {
        self.list_employees()
            .await?
            .into_iter()
            .find(|e| e.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Employee {id}")))
    }

    pub async fn find_employee_by_email(&self, email: &str) -> Result<Option<Employee>, AppError> {
        let email = email.trim().to_lowercase();
        let employees = self.list_employees().await?;
        Ok(employees.into_iter().find(|e| e.email == email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{
            leave_application::{LeaveType, Verdict},
            notification::audiences_for,
        },
        test_support::{date, seeded_store, seeded_store_on, submission},
    };

    fn decision(actor: ApproverRole, verdict: Verdict, notes: Option<&str>) -> Decision {
        Decision {
            actor,
            verdict,
            decided_by: "Reviewer".into(),
            notes: notes.map(String::from),
        }
    }

    #[test]
    fn ids_continue_after_the_largest() {
        assert_eq!(next_id(std::iter::empty()), 1);
        assert_eq!(next_id([3, 9, 4].into_iter()), 10);
    }

    #[actix_web::test]
    async fn submission_starts_pending_and_notifies_the_manager() {
        let (store, staff) = seeded_store().await;

        let first = store.create(submission(&staff.employee, "2024-01-10", "2024-01-12")).await.unwrap();
        let second = store.create(submission(&staff.employee, "2024-02-01", "2024-02-01")).await.unwrap();

        assert_eq!(first.duration_days, 3);
        assert_eq!(first.status, LeaveStatus::Pending);
        assert_eq!(first.current_approver, Some(ApproverRole::Manager));
        assert_eq!(second.id, first.id + 1);

        let inbox = store
            .notifications()
            .for_user(&audiences_for(staff.manager.id, Role::Manager))
            .await
            .unwrap();
        assert_eq!(inbox.len(), 2);
        assert!(inbox.iter().all(|n| n.user_id == staff.manager.id.to_string()));
    }

    #[actix_web::test]
    async fn invalid_submission_is_not_stored() {
        let (store, staff) = seeded_store().await;

        let result = store.create(submission(&staff.employee, "2024-01-12", "2024-01-10")).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(store.get_all().await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn manager_approval_then_hr_rejection_leaves_balance_alone() {
        let (store, staff) = seeded_store().await;
        let app = store.create(submission(&staff.employee, "2024-01-10", "2024-01-12")).await.unwrap();

        let app = store
            .update_status(app.id, decision(ApproverRole::Manager, Verdict::Approve, None))
            .await
            .unwrap();
        assert_eq!(app.status, LeaveStatus::HrPending);
        assert_eq!(store.get_pending_for(ApproverRole::Hr).await.unwrap().len(), 1);
        assert!(store.get_pending_for(ApproverRole::Manager).await.unwrap().is_empty());

        let app = store
            .update_status(
                app.id,
                decision(ApproverRole::Hr, Verdict::Reject, Some("insufficient coverage")),
            )
            .await
            .unwrap();
        assert_eq!(app.status, LeaveStatus::HrRejected);
        assert_eq!(app.hr_notes.as_deref(), Some("insufficient coverage"));

        let inbox = store
            .notifications()
            .for_user(&audiences_for(staff.employee.id, Role::Employee))
            .await
            .unwrap();
        assert_eq!(inbox.len(), 2);
        assert!(inbox[0].message.contains("insufficient coverage"));

        let hr_inbox = store
            .notifications()
            .for_user(&audiences_for(staff.hr.id, Role::HrAdmin))
            .await
            .unwrap();
        assert_eq!(hr_inbox.len(), 1);

        let employee = store.get_employee(staff.employee.id).await.unwrap();
        assert_eq!(employee.balances, staff.employee.balances);
    }

    #[actix_web::test]
    async fn final_approval_deducts_exactly_the_duration() {
        let (store, staff) = seeded_store().await;
        let app = store.create(submission(&staff.employee, "2024-01-10", "2024-01-12")).await.unwrap();

        store
            .update_status(app.id, decision(ApproverRole::Manager, Verdict::Approve, None))
            .await
            .unwrap();
        store
            .update_status(app.id, decision(ApproverRole::Hr, Verdict::Approve, None))
            .await
            .unwrap();

        let employee = store.get_employee(staff.employee.id).await.unwrap();
        assert_eq!(employee.balances.vacation, staff.employee.balances.vacation - 3);
        assert_eq!(employee.balances.sick, staff.employee.balances.sick);
    }

    #[actix_web::test]
    async fn deduction_stops_at_zero() {
        let (store, staff) = seeded_store().await;
        let mut long = submission(&staff.employee, "2024-01-01", "2024-03-31");
        long.leave_type = LeaveType::Personal;
        let app = store.create(long).await.unwrap();

        store
            .update_status(app.id, decision(ApproverRole::Manager, Verdict::Approve, None))
            .await
            .unwrap();
        store
            .update_status(app.id, decision(ApproverRole::Hr, Verdict::Approve, None))
            .await
            .unwrap();

        let employee = store.get_employee(staff.employee.id).await.unwrap();
        assert_eq!(employee.balances.personal, 0);
    }

    #[actix_web::test]
    async fn failed_status_write_leaves_balance_for_a_clean_retry() {
        let dir = tempfile::tempdir().unwrap();
        let (store, staff) = seeded_store_on(Storage::file(dir.path()).unwrap()).await;
        let app = store.create(submission(&staff.employee, "2024-01-10", "2024-01-12")).await.unwrap();
        store
            .update_status(app.id, decision(ApproverRole::Manager, Verdict::Approve, None))
            .await
            .unwrap();

        // a directory in the way of the temp file makes the write fail
        let blocker = dir.path().join("leave_applications.json.tmp");
        std::fs::create_dir(&blocker).unwrap();
        let result = store
            .update_status(app.id, decision(ApproverRole::Hr, Verdict::Approve, None))
            .await;
        assert!(matches!(result, Err(AppError::Internal(_))));
        assert_eq!(store.get(app.id).await.unwrap().status, LeaveStatus::HrPending);
        let employee = store.get_employee(staff.employee.id).await.unwrap();
        assert_eq!(employee.balances, staff.employee.balances);

        std::fs::remove_dir(&blocker).unwrap();
        store
            .update_status(app.id, decision(ApproverRole::Hr, Verdict::Approve, None))
            .await
            .unwrap();
        let employee = store.get_employee(staff.employee.id).await.unwrap();
        assert_eq!(employee.balances.vacation, staff.employee.balances.vacation - 3);
    }

    #[actix_web::test]
    async fn failed_balance_write_does_not_undo_approval() {
        let dir = tempfile::tempdir().unwrap();
        let (store, staff) = seeded_store_on(Storage::file(dir.path()).unwrap()).await;
        let app = store.create(submission(&staff.employee, "2024-01-10", "2024-01-12")).await.unwrap();
        store
            .update_status(app.id, decision(ApproverRole::Manager, Verdict::Approve, None))
            .await
            .unwrap();

        std::fs::create_dir(dir.path().join("employees.json.tmp")).unwrap();
        let approved = store
            .update_status(app.id, decision(ApproverRole::Hr, Verdict::Approve, None))
            .await
            .unwrap();
        assert_eq!(approved.status, LeaveStatus::HrApproved);
        assert_eq!(store.get(app.id).await.unwrap().status, LeaveStatus::HrApproved);

        let retry = store
            .update_status(app.id, decision(ApproverRole::Hr, Verdict::Approve, None))
            .await;
        assert!(matches!(retry, Err(AppError::InvalidTransition { .. })));
        let employee = store.get_employee(staff.employee.id).await.unwrap();
        assert_eq!(employee.balances, staff.employee.balances);
    }

    #[actix_web::test]
    async fn acting_twice_is_refused() {
        let (store, staff) = seeded_store().await;
        let app = store.create(submission(&staff.employee, "2024-01-10", "2024-01-12")).await.unwrap();

        store
            .update_status(app.id, decision(ApproverRole::Manager, Verdict::Reject, Some("busy")))
            .await
            .unwrap();
        let again = store
            .update_status(app.id, decision(ApproverRole::Manager, Verdict::Reject, Some("busy")))
            .await;

        assert!(matches!(
            again,
            Err(AppError::InvalidTransition {
                status: LeaveStatus::Rejected,
                ..
            })
        ));
        let inbox = store
            .notifications()
            .for_user(&audiences_for(staff.employee.id, Role::Employee))
            .await
            .unwrap();
        assert_eq!(inbox.len(), 1);
    }

    #[actix_web::test]
    async fn unknown_application_is_not_found() {
        let (store, _) = seeded_store().await;
        let result = store
            .update_status(42, decision(ApproverRole::Manager, Verdict::Approve, None))
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[actix_web::test]
    async fn reads_are_scoped_by_employee() {
        let (store, staff) = seeded_store().await;
        store.create(submission(&staff.employee, "2024-01-10", "2024-01-12")).await.unwrap();
        store.create(submission(&staff.manager, "2024-01-15", "2024-01-16")).await.unwrap();

        assert_eq!(store.get_by_employee(staff.employee.id).await.unwrap().len(), 1);
        assert_eq!(store.get_all().await.unwrap().len(), 2);
        assert_eq!(
            store.get(2).await.unwrap().start_date,
            date("2024-01-15")
        );
    }

    #[actix_web::test]
    async fn duplicate_email_is_a_conflict() {
        let (store, staff) = seeded_store().await;
        let result = store
            .create_employee(NewEmployee {
                name: "Copy".into(),
                email: staff.employee.email.to_uppercase(),
                department: "Ops".into(),
                role: Role::Employee,
                manager_id: None,
                password: "password123".into(),
                balances: None,
            })
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[actix_web::test]
    async fn seeding_only_fills_an_empty_collection() {
        let (store, _) = seeded_store().await;
        let seeded = store
            .seed_employees(vec![NewEmployee {
                name: "Late".into(),
                email: "late@company.com".into(),
                department: "Ops".into(),
                role: Role::Employee,
                manager_id: None,
                password: "password123".into(),
                balances: None,
            }])
            .await
            .unwrap();
        assert_eq!(seeded, 0);
        assert!(store.find_employee_by_email("late@company.com").await.unwrap().is_none());
    }
}
