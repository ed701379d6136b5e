pub mod employee;
pub mod leave_application;
pub mod notification;
pub mod role;
