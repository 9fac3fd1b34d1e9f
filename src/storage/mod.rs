//! Storage client seam shared by every handler.
//!
//! Handlers only see `dyn Storage`; the concrete backend is picked once at
//! startup and injected as `web::Data<dyn Storage>`.

use async_trait::async_trait;
use derive_more::Display;

use crate::model::{
    employee::{Employee, EmployeeFields},
    leave::{Leave, LeaveStatus, LeaveWithEmployee, NewLeave},
    user::{NewUser, User},
};

pub mod memory;
pub mod mysql;

#[derive(Debug, Display)]
pub enum StoreError {
    #[display(fmt = "{} not found", _0)]
    NotFound(&'static str),
    #[display(fmt = "conflict: {}", _0)]
    Conflict(String),
    #[display(fmt = "invalid reference: {}", _0)]
    InvalidReference(String),
    #[display(fmt = "{}", _0)]
    Unexpected(anyhow::Error),
}

impl std::error::Error for StoreError {}

impl From<anyhow::Error> for StoreError {
    fn from(e: anyhow::Error) -> Self {
        StoreError::Unexpected(e)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Storage: Send + Sync {
    async fn create_employee(&self, fields: EmployeeFields) -> StoreResult<Employee>;
    async fn list_employees(&self) -> StoreResult<Vec<Employee>>;
    /// Overwrites every column; absent optional fields become null.
    async fn update_employee(&self, id: u64, fields: EmployeeFields) -> StoreResult<Employee>;
    /// Also removes the employee's leave requests.
    async fn delete_employee(&self, id: u64) -> StoreResult<()>;

    async fn create_leave(&self, leave: NewLeave) -> StoreResult<Leave>;
    async fn list_leaves(&self) -> StoreResult<Vec<LeaveWithEmployee>>;
    /// Moves a leave request to `next`, failing with `Conflict` when the
    /// current status does not allow it.
    async fn transition_leave_status(&self, id: u64, next: LeaveStatus) -> StoreResult<Leave>;

    /// Fails with `Conflict` when the email is already registered.
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn health_check(&self) -> StoreResult<()>;
    async fn close(&self);
    fn backend_name(&self) -> &'static str;
}
