//! In-memory storage backend.
//!
//! Not durable: everything is lost on restart. Used for local runs
//! (`STORAGE_BACKEND=memory`) and by the handler tests. Applies the same
//! rules the MySQL schema enforces: unique user emails (case-insensitive, as
//! with the default MySQL collation), leave rows must reference an existing
//! employee, and deleting an employee cascades to its leaves.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::anyhow;
use async_trait::async_trait;

use super::{Storage, StoreError, StoreResult};
use crate::model::{
    employee::{Employee, EmployeeFields},
    leave::{Leave, LeaveStatus, LeaveWithEmployee, NewLeave},
    user::{NewUser, User},
};

#[derive(Default)]
struct Tables {
    employees: BTreeMap<u64, Employee>,
    leaves: BTreeMap<u64, Leave>,
    users: BTreeMap<u64, User>,
    last_employee_id: u64,
    last_leave_id: u64,
    last_user_id: u64,
}

#[derive(Default)]
pub struct MemoryStorage {
    tables: RwLock<Tables>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| StoreError::Unexpected(anyhow!("memory store lock poisoned")))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| StoreError::Unexpected(anyhow!("memory store lock poisoned")))
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn create_employee(&self, fields: EmployeeFields) -> StoreResult<Employee> {
        let mut tables = self.write()?;
        tables.last_employee_id += 1;
        let employee = fields.into_employee(tables.last_employee_id);
        tables.employees.insert(employee.id, employee.clone());
        Ok(employee)
    }

    async fn list_employees(&self) -> StoreResult<Vec<Employee>> {
        Ok(self.read()?.employees.values().cloned().collect())
    }

    async fn update_employee(&self, id: u64, fields: EmployeeFields) -> StoreResult<Employee> {
        let mut tables = self.write()?;
        let slot = tables
            .employees
            .get_mut(&id)
            .ok_or(StoreError::NotFound("employee"))?;
        *slot = fields.into_employee(id);
        Ok(slot.clone())
    }

    async fn delete_employee(&self, id: u64) -> StoreResult<()> {
        let mut tables = self.write()?;
        if tables.employees.remove(&id).is_none() {
            return Err(StoreError::NotFound("employee"));
        }
        tables.leaves.retain(|_, leave| leave.employee_id != id);
        Ok(())
    }

    async fn create_leave(&self, leave: NewLeave) -> StoreResult<Leave> {
        let mut tables = self.write()?;
        if !tables.employees.contains_key(&leave.employee_id) {
            return Err(StoreError::InvalidReference(format!(
                "employee {} does not exist",
                leave.employee_id
            )));
        }
        tables.last_leave_id += 1;
        let leave = leave.into_leave(tables.last_leave_id);
        tables.leaves.insert(leave.id, leave.clone());
        Ok(leave)
    }

    async fn list_leaves(&self) -> StoreResult<Vec<LeaveWithEmployee>> {
        let tables = self.read()?;
        tables
            .leaves
            .values()
            .map(|leave| -> StoreResult<LeaveWithEmployee> {
                let employee = tables.employees.get(&leave.employee_id).ok_or_else(|| {
                    StoreError::Unexpected(anyhow!(
                        "leave {} references missing employee {}",
                        leave.id,
                        leave.employee_id
                    ))
                })?;
                Ok(LeaveWithEmployee {
                    leave: leave.clone(),
                    employee: employee.clone(),
                })
            })
            .collect()
    }

    async fn transition_leave_status(&self, id: u64, next: LeaveStatus) -> StoreResult<Leave> {
        let mut tables = self.write()?;
        let leave = tables
            .leaves
            .get_mut(&id)
            .ok_or(StoreError::NotFound("leave"))?;
        if !leave.status.can_transition_to(next) {
            return Err(StoreError::Conflict(format!(
                "leave {} is {} and cannot become {}",
                id, leave.status, next
            )));
        }
        leave.status = next;
        Ok(leave.clone())
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.write()?;
        if tables
            .users
            .values()
            .any(|existing| existing.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(StoreError::Conflict(format!(
                "email {} is already registered",
                user.email
            )));
        }
        tables.last_user_id += 1;
        let user = user.into_user(tables.last_user_id);
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn health_check(&self) -> StoreResult<()> {
        self.read().map(|_| ())
    }

    async fn close(&self) {}

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
