use anyhow::anyhow;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::MySqlPool;

use super::{Storage, StoreError, StoreResult};
use crate::model::{
    employee::{Employee, EmployeeFields},
    leave::{Leave, LeaveStatus, LeaveWithEmployee, NewLeave},
    user::{NewUser, User},
};

const EMPLOYEE_COLUMNS: &str = "id, name, department, role, email, phone, joining_date";
const LEAVE_COLUMNS: &str = "id, employee_id, start_date, end_date, leave_type, reason, status";
const USER_COLUMNS: &str = "id, name, email, password, role";

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return StoreError::Conflict(db_err.message().to_string());
            }
            if db_err.is_foreign_key_violation() {
                return StoreError::InvalidReference(db_err.message().to_string());
            }
        }
        StoreError::Unexpected(e.into())
    }
}

#[derive(sqlx::FromRow)]
struct LeaveRow {
    id: u64,
    employee_id: u64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    leave_type: String,
    reason: String,
    status: String,
}

impl TryFrom<LeaveRow> for Leave {
    type Error = StoreError;

    fn try_from(row: LeaveRow) -> StoreResult<Self> {
        Ok(Leave {
            id: row.id,
            employee_id: row.employee_id,
            start_date: row.start_date,
            end_date: row.end_date,
            leave_type: row.leave_type,
            reason: row.reason,
            status: parse_status(row.id, &row.status)?,
        })
    }
}

/// Flat result of the leaves/employees join.
#[derive(sqlx::FromRow)]
struct LeaveEmployeeRow {
    id: u64,
    employee_id: u64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    leave_type: String,
    reason: String,
    status: String,
    employee_name: Option<String>,
    employee_department: Option<String>,
    employee_role: Option<String>,
    employee_email: Option<String>,
    employee_phone: Option<String>,
    employee_joining_date: NaiveDate,
}

impl TryFrom<LeaveEmployeeRow> for LeaveWithEmployee {
    type Error = StoreError;

    fn try_from(row: LeaveEmployeeRow) -> StoreResult<Self> {
        Ok(LeaveWithEmployee {
            leave: Leave {
                id: row.id,
                employee_id: row.employee_id,
                start_date: row.start_date,
                end_date: row.end_date,
                leave_type: row.leave_type,
                reason: row.reason,
                status: parse_status(row.id, &row.status)?,
            },
            employee: Employee {
                id: row.employee_id,
                name: row.employee_name,
                department: row.employee_department,
                role: row.employee_role,
                email: row.employee_email,
                phone: row.employee_phone,
                joining_date: row.employee_joining_date,
            },
        })
    }
}

fn parse_status(leave_id: u64, raw: &str) -> StoreResult<LeaveStatus> {
    raw.parse().map_err(|_| {
        StoreError::Unexpected(anyhow!("leave {leave_id} has unknown status {raw:?}"))
    })
}

pub struct MySqlStorage {
    pool: MySqlPool,
}

impl MySqlStorage {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn fetch_employee(&self, id: u64) -> StoreResult<Employee> {
        sqlx::query_as::<_, Employee>(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound("employee"))
    }

    async fn fetch_leave(&self, id: u64) -> StoreResult<Leave> {
        sqlx::query_as::<_, LeaveRow>(&format!("SELECT {LEAVE_COLUMNS} FROM leaves WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound("leave"))?
            .try_into()
    }

    async fn fetch_user(&self, id: u64) -> StoreResult<User> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound("user"))
    }
}

#[async_trait]
impl Storage for MySqlStorage {
    async fn create_employee(&self, fields: EmployeeFields) -> StoreResult<Employee> {
        let result = sqlx::query(
            r#"
            INSERT INTO employees (name, department, role, email, phone, joining_date)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(fields.name)
        .bind(fields.department)
        .bind(fields.role)
        .bind(fields.email)
        .bind(fields.phone)
        .bind(fields.joining_date)
        .execute(&self.pool)
        .await?;

        self.fetch_employee(result.last_insert_id()).await
    }

    async fn list_employees(&self) -> StoreResult<Vec<Employee>> {
        let employees = sqlx::query_as::<_, Employee>(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(employees)
    }

    async fn update_employee(&self, id: u64, fields: EmployeeFields) -> StoreResult<Employee> {
        // MySQL reports changed rows, not matched rows, so existence is
        // decided by the re-select below.
        sqlx::query(
            r#"
            UPDATE employees
            SET name = ?, department = ?, role = ?, email = ?, phone = ?, joining_date = ?
            WHERE id = ?
            "#,
        )
        .bind(fields.name)
        .bind(fields.department)
        .bind(fields.role)
        .bind(fields.email)
        .bind(fields.phone)
        .bind(fields.joining_date)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.fetch_employee(id).await
    }

    async fn delete_employee(&self, id: u64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM employees WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("employee"));
        }
        Ok(())
    }

    async fn create_leave(&self, leave: NewLeave) -> StoreResult<Leave> {
        let result = sqlx::query(
            r#"
            INSERT INTO leaves (employee_id, start_date, end_date, leave_type, reason, status)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(leave.employee_id)
        .bind(leave.start_date)
        .bind(leave.end_date)
        .bind(leave.leave_type)
        .bind(leave.reason)
        .bind(LeaveStatus::Pending.to_string())
        .execute(&self.pool)
        .await?;

        self.fetch_leave(result.last_insert_id()).await
    }

    async fn list_leaves(&self) -> StoreResult<Vec<LeaveWithEmployee>> {
        sqlx::query_as::<_, LeaveEmployeeRow>(
            r#"
            SELECT
                l.id,
                l.employee_id,
                l.start_date,
                l.end_date,
                l.leave_type,
                l.reason,
                l.status,
                e.name AS employee_name,
                e.department AS employee_department,
                e.role AS employee_role,
                e.email AS employee_email,
                e.phone AS employee_phone,
                e.joining_date AS employee_joining_date
            FROM leaves l
            INNER JOIN employees e ON e.id = l.employee_id
            ORDER BY l.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(LeaveWithEmployee::try_from)
        .collect()
    }

    async fn transition_leave_status(&self, id: u64, next: LeaveStatus) -> StoreResult<Leave> {
        let current = self.fetch_leave(id).await?.status;
        if !current.can_transition_to(next) {
            return Err(StoreError::Conflict(format!(
                "leave {id} is {current} and cannot become {next}"
            )));
        }

        // Guarded on the status we just read so two concurrent decisions
        // cannot both win.
        let result = sqlx::query("UPDATE leaves SET status = ? WHERE id = ? AND status = ?")
            .bind(next.to_string())
            .bind(id)
            .bind(current.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Conflict(format!(
                "leave {id} was changed by another request"
            )));
        }

        self.fetch_leave(id).await
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let result =
            sqlx::query("INSERT INTO users (name, email, password, role) VALUES (?, ?, ?, ?)")
                .bind(user.name)
                .bind(user.email)
                .bind(user.password_hash)
                .bind(user.role)
                .execute(&self.pool)
                .await?;

        self.fetch_user(result.last_insert_id()).await
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user =
            sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        Ok(user)
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }

    fn backend_name(&self) -> &'static str {
        "mysql"
    }
}
