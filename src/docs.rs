use crate::api::employee::{CreateEmployee, UpdateEmployee};
use crate::api::leave::{CreateLeave, UpdateLeaveStatus};
use crate::auth::handlers::{
    LoginData, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse,
};
use crate::model::employee::Employee;
use crate::model::leave::{Leave, LeaveStatus, LeaveWithEmployee};
use crate::model::user::User;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRMS API",
        version = "1.0.0",
        description = r#"
## Human Resource Management System

Minimal HR backend:
- **Employees**: create, list, replace and delete employee records
- **Leave**: apply for leave, list requests with their employee, approve or reject
- **Auth**: register users and log in for a one-hour bearer token

### Errors
Failures return `{"error": "..."}` with 400 (validation), 404 (unknown id),
409 (conflicting state) or 500. Registration and login keep their own envelopes.
"#,
    ),
    paths(
        crate::api::health::index,
        crate::api::health::health,

        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::leave::create_leave,
        crate::api::leave::list_leaves,
        crate::api::leave::update_leave_status,

        crate::auth::handlers::register,
        crate::auth::handlers::login
    ),
    components(
        schemas(
            Employee,
            CreateEmployee,
            UpdateEmployee,
            Leave,
            LeaveStatus,
            LeaveWithEmployee,
            CreateLeave,
            UpdateLeaveStatus,
            User,
            RegisterRequest,
            RegisterResponse,
            LoginRequest,
            LoginResponse,
            LoginData
        )
    ),
    tags(
        (name = "Health", description = "Liveness and storage checks"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Leave", description = "Leave management APIs"),
        (name = "Auth", description = "Registration and login"),
    )
)]
pub struct ApiDoc;
