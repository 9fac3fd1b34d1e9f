use crate::{
    api::error::ApiError,
    model::employee::{Employee, EmployeeFields},
    storage::Storage,
    utils::dates::parse_date,
};
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployee {
    #[schema(example = "Asha")]
    pub name: String,
    #[schema(example = "Eng")]
    pub department: String,
    #[schema(example = "SWE")]
    pub role: String,
    #[schema(example = "a@x.com", format = "email")]
    pub email: String,
    #[schema(example = "555")]
    pub phone: String,
    #[schema(example = "2024-01-15", format = "date")]
    pub joining_date: String,
}

/// Full replacement of an employee. Omitted text fields are cleared.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployee {
    #[schema(example = "Asha")]
    pub name: Option<String>,
    #[schema(example = "Eng")]
    pub department: Option<String>,
    #[schema(example = "Staff SWE")]
    pub role: Option<String>,
    #[schema(example = "a@x.com", format = "email")]
    pub email: Option<String>,
    #[schema(example = "555")]
    pub phone: Option<String>,
    #[schema(example = "2024-01-15", format = "date")]
    pub joining_date: String,
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/employees",
    request_body = CreateEmployee,
    responses(
        (status = 200, description = "Employee created", body = Employee),
        (status = 400, description = "Malformed body or joiningDate", body = Object,
         example = json!({
            "error": "joiningDate must be a date in YYYY-MM-DD format"
        })),
        (status = 500, description = "Internal server error", body = Object, example = json!({
            "error": "Something went wrong"
        }))
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    storage: web::Data<dyn Storage>,
    payload: web::Json<CreateEmployee>,
) -> Result<HttpResponse, ApiError> {
    let payload = payload.into_inner();
    let joining_date = parse_date("joiningDate", &payload.joining_date)
        .inspect_err(|e| error!(error = %e, "Failed to create employee"))?;

    let employee = storage
        .create_employee(EmployeeFields {
            name: Some(payload.name),
            department: Some(payload.department),
            role: Some(payload.role),
            email: Some(payload.email),
            phone: Some(payload.phone),
            joining_date,
        })
        .await
        .inspect_err(|e| error!(error = %e, "Failed to create employee"))?;

    info!(employee_id = employee.id, "Employee created");
    Ok(HttpResponse::Ok().json(employee))
}

/// List Employees
#[utoipa::path(
    get,
    path = "/employees",
    responses(
        (status = 200, description = "All employees", body = [Employee]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn list_employees(storage: web::Data<dyn Storage>) -> Result<HttpResponse, ApiError> {
    let employees = storage
        .list_employees()
        .await
        .inspect_err(|e| error!(error = %e, "Failed to fetch employees"))?;
    debug!(count = employees.len(), "Fetched employees");
    Ok(HttpResponse::Ok().json(employees))
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/employees/{id}",
    params(
        ("id" = u64, Path, description = "Employee ID")
    ),
    request_body = UpdateEmployee,
    responses(
        (status = 200, description = "Employee replaced", body = Employee),
        (status = 400, description = "Malformed body or joiningDate"),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "error": "employee not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn update_employee(
    storage: web::Data<dyn Storage>,
    path: web::Path<u64>,
    payload: web::Json<UpdateEmployee>,
) -> Result<HttpResponse, ApiError> {
    let employee_id = path.into_inner();
    let payload = payload.into_inner();
    let joining_date = parse_date("joiningDate", &payload.joining_date)
        .inspect_err(|e| error!(error = %e, employee_id, "Failed to update employee"))?;

    let employee = storage
        .update_employee(
            employee_id,
            EmployeeFields {
                name: payload.name,
                department: payload.department,
                role: payload.role,
                email: payload.email,
                phone: payload.phone,
                joining_date,
            },
        )
        .await
        .inspect_err(|e| error!(error = %e, employee_id, "Failed to update employee"))?;

    info!(employee_id, "Employee updated");
    Ok(HttpResponse::Ok().json(employee))
}

/// Delete Employee
#[utoipa::path(
    delete,
    path = "/employees/{id}",
    params(
        ("id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee deleted", body = Object, example = json!({
            "message": "Employee deleted successfully"
        })),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "error": "employee not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn delete_employee(
    storage: web::Data<dyn Storage>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let employee_id = path.into_inner();

    storage
        .delete_employee(employee_id)
        .await
        .inspect_err(|e| error!(error = %e, employee_id, "Failed to delete employee"))?;

    info!(employee_id, "Employee deleted");
    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee deleted successfully"
    })))
}
