use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(
    example = json!({
        "id": 1,
        "name": "Asha",
        "department": "Eng",
        "role": "SWE",
        "email": "a@x.com",
        "phone": "555",
        "joiningDate": "2024-01-15"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Asha", nullable = true)]
    pub name: Option<String>,

    #[schema(example = "Eng", nullable = true)]
    pub department: Option<String>,

    #[schema(example = "SWE", nullable = true)]
    pub role: Option<String>,

    #[schema(example = "a@x.com", nullable = true)]
    pub email: Option<String>,

    #[schema(example = "555", nullable = true)]
    pub phone: Option<String>,

    #[schema(example = "2024-01-15", value_type = String, format = "date")]
    pub joining_date: NaiveDate,
}

/// Column values written on create and on a full-replace update.
#[derive(Debug, Clone)]
pub struct EmployeeFields {
    pub name: Option<String>,
    pub department: Option<String>,
    pub role: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub joining_date: NaiveDate,
}

impl EmployeeFields {
    pub fn into_employee(self, id: u64) -> Employee {
        Employee {
            id,
            name: self.name,
            department: self.department,
            role: self.role,
            email: self.email,
            phone: self.phone,
            joining_date: self.joining_date,
        }
    }
}
