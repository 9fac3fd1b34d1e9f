use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use super::employee::Employee;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(ascii_case_insensitive)]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

impl LeaveStatus {
    /// Only a pending request can be decided, and only once.
    pub fn can_transition_to(self, next: LeaveStatus) -> bool {
        matches!(
            (self, next),
            (LeaveStatus::Pending, LeaveStatus::Approved)
                | (LeaveStatus::Pending, LeaveStatus::Rejected)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Leave {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1)]
    pub employee_id: u64,
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-03", value_type = String, format = "date")]
    pub end_date: NaiveDate,
    #[schema(example = "Sick")]
    pub leave_type: String,
    #[schema(example = "Flu")]
    pub reason: String,
    pub status: LeaveStatus,
}

/// A leave row together with the employee it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LeaveWithEmployee {
    #[serde(flatten)]
    pub leave: Leave,
    pub employee: Employee,
}

#[derive(Debug, Clone)]
pub struct NewLeave {
    pub employee_id: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub leave_type: String,
    pub reason: String,
}

impl NewLeave {
    /// New requests always start out pending.
    pub fn into_leave(self, id: u64) -> Leave {
        Leave {
            id,
            employee_id: self.employee_id,
            start_date: self.start_date,
            end_date: self.end_date,
            leave_type: self.leave_type,
            reason: self.reason,
            status: LeaveStatus::Pending,
        }
    }
}
