use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum LeaveType {
    #[serde(rename = "Casual Leave")]
    #[strum(to_string = "Casual Leave", serialize = "Casual")]
    Casual,
    #[serde(rename = "Sick Leave")]
    #[strum(to_string = "Sick Leave", serialize = "Sick")]
    Sick,
    #[serde(rename = "Paid Leave")]
    #[strum(to_string = "Paid Leave", serialize = "Paid")]
    Paid,
}

/// `Pending` is the only non-terminal state; see [`LeaveStatus::is_terminal`].
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

impl LeaveStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, LeaveStatus::Approved | LeaveStatus::Rejected)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    #[schema(example = "0b7d3c0e-2a55-4d57-9d0a-0a3b8a1c2f10")]
    pub id: String,
    /// Opaque id of the owning employee principal; fixed at creation.
    #[schema(example = "5f0c6c1e-6f43-4bd4-9a39-1f0cf1a3c1f2")]
    pub employee_id: String,
    pub leave_type: LeaveType,
    #[schema(example = "2025-08-01", format = "date", value_type = String)]
    pub from_date: NaiveDate,
    #[schema(example = "2025-08-03", format = "date", value_type = String)]
    pub to_date: NaiveDate,
    #[schema(example = "Fever and rest needed")]
    pub reason: String,
    pub status: LeaveStatus,
    #[schema(example = "2025-07-30T09:12:00Z", format = "date-time", value_type = String)]
    pub applied_at: DateTime<Utc>,
}

impl LeaveRequest {
    /// Calendar days covered, both ends inclusive.
    pub fn days(&self) -> i64 {
        (self.to_date - self.from_date).num_days() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leave_type_accepts_labels_and_short_forms() {
        assert_eq!("Sick Leave".parse::<LeaveType>().unwrap(), LeaveType::Sick);
        assert_eq!("casual".parse::<LeaveType>().unwrap(), LeaveType::Casual);
        assert_eq!("PAID LEAVE".parse::<LeaveType>().unwrap(), LeaveType::Paid);
        assert!("Vacation".parse::<LeaveType>().is_err());
        assert_eq!(LeaveType::Casual.to_string(), "Casual Leave");
    }

    #[test]
    fn only_decided_statuses_are_terminal() {
        assert!(!LeaveStatus::Pending.is_terminal());
        assert!(LeaveStatus::Approved.is_terminal());
        assert!(LeaveStatus::Rejected.is_terminal());
    }

    #[test]
    fn days_are_inclusive() {
        let leave = LeaveRequest {
            id: "l1".into(),
            employee_id: "e1".into(),
            leave_type: LeaveType::Sick,
            from_date: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
            to_date: NaiveDate::from_ymd_opt(2025, 8, 3).unwrap(),
            reason: "Fever".into(),
            status: LeaveStatus::Pending,
            applied_at: Utc::now(),
        };
        assert_eq!(leave.days(), 3);
        assert_eq!(
            serde_json::to_value(&leave).unwrap()["leaveType"],
            "Sick Leave"
        );
    }
}
