use serde::Serialize;
use strum::IntoEnumIterator;
use utoipa::ToSchema;

use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType};

/// Yearly allowance per leave type, in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveAllowances {
    pub casual: u32,
    pub sick: u32,
    pub paid: u32,
}

impl Default for LeaveAllowances {
    fn default() -> Self {
        Self {
            casual: 12,
            sick: 10,
            paid: 15,
        }
    }
}

impl LeaveAllowances {
    pub fn for_type(&self, leave_type: LeaveType) -> u32 {
        match leave_type {
            LeaveType::Casual => self.casual,
            LeaveType::Sick => self.sick,
            LeaveType::Paid => self.paid,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveBalance {
    pub leave_type: LeaveType,
    #[schema(example = 12)]
    pub allowance: i64,
    #[schema(example = 3)]
    pub approved_days: i64,
    #[schema(example = 2)]
    pub pending_days: i64,
    /// `allowance - approved_days - pending_days`; negative when overdrawn.
    #[schema(example = 7)]
    pub remaining: i64,
}

/// Read-time projection over one employee's history. Rejected requests
/// consume nothing; pending ones are held against the balance.
pub fn project(allowances: &LeaveAllowances, history: &[LeaveRequest]) -> Vec<LeaveBalance> {
    LeaveType::iter()
        .map(|leave_type| {
            let days_with = |status: LeaveStatus| -> i64 {
                history
                    .iter()
                    .filter(|l| l.leave_type == leave_type && l.status == status)
                    .map(LeaveRequest::days)
                    .sum()
            };
            let allowance = i64::from(allowances.for_type(leave_type));
            let approved_days = days_with(LeaveStatus::Approved);
            let pending_days = days_with(LeaveStatus::Pending);

            LeaveBalance {
                leave_type,
                allowance,
                approved_days,
                pending_days,
                remaining: allowance - approved_days - pending_days,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn leave(leave_type: LeaveType, from: u32, to: u32, status: LeaveStatus) -> LeaveRequest {
        LeaveRequest {
            id: format!("{leave_type}-{from}"),
            employee_id: "e1".into(),
            leave_type,
            from_date: NaiveDate::from_ymd_opt(2025, 8, from).unwrap(),
            to_date: NaiveDate::from_ymd_opt(2025, 8, to).unwrap(),
            reason: String::new(),
            status,
            applied_at: Utc::now(),
        }
    }

    #[test]
    fn balance_equals_allowance_minus_consumed_days() {
        let history = vec![
            leave(LeaveType::Sick, 1, 3, LeaveStatus::Approved),
            leave(LeaveType::Sick, 10, 10, LeaveStatus::Pending),
            leave(LeaveType::Sick, 20, 25, LeaveStatus::Rejected),
            leave(LeaveType::Casual, 5, 7, LeaveStatus::Pending),
        ];

        let balances = project(&LeaveAllowances::default(), &history);
        let sick = balances.iter().find(|b| b.leave_type == LeaveType::Sick).unwrap();
        let casual = balances.iter().find(|b| b.leave_type == LeaveType::Casual).unwrap();
        let paid = balances.iter().find(|b| b.leave_type == LeaveType::Paid).unwrap();

        assert_eq!((sick.approved_days, sick.pending_days, sick.remaining), (3, 1, 6));
        assert_eq!((casual.approved_days, casual.pending_days, casual.remaining), (0, 3, 9));
        assert_eq!(paid.remaining, 15);
    }

    #[test]
    fn overdrawn_balance_goes_negative() {
        let allowances = LeaveAllowances {
            casual: 1,
            sick: 0,
            paid: 0,
        };
        let history = vec![leave(LeaveType::Casual, 1, 4, LeaveStatus::Approved)];

        let casual = project(&allowances, &history)
            .into_iter()
            .find(|b| b.leave_type == LeaveType::Casual)
            .unwrap();
        assert_eq!(casual.remaining, -3);
    }
}
