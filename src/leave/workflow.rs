use std::{collections::HashMap, sync::Arc};

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use super::balance::{self, LeaveAllowances, LeaveBalance};
use crate::{
    auth::gateway::AuthGateway,
    error::AppError,
    model::{
        employee::EmployeeRef,
        leave_request::{LeaveRequest, LeaveStatus, LeaveType},
        principal::PrincipalSummary,
        role::Role,
    },
    store::{LeaveStore, PrincipalStore},
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LeaveInput {
    #[schema(example = "Sick Leave")]
    pub leave_type: String,
    #[schema(example = "2025-08-01", format = "date", value_type = String)]
    pub from_date: NaiveDate,
    #[schema(example = "2025-08-03", format = "date", value_type = String)]
    pub to_date: NaiveDate,
    #[serde(default, alias = "description")]
    #[schema(example = "Fever and rest needed")]
    pub reason: String,
    /// Tolerated for older clients and ignored: the owner is always the caller.
    #[serde(default)]
    #[schema(nullable = true)]
    pub employee_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveView {
    #[serde(flatten)]
    pub leave: LeaveRequest,
    /// `None` when the owner has since been deleted.
    pub employee: Option<EmployeeRef>,
}

/// The leave-request lifecycle:
///
/// ```text
///  submit()            update_status(Approved)
/// ---------> Pending --------------------------> Approved
///               |
///               +----- update_status(Rejected) -> Rejected
/// ```
///
/// Only the owning employee creates a request, only an admin moves it, and it
/// moves at most once. The move itself is a compare-and-set in the store, so
/// two admins racing on one request yield one winner and one
/// `InvalidTransition`.
pub struct LeaveWorkflow {
    leaves: Arc<dyn LeaveStore>,
    principals: Arc<dyn PrincipalStore>,
    allowances: LeaveAllowances,
}

impl LeaveWorkflow {
    pub fn new(
        leaves: Arc<dyn LeaveStore>,
        principals: Arc<dyn PrincipalStore>,
        allowances: LeaveAllowances,
    ) -> Self {
        Self {
            leaves,
            principals,
            allowances,
        }
    }

    #[instrument(name = "leave_submit", skip(self, requester, input), fields(employee = %requester.id))]
    pub async fn submit(
        &self,
        requester: &PrincipalSummary,
        input: LeaveInput,
    ) -> Result<LeaveRequest, AppError> {
        AuthGateway::require_role(requester, Role::Employee)?;

        if input.from_date > input.to_date {
            return Err(AppError::InvalidDateRange);
        }

        let leave_type = input
            .leave_type
            .trim()
            .parse::<LeaveType>()
            .map_err(|_| AppError::InvalidLeaveType(input.leave_type.clone()))?;

        if input
            .employee_id
            .as_deref()
            .is_some_and(|claimed| claimed != requester.id)
        {
            info!("Ignoring employeeId supplied in leave payload");
        }

        let leave = LeaveRequest {
            id: Uuid::new_v4().to_string(),
            employee_id: requester.id.clone(),
            leave_type,
            from_date: input.from_date,
            to_date: input.to_date,
            reason: input.reason.trim().to_string(),
            status: LeaveStatus::Pending,
            applied_at: Utc::now(),
        };

        self.leaves.insert_leave(&leave).await?;

        info!(leave_id = %leave.id, leave_type = %leave.leave_type, "Leave request submitted");
        Ok(leave)
    }

    /// Admin view over every request, newest first. `filter` is a
    /// case-insensitive substring matched against the owner's id, employee
    /// id and name, and the leave type label.
    pub async fn list_all(
        &self,
        requester: &PrincipalSummary,
        filter: Option<&str>,
    ) -> Result<Vec<LeaveView>, AppError> {
        AuthGateway::require_role(requester, Role::Admin)?;

        let leaves = self.leaves.list_leaves().await?;

        let mut owners: HashMap<String, Option<EmployeeRef>> = HashMap::new();
        let mut views = Vec::with_capacity(leaves.len());
        for leave in leaves {
            if !owners.contains_key(&leave.employee_id) {
                let owner = self
                    .principals
                    .find_employee_by_id(&leave.employee_id)
                    .await?
                    .map(EmployeeRef::from);
                owners.insert(leave.employee_id.clone(), owner);
            }
            let employee = owners.get(&leave.employee_id).cloned().flatten();
            views.push(LeaveView { leave, employee });
        }

        let needle = filter
            .map(|f| f.trim().to_lowercase())
            .filter(|f| !f.is_empty());

        Ok(match needle {
            Some(needle) => views
                .into_iter()
                .filter(|view| matches_filter(view, &needle))
                .collect(),
            None => views,
        })
    }

    pub async fn list_mine(
        &self,
        requester: &PrincipalSummary,
    ) -> Result<Vec<LeaveRequest>, AppError> {
        AuthGateway::require_role(requester, Role::Employee)?;

        Ok(self.leaves.list_leaves_by_employee(&requester.id).await?)
    }

    /// Admins read any request; employees only their own. Someone else's
    /// request reads as missing rather than forbidden.
    pub async fn get(
        &self,
        requester: &PrincipalSummary,
        id: &str,
    ) -> Result<LeaveRequest, AppError> {
        let leave = self
            .leaves
            .find_leave(id)
            .await?
            .filter(|l| requester.role == Role::Admin || l.employee_id == requester.id)
            .ok_or_else(|| AppError::NotFound("Leave request not found".into()))?;

        Ok(leave)
    }

    #[instrument(name = "leave_update_status", skip(self, requester), fields(admin = %requester.id))]
    pub async fn update_status(
        &self,
        requester: &PrincipalSummary,
        id: &str,
        new_status: LeaveStatus,
    ) -> Result<LeaveRequest, AppError> {
        AuthGateway::require_role(requester, Role::Admin)?;

        let current = self
            .leaves
            .find_leave(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Leave request not found".into()))?;

        if current.status.is_terminal() {
            return Err(AppError::InvalidTransition(format!(
                "Leave request is already {}",
                current.status
            )));
        }
        if !new_status.is_terminal() {
            return Err(AppError::InvalidTransition(
                "A pending request can only be Approved or Rejected".into(),
            ));
        }

        if !self
            .leaves
            .transition_status(id, LeaveStatus::Pending, new_status)
            .await?
        {
            info!("Lost status race");
            return Err(AppError::InvalidTransition(
                "Leave request was already processed".into(),
            ));
        }

        info!(leave_id = %id, status = %new_status, "Leave status updated");
        Ok(LeaveRequest {
            status: new_status,
            ..current
        })
    }

    pub async fn balance(
        &self,
        requester: &PrincipalSummary,
    ) -> Result<Vec<LeaveBalance>, AppError> {
        AuthGateway::require_role(requester, Role::Employee)?;

        let history = self.leaves.list_leaves_by_employee(&requester.id).await?;
        Ok(balance::project(&self.allowances, &history))
    }
}

fn matches_filter(view: &LeaveView, needle: &str) -> bool {
    let contains = |haystack: &str| haystack.to_lowercase().contains(needle);

    contains(&view.leave.employee_id)
        || contains(&view.leave.leave_type.to_string())
        || view
            .employee
            .as_ref()
            .is_some_and(|e| contains(&e.employee_id) || contains(&e.name))
}
