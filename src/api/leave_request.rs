use actix_web::{HttpResponse, web};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    auth::auth::AuthUser,
    error::{AppError, ErrorBody},
    leave::{
        balance::LeaveBalance,
        workflow::{LeaveInput, LeaveView},
    },
    model::leave_request::{LeaveRequest, LeaveStatus},
    state::AppState,
};

#[derive(Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct LeaveFilter {
    /// Case-insensitive match on employee id, employee name or leave type
    #[schema(example = "EMP001")]
    pub search: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateStatusReq {
    /// `Approved` or `Rejected`
    #[schema(example = "Approved")]
    pub status: String,
}

/* =========================
Submit leave (employee)
========================= */
#[utoipa::path(
    post,
    path = "/api/leaves",
    request_body(
        content = LeaveInput,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request submitted", body = LeaveRequest),
        (status = 400, description = "Invalid date range or leave type", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Employees only", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<LeaveInput>,
) -> Result<HttpResponse, AppError> {
    let leave = state
        .leaves
        .submit(&auth.principal, payload.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(leave))
}

/* =========================
All leave requests (admin)
========================= */
#[utoipa::path(
    get,
    path = "/api/leaves",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Every leave request, newest first", body = [LeaveView]),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Admin only", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<LeaveFilter>,
) -> Result<HttpResponse, AppError> {
    let leaves = state
        .leaves
        .list_all(&auth.principal, query.search.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(leaves))
}

/* =========================
Own history (employee)
========================= */
#[utoipa::path(
    get,
    path = "/api/leaves/my-history",
    responses(
        (status = 200, description = "Caller's leave requests, newest first", body = [LeaveRequest]),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Employees only", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn my_history(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let leaves = state.leaves.list_mine(&auth.principal).await?;
    Ok(HttpResponse::Ok().json(leaves))
}

#[utoipa::path(
    get,
    path = "/api/leaves/balance",
    responses(
        (status = 200, description = "Remaining days per leave type", body = [LeaveBalance]),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Employees only", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_balance(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let balances = state.leaves.balance(&auth.principal).await?;
    Ok(HttpResponse::Ok().json(balances))
}

#[utoipa::path(
    get,
    path = "/api/leaves/{leave_id}",
    params(
        ("leave_id" = String, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Leave request not found", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let leave = state.leaves.get(&auth.principal, &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(leave))
}

/* =========================
Approve / reject (admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/leaves/{leave_id}/status",
    params(
        ("leave_id" = String, Path, description = "ID of the leave request to decide")
    ),
    request_body = UpdateStatusReq,
    responses(
        (status = 200, description = "Leave request decided", body = LeaveRequest),
        (status = 400, description = "Unknown status", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Admin only", body = ErrorBody),
        (status = 404, description = "Leave request not found", body = ErrorBody),
        (status = 409, description = "Leave request already processed", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn update_leave_status(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<UpdateStatusReq>,
) -> Result<HttpResponse, AppError> {
    let status = payload
        .status
        .trim()
        .parse::<LeaveStatus>()
        .map_err(|_| {
            AppError::InvalidRequest(format!(
                "Invalid status '{}'. Allowed: Approved, Rejected",
                payload.status
            ))
        })?;

    let leave = state
        .leaves
        .update_status(&auth.principal, &path.into_inner(), status)
        .await?;

    Ok(HttpResponse::Ok().json(leave))
}
