use actix_web::{
    Error, HttpMessage, ResponseError,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    web::Data,
};
use tracing::debug;

use crate::{
    auth::{auth::AuthUser, gateway::AuthGateway},
    error::AppError,
    model::role::Role,
    state::AppState,
};

/// Resolves the bearer token against the live principal stores and attaches
/// the caller to the request. Any failure ends the request with a 401.
pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let Some(state) = req.app_data::<Data<AppState>>().cloned() else {
        let resp = AppError::Internal("App state missing".into()).error_response();
        return Ok(req.into_response(resp));
    };

    let token = match bearer_token(&req).map(str::to_owned) {
        Ok(t) => t,
        Err(e) => {
            debug!(error = %e, "Rejected request without usable bearer token");
            return Ok(req.into_response(e.error_response()));
        }
    };

    let principal = match state.auth.resolve(&token).await {
        Ok(p) => p,
        Err(e) => return Ok(req.into_response(e.error_response())),
    };

    req.extensions_mut().insert(AuthUser { principal, token });

    next.call(req).await
}

/// Route guard for admin-only operations. Runs after `auth_middleware` and
/// before any extractor, so the payload is never looked at for a caller of
/// the wrong role.
pub async fn admin_only(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    role_gate(Role::Admin, req, next).await
}

pub async fn employee_only(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    role_gate(Role::Employee, req, next).await
}

async fn role_gate(
    role: Role,
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let verdict = req
        .extensions()
        .get::<AuthUser>()
        .map(|user| AuthGateway::require_role(&user.principal, role));

    match verdict {
        Some(Ok(())) => next.call(req).await,
        Some(Err(e)) => {
            debug!(required = %role, "Rejected caller of the wrong role");
            Ok(req.into_response(e.error_response()))
        }
        // Mounted outside the bearer middleware.
        None => Ok(req.into_response(AppError::TokenInvalid.error_response())),
    }
}

fn bearer_token(req: &ServiceRequest) -> Result<&str, AppError> {
    let header = req
        .headers()
        .get("Authorization")
        .ok_or(AppError::TokenInvalid)?
        .to_str()
        .map_err(|_| AppError::TokenInvalid)?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AppError::TokenInvalid)
}
