use actix_web::{HttpResponse, web};
use tracing::{info, instrument};

use crate::{
    auth::auth::AuthUser,
    error::{AppError, ErrorBody},
    model::principal::PrincipalSummary,
    models::{LoginReqDto, LoginRequest, LoginResponse, ProfileUpdate, RegisterAdminReq},
    state::AppState,
};

/// Login for both admins (`email`) and employees (`employeeId`)
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body(
        content = LoginReqDto,
        description = "Exactly one of `email` or `employeeId`; `kind` optionally names which",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 400, description = "Malformed or ambiguous credentials", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
        (status = 429, description = "Too many login attempts")
    ),
    tag = "Auth"
)]
pub async fn login(
    state: web::Data<AppState>,
    payload: web::Json<LoginReqDto>,
) -> Result<HttpResponse, AppError> {
    let request = LoginRequest::try_from(payload.into_inner())?;
    let response = state.auth.login(request).await?;

    Ok(HttpResponse::Ok().json(response))
}

/// The caller's live profile
#[utoipa::path(
    get,
    path = "/api/auth/profile",
    responses(
        (status = 200, description = "Resolved principal", body = PrincipalSummary),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Auth"
)]
pub async fn profile(auth: AuthUser) -> HttpResponse {
    HttpResponse::Ok().json(auth.principal)
}

/// Employees edit their own name, email and picture reference
#[utoipa::path(
    put,
    path = "/api/auth/profile",
    request_body = ProfileUpdate,
    responses(
        (status = 200, description = "Updated profile", body = PrincipalSummary),
        (status = 400, description = "Invalid email or unknown field", body = ErrorBody),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorBody),
        (status = 403, description = "Employees only", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Auth"
)]
pub async fn update_profile(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<ProfileUpdate>,
) -> Result<HttpResponse, AppError> {
    let profile = state
        .auth
        .update_profile(&auth.principal, payload.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(profile))
}

/// Revokes the presented token
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 204, description = "Token revoked"),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Auth"
)]
pub async fn logout(auth: AuthUser, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    state.auth.logout(&auth.token).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Creates another administrator account (admin only)
#[utoipa::path(
    post,
    path = "/api/auth/register-admin",
    request_body = RegisterAdminReq,
    responses(
        (status = 201, description = "Admin created", body = PrincipalSummary),
        (status = 400, description = "Missing name, email or password", body = ErrorBody),
        (status = 403, description = "Admin only", body = ErrorBody),
        (status = 409, description = "Email already registered", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_register_admin", skip(auth, state, payload), fields(by = %auth.principal.id))]
pub async fn register_admin(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<RegisterAdminReq>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    let admin = state
        .auth
        .create_admin(&payload.name, &payload.email, &payload.password)
        .await?;

    info!(admin_id = %admin.id, "Admin registered via API");
    Ok(HttpResponse::Created().json(admin))
}
