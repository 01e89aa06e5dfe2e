use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload};
use futures::future::{Ready, ready};

use crate::{
    auth::gateway::AuthGateway,
    error::AppError,
    model::{principal::PrincipalSummary, role::Role},
};

/// The caller, as resolved by `auth_middleware` on this request.
#[derive(Clone)]
pub struct AuthUser {
    pub principal: PrincipalSummary,
    /// The bearer token itself; only logout needs it.
    pub token: String,
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // Only reachable without the middleware on a misconfigured route.
        ready(
            req.extensions()
                .get::<AuthUser>()
                .cloned()
                .ok_or(AppError::TokenInvalid),
        )
    }
}

impl AuthUser {
    pub fn require_admin(&self) -> Result<(), AppError> {
        AuthGateway::require_role(&self.principal, Role::Admin)
    }
}
