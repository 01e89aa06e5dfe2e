use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde::Serialize;
use utoipa::ToSchema;

use crate::store::StoreError;

/// Every failure the service reports across the HTTP boundary.
///
/// Each variant maps to a stable machine-readable kind (see [`AppError::kind`])
/// and a human-readable message. Internal detail carried by `Internal` and
/// `Unavailable` is logged, never returned to the caller.
#[derive(Debug, Display, PartialEq, Eq)]
pub enum AppError {
    #[display(fmt = "{}", _0)]
    InvalidRequest(String),

    #[display(fmt = "Invalid credentials")]
    InvalidCredentials,

    #[display(fmt = "Invalid token")]
    TokenInvalid,

    #[display(fmt = "Token expired")]
    TokenExpired,

    #[display(fmt = "Principal no longer exists")]
    PrincipalNotFound,

    #[display(fmt = "{}", _0)]
    Forbidden(String),

    #[display(fmt = "fromDate cannot be after toDate")]
    InvalidDateRange,

    #[display(fmt = "Invalid leave type '{}'. Allowed: Casual Leave, Sick Leave, Paid Leave", _0)]
    InvalidLeaveType(String),

    #[display(fmt = "{}", _0)]
    NotFound(String),

    #[display(fmt = "{}", _0)]
    InvalidTransition(String),

    #[display(fmt = "{}", _0)]
    Conflict(String),

    #[display(fmt = "Service temporarily unavailable")]
    Unavailable(String),

    #[display(fmt = "Internal Server Error")]
    Internal(String),
}

impl std::error::Error for AppError {}

/// Error body returned for every failed request.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    #[schema(example = "InvalidTransition")]
    pub error: String,
    #[schema(example = "Leave request is already Approved")]
    pub message: String,
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidRequest(_) => "InvalidRequest",
            AppError::InvalidCredentials => "InvalidCredentials",
            AppError::TokenInvalid => "TokenInvalid",
            AppError::TokenExpired => "TokenExpired",
            AppError::PrincipalNotFound => "PrincipalNotFound",
            AppError::Forbidden(_) => "Forbidden",
            AppError::InvalidDateRange => "InvalidDateRange",
            AppError::InvalidLeaveType(_) => "InvalidLeaveType",
            AppError::NotFound(_) => "NotFound",
            AppError::InvalidTransition(_) => "InvalidTransition",
            AppError::Conflict(_) => "Conflict",
            AppError::Unavailable(_) => "Unavailable",
            AppError::Internal(_) => "Internal",
        }
    }

    /// Only transient storage faults are worth a caller-side retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Unavailable(_))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_)
            | AppError::InvalidDateRange
            | AppError::InvalidLeaveType(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials
            | AppError::TokenInvalid
            | AppError::TokenExpired
            | AppError::PrincipalNotFound => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidTransition(_) | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Unavailable(detail) => {
                tracing::warn!(detail = %detail, "Storage unavailable")
            }
            AppError::Internal(detail) => tracing::error!(detail = %detail, "Internal error"),
            _ => {}
        }

        let mut resp = HttpResponse::build(self.status_code());
        if self.is_retryable() {
            resp.insert_header((actix_web::http::header::RETRY_AFTER, "1"));
        }
        resp.json(ErrorBody {
            error: self.kind().to_string(),
            message: self.to_string(),
        })
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(what) => AppError::Conflict(what),
            StoreError::Unavailable(detail) => AppError::Unavailable(detail),
            StoreError::Corrupt(detail) => AppError::Internal(detail),
        }
    }
}

/// Maps body/query/path extraction failures onto `InvalidRequest` so that
/// malformed input never reaches a handler.
pub fn json_error_handler(
    err: actix_web::error::JsonPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    AppError::InvalidRequest(err.to_string()).into()
}

pub fn query_error_handler(
    err: actix_web::error::QueryPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    AppError::InvalidRequest(err.to_string()).into()
}

pub fn path_error_handler(
    err: actix_web::error::PathError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    AppError::InvalidRequest(err.to_string()).into()
}
