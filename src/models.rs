use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{error::AppError, model::principal::PrincipalSummary};

/// Session token payload. Carries only the subject; the role is looked up
/// fresh on every request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Opaque id of the admin or employee principal.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LoginKind {
    Admin,
    Employee,
}

/// Raw login body as it arrives on the wire. `kind` is the explicit
/// discriminant; when omitted the credential field present decides.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoginReqDto {
    pub kind: Option<LoginKind>,
    #[schema(example = "admin@example.com")]
    pub email: Option<String>,
    #[schema(example = "EMP001")]
    pub employee_id: Option<String>,
    #[schema(example = "EMP001")]
    pub password: String,
}

/// Login credentials after shape validation: exactly one principal store is addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginRequest {
    Admin { email: String, password: String },
    Employee { employee_id: String, password: String },
}

impl TryFrom<LoginReqDto> for LoginRequest {
    type Error = AppError;

    fn try_from(dto: LoginReqDto) -> Result<Self, Self::Error> {
        let email = dto.email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty());
        let employee_id = dto
            .employee_id
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());

        if dto.password.is_empty() {
            return Err(AppError::InvalidRequest("password must not be empty".into()));
        }

        let kind = match (dto.kind, &email, &employee_id) {
            (_, Some(_), Some(_)) => {
                return Err(AppError::InvalidRequest(
                    "Provide either email or employeeId, not both".into(),
                ));
            }
            (Some(kind), _, _) => kind,
            (None, Some(_), None) => LoginKind::Admin,
            (None, None, Some(_)) => LoginKind::Employee,
            (None, None, None) => {
                return Err(AppError::InvalidRequest(
                    "Missing login credentials. Provide an email or an employeeId".into(),
                ));
            }
        };

        match (kind, email, employee_id) {
            (LoginKind::Admin, Some(email), None) => Ok(LoginRequest::Admin {
                email,
                password: dto.password,
            }),
            (LoginKind::Employee, None, Some(employee_id)) => Ok(LoginRequest::Employee {
                employee_id,
                password: dto.password,
            }),
            (LoginKind::Admin, _, _) => Err(AppError::InvalidRequest(
                "Admin login requires email".into(),
            )),
            (LoginKind::Employee, _, _) => Err(AppError::InvalidRequest(
                "Employee login requires employeeId".into(),
            )),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    #[serde(flatten)]
    pub principal: PrincipalSummary,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterAdminReq {
    #[schema(example = "Admin")]
    pub name: String,
    #[schema(example = "admin@example.com")]
    pub email: String,
    #[schema(example = "admin123")]
    pub password: String,
}

/// Fields an employee may change on their own profile. The employee id,
/// department and salary stay under admin control.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfileUpdate {
    #[schema(example = "Johnny Doe")]
    pub name: Option<String>,
    #[schema(example = "johnny@company.com")]
    pub email: Option<String>,
    #[schema(example = "1723890000-johnny.png")]
    pub image: Option<String>,
}
