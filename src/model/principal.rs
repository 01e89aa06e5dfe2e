use serde::Serialize;
use utoipa::ToSchema;

use super::{admin::Admin, employee::Employee, role::Role};

/// A live principal record, fetched fresh from one of the two stores.
#[derive(Debug, Clone)]
pub enum Principal {
    Admin(Admin),
    Employee(Employee),
}

impl Principal {
    pub fn id(&self) -> &str {
        match self {
            Principal::Admin(a) => &a.id,
            Principal::Employee(e) => &e.id,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Principal::Admin(_) => Role::Admin,
            Principal::Employee(_) => Role::Employee,
        }
    }

    /// Non-sensitive view: the password hash never leaves this type.
    pub fn summary(&self) -> PrincipalSummary {
        match self {
            Principal::Admin(a) => PrincipalSummary {
                id: a.id.clone(),
                name: a.name.clone(),
                role: Role::Admin,
                email: Some(a.email.clone()),
                employee_id: None,
                department: None,
                designation: None,
                image: None,
            },
            Principal::Employee(e) => PrincipalSummary {
                id: e.id.clone(),
                name: e.name.clone(),
                role: Role::Employee,
                email: Some(e.email.clone()),
                employee_id: Some(e.employee_id.clone()),
                department: Some(e.department.clone()),
                designation: Some(e.designation.clone()),
                image: e.image.clone(),
            },
        }
    }
}

/// Identity of the caller as seen by the rest of the service.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalSummary {
    #[schema(example = "5f0c6c1e-6f43-4bd4-9a39-1f0cf1a3c1f2")]
    pub id: String,
    #[schema(example = "John Doe")]
    pub name: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "john.doe@company.com")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "EMP001")]
    pub employee_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}
