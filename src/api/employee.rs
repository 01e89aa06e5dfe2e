use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    auth::{auth::AuthUser, password::hash_password},
    error::{AppError, ErrorBody},
    model::employee::Employee,
    state::AppState,
    utils::employee_id_filter,
};

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateEmployee {
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "EMP001")]
    pub employee_id: String,
    #[schema(example = "john@email.com", format = "email", value_type = String)]
    pub email: String,
    /// Defaults to the employee id when omitted
    #[schema(example = "s3cret", nullable = true)]
    pub password: Option<String>,
    #[schema(example = "Engineering")]
    pub department: String,
    #[schema(example = "Backend Developer")]
    pub designation: String,
    #[schema(example = 52000.0)]
    pub salary: f64,
    #[schema(example = "1994-05-17", format = "date", value_type = Option<String>)]
    pub date_of_birth: Option<NaiveDate>,
    #[schema(example = "male", nullable = true)]
    pub gender: Option<String>,
    #[schema(example = "single", nullable = true)]
    pub marital_status: Option<String>,
    #[schema(example = "1723890000-john.png", nullable = true)]
    pub image: Option<String>,
}

/// Partial update. The employee id is fixed at creation and not accepted here.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateEmployee {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub department: Option<String>,
    pub designation: Option<String>,
    pub salary: Option<f64>,
    #[schema(example = "1994-05-17", format = "date", value_type = Option<String>)]
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub marital_status: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct EmployeeQuery {
    /// Case-insensitive match on name, employee id, email or department
    pub search: Option<String>,
    /// Page number, starting at 1
    pub page: Option<u32>,
    /// Items per page (max 100)
    pub per_page: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<Employee>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 3)]
    pub total: usize,
}

fn require_text(value: &str, field: &str) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::InvalidRequest(format!("{field} must not be empty")));
    }
    Ok(value.to_string())
}

fn require_email(value: &str) -> Result<String, AppError> {
    let email = require_text(value, "email")?;
    if !email.contains('@') {
        return Err(AppError::InvalidRequest("email is not valid".into()));
    }
    Ok(email)
}

fn require_salary(salary: f64) -> Result<f64, AppError> {
    if !salary.is_finite() || salary < 0.0 {
        return Err(AppError::InvalidRequest("salary must be a non-negative number".into()));
    }
    Ok(salary)
}

fn matches_search(employee: &Employee, needle: &str) -> bool {
    [
        &employee.name,
        &employee.employee_id,
        &employee.email,
        &employee.department,
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created successfully", body = Employee),
        (status = 400, description = "Invalid payload", body = ErrorBody),
        (status = 403, description = "Admin only", body = ErrorBody),
        (status = 409, description = "Employee id already taken", body = ErrorBody)
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_employee(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<CreateEmployee>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let payload = payload.into_inner();

    let employee_id = require_text(&payload.employee_id, "employeeId")?;

    // Cuckoo filter is a fast negative; a hit still needs the store to confirm.
    if employee_id_filter::might_exist(&employee_id)
        && state
            .principals
            .find_employee_by_code(&employee_id)
            .await?
            .is_some()
    {
        return Err(AppError::Conflict(format!(
            "Employee id {employee_id} already exists"
        )));
    }

    let password = match payload.password.as_deref().map(str::trim) {
        Some(p) if !p.is_empty() => p.to_string(),
        _ => employee_id.clone(),
    };

    let employee = Employee {
        id: Uuid::new_v4().to_string(),
        name: require_text(&payload.name, "name")?,
        employee_id,
        email: require_email(&payload.email)?,
        password_hash: hash_password(&password)?,
        department: require_text(&payload.department, "department")?,
        designation: require_text(&payload.designation, "designation")?,
        salary: require_salary(payload.salary)?,
        date_of_birth: payload.date_of_birth,
        gender: payload.gender,
        marital_status: payload.marital_status,
        image: payload.image,
    };

    state.principals.insert_employee(&employee).await?;
    employee_id_filter::insert(&employee.employee_id);

    info!(id = %employee.id, employee_id = %employee.employee_id, "Employee created");
    Ok(HttpResponse::Created().json(employee))
}

#[utoipa::path(
    get,
    path = "/api/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Paginated employee list, newest first", body = EmployeeListResponse),
        (status = 403, description = "Admin only", body = ErrorBody)
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_employees(
    auth: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<EmployeeQuery>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = ((page - 1) as usize).saturating_mul(per_page as usize);

    let mut employees = state.principals.list_employees().await?;

    if let Some(needle) = query
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
    {
        employees.retain(|e| matches_search(e, &needle));
    }

    let total = employees.len();
    debug!(page, per_page, total, "Listing employees");

    let data = employees
        .into_iter()
        .skip(offset)
        .take(per_page as usize)
        .collect();

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        data,
        page,
        per_page,
        total,
    }))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/employees/{id}",
    params(
        ("id" = String, Path, description = "Opaque employee id")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 403, description = "Admin only", body = ErrorBody),
        (status = 404, description = "Employee not found", body = ErrorBody)
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_employee(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    let employee = state
        .principals
        .find_employee_by_id(&path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".into()))?;

    Ok(HttpResponse::Ok().json(employee))
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/api/employees/{id}",
    params(
        ("id" = String, Path, description = "Opaque employee id")
    ),
    request_body = UpdateEmployee,
    responses(
        (status = 200, description = "Employee updated successfully", body = Employee),
        (status = 400, description = "Invalid payload", body = ErrorBody),
        (status = 403, description = "Admin only", body = ErrorBody),
        (status = 404, description = "Employee not found", body = ErrorBody)
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_employee(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdateEmployee>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let id = path.into_inner();
    let body = body.into_inner();

    let mut employee = state
        .principals
        .find_employee_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".into()))?;

    if let Some(name) = body.name {
        employee.name = require_text(&name, "name")?;
    }
    if let Some(email) = body.email {
        employee.email = require_email(&email)?;
    }
    if let Some(password) = body.password {
        employee.password_hash = hash_password(&require_text(&password, "password")?)?;
    }
    if let Some(department) = body.department {
        employee.department = require_text(&department, "department")?;
    }
    if let Some(designation) = body.designation {
        employee.designation = require_text(&designation, "designation")?;
    }
    if let Some(salary) = body.salary {
        employee.salary = require_salary(salary)?;
    }
    if body.date_of_birth.is_some() {
        employee.date_of_birth = body.date_of_birth;
    }
    if body.gender.is_some() {
        employee.gender = body.gender;
    }
    if body.marital_status.is_some() {
        employee.marital_status = body.marital_status;
    }
    if body.image.is_some() {
        employee.image = body.image;
    }

    // Deleted between the read and the write.
    if !state.principals.update_employee(&employee).await? {
        return Err(AppError::NotFound("Employee not found".into()));
    }

    info!(id = %employee.id, "Employee updated");
    Ok(HttpResponse::Ok().json(employee))
}

/// Delete Employee
///
/// Outstanding tokens of the employee stop resolving immediately. Leave
/// history is kept.
#[utoipa::path(
    delete,
    path = "/api/employees/{id}",
    params(
        ("id" = String, Path, description = "Opaque employee id")
    ),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "message": "Successfully deleted"
        })),
        (status = 403, description = "Admin only", body = ErrorBody),
        (status = 404, description = "Employee not found", body = ErrorBody)
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_employee(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let id = path.into_inner();

    let employee = state
        .principals
        .find_employee_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".into()))?;

    if !state.principals.delete_employee(&id).await? {
        return Err(AppError::NotFound("Employee not found".into()));
    }
    employee_id_filter::remove(&employee.employee_id);

    info!(id = %id, employee_id = %employee.employee_id, "Employee deleted");
    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted"
    })))
}
