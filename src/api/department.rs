use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    auth::auth::AuthUser,
    error::{AppError, ErrorBody},
    model::department::Department,
    state::AppState,
};

#[derive(Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateDepartment {
    #[schema(example = "Engineering")]
    pub name: String,
    #[schema(example = "Builds and runs the product", nullable = true)]
    pub description: Option<String>,
}

/// Partial update; an empty description clears it.
#[derive(Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateDepartment {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum DepartmentSort {
    #[default]
    Name,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct DepartmentQuery {
    /// Case-insensitive match on the department name
    pub search: Option<String>,
    /// `name` (default) or `createdAt`
    pub sort: Option<DepartmentSort>,
    /// `asc` (default) or `desc`
    pub order: Option<SortOrder>,
    /// Page number, starting at 1
    pub page: Option<u32>,
    /// Items per page (default 5, max 100)
    pub per_page: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct DepartmentListResponse {
    pub data: Vec<Department>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 5)]
    pub per_page: u32,
    #[schema(example = 4)]
    pub total: usize,
}

fn department_name(value: &str) -> Result<String, AppError> {
    let name = value.trim();
    if name.is_empty() {
        return Err(AppError::InvalidRequest("name must not be empty".into()));
    }
    Ok(name.to_string())
}

fn description(value: Option<String>) -> Option<String> {
    value.map(|d| d.trim().to_string()).filter(|d| !d.is_empty())
}

#[utoipa::path(
    post,
    path = "/api/departments",
    request_body = CreateDepartment,
    responses(
        (status = 201, description = "Department created", body = Department),
        (status = 400, description = "Missing name", body = ErrorBody),
        (status = 403, description = "Admin only", body = ErrorBody),
        (status = 409, description = "Name already taken", body = ErrorBody)
    ),
    tag = "Department",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_department(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<CreateDepartment>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let payload = payload.into_inner();

    let department = Department {
        id: Uuid::new_v4().to_string(),
        name: department_name(&payload.name)?,
        description: description(payload.description),
        created_at: Utc::now(),
    };
    state.departments.insert_department(&department).await?;

    info!(id = %department.id, name = %department.name, "Department created");
    Ok(HttpResponse::Created().json(department))
}

#[utoipa::path(
    get,
    path = "/api/departments",
    params(DepartmentQuery),
    responses(
        (status = 200, description = "Sorted, paginated departments", body = DepartmentListResponse),
        (status = 400, description = "Unknown sort key or order", body = ErrorBody),
        (status = 403, description = "Admin only", body = ErrorBody)
    ),
    tag = "Department",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_departments(
    auth: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<DepartmentQuery>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(5).clamp(1, 100);
    let offset = ((page - 1) as usize).saturating_mul(per_page as usize);

    let mut departments = state.departments.list_departments().await?;

    if let Some(needle) = query
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
    {
        departments.retain(|d| d.name.to_lowercase().contains(&needle));
    }

    match query.sort.unwrap_or_default() {
        DepartmentSort::Name => {
            departments.sort_by_key(|d| d.name.to_lowercase());
        }
        DepartmentSort::CreatedAt => departments.sort_by_key(|d| d.created_at),
    }
    if matches!(query.order.unwrap_or_default(), SortOrder::Desc) {
        departments.reverse();
    }

    let total = departments.len();
    let data = departments
        .into_iter()
        .skip(offset)
        .take(per_page as usize)
        .collect();

    Ok(HttpResponse::Ok().json(DepartmentListResponse {
        data,
        page,
        per_page,
        total,
    }))
}

#[utoipa::path(
    put,
    path = "/api/departments/{id}",
    params(
        ("id" = String, Path, description = "Department id")
    ),
    request_body = UpdateDepartment,
    responses(
        (status = 200, description = "Department updated", body = Department),
        (status = 400, description = "Invalid payload", body = ErrorBody),
        (status = 403, description = "Admin only", body = ErrorBody),
        (status = 404, description = "Department not found", body = ErrorBody),
        (status = 409, description = "Name already taken", body = ErrorBody)
    ),
    tag = "Department",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_department(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdateDepartment>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let id = path.into_inner();
    let body = body.into_inner();

    let mut department = state
        .departments
        .find_department(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Department not found".into()))?;

    if let Some(name) = body.name {
        department.name = department_name(&name)?;
    }
    if body.description.is_some() {
        department.description = description(body.description);
    }

    if !state.departments.update_department(&department).await? {
        return Err(AppError::NotFound("Department not found".into()));
    }

    info!(id = %department.id, "Department updated");
    Ok(HttpResponse::Ok().json(department))
}

#[utoipa::path(
    delete,
    path = "/api/departments/{id}",
    params(
        ("id" = String, Path, description = "Department id")
    ),
    responses(
        (status = 200, description = "Department deleted", body = Object, example = json!({
            "message": "Department deleted"
        })),
        (status = 403, description = "Admin only", body = ErrorBody),
        (status = 404, description = "Department not found", body = ErrorBody)
    ),
    tag = "Department",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_department(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    let id = path.into_inner();
    if !state.departments.delete_department(&id).await? {
        return Err(AppError::NotFound("Department not found".into()));
    }

    info!(id = %id, "Department deleted");
    Ok(HttpResponse::Ok().json(json!({
        "message": "Department deleted"
    })))
}
