use std::collections::HashMap;

use actix_web::{HttpResponse, web};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    auth::auth::AuthUser,
    error::{AppError, ErrorBody},
    model::{employee::EmployeeRef, salary::SalaryRecord},
    state::AppState,
};

/// `total` is derived and rejected if sent.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateSalary {
    /// Opaque id of the employee being paid
    #[schema(example = "5f0c6c1e-6f43-4bd4-9a39-1f0cf1a3c1f2")]
    pub employee_id: String,

    #[schema(example = 50000.0)]
    pub salary: f64,

    #[schema(example = 5000.0)]
    pub allowance: Option<f64>,

    #[schema(example = 2000.0)]
    pub deduction: Option<f64>,

    /// Defaults to today
    #[schema(example = "2025-08-31", value_type = Option<String>, format = "date")]
    pub pay_date: Option<NaiveDate>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateSalary {
    #[schema(example = 52000.0)]
    pub salary: Option<f64>,

    #[schema(example = 6000.0)]
    pub allowance: Option<f64>,

    #[schema(example = 2500.0)]
    pub deduction: Option<f64>,

    #[schema(example = "2025-09-30", value_type = Option<String>, format = "date")]
    pub pay_date: Option<NaiveDate>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SalaryQuery {
    /// Only records of this employee (opaque id)
    pub employee_id: Option<String>,
    #[schema(example = 1)]
    pub page: Option<u32>,
    #[schema(example = 20)]
    pub per_page: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalaryView {
    #[serde(flatten)]
    pub record: SalaryRecord,
    /// `None` when the employee has since been deleted.
    pub employee: Option<EmployeeRef>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalaryListResponse {
    pub data: Vec<SalaryView>,
    pub page: u32,
    pub per_page: u32,
    pub total: usize,
}

fn amount(value: f64, field: &str) -> Result<f64, AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::InvalidRequest(format!(
            "{field} must be a non-negative number"
        )));
    }
    Ok(value)
}

fn salary_not_found() -> AppError {
    AppError::NotFound("Salary record not found".into())
}

#[utoipa::path(
    post,
    path = "/api/salaries",
    request_body = CreateSalary,
    responses(
        (status = 201, description = "Salary record added", body = SalaryRecord),
        (status = 400, description = "Negative amount or unknown field", body = ErrorBody),
        (status = 403, description = "Admin only", body = ErrorBody),
        (status = 404, description = "Employee not found", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn create_salary(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<CreateSalary>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let payload = payload.into_inner();

    let employee = state
        .principals
        .find_employee_by_id(payload.employee_id.trim())
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".into()))?;

    let salary = amount(payload.salary, "salary")?;
    let allowance = amount(payload.allowance.unwrap_or(0.0), "allowance")?;
    let deduction = amount(payload.deduction.unwrap_or(0.0), "deduction")?;

    let record = SalaryRecord {
        id: Uuid::new_v4().to_string(),
        employee_id: employee.id,
        salary,
        allowance,
        deduction,
        total: SalaryRecord::net(salary, allowance, deduction),
        pay_date: payload.pay_date.unwrap_or_else(|| Utc::now().date_naive()),
    };
    state.salaries.insert_salary(&record).await?;

    info!(id = %record.id, employee = %record.employee_id, total = record.total, "Salary recorded");
    Ok(HttpResponse::Created().json(record))
}

/// Salary records, newest pay date first, with the employee joined
#[utoipa::path(
    get,
    path = "/api/salaries",
    params(SalaryQuery),
    responses(
        (status = 200, description = "Paginated salary records", body = SalaryListResponse),
        (status = 403, description = "Admin only", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn list_salaries(
    auth: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<SalaryQuery>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = ((page - 1) as usize).saturating_mul(per_page as usize);

    let employee_filter = query
        .employee_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());
    let records = state.salaries.list_salaries(employee_filter).await?;
    let total = records.len();

    let mut owners: HashMap<String, Option<EmployeeRef>> = HashMap::new();
    let mut data = Vec::new();
    for record in records.into_iter().skip(offset).take(per_page as usize) {
        if !owners.contains_key(&record.employee_id) {
            let owner = state
                .principals
                .find_employee_by_id(&record.employee_id)
                .await?
                .map(EmployeeRef::from);
            owners.insert(record.employee_id.clone(), owner);
        }
        let employee = owners.get(&record.employee_id).cloned().flatten();
        data.push(SalaryView { record, employee });
    }

    Ok(HttpResponse::Ok().json(SalaryListResponse {
        data,
        page,
        per_page,
        total,
    }))
}

#[utoipa::path(
    get,
    path = "/api/salaries/{id}",
    params(
        ("id" = String, Path, description = "Salary record id")
    ),
    responses(
        (status = 200, body = SalaryRecord),
        (status = 403, description = "Admin only", body = ErrorBody),
        (status = 404, description = "Salary record not found", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn get_salary(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    let record = state
        .salaries
        .find_salary(&path.into_inner())
        .await?
        .ok_or_else(salary_not_found)?;

    Ok(HttpResponse::Ok().json(record))
}

#[utoipa::path(
    put,
    path = "/api/salaries/{id}",
    params(
        ("id" = String, Path, description = "Salary record id")
    ),
    request_body = UpdateSalary,
    responses(
        (status = 200, description = "Salary record updated, total recomputed", body = SalaryRecord),
        (status = 400, description = "Negative amount or unknown field", body = ErrorBody),
        (status = 403, description = "Admin only", body = ErrorBody),
        (status = 404, description = "Salary record not found", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn update_salary(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdateSalary>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let id = path.into_inner();

    let mut record = state
        .salaries
        .find_salary(&id)
        .await?
        .ok_or_else(salary_not_found)?;

    if let Some(salary) = body.salary {
        record.salary = amount(salary, "salary")?;
    }
    if let Some(allowance) = body.allowance {
        record.allowance = amount(allowance, "allowance")?;
    }
    if let Some(deduction) = body.deduction {
        record.deduction = amount(deduction, "deduction")?;
    }
    if let Some(pay_date) = body.pay_date {
        record.pay_date = pay_date;
    }
    record.recompute_total();

    if !state.salaries.update_salary(&record).await? {
        return Err(salary_not_found());
    }

    info!(id = %record.id, total = record.total, "Salary record updated");
    Ok(HttpResponse::Ok().json(record))
}

#[utoipa::path(
    delete,
    path = "/api/salaries/{id}",
    params(
        ("id" = String, Path, description = "Salary record id")
    ),
    responses(
        (status = 200, description = "Salary record deleted", body = Object, example = json!({
            "message": "Salary record deleted"
        })),
        (status = 403, description = "Admin only", body = ErrorBody),
        (status = 404, description = "Salary record not found", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn delete_salary(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;

    let id = path.into_inner();
    if !state.salaries.delete_salary(&id).await? {
        return Err(salary_not_found());
    }

    info!(id = %id, "Salary record deleted");
    Ok(HttpResponse::Ok().json(json!({
        "message": "Salary record deleted"
    })))
}
