use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

use crate::api::department::{
    CreateDepartment, DepartmentListResponse, DepartmentQuery, DepartmentSort, SortOrder,
    UpdateDepartment,
};
use crate::api::employee::{CreateEmployee, EmployeeListResponse, EmployeeQuery, UpdateEmployee};
use crate::api::leave_request::{LeaveFilter, UpdateStatusReq};
use crate::api::salary::{CreateSalary, SalaryListResponse, SalaryQuery, SalaryView, UpdateSalary};
use crate::error::ErrorBody;
use crate::leave::balance::LeaveBalance;
use crate::leave::workflow::{LeaveInput, LeaveView};
use crate::model::department::Department;
use crate::model::employee::{Employee, EmployeeRef};
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType};
use crate::model::principal::PrincipalSummary;
use crate::model::role::Role;
use crate::model::salary::SalaryRecord;
use crate::models::{LoginKind, LoginReqDto, LoginResponse, ProfileUpdate, RegisterAdminReq};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Employee Management System API",
        version = "1.0.0",
        description = r#"
## Employee Management System

Backend for an employee management portal: one login endpoint for
administrators and employees, employee records, departments, salaries and the
leave-request workflow.

### Key Features
- **Authentication**
  - Admins log in with `email`, employees with `employeeId`
  - Every call re-resolves the token's subject, so deleted accounts lose access immediately
  - Employees edit their own name, email and picture
- **Leave Management**
  - Employees apply for leave and track history and balance
  - Admins approve or reject each request exactly once
- **Employee Management**
  - Create, update, list, view and delete employee profiles
- **Departments**
  - Searchable, sortable and paginated department list
- **Salaries**
  - Pay records per employee; the total is always derived from its parts

### Security
All endpoints except login require a **JWT Bearer** token.

### Errors
Every failure returns `{"error": "<Kind>", "message": "<text>"}`.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::profile,
        crate::auth::handlers::update_profile,
        crate::auth::handlers::logout,
        crate::auth::handlers::register_admin,

        crate::api::leave_request::create_leave,
        crate::api::leave_request::leave_list,
        crate::api::leave_request::my_history,
        crate::api::leave_request::leave_balance,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::update_leave_status,

        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::department::create_department,
        crate::api::department::list_departments,
        crate::api::department::update_department,
        crate::api::department::delete_department,

        crate::api::salary::create_salary,
        crate::api::salary::list_salaries,
        crate::api::salary::get_salary,
        crate::api::salary::update_salary,
        crate::api::salary::delete_salary
    ),
    components(
        schemas(
            ErrorBody,
            Role,
            LoginKind,
            LoginReqDto,
            LoginResponse,
            PrincipalSummary,
            RegisterAdminReq,
            ProfileUpdate,
            LeaveType,
            LeaveStatus,
            LeaveRequest,
            LeaveInput,
            LeaveView,
            EmployeeRef,
            LeaveFilter,
            UpdateStatusReq,
            LeaveBalance,
            Employee,
            CreateEmployee,
            UpdateEmployee,
            EmployeeQuery,
            EmployeeListResponse,
            Department,
            CreateDepartment,
            UpdateDepartment,
            DepartmentSort,
            SortOrder,
            DepartmentQuery,
            DepartmentListResponse,
            SalaryRecord,
            CreateSalary,
            UpdateSalary,
            SalaryQuery,
            SalaryView,
            SalaryListResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login and session APIs"),
        (name = "Leave", description = "Leave management APIs"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Department", description = "Department management APIs"),
        (name = "Salary", description = "Salary record APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route_and_the_bearer_scheme() {
        let doc = ApiDoc::openapi();

        for path in [
            "/api/auth/login",
            "/api/leaves",
            "/api/leaves/{leave_id}/status",
            "/api/employees/{id}",
            "/api/auth/profile",
            "/api/departments",
            "/api/salaries/{id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }

        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
