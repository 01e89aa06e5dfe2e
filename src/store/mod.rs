//! Persistence seams.
//!
//! The core only ever talks to these traits; `MySqlStore` backs them in
//! production and `MemoryStore` when no database is configured (and in tests).

use async_trait::async_trait;
use derive_more::Display;

use crate::model::{
    admin::Admin,
    department::Department,
    employee::Employee,
    leave_request::{LeaveRequest, LeaveStatus},
    salary::SalaryRecord,
};

pub mod memory;
pub mod mysql;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

#[derive(Debug, Display)]
pub enum StoreError {
    /// A unique key (employee id, admin email, department name) is already taken.
    #[display(fmt = "{}", _0)]
    Conflict(String),
    /// Transient connectivity or I/O fault; the caller may retry.
    #[display(fmt = "storage unavailable: {}", _0)]
    Unavailable(String),
    /// A persisted row could not be decoded into a domain value.
    #[display(fmt = "corrupt record: {}", _0)]
    Corrupt(String),
}

impl std::error::Error for StoreError {}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait PrincipalStore: Send + Sync {
    async fn find_admin_by_id(&self, id: &str) -> StoreResult<Option<Admin>>;

    async fn find_admin_by_email(&self, email: &str) -> StoreResult<Option<Admin>>;

    /// Fails with [`StoreError::Conflict`] when the email is taken.
    async fn insert_admin(&self, admin: &Admin) -> StoreResult<()>;

    async fn find_employee_by_id(&self, id: &str) -> StoreResult<Option<Employee>>;

    /// Lookup by the login code (`EMP001`), not the opaque id.
    async fn find_employee_by_code(&self, employee_id: &str) -> StoreResult<Option<Employee>>;

    /// All employees, newest first.
    async fn list_employees(&self) -> StoreResult<Vec<Employee>>;

    /// Fails with [`StoreError::Conflict`] when the employee id is taken.
    async fn insert_employee(&self, employee: &Employee) -> StoreResult<()>;

    /// Returns `false` when no employee has `employee.id`.
    async fn update_employee(&self, employee: &Employee) -> StoreResult<bool>;

    /// Returns `false` when nothing was deleted.
    async fn delete_employee(&self, id: &str) -> StoreResult<bool>;

    /// Every employee login code, for warming the availability filter.
    async fn employee_codes(&self) -> StoreResult<Vec<String>>;
}

#[async_trait]
pub trait LeaveStore: Send + Sync {
    async fn insert_leave(&self, leave: &LeaveRequest) -> StoreResult<()>;

    async fn find_leave(&self, id: &str) -> StoreResult<Option<LeaveRequest>>;

    /// Every leave request, most recently applied first.
    async fn list_leaves(&self) -> StoreResult<Vec<LeaveRequest>>;

    /// Requests owned by one employee principal, most recently applied first.
    async fn list_leaves_by_employee(&self, employee_id: &str) -> StoreResult<Vec<LeaveRequest>>;

    /// Atomic compare-and-set on `status`: writes `to` only if the stored
    /// status is still `from`. Returns whether the write happened.
    async fn transition_status(
        &self,
        id: &str,
        from: LeaveStatus,
        to: LeaveStatus,
    ) -> StoreResult<bool>;
}

#[async_trait]
pub trait DepartmentStore: Send + Sync {
    async fn find_department(&self, id: &str) -> StoreResult<Option<Department>>;

    /// All departments in insertion order; callers sort and page.
    async fn list_departments(&self) -> StoreResult<Vec<Department>>;

    /// Fails with [`StoreError::Conflict`] when the name is taken.
    async fn insert_department(&self, department: &Department) -> StoreResult<()>;

    /// Returns `false` when no department has `department.id`. Fails with
    /// [`StoreError::Conflict`] when renaming onto a taken name.
    async fn update_department(&self, department: &Department) -> StoreResult<bool>;

    async fn delete_department(&self, id: &str) -> StoreResult<bool>;
}

#[async_trait]
pub trait SalaryStore: Send + Sync {
    async fn find_salary(&self, id: &str) -> StoreResult<Option<SalaryRecord>>;

    /// Newest pay date first; `employee_id` narrows to one employee.
    async fn list_salaries(&self, employee_id: Option<&str>) -> StoreResult<Vec<SalaryRecord>>;

    async fn insert_salary(&self, record: &SalaryRecord) -> StoreResult<()>;

    async fn update_salary(&self, record: &SalaryRecord) -> StoreResult<bool>;

    async fn delete_salary(&self, id: &str) -> StoreResult<bool>;
}
