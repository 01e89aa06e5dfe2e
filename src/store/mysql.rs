use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use futures_util::StreamExt;
use sqlx::{FromRow, MySqlPool};

use super::{DepartmentStore, LeaveStore, PrincipalStore, SalaryStore, StoreError, StoreResult};
use crate::model::{
    admin::Admin,
    department::Department,
    employee::Employee,
    leave_request::{LeaveRequest, LeaveStatus, LeaveType},
    salary::SalaryRecord,
};

pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn map_err(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) | sqlx::Error::ColumnNotFound(_) => {
            StoreError::Corrupt(e.to_string())
        }
        _ => StoreError::Unavailable(e.to_string()),
    }
}

/// Duplicate key (SQLSTATE 23000) becomes a conflict; anything else is mapped as usual.
fn map_insert_err(e: sqlx::Error, conflict: impl FnOnce() -> String) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.code().as_deref() == Some("23000") {
            return StoreError::Conflict(conflict());
        }
    }
    map_err(e)
}

#[derive(FromRow)]
struct AdminRow {
    id: String,
    name: String,
    email: String,
    password_hash: String,
}

impl From<AdminRow> for Admin {
    fn from(row: AdminRow) -> Self {
        Admin {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
        }
    }
}

#[derive(FromRow)]
struct EmployeeRow {
    id: String,
    name: String,
    employee_code: String,
    email: String,
    password_hash: String,
    department: String,
    designation: String,
    salary: f64,
    date_of_birth: Option<NaiveDate>,
    gender: Option<String>,
    marital_status: Option<String>,
    image: Option<String>,
}

impl From<EmployeeRow> for Employee {
    fn from(row: EmployeeRow) -> Self {
        Employee {
            id: row.id,
            name: row.name,
            employee_id: row.employee_code,
            email: row.email,
            password_hash: row.password_hash,
            department: row.department,
            designation: row.designation,
            salary: row.salary,
            date_of_birth: row.date_of_birth,
            gender: row.gender,
            marital_status: row.marital_status,
            image: row.image,
        }
    }
}

#[derive(FromRow)]
struct LeaveRow {
    id: String,
    employee_id: String,
    leave_type: String,
    from_date: NaiveDate,
    to_date: NaiveDate,
    reason: String,
    status: String,
    applied_at: DateTime<Utc>,
}

impl TryFrom<LeaveRow> for LeaveRequest {
    type Error = StoreError;

    fn try_from(row: LeaveRow) -> Result<Self, Self::Error> {
        let leave_type = row
            .leave_type
            .parse::<LeaveType>()
            .map_err(|_| StoreError::Corrupt(format!("leave {}: type {}", row.id, row.leave_type)))?;
        let status = row
            .status
            .parse::<LeaveStatus>()
            .map_err(|_| StoreError::Corrupt(format!("leave {}: status {}", row.id, row.status)))?;

        Ok(LeaveRequest {
            id: row.id,
            employee_id: row.employee_id,
            leave_type,
            from_date: row.from_date,
            to_date: row.to_date,
            reason: row.reason,
            status,
            applied_at: row.applied_at,
        })
    }
}

#[derive(FromRow)]
struct DepartmentRow {
    id: String,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<DepartmentRow> for Department {
    fn from(row: DepartmentRow) -> Self {
        Department {
            id: row.id,
            name: row.name,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct SalaryRow {
    id: String,
    employee_id: String,
    salary: f64,
    allowance: f64,
    deduction: f64,
    total: f64,
    pay_date: NaiveDate,
}

impl From<SalaryRow> for SalaryRecord {
    fn from(row: SalaryRow) -> Self {
        SalaryRecord {
            id: row.id,
            employee_id: row.employee_id,
            salary: row.salary,
            allowance: row.allowance,
            deduction: row.deduction,
            total: row.total,
            pay_date: row.pay_date,
        }
    }
}

const SALARY_COLUMNS: &str = "id, employee_id, salary, allowance, deduction, total, pay_date";

const EMPLOYEE_COLUMNS: &str = "id, name, employee_code, email, password_hash, department, \
     designation, salary, date_of_birth, gender, marital_status, image";

const LEAVE_COLUMNS: &str =
    "id, employee_id, leave_type, from_date, to_date, reason, status, applied_at";

fn decode_leaves(rows: Vec<LeaveRow>) -> StoreResult<Vec<LeaveRequest>> {
    rows.into_iter().map(LeaveRequest::try_from).collect()
}

#[async_trait]
impl PrincipalStore for MySqlStore {
    async fn find_admin_by_id(&self, id: &str) -> StoreResult<Option<Admin>> {
        let row = sqlx::query_as::<_, AdminRow>(
            "SELECT id, name, email, password_hash FROM admins WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)?;

        Ok(row.map(Admin::from))
    }

    async fn find_admin_by_email(&self, email: &str) -> StoreResult<Option<Admin>> {
        let row = sqlx::query_as::<_, AdminRow>(
            "SELECT id, name, email, password_hash FROM admins WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)?;

        Ok(row.map(Admin::from))
    }

    async fn insert_admin(&self, admin: &Admin) -> StoreResult<()> {
        sqlx::query("INSERT INTO admins (id, name, email, password_hash) VALUES (?, ?, ?, ?)")
            .bind(&admin.id)
            .bind(&admin.name)
            .bind(&admin.email)
            .bind(&admin.password_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                map_insert_err(e, || {
                    format!("An admin with email {} already exists", admin.email)
                })
            })?;

        Ok(())
    }

    async fn find_employee_by_id(&self, id: &str) -> StoreResult<Option<Employee>> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?");
        let row = sqlx::query_as::<_, EmployeeRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_err)?;

        Ok(row.map(Employee::from))
    }

    async fn find_employee_by_code(&self, employee_id: &str) -> StoreResult<Option<Employee>> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE employee_code = ?");
        let row = sqlx::query_as::<_, EmployeeRow>(&sql)
            .bind(employee_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_err)?;

        Ok(row.map(Employee::from))
    }

    async fn list_employees(&self) -> StoreResult<Vec<Employee>> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees ORDER BY seq DESC");
        let rows = sqlx::query_as::<_, EmployeeRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_err)?;

        Ok(rows.into_iter().map(Employee::from).collect())
    }

    async fn insert_employee(&self, employee: &Employee) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO employees
                (id, name, employee_code, email, password_hash, department,
                 designation, salary, date_of_birth, gender, marital_status, image)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&employee.id)
        .bind(&employee.name)
        .bind(&employee.employee_id)
        .bind(&employee.email)
        .bind(&employee.password_hash)
        .bind(&employee.department)
        .bind(&employee.designation)
        .bind(employee.salary)
        .bind(employee.date_of_birth)
        .bind(&employee.gender)
        .bind(&employee.marital_status)
        .bind(&employee.image)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_insert_err(e, || {
                format!(
                    "An employee with employeeId {} already exists",
                    employee.employee_id
                )
            })
        })?;

        Ok(())
    }

    async fn update_employee(&self, employee: &Employee) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE employees
            SET name = ?, email = ?, password_hash = ?, department = ?, designation = ?,
                salary = ?, date_of_birth = ?, gender = ?, marital_status = ?, image = ?
            WHERE id = ?
            "#,
        )
        .bind(&employee.name)
        .bind(&employee.email)
        .bind(&employee.password_hash)
        .bind(&employee.department)
        .bind(&employee.designation)
        .bind(employee.salary)
        .bind(employee.date_of_birth)
        .bind(&employee.gender)
        .bind(&employee.marital_status)
        .bind(&employee.image)
        .bind(&employee.id)
        .execute(&self.pool)
        .await
        .map_err(map_err)?;

        // An update that changes nothing reports zero rows; tell that apart from a missing id.
        if result.rows_affected() > 0 {
            return Ok(true);
        }
        Ok(self.find_employee_by_id(&employee.id).await?.is_some())
    }

    async fn delete_employee(&self, id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM employees WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn employee_codes(&self) -> StoreResult<Vec<String>> {
        let mut stream =
            sqlx::query_scalar::<_, String>("SELECT employee_code FROM employees").fetch(&self.pool);

        let mut codes = Vec::new();
        while let Some(row) = stream.next().await {
            codes.push(row.map_err(map_err)?);
        }
        Ok(codes)
    }
}

#[async_trait]
impl LeaveStore for MySqlStore {
    async fn insert_leave(&self, leave: &LeaveRequest) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO leave_requests
                (id, employee_id, leave_type, from_date, to_date, reason, status, applied_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&leave.id)
        .bind(&leave.employee_id)
        .bind(leave.leave_type.to_string())
        .bind(leave.from_date)
        .bind(leave.to_date)
        .bind(&leave.reason)
        .bind(leave.status.to_string())
        .bind(leave.applied_at)
        .execute(&self.pool)
        .await
        .map_err(map_err)?;

        Ok(())
    }

    async fn find_leave(&self, id: &str) -> StoreResult<Option<LeaveRequest>> {
        let sql = format!("SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE id = ?");
        let row = sqlx::query_as::<_, LeaveRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_err)?;

        row.map(LeaveRequest::try_from).transpose()
    }

    async fn list_leaves(&self) -> StoreResult<Vec<LeaveRequest>> {
        let sql = format!(
            "SELECT {LEAVE_COLUMNS} FROM leave_requests ORDER BY applied_at DESC, seq DESC"
        );
        let rows = sqlx::query_as::<_, LeaveRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_err)?;

        decode_leaves(rows)
    }

    async fn list_leaves_by_employee(&self, employee_id: &str) -> StoreResult<Vec<LeaveRequest>> {
        let sql = format!(
            "SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE employee_id = ? \
             ORDER BY applied_at DESC, seq DESC"
        );
        let rows = sqlx::query_as::<_, LeaveRow>(&sql)
            .bind(employee_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_err)?;

        decode_leaves(rows)
    }

    async fn transition_status(
        &self,
        id: &str,
        from: LeaveStatus,
        to: LeaveStatus,
    ) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE leave_requests
            SET status = ?
            WHERE id = ?
            AND status = ?
            "#,
        )
        .bind(to.to_string())
        .bind(id)
        .bind(from.to_string())
        .execute(&self.pool)
        .await
        .map_err(map_err)?;

        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl DepartmentStore for MySqlStore {
    async fn find_department(&self, id: &str) -> StoreResult<Option<Department>> {
        let row = sqlx::query_as::<_, DepartmentRow>(
            "SELECT id, name, description, created_at FROM departments WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)?;

        Ok(row.map(Department::from))
    }

    async fn list_departments(&self) -> StoreResult<Vec<Department>> {
        let rows = sqlx::query_as::<_, DepartmentRow>(
            "SELECT id, name, description, created_at FROM departments ORDER BY seq",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)?;

        Ok(rows.into_iter().map(Department::from).collect())
    }

    async fn insert_department(&self, department: &Department) -> StoreResult<()> {
        sqlx::query("INSERT INTO departments (id, name, description, created_at) VALUES (?, ?, ?, ?)")
            .bind(&department.id)
            .bind(&department.name)
            .bind(&department.description)
            .bind(department.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                map_insert_err(e, || {
                    format!("A department named {} already exists", department.name)
                })
            })?;

        Ok(())
    }

    async fn update_department(&self, department: &Department) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE departments SET name = ?, description = ? WHERE id = ?")
            .bind(&department.name)
            .bind(&department.description)
            .bind(&department.id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                map_insert_err(e, || {
                    format!("A department named {} already exists", department.name)
                })
            })?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }
        Ok(self.find_department(&department.id).await?.is_some())
    }

    async fn delete_department(&self, id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM departments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl SalaryStore for MySqlStore {
    async fn find_salary(&self, id: &str) -> StoreResult<Option<SalaryRecord>> {
        let sql = format!("SELECT {SALARY_COLUMNS} FROM salaries WHERE id = ?");
        let row = sqlx::query_as::<_, SalaryRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_err)?;

        Ok(row.map(SalaryRecord::from))
    }

    async fn list_salaries(&self, employee_id: Option<&str>) -> StoreResult<Vec<SalaryRecord>> {
        let rows = match employee_id {
            Some(employee_id) => {
                let sql = format!(
                    "SELECT {SALARY_COLUMNS} FROM salaries WHERE employee_id = ? \
                     ORDER BY pay_date DESC, seq DESC"
                );
                sqlx::query_as::<_, SalaryRow>(&sql)
                    .bind(employee_id)
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                let sql =
                    format!("SELECT {SALARY_COLUMNS} FROM salaries ORDER BY pay_date DESC, seq DESC");
                sqlx::query_as::<_, SalaryRow>(&sql).fetch_all(&self.pool).await
            }
        }
        .map_err(map_err)?;

        Ok(rows.into_iter().map(SalaryRecord::from).collect())
    }

    async fn insert_salary(&self, record: &SalaryRecord) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO salaries (id, employee_id, salary, allowance, deduction, total, pay_date)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.employee_id)
        .bind(record.salary)
        .bind(record.allowance)
        .bind(record.deduction)
        .bind(record.total)
        .bind(record.pay_date)
        .execute(&self.pool)
        .await
        .map_err(map_err)?;

        Ok(())
    }

    async fn update_salary(&self, record: &SalaryRecord) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE salaries
            SET salary = ?, allowance = ?, deduction = ?, total = ?, pay_date = ?
            WHERE id = ?
            "#,
        )
        .bind(record.salary)
        .bind(record.allowance)
        .bind(record.deduction)
        .bind(record.total)
        .bind(record.pay_date)
        .bind(&record.id)
        .execute(&self.pool)
        .await
        .map_err(map_err)?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }
        Ok(self.find_salary(&record.id).await?.is_some())
    }

    async fn delete_salary(&self, id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM salaries WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;

        Ok(result.rows_affected() > 0)
    }
}
