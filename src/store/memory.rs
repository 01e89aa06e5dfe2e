use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{DepartmentStore, LeaveStore, PrincipalStore, SalaryStore, StoreError, StoreResult};
use crate::model::{
    admin::Admin,
    department::Department,
    employee::Employee,
    leave_request::{LeaveRequest, LeaveStatus},
    salary::SalaryRecord,
};

/// Process-local store. Collections keep insertion order; every operation
/// completes inside a single lock acquisition, so the status
/// compare-and-set is atomic with respect to concurrent callers.
#[derive(Default)]
pub struct MemoryStore {
    admins: Mutex<Vec<Admin>>,
    employees: Mutex<Vec<Employee>>,
    leaves: Mutex<Vec<LeaveRequest>>,
    departments: Mutex<Vec<Department>>,
    salaries: Mutex<Vec<SalaryRecord>>,
}

fn lock<T>(m: &Mutex<T>) -> StoreResult<MutexGuard<'_, T>> {
    m.lock()
        .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
}

/// Newest first: reverse insertion order, then a stable sort on `applied_at`
/// so equal timestamps keep the later insert in front.
fn newest_first(mut leaves: Vec<LeaveRequest>) -> Vec<LeaveRequest> {
    leaves.reverse();
    leaves.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));
    leaves
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PrincipalStore for MemoryStore {
    async fn find_admin_by_id(&self, id: &str) -> StoreResult<Option<Admin>> {
        Ok(lock(&self.admins)?.iter().find(|a| a.id == id).cloned())
    }

    async fn find_admin_by_email(&self, email: &str) -> StoreResult<Option<Admin>> {
        Ok(lock(&self.admins)?
            .iter()
            .find(|a| a.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn insert_admin(&self, admin: &Admin) -> StoreResult<()> {
        let mut admins = lock(&self.admins)?;
        if admins.iter().any(|a| a.email.eq_ignore_ascii_case(&admin.email)) {
            return Err(StoreError::Conflict(format!(
                "An admin with email {} already exists",
                admin.email
            )));
        }
        admins.push(admin.clone());
        Ok(())
    }

    async fn find_employee_by_id(&self, id: &str) -> StoreResult<Option<Employee>> {
        Ok(lock(&self.employees)?.iter().find(|e| e.id == id).cloned())
    }

    async fn find_employee_by_code(&self, employee_id: &str) -> StoreResult<Option<Employee>> {
        Ok(lock(&self.employees)?
            .iter()
            .find(|e| e.employee_id == employee_id)
            .cloned())
    }

    async fn list_employees(&self) -> StoreResult<Vec<Employee>> {
        Ok(lock(&self.employees)?.iter().rev().cloned().collect())
    }

    async fn insert_employee(&self, employee: &Employee) -> StoreResult<()> {
        let mut employees = lock(&self.employees)?;
        if employees.iter().any(|e| e.employee_id == employee.employee_id) {
            return Err(StoreError::Conflict(format!(
                "An employee with employeeId {} already exists",
                employee.employee_id
            )));
        }
        employees.push(employee.clone());
        Ok(())
    }

    async fn update_employee(&self, employee: &Employee) -> StoreResult<bool> {
        let mut employees = lock(&self.employees)?;
        match employees.iter_mut().find(|e| e.id == employee.id) {
            Some(slot) => {
                *slot = employee.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_employee(&self, id: &str) -> StoreResult<bool> {
        let mut employees = lock(&self.employees)?;
        let before = employees.len();
        employees.retain(|e| e.id != id);
        Ok(employees.len() != before)
    }

    async fn employee_codes(&self) -> StoreResult<Vec<String>> {
        Ok(lock(&self.employees)?
            .iter()
            .map(|e| e.employee_id.clone())
            .collect())
    }
}

#[async_trait]
impl LeaveStore for MemoryStore {
    async fn insert_leave(&self, leave: &LeaveRequest) -> StoreResult<()> {
        lock(&self.leaves)?.push(leave.clone());
        Ok(())
    }

    async fn find_leave(&self, id: &str) -> StoreResult<Option<LeaveRequest>> {
        Ok(lock(&self.leaves)?.iter().find(|l| l.id == id).cloned())
    }

    async fn list_leaves(&self) -> StoreResult<Vec<LeaveRequest>> {
        let snapshot = lock(&self.leaves)?.clone();
        Ok(newest_first(snapshot))
    }

    async fn list_leaves_by_employee(&self, employee_id: &str) -> StoreResult<Vec<LeaveRequest>> {
        let owned = lock(&self.leaves)?
            .iter()
            .filter(|l| l.employee_id == employee_id)
            .cloned()
            .collect();
        Ok(newest_first(owned))
    }

    async fn transition_status(
        &self,
        id: &str,
        from: LeaveStatus,
        to: LeaveStatus,
    ) -> StoreResult<bool> {
        let mut leaves = lock(&self.leaves)?;
        match leaves.iter_mut().find(|l| l.id == id) {
            Some(leave) if leave.status == from => {
                leave.status = to;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl DepartmentStore for MemoryStore {
    async fn find_department(&self, id: &str) -> StoreResult<Option<Department>> {
        Ok(lock(&self.departments)?.iter().find(|d| d.id == id).cloned())
    }

    async fn list_departments(&self) -> StoreResult<Vec<Department>> {
        Ok(lock(&self.departments)?.clone())
    }

    async fn insert_department(&self, department: &Department) -> StoreResult<()> {
        let mut departments = lock(&self.departments)?;
        if departments
            .iter()
            .any(|d| d.name.eq_ignore_ascii_case(&department.name))
        {
            return Err(department_conflict(&department.name));
        }
        departments.push(department.clone());
        Ok(())
    }

    async fn update_department(&self, department: &Department) -> StoreResult<bool> {
        let mut departments = lock(&self.departments)?;
        if departments
            .iter()
            .any(|d| d.id != department.id && d.name.eq_ignore_ascii_case(&department.name))
        {
            return Err(department_conflict(&department.name));
        }
        match departments.iter_mut().find(|d| d.id == department.id) {
            Some(slot) => {
                *slot = department.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_department(&self, id: &str) -> StoreResult<bool> {
        let mut departments = lock(&self.departments)?;
        let before = departments.len();
        departments.retain(|d| d.id != id);
        Ok(departments.len() != before)
    }
}

fn department_conflict(name: &str) -> StoreError {
    StoreError::Conflict(format!("A department named {name} already exists"))
}

#[async_trait]
impl SalaryStore for MemoryStore {
    async fn find_salary(&self, id: &str) -> StoreResult<Option<SalaryRecord>> {
        Ok(lock(&self.salaries)?.iter().find(|r| r.id == id).cloned())
    }

    async fn list_salaries(&self, employee_id: Option<&str>) -> StoreResult<Vec<SalaryRecord>> {
        let mut records: Vec<SalaryRecord> = lock(&self.salaries)?
            .iter()
            .filter(|r| employee_id.is_none_or(|id| r.employee_id == id))
            .cloned()
            .collect();
        records.reverse();
        records.sort_by(|a, b| b.pay_date.cmp(&a.pay_date));
        Ok(records)
    }

    async fn insert_salary(&self, record: &SalaryRecord) -> StoreResult<()> {
        lock(&self.salaries)?.push(record.clone());
        Ok(())
    }

    async fn update_salary(&self, record: &SalaryRecord) -> StoreResult<bool> {
        let mut salaries = lock(&self.salaries)?;
        match salaries.iter_mut().find(|r| r.id == record.id) {
            Some(slot) => {
                *slot = record.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_salary(&self, id: &str) -> StoreResult<bool> {
        let mut salaries = lock(&self.salaries)?;
        let before = salaries.len();
        salaries.retain(|r| r.id != id);
        Ok(salaries.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::leave_request::LeaveType;
    use chrono::{NaiveDate, Utc};

    fn leave(id: &str, owner: &str) -> LeaveRequest {
        LeaveRequest {
            id: id.into(),
            employee_id: owner.into(),
            leave_type: LeaveType::Casual,
            from_date: NaiveDate::from_ymd_opt(2025, 8, 5).unwrap(),
            to_date: NaiveDate::from_ymd_opt(2025, 8, 7).unwrap(),
            reason: "Family trip".into(),
            status: LeaveStatus::Pending,
            applied_at: Utc::now(),
        }
    }

    #[actix_web::test]
    async fn compare_and_set_only_moves_from_expected_status() {
        let store = MemoryStore::new();
        store.insert_leave(&leave("l1", "e1")).await.unwrap();

        assert!(
            store
                .transition_status("l1", LeaveStatus::Pending, LeaveStatus::Approved)
                .await
                .unwrap()
        );
        assert!(
            !store
                .transition_status("l1", LeaveStatus::Pending, LeaveStatus::Rejected)
                .await
                .unwrap()
        );
        assert!(
            !store
                .transition_status("missing", LeaveStatus::Pending, LeaveStatus::Rejected)
                .await
                .unwrap()
        );

        let stored = store.find_leave("l1").await.unwrap().unwrap();
        assert_eq!(stored.status, LeaveStatus::Approved);
    }

    #[actix_web::test]
    async fn equal_timestamps_list_latest_insert_first() {
        let store = MemoryStore::new();
        let first = leave("l1", "e1");
        let mut second = leave("l2", "e1");
        second.applied_at = first.applied_at;
        store.insert_leave(&first).await.unwrap();
        store.insert_leave(&second).await.unwrap();

        let ids: Vec<_> = store
            .list_leaves_by_employee("e1")
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(ids, vec!["l2", "l1"]);
    }
}
