use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

/// One pay record. `total` is always `salary + allowance - deduction`; it is
/// recomputed on every write and never taken from the caller.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalaryRecord {
    #[schema(example = "c2d7e0b4-61a9-4f3e-9b0e-5b8d2a7f4c11")]
    pub id: String,

    /// Opaque id of the employee principal paid.
    #[schema(example = "5f0c6c1e-6f43-4bd4-9a39-1f0cf1a3c1f2")]
    pub employee_id: String,

    #[schema(example = 50000.0)]
    pub salary: f64,

    #[schema(example = 5000.0)]
    pub allowance: f64,

    #[schema(example = 2000.0)]
    pub deduction: f64,

    #[schema(example = 53000.0)]
    pub total: f64,

    #[schema(example = "2025-08-31", format = "date", value_type = String)]
    pub pay_date: NaiveDate,
}

impl SalaryRecord {
    pub fn net(salary: f64, allowance: f64, deduction: f64) -> f64 {
        salary + allowance - deduction
    }

    pub fn recompute_total(&mut self) {
        self.total = Self::net(self.salary, self.allowance, self.deduction);
    }
}
