use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

/// Employee account. Identified at login by `employee_id`, the human-facing
/// code such as `EMP001`; `id` is the opaque key every token and leave record
/// refers to.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(
    example = json!({
        "id": "5f0c6c1e-6f43-4bd4-9a39-1f0cf1a3c1f2",
        "name": "John Doe",
        "employeeId": "EMP001",
        "email": "john.doe@company.com",
        "department": "Engineering",
        "designation": "Backend Developer",
        "salary": 52000.0,
        "dateOfBirth": "1994-05-17",
        "gender": "male",
        "maritalStatus": "single",
        "image": "1723890000-john.png"
    })
)]
pub struct Employee {
    #[schema(example = "5f0c6c1e-6f43-4bd4-9a39-1f0cf1a3c1f2")]
    pub id: String,

    #[schema(example = "John Doe")]
    pub name: String,

    #[schema(example = "EMP001")]
    pub employee_id: String,

    #[schema(example = "john.doe@company.com")]
    pub email: String,

    #[serde(skip_serializing)]
    pub password_hash: String,

    #[schema(example = "Engineering")]
    pub department: String,

    #[schema(example = "Backend Developer")]
    pub designation: String,

    #[schema(example = 52000.0)]
    pub salary: f64,

    #[schema(example = "1994-05-17", value_type = Option<String>, format = "date")]
    pub date_of_birth: Option<NaiveDate>,

    #[schema(example = "male", nullable = true)]
    pub gender: Option<String>,

    #[schema(example = "single", nullable = true)]
    pub marital_status: Option<String>,

    /// Opaque reference to an uploaded picture; storage lives elsewhere.
    #[schema(example = "1723890000-john.png", nullable = true)]
    pub image: Option<String>,
}

/// Owner's display fields, joined onto admin listings of leave and salary records.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRef {
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "EMP001")]
    pub employee_id: String,
}

impl From<Employee> for EmployeeRef {
    fn from(e: Employee) -> Self {
        EmployeeRef {
            name: e.name,
            employee_id: e.employee_id,
        }
    }
}
