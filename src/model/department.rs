use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    #[schema(example = "9a1f4c7e-0d2b-4d8e-8f57-2f3b1c6a9e01")]
    pub id: String,

    /// Unique, compared case-insensitively.
    #[schema(example = "Engineering")]
    pub name: String,

    #[schema(example = "Builds and runs the product", nullable = true)]
    pub description: Option<String>,

    #[schema(example = "2025-07-30T09:12:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
}
