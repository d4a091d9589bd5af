use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "admission_no": "ADM-2024-001",
        "first_name": "Ayesha",
        "last_name": "Khan",
        "gender": "female",
        "dob": "2012-04-17",
        "class_id": 3,
        "section_id": 7,
        "address": "12 School Road",
        "phone": "+8801712345678",
        "email": "parent@example.com"
    })
)]
pub struct Student {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "ADM-2024-001", nullable = true)]
    pub admission_no: Option<String>,

    #[schema(example = "Ayesha")]
    pub first_name: String,

    #[schema(example = "Khan", nullable = true)]
    pub last_name: Option<String>,

    #[schema(example = "female", nullable = true)]
    pub gender: Option<String>,

    #[schema(example = "2012-04-17", value_type = String, format = "date", nullable = true)]
    pub dob: Option<NaiveDate>,

    #[schema(example = 3, nullable = true)]
    pub class_id: Option<u64>,

    #[schema(example = 7, nullable = true)]
    pub section_id: Option<u64>,

    #[schema(nullable = true)]
    pub address: Option<String>,

    #[schema(example = "+8801712345678", nullable = true)]
    pub phone: Option<String>,

    #[schema(format = "email", nullable = true)]
    pub email: Option<String>,

    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Roster projection used by the attendance and report pages.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct StudentLite {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "ADM-2024-001", nullable = true)]
    pub admission_no: Option<String>,
    #[schema(example = "Ayesha")]
    pub first_name: String,
    #[schema(example = "Khan", nullable = true)]
    pub last_name: Option<String>,
}

/// Payload shape shared by the admission form and the CSV importer. Every
/// field except `first_name` is optional; unset class/section references
/// stay NULL.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewStudent {
    #[schema(example = "ADM-2024-001", nullable = true)]
    pub admission_no: Option<String>,
    #[schema(example = "Ayesha")]
    pub first_name: String,
    #[schema(example = "Khan", nullable = true)]
    pub last_name: Option<String>,
    #[schema(example = "female", nullable = true)]
    pub gender: Option<String>,
    #[schema(example = "2012-04-17", value_type = String, format = "date", nullable = true)]
    pub dob: Option<NaiveDate>,
    #[schema(example = 3, nullable = true)]
    pub class_id: Option<u64>,
    #[schema(example = 7, nullable = true)]
    pub section_id: Option<u64>,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[schema(format = "email", nullable = true)]
    pub email: Option<String>,
    #[serde(default)]
    pub guardians: Vec<NewGuardian>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewGuardian {
    #[schema(example = "Imran Khan")]
    pub name: String,
    #[schema(example = "father")]
    pub relation: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub occupation: Option<String>,
    pub address: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}

impl Student {
    /// Display name built from the name parts, em-dash when both are empty.
    pub fn full_name(first: Option<&str>, last: Option<&str>) -> String {
        let name = [first, last]
            .iter()
            .filter_map(|p| *p)
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if name.is_empty() { "—".to_string() } else { name }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_joins_parts() {
        assert_eq!(Student::full_name(Some("Ayesha"), Some("Khan")), "Ayesha Khan");
        assert_eq!(Student::full_name(Some("Ayesha"), None), "Ayesha");
        assert_eq!(Student::full_name(None, Some("Khan")), "Khan");
    }

    #[test]
    fn full_name_falls_back_to_dash() {
        assert_eq!(Student::full_name(None, None), "—");
        assert_eq!(Student::full_name(Some(""), Some("")), "—");
    }
}
