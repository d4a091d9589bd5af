use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Guardian {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1)]
    pub student_id: u64,
    #[schema(example = "Imran Khan")]
    pub name: String,
    #[schema(example = "father")]
    pub relation: String,
    #[schema(nullable = true)]
    pub phone: Option<String>,
    #[schema(format = "email", nullable = true)]
    pub email: Option<String>,
    #[schema(nullable = true)]
    pub occupation: Option<String>,
    #[schema(nullable = true)]
    pub address: Option<String>,
    pub is_primary: bool,
}
