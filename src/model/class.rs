use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct SchoolClass {
    #[schema(example = 3)]
    pub id: u64,
    #[schema(example = "Grade 5")]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Section {
    #[schema(example = 7)]
    pub id: u64,
    #[schema(example = 3)]
    pub class_id: u64,
    #[schema(example = "A")]
    pub name: String,
}
