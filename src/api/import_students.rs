use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use sqlx::MySqlPool;
use tracing::{error, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::student::{insert_guardians, insert_student};
use crate::error::AppError;
use crate::model::class::{SchoolClass, Section};
use crate::utils::csv::{RefLookups, map_row, parse_csv};

#[derive(Serialize, ToSchema)]
pub struct ImportResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(nullable = true)]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "ADM-2024-001", nullable = true)]
    pub admission_no: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ImportResponse {
    /// Correlation id for this run's log lines
    #[schema(example = "7f8d2f4e-0a44-4a0e-9c43-0f8a2a6a8f11")]
    pub run_id: String,
    #[schema(example = 27)]
    pub succeeded: usize,
    #[schema(example = 1)]
    pub failed: usize,
    pub results: Vec<ImportResult>,
}

/// Bulk import students from CSV text
///
/// Best-effort, row by row: one row's failure never aborts the batch, and
/// every submitted row produces exactly one result in input order. Rows with
/// a wrong field count or no resolvable first name are dropped before
/// submission and produce no result.
#[utoipa::path(
    post,
    path = "/api/students/import",
    request_body(content = String, content_type = "text/csv", description = "CSV file content, UTF-8"),
    responses(
        (status = 200, description = "Per-row import results", body = ImportResponse),
        (status = 400, description = "Not UTF-8, or no valid student rows"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Students"
)]
pub async fn import_students(
    pool: web::Data<MySqlPool>,
    body: web::Bytes,
) -> Result<impl Responder, AppError> {
    let text = std::str::from_utf8(&body)
        .map_err(|_| AppError::Validation("CSV must be UTF-8 text.".into()))?;

    let run_id = Uuid::new_v4();
    let pool = pool.get_ref();

    let rows = parse_csv(text);

    let classes: Vec<SchoolClass> = sqlx::query_as("SELECT id, name FROM classes")
        .fetch_all(pool)
        .await?;
    let sections: Vec<Section> = sqlx::query_as("SELECT id, class_id, name FROM sections")
        .fetch_all(pool)
        .await?;
    let lookups = RefLookups::new(&classes, &sections);

    let students: Vec<_> = rows.iter().filter_map(|r| map_row(r, &lookups)).collect();
    if students.is_empty() {
        return Err(AppError::Validation(
            "No valid student data found in CSV.".into(),
        ));
    }

    info!(
        %run_id,
        parsed = rows.len(),
        mapped = students.len(),
        "Starting student import"
    );

    let mut results = Vec::with_capacity(students.len());
    for student in &students {
        match insert_student(pool, student).await {
            Ok(student_id) => {
                if !student.guardians.is_empty() {
                    // The student row is already committed; guardian loss is
                    // reported in the logs only.
                    if let Err(e) = insert_guardians(pool, student_id, &student.guardians).await {
                        warn!(%run_id, student_id, error = %e, "Guardian insert failed");
                    }
                }
                results.push(ImportResult {
                    success: true,
                    error: None,
                    admission_no: student.admission_no.clone(),
                });
            }
            Err(e) => {
                error!(
                    %run_id,
                    admission_no = ?student.admission_no,
                    error = %e,
                    "Student insert failed"
                );
                results.push(ImportResult {
                    success: false,
                    error: Some(e.to_string()),
                    admission_no: student.admission_no.clone(),
                });
            }
        }
    }

    let succeeded = results.iter().filter(|r| r.success).count();
    let failed = results.len() - succeeded;
    info!(%run_id, succeeded, failed, "Student import finished");

    Ok(HttpResponse::Ok().json(ImportResponse {
        run_id: run_id.to_string(),
        succeeded,
        failed,
        results,
    }))
}
