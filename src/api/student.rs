use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::{debug, warn};
use utoipa::{IntoParams, ToSchema};

use crate::error::AppError;
use crate::model::guardian::Guardian;
use crate::model::student::{NewGuardian, NewStudent, Student};
use crate::utils::db_utils::{build_update_sql, execute_update};

/// Columns a partial student update may touch.
const STUDENT_COLUMNS: &[&str] = &[
    "admission_no",
    "first_name",
    "last_name",
    "gender",
    "dob",
    "class_id",
    "section_id",
    "address",
    "phone",
    "email",
];

#[derive(Debug, Deserialize, IntoParams)]
pub struct StudentQuery {
    /// Search by admission no, first name, or last name
    pub q: Option<String>,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct StudentListItem {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "ADM-2024-001", nullable = true)]
    pub admission_no: Option<String>,
    #[schema(example = "Ayesha")]
    pub first_name: String,
    #[schema(example = "Khan", nullable = true)]
    pub last_name: Option<String>,
    #[schema(example = "Grade 5", nullable = true)]
    pub class_name: Option<String>,
    #[schema(example = "A", nullable = true)]
    pub section_name: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct StudentListResponse {
    pub data: Vec<StudentListItem>,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceEntry {
    #[schema(example = "2024-03-04", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "present")]
    pub status: String,
}

#[derive(Serialize, ToSchema)]
pub struct StudentDetail {
    pub student: Student,
    pub guardians: Vec<Guardian>,
    pub recent_attendance: Vec<AttendanceEntry>,
}

/// List students, most recent first
#[utoipa::path(
    get,
    path = "/api/students",
    params(StudentQuery),
    responses(
        (status = 200, description = "Up to 50 most recent students", body = StudentListResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Students"
)]
pub async fn list_students(
    pool: web::Data<MySqlPool>,
    query: web::Query<StudentQuery>,
) -> Result<impl Responder, AppError> {
    let q = query.q.as_deref().map(str::trim).unwrap_or("");

    let base = "SELECT s.id, s.admission_no, s.first_name, s.last_name, \
                c.name AS class_name, sec.name AS section_name \
                FROM students s \
                LEFT JOIN classes c ON c.id = s.class_id \
                LEFT JOIN sections sec ON sec.id = s.section_id";

    let students: Vec<StudentListItem> = if q.is_empty() {
        sqlx::query_as(&format!("{base} ORDER BY s.created_at DESC LIMIT 50"))
            .fetch_all(pool.get_ref())
            .await?
    } else {
        let like = format!("%{}%", q);
        debug!(q, "Searching students");
        sqlx::query_as(&format!(
            "{base} WHERE s.admission_no LIKE ? OR s.first_name LIKE ? OR s.last_name LIKE ? \
             ORDER BY s.created_at DESC LIMIT 50"
        ))
        .bind(&like)
        .bind(&like)
        .bind(&like)
        .fetch_all(pool.get_ref())
        .await?
    };

    Ok(HttpResponse::Ok().json(StudentListResponse { data: students }))
}

/// Student profile with guardians and recent attendance
#[utoipa::path(
    get,
    path = "/api/students/{id}",
    params(("id", Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student found", body = StudentDetail),
        (status = 404, description = "Student not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Students"
)]
pub async fn get_student(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, AppError> {
    let student_id = path.into_inner();

    let student: Student = sqlx::query_as("SELECT * FROM students WHERE id = ?")
        .bind(student_id)
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or(AppError::NotFound("Student"))?;

    let guardians: Vec<Guardian> = sqlx::query_as(
        "SELECT * FROM guardians WHERE student_id = ? ORDER BY is_primary DESC, id",
    )
    .bind(student_id)
    .fetch_all(pool.get_ref())
    .await?;

    let recent: Vec<(NaiveDate, String)> = sqlx::query_as(
        "SELECT date, status FROM attendance_records \
         WHERE student_id = ? ORDER BY date DESC LIMIT 14",
    )
    .bind(student_id)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(StudentDetail {
        student,
        guardians,
        recent_attendance: recent
            .into_iter()
            .map(|(date, status)| AttendanceEntry { date, status })
            .collect(),
    }))
}

/// Admit a new student
#[utoipa::path(
    post,
    path = "/api/students",
    request_body = NewStudent,
    responses(
        (status = 200, description = "Student created", body = Object, example = json!({
            "id": 42,
            "message": "Student created"
        })),
        (status = 400, description = "Missing first name"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Students"
)]
pub async fn create_student(
    pool: web::Data<MySqlPool>,
    payload: web::Json<NewStudent>,
) -> Result<impl Responder, AppError> {
    let student = payload.into_inner();
    if student.first_name.trim().is_empty() {
        return Err(AppError::Validation("first_name is required".into()));
    }

    let student_id = insert_student(pool.get_ref(), &student).await?;

    if !student.guardians.is_empty() {
        // Student row is already committed; a guardian failure is logged,
        // not surfaced.
        if let Err(e) = insert_guardians(pool.get_ref(), student_id, &student.guardians).await {
            warn!(error = %e, student_id, "Guardian insert failed");
        }
    }

    Ok(HttpResponse::Ok().json(json!({
        "id": student_id,
        "message": "Student created"
    })))
}

/// Partially update a student
#[utoipa::path(
    put,
    path = "/api/students/{id}",
    params(("id", Path, description = "Student ID")),
    request_body = Object,
    responses(
        (status = 200, description = "Student updated"),
        (status = 400, description = "Empty payload or unknown field"),
        (status = 404, description = "Student not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Students"
)]
pub async fn update_student(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> Result<impl Responder, AppError> {
    let student_id = path.into_inner();

    let update = build_update_sql("students", &body, STUDENT_COLUMNS, "id", student_id)?;
    let affected = execute_update(pool.get_ref(), update).await?;

    if affected == 0 {
        return Err(AppError::NotFound("Student"));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Student updated" })))
}

/// Delete a student
#[utoipa::path(
    delete,
    path = "/api/students/{id}",
    params(("id", Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student deleted"),
        (status = 404, description = "Student not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Students"
)]
pub async fn delete_student(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, AppError> {
    let student_id = path.into_inner();

    let result = sqlx::query("DELETE FROM students WHERE id = ?")
        .bind(student_id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Student"));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Student deleted" })))
}

/// Insert one student row, returning its id. Shared with the CSV importer.
pub async fn insert_student(pool: &MySqlPool, s: &NewStudent) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO students \
         (admission_no, first_name, last_name, gender, dob, class_id, section_id, address, phone, email) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&s.admission_no)
    .bind(&s.first_name)
    .bind(&s.last_name)
    .bind(&s.gender)
    .bind(s.dob)
    .bind(s.class_id)
    .bind(s.section_id)
    .bind(&s.address)
    .bind(&s.phone)
    .bind(&s.email)
    .execute(pool)
    .await?;

    Ok(result.last_insert_id())
}

/// Insert guardian rows tied to an already-created student.
pub async fn insert_guardians(
    pool: &MySqlPool,
    student_id: u64,
    guardians: &[NewGuardian],
) -> Result<(), sqlx::Error> {
    for g in guardians {
        sqlx::query(
            "INSERT INTO guardians \
             (student_id, name, relation, phone, email, occupation, address, is_primary) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(student_id)
        .bind(&g.name)
        .bind(&g.relation)
        .bind(&g.phone)
        .bind(&g.email)
        .bind(&g.occupation)
        .bind(&g.address)
        .bind(g.is_primary)
        .execute(pool)
        .await?;
    }
    Ok(())
}
