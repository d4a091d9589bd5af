use std::str::FromStr;

use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::warn;
use utoipa::{IntoParams, ToSchema};

use crate::error::AppError;
use crate::model::attendance::AttendanceStatus;
use crate::model::student::StudentLite;

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid date format. Use YYYY-MM-DD.".into()))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct MarkingQuery {
    /// Marking date, defaults to today
    pub date: Option<String>,
    /// Class to load the roster for
    pub class_id: u64,
    /// Optional section filter
    pub section_id: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct MarkingStudent {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "ADM-2024-001", nullable = true)]
    pub admission_no: Option<String>,
    #[schema(example = "Ayesha")]
    pub first_name: String,
    #[schema(example = "Khan", nullable = true)]
    pub last_name: Option<String>,
    /// Status already recorded for the date, if any
    #[schema(nullable = true)]
    pub status: Option<AttendanceStatus>,
}

#[derive(Serialize, ToSchema)]
pub struct MarkingSheetResponse {
    #[schema(example = "2024-03-04", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "Grade 5", nullable = true)]
    pub class_name: Option<String>,
    #[schema(example = "A", nullable = true)]
    pub section_name: Option<String>,
    pub students: Vec<MarkingStudent>,
}

#[derive(Deserialize, ToSchema)]
pub struct MarkRecord {
    #[schema(example = 1)]
    pub student_id: u64,
    #[schema(example = "present")]
    pub status: AttendanceStatus,
}

#[derive(Deserialize, ToSchema)]
pub struct SaveAttendance {
    #[schema(example = "2024-03-04")]
    pub date: String,
    pub records: Vec<MarkRecord>,
}

/// Daily marking sheet: roster plus statuses already recorded for the date
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(MarkingQuery),
    responses(
        (status = 200, description = "Marking sheet", body = MarkingSheetResponse),
        (status = 400, description = "Invalid date"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn marking_sheet(
    pool: web::Data<MySqlPool>,
    query: web::Query<MarkingQuery>,
) -> Result<impl Responder, AppError> {
    let date = match &query.date {
        Some(d) => parse_date(d)?,
        None => chrono::Local::now().date_naive(),
    };

    let pool = pool.get_ref();
    let class_name = class_name(pool, query.class_id).await?;
    let section_name = match query.section_id {
        Some(id) => section_name(pool, id).await?,
        None => None,
    };

    let students = class_roster(pool, query.class_id, query.section_id).await?;

    let existing: Vec<(u64, String)> = sqlx::query_as(
        "SELECT ar.student_id, ar.status FROM attendance_records ar \
         JOIN students s ON s.id = ar.student_id \
         WHERE ar.date = ? AND s.class_id = ?",
    )
    .bind(date)
    .bind(query.class_id)
    .fetch_all(pool)
    .await?;

    let statuses: std::collections::HashMap<u64, AttendanceStatus> = existing
        .into_iter()
        .filter_map(|(id, s)| match AttendanceStatus::from_str(&s) {
            Ok(status) => Some((id, status)),
            Err(_) => {
                warn!(student_id = id, status = %s, "Skipping unknown attendance status");
                None
            }
        })
        .collect();

    let students = students
        .into_iter()
        .map(|s| MarkingStudent {
            status: statuses.get(&s.id).copied(),
            id: s.id,
            admission_no: s.admission_no,
            first_name: s.first_name,
            last_name: s.last_name,
        })
        .collect();

    Ok(HttpResponse::Ok().json(MarkingSheetResponse {
        date,
        class_name,
        section_name,
        students,
    }))
}

/// Save a day's marking as an upsert batch keyed (student_id, date)
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = SaveAttendance,
    responses(
        (status = 200, description = "Attendance saved", body = Object, example = json!({
            "ok": true,
            "saved": 28
        })),
        (status = 400, description = "Invalid date or empty record set"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn save_attendance(
    pool: web::Data<MySqlPool>,
    payload: web::Json<SaveAttendance>,
) -> Result<impl Responder, AppError> {
    let date = parse_date(&payload.date)?;

    if payload.records.is_empty() {
        return Err(AppError::Validation("No attendance records to save.".into()));
    }

    // Multi-row upsert; the unique (student_id, date) key makes the latest
    // write win.
    let placeholders = vec!["(?, ?, ?)"; payload.records.len()].join(", ");
    let sql = format!(
        "INSERT INTO attendance_records (student_id, date, status) VALUES {} \
         ON DUPLICATE KEY UPDATE status = VALUES(status)",
        placeholders
    );

    let mut query = sqlx::query(&sql);
    for record in &payload.records {
        query = query
            .bind(record.student_id)
            .bind(date)
            .bind(record.status.as_str());
    }
    query.execute(pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "ok": true,
        "saved": payload.records.len()
    })))
}

#[derive(Serialize, ToSchema)]
pub struct Absentee {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "ADM-2024-001", nullable = true)]
    pub admission_no: Option<String>,
    #[schema(example = "Ayesha")]
    pub first_name: String,
    #[schema(example = "Khan", nullable = true)]
    pub last_name: Option<String>,
    #[schema(example = "absent")]
    pub status: AttendanceStatus,
}

#[derive(Serialize, ToSchema)]
pub struct AbsenteeListResponse {
    #[schema(example = "2024-03-04", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "Grade 5", nullable = true)]
    pub class_name: Option<String>,
    #[schema(example = "A", nullable = true)]
    pub section_name: Option<String>,
    pub absentees: Vec<Absentee>,
}

/// Students marked absent or on leave for a date
#[utoipa::path(
    get,
    path = "/api/attendance/absentees",
    params(MarkingQuery),
    responses(
        (status = 200, description = "Absentee list", body = AbsenteeListResponse),
        (status = 400, description = "Invalid date"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn absentees(
    pool: web::Data<MySqlPool>,
    query: web::Query<MarkingQuery>,
) -> Result<impl Responder, AppError> {
    let date = match &query.date {
        Some(d) => parse_date(d)?,
        None => chrono::Local::now().date_naive(),
    };

    let pool = pool.get_ref();
    let class_name = class_name(pool, query.class_id).await?;
    let section_name = match query.section_id {
        Some(id) => section_name(pool, id).await?,
        None => None,
    };

    let mut sql = String::from(
        "SELECT s.id, s.admission_no, s.first_name, s.last_name, ar.status \
         FROM students s \
         JOIN attendance_records ar ON ar.student_id = s.id \
         WHERE ar.date = ? AND s.class_id = ? AND ar.status IN ('absent', 'leave')",
    );
    if query.section_id.is_some() {
        sql.push_str(" AND s.section_id = ?");
    }
    sql.push_str(" ORDER BY s.created_at");

    let mut rows = sqlx::query_as::<_, (u64, Option<String>, String, Option<String>, String)>(&sql)
        .bind(date)
        .bind(query.class_id);
    if let Some(section_id) = query.section_id {
        rows = rows.bind(section_id);
    }
    let rows = rows.fetch_all(pool).await?;

    let absentees = rows
        .into_iter()
        .filter_map(|(id, admission_no, first_name, last_name, status)| {
            match AttendanceStatus::from_str(&status) {
                Ok(status) => Some(Absentee {
                    id,
                    admission_no,
                    first_name,
                    last_name,
                    status,
                }),
                Err(_) => None,
            }
        })
        .collect();

    Ok(HttpResponse::Ok().json(AbsenteeListResponse {
        date,
        class_name,
        section_name,
        absentees,
    }))
}

pub(crate) async fn class_name(
    pool: &MySqlPool,
    class_id: u64,
) -> Result<Option<String>, AppError> {
    let name = sqlx::query_scalar("SELECT name FROM classes WHERE id = ?")
        .bind(class_id)
        .fetch_optional(pool)
        .await?;
    Ok(name)
}

pub(crate) async fn section_name(
    pool: &MySqlPool,
    section_id: u64,
) -> Result<Option<String>, AppError> {
    let name = sqlx::query_scalar("SELECT name FROM sections WHERE id = ?")
        .bind(section_id)
        .fetch_optional(pool)
        .await?;
    Ok(name)
}

/// Students of a class, optionally narrowed to one section, admission order.
pub(crate) async fn class_roster(
    pool: &MySqlPool,
    class_id: u64,
    section_id: Option<u64>,
) -> Result<Vec<StudentLite>, AppError> {
    let students = if let Some(section_id) = section_id {
        sqlx::query_as(
            "SELECT id, admission_no, first_name, last_name FROM students \
             WHERE class_id = ? AND section_id = ? ORDER BY created_at",
        )
        .bind(class_id)
        .bind(section_id)
        .fetch_all(pool)
        .await?
    } else {
        sqlx::query_as(
            "SELECT id, admission_no, first_name, last_name FROM students \
             WHERE class_id = ? ORDER BY created_at",
        )
        .bind(class_id)
        .fetch_all(pool)
        .await?
    };
    Ok(students)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_iso_dates() {
        assert_eq!(
            parse_date("2024-01-31").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()
        );
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(parse_date("31/01/2024").is_err());
        assert!(parse_date("2024-13-01").is_err());
        assert!(parse_date("today").is_err());
    }
}
