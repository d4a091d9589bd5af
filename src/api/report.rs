use std::str::FromStr;

use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::warn;
use utoipa::{IntoParams, ToSchema};

use crate::api::attendance::{class_name, class_roster, section_name};
use crate::error::AppError;
use crate::model::attendance::AttendanceStatus;
use crate::model::student::Student;
use crate::utils::summary::{StatusCounts, summarize};

/// Closed [start, end] interval covering a YYYY-MM month, plus its day count.
pub(crate) fn month_range(month: &str) -> Result<(NaiveDate, NaiveDate, u32), AppError> {
    let invalid = || AppError::Validation("Invalid month format. Use YYYY-MM.".into());

    let start = NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d")
        .map_err(|_| invalid())?;

    let (next_year, next_month) = if start.month() == 12 {
        (start.year() + 1, 1)
    } else {
        (start.year(), start.month() + 1)
    };
    let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .ok_or_else(invalid)?;

    Ok((start, end, end.day()))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ReportQuery {
    /// Report month as YYYY-MM, defaults to the current month
    pub month: Option<String>,
    /// Class to report on
    pub class_id: u64,
    /// Optional section filter
    pub section_id: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct StudentSummary {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "ADM-2024-001", nullable = true)]
    pub admission_no: Option<String>,
    #[schema(example = "Ayesha Khan")]
    pub name: String,
    #[serde(flatten)]
    pub counts: StatusCounts,
    /// (present + late) / marked to one decimal place; null when nothing
    /// was marked
    #[schema(example = 90.9, nullable = true)]
    pub percent: Option<f64>,
}

#[derive(Serialize, ToSchema)]
pub struct MonthlyReportResponse {
    #[schema(example = "2024-03")]
    pub month: String,
    #[schema(example = "2024-03-01", value_type = String, format = "date")]
    pub start: NaiveDate,
    #[schema(example = "2024-03-31", value_type = String, format = "date")]
    pub end: NaiveDate,
    #[schema(example = 31)]
    pub days_in_month: u32,
    #[schema(example = "Grade 5", nullable = true)]
    pub class_name: Option<String>,
    #[schema(example = "A", nullable = true)]
    pub section_name: Option<String>,
    pub summary: Vec<StudentSummary>,
}

/// Monthly attendance report: per-student counts and percentage
#[utoipa::path(
    get,
    path = "/api/attendance/report",
    params(ReportQuery),
    responses(
        (status = 200, description = "Monthly summary per student", body = MonthlyReportResponse),
        (status = 400, description = "Invalid month"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn monthly_report(
    pool: web::Data<MySqlPool>,
    query: web::Query<ReportQuery>,
) -> Result<impl Responder, AppError> {
    let month = query
        .month
        .clone()
        .unwrap_or_else(|| chrono::Local::now().format("%Y-%m").to_string());
    let (start, end, days_in_month) = month_range(&month)?;

    let pool = pool.get_ref();
    let class_name = class_name(pool, query.class_id).await?;
    let section_name = match query.section_id {
        Some(id) => section_name(pool, id).await?,
        None => None,
    };

    let students = class_roster(pool, query.class_id, query.section_id).await?;
    let ids: Vec<u64> = students.iter().map(|s| s.id).collect();

    let mut sql = String::from(
        "SELECT ar.student_id, ar.status \
         FROM attendance_records ar \
         JOIN students s ON s.id = ar.student_id \
         WHERE ar.date >= ? AND ar.date <= ? AND s.class_id = ?",
    );
    if query.section_id.is_some() {
        sql.push_str(" AND s.section_id = ?");
    }

    let mut raw = sqlx::query_as::<_, (u64, String)>(&sql)
        .bind(start)
        .bind(end)
        .bind(query.class_id);
    if let Some(section_id) = query.section_id {
        raw = raw.bind(section_id);
    }
    let raw = raw.fetch_all(pool).await?;

    let rows: Vec<(u64, AttendanceStatus)> = raw
        .into_iter()
        .filter_map(|(id, s)| match AttendanceStatus::from_str(&s) {
            Ok(status) => Some((id, status)),
            Err(_) => {
                warn!(student_id = id, status = %s, "Skipping unknown attendance status");
                None
            }
        })
        .collect();

    let counts = summarize(&ids, &rows);

    let summary = students
        .into_iter()
        .map(|s| {
            let c = counts.get(&s.id).copied().unwrap_or_default();
            StudentSummary {
                id: s.id,
                admission_no: s.admission_no,
                name: Student::full_name(Some(&s.first_name), s.last_name.as_deref()),
                counts: c,
                percent: c.percent(),
            }
        })
        .collect();

    Ok(HttpResponse::Ok().json(MonthlyReportResponse {
        month,
        start,
        end,
        days_in_month,
        class_name,
        section_name,
        summary,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_a_31_day_month() {
        let (start, end, days) = month_range("2024-03").unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
        assert_eq!(days, 31);
    }

    #[test]
    fn handles_leap_february() {
        let (_, end, days) = month_range("2024-02").unwrap();
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(days, 29);
    }

    #[test]
    fn rolls_over_december() {
        let (_, end, days) = month_range("2023-12").unwrap();
        assert_eq!(end, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        assert_eq!(days, 31);
    }

    #[test]
    fn rejects_malformed_months() {
        assert!(month_range("2024-13").is_err());
        assert!(month_range("March 2024").is_err());
        assert!(month_range("").is_err());
    }
}
