use std::str::FromStr;

use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::MySqlPool;
use tracing::warn;
use utoipa::ToSchema;

use crate::model::attendance::AttendanceStatus;
use crate::utils::summary::{StatusCounts, percent_of};

#[derive(Serialize, ToSchema)]
pub struct DashboardMetrics {
    #[schema(example = "2024-03-04", value_type = String, format = "date")]
    pub date: NaiveDate,
    /// Total students on record; null when the query failed
    #[schema(example = 412, nullable = true)]
    pub students: Option<i64>,
    /// present / marked over today's rows, one decimal place; null when
    /// nothing is marked yet
    #[schema(example = 93.5, nullable = true)]
    pub attendance_percent_today: Option<f64>,
    /// Sum of pending fee invoice amounts
    #[schema(example = 125000.0, nullable = true)]
    pub pending_fees_total: Option<f64>,
    /// Events starting within the next 7 days
    #[schema(example = 3, nullable = true)]
    pub upcoming_events: Option<i64>,
}

/// Dashboard metric cards
///
/// The four queries run concurrently; a failing query degrades its metric to
/// null instead of failing the whole response.
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Today's metrics", body = DashboardMetrics)
    ),
    tag = "Dashboard"
)]
pub async fn metrics(pool: web::Data<MySqlPool>) -> impl Responder {
    let today = chrono::Local::now().date_naive();
    let pool = pool.get_ref();

    let (students, attendance, fees, events) = futures::join!(
        students_count(pool),
        attendance_percent(pool, today),
        pending_fees_total(pool),
        upcoming_events_count(pool),
    );

    HttpResponse::Ok().json(DashboardMetrics {
        date: today,
        students: metric("students", students),
        attendance_percent_today: metric("attendance", attendance).flatten(),
        pending_fees_total: metric("pending_fees", fees),
        upcoming_events: metric("upcoming_events", events),
    })
}

fn metric<T>(name: &str, result: Result<T, sqlx::Error>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(metric = name, error = %e, "Dashboard metric query failed");
            None
        }
    }
}

async fn students_count(pool: &MySqlPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM students")
        .fetch_one(pool)
        .await
}

async fn attendance_percent(
    pool: &MySqlPool,
    date: NaiveDate,
) -> Result<Option<f64>, sqlx::Error> {
    let statuses: Vec<String> =
        sqlx::query_scalar("SELECT status FROM attendance_records WHERE date = ?")
            .bind(date)
            .fetch_all(pool)
            .await?;

    let mut counts = StatusCounts::default();
    for status in &statuses {
        match AttendanceStatus::from_str(status) {
            Ok(s) => counts.record(s),
            Err(_) => warn!(status = %status, "Skipping unknown attendance status"),
        }
    }

    Ok(percent_of(counts.present, counts.marked))
}

async fn pending_fees_total(pool: &MySqlPool) -> Result<f64, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT CAST(COALESCE(SUM(amount), 0) AS DOUBLE) \
         FROM fee_invoices WHERE status = 'pending'",
    )
    .fetch_one(pool)
    .await
}

async fn upcoming_events_count(pool: &MySqlPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM events \
         WHERE start_at >= NOW() AND start_at <= NOW() + INTERVAL 7 DAY",
    )
    .fetch_one(pool)
    .await
}
