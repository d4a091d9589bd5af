use crate::api::attendance::{
    Absentee, AbsenteeListResponse, MarkRecord, MarkingSheetResponse, MarkingStudent,
    SaveAttendance,
};
use crate::api::dashboard::DashboardMetrics;
use crate::api::import_students::{ImportResponse, ImportResult};
use crate::api::report::{MonthlyReportResponse, StudentSummary};
use crate::api::student::{
    AttendanceEntry, StudentDetail, StudentListItem, StudentListResponse,
};
use crate::model::attendance::AttendanceStatus;
use crate::model::guardian::Guardian;
use crate::model::student::{NewGuardian, NewStudent, Student};
use crate::utils::summary::StatusCounts;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "School Administration API",
        version = "1.0.0",
        description = r#"
## School Administration System

Backend for day-to-day school administration.

### Key Features
- **Student Records**
  - Admission, profiles with guardians, search, update, delete
  - Bulk CSV import with per-row results
- **Attendance**
  - Daily marking (upsert per student and date)
  - Absentee list and monthly report with per-student percentages
- **Dashboard**
  - Student count, today's attendance percentage, pending fees, upcoming events

### Response Format
- JSON-based RESTful responses

Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::student::list_students,
        crate::api::student::get_student,
        crate::api::student::create_student,
        crate::api::student::update_student,
        crate::api::student::delete_student,
        crate::api::import_students::import_students,

        crate::api::attendance::marking_sheet,
        crate::api::attendance::save_attendance,
        crate::api::attendance::absentees,

        crate::api::report::monthly_report,

        crate::api::dashboard::metrics
    ),
    components(
        schemas(
            Student,
            NewStudent,
            NewGuardian,
            Guardian,
            AttendanceStatus,
            StudentListItem,
            StudentListResponse,
            StudentDetail,
            AttendanceEntry,
            MarkingStudent,
            MarkingSheetResponse,
            MarkRecord,
            SaveAttendance,
            Absentee,
            AbsenteeListResponse,
            StatusCounts,
            StudentSummary,
            MonthlyReportResponse,
            DashboardMetrics,
            ImportResult,
            ImportResponse
        )
    ),
    tags(
        (name = "Students", description = "Student record APIs"),
        (name = "Attendance", description = "Attendance marking and reporting APIs"),
        (name = "Dashboard", description = "Dashboard metric APIs"),
    )
)]
pub struct ApiDoc;
