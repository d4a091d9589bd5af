pub mod attendance;
pub mod dashboard;
pub mod import_students;
pub mod report;
pub mod student;
