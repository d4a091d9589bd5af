use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

/// Attendance status for one student on one day. Stored lowercase in the
/// `attendance_records.status` column; rows carrying any other string fail
/// to parse and are skipped by readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Leave,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Late => "late",
            AttendanceStatus::Leave => "leave",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn parses_lowercase_status() {
        assert_eq!(
            AttendanceStatus::from_str("present").unwrap(),
            AttendanceStatus::Present
        );
        assert_eq!(
            AttendanceStatus::from_str("leave").unwrap(),
            AttendanceStatus::Leave
        );
    }

    #[test]
    fn rejects_unknown_status() {
        assert!(AttendanceStatus::from_str("holiday").is_err());
        assert!(AttendanceStatus::from_str("").is_err());
    }

    #[test]
    fn round_trips_as_str() {
        for s in [
            AttendanceStatus::Present,
            AttendanceStatus::Absent,
            AttendanceStatus::Late,
            AttendanceStatus::Leave,
        ] {
            assert_eq!(AttendanceStatus::from_str(s.as_str()).unwrap(), s);
        }
    }
}
