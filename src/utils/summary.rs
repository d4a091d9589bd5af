use std::collections::HashMap;

use serde::Serialize;
use utoipa::ToSchema;

use crate::model::attendance::AttendanceStatus;

/// Per-student status counters over a date range. `marked` counts every
/// recorded status, so present + absent + late + leave == marked.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatusCounts {
    #[schema(example = 18)]
    pub present: u32,
    #[schema(example = 2)]
    pub absent: u32,
    #[schema(example = 1)]
    pub late: u32,
    #[schema(example = 1)]
    pub leave: u32,
    #[schema(example = 22)]
    pub marked: u32,
}

impl StatusCounts {
    pub fn record(&mut self, status: AttendanceStatus) {
        self.marked += 1;
        match status {
            AttendanceStatus::Present => self.present += 1,
            AttendanceStatus::Absent => self.absent += 1,
            AttendanceStatus::Late => self.late += 1,
            AttendanceStatus::Leave => self.leave += 1,
        }
    }

    /// Attendance percentage: (present + late) / marked, one decimal place.
    /// None when nothing was marked; callers render that as an em-dash,
    /// never as zero.
    pub fn percent(&self) -> Option<f64> {
        percent_of(self.present + self.late, self.marked)
    }
}

/// round(part/marked × 1000)/10 — one decimal place without floating drift.
pub fn percent_of(part: u32, marked: u32) -> Option<f64> {
    if marked == 0 {
        None
    } else {
        Some((f64::from(part) / f64::from(marked) * 1000.0).round() / 10.0)
    }
}

/// Aggregate raw attendance rows into per-student counts. Every requested
/// student gets an entry, zeroed when it has no rows; rows for students
/// outside the requested set are ignored.
pub fn summarize(
    student_ids: &[u64],
    rows: &[(u64, AttendanceStatus)],
) -> HashMap<u64, StatusCounts> {
    let mut counts: HashMap<u64, StatusCounts> = student_ids
        .iter()
        .map(|id| (*id, StatusCounts::default()))
        .collect();

    for (student_id, status) in rows {
        if let Some(c) = counts.get_mut(student_id) {
            c.record(*status);
        }
    }

    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use AttendanceStatus::{Absent, Late, Leave, Present};

    #[test]
    fn counts_partition_rows_by_status() {
        let rows = vec![(1, Present), (1, Absent), (1, Present), (1, Late), (1, Leave)];
        let counts = summarize(&[1], &rows);
        let c = counts[&1];
        assert_eq!(c.present, 2);
        assert_eq!(c.absent, 1);
        assert_eq!(c.late, 1);
        assert_eq!(c.leave, 1);
        assert_eq!(c.marked, 5);
        assert_eq!(c.present + c.absent + c.late + c.leave, c.marked);
    }

    #[test]
    fn student_with_no_rows_yields_none_percent() {
        let counts = summarize(&[1, 2], &[(1, Present)]);
        assert_eq!(counts[&2].marked, 0);
        assert_eq!(counts[&2].percent(), None);
    }

    #[test]
    fn rows_outside_requested_set_are_ignored() {
        let counts = summarize(&[1], &[(1, Present), (99, Absent)]);
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[&1].marked, 1);
    }

    #[test]
    fn percent_counts_late_as_attended() {
        // 2 present + 1 late out of 4 marked -> 75.0%
        let rows = vec![(1, Present), (1, Present), (1, Late), (1, Absent)];
        let counts = summarize(&[1], &rows);
        assert_eq!(counts[&1].percent(), Some(75.0));
    }

    #[test]
    fn percent_rounds_to_one_decimal() {
        // 2 of 3 -> 66.666... -> 66.7
        let rows = vec![(7, Present), (7, Absent), (7, Present)];
        let counts = summarize(&[7], &rows);
        let c = counts[&7];
        assert_eq!(
            (c.present, c.absent, c.late, c.leave, c.marked),
            (2, 1, 0, 0, 3)
        );
        assert_eq!(c.percent(), Some(66.7));
    }

    #[test]
    fn percent_stays_in_range() {
        assert_eq!(percent_of(0, 5), Some(0.0));
        assert_eq!(percent_of(5, 5), Some(100.0));
        assert_eq!(percent_of(0, 0), None);
    }
}
