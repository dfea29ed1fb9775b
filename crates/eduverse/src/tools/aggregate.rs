//! Summaries computed from stored rows: todo counts, attendance sheets, class progress
use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::store::{AssessmentColumn, AttendanceRecord, AttendanceStatus, Mark, Priority, Student, Task};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TodoSummary {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub by_priority: BTreeMap<&'static str, usize>,
}

pub fn todo_summary(tasks: &[Task]) -> TodoSummary {
    let mut by_priority: BTreeMap<&'static str, usize> = [
        Priority::High,
        Priority::Medium,
        Priority::Low,
        Priority::Completed,
    ]
    .iter()
    .map(|p| (p.as_str(), 0))
    .collect();
    for task in tasks {
        *by_priority.entry(task.priority.as_str()).or_default() += 1;
    }

    let completed = tasks.iter().filter(|t| t.completed).count();
    TodoSummary {
        total: tasks.len(),
        completed,
        pending: tasks.len() - completed,
        by_priority,
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SheetRow {
    pub student_id: i64,
    pub full_name: String,
    pub roll_number: String,
    pub status: AttendanceStatus,
    /// `None` until attendance for the date has been saved
    pub record_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
pub struct AttendanceSummary {
    pub present: usize,
    pub absent: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AttendanceSheet {
    pub class_id: i64,
    pub date: String,
    pub rows: Vec<SheetRow>,
    pub summary: AttendanceSummary,
}

/// One row per student of the class. Students without a record for the date are absent.
pub fn attendance_sheet(
    class_id: i64,
    date: &str,
    students: &[Student],
    records: &[AttendanceRecord],
) -> AttendanceSheet {
    let saved: HashMap<i64, &AttendanceRecord> = records
        .iter()
        .filter(|r| r.class_id == class_id && r.date == date)
        .map(|r| (r.student_id, r))
        .collect();

    let rows: Vec<SheetRow> = students
        .iter()
        .filter(|s| s.class_id == class_id)
        .map(|s| {
            let record = saved.get(&s.id);
            SheetRow {
                student_id: s.id,
                full_name: s.full_name.clone(),
                roll_number: s.roll_number.clone(),
                status: record.map(|r| r.status).unwrap_or_default(),
                record_id: record.map(|r| r.id),
            }
        })
        .collect();

    let present = rows.iter().filter(|r| r.status == AttendanceStatus::Present).count();
    let summary = AttendanceSummary {
        present,
        absent: rows.len() - present,
        total: rows.len(),
    };

    AttendanceSheet {
        class_id,
        date: date.to_string(),
        rows,
        summary,
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StudentProgress {
    pub student_id: i64,
    pub full_name: String,
    pub roll_number: String,
    /// Weighted percentage over the graded assessments, `None` if nothing is graded
    pub percentage: Option<f64>,
    pub graded: usize,
    pub total_assessments: usize,
}

/// `sum(marks / max * weightage) / sum(weightage) * 100` over each student's graded assessments.
pub fn student_progress(
    students: &[Student],
    assessments: &[AssessmentColumn],
    marks: &[Mark],
) -> Vec<StudentProgress> {
    let columns: HashMap<i64, &AssessmentColumn> = assessments.iter().map(|a| (a.id, a)).collect();

    students
        .iter()
        .map(|student| {
            let mut weighted = 0.0;
            let mut weights = 0.0;
            let mut graded = 0;
            for mark in marks.iter().filter(|m| m.student_id == student.id) {
                let Some(column) = columns.get(&mark.assessment_id) else {
                    continue;
                };
                if column.max_marks <= 0.0 || column.weightage <= 0.0 {
                    continue;
                }
                weighted += mark.marks / column.max_marks * column.weightage;
                weights += column.weightage;
                graded += 1;
            }

            let percentage = (weights > 0.0).then(|| (weighted / weights * 10_000.0).round() / 100.0);
            StudentProgress {
                student_id: student.id,
                full_name: student.full_name.clone(),
                roll_number: student.roll_number.clone(),
                percentage,
                graded,
                total_assessments: assessments.len(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn student(id: i64, roll: &str) -> Student {
        Student {
            id,
            class_id: 1,
            full_name: format!("Student {}", roll),
            roll_number: roll.into(),
            usn: None,
            parent_mobile: None,
            email: None,
            created_at: Utc::now(),
        }
    }

    fn record(id: i64, student_id: i64, date: &str, status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord {
            id,
            class_id: 1,
            student_id,
            date: date.into(),
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_sheet_defaults_to_absent() {
        let students = [student(1, "01"), student(2, "02"), student(3, "03")];
        let records = [
            record(10, 1, "2024-01-10", AttendanceStatus::Present),
            record(11, 2, "2024-01-09", AttendanceStatus::Present),
        ];
        let sheet = attendance_sheet(1, "2024-01-10", &students, &records);

        assert_eq!(sheet.rows[0].status, AttendanceStatus::Present);
        assert_eq!(sheet.rows[0].record_id, Some(10));
        assert_eq!(sheet.rows[1].status, AttendanceStatus::Absent);
        assert_eq!(sheet.rows[1].record_id, None);
        assert_eq!(sheet.summary, AttendanceSummary { present: 1, absent: 2, total: 3 });
    }

    #[test]
    fn test_todo_summary_counts() {
        let task = |priority: Priority, completed: bool| Task {
            id: 0,
            title: "t".into(),
            priority,
            due_date: None,
            completed,
            created_at: Utc::now(),
        };
        let summary = todo_summary(&[
            task(Priority::High, false),
            task(Priority::High, false),
            task(Priority::Completed, true),
        ]);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.pending, 2);
        assert_eq!(summary.by_priority["High"], 2);
        assert_eq!(summary.by_priority["Low"], 0);
    }

    #[test]
    fn test_weighted_progress() {
        let column = |id: i64, max: f64, weight: f64| AssessmentColumn {
            id,
            class_id: 1,
            name: format!("A{}", id),
            max_marks: max,
            weightage: weight,
            semester: "1".into(),
            created_at: Utc::now(),
        };
        let mark = |student_id: i64, assessment_id: i64, marks: f64| Mark {
            id: 0,
            class_id: 1,
            student_id,
            assessment_id,
            marks,
            semester: "1".into(),
            created_at: Utc::now(),
        };

        let progress = student_progress(
            &[student(1, "01"), student(2, "02")],
            &[column(1, 50.0, 25.0), column(2, 100.0, 75.0)],
            &[mark(1, 1, 40.0), mark(1, 2, 60.0)],
        );
        // 0.8 * 25 + 0.6 * 75 = 65 over a weight of 100
        assert_eq!(progress[0].percentage, Some(65.0));
        assert_eq!(progress[0].graded, 2);
        assert_eq!(progress[1].percentage, None);
        assert_eq!(progress[1].total_assessments, 2);
    }
}
