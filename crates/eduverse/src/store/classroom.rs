//! Teacher-side records. Every row hangs off a class owned by the teacher.
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::store::resource::{Fields, OwnedResource, WriteKind};
use crate::store::schema::{enum_column, timestamp_column, AttendanceStatus};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Class {
    pub id: i64,
    pub class_name: String,
    pub grade: String,
    pub academic_year: String,
    pub subject: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewClass {
    pub class_name: String,
    pub grade: String,
    pub academic_year: String,
    #[serde(default)]
    pub subject: Option<String>,
}

impl OwnedResource for Class {
    type New = NewClass;

    const NAME: &'static str = "class";
    const TABLE: &'static str = "classes";
    const COLUMNS: &'static [&'static str] = &["class_name", "grade", "academic_year", "subject"];
    const FILTERS: &'static [&'static str] = &["academic_year", "grade"];
    // Students go with their class; other classroom rows are left in place.
    const CHILDREN: &'static [(&'static str, &'static str)] = &[("students", "class_id")];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            class_name: row.get("class_name")?,
            grade: row.get("grade")?,
            academic_year: row.get("academic_year")?,
            subject: row.get("subject")?,
            created_at: timestamp_column(row, "created_at")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Student {
    pub id: i64,
    pub class_id: i64,
    pub full_name: String,
    pub roll_number: String,
    pub usn: Option<String>,
    pub parent_mobile: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStudent {
    pub class_id: i64,
    pub full_name: String,
    pub roll_number: String,
    #[serde(default)]
    pub usn: Option<String>,
    #[serde(default)]
    pub parent_mobile: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl OwnedResource for Student {
    type New = NewStudent;

    const NAME: &'static str = "student";
    const TABLE: &'static str = "students";
    const COLUMNS: &'static [&'static str] =
        &["class_id", "full_name", "roll_number", "usn", "parent_mobile", "email"];
    const FILTERS: &'static [&'static str] = &["class_id", "roll_number"];
    const ORDER_BY: &'static str = "roll_number ASC, id ASC";
    const PARENTS: &'static [(&'static str, &'static str)] = &[("class_id", "classes")];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            class_id: row.get("class_id")?,
            full_name: row.get("full_name")?,
            roll_number: row.get("roll_number")?,
            usn: row.get("usn")?,
            parent_mobile: row.get("parent_mobile")?,
            email: row.get("email")?,
            created_at: timestamp_column(row, "created_at")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttendanceRecord {
    pub id: i64,
    pub class_id: i64,
    pub student_id: i64,
    pub date: String,
    pub status: AttendanceStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAttendanceRecord {
    pub class_id: i64,
    pub student_id: i64,
    pub date: String,
    #[serde(default)]
    pub status: AttendanceStatus,
}

impl OwnedResource for AttendanceRecord {
    type New = NewAttendanceRecord;

    const NAME: &'static str = "attendance record";
    const TABLE: &'static str = "attendance";
    const COLUMNS: &'static [&'static str] = &["class_id", "student_id", "date", "status"];
    const FILTERS: &'static [&'static str] = &["class_id", "student_id", "date", "status"];
    const ORDER_BY: &'static str = "date ASC, student_id ASC";
    const PARENTS: &'static [(&'static str, &'static str)] =
        &[("class_id", "classes"), ("student_id", "students")];
    const PARENT_LINKS: &'static [(&'static str, &'static str, &'static str)] =
        &[("student_id", "students", "class_id")];
    const CONFLICT_KEY: &'static [&'static str] = &["class_id", "student_id", "date"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            class_id: row.get("class_id")?,
            student_id: row.get("student_id")?,
            date: row.get("date")?,
            status: enum_column(row, "status")?,
            created_at: timestamp_column(row, "created_at")?,
        })
    }

    fn before_write(_kind: WriteKind<'_, Self>, fields: &mut Fields) -> Result<()> {
        check_date(fields, "date")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LessonPlan {
    pub id: i64,
    pub class_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub subject: Option<String>,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub materials: Option<String>,
    pub objectives: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLessonPlan {
    pub class_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub materials: Option<String>,
    #[serde(default)]
    pub objectives: Option<String>,
}

impl OwnedResource for LessonPlan {
    type New = NewLessonPlan;

    const NAME: &'static str = "lesson plan";
    const TABLE: &'static str = "lesson_plans";
    const COLUMNS: &'static [&'static str] = &[
        "class_id",
        "title",
        "description",
        "subject",
        "date",
        "start_time",
        "end_time",
        "materials",
        "objectives",
    ];
    const FILTERS: &'static [&'static str] = &["class_id", "date", "subject"];
    const ORDER_BY: &'static str = "date ASC, start_time ASC";
    const PARENTS: &'static [(&'static str, &'static str)] = &[("class_id", "classes")];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            class_id: row.get("class_id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            subject: row.get("subject")?,
            date: row.get("date")?,
            start_time: row.get("start_time")?,
            end_time: row.get("end_time")?,
            materials: row.get("materials")?,
            objectives: row.get("objectives")?,
            created_at: timestamp_column(row, "created_at")?,
        })
    }

    fn before_write(kind: WriteKind<'_, Self>, fields: &mut Fields) -> Result<()> {
        check_date(fields, "date")?;
        let stored = kind.stored().map(|plan| (plan.start_time.as_str(), plan.end_time.as_str()));
        check_time_range(fields, stored)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimetableEntry {
    pub id: i64,
    pub class_id: i64,
    pub subject: String,
    /// 0 = Sunday .. 6 = Saturday
    pub day_of_week: i64,
    pub start_time: String,
    pub end_time: String,
    pub room_number: Option<String>,
    pub is_recurring: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTimetableEntry {
    pub class_id: i64,
    pub subject: String,
    pub day_of_week: i64,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub room_number: Option<String>,
    #[serde(default = "default_recurring")]
    pub is_recurring: bool,
}

fn default_recurring() -> bool {
    true
}

impl OwnedResource for TimetableEntry {
    type New = NewTimetableEntry;

    const NAME: &'static str = "timetable entry";
    const TABLE: &'static str = "timetable_entries";
    const COLUMNS: &'static [&'static str] = &[
        "class_id",
        "subject",
        "day_of_week",
        "start_time",
        "end_time",
        "room_number",
        "is_recurring",
    ];
    const FILTERS: &'static [&'static str] = &["class_id", "day_of_week"];
    const ORDER_BY: &'static str = "day_of_week ASC, start_time ASC";
    const PARENTS: &'static [(&'static str, &'static str)] = &[("class_id", "classes")];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            class_id: row.get("class_id")?,
            subject: row.get("subject")?,
            day_of_week: row.get("day_of_week")?,
            start_time: row.get("start_time")?,
            end_time: row.get("end_time")?,
            room_number: row.get("room_number")?,
            is_recurring: row.get("is_recurring")?,
            created_at: timestamp_column(row, "created_at")?,
        })
    }

    fn before_write(kind: WriteKind<'_, Self>, fields: &mut Fields) -> Result<()> {
        let stored = kind.stored().map(|entry| (entry.start_time.as_str(), entry.end_time.as_str()));
        check_time_range(fields, stored)
    }
}

/// One gradebook column, e.g. "Unit test 1" out of 25 marks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssessmentColumn {
    pub id: i64,
    pub class_id: i64,
    pub name: String,
    pub max_marks: f64,
    pub weightage: f64,
    pub semester: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAssessmentColumn {
    pub class_id: i64,
    pub name: String,
    pub max_marks: f64,
    #[serde(default = "default_weightage")]
    pub weightage: f64,
    pub semester: String,
}

fn default_weightage() -> f64 {
    100.0
}

impl OwnedResource for AssessmentColumn {
    type New = NewAssessmentColumn;

    const NAME: &'static str = "assessment";
    const TABLE: &'static str = "assessments";
    const COLUMNS: &'static [&'static str] = &["class_id", "name", "max_marks", "weightage", "semester"];
    const FILTERS: &'static [&'static str] = &["class_id", "semester"];
    const PARENTS: &'static [(&'static str, &'static str)] = &[("class_id", "classes")];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            class_id: row.get("class_id")?,
            name: row.get("name")?,
            max_marks: row.get("max_marks")?,
            weightage: row.get("weightage")?,
            semester: row.get("semester")?,
            created_at: timestamp_column(row, "created_at")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Mark {
    pub id: i64,
    pub class_id: i64,
    pub student_id: i64,
    pub assessment_id: i64,
    pub marks: f64,
    pub semester: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMark {
    pub class_id: i64,
    pub student_id: i64,
    pub assessment_id: i64,
    pub marks: f64,
    pub semester: String,
}

impl OwnedResource for Mark {
    type New = NewMark;

    const NAME: &'static str = "mark";
    const TABLE: &'static str = "marks";
    const COLUMNS: &'static [&'static str] =
        &["class_id", "student_id", "assessment_id", "marks", "semester"];
    const FILTERS: &'static [&'static str] = &["class_id", "student_id", "assessment_id", "semester"];
    const PARENTS: &'static [(&'static str, &'static str)] = &[
        ("class_id", "classes"),
        ("student_id", "students"),
        ("assessment_id", "assessments"),
    ];
    const PARENT_LINKS: &'static [(&'static str, &'static str, &'static str)] = &[
        ("student_id", "students", "class_id"),
        ("assessment_id", "assessments", "class_id"),
    ];
    const CONFLICT_KEY: &'static [&'static str] = &["student_id", "assessment_id", "semester"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            class_id: row.get("class_id")?,
            student_id: row.get("student_id")?,
            assessment_id: row.get("assessment_id")?,
            marks: row.get("marks")?,
            semester: row.get("semester")?,
            created_at: timestamp_column(row, "created_at")?,
        })
    }
}

pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

fn check_date(fields: &Fields, column: &str) -> Result<()> {
    match fields.get(column).and_then(Value::as_str) {
        Some(raw) if NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_err() => Err(AppError::Validation(
            format!("{} must be a YYYY-MM-DD date, got '{}'", column, raw),
        )),
        _ => Ok(()),
    }
}

/// Written ends must parse as times, and start < end once the write is
/// merged with the stored ends of the row.
fn check_time_range(fields: &Fields, stored: Option<(&str, &str)>) -> Result<()> {
    let stored = [stored.map(|(start, _)| start), stored.map(|(_, end)| end)];
    let mut parsed = [None, None];
    let mut written = false;
    for ((slot, column), fallback) in parsed.iter_mut().zip(["start_time", "end_time"]).zip(stored) {
        if let Some(raw) = fields.get(column).and_then(Value::as_str) {
            written = true;
            *slot = Some(parse_time(raw).ok_or_else(|| {
                AppError::Validation(format!("{} must be HH:MM, got '{}'", column, raw))
            })?);
        } else {
            *slot = fallback.and_then(parse_time);
        }
    }

    if let (true, [Some(start), Some(end)]) = (written, parsed) {
        if start >= end {
            return Err(AppError::Validation("start_time must be before end_time".into()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::resource::ResourceStore;
    use crate::store::Database;

    const TEACHER: &str = "teacher-1";

    fn class(db: &Database) -> Class {
        db.resource::<Class>()
            .create(TEACHER, &NewClass {
                class_name: "Section A".into(),
                grade: "Grade 5".into(),
                academic_year: "2024-2025".into(),
                subject: None,
            })
            .unwrap()
    }

    fn student(store: &ResourceStore<Student>, class_id: i64, name: &str, roll: &str) -> Student {
        store
            .create(TEACHER, &NewStudent {
                class_id,
                full_name: name.into(),
                roll_number: roll.into(),
                usn: None,
                parent_mobile: None,
                email: None,
            })
            .unwrap()
    }

    #[test]
    fn test_students_ordered_by_roll_number() {
        let db = Database::in_memory().unwrap();
        let class = class(&db);
        let students = db.resource::<Student>();
        student(&students, class.id, "Ravi", "03");
        student(&students, class.id, "Asha", "01");
        student(&students, class.id, "Meera", "02");

        let listed = students
            .list(TEACHER, &[("class_id".into(), class.id.to_string())])
            .unwrap();
        let rolls: Vec<_> = listed.iter().map(|s| s.roll_number.as_str()).collect();
        assert_eq!(rolls, vec!["01", "02", "03"]);
    }

    #[test]
    fn test_deleting_class_cascades_students() {
        let db = Database::in_memory().unwrap();
        let class = class(&db);
        let students = db.resource::<Student>();
        student(&students, class.id, "Asha", "01");
        student(&students, class.id, "Ravi", "02");

        db.resource::<Class>().delete(TEACHER, class.id).unwrap();
        assert!(students.list(TEACHER, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_student_needs_owned_class() {
        let db = Database::in_memory().unwrap();
        let class = class(&db);
        let err = db
            .resource::<Student>()
            .create("other-teacher", &NewStudent {
                class_id: class.id,
                full_name: "Spy".into(),
                roll_number: "99".into(),
                usn: None,
                parent_mobile: None,
                email: None,
            })
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_attendance_upsert_last_write_wins() {
        let db = Database::in_memory().unwrap();
        let class = class(&db);
        let asha = student(&db.resource::<Student>(), class.id, "Asha", "01");
        let attendance = db.resource::<AttendanceRecord>();

        let mark = |status| NewAttendanceRecord {
            class_id: class.id,
            student_id: asha.id,
            date: "2024-01-10".into(),
            status,
        };
        attendance.upsert(TEACHER, &[mark(AttendanceStatus::Present)]).unwrap();
        attendance.upsert(TEACHER, &[mark(AttendanceStatus::Absent)]).unwrap();

        let rows = attendance.list(TEACHER, &[("date".into(), "2024-01-10".into())]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, AttendanceStatus::Absent);
    }

    #[test]
    fn test_attendance_rejects_bad_date() {
        let db = Database::in_memory().unwrap();
        let class = class(&db);
        let asha = student(&db.resource::<Student>(), class.id, "Asha", "01");

        let err = db
            .resource::<AttendanceRecord>()
            .upsert(TEACHER, &[NewAttendanceRecord {
                class_id: class.id,
                student_id: asha.id,
                date: "10/01/2024".into(),
                status: AttendanceStatus::Present,
            }])
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_mark_upsert_on_student_assessment_semester() {
        let db = Database::in_memory().unwrap();
        let class = class(&db);
        let asha = student(&db.resource::<Student>(), class.id, "Asha", "01");
        let test = db
            .resource::<AssessmentColumn>()
            .create(TEACHER, &NewAssessmentColumn {
                class_id: class.id,
                name: "Unit test 1".into(),
                max_marks: 25.0,
                weightage: default_weightage(),
                semester: "1".into(),
            })
            .unwrap();
        let marks = db.resource::<Mark>();

        let entry = |value| NewMark {
            class_id: class.id,
            student_id: asha.id,
            assessment_id: test.id,
            marks: value,
            semester: "1".into(),
        };
        marks.upsert(TEACHER, &[entry(12.0)]).unwrap();
        let stored = marks.upsert(TEACHER, &[entry(21.5)]).unwrap();

        assert_eq!(stored[0].marks, 21.5);
        assert_eq!(marks.list(TEACHER, &[]).unwrap().len(), 1);
    }

    #[test]
    fn test_timetable_rejects_inverted_times_and_bad_day() {
        let db = Database::in_memory().unwrap();
        let class = class(&db);
        let timetable = db.resource::<TimetableEntry>();

        let entry = |day, start: &str, end: &str| NewTimetableEntry {
            class_id: class.id,
            subject: "Maths".into(),
            day_of_week: day,
            start_time: start.into(),
            end_time: end.into(),
            room_number: Some("101".into()),
            is_recurring: true,
        };

        assert!(matches!(
            timetable.create(TEACHER, &entry(1, "10:00", "09:00")),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            timetable.create(TEACHER, &entry(7, "09:00", "10:00")),
            Err(AppError::Validation(_))
        ));
        timetable.create(TEACHER, &entry(2, "11:00", "12:00")).unwrap();
        timetable.create(TEACHER, &entry(1, "09:00", "10:00")).unwrap();

        let days: Vec<_> = timetable.list(TEACHER, &[]).unwrap().iter().map(|e| e.day_of_week).collect();
        assert_eq!(days, vec![1, 2]);
    }

    #[test]
    fn test_partial_time_update_is_checked_against_stored_end() {
        let db = Database::in_memory().unwrap();
        let class = class(&db);
        let timetable = db.resource::<TimetableEntry>();
        let entry = timetable
            .create(TEACHER, &NewTimetableEntry {
                class_id: class.id,
                subject: "Maths".into(),
                day_of_week: 1,
                start_time: "09:00".into(),
                end_time: "10:00".into(),
                room_number: None,
                is_recurring: true,
            })
            .unwrap();

        let patch = |value: serde_json::Value| value.as_object().cloned().unwrap();
        let err = timetable
            .update(TEACHER, entry.id, patch(serde_json::json!({"end_time": "07:00"})))
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let err = timetable
            .update(TEACHER, entry.id, patch(serde_json::json!({"start_time": "10:30"})))
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let stored = timetable.get(TEACHER, entry.id).unwrap();
        assert_eq!((stored.start_time.as_str(), stored.end_time.as_str()), ("09:00", "10:00"));

        let longer = timetable
            .update(TEACHER, entry.id, patch(serde_json::json!({"end_time": "11:00"})))
            .unwrap();
        assert_eq!(longer.end_time, "11:00");
    }

    #[test]
    fn test_partial_lesson_plan_update_keeps_start_before_end() {
        let db = Database::in_memory().unwrap();
        let class = class(&db);
        let plans = db.resource::<LessonPlan>();
        let plan = plans
            .create(TEACHER, &NewLessonPlan {
                class_id: class.id,
                title: "Photosynthesis".into(),
                description: None,
                subject: Some("Science".into()),
                date: "2024-03-01".into(),
                start_time: "13:00".into(),
                end_time: "14:00".into(),
                materials: None,
                objectives: None,
            })
            .unwrap();

        let patch = serde_json::json!({"start_time": "15:00"}).as_object().cloned().unwrap();
        assert!(matches!(plans.update(TEACHER, plan.id, patch), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_attendance_student_must_belong_to_class() {
        let db = Database::in_memory().unwrap();
        let section_a = class(&db);
        let section_b = class(&db);
        let ravi = student(&db.resource::<Student>(), section_b.id, "Ravi", "01");
        let attendance = db.resource::<AttendanceRecord>();

        let err = attendance
            .upsert(TEACHER, &[NewAttendanceRecord {
                class_id: section_a.id,
                student_id: ravi.id,
                date: "2024-01-10".into(),
                status: AttendanceStatus::Present,
            }])
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let record = attendance
            .create(TEACHER, &NewAttendanceRecord {
                class_id: section_b.id,
                student_id: ravi.id,
                date: "2024-01-10".into(),
                status: AttendanceStatus::Present,
            })
            .unwrap();
        let moved = serde_json::json!({"class_id": section_a.id}).as_object().cloned().unwrap();
        assert!(matches!(
            attendance.update(TEACHER, record.id, moved),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_mark_assessment_must_belong_to_class() {
        let db = Database::in_memory().unwrap();
        let section_a = class(&db);
        let section_b = class(&db);
        let asha = student(&db.resource::<Student>(), section_a.id, "Asha", "01");
        let other_test = db
            .resource::<AssessmentColumn>()
            .create(TEACHER, &NewAssessmentColumn {
                class_id: section_b.id,
                name: "Unit test 1".into(),
                max_marks: 25.0,
                weightage: default_weightage(),
                semester: "1".into(),
            })
            .unwrap();

        let err = db
            .resource::<Mark>()
            .upsert(TEACHER, &[NewMark {
                class_id: section_a.id,
                student_id: asha.id,
                assessment_id: other_test.id,
                marks: 20.0,
                semester: "1".into(),
            }])
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(db.resource::<Mark>().list(TEACHER, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_lesson_plans_ordered_by_date_then_start() {
        let db = Database::in_memory().unwrap();
        let class = class(&db);
        let plans = db.resource::<LessonPlan>();
        let plan = |date: &str, start: &str, end: &str| NewLessonPlan {
            class_id: class.id,
            title: format!("{} {}", date, start),
            description: None,
            subject: Some("Science".into()),
            date: date.into(),
            start_time: start.into(),
            end_time: end.into(),
            materials: None,
            objectives: None,
        };
        plans.create(TEACHER, &plan("2024-03-02", "09:00", "10:00")).unwrap();
        plans.create(TEACHER, &plan("2024-03-01", "11:00", "12:00")).unwrap();
        plans.create(TEACHER, &plan("2024-03-01", "08:00", "09:00")).unwrap();

        let titles: Vec<_> = plans.list(TEACHER, &[]).unwrap().into_iter().map(|p| p.title).collect();
        assert_eq!(titles, vec!["2024-03-01 08:00", "2024-03-01 11:00", "2024-03-02 09:00"]);
    }

    #[test]
    fn test_bulk_import_is_all_or_nothing() {
        let db = Database::in_memory().unwrap();
        let class = class(&db);
        let students = db.resource::<Student>();
        let new = |class_id, roll: &str| NewStudent {
            class_id,
            full_name: format!("Student {}", roll),
            roll_number: roll.into(),
            usn: None,
            parent_mobile: None,
            email: None,
        };

        let err = students.create_many(TEACHER, &[new(class.id, "01"), new(class.id + 100, "02")]);
        assert!(err.is_err());
        assert!(students.list(TEACHER, &[]).unwrap().is_empty());

        let created = students.create_many(TEACHER, &[new(class.id, "01"), new(class.id, "02")]).unwrap();
        assert_eq!(created.len(), 2);
    }

    #[test]
    fn test_parse_time_accepts_seconds() {
        assert_eq!(parse_time("09:30"), NaiveTime::from_hms_opt(9, 30, 0));
        assert_eq!(parse_time("09:30:15"), NaiveTime::from_hms_opt(9, 30, 15));
        assert_eq!(parse_time("9.30"), None);
    }
}
