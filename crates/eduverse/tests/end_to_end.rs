//! Classroom scenario straight against the stores, without HTTP.

use eduverse::store::{
    AttendanceRecord, AttendanceStatus, Class, Database, NewAttendanceRecord, NewClass, NewStudent, Student,
};
use eduverse::tools::attendance_sheet;

const TEACHER: &str = "teacher-1";

fn class_filter(class_id: i64) -> Vec<(String, String)> {
    vec![("class_id".to_string(), class_id.to_string())]
}

#[test]
fn test_mark_present_and_reopen_sheet() {
    let db = Database::in_memory().unwrap();

    let class = db
        .resource::<Class>()
        .create(TEACHER, &NewClass {
            class_name: "Section A".into(),
            grade: "Grade 5".into(),
            academic_year: "2024-2025".into(),
            subject: None,
        })
        .unwrap();

    let asha = db
        .resource::<Student>()
        .create(TEACHER, &NewStudent {
            class_id: class.id,
            full_name: "Asha".into(),
            roll_number: "01".into(),
            usn: None,
            parent_mobile: None,
            email: None,
        })
        .unwrap();

    let mark = |status| NewAttendanceRecord {
        class_id: class.id,
        student_id: asha.id,
        date: "2024-01-10".into(),
        status,
    };
    db.resource::<AttendanceRecord>()
        .upsert(TEACHER, &[mark(AttendanceStatus::Absent)])
        .unwrap();
    db.resource::<AttendanceRecord>()
        .upsert(TEACHER, &[mark(AttendanceStatus::Present)])
        .unwrap();

    // Re-open the sheet for the same date
    let students = db.resource::<Student>().list(TEACHER, &class_filter(class.id)).unwrap();
    let mut filters = class_filter(class.id);
    filters.push(("date".into(), "2024-01-10".into()));
    let records = db.resource::<AttendanceRecord>().list(TEACHER, &filters).unwrap();
    assert_eq!(records.len(), 1, "upsert must keep one row per student and date");

    let sheet = attendance_sheet(class.id, "2024-01-10", &students, &records);
    assert_eq!(sheet.rows.len(), 1);
    assert_eq!(sheet.rows[0].roll_number, "01");
    assert_eq!(sheet.rows[0].status, AttendanceStatus::Present);
    assert_eq!(sheet.summary.present, 1);
    assert_eq!(sheet.summary.absent, 0);
    assert_eq!(sheet.summary.total, 1);
}

#[test]
fn test_deleting_class_removes_its_students_only() {
    let db = Database::in_memory().unwrap();
    let classes = db.resource::<Class>();
    let new_class = |name: &str| NewClass {
        class_name: name.into(),
        grade: "Grade 6".into(),
        academic_year: "2024-2025".into(),
        subject: Some("Science".into()),
    };
    let a = classes.create(TEACHER, &new_class("A")).unwrap();
    let b = classes.create(TEACHER, &new_class("B")).unwrap();

    let roster = |class_id: i64| {
        (1..=3)
            .map(|n| NewStudent {
                class_id,
                full_name: format!("Student {}", n),
                roll_number: format!("{:02}", n),
                usn: None,
                parent_mobile: None,
                email: None,
            })
            .collect::<Vec<_>>()
    };
    db.resource::<Student>().create_many(TEACHER, &roster(a.id)).unwrap();
    db.resource::<Student>().create_many(TEACHER, &roster(b.id)).unwrap();

    classes.delete(TEACHER, a.id).unwrap();

    let remaining = db.resource::<Student>().list(TEACHER, &[]).unwrap();
    assert_eq!(remaining.len(), 3);
    assert!(remaining.iter().all(|s| s.class_id == b.id));
}
